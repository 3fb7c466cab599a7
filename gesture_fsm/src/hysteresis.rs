//! Hysteresis hold for one signed axis driving an opposing key pair.
//!
//! Each side of the axis has an engage threshold `E` and a strong threshold
//! `S ≥ E`; the shared hysteresis factor `H` puts the release threshold at
//! `R = E·H`.  For a side's magnitude `m`:
//!
//! ```text
//!   m ≤ R         released
//!   R < m ≤ E     dead band: a continuous hold survives, a tap does not
//!   E < m ≤ S     weak: tap rhythm (hold for `hold`, pause for `wait`, repeat)
//!   S < m         strong: continuous hold until m < R
//! ```
//!
//! A side only ever reacts to the signal on its own sign, so the opposing
//! keys can never be down together as long as `E > 0` and `0 < H < 1`.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::{Action, Key};

// ════════════════════════════════════════════════════════════════════════════
// Band
// ════════════════════════════════════════════════════════════════════════════

/// Thresholds for one side of the axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub key:    Key,
    /// Magnitude above which the key engages.
    pub engage: f64,
    /// Magnitude above which the key is held continuously instead of tapped.
    pub strong: f64,
}

impl Band {
    /// A band with no tap regime: every engagement is a continuous hold.
    pub fn continuous(key: Key, engage: f64) -> Self {
        Band { key, engage, strong: engage }
    }
}

/// Tap rhythm for the weak regime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TapTiming {
    pub hold: Duration,
    pub wait: Duration,
}

impl Default for TapTiming {
    fn default() -> Self {
        TapTiming {
            hold: Duration::from_millis(1000),
            wait: Duration::from_millis(75),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BandError {
    #[error("engage threshold for '{key}' must be positive, got {value}")]
    NonPositiveEngage { key: Key, value: f64 },
    #[error("strong threshold for '{key}' ({strong}) is below its engage threshold ({engage})")]
    StrongBelowEngage { key: Key, engage: f64, strong: f64 },
    #[error("hysteresis factor must lie strictly between 0 and 1, got {0}")]
    Hysteresis(f64),
    #[error("both sides of the axis are bound to '{0}'")]
    SameKey(Key),
}

fn validate(negative: &Band, positive: &Band, hysteresis: f64) -> Result<(), BandError> {
    for band in [negative, positive] {
        if !(band.engage > 0.0) {
            return Err(BandError::NonPositiveEngage { key: band.key, value: band.engage });
        }
        if !(band.strong >= band.engage) {
            return Err(BandError::StrongBelowEngage {
                key: band.key, engage: band.engage, strong: band.strong,
            });
        }
    }
    if !(hysteresis > 0.0 && hysteresis < 1.0) {
        return Err(BandError::Hysteresis(hysteresis));
    }
    if negative.key == positive.key {
        return Err(BandError::SameKey(negative.key));
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Side state machine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Continuous hold (strong regime).
    Holding,
    /// Weak-regime tap, key down since the given instant.
    Tapping { since: Instant },
    /// Weak-regime pause, key up since the given instant.
    Waiting { since: Instant },
}

#[derive(Clone, Debug)]
struct Side {
    band:  Band,
    phase: Phase,
}

impl Side {
    fn new(band: Band) -> Self {
        Side { band, phase: Phase::Idle }
    }

    fn key_is_down(&self) -> bool {
        matches!(self.phase, Phase::Holding | Phase::Tapping { .. })
    }

    fn update(
        &mut self,
        magnitude:  f64,
        hysteresis: f64,
        timing:     TapTiming,
        now:        Instant,
        out:        &mut Vec<Action>,
    ) {
        let Band { key, engage, strong } = self.band;
        let release = engage * hysteresis;

        self.phase = match self.phase {
            Phase::Idle if magnitude > strong => {
                out.push(Action::KeyDown(key));
                Phase::Holding
            }
            Phase::Idle if magnitude > engage => {
                out.push(Action::KeyDown(key));
                debug!(%key, magnitude, "weak signal, tapping");
                Phase::Tapping { since: now }
            }
            Phase::Idle => Phase::Idle,

            Phase::Holding if magnitude < release => {
                out.push(Action::KeyUp(key));
                Phase::Idle
            }
            Phase::Holding => Phase::Holding,

            Phase::Tapping { .. } if magnitude <= engage => {
                out.push(Action::KeyUp(key));
                Phase::Idle
            }
            // escalate mid-tap: the key is already down, keep it there
            Phase::Tapping { .. } if magnitude > strong => Phase::Holding,
            Phase::Tapping { since } if now.saturating_duration_since(since) >= timing.hold => {
                out.push(Action::KeyUp(key));
                Phase::Waiting { since: now }
            }
            tapping @ Phase::Tapping { .. } => tapping,

            Phase::Waiting { .. } if magnitude <= engage => Phase::Idle,
            Phase::Waiting { .. } if magnitude > strong => {
                out.push(Action::KeyDown(key));
                Phase::Holding
            }
            Phase::Waiting { since } if now.saturating_duration_since(since) >= timing.wait => {
                out.push(Action::KeyDown(key));
                Phase::Tapping { since: now }
            }
            waiting @ Phase::Waiting { .. } => waiting,
        };
    }

    fn release(&mut self, out: &mut Vec<Action>) {
        if self.key_is_down() {
            out.push(Action::KeyUp(self.band.key));
        }
        self.phase = Phase::Idle;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HysteresisHold
// ════════════════════════════════════════════════════════════════════════════

/// Drives the key pair of one axis, e.g. `a`/`d` from lateral lean or
/// `s`/`w` from head pitch.
#[derive(Clone, Debug)]
pub struct HysteresisHold {
    negative:   Side,
    positive:   Side,
    hysteresis: f64,
    timing:     TapTiming,
}

impl HysteresisHold {
    pub fn new(
        negative:   Band,
        positive:   Band,
        hysteresis: f64,
        timing:     TapTiming,
    ) -> Result<Self, BandError> {
        validate(&negative, &positive, hysteresis)?;
        Ok(HysteresisHold {
            negative: Side::new(negative),
            positive: Side::new(positive),
            hysteresis,
            timing,
        })
    }

    /// Advance one frame with the current signal value.
    pub fn update(&mut self, signal: f64, now: Instant) -> Vec<Action> {
        let mut out = Vec::new();
        let signal = if signal.is_finite() { signal } else { 0.0 };
        self.negative.update(-signal, self.hysteresis, self.timing, now, &mut out);
        self.positive.update(signal, self.hysteresis, self.timing, now, &mut out);
        out
    }

    /// Release both keys and clear every tap timer.
    pub fn release_all(&mut self) -> Vec<Action> {
        let mut out = Vec::new();
        self.negative.release(&mut out);
        self.positive.release(&mut out);
        out
    }

    /// Swap in new thresholds.  Keys that are down stay down; they are
    /// re-evaluated against the new bands on the next update.
    pub fn retune(
        &mut self,
        negative:   Band,
        positive:   Band,
        hysteresis: f64,
        timing:     TapTiming,
    ) -> Result<Vec<Action>, BandError> {
        validate(&negative, &positive, hysteresis)?;
        let mut out = Vec::new();
        // a rebound key must not leave the old one stuck down
        if negative.key != self.negative.band.key {
            self.negative.release(&mut out);
        }
        if positive.key != self.positive.band.key {
            self.positive.release(&mut out);
        }
        self.negative.band = negative;
        self.positive.band = positive;
        self.hysteresis = hysteresis;
        self.timing = timing;
        Ok(out)
    }

    /// Keys currently held down by this axis.
    pub fn held_keys(&self) -> impl Iterator<Item = Key> + '_ {
        [&self.negative, &self.positive]
            .into_iter()
            .filter(|s| s.key_is_down())
            .map(|s| s.band.key)
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held_keys().any(|k| k == key)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
