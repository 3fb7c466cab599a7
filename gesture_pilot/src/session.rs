//! The control session: one owner for every state machine, the cursor drive
//! and the sink adapter.
//!
//! Per frame, in order:
//!
//! 1. hold machines (lateral lean → `a`/`d`, head pitch → `s`/`w`)
//! 2. tongue pulse → `t`
//! 3. right hand: sticky lock → click trigger → cursor samples
//! 4. left hand chord pulse → `ctrl` / `space`
//!
//! While disabled a frame does nothing.  Disabling releases everything.

use std::time::Instant;

use actuation::{SharedSink, SinkAdapter};
use gesture_fsm::{
    Action, DebouncedPulse, EdgeTrigger, Grip, HysteresisHold, Key, KeyedPulse, LockState,
    StickyLock,
};
use landmark_signals::{face, hand, pose, Frame};
use tracing::{debug, info};

use crate::config::{ConfigError, ControlConfig, LateralSource};
use crate::cursor::CursorDrive;

/// What one frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub enabled: bool,
    pub locked:  bool,
    /// Signal on the lateral axis (yaw or lean, per config).
    pub lateral: f64,
    pub pitch:   f64,
    /// Actions that reached the sink this frame, cursor thread excluded.
    pub emitted: usize,
}

pub struct ControlSession {
    cfg:         ControlConfig,
    lateral:     HysteresisHold,
    pitch:       HysteresisHold,
    tongue:      DebouncedPulse,
    chord:       KeyedPulse,
    lock:        StickyLock,
    trigger:     EdgeTrigger,
    cursor:      CursorDrive,
    adapter:     SinkAdapter,
    enabled:     bool,
    sensitivity: f64,
    frames:      u64,
}

impl ControlSession {
    /// A disabled session driving `sink`.
    pub fn new(cfg: ControlConfig, sink: SharedSink) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let adapter = SinkAdapter::new(sink);
        Ok(ControlSession {
            lateral:     cfg.hold.lateral_hold()?,
            pitch:       cfg.hold.pitch_hold()?,
            tongue:      DebouncedPulse::new(cfg.pulse.tongue_debounce),
            chord:       KeyedPulse::new(cfg.pulse.left_debounce),
            lock:        StickyLock::new(cfg.lock.grace_frames),
            trigger:     EdgeTrigger::new(),
            cursor:      CursorDrive::new(cfg.cursor.clone(), adapter.sink()),
            adapter,
            enabled:     false,
            sensitivity: cfg.cursor.sensitivity,
            frames:      0,
            cfg,
        })
    }

    pub fn process_frame(&mut self, frame: &Frame, now: Instant) -> FrameReport {
        self.frames += 1;
        if !self.enabled {
            return FrameReport::default();
        }
        let mut emitted = 0;

        // ── holds ────────────────────────────────────────────────────────
        let (yaw, pitch) = frame.face.as_ref()
            .map(|f| (face::head_yaw(f), face::head_pitch(f)))
            .unwrap_or((0.0, 0.0));
        let lateral = match self.cfg.hold.lateral_source {
            LateralSource::HeadTilt => yaw,
            LateralSource::BodyLean => frame.pose.as_ref().map(pose::body_lean).unwrap_or(0.0),
        };
        let actions = self.lateral.update(lateral, now);
        emitted += self.forward(actions);
        let actions = self.pitch.update(pitch, now);
        emitted += self.forward(actions);

        // ── tongue ───────────────────────────────────────────────────────
        match &frame.face {
            Some(f) => {
                if self.tongue.update(face::mouth_open(f)) {
                    emitted += self.press(self.cfg.pulse.tongue_key);
                }
            }
            None => self.tongue.reset(),
        }

        // ── right hand: lock, click, aim ────────────────────────────────
        let (left, right) = frame.hands_by_side();
        let grip = right.map(|h| Grip {
            gun_pose: hand::is_gun_pose(h),
            curled:   hand::bottom_three_curled(h),
        });
        let state = self.lock.update(grip);
        let thumb = right.map(hand::is_thumb_down);
        if let Some(a) = self.trigger.update(state.is_locked(), thumb) {
            emitted += self.forward([a]);
        }
        if state.is_locked() {
            if let Some(tip) = right.and_then(hand::index_tip) {
                self.cursor.sample(tip.x, tip.y);
            }
        } else {
            self.cursor.stop();
        }

        // ── left hand chords ─────────────────────────────────────────────
        if let Some(l) = left {
            let requested = self.cfg.pulse.chord_key(hand::fingers_down(l));
            if let Some(key) = self.chord.update(requested) {
                emitted += self.press(key);
            }
        }

        let every = self.cfg.telemetry_every;
        if every > 0 && self.frames % every == 0 {
            let (pending_dx, pending_dy) = self.cursor.pending();
            debug!(
                frame = self.frames, yaw, pitch, lateral,
                locked = state.is_locked(), pending_dx, pending_dy,
                "telemetry"
            );
        }

        FrameReport { enabled: true, locked: state.is_locked(), lateral, pitch, emitted }
    }

    /// Turn control on or off.  Turning it off releases the mouse button and
    /// every held key, drops the gun lock and halts the cursor.  Returns
    /// whether the state changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if enabled == self.enabled {
            return false;
        }
        self.enabled = enabled;
        if enabled {
            info!("control enabled");
        } else {
            self.release_everything();
            info!("control disabled");
        }
        true
    }

    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Nudge cursor sensitivity, clamped to the configured range.
    pub fn adjust_sensitivity(&mut self, delta: f64) -> f64 {
        if delta.is_finite() {
            self.sensitivity = self.cfg.cursor.clamp_sensitivity(self.sensitivity + delta);
            self.cursor.set_gain(self.cfg.cursor.gain(self.sensitivity));
            info!(sensitivity = self.sensitivity, "sensitivity changed");
        }
        self.sensitivity
    }

    /// Retune every unit.  An invalid config is rejected whole and the
    /// current tuning stays in place.
    pub fn apply_config(&mut self, cfg: ControlConfig) -> Result<(), ConfigError> {
        cfg.validate()?;
        let timing = cfg.hold.timing();
        let h = cfg.hold.hysteresis;

        let mut released = Vec::new();
        if cfg.hold.lateral_source != self.cfg.hold.lateral_source {
            released.extend(self.lateral.release_all());
        }
        released.extend(self.lateral.retune(
            cfg.hold.lateral.negative.band(), cfg.hold.lateral.positive.band(), h, timing,
        )?);
        released.extend(self.pitch.retune(
            cfg.hold.pitch.negative.band(), cfg.hold.pitch.positive.band(), h, timing,
        )?);
        self.forward(released);

        self.tongue.set_debounce_frames(cfg.pulse.tongue_debounce);
        self.chord.set_debounce_frames(cfg.pulse.left_debounce);
        self.lock.set_grace_frames(cfg.lock.grace_frames);
        self.cursor.retune(cfg.cursor.clone());
        self.sensitivity = cfg.cursor.clamp_sensitivity(self.sensitivity);
        self.cursor.set_gain(cfg.cursor.gain(self.sensitivity));
        self.cfg = cfg;
        info!("config applied");
        Ok(())
    }

    /// Disable, then release anything the sink still holds.  Returns how
    /// many releases the final sweep had to send.
    pub fn shutdown(&mut self) -> usize {
        self.set_enabled(false);
        self.cursor.stop();
        let swept = self.adapter.release_all();
        if swept > 0 {
            info!(swept, "released stragglers on shutdown");
        }
        swept
    }

    pub fn is_enabled(&self) -> bool { self.enabled }

    pub fn sensitivity(&self) -> f64 { self.sensitivity }

    pub fn lock_state(&self) -> LockState { self.lock.state() }

    pub fn frames(&self) -> u64 { self.frames }

    pub fn config(&self) -> &ControlConfig { &self.cfg }

    pub fn held_keys(&self) -> Vec<Key> { self.adapter.held_keys().collect() }

    pub fn mouse_down(&self) -> bool { self.adapter.button_down() }

    pub fn cursor(&self) -> &CursorDrive { &self.cursor }

    fn release_everything(&mut self) {
        let mut out = Vec::new();
        out.extend(self.trigger.force_release());
        self.lock.reset();
        self.cursor.stop();
        out.extend(self.lateral.release_all());
        out.extend(self.pitch.release_all());
        self.tongue.reset();
        self.chord.reset();
        self.forward(out);
    }

    fn forward<I: IntoIterator<Item = Action>>(&mut self, actions: I) -> usize {
        self.adapter.emit_all(actions)
    }

    fn press(&mut self, key: Key) -> usize {
        debug!(%key, "pulse");
        self.adapter.press(key)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
