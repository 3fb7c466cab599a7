//! Tuning for every unit of the controller.
//!
//! `ControlConfig::default()` is the stock tuning.  A JSON file may override
//! any subset of fields; missing fields keep their defaults.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gesture_fsm::{Band, BandError, HysteresisHold, Key, TapTiming};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("cannot parse config {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error(transparent)]
    Band(#[from] BandError),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("key '{0}' is bound to more than one hold or pulse")]
    KeyOverlap(Key),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

// ════════════════════════════════════════════════════════════════════════════
// ControlConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub hold:      HoldConfig,
    pub pulse:     PulseConfig,
    pub lock:      LockConfig,
    pub cursor:    CursorConfig,
    /// Frames between telemetry lines; 0 turns them off.
    pub telemetry_every: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            hold:   HoldConfig::default(),
            pulse:  PulseConfig::default(),
            lock:   LockConfig::default(),
            cursor: CursorConfig::default(),
            telemetry_every: 30,
        }
    }
}

impl ControlConfig {
    /// Read a JSON config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
        let cfg: ControlConfig = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_owned(), source })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hold.lateral_hold()?;
        self.hold.pitch_hold()?;
        self.cursor.validate()?;

        let mut hold_keys = BTreeSet::new();
        for key in self.hold.keys() {
            if !hold_keys.insert(key) {
                return Err(ConfigError::KeyOverlap(key));
            }
        }
        for key in self.pulse.keys() {
            if hold_keys.contains(&key) {
                return Err(ConfigError::KeyOverlap(key));
            }
        }
        if self.pulse.one_finger_key == self.pulse.four_finger_key {
            return Err(invalid("pulse", "left-hand chords share one key"));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Holds
// ════════════════════════════════════════════════════════════════════════════

/// Which signal drives the lateral `a`/`d` axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateralSource {
    #[default]
    HeadTilt,
    BodyLean,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    pub key:    Key,
    pub engage: f64,
    /// Defaults to `engage`: no tap regime.
    #[serde(default)]
    pub strong: Option<f64>,
}

impl BandConfig {
    pub fn band(&self) -> Band {
        Band { key: self.key, engage: self.engage, strong: self.strong.unwrap_or(self.engage) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub negative: BandConfig,
    pub positive: BandConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldConfig {
    pub lateral_source: LateralSource,
    pub lateral:        AxisConfig,
    pub pitch:          AxisConfig,
    pub hysteresis:     f64,
    pub tap_hold_ms:    u64,
    pub tap_wait_ms:    u64,
}

impl Default for HoldConfig {
    fn default() -> Self {
        HoldConfig {
            lateral_source: LateralSource::HeadTilt,
            lateral: AxisConfig {
                negative: BandConfig { key: Key::A, engage: 3.0, strong: Some(8.0) },
                positive: BandConfig { key: Key::D, engage: 3.0, strong: Some(8.0) },
            },
            // head down is negative pitch
            pitch: AxisConfig {
                negative: BandConfig { key: Key::S, engage: 5.0,  strong: None },
                positive: BandConfig { key: Key::W, engage: 12.0, strong: None },
            },
            hysteresis:  0.7,
            tap_hold_ms: 1000,
            tap_wait_ms: 75,
        }
    }
}

impl HoldConfig {
    pub fn timing(&self) -> TapTiming {
        TapTiming {
            hold: Duration::from_millis(self.tap_hold_ms),
            wait: Duration::from_millis(self.tap_wait_ms),
        }
    }

    pub fn lateral_hold(&self) -> Result<HysteresisHold, BandError> {
        HysteresisHold::new(
            self.lateral.negative.band(), self.lateral.positive.band(),
            self.hysteresis, self.timing(),
        )
    }

    pub fn pitch_hold(&self) -> Result<HysteresisHold, BandError> {
        HysteresisHold::new(
            self.pitch.negative.band(), self.pitch.positive.band(),
            self.hysteresis, self.timing(),
        )
    }

    fn keys(&self) -> impl Iterator<Item = Key> {
        [self.lateral.negative.key, self.lateral.positive.key,
         self.pitch.negative.key,   self.pitch.positive.key].into_iter()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pulses / lock
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub tongue_key:       Key,
    pub tongue_debounce:  u32,
    pub one_finger_key:   Key,
    pub four_finger_key:  Key,
    pub left_debounce:    u32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        PulseConfig {
            tongue_key:      Key::T,
            tongue_debounce: 10,
            one_finger_key:  Key::Ctrl,
            four_finger_key: Key::Space,
            left_debounce:   3,
        }
    }
}

impl PulseConfig {
    fn keys(&self) -> impl Iterator<Item = Key> {
        [self.tongue_key, self.one_finger_key, self.four_finger_key].into_iter()
    }

    /// Key for a left-hand chord, by number of fingers folded down.
    pub fn chord_key(&self, fingers_down: Option<u8>) -> Option<Key> {
        match fingers_down {
            Some(1) => Some(self.one_finger_key),
            Some(4) => Some(self.four_finger_key),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Hand-less frames tolerated before the gun lock lets go.
    pub grace_frames: u32,
}

impl Default for LockConfig {
    fn default() -> Self { LockConfig { grace_frames: 30 } }
}

// ════════════════════════════════════════════════════════════════════════════
// Cursor
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub rate_hz:           u32,
    pub interpolation:     f64,
    pub epsilon:           f64,
    pub dead_zone_px:      f64,
    pub screen_width:      u32,
    pub screen_height:     u32,
    pub sensitivity:       f64,
    pub sensitivity_scale: f64,
    pub sensitivity_min:   f64,
    pub sensitivity_max:   f64,
    pub sensitivity_step:  f64,
    pub stop_timeout_ms:   u64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        CursorConfig {
            rate_hz:           120,
            interpolation:     0.15,
            epsilon:           0.1,
            dead_zone_px:      0.8,
            screen_width:      1920,
            screen_height:     1080,
            sensitivity:       0.5,
            sensitivity_scale: 2.5,
            sensitivity_min:   0.1,
            sensitivity_max:   1.0,
            sensitivity_step:  0.1,
            stop_timeout_ms:   500,
        }
    }
}

impl CursorConfig {
    pub fn gain(&self, sensitivity: f64) -> f64 {
        sensitivity * self.sensitivity_scale
    }

    pub fn clamp_sensitivity(&self, sensitivity: f64) -> f64 {
        sensitivity.clamp(self.sensitivity_min, self.sensitivity_max)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz.max(1) as f64)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_hz == 0 {
            return Err(invalid("cursor.rate_hz", "must be positive"));
        }
        if !(self.interpolation > 0.0 && self.interpolation <= 1.0) {
            return Err(invalid("cursor.interpolation", format!("{} not in (0, 1]", self.interpolation)));
        }
        if !(self.epsilon >= 0.0) || !(self.dead_zone_px >= 0.0) {
            return Err(invalid("cursor", "epsilon and dead zone must be non-negative"));
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(invalid("cursor.screen", "zero-sized screen"));
        }
        if !(self.sensitivity_scale > 0.0) || !(self.sensitivity_step > 0.0) {
            return Err(invalid("cursor", "sensitivity scale and step must be positive"));
        }
        if !(self.sensitivity_min > 0.0 && self.sensitivity_min <= self.sensitivity_max) {
            return Err(invalid(
                "cursor.sensitivity_min",
                format!("range [{}, {}] is empty or non-positive", self.sensitivity_min, self.sensitivity_max),
            ));
        }
        if !(self.sensitivity >= self.sensitivity_min && self.sensitivity <= self.sensitivity_max) {
            return Err(invalid("cursor.sensitivity", format!("{} outside its range", self.sensitivity)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ControlConfig::default().validate().unwrap();
    }

    #[test]
    fn defaults_survive_json() {
        let cfg = ControlConfig::default();
        let text = serde_json::to_string_pretty(&cfg).unwrap();
        let back: ControlConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg: ControlConfig = serde_json::from_str(
            r#"{ "cursor": { "rate_hz": 240 }, "hold": { "lateral_source": "body_lean" } }"#,
        ).unwrap();
        assert_eq!(cfg.cursor.rate_hz, 240);
        assert_eq!(cfg.cursor.interpolation, 0.15);
        assert_eq!(cfg.hold.lateral_source, LateralSource::BodyLean);
        assert_eq!(cfg.hold.pitch.positive.key, Key::W);
        assert_eq!(cfg.lock.grace_frames, 30);
    }

    #[test]
    fn pitch_bands_are_continuous() {
        let hold = HoldConfig::default();
        let s = hold.pitch.negative.band();
        assert_eq!(s.strong, s.engage);
        let d = hold.lateral.positive.band();
        assert_eq!((d.engage, d.strong), (3.0, 8.0));
    }

    #[test]
    fn overlapping_keys_are_rejected() {
        let mut cfg = ControlConfig::default();
        cfg.pulse.tongue_key = Key::W;
        assert!(matches!(cfg.validate(), Err(ConfigError::KeyOverlap(Key::W))));
    }

    #[test]
    fn hold_axes_cannot_share_a_key() {
        let mut cfg = ControlConfig::default();
        cfg.hold.lateral.positive.key = Key::W;
        assert!(matches!(cfg.validate(), Err(ConfigError::KeyOverlap(Key::W))));

        let mut cfg = ControlConfig::default();
        cfg.hold.pitch.negative.key = Key::A;
        assert!(matches!(cfg.validate(), Err(ConfigError::KeyOverlap(Key::A))));
    }

    #[test]
    fn bad_hysteresis_is_rejected() {
        let mut cfg = ControlConfig::default();
        cfg.hold.hysteresis = 1.5;
        assert!(matches!(cfg.validate(), Err(ConfigError::Band(BandError::Hysteresis(_)))));
    }

    #[test]
    fn sensitivity_outside_range_is_rejected() {
        let mut cfg = ControlConfig::default();
        cfg.cursor.sensitivity = 1.2;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { field: "cursor.sensitivity", .. })));
    }

    #[test]
    fn chord_keys_follow_finger_count() {
        let p = PulseConfig::default();
        assert_eq!(p.chord_key(Some(1)), Some(Key::Ctrl));
        assert_eq!(p.chord_key(Some(4)), Some(Key::Space));
        for n in [0u8, 2, 3, 5] {
            assert_eq!(p.chord_key(Some(n)), None);
        }
        assert_eq!(p.chord_key(None), None);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ControlConfig::load("/nonexistent/gesture_pilot.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/gesture_pilot.json"));
    }
}
