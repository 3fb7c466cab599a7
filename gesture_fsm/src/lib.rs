//! # gesture_fsm
//!
//! Small, independent state machines that turn noisy per-frame gesture
//! signals into stable, edge-exact input actions.
//!
//! Each machine owns only the memory it needs to detect transitions and
//! exposes an `update(signal)` that returns the actions to emit for that
//! frame.  None of them touch I/O or threads; the caller composes them and
//! forwards the actions to a sink.
//!
//! | Machine | Input | Output |
//! |---|---|---|
//! | [`StickyLock`] | gun pose + curl, or a dropped hand | `Locked` / `Unlocked` |
//! | [`EdgeTrigger`] | thumb down | `MouseDown` / `MouseUp` |
//! | [`DebouncedPulse`], [`KeyedPulse`] | boolean / mapped key | one press per run |
//! | [`HysteresisHold`] | signed scalar | `KeyDown` / `KeyUp` with tap rhythm |

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod edge_trigger;
pub mod hysteresis;
pub mod pulse;
pub mod sticky_lock;

pub use edge_trigger::EdgeTrigger;
pub use hysteresis::{Band, BandError, HysteresisHold, TapTiming};
pub use pulse::{DebouncedPulse, KeyedPulse};
pub use sticky_lock::{Grip, LockState, StickyLock};

// ════════════════════════════════════════════════════════════════════════════
// Key
// ════════════════════════════════════════════════════════════════════════════

/// Keyboard keys the controller can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    W,
    A,
    S,
    D,
    Ctrl,
    Space,
    T,
}

impl Key {
    pub fn name(self) -> &'static str {
        match self {
            Key::W     => "w",
            Key::A     => "a",
            Key::S     => "s",
            Key::D     => "d",
            Key::Ctrl  => "ctrl",
            Key::Space => "space",
            Key::T     => "t",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Action
// ════════════════════════════════════════════════════════════════════════════

/// One call on the input-injection sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    KeyDown(Key),
    KeyUp(Key),
    /// Relative pointer motion in whole pixels.
    MouseMove { dx: i32, dy: i32 },
    MouseDown,
    MouseUp,
}

impl Action {
    /// The two actions that make up a single key tap.
    pub fn press(key: Key) -> [Action; 2] {
        [Action::KeyDown(key), Action::KeyUp(key)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_serde_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Key::Space).unwrap(), "\"space\"");
        let k: Key = serde_json::from_str("\"ctrl\"").unwrap();
        assert_eq!(k, Key::Ctrl);
    }

    #[test]
    fn press_is_down_then_up() {
        assert_eq!(Action::press(Key::T), [Action::KeyDown(Key::T), Action::KeyUp(Key::T)]);
    }
}
