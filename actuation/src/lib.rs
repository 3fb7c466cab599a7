//! # actuation
//!
//! The output side of the controller: anything that can press keys, move
//! the pointer, or click.  State machines upstream produce
//! [`gesture_fsm::Action`]s; a [`SinkAdapter`] filters out redundant ones and
//! forwards the rest to an [`ActuationSink`].
//!
//! ## Sinks
//!
//! | Sink | Use |
//! |---|---|
//! | [`NullSink`] | discard everything |
//! | [`RecordingSink`] | keep every call in a shared log (tests, replays) |
//! | [`LogSink`] | emit each call as a `tracing` event (dry run) |
//! | `EnigoSink` | real OS input, feature `enigo` |
//!
//! Sink calls never fail from the caller's point of view; a backend that
//! cannot deliver an action logs it and carries on.

use std::sync::{Arc, Mutex, PoisonError};

use gesture_fsm::{Action, Key};
use tracing::{debug, info};

pub mod adapter;
#[cfg(feature = "enigo")]
pub mod enigo_sink;

pub use adapter::SinkAdapter;
#[cfg(feature = "enigo")]
pub use enigo_sink::EnigoSink;

// ════════════════════════════════════════════════════════════════════════════
// ActuationSink: OS injection, logging, or recording for tests
// ════════════════════════════════════════════════════════════════════════════

pub trait ActuationSink: Send {
    fn key_down(&mut self, key: Key);
    fn key_up(&mut self, key: Key);
    /// Relative pointer motion in pixels.
    fn mouse_move(&mut self, dx: i32, dy: i32);
    fn mouse_button_down(&mut self);
    fn mouse_button_up(&mut self);

    fn apply(&mut self, action: Action) {
        match action {
            Action::KeyDown(k)              => self.key_down(k),
            Action::KeyUp(k)                => self.key_up(k),
            Action::MouseMove { dx, dy }    => self.mouse_move(dx, dy),
            Action::MouseDown               => self.mouse_button_down(),
            Action::MouseUp                 => self.mouse_button_up(),
        }
    }
}

/// A sink shared between the frame timeline and the cursor thread.
pub type SharedSink = Arc<Mutex<dyn ActuationSink>>;

pub fn share<S: ActuationSink + 'static>(sink: S) -> SharedSink {
    Arc::new(Mutex::new(sink))
}

/// Lock a shared sink and apply one action.
pub fn apply_shared(sink: &SharedSink, action: Action) {
    sink.lock().unwrap_or_else(PoisonError::into_inner).apply(action);
}

// ── null backend ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ActuationSink for NullSink {
    fn key_down(&mut self, _k: Key)            {}
    fn key_up(&mut self, _k: Key)              {}
    fn mouse_move(&mut self, _dx: i32, _dy: i32) {}
    fn mouse_button_down(&mut self)            {}
    fn mouse_button_up(&mut self)              {}
}

// ── recording backend ─────────────────────────────────────────────────────

/// Appends every call to a log that survives being moved into a
/// [`SharedSink`]; clone the handle first to inspect it afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<Action>>>,
}

impl RecordingSink {
    pub fn new() -> Self { Self::default() }

    /// Snapshot of everything recorded so far.
    pub fn actions(&self) -> Vec<Action> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<Action> {
        std::mem::take(&mut *self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Net pointer motion over everything recorded.
    pub fn total_motion(&self) -> (i64, i64) {
        self.actions().iter().fold((0, 0), |(x, y), a| match *a {
            Action::MouseMove { dx, dy } => (x + dx as i64, y + dy as i64),
            _ => (x, y),
        })
    }

    fn push(&self, action: Action) {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).push(action);
    }
}

impl ActuationSink for RecordingSink {
    fn key_down(&mut self, key: Key)          { self.push(Action::KeyDown(key)) }
    fn key_up(&mut self, key: Key)            { self.push(Action::KeyUp(key)) }
    fn mouse_move(&mut self, dx: i32, dy: i32) { self.push(Action::MouseMove { dx, dy }) }
    fn mouse_button_down(&mut self)           { self.push(Action::MouseDown) }
    fn mouse_button_up(&mut self)             { self.push(Action::MouseUp) }
}

// ── tracing backend ───────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ActuationSink for LogSink {
    fn key_down(&mut self, key: Key)  { info!(target: "actuation", %key, "key down") }
    fn key_up(&mut self, key: Key)    { info!(target: "actuation", %key, "key up") }
    fn mouse_move(&mut self, dx: i32, dy: i32) {
        debug!(target: "actuation", dx, dy, "mouse move")
    }
    fn mouse_button_down(&mut self)   { info!(target: "actuation", "mouse down") }
    fn mouse_button_up(&mut self)     { info!(target: "actuation", "mouse up") }
}
