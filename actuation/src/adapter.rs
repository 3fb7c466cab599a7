//! Deduplicating front for a shared sink.
//!
//! State machines are edge-exact on their own, but several of them can
//! drive the same key (a tap pulse and a hold, or a retune that rebinds a
//! key).  The adapter keeps the authoritative held set so the OS never sees
//! a second press for a key that is already down or a release for one that
//! is not.

use std::collections::BTreeSet;

use gesture_fsm::{Action, Key};
use tracing::debug;

use crate::{apply_shared, SharedSink};

pub struct SinkAdapter {
    sink:        SharedSink,
    held:        BTreeSet<Key>,
    button_down: bool,
}

impl SinkAdapter {
    pub fn new(sink: SharedSink) -> Self {
        SinkAdapter { sink, held: BTreeSet::new(), button_down: false }
    }

    /// Forward one action unless it would repeat the current state.
    /// Returns whether it reached the sink.
    pub fn emit(&mut self, action: Action) -> bool {
        let forward = match action {
            Action::KeyDown(k)           => self.held.insert(k),
            Action::KeyUp(k)             => self.held.remove(&k),
            Action::MouseDown            => !std::mem::replace(&mut self.button_down, true),
            Action::MouseUp              => std::mem::replace(&mut self.button_down, false),
            Action::MouseMove { dx, dy } => dx != 0 || dy != 0,
        };
        if forward {
            apply_shared(&self.sink, action);
        } else {
            debug!(?action, "suppressed redundant action");
        }
        forward
    }

    /// Forward a batch.  Returns how many reached the sink.
    pub fn emit_all<I: IntoIterator<Item = Action>>(&mut self, actions: I) -> usize {
        actions.into_iter().filter(|a| self.emit(*a)).count()
    }

    /// Tap a key: down then up.  A key already held is only released.
    pub fn press(&mut self, key: Key) -> usize {
        self.emit_all(Action::press(key))
    }

    /// Release the button and every key still held.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        if self.emit(Action::MouseUp) {
            released += 1;
        }
        for key in std::mem::take(&mut self.held) {
            apply_shared(&self.sink, Action::KeyUp(key));
            released += 1;
        }
        released
    }

    pub fn held_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.held.iter().copied()
    }

    pub fn is_held(&self, key: Key) -> bool { self.held.contains(&key) }

    pub fn button_down(&self) -> bool { self.button_down }

    /// The underlying sink, for sharing with the cursor thread.
    pub fn sink(&self) -> SharedSink { SharedSink::clone(&self.sink) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{share, RecordingSink};

    fn adapter() -> (SinkAdapter, RecordingSink) {
        let rec = RecordingSink::new();
        (SinkAdapter::new(share(rec.clone())), rec)
    }

    #[test]
    fn repeated_key_down_reaches_sink_once() {
        let (mut a, rec) = adapter();
        assert!(a.emit(Action::KeyDown(Key::W)));
        assert!(!a.emit(Action::KeyDown(Key::W)));
        assert!(a.emit(Action::KeyUp(Key::W)));
        assert!(!a.emit(Action::KeyUp(Key::W)));
        assert_eq!(rec.actions(), vec![Action::KeyDown(Key::W), Action::KeyUp(Key::W)]);
    }

    #[test]
    fn stray_release_is_dropped() {
        let (mut a, rec) = adapter();
        a.emit(Action::KeyUp(Key::A));
        a.emit(Action::MouseUp);
        assert!(rec.actions().is_empty());
    }

    #[test]
    fn button_edges_are_deduplicated() {
        let (mut a, rec) = adapter();
        let sent = a.emit_all([Action::MouseDown, Action::MouseDown, Action::MouseUp, Action::MouseUp]);
        assert_eq!(sent, 2);
        assert_eq!(rec.actions(), vec![Action::MouseDown, Action::MouseUp]);
    }

    #[test]
    fn press_taps_even_while_nothing_held() {
        let (mut a, rec) = adapter();
        assert_eq!(a.press(Key::Space), 2);
        assert_eq!(a.press(Key::Space), 2);
        assert_eq!(rec.actions().len(), 4);
        assert!(!a.is_held(Key::Space));
    }

    #[test]
    fn zero_motion_is_skipped() {
        let (mut a, rec) = adapter();
        a.emit(Action::MouseMove { dx: 0, dy: 0 });
        a.emit(Action::MouseMove { dx: 0, dy: 2 });
        assert_eq!(rec.actions(), vec![Action::MouseMove { dx: 0, dy: 2 }]);
    }

    #[test]
    fn release_all_lets_go_of_everything() {
        let (mut a, rec) = adapter();
        a.emit_all([Action::KeyDown(Key::D), Action::KeyDown(Key::W), Action::MouseDown]);
        rec.take();
        assert_eq!(a.release_all(), 3);
        let after = rec.actions();
        assert!(after.contains(&Action::MouseUp));
        assert!(after.contains(&Action::KeyUp(Key::D)));
        assert!(after.contains(&Action::KeyUp(Key::W)));
        assert_eq!(a.held_keys().count(), 0);
        assert_eq!(a.release_all(), 0);
    }
}
