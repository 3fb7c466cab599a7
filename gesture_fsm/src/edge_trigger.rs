//! Thumb press/release edge detector driving the mouse button.

use crate::Action;

/// Emits `MouseDown` on a thumb-down edge and `MouseUp` on the matching
/// thumb-up edge.  Steady signals emit nothing.
#[derive(Debug, Clone, Default)]
pub struct EdgeTrigger {
    last_down: bool,
    pressed:   bool,
}

impl EdgeTrigger {
    pub fn new() -> Self { Self::default() }

    /// Advance one frame.
    ///
    /// `active` is false whenever the owning lock is not engaged, which
    /// releases the button.  `thumb_down` is `None` when the hand dropped
    /// out for this frame; the trigger then keeps its state.
    pub fn update(&mut self, active: bool, thumb_down: Option<bool>) -> Option<Action> {
        if !active {
            return self.force_release();
        }
        let down = thumb_down?;

        let action = match (self.last_down, down) {
            (false, true) if !self.pressed => {
                self.pressed = true;
                Some(Action::MouseDown)
            }
            (true, false) if self.pressed => {
                self.pressed = false;
                Some(Action::MouseUp)
            }
            _ => None,
        };
        self.last_down = down;
        action
    }

    /// Release the button if it is down and forget the last thumb reading.
    /// Safe to call at any time; returns `MouseUp` only when something was held.
    pub fn force_release(&mut self) -> Option<Action> {
        self.last_down = false;
        if self.pressed {
            self.pressed = false;
            Some(Action::MouseUp)
        } else {
            None
        }
    }

    pub fn is_pressed(&self) -> bool { self.pressed }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn run(trigger: &mut EdgeTrigger, seq: &[bool]) -> Vec<Action> {
        seq.iter().filter_map(|&d| trigger.update(true, Some(d))).collect()
    }

    #[test]
    fn press_and_release_once() {
        let mut t = EdgeTrigger::new();
        let out = run(&mut t, &[false, true, true, true, false, false]);
        assert_eq!(out, vec![Action::MouseDown, Action::MouseUp]);
        assert!(!t.is_pressed());
    }

    #[test]
    fn emissions_match_transition_counts() {
        // deterministic pseudo-random sequences
        let mut seed = 0x2545_f491_u32;
        for _ in 0..50 {
            let seq: Vec<bool> = (0..64).map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                seed & 3 == 0
            }).collect();

            let mut rises = 0;
            let mut falls = 0;
            let mut prev = false;
            for &d in &seq {
                if !prev && d { rises += 1; }
                if prev && !d { falls += 1; }
                prev = d;
            }

            let mut t = EdgeTrigger::new();
            let out = run(&mut t, &seq);
            let downs = out.iter().filter(|a| **a == Action::MouseDown).count();
            let ups   = out.iter().filter(|a| **a == Action::MouseUp).count();
            assert_eq!(downs, rises);
            assert_eq!(ups, falls);
        }
    }

    #[test]
    fn force_release_is_exactly_once() {
        let mut t = EdgeTrigger::new();
        t.update(true, Some(true));
        assert_eq!(t.force_release(), Some(Action::MouseUp));
        assert_eq!(t.force_release(), None);
    }

    #[test]
    fn force_release_when_idle_emits_nothing() {
        let mut t = EdgeTrigger::new();
        assert_eq!(t.force_release(), None);
    }

    #[test]
    fn inactive_lock_releases() {
        let mut t = EdgeTrigger::new();
        assert_eq!(t.update(true, Some(true)), Some(Action::MouseDown));
        assert_eq!(t.update(false, Some(true)), Some(Action::MouseUp));
        assert_eq!(t.update(false, Some(true)), None);
    }

    #[test]
    fn dropped_hand_keeps_button_state() {
        let mut t = EdgeTrigger::new();
        t.update(true, Some(true));
        assert_eq!(t.update(true, None), None);
        assert!(t.is_pressed());
        assert_eq!(t.update(true, Some(false)), Some(Action::MouseUp));
    }

    #[test]
    fn held_thumb_after_release_fires_again() {
        let mut t = EdgeTrigger::new();
        t.update(true, Some(true));
        t.force_release();
        // last reading was forgotten, so a still-down thumb reads as a new edge
        assert_eq!(t.update(true, Some(true)), Some(Action::MouseDown));
    }
}
