//! Debounced single-shot pulses.
//!
//! A pulse fires once per continuous run of `true` frames, after the run has
//! lasted `debounce_frames` frames.  Any `false` frame re-arms it.

use crate::Key;

#[derive(Debug, Clone)]
pub struct DebouncedPulse {
    debounce_frames: u32,
    frames_held:     u32,
    triggered:       bool,
}

impl DebouncedPulse {
    pub fn new(debounce_frames: u32) -> Self {
        DebouncedPulse { debounce_frames, frames_held: 0, triggered: false }
    }

    /// Advance one frame; returns true on the single frame the pulse fires.
    pub fn update(&mut self, active: bool) -> bool {
        if !active {
            self.reset();
            return false;
        }
        self.frames_held = self.frames_held.saturating_add(1);
        if self.frames_held >= self.debounce_frames && !self.triggered {
            self.triggered = true;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.frames_held = 0;
        self.triggered = false;
    }

    pub fn set_debounce_frames(&mut self, debounce_frames: u32) {
        self.debounce_frames = debounce_frames;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// KeyedPulse
// ════════════════════════════════════════════════════════════════════════════

/// A pulse whose input is "which key is currently requested".  Switching
/// from one key to another starts a fresh debounce run.
#[derive(Debug, Clone)]
pub struct KeyedPulse {
    pulse:   DebouncedPulse,
    current: Option<Key>,
}

impl KeyedPulse {
    pub fn new(debounce_frames: u32) -> Self {
        KeyedPulse { pulse: DebouncedPulse::new(debounce_frames), current: None }
    }

    /// Advance one frame; returns the key to tap when the pulse fires.
    pub fn update(&mut self, requested: Option<Key>) -> Option<Key> {
        if requested != self.current {
            self.pulse.reset();
            self.current = requested;
        }
        let key = requested?;
        self.pulse.update(true).then_some(key)
    }

    pub fn reset(&mut self) {
        self.pulse.reset();
        self.current = None;
    }

    pub fn set_debounce_frames(&mut self, debounce_frames: u32) {
        self.pulse.set_debounce_frames(debounce_frames);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn fires(pulse: &mut DebouncedPulse, run: usize) -> usize {
        (0..run).filter(|_| pulse.update(true)).count()
    }

    #[test]
    fn short_runs_never_fire() {
        for len in 0..10 {
            let mut p = DebouncedPulse::new(10);
            assert_eq!(fires(&mut p, len), 0, "len={}", len);
        }
    }

    #[test]
    fn long_runs_fire_exactly_once() {
        for len in [10, 11, 25, 400] {
            let mut p = DebouncedPulse::new(10);
            assert_eq!(fires(&mut p, len), 1, "len={}", len);
        }
    }

    #[test]
    fn fires_on_the_debounce_frame() {
        let mut p = DebouncedPulse::new(3);
        assert!(!p.update(true));
        assert!(!p.update(true));
        assert!(p.update(true));
        assert!(!p.update(true));
    }

    #[test]
    fn separate_runs_fire_separately() {
        let mut p = DebouncedPulse::new(4);
        assert_eq!(fires(&mut p, 6), 1);
        assert!(!p.update(false));
        assert_eq!(fires(&mut p, 4), 1);
        assert!(!p.update(false));
        assert_eq!(fires(&mut p, 3), 0);
    }

    #[test]
    fn keyed_pulse_fires_mapped_key() {
        let mut p = KeyedPulse::new(2);
        assert_eq!(p.update(Some(Key::Ctrl)), None);
        assert_eq!(p.update(Some(Key::Ctrl)), Some(Key::Ctrl));
        assert_eq!(p.update(Some(Key::Ctrl)), None);
    }

    #[test]
    fn keyed_pulse_key_change_restarts_run() {
        let mut p = KeyedPulse::new(2);
        p.update(Some(Key::Ctrl));
        assert_eq!(p.update(Some(Key::Space)), None);
        assert_eq!(p.update(Some(Key::Space)), Some(Key::Space));
        // and back again: a fresh run for ctrl
        assert_eq!(p.update(Some(Key::Ctrl)), None);
        assert_eq!(p.update(Some(Key::Ctrl)), Some(Key::Ctrl));
    }

    #[test]
    fn keyed_pulse_none_rearms() {
        let mut p = KeyedPulse::new(1);
        assert_eq!(p.update(Some(Key::Space)), Some(Key::Space));
        assert_eq!(p.update(None), None);
        assert_eq!(p.update(Some(Key::Space)), Some(Key::Space));
    }
}
