//! Latched gun-gesture lock with a dropout grace period.
//!
//! Entering the lock needs the full gun pose; staying in it only needs the
//! bottom three fingers to remain curled, so the wrist can rotate freely
//! while aiming.  Frames with no hand at all are tolerated for
//! `grace_frames` frames before the lock lets go.

use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked,
}

impl LockState {
    pub fn is_locked(self) -> bool { self == LockState::Locked }
}

/// What the lock needs to know about an observed hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Grip {
    /// Full gun pose (index out, others folded).
    pub gun_pose: bool,
    /// Bottom three fingers curled (rotation tolerant).
    pub curled:   bool,
}

#[derive(Debug, Clone)]
pub struct StickyLock {
    grace_frames:   u32,
    state:          LockState,
    missing_frames: u32,
}

impl StickyLock {
    pub fn new(grace_frames: u32) -> Self {
        StickyLock {
            grace_frames,
            state: LockState::Unlocked,
            missing_frames: 0,
        }
    }

    /// Advance one frame.  `None` means no hand was observed.
    pub fn update(&mut self, hand: Option<Grip>) -> LockState {
        let Some(grip) = hand else {
            if self.state.is_locked() {
                self.missing_frames += 1;
                if self.missing_frames > self.grace_frames {
                    info!(frames = self.missing_frames, "gun unlocked (hand lost)");
                    self.unlock();
                }
            } else {
                self.missing_frames = 0;
            }
            return self.state;
        };

        self.missing_frames = 0;
        match self.state {
            LockState::Unlocked if grip.gun_pose => {
                info!("gun locked");
                self.state = LockState::Locked;
            }
            LockState::Locked if !grip.curled => {
                info!("gun unlocked");
                self.unlock();
            }
            _ => {}
        }
        self.state
    }

    pub fn state(&self) -> LockState { self.state }

    pub fn is_locked(&self) -> bool { self.state.is_locked() }

    /// Consecutive hand-less frames seen while locked.
    pub fn missing_frames(&self) -> u32 { self.missing_frames }

    /// Drop the lock unconditionally (control disabled).
    pub fn reset(&mut self) {
        self.unlock();
    }

    pub fn set_grace_frames(&mut self, grace_frames: u32) {
        self.grace_frames = grace_frames;
    }

    fn unlock(&mut self) {
        self.state = LockState::Unlocked;
        self.missing_frames = 0;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const GUN:     Grip = Grip { gun_pose: true,  curled: true };
    const ROTATED: Grip = Grip { gun_pose: false, curled: true };
    const OPEN:    Grip = Grip { gun_pose: false, curled: false };

    fn locked(grace: u32) -> StickyLock {
        let mut lock = StickyLock::new(grace);
        assert_eq!(lock.update(Some(GUN)), LockState::Locked);
        lock
    }

    #[test]
    fn curl_alone_does_not_lock() {
        let mut lock = StickyLock::new(30);
        assert_eq!(lock.update(Some(ROTATED)), LockState::Unlocked);
        assert_eq!(lock.update(None), LockState::Unlocked);
    }

    #[test]
    fn curl_sustains_lock_without_full_pose() {
        let mut lock = locked(30);
        for _ in 0..50 {
            assert_eq!(lock.update(Some(ROTATED)), LockState::Locked);
        }
    }

    #[test]
    fn opening_the_hand_unlocks() {
        let mut lock = locked(30);
        assert_eq!(lock.update(Some(OPEN)), LockState::Unlocked);
    }

    #[test]
    fn dropout_within_grace_stays_locked() {
        let mut lock = locked(30);
        for _ in 0..30 {
            assert_eq!(lock.update(None), LockState::Locked);
        }
        assert_eq!(lock.update(None), LockState::Unlocked);
    }

    #[test]
    fn every_run_length_up_to_grace_keeps_lock() {
        for grace in [0u32, 1, 5, 30] {
            for n in 0..=grace {
                let mut lock = locked(grace);
                for _ in 0..n {
                    lock.update(None);
                }
                assert!(lock.is_locked(), "grace={} n={}", grace, n);
                lock.update(None);
                if n == grace {
                    assert!(!lock.is_locked(), "grace={} should unlock at {}", grace, n + 1);
                }
            }
        }
    }

    #[test]
    fn observed_hand_resets_dropout_counter() {
        let mut lock = locked(3);
        for _ in 0..3 { lock.update(None); }
        assert_eq!(lock.missing_frames(), 3);
        lock.update(Some(ROTATED));
        assert_eq!(lock.missing_frames(), 0);
        for _ in 0..3 {
            assert!(lock.update(None).is_locked());
        }
    }

    #[test]
    fn reset_forces_unlock() {
        let mut lock = locked(30);
        lock.reset();
        assert!(!lock.is_locked());
        lock.reset();
        assert!(!lock.is_locked());
    }
}
