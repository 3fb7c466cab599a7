//! Dual-rate cursor actuation.
//!
//! The frame timeline (~30 Hz) adds pointer deltas to a shared target; a
//! dedicated thread (120 Hz by default) drains a fixed fraction of that
//! target per tick and injects it as whole-pixel relative moves.  The
//! accumulator lock is never held while the sink is called.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use actuation::{apply_shared, SharedSink};
use gesture_fsm::Action;
use tracing::{info, warn};

use crate::config::CursorConfig;

// ════════════════════════════════════════════════════════════════════════════
// CursorAccumulator
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct CursorAccumulator {
    target_dx:     f64,
    target_dy:     f64,
    /// Last sampled pointer position in pixels.
    last_sample:   Option<(f64, f64)>,
    interpolation: f64,
    epsilon:       f64,
}

impl CursorAccumulator {
    pub fn new(interpolation: f64, epsilon: f64) -> Self {
        CursorAccumulator {
            target_dx: 0.0,
            target_dy: 0.0,
            last_sample: None,
            interpolation,
            epsilon,
        }
    }

    /// Record a new pointer position.  The scaled delta since the previous
    /// position is added to the target unless it falls inside the dead zone.
    /// Returns whether anything was added.
    pub fn record(&mut self, px: f64, py: f64, gain: f64, dead_zone: f64) -> bool {
        let added = match self.last_sample {
            Some((lx, ly)) => {
                let dx = (px - lx) * gain;
                let dy = (py - ly) * gain;
                if dx.hypot(dy) < dead_zone {
                    false
                } else {
                    self.target_dx += dx;
                    self.target_dy += dy;
                    true
                }
            }
            None => false,
        };
        self.last_sample = Some((px, py));
        added
    }

    /// One consumer tick.  Returns the whole-pixel move to inject, if any.
    pub fn drain_step(&mut self) -> Option<(i32, i32)> {
        if self.target_dx.abs() <= self.epsilon && self.target_dy.abs() <= self.epsilon {
            self.target_dx = 0.0;
            self.target_dy = 0.0;
            return None;
        }
        let fx = self.target_dx * self.interpolation;
        let fy = self.target_dy * self.interpolation;
        if fx.abs() >= 1.0 || fy.abs() >= 1.0 {
            self.target_dx -= fx;
            self.target_dy -= fy;
            Some((fx.trunc() as i32, fy.trunc() as i32))
        } else {
            // too small to move a pixel; drop it rather than let it creep
            self.target_dx = 0.0;
            self.target_dy = 0.0;
            None
        }
    }

    pub fn pending(&self) -> (f64, f64) { (self.target_dx, self.target_dy) }

    /// Zero the target and forget the last position.
    pub fn clear(&mut self) {
        self.target_dx = 0.0;
        self.target_dy = 0.0;
        self.last_sample = None;
    }

    fn retune(&mut self, interpolation: f64, epsilon: f64) {
        self.interpolation = interpolation;
        self.epsilon = epsilon;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CursorDrive
// ════════════════════════════════════════════════════════════════════════════

struct Worker {
    running: Arc<AtomicBool>,
    exited:  Receiver<()>,
    handle:  JoinHandle<()>,
}

/// Producer half plus lifecycle of the consumer thread.
pub struct CursorDrive {
    acc:    Arc<Mutex<CursorAccumulator>>,
    sink:   SharedSink,
    cfg:    CursorConfig,
    gain:   f64,
    worker: Option<Worker>,
}

impl CursorDrive {
    pub fn new(cfg: CursorConfig, sink: SharedSink) -> Self {
        let acc = CursorAccumulator::new(cfg.interpolation, cfg.epsilon);
        CursorDrive {
            acc: Arc::new(Mutex::new(acc)),
            sink,
            gain: cfg.gain(cfg.sensitivity),
            cfg,
            worker: None,
        }
    }

    /// Feed one fingertip position in normalized image coordinates and make
    /// sure the consumer is running.
    pub fn sample(&mut self, x_norm: f64, y_norm: f64) {
        if !x_norm.is_finite() || !y_norm.is_finite() {
            return;
        }
        let px = x_norm * self.cfg.screen_width as f64;
        let py = y_norm * self.cfg.screen_height as f64;
        self.lock().record(px, py, self.gain, self.cfg.dead_zone_px);
        self.start();
    }

    /// Stop the consumer, discard pending motion and forget the last
    /// position.  Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.lock().clear();
        let Some(worker) = self.worker.take() else { return };

        worker.running.store(false, Ordering::Release);
        match worker.exited.recv_timeout(self.cfg.stop_timeout()) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    warn!("cursor thread panicked");
                }
                info!("cursor thread stopped");
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout_ms = self.cfg.stop_timeout_ms, "cursor thread did not stop in time, detaching");
            }
        }
        // the thread may have drained one last step while we waited
        self.lock().clear();
    }

    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    pub fn gain(&self) -> f64 { self.gain }

    /// Apply new tuning.  Interpolation and epsilon take effect on the next
    /// tick; a new rate applies from the next start.
    pub fn retune(&mut self, cfg: CursorConfig) {
        self.lock().retune(cfg.interpolation, cfg.epsilon);
        self.cfg = cfg;
    }

    pub fn pending(&self) -> (f64, f64) { self.lock().pending() }

    pub fn is_running(&self) -> bool { self.worker.is_some() }

    fn lock(&self) -> MutexGuard<'_, CursorAccumulator> {
        self.acc.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }
        let running = Arc::new(AtomicBool::new(true));
        let (tx, exited) = mpsc::channel();
        let acc = Arc::clone(&self.acc);
        let sink = SharedSink::clone(&self.sink);
        let flag = Arc::clone(&running);
        let interval = self.cfg.interval();

        match thread::Builder::new()
            .name("cursor".into())
            .spawn(move || drain_loop(acc, sink, flag, interval, tx))
        {
            Ok(handle) => {
                info!(rate_hz = self.cfg.rate_hz, "cursor thread started");
                self.worker = Some(Worker { running, exited, handle });
            }
            Err(e) => warn!(error = %e, "cannot start cursor thread"),
        }
    }
}

impl Drop for CursorDrive {
    fn drop(&mut self) {
        self.stop();
    }
}

fn drain_loop(
    acc:      Arc<Mutex<CursorAccumulator>>,
    sink:     SharedSink,
    running:  Arc<AtomicBool>,
    interval: Duration,
    exited:   Sender<()>,
) {
    while running.load(Ordering::Acquire) {
        let started = Instant::now();
        let step = acc.lock().unwrap_or_else(PoisonError::into_inner).drain_step();
        if let Some((dx, dy)) = step {
            apply_shared(&sink, Action::MouseMove { dx, dy });
        }
        if let Some(rest) = interval.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
    let _ = exited.send(());
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use actuation::{share, RecordingSink};

    fn acc_with_target(dx: f64, dy: f64) -> CursorAccumulator {
        let mut acc = CursorAccumulator::new(0.15, 0.1);
        acc.record(0.0, 0.0, 1.0, 0.0);
        acc.record(dx, dy, 1.0, 0.0);
        acc
    }

    #[test]
    fn target_drains_to_zero_without_overshoot() {
        let mut acc = acc_with_target(100.0, -40.0);
        let mut total = (0i64, 0i64);
        let mut steps = 0;
        let mut remaining = 100f64.hypot(40.0);
        while let Some((dx, dy)) = acc.drain_step() {
            total.0 += dx as i64;
            total.1 += dy as i64;
            let (px, py) = acc.pending();
            let now = px.hypot(py);
            assert!(now < remaining || now == 0.0, "step {steps}: {now} after {remaining}");
            remaining = now;
            steps += 1;
            assert!(steps < 200);
        }
        assert_eq!(acc.pending(), (0.0, 0.0));
        assert!(total.0 <= 100 && total.0 >= 75, "x moved {}", total.0);
        assert!(total.1 >= -40 && total.1 <= -20, "y moved {}", total.1);
    }

    #[test]
    fn negative_fractions_truncate_toward_zero() {
        let mut acc = acc_with_target(-20.0, 0.0);
        assert_eq!(acc.drain_step(), Some((-3, 0)));
        assert_eq!(acc.drain_step(), Some((-2, 0)));
        let (tx, _) = acc.pending();
        assert!((tx - (-20.0 + 3.0 + 2.55)).abs() < 1e-9);
    }

    #[test]
    fn sub_pixel_fraction_is_dropped() {
        let mut acc = acc_with_target(5.0, 0.0);
        assert_eq!(acc.drain_step(), None);
        assert_eq!(acc.pending(), (0.0, 0.0));
    }

    #[test]
    fn residue_within_epsilon_is_cleared() {
        let mut acc = acc_with_target(0.05, -0.05);
        assert_eq!(acc.drain_step(), None);
        assert_eq!(acc.pending(), (0.0, 0.0));
    }

    #[test]
    fn cancelling_samples_leave_nothing_pending() {
        let mut acc = CursorAccumulator::new(0.15, 0.1);
        acc.record(0.0, 0.0, 1.0, 0.0);
        acc.record(5.0, 0.0, 1.0, 0.0);
        acc.record(0.05, 0.0, 1.0, 0.0);
        assert!((acc.pending().0 - 0.05).abs() < 1e-9);
        assert_eq!(acc.drain_step(), None);
        assert_eq!(acc.pending(), (0.0, 0.0));
    }

    #[test]
    fn first_sample_only_sets_position() {
        let mut acc = CursorAccumulator::new(0.15, 0.1);
        assert!(!acc.record(500.0, 500.0, 1.25, 0.8));
        assert_eq!(acc.pending(), (0.0, 0.0));
        assert!(acc.record(510.0, 500.0, 1.25, 0.8));
        assert_eq!(acc.pending(), (12.5, 0.0));
    }

    #[test]
    fn dead_zone_discards_tremor_but_tracks_position() {
        let mut acc = CursorAccumulator::new(0.15, 0.1);
        acc.record(100.0, 100.0, 1.25, 0.8);
        assert!(!acc.record(100.5, 100.0, 1.25, 0.8));
        assert_eq!(acc.pending(), (0.0, 0.0));
        // delta measured from the tremor position, not the earlier one
        assert!(acc.record(101.5, 100.0, 1.25, 0.8));
        assert_eq!(acc.pending(), (1.25, 0.0));
    }

    #[test]
    fn clear_forgets_last_position() {
        let mut acc = acc_with_target(50.0, 50.0);
        acc.clear();
        assert_eq!(acc.pending(), (0.0, 0.0));
        assert!(!acc.record(900.0, 900.0, 1.0, 0.0));
        assert_eq!(acc.pending(), (0.0, 0.0));
    }

    fn fast_cfg() -> CursorConfig {
        CursorConfig { rate_hz: 500, ..CursorConfig::default() }
    }

    fn wait_until(limit: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < limit {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        done()
    }

    #[test]
    fn consumer_thread_delivers_sampled_motion() {
        let rec = RecordingSink::new();
        let mut drive = CursorDrive::new(fast_cfg(), share(rec.clone()));
        drive.sample(0.50, 0.5);
        assert!(drive.is_running());
        drive.sample(0.55, 0.5); // 96 px × 1.25

        assert!(wait_until(Duration::from_secs(2), || drive.pending() == (0.0, 0.0)));
        let (x, y) = rec.total_motion();
        assert!((90..=120).contains(&x), "moved {}", x);
        assert_eq!(y, 0);
        drive.stop();
    }

    #[test]
    fn stop_discards_pending_and_halts_thread() {
        let rec = RecordingSink::new();
        let mut drive = CursorDrive::new(CursorConfig { rate_hz: 10, ..CursorConfig::default() }, share(rec.clone()));
        drive.sample(0.0, 0.0);
        drive.sample(1.0, 1.0);
        drive.stop();
        assert!(!drive.is_running());
        assert_eq!(drive.pending(), (0.0, 0.0));

        let seen = rec.actions().len();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(rec.actions().len(), seen);

        drive.stop();
        assert!(!drive.is_running());
    }

    #[test]
    fn relock_does_not_jump() {
        let rec = RecordingSink::new();
        let mut drive = CursorDrive::new(fast_cfg(), share(rec.clone()));
        drive.sample(0.1, 0.1);
        drive.stop();
        drive.sample(0.9, 0.9);
        assert_eq!(drive.pending(), (0.0, 0.0));
        drive.stop();
        assert_eq!(rec.total_motion(), (0, 0));
    }

    #[test]
    fn gain_scales_motion() {
        let mut drive = CursorDrive::new(
            CursorConfig { rate_hz: 1, stop_timeout_ms: 2000, ..CursorConfig::default() },
            share(actuation::NullSink),
        );
        drive.set_gain(2.0);
        drive.sample(0.0, 0.0);
        drive.sample(0.0, 0.1);
        let (_, dy) = drive.pending();
        // 108 px × 2, minus at most one drained step
        assert!(dy > 180.0 && dy <= 216.0 + 1e-9, "pending {}", dy);
        drive.stop();
    }
}
