//! Keyboard and mouse stand-in for the landmark tracker, using `minifb`.
//!
//! The window synthesizes landmark frames at ~30 fps:
//!
//! | Input | Synthesized as |
//! |---|---|
//! | `G` | toggle the right hand in gun pose |
//! | mouse position | index fingertip |
//! | left mouse button (held) | thumb down |
//! | `←` / `→` (held, `Shift` for weak) | head tilt |
//! | `↑` / `↓` (held) | head pitch up / down |
//! | `M` (held) | mouth open |
//! | `1` / `4` (held) | left hand with one / four fingers folded |
//! | `E` | toggle control |
//! | `=` / `-` | sensitivity up / down |
//! | `Q` / `Esc` | quit |

use std::sync::mpsc::Sender;
use std::time::Duration;

use landmark_signals::{synth, Frame};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use tracing::{info, warn};

use crate::source::{FrameSource, SourceEvent};

const WIN_W: usize = 640;
const WIN_H: usize = 360;

const BG_COLOR:       u32 = 0xFF1A1A2E;
const LOCKED_COLOR:   u32 = 0xFF16213E;
const CROSSHAIR:      u32 = 0xFFEEEEEE;
const FIRING:         u32 = 0xFFFF5555;
const LAMP_ON:        u32 = 0xFF55FF88;
const LAMP_OFF:       u32 = 0xFF444444;

const STRONG_TILT: f64 = 10.0;
const WEAK_TILT:   f64 = 5.0;
const PITCH_UP:    f64 = 14.0;
const PITCH_DOWN:  f64 = -7.0;

pub struct SimWindow {
    /// Sensitivity change per `=` / `-` press.
    pub sensitivity_step: f64,
    /// Initial state of the enabled lamp.
    pub enabled:          bool,
}

impl SimWindow {
    pub fn new(sensitivity_step: f64, enabled: bool) -> Self {
        SimWindow { sensitivity_step, enabled }
    }
}

struct SimState {
    gun:     bool,
    enabled: bool,
}

impl FrameSource for SimWindow {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let mut window = match Window::new(
            "gesture pilot: tracker simulation",
            WIN_W, WIN_H,
            WindowOptions { resize: false, ..WindowOptions::default() },
        ) {
            Ok(w) => w,
            Err(e) => {
                warn!(error = %e, "cannot open simulation window");
                let _ = tx.send(SourceEvent::Quit);
                return;
            }
        };
        window.limit_update_rate(Some(Duration::from_millis(33)));
        info!("simulation window open");

        let mut buf = vec![BG_COLOR; WIN_W * WIN_H];
        let mut state = SimState { gun: false, enabled: self.enabled };

        while window.is_open() {
            let one_shot = |k: Key| window.is_key_pressed(k, KeyRepeat::No);
            let held     = |k: Key| window.is_key_down(k);

            if one_shot(Key::Q) || one_shot(Key::Escape) {
                break;
            }
            let mut events = Vec::new();
            if one_shot(Key::G) {
                state.gun = !state.gun;
            }
            if one_shot(Key::E) {
                state.enabled = !state.enabled;
                events.push(SourceEvent::ToggleEnabled);
            }
            if one_shot(Key::Equal) {
                events.push(SourceEvent::AdjustSensitivity(self.sensitivity_step));
            }
            if one_shot(Key::Minus) {
                events.push(SourceEvent::AdjustSensitivity(-self.sensitivity_step));
            }

            let tilt = if held(Key::LeftShift) || held(Key::RightShift) { WEAK_TILT } else { STRONG_TILT };
            let yaw = match (held(Key::Left), held(Key::Right)) {
                (true, false) => -tilt,
                (false, true) => tilt,
                _ => 0.0,
            };
            let pitch = match (held(Key::Up), held(Key::Down)) {
                (true, false) => PITCH_UP,
                (false, true) => PITCH_DOWN,
                _ => 0.0,
            };
            let mouth = held(Key::M);
            let thumb = window.get_mouse_down(MouseButton::Left);
            let (mx, my) = window.get_mouse_pos(MouseMode::Clamp).unwrap_or((0.0, 0.0));
            let (tip_x, tip_y) = (mx as f64 / WIN_W as f64, my as f64 / WIN_H as f64);

            let mut frame = Frame {
                face: Some(synth::face(yaw, pitch, mouth)),
                ..Frame::default()
            };
            if state.gun {
                frame.hands.push(synth::gun_hand(tip_x, tip_y, thumb));
            }
            let chord = if held(Key::Key1) {
                Some([true, true, true, true, false])
            } else if held(Key::Key4) {
                Some([true, false, false, false, false])
            } else {
                None
            };
            if let Some(extended) = chord {
                // further left in the image than any gun hand
                frame.hands.push(synth::hand(0.02, 0.6, extended));
            }
            events.push(SourceEvent::Frame { frame, at: None });

            for ev in events {
                if tx.send(ev).is_err() {
                    return;
                }
            }

            render(&mut buf, &state, mx as usize, my as usize, thumb);
            if let Err(e) = window.update_with_buffer(&buf, WIN_W, WIN_H) {
                warn!(error = %e, "simulation window update failed");
                break;
            }
        }
        info!("simulation window closed");
        let _ = tx.send(SourceEvent::Quit);
    }
}

fn render(buf: &mut [u32], state: &SimState, mx: usize, my: usize, thumb: bool) {
    buf.fill(if state.gun { LOCKED_COLOR } else { BG_COLOR });

    if state.gun {
        let color = if thumb { FIRING } else { CROSSHAIR };
        fill_rect(buf, mx.saturating_sub(10), my, 21, 1, color);
        fill_rect(buf, mx, my.saturating_sub(10), 1, 21, color);
    }
    let lamp = if state.enabled { LAMP_ON } else { LAMP_OFF };
    fill_rect(buf, 8, 8, 12, 12, lamp);
}

fn fill_rect(buf: &mut [u32], x: usize, y: usize, w: usize, h: usize, color: u32) {
    for row in y..(y + h).min(WIN_H) {
        let start = row * WIN_W + x.min(WIN_W);
        let end = row * WIN_W + (x + w).min(WIN_W);
        buf[start..end].fill(color);
    }
}
