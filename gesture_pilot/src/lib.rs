//! # gesture_pilot
//!
//! Hands-free game control.  Per-frame hand, face and pose landmarks from an
//! external tracker are turned into keyboard holds, key taps, mouse clicks
//! and smooth relative cursor motion.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Head tilt (or body lean) left / right | hold `a` / `d`; tapped when the lean is weak |
//! | Head pitch up / down | hold `w` / `s` |
//! | Mouth open | tap `t` |
//! | Right hand gun pose | lock aiming; the index fingertip drives the cursor |
//! | Thumb down while locked | left mouse button |
//! | Left hand, one finger folded | tap `ctrl` |
//! | Left hand, four fingers folded | tap `space` |
//!
//! ## Feature flags
//!
//! * (default) replay a JSON-lines landmark recording; actions are logged.
//! * `sim` keyboard and mouse simulation window (`minifb`).
//! * `enigo` inject actions into the OS.

pub mod app;
pub mod config;
pub mod cursor;
pub mod session;
#[cfg(feature = "sim")]
pub mod sim;
pub mod source;
