//! # landmark_signals
//!
//! Per-frame landmark data and the pure geometric classifiers that turn one
//! snapshot of keypoints into a gesture signal.
//!
//! Coordinates are normalized to the camera frame: `x` grows to the right,
//! `y` grows **downward**, both in `[0, 1]`.  `z` is optional relative depth.
//!
//! Every classifier is total.  A set that is missing a required point yields
//! the neutral value (`false`, `0.0` or `None`) instead of an error, so a
//! half-tracked frame never aborts the control pipeline.
//!
//! | Module | Entity | Signals |
//! |---|---|---|
//! | [`hand`] | 21-point hand | finger extension, gun pose, thumb down, bottom-three curl, fingers down |
//! | [`face`] | face mesh | head yaw (tilt), head pitch, mouth open |
//! | [`pose`] | 33-point body | lateral lean |
//! | [`synth`] | all | synthetic sets for tests and the simulator |

use serde::{Deserialize, Serialize};

pub mod face;
pub mod hand;
pub mod pose;
pub mod synth;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// A single tracked keypoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64) -> Self {
        Landmark { x, y, z: 0.0 }
    }

    /// Planar distance, ignoring depth.
    pub fn distance(&self, other: &Landmark) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSet
// ════════════════════════════════════════════════════════════════════════════

/// The ordered keypoints of one tracked entity (a hand, the face or the body)
/// for one frame.  Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        LandmarkSet { points }
    }

    /// Point `index`, or `None` when the detector did not supply it.
    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied()
    }

    pub fn len(&self) -> usize { self.points.len() }

    pub fn is_empty(&self) -> bool { self.points.is_empty() }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        LandmarkSet { points }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// Everything the detector produced for one processed video frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frame {
    /// Zero or more hands, in detector order.
    pub hands: Vec<LandmarkSet>,
    pub face:  Option<LandmarkSet>,
    pub pose:  Option<LandmarkSet>,
}

impl Frame {
    /// Split the detected hands into `(left, right)`.  See [`assign_hands`].
    pub fn hands_by_side(&self) -> (Option<&LandmarkSet>, Option<&LandmarkSet>) {
        assign_hands(&self.hands)
    }
}

/// Decide which detected hand is the left (chord) hand and which is the
/// right (gun) hand.
///
/// * no hands → neither
/// * a single hand → it is treated as the right hand
/// * two or more → the first two are ordered by wrist `x`; the one further
///   left in the (mirrored) image is the left hand
pub fn assign_hands(hands: &[LandmarkSet]) -> (Option<&LandmarkSet>, Option<&LandmarkSet>) {
    match hands {
        [] => (None, None),
        [only] => (None, Some(only)),
        [first, second, ..] => {
            let wrist_x = |h: &LandmarkSet| h.get(hand::WRIST).map(|p| p.x).unwrap_or(0.0);
            if wrist_x(first) < wrist_x(second) {
                (Some(first), Some(second))
            } else {
                (Some(second), Some(first))
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
