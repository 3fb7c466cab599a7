//! Hand classifiers over the 21-point hand skeleton.

use crate::{Landmark, LandmarkSet};

// ════════════════════════════════════════════════════════════════════════════
// Hand landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Points in a complete hand set.
pub const HAND_POINTS: usize = 21;

/// Interior angle at the PIP joint above which a finger counts as extended.
pub const EXTENDED_ANGLE_DEG: f64 = 140.0;

/// A curled finger's tip stays within this multiple of its MCP→wrist reach.
pub const CURL_REACH_RATIO: f64 = 1.8;

// ════════════════════════════════════════════════════════════════════════════
// Finger
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb, Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky,
    ];

    /// `(base, middle, tip)` joints used by the extension test.  The thumb has
    /// no PIP; its IP joint plays that role.
    pub fn joints(self) -> (usize, usize, usize) {
        match self {
            Finger::Thumb  => (THUMB_MCP, THUMB_IP, THUMB_TIP),
            Finger::Index  => (INDEX_MCP, INDEX_PIP, INDEX_TIP),
            Finger::Middle => (MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP),
            Finger::Ring   => (RING_MCP, RING_PIP, RING_TIP),
            Finger::Pinky  => (PINKY_MCP, PINKY_PIP, PINKY_TIP),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Geometry helpers
// ════════════════════════════════════════════════════════════════════════════

/// Angle in degrees at `vertex` between the rays to `a` and `b`.
///
/// The small bias in the denominator keeps coincident points finite; they
/// come out at 90°, i.e. "not extended".
pub fn joint_angle(a: Landmark, vertex: Landmark, b: Landmark) -> f64 {
    let (ax, ay) = (a.x - vertex.x, a.y - vertex.y);
    let (bx, by) = (b.x - vertex.x, b.y - vertex.y);
    let dot = ax * bx + ay * by;
    let norms = ax.hypot(ay) * bx.hypot(by) + 1e-6;
    (dot / norms).clamp(-1.0, 1.0).acos().to_degrees()
}

// ════════════════════════════════════════════════════════════════════════════
// Classifiers
// ════════════════════════════════════════════════════════════════════════════

/// True when the angle at the middle joint exceeds [`EXTENDED_ANGLE_DEG`].
pub fn finger_extended(hand: &LandmarkSet, finger: Finger) -> bool {
    let (base, mid, tip) = finger.joints();
    match (hand.get(base), hand.get(mid), hand.get(tip)) {
        (Some(b), Some(m), Some(t)) => joint_angle(t, m, b) > EXTENDED_ANGLE_DEG,
        _ => false,
    }
}

/// Index out, middle/ring/pinky folded.  The thumb is free.
pub fn is_gun_pose(hand: &LandmarkSet) -> bool {
    if hand.len() < HAND_POINTS {
        return false;
    }
    finger_extended(hand, Finger::Index)
        && !finger_extended(hand, Finger::Middle)
        && !finger_extended(hand, Finger::Ring)
        && !finger_extended(hand, Finger::Pinky)
}

/// Thumb tip below the thumb IP joint in image space.
pub fn is_thumb_down(hand: &LandmarkSet) -> bool {
    match (hand.get(THUMB_TIP), hand.get(THUMB_IP)) {
        (Some(tip), Some(ip)) => tip.y > ip.y,
        _ => false,
    }
}

/// Rotation-tolerant curl test for the bottom three fingers: each is curled
/// when its tip is closer to the wrist than [`CURL_REACH_RATIO`] times its
/// MCP; the hand counts as curled when at least two of the three are.
pub fn bottom_three_curled(hand: &LandmarkSet) -> bool {
    let Some(wrist) = hand.get(WRIST) else { return false };

    let curled = |tip: usize, mcp: usize| -> Option<bool> {
        let tip = hand.get(tip)?;
        let mcp = hand.get(mcp)?;
        Some(tip.distance(&wrist) < mcp.distance(&wrist) * CURL_REACH_RATIO)
    };

    let checks = [
        curled(MIDDLE_TIP, MIDDLE_MCP),
        curled(RING_TIP, RING_MCP),
        curled(PINKY_TIP, PINKY_MCP),
    ];
    if checks.iter().any(Option::is_none) {
        return false;
    }
    checks.iter().filter(|c| **c == Some(true)).count() >= 2
}

/// How many of the five digits are folded (not extended).  `None` when the
/// hand is incomplete.
pub fn fingers_down(hand: &LandmarkSet) -> Option<u8> {
    if hand.len() < HAND_POINTS {
        return None;
    }
    let down = Finger::ALL.iter()
        .filter(|f| !finger_extended(hand, **f))
        .count();
    Some(down as u8)
}

/// The index fingertip, which steers the cursor.
pub fn index_tip(hand: &LandmarkSet) -> Option<Landmark> {
    hand.get(INDEX_TIP)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
