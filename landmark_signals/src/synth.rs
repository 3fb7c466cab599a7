//! Synthetic landmark sets with known geometry.
//!
//! Used by the test suites of every crate in the workspace and by the
//! keyboard/mouse simulator, which has no camera to feed it real keypoints.

use crate::{face, hand, pose, Landmark, LandmarkSet};

/// MCP x-offsets from the hand center for index, middle, ring and pinky.
const KNUCKLE_OFFSETS: [f64; 4] = [-0.03, -0.01, 0.01, 0.03];

/// A hand centered on `(cx, cy)` (knuckle row) with each digit either
/// extended or folded.  Order of `extended`: thumb, index, middle, ring, pinky.
///
/// A folded thumb points down past its IP joint, so it also reads as
/// "thumb down".
pub fn hand(cx: f64, cy: f64, extended: [bool; 5]) -> LandmarkSet {
    let mut pts = vec![Landmark::default(); hand::HAND_POINTS];

    pts[hand::WRIST]     = Landmark::new(cx, cy + 0.10);
    pts[hand::THUMB_CMC] = Landmark::new(cx - 0.04, cy + 0.08);
    pts[hand::THUMB_MCP] = Landmark::new(cx - 0.06, cy + 0.04);
    pts[hand::THUMB_IP]  = Landmark::new(cx - 0.08, cy);
    pts[hand::THUMB_TIP] = if extended[0] {
        Landmark::new(cx - 0.10, cy - 0.04)
    } else {
        Landmark::new(cx - 0.05, cy + 0.03)
    };

    let fingers = [
        (hand::INDEX_MCP, hand::INDEX_PIP, hand::INDEX_DIP, hand::INDEX_TIP),
        (hand::MIDDLE_MCP, hand::MIDDLE_PIP, hand::MIDDLE_DIP, hand::MIDDLE_TIP),
        (hand::RING_MCP, hand::RING_PIP, hand::RING_DIP, hand::RING_TIP),
        (hand::PINKY_MCP, hand::PINKY_PIP, hand::PINKY_DIP, hand::PINKY_TIP),
    ];
    for (i, (mcp, pip, dip, tip)) in fingers.into_iter().enumerate() {
        let bx = cx + KNUCKLE_OFFSETS[i];
        pts[mcp] = Landmark::new(bx, cy);
        pts[pip] = Landmark::new(bx, cy - 0.04);
        if extended[i + 1] {
            pts[dip] = Landmark::new(bx, cy - 0.07);
            pts[tip] = Landmark::new(bx, cy - 0.10);
        } else {
            pts[dip] = Landmark::new(bx + 0.01, cy - 0.03);
            pts[tip] = Landmark::new(bx, cy - 0.01);
        }
    }

    LandmarkSet::new(pts)
}

/// A right hand in the gun pose whose index fingertip sits at `(tip_x, tip_y)`.
pub fn gun_hand(tip_x: f64, tip_y: f64, thumb_down: bool) -> LandmarkSet {
    let cx = tip_x - KNUCKLE_OFFSETS[0];
    let cy = tip_y + 0.10;
    hand(cx, cy, [!thumb_down, true, false, false, false])
}

/// A face whose classifiers read back `yaw`, `pitch` and the given mouth state.
pub fn face(yaw: f64, pitch: f64, mouth_open: bool) -> LandmarkSet {
    let mut pts = vec![Landmark::new(0.5, 0.5); face::FACE_POINTS];

    pts[face::LEFT_EYE]  = Landmark::new(0.40, 0.40 - yaw / 400.0);
    pts[face::RIGHT_EYE] = Landmark::new(0.60, 0.40 + yaw / 400.0);
    pts[face::FOREHEAD]  = Landmark::new(0.50, 0.20);
    pts[face::CHIN]      = Landmark::new(0.50, 0.70);
    pts[face::NOSE_TIP]  = Landmark::new(0.50, 0.20 + 0.50 * (0.5 + pitch / 100.0));

    let gap = if mouth_open { 0.03 } else { 0.005 };
    pts[face::UPPER_LIP] = Landmark::new(0.50, 0.60);
    pts[face::LOWER_LIP] = Landmark::new(0.50, 0.60 + gap);

    LandmarkSet::new(pts)
}

/// An upright body whose torso center is displaced so that the lean reads `lean`.
pub fn pose(lean: f64) -> LandmarkSet {
    let mut pts = vec![Landmark::new(0.5, 0.5); pose::POSE_POINTS];
    let cx = 0.5 + lean / 100.0;

    pts[pose::LEFT_SHOULDER]  = Landmark::new(cx - 0.10, 0.30);
    pts[pose::RIGHT_SHOULDER] = Landmark::new(cx + 0.10, 0.30);
    pts[pose::LEFT_HIP]       = Landmark::new(cx - 0.08, 0.60);
    pts[pose::RIGHT_HIP]      = Landmark::new(cx + 0.08, 0.60);

    LandmarkSet::new(pts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gun_hand_places_index_tip() {
        let h = gun_hand(0.42, 0.37, false);
        let tip = hand::index_tip(&h).unwrap();
        assert!((tip.x - 0.42).abs() < 1e-9);
        assert!((tip.y - 0.37).abs() < 1e-9);
        assert!(hand::is_gun_pose(&h));
    }
}
