//! Body-pose classifier: lateral lean of the torso.

use crate::LandmarkSet;

pub const LEFT_SHOULDER:  usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_HIP:       usize = 23;
pub const RIGHT_HIP:      usize = 24;

/// Points in a complete body pose.
pub const POSE_POINTS: usize = 33;

pub const LEAN_SCALE: f64 = 100.0;

/// Horizontal offset of the torso center from the middle of the frame.
/// Positive when the body leans right.
pub fn body_lean(pose: &LandmarkSet) -> f64 {
    let (Some(ls), Some(rs), Some(lh), Some(rh)) = (
        pose.get(LEFT_SHOULDER),
        pose.get(RIGHT_SHOULDER),
        pose.get(LEFT_HIP),
        pose.get(RIGHT_HIP),
    ) else {
        return 0.0;
    };
    let shoulders = (ls.x + rs.x) / 2.0;
    let hips = (lh.x + rh.x) / 2.0;
    ((shoulders + hips) / 2.0 - 0.5) * LEAN_SCALE
}
