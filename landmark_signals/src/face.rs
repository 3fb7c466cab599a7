//! Face-mesh classifiers: head tilt, head pitch and mouth opening.

use crate::LandmarkSet;

// ════════════════════════════════════════════════════════════════════════════
// Face mesh indices
// ════════════════════════════════════════════════════════════════════════════

pub const NOSE_TIP:  usize = 1;
pub const FOREHEAD:  usize = 10;
pub const UPPER_LIP: usize = 13;
pub const LOWER_LIP: usize = 14;
pub const LEFT_EYE:  usize = 33;
pub const CHIN:      usize = 152;
pub const RIGHT_EYE: usize = 263;

/// Points in a complete (unrefined) face mesh.
pub const FACE_POINTS: usize = 468;

pub const YAW_SCALE:   f64 = 200.0;
pub const PITCH_SCALE: f64 = 100.0;

/// Inner-lip separation, in normalized units, above which the mouth is open.
pub const MOUTH_OPEN_GAP: f64 = 0.015;

/// Head tilt from the vertical offset between the eyes.  Positive when the
/// right eye sits lower, i.e. the head leans right.
pub fn head_yaw(face: &LandmarkSet) -> f64 {
    match (face.get(LEFT_EYE), face.get(RIGHT_EYE)) {
        (Some(l), Some(r)) => (r.y - l.y) * YAW_SCALE,
        _ => 0.0,
    }
}

/// Nose height within the forehead→chin span, recentered on zero.
/// Positive when the head tips back.
pub fn head_pitch(face: &LandmarkSet) -> f64 {
    let (Some(nose), Some(chin), Some(forehead)) =
        (face.get(NOSE_TIP), face.get(CHIN), face.get(FOREHEAD))
    else {
        return 0.0;
    };
    let span = chin.y - forehead.y;
    if span <= 0.0 {
        return 0.0;
    }
    ((nose.y - forehead.y) / span - 0.5) * PITCH_SCALE
}

pub fn mouth_open(face: &LandmarkSet) -> bool {
    match (face.get(UPPER_LIP), face.get(LOWER_LIP)) {
        (Some(upper), Some(lower)) => (upper.y - lower.y).abs() > MOUTH_OPEN_GAP,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{synth, Landmark};

    #[test]
    fn yaw_and_pitch_read_back() {
        let f = synth::face(-6.5, 14.0, false);
        assert!((head_yaw(&f) + 6.5).abs() < 1e-6);
        assert!((head_pitch(&f) - 14.0).abs() < 1e-6);
    }

    #[test]
    fn level_face_is_neutral() {
        let f = synth::face(0.0, 0.0, false);
        assert!(head_yaw(&f).abs() < 1e-9);
        assert!(head_pitch(&f).abs() < 1e-9);
        assert!(!mouth_open(&f));
    }

    #[test]
    fn open_mouth_detected() {
        assert!(mouth_open(&synth::face(0.0, 0.0, true)));
    }

    #[test]
    fn inverted_span_gives_zero_pitch() {
        let mut pts = vec![Landmark::new(0.5, 0.5); FACE_POINTS];
        pts[FOREHEAD] = Landmark::new(0.5, 0.8);
        pts[CHIN]     = Landmark::new(0.5, 0.2);
        assert_eq!(head_pitch(&LandmarkSet::new(pts)), 0.0);
    }

    #[test]
    fn truncated_mesh_is_neutral() {
        let stub = LandmarkSet::new(vec![Landmark::new(0.5, 0.5); 20]);
        assert_eq!(head_yaw(&stub), 0.0);
        assert_eq!(head_pitch(&stub), 0.0);
        assert!(!mouth_open(&stub));
    }
}
