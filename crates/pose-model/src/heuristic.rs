//! The "looking down" head-pose heuristic.
//!
//! Image `y` grows downward, so a nose with a larger `y` than both ears sits
//! below them and the head is tilted down.

use crate::keypoint::{KeypointName, KeypointSet};

/// Result of evaluating the heuristic on one keypoint set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookDown {
    /// `nose.y - max(left_ear.y, right_ear.y)`.
    pub dist_ear_nose: f64,
    /// `dist_ear_nose >= 0`.
    pub look_down: bool,
}

impl LookDown {
    /// Evaluate the heuristic. Returns `None` unless the nose and both ears
    /// are present; absent keypoints are never treated as zero.
    pub fn evaluate(keypoints: &KeypointSet) -> Option<Self> {
        let nose = keypoints.get(KeypointName::Nose)?;
        let left_ear = keypoints.get(KeypointName::LeftEar)?;
        let right_ear = keypoints.get(KeypointName::RightEar)?;

        let dist_ear_nose = nose.y - left_ear.y.max(right_ear.y);
        Some(Self {
            dist_ear_nose,
            look_down: dist_ear_nose >= 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn head(nose_y: f64, left_ear_y: f64, right_ear_y: f64) -> KeypointSet {
        KeypointSet::empty()
            .with(KeypointName::Nose, 50.0, nose_y)
            .with(KeypointName::LeftEar, 40.0, left_ear_y)
            .with(KeypointName::RightEar, 60.0, right_ear_y)
    }

    #[test]
    fn nose_below_ears_looks_down() {
        let result = LookDown::evaluate(&head(100.0, 90.0, 95.0)).unwrap();
        assert!((result.dist_ear_nose - 5.0).abs() < 1e-9);
        assert!(result.look_down);
    }

    #[test]
    fn nose_above_ears_looks_up() {
        let result = LookDown::evaluate(&head(80.0, 90.0, 95.0)).unwrap();
        assert!((result.dist_ear_nose + 15.0).abs() < 1e-9);
        assert!(!result.look_down);
    }

    #[test]
    fn nose_level_with_lower_ear_counts_as_down() {
        let result = LookDown::evaluate(&head(95.0, 90.0, 95.0)).unwrap();
        assert_eq!(result.dist_ear_nose, 0.0);
        assert!(result.look_down);
    }

    #[test]
    fn missing_ear_propagates_absence() {
        let mut keypoints = head(100.0, 90.0, 95.0);
        keypoints.set(KeypointName::RightEar, None);
        assert_eq!(LookDown::evaluate(&keypoints), None);

        let mut keypoints = head(100.0, 90.0, 95.0);
        keypoints.set(KeypointName::Nose, None);
        assert_eq!(LookDown::evaluate(&keypoints), None);
    }

    proptest! {
        #[test]
        fn look_down_matches_sign_of_distance(
            nose in -2000.0f64..2000.0,
            left in -2000.0f64..2000.0,
            right in -2000.0f64..2000.0,
        ) {
            let result = LookDown::evaluate(&head(nose, left, right)).unwrap();
            prop_assert_eq!(result.dist_ear_nose, nose - left.max(right));
            prop_assert_eq!(result.look_down, result.dist_ear_nose >= 0.0);
        }
    }
}
