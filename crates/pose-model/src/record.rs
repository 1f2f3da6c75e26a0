//! Frame records produced by the encoder.

use crate::heuristic::LookDown;
use crate::keypoint::KeypointSet;
use crate::observation::{FrameSize, TrackedObservation};

/// One encoded table row: a tracked person in a frame, or a placeholder
/// for a frame in which nobody was tracked.
///
/// `look_down` is `Some` exactly when the nose and both ears are present.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub frame: u64,
    pub keypoints: KeypointSet,
    pub frame_size: FrameSize,
    pub tracking_id: Option<u64>,
    pub look_down: Option<LookDown>,
}

impl FrameRecord {
    /// Row written for a frame with no (retained) observations.
    pub fn placeholder(frame: u64, frame_size: FrameSize) -> Self {
        Self {
            frame,
            keypoints: KeypointSet::empty(),
            frame_size,
            tracking_id: None,
            look_down: None,
        }
    }

    pub fn from_observation(
        frame: u64,
        frame_size: FrameSize,
        observation: &TrackedObservation,
    ) -> Self {
        Self {
            frame,
            keypoints: observation.keypoints,
            frame_size,
            tracking_id: Some(observation.id),
            look_down: LookDown::evaluate(&observation.keypoints),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.tracking_id.is_none()
    }

    pub fn dist_ear_nose(&self) -> Option<f64> {
        self.look_down.map(|l| l.dist_ear_nose)
    }

    pub fn look_down_flag(&self) -> Option<bool> {
        self.look_down.map(|l| l.look_down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::KeypointName;

    const SIZE: FrameSize = FrameSize {
        width: 1920,
        height: 1080,
    };

    #[test]
    fn placeholder_keeps_only_frame_and_size() {
        let record = FrameRecord::placeholder(12, SIZE);
        assert!(record.is_placeholder());
        assert_eq!(record.frame, 12);
        assert_eq!(record.frame_size, SIZE);
        assert_eq!(record.keypoints, KeypointSet::empty());
        assert_eq!(record.dist_ear_nose(), None);
        assert_eq!(record.look_down_flag(), None);
    }

    #[test]
    fn observation_record_derives_heuristic() {
        let obs = TrackedObservation {
            id: 1,
            keypoints: KeypointSet::empty()
                .with(KeypointName::Nose, 0.0, 100.0)
                .with(KeypointName::LeftEar, 0.0, 90.0)
                .with(KeypointName::RightEar, 0.0, 95.0),
        };
        let record = FrameRecord::from_observation(3, SIZE, &obs);
        assert_eq!(record.tracking_id, Some(1));
        assert_eq!(record.dist_ear_nose(), Some(5.0));
        assert_eq!(record.look_down_flag(), Some(true));
    }

    #[test]
    fn observation_without_ears_has_no_heuristic() {
        let obs = TrackedObservation {
            id: 9,
            keypoints: KeypointSet::empty().with(KeypointName::Nose, 0.0, 100.0),
        };
        let record = FrameRecord::from_observation(0, SIZE, &obs);
        assert!(!record.is_placeholder());
        assert_eq!(record.look_down, None);
    }
}
