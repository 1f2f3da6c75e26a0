//! Per-frame record encoding.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use lookdown_common::error::{LookdownError, LookdownResult};
use lookdown_pose_model::observation::{FrameObservations, FrameSize, TrackedObservation};
use lookdown_pose_model::record::FrameRecord;
use lookdown_pose_model::table::format_flag;

/// Vertical offset (pixels) between the nose and the overlay label anchor.
const LABEL_OFFSET_PX: f64 = 10.0;

/// Which tracker identities the encoder keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityFilter {
    selected: Option<BTreeSet<u64>>,
}

impl IdentityFilter {
    /// Keep every identity.
    pub fn all() -> Self {
        Self::default()
    }

    /// Keep only the given identities.
    pub fn only(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            selected: Some(ids.into_iter().collect()),
        }
    }

    /// Parse a comma-separated list such as `"1, 3,5"`.
    pub fn parse(input: &str) -> LookdownResult<Self> {
        let invalid = || LookdownError::InvalidIdentityList {
            input: input.to_string(),
        };

        let ids = input
            .split(',')
            .map(|token| token.trim().parse::<u64>().map_err(|_| invalid()))
            .collect::<LookdownResult<BTreeSet<u64>>>()?;
        Ok(Self {
            selected: Some(ids),
        })
    }

    pub fn retains(&self, id: u64) -> bool {
        self.selected.as_ref().map_or(true, |ids| ids.contains(&id))
    }

    /// The selected identities, or `None` when everything is kept.
    pub fn selected(&self) -> Option<&BTreeSet<u64>> {
        self.selected.as_ref()
    }
}

/// A "look_down: <flag>" label to burn into the output video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayAnnotation {
    pub frame: u64,
    pub tracking_id: u64,
    /// Label anchor in pixels: the nose, shifted up by 10 px.
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Output of encoding one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    /// Never empty: a placeholder row stands in for an empty frame.
    pub records: Vec<FrameRecord>,
    pub annotations: Vec<OverlayAnnotation>,
    /// Observations removed by the identity filter.
    pub filtered_out: usize,
}

impl EncodedFrame {
    pub fn is_placeholder(&self) -> bool {
        self.records.len() == 1 && self.records[0].is_placeholder()
    }
}

/// Maps one frame of tracker output to table rows.
#[derive(Debug, Clone)]
pub struct RecordEncoder {
    frame_size: FrameSize,
    filter: IdentityFilter,
}

impl RecordEncoder {
    pub fn new(frame_size: FrameSize) -> Self {
        Self {
            frame_size,
            filter: IdentityFilter::all(),
        }
    }

    pub fn with_identity_filter(mut self, filter: IdentityFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    pub fn identity_filter(&self) -> &IdentityFilter {
        &self.filter
    }

    /// Encode a frame. Filtered identities produce no rows, and a selection
    /// run burns no labels at all.
    pub fn encode_frame(&self, frame: &FrameObservations) -> EncodedFrame {
        let retained: Vec<&TrackedObservation> = frame
            .objects
            .iter()
            .filter(|obs| self.filter.retains(obs.id))
            .collect();
        let filtered_out = frame.objects.len() - retained.len();

        if retained.is_empty() {
            return EncodedFrame {
                records: vec![FrameRecord::placeholder(frame.frame, self.frame_size)],
                annotations: Vec::new(),
                filtered_out,
            };
        }

        let records: Vec<FrameRecord> = retained
            .iter()
            .map(|obs| FrameRecord::from_observation(frame.frame, self.frame_size, obs))
            .collect();
        let annotations = match self.filter.selected() {
            Some(_) => Vec::new(),
            None => records.iter().filter_map(annotate).collect(),
        };

        EncodedFrame {
            records,
            annotations,
            filtered_out,
        }
    }
}

fn annotate(record: &FrameRecord) -> Option<OverlayAnnotation> {
    let look_down = record.look_down_flag()?;
    let nose = record.keypoints.nose()?;
    Some(OverlayAnnotation {
        frame: record.frame,
        tracking_id: record.tracking_id?,
        x: nose.x,
        y: nose.y - LABEL_OFFSET_PX,
        text: format!("look_down: {}", format_flag(look_down)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookdown_pose_model::keypoint::{KeypointName, KeypointSet};

    const SIZE: FrameSize = FrameSize {
        width: 1280,
        height: 720,
    };

    fn person(id: u64, nose_y: f64) -> TrackedObservation {
        TrackedObservation {
            id,
            keypoints: KeypointSet::empty()
                .with(KeypointName::Nose, 200.0, nose_y)
                .with(KeypointName::LeftEar, 180.0, 90.0)
                .with(KeypointName::RightEar, 220.0, 95.0),
        }
    }

    #[test]
    fn empty_frame_yields_single_placeholder() {
        let encoder = RecordEncoder::new(SIZE);
        let encoded = encoder.encode_frame(&FrameObservations::empty(8));
        assert!(encoded.is_placeholder());
        assert_eq!(encoded.records[0].frame, 8);
        assert_eq!(encoded.records[0].frame_size, SIZE);
        assert!(encoded.annotations.is_empty());
    }

    #[test]
    fn one_row_per_observation() {
        let encoder = RecordEncoder::new(SIZE);
        let frame = FrameObservations::new(1, vec![person(1, 100.0), person(2, 80.0)]);
        let encoded = encoder.encode_frame(&frame);

        assert_eq!(encoded.records.len(), 2);
        assert_eq!(encoded.records[0].tracking_id, Some(1));
        assert_eq!(encoded.records[0].look_down_flag(), Some(true));
        assert_eq!(encoded.records[1].tracking_id, Some(2));
        assert_eq!(encoded.records[1].look_down_flag(), Some(false));
        assert_eq!(encoded.filtered_out, 0);
    }

    #[test]
    fn annotations_sit_above_the_nose() {
        let encoder = RecordEncoder::new(SIZE);
        let encoded = encoder.encode_frame(&FrameObservations::new(4, vec![person(5, 100.0)]));

        assert_eq!(
            encoded.annotations,
            vec![OverlayAnnotation {
                frame: 4,
                tracking_id: 5,
                x: 200.0,
                y: 90.0,
                text: "look_down: True".to_string(),
            }]
        );
    }

    #[test]
    fn observation_without_heuristic_gets_no_annotation() {
        let encoder = RecordEncoder::new(SIZE);
        let mut obs = person(3, 100.0);
        obs.keypoints.set(KeypointName::LeftEar, None);
        let encoded = encoder.encode_frame(&FrameObservations::new(0, vec![obs]));
        assert_eq!(encoded.records.len(), 1);
        assert!(encoded.annotations.is_empty());
    }

    #[test]
    fn filter_drops_unselected_identities() {
        let encoder = RecordEncoder::new(SIZE).with_identity_filter(IdentityFilter::only([2]));
        let frame = FrameObservations::new(1, vec![person(1, 100.0), person(2, 100.0)]);
        let encoded = encoder.encode_frame(&frame);

        assert_eq!(encoded.records.len(), 1);
        assert_eq!(encoded.records[0].tracking_id, Some(2));
        assert!(encoded.annotations.is_empty());
        assert_eq!(encoded.filtered_out, 1);
    }

    #[test]
    fn fully_filtered_frame_becomes_placeholder() {
        let encoder = RecordEncoder::new(SIZE).with_identity_filter(IdentityFilter::only([9]));
        let encoded = encoder.encode_frame(&FrameObservations::new(6, vec![person(1, 100.0)]));
        assert!(encoded.is_placeholder());
        assert_eq!(encoded.records[0].frame, 6);
        assert_eq!(encoded.filtered_out, 1);
    }

    #[test]
    fn identity_list_parses_with_spaces() {
        let filter = IdentityFilter::parse(" 1, 3,5 ").unwrap();
        assert!(filter.retains(1));
        assert!(filter.retains(3));
        assert!(filter.retains(5));
        assert!(!filter.retains(2));
        assert_eq!(
            filter.selected().unwrap().iter().copied().collect::<Vec<_>>(),
            vec![1, 3, 5]
        );
    }

    #[test]
    fn identity_list_rejects_non_integers() {
        for bad in ["1,a", "", "1,,2", "-1", "2.5"] {
            match IdentityFilter::parse(bad) {
                Err(LookdownError::InvalidIdentityList { input }) => assert_eq!(input, bad),
                other => panic!("{bad:?} parsed as {other:?}"),
            }
        }
    }

    #[test]
    fn unfiltered_encoder_keeps_everyone() {
        assert!(IdentityFilter::all().retains(12345));
        assert_eq!(IdentityFilter::all().selected(), None);
    }
}
