//! Observations reported by the external pose/tracker stage.
//!
//! The stage exports a JSONL detection stream: a `# {header}` comment line
//! followed by one JSON object per frame.
//!
//! ```text
//! # {"schema_version":"1.0","frame_width":1280,"frame_height":720}
//! {"frame":0,"objects":[]}
//! {"frame":1,"objects":[{"id":3,"keypoints":[[612.0,188.5],null,...]}]}
//! ```

use serde::{Deserialize, Serialize};

use lookdown_common::config::TrackerParams;

use crate::keypoint::KeypointSet;

/// Schema version written by current exporters.
pub const DETECTION_STREAM_SCHEMA: &str = "1.0";

/// Pixel dimensions of the source video. Constant for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

/// One tracked person in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedObservation {
    /// Tracker-assigned identity, stable across frames.
    pub id: u64,
    pub keypoints: KeypointSet,
}

/// Everything the tracker reported for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameObservations {
    pub frame: u64,
    #[serde(default)]
    pub objects: Vec<TrackedObservation>,
}

impl FrameObservations {
    pub fn new(frame: u64, objects: Vec<TrackedObservation>) -> Self {
        Self { frame, objects }
    }

    /// A frame in which nothing was tracked.
    pub fn empty(frame: u64) -> Self {
        Self::new(frame, Vec::new())
    }
}

/// First line of a detection stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionStreamHeader {
    pub schema_version: String,
    pub frame_width: u32,
    pub frame_height: u32,

    /// Tracker settings the exporter ran with, when it recorded them.
    #[serde(default)]
    pub tracker: Option<TrackerParams>,
}

impl DetectionStreamHeader {
    pub fn frame_size(&self) -> FrameSize {
        FrameSize {
            width: self.frame_width,
            height: self.frame_height,
        }
    }
}

/// Parse the `# {json}` header line.
pub fn parse_header_line(line: &str) -> Result<DetectionStreamHeader, serde_json::Error> {
    let json = line.trim().trim_start_matches('#').trim_start();
    serde_json::from_str(json)
}

/// Parse one frame line.
pub fn parse_frame_line(line: &str) -> Result<FrameObservations, serde_json::Error> {
    serde_json::from_str(line.trim())
}
