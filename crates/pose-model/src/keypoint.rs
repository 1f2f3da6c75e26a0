//! COCO body keypoints.
//!
//! A [`KeypointSet`] always holds exactly [`KEYPOINT_COUNT`] slots in COCO
//! order. Each slot is either a detected [`Point`] or `None`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of keypoints in a COCO pose.
pub const KEYPOINT_COUNT: usize = 17;

/// Named keypoint, in the order the pose model emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeypointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointName {
    /// All keypoints in COCO order.
    pub const ALL: [KeypointName; KEYPOINT_COUNT] = [
        KeypointName::Nose,
        KeypointName::LeftEye,
        KeypointName::RightEye,
        KeypointName::LeftEar,
        KeypointName::RightEar,
        KeypointName::LeftShoulder,
        KeypointName::RightShoulder,
        KeypointName::LeftElbow,
        KeypointName::RightElbow,
        KeypointName::LeftWrist,
        KeypointName::RightWrist,
        KeypointName::LeftHip,
        KeypointName::RightHip,
        KeypointName::LeftKnee,
        KeypointName::RightKnee,
        KeypointName::LeftAnkle,
        KeypointName::RightAnkle,
    ];

    /// Position in the keypoint set.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in table column prefixes and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            KeypointName::Nose => "nose",
            KeypointName::LeftEye => "left-eye",
            KeypointName::RightEye => "right-eye",
            KeypointName::LeftEar => "left-ear",
            KeypointName::RightEar => "right-ear",
            KeypointName::LeftShoulder => "left-shoulder",
            KeypointName::RightShoulder => "right-shoulder",
            KeypointName::LeftElbow => "left-elbow",
            KeypointName::RightElbow => "right-elbow",
            KeypointName::LeftWrist => "left-wrist",
            KeypointName::RightWrist => "right-wrist",
            KeypointName::LeftHip => "left-hip",
            KeypointName::RightHip => "right-hip",
            KeypointName::LeftKnee => "left-knee",
            KeypointName::RightKnee => "right-knee",
            KeypointName::LeftAnkle => "left-ankle",
            KeypointName::RightAnkle => "right-ankle",
        }
    }

    pub fn x_column(self) -> String {
        format!("{}_x", self.as_str())
    }

    pub fn y_column(self) -> String {
        format!("{}_y", self.as_str())
    }
}

impl fmt::Display for KeypointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a keypoint name is not one of the 17 COCO names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown keypoint '{0}'")]
pub struct UnknownKeypoint(pub String);

impl FromStr for KeypointName {
    type Err = UnknownKeypoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeypointName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownKeypoint(s.to_string()))
    }
}

/// A detected 2D keypoint position in pixels.
///
/// Serialized as a two-element `[x, y]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Fixed-size, ordered set of optional keypoints.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeypointSet(pub [Option<Point>; KEYPOINT_COUNT]);

impl KeypointSet {
    /// A set with every keypoint absent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: KeypointName) -> Option<Point> {
        self.0[name.index()]
    }

    pub fn set(&mut self, name: KeypointName, point: Option<Point>) {
        self.0[name.index()] = point;
    }

    /// Builder-style variant of [`KeypointSet::set`].
    pub fn with(mut self, name: KeypointName, x: f64, y: f64) -> Self {
        self.set(name, Some(Point::new(x, y)));
        self
    }

    pub fn nose(&self) -> Option<Point> {
        self.get(KeypointName::Nose)
    }

    /// Iterate `(name, point)` pairs in COCO order.
    pub fn iter(&self) -> impl Iterator<Item = (KeypointName, Option<Point>)> + '_ {
        KeypointName::ALL
            .into_iter()
            .map(move |name| (name, self.get(name)))
    }

    /// Whether every keypoint is present.
    pub fn is_complete(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_coco_order() {
        assert_eq!(KeypointName::ALL[0], KeypointName::Nose);
        assert_eq!(KeypointName::ALL[3], KeypointName::LeftEar);
        assert_eq!(KeypointName::ALL[4], KeypointName::RightEar);
        assert_eq!(KeypointName::ALL[16], KeypointName::RightAnkle);
        for (i, name) in KeypointName::ALL.iter().enumerate() {
            assert_eq!(name.index(), i);
        }
    }

    #[test]
    fn names_parse_back() {
        for name in KeypointName::ALL {
            assert_eq!(name.as_str().parse::<KeypointName>().unwrap(), name);
        }
        let err = "left_ear".parse::<KeypointName>().unwrap_err();
        assert_eq!(err.to_string(), "unknown keypoint 'left_ear'");
    }

    #[test]
    fn column_names_use_dash_names() {
        assert_eq!(KeypointName::LeftShoulder.x_column(), "left-shoulder_x");
        assert_eq!(KeypointName::Nose.y_column(), "nose_y");
    }

    #[test]
    fn keypoint_set_json_uses_pairs_and_nulls() {
        let set = KeypointSet::empty().with(KeypointName::Nose, 10.0, 20.5);
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.starts_with("[[10.0,20.5],null,"));

        let parsed: KeypointSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn keypoint_set_rejects_wrong_length() {
        let short = "[[1.0,2.0],null]";
        assert!(serde_json::from_str::<KeypointSet>(short).is_err());
    }
}
