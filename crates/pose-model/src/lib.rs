//! Lookdown Pose Model
//!
//! Defines the core data contracts shared by every stage:
//! - **Keypoints:** The 17 COCO body keypoints, each present or absent
//! - **Observations:** What the external pose/tracker stage reports per frame
//! - **Frame records:** One table row per (frame, identity), or a placeholder
//! - **Table:** The CSV layout that hands records from encoding to analysis
//!
//! All coordinates are image pixels with `y` growing downward.

pub mod heuristic;
pub mod keypoint;
pub mod observation;
pub mod record;
pub mod table;

pub use heuristic::*;
pub use keypoint::*;
pub use observation::*;
pub use record::*;
pub use table::*;
