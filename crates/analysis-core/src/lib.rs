//! Lookdown Analysis Core
//!
//! Turns a loaded pose table into per-identity statistics:
//! - **Preprocessing:** Ordered, typed cleaning steps over table rows
//! - **Concentration:** Look-down counts and concentration rate per identity
//! - **Trajectories:** Per-keypoint coordinate series for one identity
//!
//! This crate is pure computation: no I/O. All inputs are data; all
//! outputs are data.

pub mod concentration;
pub mod flag;
pub mod pipeline;
pub mod trajectory;

pub use concentration::{
    ConcentrationAnalyzer, ConcentrationReport, IdentityStats, IdentityTimeline,
};
pub use pipeline::{preprocess, CleanRecord, PreprocessReport, Preprocessed};
pub use trajectory::{CompleteRow, KeypointTrajectory};
