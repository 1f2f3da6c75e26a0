//! Keypoint trajectories for one tracked identity.
//!
//! Trajectories work on complete rows only: a row with any empty field
//! (keypoint, identity, or derived column) is ignored.

use lookdown_common::error::{LookdownError, LookdownResult};
use lookdown_pose_model::keypoint::{KeypointName, KeypointSet};
use lookdown_pose_model::table::TableRow;

use crate::pipeline::parse_identity;

/// A complete row with its identity parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteRow {
    pub frame: u64,
    pub tracking_id: u64,
    pub keypoints: KeypointSet,
}

/// Keep only rows where every field holds a value.
pub fn complete_rows(rows: &[TableRow]) -> LookdownResult<Vec<CompleteRow>> {
    rows.iter()
        .filter(|row| row.is_complete())
        .map(|row| {
            let raw = row.tracking_id.as_deref().unwrap_or_default();
            Ok(CompleteRow {
                frame: row.frame,
                tracking_id: parse_identity(raw, row.frame)?,
                keypoints: row.keypoints,
            })
        })
        .collect()
}

/// Distinct identities, ascending.
pub fn available_identities(rows: &[CompleteRow]) -> Vec<u64> {
    let mut ids: Vec<u64> = rows.iter().map(|r| r.tracking_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Coordinates of one keypoint over time.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointTrajectory {
    pub tracking_id: u64,
    pub keypoint: KeypointName,
    /// `(frame, x, y)` in frame order.
    pub samples: Vec<(u64, f64, f64)>,
}

impl KeypointTrajectory {
    pub fn frame_range(&self) -> Option<(u64, u64)> {
        let first = self.samples.first()?.0;
        let last = self.samples.last()?.0;
        Some((first, last))
    }
}

fn rows_for(rows: &[CompleteRow], tracking_id: u64) -> LookdownResult<Vec<&CompleteRow>> {
    let mut selected: Vec<&CompleteRow> =
        rows.iter().filter(|r| r.tracking_id == tracking_id).collect();
    if selected.is_empty() {
        return Err(LookdownError::IdentityNotFound {
            id: tracking_id,
            available: available_identities(rows),
        });
    }
    selected.sort_by_key(|r| r.frame);
    Ok(selected)
}

fn trajectory_of(
    selected: &[&CompleteRow],
    tracking_id: u64,
    keypoint: KeypointName,
) -> KeypointTrajectory {
    let samples = selected
        .iter()
        .filter_map(|r| r.keypoints.get(keypoint).map(|p| (r.frame, p.x, p.y)))
        .collect();
    KeypointTrajectory {
        tracking_id,
        keypoint,
        samples,
    }
}

/// Trajectory of `keypoint` for `tracking_id`.
pub fn keypoint_trajectory(
    rows: &[CompleteRow],
    tracking_id: u64,
    keypoint: KeypointName,
) -> LookdownResult<KeypointTrajectory> {
    let selected = rows_for(rows, tracking_id)?;
    Ok(trajectory_of(&selected, tracking_id, keypoint))
}

/// Trajectories of all 17 keypoints for `tracking_id`, in COCO order.
pub fn all_keypoint_trajectories(
    rows: &[CompleteRow],
    tracking_id: u64,
) -> LookdownResult<Vec<KeypointTrajectory>> {
    let selected = rows_for(rows, tracking_id)?;
    Ok(KeypointName::ALL
        .iter()
        .map(|&name| trajectory_of(&selected, tracking_id, name))
        .collect())
}
