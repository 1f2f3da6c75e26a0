//! Table preprocessing.
//!
//! Aggregation only sees rows that survived four steps, applied in this
//! order:
//!
//! 1. [`drop_missing_identity`]: rows without a `tracking_id` go.
//! 2. [`coerce_identity`]: `tracking_id` text becomes an integer.
//! 3. [`drop_invalid_nose`]: rows whose `nose_y` is empty or sits on the
//!    sentinel go.
//! 4. [`normalize_look_down`]: `look_down` text becomes a boolean. In strict
//!    mode a row with an empty `look_down` has no verdict and is left out.
//!
//! Each step consumes the previous step's output and returns a new
//! sequence; steps 2 and 4 change the record type, so the order cannot be
//! mixed up.

use serde::Serialize;

use lookdown_common::config::{AnalysisConfig, LookDownParsing, NoseSentinel};
use lookdown_common::error::{LookdownError, LookdownResult};
use lookdown_pose_model::keypoint::KeypointSet;
use lookdown_pose_model::table::{format_flag, TableRow};

use crate::flag::parse_look_down;

/// A row with an integer identity (output of step 2).
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiedRecord {
    pub frame: u64,
    pub tracking_id: u64,
    pub keypoints: KeypointSet,
    pub nose_y: Option<f64>,
    pub frame_height: u32,
    pub frame_width: u32,
    pub dist_ear_nose: Option<f64>,
    pub look_down: Option<String>,
}

/// A fully preprocessed row (output of step 4).
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub frame: u64,
    pub tracking_id: u64,
    pub keypoints: KeypointSet,
    pub nose_y: Option<f64>,
    pub frame_height: u32,
    pub frame_width: u32,
    pub dist_ear_nose: Option<f64>,
    pub look_down: bool,
}

impl From<&CleanRecord> for TableRow {
    fn from(record: &CleanRecord) -> Self {
        Self {
            frame: record.frame,
            keypoints: record.keypoints,
            nose_y: record.nose_y,
            frame_height: record.frame_height,
            frame_width: record.frame_width,
            tracking_id: Some(record.tracking_id.to_string()),
            dist_ear_nose: record.dist_ear_nose,
            look_down: Some(format_flag(record.look_down)),
        }
    }
}

/// How many rows each step removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreprocessReport {
    pub input_rows: usize,
    pub missing_identity: usize,
    /// Rows (with an identity) whose nose is exactly `(0, 0)`.
    pub nose_at_origin: usize,
    pub invalid_nose: usize,
    /// Rows dropped in strict mode because `look_down` was empty.
    pub missing_look_down: usize,
    pub retained: usize,
}

/// Output of [`preprocess`].
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    pub records: Vec<CleanRecord>,
    pub report: PreprocessReport,
}

/// Step 1.
///
/// Post: every returned row has `tracking_id` set.
pub fn drop_missing_identity(rows: Vec<TableRow>) -> Vec<TableRow> {
    rows.into_iter()
        .filter(|row| row.tracking_id.is_some())
        .collect()
}

/// Step 2.
///
/// Pre: every row has `tracking_id` set (step 1).
/// Post: identities are non-negative integers. `"3"` and `"3.0"` both
/// become `3`; fractional, negative, or non-numeric identities are errors.
pub fn coerce_identity(rows: Vec<TableRow>) -> LookdownResult<Vec<IdentifiedRecord>> {
    rows.into_iter()
        .map(|row| {
            let raw = row.tracking_id.as_deref().ok_or_else(|| {
                LookdownError::table(format!(
                    "frame {}: tracking_id is empty; drop such rows first",
                    row.frame
                ))
            })?;
            let tracking_id = parse_identity(raw, row.frame)?;
            Ok(IdentifiedRecord {
                frame: row.frame,
                tracking_id,
                keypoints: row.keypoints,
                nose_y: row.nose_y,
                frame_height: row.frame_height,
                frame_width: row.frame_width,
                dist_ear_nose: row.dist_ear_nose,
                look_down: row.look_down,
            })
        })
        .collect()
}

/// Step 3.
///
/// Post: every record has a `nose_y` that does not match the sentinel. Only
/// the `y` cell matters; an empty `nose_x` does not drop the row. A genuine
/// detection on the sentinel row is dropped too.
pub fn drop_invalid_nose(
    records: Vec<IdentifiedRecord>,
    sentinel: &NoseSentinel,
) -> Vec<IdentifiedRecord> {
    records
        .into_iter()
        .filter(|record| record.nose_y.is_some_and(|y| !sentinel.matches(y)))
        .collect()
}

/// Step 4.
///
/// Post: `look_down` is a boolean. In strict mode, fails on the first
/// unrecognised value and leaves out records whose `look_down` is empty.
pub fn normalize_look_down(
    records: Vec<IdentifiedRecord>,
    parsing: LookDownParsing,
) -> LookdownResult<Vec<CleanRecord>> {
    records
        .into_iter()
        .filter_map(|record| {
            let look_down = match parse_look_down(record.look_down.as_deref(), parsing) {
                Ok(Some(flag)) => flag,
                Ok(None) => return None,
                Err(e) => {
                    return Some(Err(LookdownError::table(format!(
                        "frame {}, tracking_id {}: {e}",
                        record.frame, record.tracking_id
                    ))))
                }
            };
            Some(Ok(CleanRecord {
                frame: record.frame,
                tracking_id: record.tracking_id,
                keypoints: record.keypoints,
                nose_y: record.nose_y,
                frame_height: record.frame_height,
                frame_width: record.frame_width,
                dist_ear_nose: record.dist_ear_nose,
                look_down,
            }))
        })
        .collect()
}

/// Run all four steps.
pub fn preprocess(rows: Vec<TableRow>, config: &AnalysisConfig) -> LookdownResult<Preprocessed> {
    let input_rows = rows.len();

    let rows = drop_missing_identity(rows);
    let missing_identity = input_rows - rows.len();

    let identified = coerce_identity(rows)?;
    let nose_at_origin = identified
        .iter()
        .filter(|r| r.keypoints.nose().is_some_and(|n| n.x == 0.0 && n.y == 0.0))
        .count();

    let before_nose = identified.len();
    let identified = drop_invalid_nose(identified, &config.nose_sentinel);
    let invalid_nose = before_nose - identified.len();

    if tracing::enabled!(tracing::Level::DEBUG) {
        let mut raw_values: Vec<&str> = identified
            .iter()
            .map(|r| r.look_down.as_deref().unwrap_or(""))
            .collect();
        raw_values.sort_unstable();
        raw_values.dedup();
        tracing::debug!(values = ?raw_values, "Distinct look_down values before parsing");
    }

    let before_flag = identified.len();
    let records = normalize_look_down(identified, config.look_down_parsing)?;
    let missing_look_down = before_flag - records.len();

    let report = PreprocessReport {
        input_rows,
        missing_identity,
        nose_at_origin,
        invalid_nose,
        missing_look_down,
        retained: records.len(),
    };
    tracing::info!(
        input = report.input_rows,
        missing_identity = report.missing_identity,
        nose_at_origin = report.nose_at_origin,
        invalid_nose = report.invalid_nose,
        missing_look_down = report.missing_look_down,
        retained = report.retained,
        "Preprocessed pose table"
    );

    Ok(Preprocessed { records, report })
}

/// Parse identity text such as `"3"` or `"3.0"`.
pub fn parse_identity(raw: &str, frame: u64) -> LookdownResult<u64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<u64>() {
        return Ok(id);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => {
            Ok(v as u64)
        }
        _ => Err(LookdownError::table(format!(
            "frame {frame}: tracking_id '{raw}' is not a non-negative integer"
        ))),
    }
}
