//! Per-identity concentration statistics.
//!
//! A person is "concentrated" on every frame where they are not looking
//! down. The concentration rate is the share of such frames, in percent.

use std::collections::BTreeMap;

use serde::Serialize;

use lookdown_common::config::AnalysisConfig;
use lookdown_common::error::{LookdownError, LookdownResult};
use lookdown_pose_model::table::TableRow;

use crate::pipeline::{preprocess, CleanRecord, PreprocessReport};

/// Statistics for one tracked identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityStats {
    pub tracking_id: u64,
    pub total_frames: u64,
    pub look_down_frames: u64,
    /// `100 * (1 - look_down_frames / total_frames)`, in `[0, 100]`.
    pub concentration_rate: f64,
}

/// `100 * (1 - look_down / total)`, or 0 for an empty group.
pub fn concentration_rate(look_down_frames: u64, total_frames: u64) -> f64 {
    if total_frames == 0 {
        return 0.0;
    }
    let rate = 100.0 * (1.0 - look_down_frames as f64 / total_frames as f64);
    rate.clamp(0.0, 100.0)
}

/// Group clean records by identity. Output is sorted by identity and does
/// not depend on input order.
pub fn aggregate(records: &[CleanRecord]) -> Vec<IdentityStats> {
    let mut groups: BTreeMap<u64, (u64, u64)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(record.tracking_id).or_default();
        entry.0 += 1;
        if record.look_down {
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(tracking_id, (total_frames, look_down_frames))| IdentityStats {
            tracking_id,
            total_frames,
            look_down_frames,
            concentration_rate: concentration_rate(look_down_frames, total_frames),
        })
        .collect()
}

/// Per-frame `look_down` values for one identity, sorted by frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityTimeline {
    pub tracking_id: u64,
    pub samples: Vec<(u64, bool)>,
}

/// Build one timeline per identity, in identity order.
pub fn timelines(records: &[CleanRecord]) -> Vec<IdentityTimeline> {
    let mut groups: BTreeMap<u64, Vec<(u64, bool)>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.tracking_id)
            .or_default()
            .push((record.frame, record.look_down));
    }

    groups
        .into_iter()
        .map(|(tracking_id, mut samples)| {
            samples.sort_by_key(|(frame, _)| *frame);
            IdentityTimeline {
                tracking_id,
                samples,
            }
        })
        .collect()
}

/// Everything reporting needs from one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationReport {
    pub stats: Vec<IdentityStats>,
    #[serde(skip)]
    pub timelines: Vec<IdentityTimeline>,
    /// The rows that were aggregated, in table order.
    #[serde(skip)]
    pub records: Vec<CleanRecord>,
    pub preprocess: PreprocessReport,
}

/// Preprocesses a table and aggregates it.
pub struct ConcentrationAnalyzer {
    config: AnalysisConfig,
}

impl ConcentrationAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(AnalysisConfig::default())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run preprocessing and aggregation over loaded table rows.
    pub fn analyze(&self, rows: Vec<TableRow>) -> LookdownResult<ConcentrationReport> {
        let sentinel = self.config.nose_sentinel;
        if !sentinel.value.is_finite()
            || !sentinel.tolerance.is_finite()
            || sentinel.tolerance < 0.0
        {
            return Err(LookdownError::analysis(format!(
                "nose sentinel {} +/- {} must be finite with a non-negative tolerance",
                sentinel.value, sentinel.tolerance
            )));
        }

        let preprocessed = preprocess(rows, &self.config)?;
        let stats = aggregate(&preprocessed.records);
        let timelines = timelines(&preprocessed.records);

        tracing::info!(identities = stats.len(), "Aggregated concentration statistics");
        for s in &stats {
            tracing::debug!(
                tracking_id = s.tracking_id,
                total = s.total_frames,
                look_down = s.look_down_frames,
                rate = s.concentration_rate,
                "Identity statistics"
            );
        }

        Ok(ConcentrationReport {
            stats,
            timelines,
            records: preprocessed.records,
            preprocess: preprocessed.report,
        })
    }
}
