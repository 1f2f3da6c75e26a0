//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LookdownError, LookdownResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Record encoding defaults.
    pub encoder: EncoderConfig,

    /// Table preprocessing and aggregation settings.
    pub analysis: AnalysisConfig,

    /// Chart rendering settings.
    pub report: ReportConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Parameters handed to the external multi-object tracker.
///
/// The encoder never runs the tracker itself; these are validated, logged,
/// and compared against what a detection stream declares in its header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    pub detection_threshold: f64,
    pub distance_threshold: f64,
    pub initialization_delay: u32,
    pub hit_counter_max: u32,
    pub pointwise_hit_counter_max: u32,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            detection_threshold: 0.1,
            distance_threshold: 0.4,
            initialization_delay: 4,
            hit_counter_max: 30,
            pointwise_hit_counter_max: 10,
        }
    }
}

impl TrackerParams {
    /// Per-keypoint matching distance used by the keypoint voting distance.
    pub fn keypoint_distance_threshold(frame_height: u32) -> f64 {
        frame_height as f64 / 40.0
    }

    /// Reject non-finite or negative thresholds.
    pub fn validate(&self) -> LookdownResult<()> {
        for (name, value) in [
            ("detection_threshold", self.detection_threshold),
            ("distance_threshold", self.distance_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LookdownError::config(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        Ok(())
    }
}

/// Record encoding defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub tracker: TrackerParams,

    /// Log a progress line every N frames.
    pub progress_interval_frames: u64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerParams::default(),
            progress_interval_frames: 30,
        }
    }
}

/// The "invalid nose" sentinel applied during preprocessing.
///
/// A record is dropped when `|nose.y - value| <= tolerance`. With the
/// defaults this is an exact `nose.y == 0` check, which cannot tell an
/// undetected nose from one detected on the top pixel row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoseSentinel {
    pub value: f64,
    pub tolerance: f64,
}

impl Default for NoseSentinel {
    fn default() -> Self {
        Self {
            value: 0.0,
            tolerance: 0.0,
        }
    }
}

impl NoseSentinel {
    pub fn matches(&self, nose_y: f64) -> bool {
        (nose_y - self.value).abs() <= self.tolerance
    }
}

/// How the `look_down` column is turned into a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookDownParsing {
    /// `true`/`false` (any case), `1`/`0`; anything else is an error.
    #[default]
    Strict,
    /// Compatibility shim for tables whose consumers relied on general
    /// truthiness: only case-insensitive "true" text is true among strings,
    /// but absent values and non-zero numbers count as true.
    Permissive,
}

/// Table preprocessing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub nose_sentinel: NoseSentinel,
    pub look_down_parsing: LookDownParsing,
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// TTF/OTF font for titles and tick labels. The bundled DejaVu Sans is used when unset.
    pub font_path: Option<PathBuf>,

    pub timeline_width: u32,
    pub timeline_height: u32,
    pub bar_chart_width: u32,
    pub bar_chart_height: u32,
    pub trajectory_width: u32,
    pub trajectory_height: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            timeline_width: 1400,
            timeline_height: 800,
            bar_chart_width: 1000,
            bar_chart_height: 600,
            trajectory_width: 1200,
            trajectory_height: 600,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "lookdown=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Errors are not swallowed.
    pub fn load_from(path: &Path) -> LookdownResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LookdownError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => LookdownError::Io(e),
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.encoder.tracker.validate()?;
        Ok(config)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("lookdown").join("config.json")
}
