//! Error types shared across lookdown crates.

use std::path::PathBuf;

/// Usage hint attached to identity-list parse failures.
pub const IDENTITY_LIST_HINT: &str = "use comma-separated integers, e.g. 1,3,5";

/// Top-level error type for lookdown operations.
#[derive(Debug, thiserror::Error)]
pub enum LookdownError {
    #[error("Table error: {message}")]
    Table { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Analysis error: {message}")]
    Analysis { message: String },

    #[error("Report error: {message}")]
    Report { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid tracking id list '{input}': {hint}", hint = IDENTITY_LIST_HINT)]
    InvalidIdentityList { input: String },

    #[error("tracking_id {id} not found (available: {available:?})")]
    IdentityNotFound { id: u64, available: Vec<u64> },

    #[error("Table has no usable rows: {path}")]
    EmptyTable { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using LookdownError.
pub type LookdownResult<T> = Result<T, LookdownError>;

impl LookdownError {
    pub fn table(msg: impl Into<String>) -> Self {
        Self::Table {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis {
            message: msg.into(),
        }
    }

    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Fail with `FileNotFound` unless `path` exists.
    pub fn require_file(path: impl Into<PathBuf>) -> LookdownResult<PathBuf> {
        let path = path.into();
        if path.exists() {
            Ok(path)
        } else {
            Err(Self::FileNotFound { path })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_list_error_carries_usage_hint() {
        let err = LookdownError::InvalidIdentityList {
            input: "1,a".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("'1,a'"));
        assert!(message.contains("e.g. 1,3,5"));
    }

    #[test]
    fn require_file_reports_missing_path() {
        let missing = std::env::temp_dir().join("lookdown_missing_input.csv");
        let _ = std::fs::remove_file(&missing);
        match LookdownError::require_file(&missing) {
            Err(LookdownError::FileNotFound { path }) => assert_eq!(path, missing),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
