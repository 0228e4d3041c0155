use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::load::Config;
use crate::shared::ValidationError;

/// Top-level configuration for one converter run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConverterConfig {
    /// Scan-log XML files to ingest. Files load in sorted path order;
    /// entries sharing a scan id replace earlier ones.
    pub scan_logs: Vec<PathBuf>,
    /// Document-stream output settings.
    pub output: OutputConfig,
    /// Progress-reporting cadence.
    #[serde(default)]
    pub progress: ProgressConfig,
}

impl ConverterConfig {
    /// Validates the whole configuration tree.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.scan_logs.is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "scan_logs".to_string(),
                constraint: "at least one scan log file is required".to_string(),
            });
        }

        self.output.validate()?;
        self.progress.validate()?;

        Ok(())
    }
}

impl Config for ConverterConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &["scan_logs"];
}

/// Output settings for the document stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OutputConfig {
    /// File the serialized document stream appends to.
    pub path: PathBuf,
}

impl OutputConfig {
    /// Validates output settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "output.path".to_string(),
                constraint: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Progress-reporting configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProgressConfig {
    /// Minimum seconds between time-based progress lines.
    #[serde(default = "default_progress_interval_secs")]
    pub interval_secs: u64,
    /// Scan count between count-based progress lines.
    #[serde(default = "default_progress_every_scans")]
    pub every_scans: usize,
}

impl ProgressConfig {
    /// Default seconds between time-based progress lines.
    pub const DEFAULT_INTERVAL_SECS: u64 = 5;

    /// Default scan count between count-based progress lines.
    pub const DEFAULT_EVERY_SCANS: usize = 250;

    /// Validates progress settings.
    ///
    /// Ensures every_scans is non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.every_scans == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "progress.every_scans".to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_progress_interval_secs(),
            every_scans: default_progress_every_scans(),
        }
    }
}

fn default_progress_interval_secs() -> u64 {
    ProgressConfig::DEFAULT_INTERVAL_SECS
}

fn default_progress_every_scans() -> usize {
    ProgressConfig::DEFAULT_EVERY_SCANS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConverterConfig {
        ConverterConfig {
            scan_logs: vec![PathBuf::from("scanlog.xml")],
            output: OutputConfig {
                path: PathBuf::from("stream.json"),
            },
            progress: ProgressConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn empty_scan_logs_fail_validation() {
        let mut config = config();
        config.scan_logs.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_output_path_fails_validation() {
        let mut config = config();
        config.output.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_progress_threshold_fails_validation() {
        let mut config = config();
        config.progress.every_scans = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn progress_defaults_apply_when_absent() {
        let parsed: ConverterConfig = serde_json::from_str(
            r#"{"scan_logs": ["a.xml"], "output": {"path": "stream.json"}}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.progress.interval_secs,
            ProgressConfig::DEFAULT_INTERVAL_SECS
        );
        assert_eq!(
            parsed.progress.every_scans,
            ProgressConfig::DEFAULT_EVERY_SCANS
        );
    }
}
