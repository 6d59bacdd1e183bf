//! Cellflow configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main cellflow configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory layout
    #[serde(default)]
    pub directories: DirectoryConfig,

    /// Poll cadence per stage
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Directories the pipeline watches and writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Raw experiment files land here (extractor input)
    pub raw_dir: PathBuf,

    /// Extracted record files (extractor output, validator input)
    pub extracted_dir: PathBuf,

    /// Verdict files (validator output, aggregator input)
    pub verdict_dir: PathBuf,

    /// Quarantine subdirectory inside the extracted directory, holding raw
    /// files the extractor could not parse
    pub quarantine_subdir: String,
}

impl DirectoryConfig {
    /// Full path of the quarantine directory
    pub fn quarantine_dir(&self) -> PathBuf {
        self.extracted_dir.join(&self.quarantine_subdir)
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("raw_experiment_data"),
            extracted_dir: PathBuf::from("step1_output"),
            verdict_dir: PathBuf::from("step2_output"),
            quarantine_subdir: "failed".to_string(),
        }
    }
}

/// Poll cadence per stage
///
/// The validator scans less often than its neighbors, leaving it headroom
/// for larger extracted files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between extractor scans, in milliseconds
    pub extractor_interval_ms: u64,

    /// Delay between validator scans, in milliseconds
    pub validator_interval_ms: u64,

    /// Delay between aggregator scans, in milliseconds
    pub aggregator_interval_ms: u64,
}

impl PollingConfig {
    /// Extractor poll delay
    pub fn extractor_interval(&self) -> Duration {
        Duration::from_millis(self.extractor_interval_ms)
    }

    /// Validator poll delay
    pub fn validator_interval(&self) -> Duration {
        Duration::from_millis(self.validator_interval_ms)
    }

    /// Aggregator poll delay
    pub fn aggregator_interval(&self) -> Duration {
        Duration::from_millis(self.aggregator_interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            extractor_interval_ms: 1_000,
            validator_interval_ms: 4_000,
            aggregator_interval_ms: 1_000,
        }
    }
}
