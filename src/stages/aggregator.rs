//! Aggregation stage: running tally over verdict files

use crate::config::DirectoryConfig;
use crate::error::{Error, Result};
use crate::pipeline::{FailurePolicy, Stage};
use crate::records;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Stage 3: folds verdict files into a running validity percentage.
///
/// This is the pipeline's sink. It writes no output files; its product is
/// the tally itself, reported through the log after every consumed file.
/// Files it cannot read stay in place and are retried on the next scan.
pub struct Aggregator {
    input_dir: PathBuf,
    poll_interval: Duration,
    total: u64,
    valid_count: u64,
}

impl Aggregator {
    /// Create the aggregation stage over the configured directories
    pub fn new(dirs: &DirectoryConfig, poll_interval: Duration) -> Self {
        Self {
            input_dir: dirs.verdict_dir.clone(),
            poll_interval,
            total: 0,
            valid_count: 0,
        }
    }

    /// Number of experiments consumed so far
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of experiments whose verdict was `hypothesis_valid: true`
    pub fn valid_count(&self) -> u64 {
        self.valid_count
    }

    /// Percentage of consumed experiments with a true verdict
    pub fn percent_valid(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.valid_count as f64 / self.total as f64 * 100.0
        }
    }
}

#[async_trait]
impl Stage for Aggregator {
    fn name(&self) -> &'static str {
        "aggregator"
    }

    fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Retain
    }

    async fn process_file(&mut self, path: &Path) -> Result<()> {
        let verdicts: Vec<serde_json::Value> = records::load_sequence(path).await?;
        let first = verdicts.first().ok_or_else(|| {
            Error::Aggregation(format!("{} contains no verdict records", path.display()))
        })?;

        // Anything other than a literal `true` counts as a failed hypothesis
        let valid = first
            .get("hypothesis_valid")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        self.total += 1;
        if valid {
            self.valid_count += 1;
        }

        tracing::info!(
            file = %path.display(),
            total = self.total,
            "Hypothesis is true for {:.2}% of experiments",
            self.percent_valid()
        );
        Ok(())
    }
}
