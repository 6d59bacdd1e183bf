//! Validation stage: hypothesis check over extracted records
//!
//! The hypothesis under test: within one experiment file, the mean
//! response of Neuron cells measured in vivo exceeds the mean response of
//! every other record.

use crate::config::DirectoryConfig;
use crate::error::{Error, Result};
use crate::pipeline::{file_name, FailurePolicy, Stage};
use crate::records::{self, ExtractedRecord, Verdict};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Cell type the hypothesis singles out
const TARGET_CELL_TYPE: &str = "Neuron";
/// Environment the hypothesis singles out
const TARGET_ENVIRONMENT: &str = "In vivo";

/// Stage 2: computes one boolean verdict per extracted experiment file.
///
/// Unlike the extractor, a file this stage cannot process is left where it
/// is and retried on every subsequent scan. Its input was produced by the
/// extractor, so a failure here is more likely transient (a half-written
/// file caught mid-handoff) than hopeless.
pub struct Validator {
    input_dir: PathBuf,
    output_dir: PathBuf,
    poll_interval: Duration,
}

impl Validator {
    /// Create the validation stage over the configured directories
    pub fn new(dirs: &DirectoryConfig, poll_interval: Duration) -> Self {
        Self {
            input_dir: dirs.extracted_dir.clone(),
            output_dir: dirs.verdict_dir.clone(),
            poll_interval,
        }
    }
}

/// Evaluate the hypothesis over one experiment's records.
///
/// Group A holds the Neuron / In vivo records, group B everything else.
/// The hypothesis holds iff both groups are non-empty and group A's mean
/// response is strictly greater than group B's. An empty group makes the
/// verdict a definite `false`, not an error.
pub fn hypothesis_holds(records: &[ExtractedRecord]) -> Result<bool> {
    let mut target = Vec::new();
    let mut others = Vec::new();

    for record in records {
        let response = record.cell_response.as_f64().ok_or_else(|| {
            Error::Validation(format!(
                "cell_response {} is not representable as f64",
                record.cell_response
            ))
        })?;
        if record.cell_type == TARGET_CELL_TYPE && record.environment == TARGET_ENVIRONMENT {
            target.push(response);
        } else {
            others.push(response);
        }
    }

    if target.is_empty() || others.is_empty() {
        return Ok(false);
    }
    Ok(mean(&target) > mean(&others))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[async_trait]
impl Stage for Validator {
    fn name(&self) -> &'static str {
        "validator"
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
        let records: Vec<ExtractedRecord> = records::load_sequence(path).await?;
        let verdict = Verdict {
            hypothesis_valid: hypothesis_holds(&records)?,
        };

        let out_path = self.output_dir.join(file_name(path));
        records::save_sequence(&[verdict], &out_path).await?;

        tracing::info!(
            file = %path.display(),
            hypothesis_valid = verdict.hypothesis_valid,
            "Validated experiment"
        );
        Ok(())
    }
}
