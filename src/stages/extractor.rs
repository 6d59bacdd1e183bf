//! Extraction stage: raw experiment files to minimal per-record summaries

use crate::config::DirectoryConfig;
use crate::error::Result;
use crate::pipeline::{file_name, FailurePolicy, Stage};
use crate::records::{self, ExtractedRecord, RawRecord};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Stage 1: projects each raw record down to the three fields the
/// hypothesis needs and hands the file to the validator's input directory.
///
/// A file containing even one malformed record produces no output at all;
/// the whole file is moved unmodified into quarantine for manual
/// inspection and never retried. Raw experiment data that does not parse
/// will not parse next scan either.
pub struct Extractor {
    input_dir: PathBuf,
    output_dir: PathBuf,
    quarantine_dir: PathBuf,
    poll_interval: Duration,
}

impl Extractor {
    /// Create the extraction stage over the configured directories
    pub fn new(dirs: &DirectoryConfig, poll_interval: Duration) -> Self {
        Self {
            input_dir: dirs.raw_dir.clone(),
            output_dir: dirs.extracted_dir.clone(),
            quarantine_dir: dirs.quarantine_dir(),
            poll_interval,
        }
    }
}

#[async_trait]
impl Stage for Extractor {
    fn name(&self) -> &'static str {
        "extractor"
    }

    fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Quarantine(self.quarantine_dir.clone())
    }

    async fn process_file(&mut self, path: &Path) -> Result<()> {
        let raw: Vec<RawRecord> = records::load_sequence(path).await?;
        let extracted: Vec<ExtractedRecord> =
            raw.into_iter().map(ExtractedRecord::from).collect();

        let out_path = self.output_dir.join(file_name(path));
        records::save_sequence(&extracted, &out_path).await?;

        tracing::info!(
            file = %path.display(),
            records = extracted.len(),
            "Extracted records"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StageRunner;
    use tempfile::TempDir;

    fn test_dirs(root: &Path) -> DirectoryConfig {
        DirectoryConfig {
            raw_dir: root.join("raw"),
            extracted_dir: root.join("extracted"),
            verdict_dir: root.join("verdicts"),
            quarantine_subdir: "failed".to_string(),
        }
    }

    fn make_extractor(root: &Path) -> Extractor {
        let dirs = test_dirs(root);
        std::fs::create_dir_all(&dirs.raw_dir).unwrap();
        std::fs::create_dir_all(&dirs.extracted_dir).unwrap();
        Extractor::new(&dirs, Duration::from_millis(10))
    }

    fn well_formed_experiment() -> serde_json::Value {
        serde_json::json!([
            {
                "cell_type": {"name": "Neuron"},
                "environment": {"name": "In vivo"},
                "cell_response": 10
            },
            {
                "cell_type": {"name": "Glia"},
                "environment": {"name": "In vitro"},
                "cell_response": 2
            }
        ])
    }

    #[tokio::test]
    async fn test_extracts_fields_in_order() {
        let root = TempDir::new().unwrap();
        let mut extractor = make_extractor(root.path());

        let input = root.path().join("raw").join("exp1.json");
        std::fs::write(&input, well_formed_experiment().to_string()).unwrap();

        extractor.process_file(&input).await.unwrap();

        let output = root.path().join("extracted").join("exp1.json");
        let extracted: Vec<ExtractedRecord> = records::load_sequence(&output).await.unwrap();

        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[0].cell_type, "Neuron");
        assert_eq!(extracted[0].environment, "In vivo");
        assert_eq!(extracted[0].cell_response, serde_json::Number::from(10));
        assert_eq!(extracted[1].cell_type, "Glia");
        assert_eq!(extracted[1].environment, "In vitro");
        assert_eq!(extracted[1].cell_response, serde_json::Number::from(2));
    }

    #[tokio::test]
    async fn test_malformed_record_fails_whole_file() {
        let root = TempDir::new().unwrap();
        let mut extractor = make_extractor(root.path());

        // Second record is missing cell_response
        let input = root.path().join("raw").join("exp2.json");
        let data = serde_json::json!([
            {
                "cell_type": {"name": "Neuron"},
                "environment": {"name": "In vivo"},
                "cell_response": 10
            },
            {
                "cell_type": {"name": "Glia"},
                "environment": {"name": "In vitro"}
            }
        ]);
        std::fs::write(&input, data.to_string()).unwrap();

        assert!(extractor.process_file(&input).await.is_err());

        // No partial output for the failed file
        assert!(!root.path().join("extracted").join("exp2.json").exists());
    }

    #[tokio::test]
    async fn test_quarantine_isolates_bad_file_from_good_pass() {
        let root = TempDir::new().unwrap();
        let extractor = make_extractor(root.path());
        let raw = root.path().join("raw");

        std::fs::write(raw.join("good.json"), well_formed_experiment().to_string()).unwrap();
        let bad_content = r#"[{"cell_type": "flat, not nested"}]"#;
        std::fs::write(raw.join("bad.json"), bad_content).unwrap();

        let mut runner = StageRunner::new(extractor);
        runner.prepare().await;
        runner.pass().await;

        // Good file flowed through and its source is gone
        assert!(root.path().join("extracted").join("good.json").exists());
        assert!(!raw.join("good.json").exists());

        // Bad file is in quarantine, byte for byte, with no output written
        let quarantined = root.path().join("extracted").join("failed").join("bad.json");
        assert_eq!(std::fs::read_to_string(&quarantined).unwrap(), bad_content);
        assert!(!raw.join("bad.json").exists());
        assert!(!root.path().join("extracted").join("bad.json").exists());
    }
}
