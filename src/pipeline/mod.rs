//! Pipeline orchestration
//!
//! Wires the three stages to their directories and runs each on its own
//! polling loop. The stages never talk to each other directly; every
//! handoff goes through the filesystem, so any stage can be stopped and
//! restarted without the others noticing.

mod runner;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::stages::{Aggregator, Extractor, Validator};
use tokio::task::JoinHandle;

pub use runner::{FailurePolicy, Stage, StageRunner};

pub(crate) use runner::file_name;

/// Owns the three stage loops for one configured pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    tasks: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// Create a pipeline from configuration. Nothing runs until `start`.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            tasks: Vec::new(),
        }
    }

    /// Whether the stage loops have been spawned.
    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Create the working directories and spawn one polling loop per stage.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(Error::Pipeline("Pipeline already running".to_string()));
        }

        self.ensure_directories().await?;

        let dirs = &self.config.directories;
        let polling = &self.config.polling;

        let extractor = Extractor::new(dirs, polling.extractor_interval());
        let validator = Validator::new(dirs, polling.validator_interval());
        let aggregator = Aggregator::new(dirs, polling.aggregator_interval());

        self.tasks.push(tokio::spawn(StageRunner::new(extractor).run()));
        self.tasks.push(tokio::spawn(StageRunner::new(validator).run()));
        self.tasks.push(tokio::spawn(StageRunner::new(aggregator).run()));

        tracing::info!(
            raw_dir = %dirs.raw_dir.display(),
            verdict_dir = %dirs.verdict_dir.display(),
            "Pipeline started"
        );
        Ok(())
    }

    /// Abort the stage loops and wait for them to wind down.
    ///
    /// Files already picked up by a stage may be re-processed after a
    /// restart; every stage tolerates that.
    pub async fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
            let _ = task.await;
        }
        tracing::info!("Pipeline stopped");
    }

    async fn ensure_directories(&self) -> Result<()> {
        let dirs = &self.config.directories;
        tokio::fs::create_dir_all(&dirs.raw_dir).await?;
        tokio::fs::create_dir_all(&dirs.extracted_dir).await?;
        tokio::fs::create_dir_all(&dirs.verdict_dir).await?;
        tokio::fs::create_dir_all(dirs.quarantine_dir()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DirectoryConfig, PollingConfig};
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn make_config(root: &Path) -> PipelineConfig {
        PipelineConfig {
            directories: DirectoryConfig {
                raw_dir: root.join("raw"),
                extracted_dir: root.join("extracted"),
                verdict_dir: root.join("verdicts"),
                quarantine_subdir: "failed".to_string(),
            },
            polling: PollingConfig {
                extractor_interval_ms: 10,
                validator_interval_ms: 10,
                aggregator_interval_ms: 10,
            },
        }
    }

    fn json_files(dir: &Path) -> Vec<std::path::PathBuf> {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false) && p.is_file())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_start_creates_directories() {
        let root = TempDir::new().unwrap();
        let config = make_config(root.path());
        let dirs = config.directories.clone();

        let mut pipeline = Pipeline::new(config);
        pipeline.start().await.unwrap();

        assert!(dirs.raw_dir.is_dir());
        assert!(dirs.extracted_dir.is_dir());
        assert!(dirs.verdict_dir.is_dir());
        assert!(dirs.quarantine_dir().is_dir());
        assert!(pipeline.is_running());

        pipeline.stop().await;
        assert!(!pipeline.is_running());
    }

    #[tokio::test]
    async fn test_start_twice_is_an_error() {
        let root = TempDir::new().unwrap();
        let mut pipeline = Pipeline::new(make_config(root.path()));

        pipeline.start().await.unwrap();
        assert!(pipeline.start().await.is_err());

        pipeline.stop().await;
    }

    #[tokio::test]
    async fn test_stop_without_start_is_a_no_op() {
        let root = TempDir::new().unwrap();
        let mut pipeline = Pipeline::new(make_config(root.path()));
        pipeline.stop().await;
        assert!(!pipeline.is_running());
    }

    #[tokio::test]
    async fn test_end_to_end_flow() {
        let root = TempDir::new().unwrap();
        let config = make_config(root.path());
        let dirs = config.directories.clone();

        let mut pipeline = Pipeline::new(config);
        pipeline.start().await.unwrap();

        // One well-formed experiment and one file that is not JSON at all
        let experiment = serde_json::json!([
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
        ]);
        std::fs::write(dirs.raw_dir.join("exp1.json"), experiment.to_string()).unwrap();
        std::fs::write(dirs.raw_dir.join("broken.json"), "not json").unwrap();

        // Wait for the good file to drain through all three stages and the
        // bad one to land in quarantine.
        let quarantined = dirs.quarantine_dir().join("broken.json");
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let drained = json_files(&dirs.raw_dir).is_empty()
                && json_files(&dirs.extracted_dir).is_empty()
                && json_files(&dirs.verdict_dir).is_empty()
                && quarantined.exists();
            if drained {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "pipeline did not drain in time"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        // The quarantined file kept its original bytes
        assert_eq!(std::fs::read_to_string(&quarantined).unwrap(), "not json");

        pipeline.stop().await;
    }
}
