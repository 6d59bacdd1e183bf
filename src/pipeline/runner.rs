//! Generic poll-transform-forward loop shared by all stages
//!
//! A [`Stage`] is a per-file transform bound to a watched directory; the
//! [`StageRunner`] owns the loop around it: scan the directory, process
//! every file found, apply the stage's failure policy, sleep, repeat.
//! Deleting a source file after successful processing happens here, in one
//! place, so a file is only ever visible in a single directory at a time.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the watch loop does with a file its stage failed to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Move the file, unchanged, into the given directory. Terminal: the
    /// file is never picked up again without human intervention.
    Quarantine(PathBuf),

    /// Leave the file in place; it is retried on every subsequent scan.
    Retain,
}

/// One pipeline stage: a per-file transform bound to a watched directory.
///
/// Implementations hold their own directories and state. The runner calls
/// [`process_file`](Stage::process_file) for every `.json` file found in
/// [`input_dir`](Stage::input_dir) and removes the source on success, so a
/// stage only writes its output (if it has one) and returns.
#[async_trait]
pub trait Stage: Send {
    /// Stage name used in log lines
    fn name(&self) -> &'static str;

    /// Directory scanned for work on each pass
    fn input_dir(&self) -> &Path;

    /// Delay between successive scans
    fn poll_interval(&self) -> Duration;

    /// What to do with a file this stage failed to process
    fn failure_policy(&self) -> FailurePolicy;

    /// Process one input file. On success the runner deletes the source.
    async fn process_file(&mut self, path: &Path) -> Result<()>;
}

/// File name component of a scanned path.
///
/// Scan entries always carry one; the fallback keeps this total for
/// hand-constructed paths.
pub(crate) fn file_name(path: &Path) -> &OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

/// Drives a [`Stage`]: one task, one directory, one unbounded watch loop
pub struct StageRunner<S: Stage> {
    stage: S,
}

impl<S: Stage> StageRunner<S> {
    /// Create a runner owning the given stage
    pub fn new(stage: S) -> Self {
        Self { stage }
    }

    /// The owned stage (counters and the like stay inspectable)
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Run the watch loop until the task is aborted.
    pub async fn run(mut self) {
        self.prepare().await;

        let interval = self.stage.poll_interval();
        loop {
            self.pass().await;
            tokio::time::sleep(interval).await;
        }
    }

    /// One-time setup before the first scan: the quarantine directory must
    /// exist before the stage starts watching.
    pub async fn prepare(&self) {
        if let FailurePolicy::Quarantine(dir) = self.stage.failure_policy() {
            if let Err(e) = tokio::fs::create_dir_all(&dir).await {
                tracing::error!(
                    stage = self.stage.name(),
                    dir = %dir.display(),
                    "Failed to create quarantine directory: {}",
                    e
                );
            }
        }

        tracing::info!(
            stage = self.stage.name(),
            dir = %self.stage.input_dir().display(),
            "Watching for files"
        );
    }

    /// One scan of the input directory: process every work item present at
    /// scan time, continuing past individual failures.
    pub async fn pass(&mut self) {
        for path in self.scan().await {
            match self.stage.process_file(&path).await {
                Ok(()) => {
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        tracing::error!(
                            stage = self.stage.name(),
                            file = %path.display(),
                            "Failed to remove processed file: {}",
                            e
                        );
                    }
                }
                Err(e) => self.handle_failure(&path, &e).await,
            }
        }
    }

    /// Snapshot the `.json` work items currently in the input directory.
    ///
    /// A failed listing is logged and treated as an empty pass; the loop
    /// stays alive. Subdirectories (the quarantine lives inside the
    /// validator's input directory) are not work items.
    async fn scan(&self) -> Vec<PathBuf> {
        let dir = self.stage.input_dir();
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(
                    stage = self.stage.name(),
                    dir = %dir.display(),
                    "Failed to read input directory: {}",
                    e
                );
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }
                    match entry.file_type().await {
                        Ok(file_type) if file_type.is_file() => files.push(path),
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(
                                stage = self.stage.name(),
                                "Failed to stat {}: {}",
                                path.display(),
                                e
                            );
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        stage = self.stage.name(),
                        dir = %dir.display(),
                        "Error reading directory entry: {}",
                        e
                    );
                    break;
                }
            }
        }
        files
    }

    /// Apply the stage's failure policy to one file.
    async fn handle_failure(&self, path: &Path, error: &Error) {
        match self.stage.failure_policy() {
            FailurePolicy::Quarantine(dir) => {
                tracing::error!(
                    stage = self.stage.name(),
                    file = %path.display(),
                    "Processing failed, quarantining file: {}",
                    error
                );
                let target = dir.join(file_name(path));
                if let Err(e) = tokio::fs::rename(path, &target).await {
                    tracing::error!(
                        stage = self.stage.name(),
                        file = %path.display(),
                        "Failed to move file into quarantine: {}",
                        e
                    );
                }
            }
            FailurePolicy::Retain => {
                tracing::error!(
                    stage = self.stage.name(),
                    file = %path.display(),
                    "Processing failed, file retained for next scan: {}",
                    error
                );
            }
        }
    }
}
