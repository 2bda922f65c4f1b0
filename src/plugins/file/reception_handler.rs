// Copyright (c) 2025 - Cowboy AI, Inc.
//! Filesystem Reception Handler
//!
//! Polls a directory and feeds every new file to the reception pipeline.
//!
//! # Watch Loop
//!
//! ```text
//! initialize ─▶ snapshot existing files (ignored)
//!                  │
//!                  ▼
//!            ┌─ tick ─▶ scan dir ─▶ new file? ─▶ wait until size is stable ─▶ pipeline
//!            │          (removed files are forgotten)
//!            │                                  (at most maxThread in flight)
//!            └─ cancelled ─▶ wait for in-flight files ─▶ stop
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::{DistributionError, DistributionResult};
use crate::parameters::validation::{GroupValidationResult, ValidationStatus, INT_TYPE, STRING_TYPE};
use crate::parameters::PluginConfiguration;
use crate::plugins::{
    DistributionStatistics, PolicyInput, ReceptionContext, ReceptionHandler, ReceptionPipeline,
};

/// Interval between two scans of the watched directory
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Interval between two size checks of a file being written
const READY_CHECK_INTERVAL: Duration = Duration::from_millis(100);

fn default_max_thread() -> usize {
    1
}

/// Configuration of [`FileSystemReceptionHandler`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemReceptionHandlerConfigurationParameterGroup {
    watch_path: Option<String>,
    #[serde(default = "default_max_thread")]
    max_thread: usize,
}

impl FileSystemReceptionHandlerConfigurationParameterGroup {
    pub const CLASS_NAME: &'static str =
        "policy_distribution::plugins::file::FileSystemReceptionHandlerConfigurationParameterGroup";

    pub fn new(watch_path: impl Into<String>, max_thread: usize) -> Self {
        Self {
            watch_path: Some(watch_path.into()),
            max_thread,
        }
    }

    pub fn watch_path(&self) -> Option<&str> {
        self.watch_path.as_deref()
    }

    pub fn max_thread(&self) -> usize {
        self.max_thread
    }
}

impl PluginConfiguration for FileSystemReceptionHandlerConfigurationParameterGroup {
    fn validate(&self, name: &str) -> GroupValidationResult {
        let mut result =
            GroupValidationResult::new(name, "FileSystemReceptionHandlerConfigurationParameterGroup");

        match self.watch_path() {
            Some(path) if !path.trim().is_empty() => {
                if !Path::new(path).is_dir() {
                    result.set_field_result(
                        "watchPath",
                        STRING_TYPE,
                        path,
                        ValidationStatus::Invalid,
                        "is not a valid directory",
                    );
                }
            }
            other => result.validate_non_blank("watchPath", other),
        }

        if self.max_thread < 1 {
            result.set_field_result(
                "maxThread",
                INT_TYPE,
                self.max_thread.to_string(),
                ValidationStatus::Invalid,
                "must be >= 1",
            );
        }
        result
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Watches a directory for new policy files
#[derive(Debug, Default)]
pub struct FileSystemReceptionHandler {
    shutdown_token: CancellationToken,
    watcher: Option<JoinHandle<()>>,
}

impl FileSystemReceptionHandler {
    pub const CLASS_NAME: &'static str = "policy_distribution::plugins::file::FileSystemReceptionHandler";

    pub fn new() -> Self {
        Self::default()
    }

    /// Is the watch loop still running?
    pub fn is_running(&self) -> bool {
        self.watcher
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[async_trait]
impl ReceptionHandler for FileSystemReceptionHandler {
    async fn initialize(&mut self, context: ReceptionContext) -> DistributionResult<()> {
        let configuration = context.configuration.as_ref().ok_or_else(|| {
            DistributionError::PluginInitialization(format!(
                "reception handler \"{}\" has no file system configuration",
                context.name
            ))
        })?;
        let parameters = configuration
            .parameters::<FileSystemReceptionHandlerConfigurationParameterGroup>()
            .ok_or_else(|| {
                DistributionError::PluginInitialization(format!(
                    "configuration \"{}\" is not a file system reception handler configuration",
                    configuration.class_name()
                ))
            })?;

        let watch_path = PathBuf::from(parameters.watch_path().unwrap_or_default());
        let known = scan_directory(&watch_path).await?;
        info!(
            handler = %context.name,
            watch_path = %watch_path.display(),
            existing_files = known.len(),
            "file system reception handler watching"
        );

        let watcher = DirectoryWatcher {
            watch_path,
            max_thread: parameters.max_thread().max(1),
            pipeline: context.pipeline.clone(),
            statistics: context.statistics.clone(),
            shutdown_token: self.shutdown_token.clone(),
        };
        self.watcher = Some(tokio::spawn(watcher.run(known)));
        Ok(())
    }

    async fn destroy(&mut self) -> DistributionResult<()> {
        self.shutdown_token.cancel();
        if let Some(watcher) = self.watcher.take() {
            watcher.await.map_err(|err| {
                DistributionError::PluginInitialization(format!("file watcher task failed: {}", err))
            })?;
        }
        debug!("file system reception handler stopped");
        Ok(())
    }
}

struct DirectoryWatcher {
    watch_path: PathBuf,
    max_thread: usize,
    pipeline: Arc<ReceptionPipeline>,
    statistics: Arc<DistributionStatistics>,
    shutdown_token: CancellationToken,
}

impl DirectoryWatcher {
    async fn run(self, mut known: HashSet<PathBuf>) {
        let permits = Arc::new(Semaphore::new(self.max_thread));
        let mut in_flight = JoinSet::new();
        let mut tick = interval(POLL_INTERVAL);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let files = match scan_directory(&self.watch_path).await {
                        Ok(files) => files,
                        Err(err) => {
                            warn!(watch_path = %self.watch_path.display(), "failed to scan directory: {}", err);
                            continue;
                        }
                    };
                    let mut new_files: Vec<PathBuf> = files.difference(&known).cloned().collect();
                    new_files.sort();
                    // forget removed files so a file dropped again under the same name is new
                    known = files;

                    for path in new_files {
                        debug!(file = %path.display(), "new policy file found");
                        in_flight.spawn(process_file(
                            path,
                            permits.clone(),
                            self.pipeline.clone(),
                            self.statistics.clone(),
                        ));
                    }
                }
                _ = self.shutdown_token.cancelled() => {
                    info!(watch_path = %self.watch_path.display(), "shutdown signal received, stopping file watcher");
                    break;
                }
            }

            while let Some(finished) = in_flight.try_join_next() {
                if let Err(err) = finished {
                    error!("policy file task failed: {}", err);
                }
            }
        }

        while let Some(finished) = in_flight.join_next().await {
            if let Err(err) = finished {
                error!("policy file task failed: {}", err);
            }
        }
    }
}

async fn scan_directory(dir: &Path) -> DistributionResult<HashSet<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = HashSet::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.insert(entry.path());
        }
    }
    Ok(files)
}

async fn process_file(
    path: PathBuf,
    permits: Arc<Semaphore>,
    pipeline: Arc<ReceptionPipeline>,
    statistics: Arc<DistributionStatistics>,
) {
    let Ok(_permit) = permits.acquire_owned().await else {
        return;
    };

    statistics.update_total_distribution_count();
    if let Err(err) = wait_for_file_to_be_ready(&path).await {
        error!(file = %path.display(), "file disappeared before it was ready: {}", err);
        statistics.update_distribution_failure_count();
        return;
    }

    statistics.update_total_download_count();
    match pipeline.input_received(&PolicyInput::File(path.clone())).await {
        Ok(()) => {
            statistics.update_download_success_count();
            statistics.update_distribution_success_count();
            debug!(file = %path.display(), "policy file complete");
        }
        Err(err) => {
            statistics.update_download_failure_count();
            statistics.update_distribution_failure_count();
            error!(file = %path.display(), "policy creation failed: {}", err);
        }
    }
}

/// Wait until the file size stops changing
async fn wait_for_file_to_be_ready(path: &Path) -> std::io::Result<()> {
    let mut previous = None;
    loop {
        sleep(READY_CHECK_INTERVAL).await;
        let size = tokio::fs::metadata(path).await?.len();
        if previous == Some(size) {
            return Ok(());
        }
        previous = Some(size);
    }
}
