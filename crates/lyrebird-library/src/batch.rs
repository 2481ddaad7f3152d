// SPDX-License-Identifier: GPL-3.0-or-later

//! Fetches lyrics for many files.
//!
//! Files are processed concurrently up to `max_concurrent_files` in a
//! [`JoinSet`], with a fixed pause after every lookup. A failure for one
//! file is recorded in its report and never stops the rest of the batch.

use lyrebird_config::AppConfig;
use lyrebird_domain::{LyricKind, LyricSearchOptions};
use lyrebird_lyrics::{LyricsResolver, SearchTier};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::metadata::MetadataSource;
use crate::store::LyricsFileStore;

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub max_concurrent_files: usize,
    pub request_delay: Duration,
    pub overwrite_existing: bool,
    pub skip_instrumental: bool,
    pub options: LyricSearchOptions,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl BatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent_files: config.batch.max_concurrent_files,
            request_delay: Duration::from_millis(config.batch.request_delay_ms),
            overwrite_existing: config.batch.overwrite_existing,
            skip_instrumental: config.batch.skip_instrumental,
            options: config.search_options(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written {
        path: PathBuf,
        kind: LyricKind,
        tier: SearchTier,
    },
    NotFound,
    SkippedExisting(PathBuf),
    SkippedInstrumental,
    NoMetadata,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub synced: usize,
    pub plain: usize,
    pub instrumental: usize,
    pub not_found: usize,
    pub skipped_existing: usize,
    pub skipped_instrumental: usize,
    pub no_metadata: usize,
    pub failed: usize,
    /// One report per input file, in input order.
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn written(&self) -> usize {
        self.synced + self.plain + self.instrumental
    }

    fn record(&mut self, report: FileReport) {
        match &report.outcome {
            FileOutcome::Written { kind, .. } => match kind {
                LyricKind::Synced => self.synced += 1,
                LyricKind::Plain => self.plain += 1,
                LyricKind::Instrumental => self.instrumental += 1,
            },
            FileOutcome::NotFound => self.not_found += 1,
            FileOutcome::SkippedExisting(_) => self.skipped_existing += 1,
            FileOutcome::SkippedInstrumental => self.skipped_instrumental += 1,
            FileOutcome::NoMetadata => self.no_metadata += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
        self.reports.push(report);
    }
}

#[derive(Clone)]
pub struct LyricsBatch {
    resolver: LyricsResolver,
    metadata: Arc<dyn MetadataSource>,
    store: LyricsFileStore,
    settings: BatchSettings,
}

impl LyricsBatch {
    pub fn new(
        resolver: LyricsResolver,
        metadata: Arc<dyn MetadataSource>,
        store: LyricsFileStore,
        settings: BatchSettings,
    ) -> Self {
        Self {
            resolver,
            metadata,
            store,
            settings,
        }
    }

    /// Process every file and return one report per file, in input order.
    ///
    /// A task is spawned only once it holds a permit, so at most
    /// `max_concurrent_files` tasks exist at a time. Dropping the returned
    /// future aborts the outstanding tasks.
    pub async fn run(&self, files: Vec<PathBuf>) -> BatchSummary {
        let max_concurrent = self.settings.max_concurrent_files.max(1);
        let limiter = Arc::new(Semaphore::new(max_concurrent));
        info!(
            target: "batch",
            files = files.len(),
            max_concurrent,
            "starting lyrics batch"
        );

        let mut outcomes: Vec<FileOutcome> = files
            .iter()
            .map(|_| FileOutcome::Failed("lyrics task did not complete".to_string()))
            .collect();
        let mut tasks = JoinSet::new();

        for (index, path) in files.iter().enumerate() {
            let permit = loop {
                tokio::select! {
                    permit = limiter.clone().acquire_owned() => break permit,
                    Some(joined) = tasks.join_next() => Self::collect(joined, &mut outcomes),
                }
            };
            let Ok(permit) = permit else {
                error!(target: "batch", "concurrency limiter closed");
                break;
            };

            let batch = self.clone();
            let path = path.clone();
            tasks.spawn(async move {
                let outcome = batch.process_file(&path).await;
                drop(permit);
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            Self::collect(joined, &mut outcomes);
        }

        let mut summary = BatchSummary::default();
        for (path, outcome) in files.into_iter().zip(outcomes) {
            summary.record(FileReport { path, outcome });
        }

        info!(
            target: "batch",
            total = summary.total(),
            synced = summary.synced,
            plain = summary.plain,
            instrumental = summary.instrumental,
            not_found = summary.not_found,
            skipped = summary.skipped_existing + summary.skipped_instrumental,
            no_metadata = summary.no_metadata,
            failed = summary.failed,
            "lyrics batch finished"
        );
        summary
    }

    fn collect(joined: Result<(usize, FileOutcome), JoinError>, outcomes: &mut [FileOutcome]) {
        match joined {
            Ok((index, outcome)) => outcomes[index] = outcome,
            // The slot keeps its "did not complete" failure.
            Err(err) => error!(target: "batch", error = %err, "lyrics task panicked"),
        }
    }

    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        if !self.settings.overwrite_existing {
            if let Some(existing) = self.store.existing_lyrics(path) {
                debug!(target: "batch", path = %path.display(), "lyrics already present");
                return FileOutcome::SkippedExisting(existing);
            }
        }

        let source = self.metadata.clone();
        let owned_path = path.to_path_buf();
        let metadata = tokio::task::spawn_blocking(move || source.read(&owned_path))
            .await
            .unwrap_or_else(|err| {
                warn!(target: "batch", path = %path.display(), error = %err, "metadata task failed");
                None
            });

        let Some(metadata) = metadata.filter(|metadata| metadata.is_searchable()) else {
            warn!(target: "batch", path = %path.display(), "no usable metadata, skipping");
            return FileOutcome::NoMetadata;
        };

        let lookup = self
            .resolver
            .resolve_detailed(&metadata, self.settings.options)
            .await;
        tokio::time::sleep(self.settings.request_delay).await;

        let resolved = match lookup {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                info!(
                    target: "batch",
                    path = %path.display(),
                    artist = %metadata.artist,
                    title = %metadata.title,
                    "no lyrics found"
                );
                return FileOutcome::NotFound;
            }
            Err(err) => {
                warn!(target: "batch", path = %path.display(), error = %err, "lyrics lookup failed");
                return FileOutcome::Failed(err.to_string());
            }
        };

        if self.settings.skip_instrumental && resolved.result.kind() == Some(LyricKind::Instrumental) {
            info!(target: "batch", path = %path.display(), "instrumental track, skipping");
            return FileOutcome::SkippedInstrumental;
        }

        match self.store.write(path, &resolved.result) {
            Ok(written) => {
                let kind = resolved.result.kind().unwrap_or(LyricKind::Plain);
                info!(
                    target: "batch",
                    path = %written.display(),
                    %kind,
                    tier = %resolved.tier,
                    fallback = resolved.fallback,
                    "lyrics saved"
                );
                FileOutcome::Written {
                    path: written,
                    kind,
                    tier: resolved.tier,
                }
            }
            Err(err) => {
                warn!(target: "batch", path = %path.display(), error = %err, "failed to save lyrics");
                FileOutcome::Failed(err.to_string())
            }
        }
    }
}
