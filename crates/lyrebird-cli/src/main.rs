// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use lyrebird_config::{load as load_config, AppConfig, LrclibConfig};
use lyrebird_library::{
    scan_audio_files, BatchSettings, BatchSummary, FileOutcome, LyricsBatch, LyricsFileStore,
    TagMetadataSource,
};
use lyrebird_lyrics::{LrclibClient, LyricsResolver};
use tracing::{info, warn};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Fetch lyrics from LRCLIB for a local music collection
#[derive(Parser, Debug)]
#[command(name = "lyrebird")]
#[command(version)]
#[command(about = "Fetch synced or plain lyrics from LRCLIB and save them next to your audio files")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Allow a last-resort search by title alone
    #[arg(long)]
    title_only: bool,

    /// Accept the first match even when it only has plain lyrics
    #[arg(long)]
    no_prefer_synced: bool,

    /// Replace lyrics files that already exist
    #[arg(long)]
    overwrite: bool,

    /// Do not write placeholder files for instrumental tracks
    #[arg(long)]
    skip_instrumental: bool,

    /// Number of files processed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Pause after each lookup, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Audio files or directories to process
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

impl Args {
    /// Command-line flags win over file and environment configuration.
    fn apply(&self, config: &mut AppConfig) {
        if self.title_only {
            config.search.allow_title_only_search = true;
        }
        if self.no_prefer_synced {
            config.search.prefer_synced = false;
        }
        if self.overwrite {
            config.batch.overwrite_existing = true;
        }
        if self.skip_instrumental {
            config.batch.skip_instrumental = true;
        }
        if let Some(concurrency) = self.concurrency {
            config.batch.max_concurrent_files = concurrency.max(1);
        }
        if let Some(delay_ms) = self.delay_ms {
            config.batch.request_delay_ms = delay_ms;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = init_tracing();
    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);
    apply_log_level(filter.as_ref(), &config.telemetry.log_level);
    info!(target: "cli", version = env!("CARGO_PKG_VERSION"), "lyrebird starting");

    let client = build_client(&config.lrclib)?;
    info!(target: "cli", base_url = client.base_url(), "using LRCLIB endpoint");

    let batch = LyricsBatch::new(
        LyricsResolver::new(Arc::new(client)),
        Arc::new(TagMetadataSource::new()),
        LyricsFileStore::new(),
        BatchSettings::from_config(&config),
    );

    let files = collect_files(&args.paths);
    if files.is_empty() {
        warn!(target: "cli", "no audio files found");
        return Ok(());
    }

    tokio::select! {
        summary = batch.run(files) => log_summary(&summary),
        _ = shutdown_signal() => warn!(target: "cli", "interrupted, remaining files were not processed"),
    }

    Ok(())
}

/// Installs the subscriber before configuration is read, so its events are
/// kept. Returns a handle for [`apply_log_level`] unless `RUST_LOG` governs.
fn init_tracing() -> Option<FilterHandle> {
    let fmt_layer = fmt::layer().with_target(true).with_thread_names(true).with_level(true);
    let (filter, handle) = filter_layer(EnvFilter::try_from_default_env().ok());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
    handle
}

fn filter_layer(
    from_env: Option<EnvFilter>,
) -> (reload::Layer<EnvFilter, Registry>, Option<FilterHandle>) {
    match from_env {
        Some(filter) => (reload::Layer::new(filter).0, None),
        None => {
            let (layer, handle) = reload::Layer::new(EnvFilter::new("info"));
            (layer, Some(handle))
        }
    }
}

/// Swap the bootstrap filter for the configured level.
fn apply_log_level(handle: Option<&FilterHandle>, level: &str) {
    let Some(handle) = handle else {
        return;
    };
    if let Err(err) = handle.reload(EnvFilter::new(level)) {
        warn!(target: "cli", error = %err, level, "failed to apply configured log level");
    }
}

fn build_client(config: &LrclibConfig) -> Result<LrclibClient> {
    let mut builder = LrclibClient::builder()
        .base_url(config.base_url.as_str())
        .timeout(Duration::from_secs(config.timeout_secs));
    if let Some(user_agent) = config.user_agent.as_deref() {
        builder = builder.user_agent(user_agent);
    }
    builder
        .build()
        .with_context(|| format!("failed to build LRCLIB client for {}", config.base_url))
}

/// Audio files under every input path, sorted and without duplicates.
/// Paths that cannot be scanned are logged and skipped.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = paths
        .iter()
        .flat_map(|root| scan_root(root))
        .collect();
    files.sort();
    files.dedup();
    files
}

fn scan_root(root: &Path) -> Vec<PathBuf> {
    match scan_audio_files(root) {
        Ok(scanned) => {
            info!(target: "cli", root = %root.display(), files = scanned.len(), "scanned path");
            scanned.into_iter().map(|file| file.path).collect()
        }
        Err(err) => {
            warn!(target: "cli", root = %root.display(), error = %err, "skipping path");
            Vec::new()
        }
    }
}

fn log_summary(summary: &BatchSummary) {
    for report in &summary.reports {
        if let FileOutcome::Failed(reason) = &report.outcome {
            warn!(target: "cli", path = %report.path.display(), %reason, "file failed");
        }
    }

    info!(
        target: "cli",
        total = summary.total(),
        written = summary.written(),
        synced = summary.synced,
        plain = summary.plain,
        instrumental = summary.instrumental,
        not_found = summary.not_found,
        skipped_existing = summary.skipped_existing,
        skipped_instrumental = summary.skipped_instrumental,
        no_metadata = summary.no_metadata,
        failed = summary.failed,
        "done"
    );
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(err) = result {
                            warn!(target: "cli", error = %err, "failed to listen for ctrl-c");
                            terminate.recv().await;
                        }
                    },
                    _ = terminate.recv() => {},
                }
            }
            Err(err) => {
                warn!(target: "cli", error = %err, "failed to install SIGTERM handler");
                wait_for_ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;

    info!(target: "cli", "shutdown signal received");
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target: "cli", error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_config_load_is_logged_before_level_is_applied() {
        let captured = CapturedLogs::default();
        let writer = captured.clone();
        let (filter, handle) = filter_layer(None);
        let handle = handle.unwrap();
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );

        tracing::subscriber::with_default(subscriber, || {
            load_config(None).unwrap();
            apply_log_level(Some(&handle), "warn");
            info!(target: "cli", "suppressed after reload");
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("configuration loaded"));
        assert!(!logs.contains("suppressed after reload"));
    }

    #[test]
    fn test_rust_log_filter_is_not_reloadable() {
        let (_, handle) = filter_layer(Some(EnvFilter::new("debug")));
        assert!(handle.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "lyrebird",
            "--title-only",
            "--no-prefer-synced",
            "--overwrite",
            "--skip-instrumental",
            "--concurrency",
            "8",
            "--delay-ms",
            "0",
            "/music",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert!(config.search.allow_title_only_search);
        assert!(!config.search.prefer_synced);
        assert!(config.batch.overwrite_existing);
        assert!(config.batch.skip_instrumental);
        assert_eq!(config.batch.max_concurrent_files, 8);
        assert_eq!(config.batch.request_delay_ms, 0);
        assert_eq!(args.paths, vec![PathBuf::from("/music")]);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let args = Args::try_parse_from(["lyrebird", "a.mp3", "b.flac"]).unwrap();

        let mut config = AppConfig::default();
        config.search.allow_title_only_search = true;
        config.batch.request_delay_ms = 1000;
        args.apply(&mut config);

        assert!(config.search.allow_title_only_search);
        assert!(config.search.prefer_synced);
        assert_eq!(config.batch.request_delay_ms, 1000);
        assert_eq!(config.batch.max_concurrent_files, 4);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let args = Args::try_parse_from(["lyrebird", "--concurrency", "0", "x"]).unwrap();
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.batch.max_concurrent_files, 1);
    }

    #[test]
    fn test_paths_are_required() {
        assert!(Args::try_parse_from(["lyrebird"]).is_err());
    }

    #[test]
    fn test_collect_files_skips_missing_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let song = dir.path().join("song.mp3");
        fs::write(&song, b"x").unwrap();
        fs::write(dir.path().join("cover.jpg"), b"x").unwrap();

        let files = collect_files(&[
            dir.path().to_path_buf(),
            song.clone(),
            dir.path().join("missing"),
        ]);

        assert_eq!(files, vec![song]);
    }

    #[test]
    fn test_build_client_rejects_bad_url() {
        let config = LrclibConfig {
            base_url: "not a url".to_string(),
            ..LrclibConfig::default()
        };
        assert!(build_client(&config).is_err());
    }
}
