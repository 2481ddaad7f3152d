// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use lyrebird_domain::LyricSearchOptions;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LrclibConfig {
    pub base_url: String,
    /// Overrides the built-in `User-Agent` when set.
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LrclibConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lrclib.net/api".to_string(),
            user_agent: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub allow_title_only_search: bool,
    pub prefer_synced: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let options = LyricSearchOptions::default();
        Self {
            allow_title_only_search: options.allow_title_only_search,
            prefer_synced: options.prefer_synced,
        }
    }
}

impl From<&SearchConfig> for LyricSearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            allow_title_only_search: config.allow_title_only_search,
            prefer_synced: config.prefer_synced,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub max_concurrent_files: usize,
    /// Fixed pause after each lookup, in milliseconds.
    pub request_delay_ms: u64,
    pub overwrite_existing: bool,
    pub skip_instrumental: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: 4,
            request_delay_ms: 250,
            overwrite_existing: false,
            skip_instrumental: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub lrclib: LrclibConfig,
    pub search: SearchConfig,
    pub batch: BatchConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn search_options(&self) -> LyricSearchOptions {
        LyricSearchOptions::from(&self.search)
    }
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: LYREBIRD_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("LYREBIRD_").split("__"));

    let config: AppConfig = figment
        .extract()
        .context("failed to load lyrebird configuration")?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_lrclib_and_prefer_synced() {
        Jail::expect_with(|_jail| {
            let config = load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.lrclib.base_url, "https://lrclib.net/api");
            assert!(config.search.prefer_synced);
            assert!(!config.search.allow_title_only_search);
            assert_eq!(config.batch.max_concurrent_files, 4);
            assert_eq!(config.telemetry.log_level, "info");
            Ok(())
        });
    }

    #[test]
    fn toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lyrebird.toml",
                r#"
                [search]
                allow_title_only_search = true
                prefer_synced = false

                [batch]
                request_delay_ms = 1000
                "#,
            )?;

            let config = load(Some(Path::new("lyrebird.toml"))).map_err(|e| e.to_string())?;
            let options = config.search_options();
            assert!(options.allow_title_only_search);
            assert!(!options.prefer_synced);
            assert_eq!(config.batch.request_delay_ms, 1000);
            assert_eq!(config.batch.max_concurrent_files, 4);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("lyrebird.toml", "[lrclib]\nbase_url = \"http://file.invalid\"\n")?;
            jail.set_env("LYREBIRD_LRCLIB__BASE_URL", "http://env.invalid");
            jail.set_env("LYREBIRD_BATCH__MAX_CONCURRENT_FILES", "2");

            let config = load(Some(Path::new("lyrebird.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.lrclib.base_url, "http://env.invalid");
            assert_eq!(config.batch.max_concurrent_files, 2);
            Ok(())
        });
    }
}
