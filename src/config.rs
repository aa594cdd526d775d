//! Resolved run configuration.
//!
//! Values come from, highest priority first: command-line flags or their
//! environment variables, an optional YAML file, then built-in defaults.
//!
//! ```yaml
//! url: https://www.caa.lu/fr/actualites
//! snapshot_path: /var/lib/caa/previous_entries.json
//! timeout_secs: 20
//! webhook_url: https://hooks.slack.com/services/XXX
//! identity: full
//! keep_snapshot_on_error: false
//! ```

use crate::cli::Cli;
use crate::differ::EntryIdentity;
use crate::error::WatchError;
use crate::store::DEFAULT_SNAPSHOT_PATH;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_LISTING_URL: &str = "https://www.caa.lu/fr/actualites";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// What to do with the snapshot after a run whose fetch failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SavePolicy {
    /// Always replace the snapshot, even with an empty listing after a
    /// failed fetch. The next successful run then reports everything as new.
    #[default]
    Always,
    /// Keep the old snapshot when the fetch failed. A page that loaded fine
    /// but listed nothing is still saved.
    SkipOnFetchError,
}

/// Settings as they may appear in the YAML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub snapshot_path: Option<String>,
    pub timeout_secs: Option<u64>,
    pub webhook_url: Option<String>,
    pub identity: Option<EntryIdentity>,
    pub keep_snapshot_on_error: Option<bool>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, WatchError> {
        let raw = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&raw).map_err(|source| WatchError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub url: Url,
    pub snapshot_path: PathBuf,
    pub timeout: Duration,
    pub webhook_url: Option<Url>,
    pub identity: EntryIdentity,
    pub save_policy: SavePolicy,
}

impl WatchConfig {
    /// Resolve the configuration for this run from the CLI and its `--config` file.
    pub fn from_cli(cli: &Cli) -> Result<Self, WatchError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(Path::new(path))?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge CLI values over `file` values over defaults, then validate.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, WatchError> {
        let url = cli
            .url
            .clone()
            .or(file.url)
            .unwrap_or_else(|| DEFAULT_LISTING_URL.to_string());
        let url = Url::parse(&url)
            .map_err(|e| WatchError::Config(format!("invalid listing url '{url}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(WatchError::Config(format!(
                "listing url must be http(s), got '{url}'"
            )));
        }

        let snapshot_path = cli
            .snapshot_path
            .clone()
            .or(file.snapshot_path)
            .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string());
        if snapshot_path.trim().is_empty() {
            return Err(WatchError::Config("snapshot path is empty".to_string()));
        }

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(WatchError::Config(
                "timeout must be at least one second".to_string(),
            ));
        }

        let webhook_url = cli
            .webhook_url
            .clone()
            .or(file.webhook_url)
            .filter(|u| !u.trim().is_empty())
            .map(|u| {
                Url::parse(&u)
                    .map_err(|e| WatchError::Config(format!("invalid webhook url '{u}': {e}")))
            })
            .transpose()?;

        let identity = cli.identity.or(file.identity).unwrap_or_default();

        let keep = cli.keep_snapshot_on_error || file.keep_snapshot_on_error.unwrap_or(false);
        let save_policy = if keep {
            SavePolicy::SkipOnFetchError
        } else {
            SavePolicy::Always
        };

        let config = Self {
            url,
            snapshot_path: PathBuf::from(snapshot_path),
            timeout: Duration::from_secs(timeout_secs),
            webhook_url,
            identity,
            save_policy,
        };
        debug!(?config, "Resolved configuration");
        Ok(config)
    }
}
