//! Error taxonomy for a watch run.
//!
//! Fetch errors never leave the extractor (they degrade to an empty listing),
//! so in practice only the snapshot and configuration variants reach `main`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GET {url} returned {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed reading snapshot {}: {source}", path.display())]
    SnapshotRead { path: PathBuf, source: io::Error },

    /// The snapshot exists but is not a JSON array of entries.
    #[error("snapshot {} is corrupt: {source}", path.display())]
    SnapshotCorrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed writing snapshot {}: {source}", path.display())]
    SnapshotWrite { path: PathBuf, source: io::Error },

    #[error("failed encoding snapshot: {0}")]
    SnapshotEncode(#[source] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed parsing config file {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl WatchError {
    /// True for errors that mean the stored history can't be trusted.
    pub fn is_snapshot_error(&self) -> bool {
        matches!(
            self,
            WatchError::SnapshotRead { .. }
                | WatchError::SnapshotCorrupt { .. }
                | WatchError::SnapshotWrite { .. }
                | WatchError::SnapshotEncode(_)
        )
    }
}
