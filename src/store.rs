//! Snapshot persistence.
//!
//! The snapshot is the entry list seen on the previous run, stored as a
//! pretty-printed JSON array:
//!
//! ```json
//! [
//!   {
//!     "date": "2024-01-10",
//!     "title": "Title A",
//!     "link": "/a"
//!   }
//! ]
//! ```
//!
//! Only one snapshot is kept. Each run overwrites it entirely. There is no
//! locking, so two runs sharing a path at the same time can race.

use crate::error::WatchError;
use crate::models::Entry;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

pub const DEFAULT_SNAPSHOT_PATH: &str = "previous_entries.json";

/// File-backed store for the previous run's entries.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous snapshot.
    ///
    /// A missing file is the first run and loads as an empty list.
    ///
    /// # Errors
    ///
    /// [`WatchError::SnapshotRead`] if the file exists but can't be read, and
    /// [`WatchError::SnapshotCorrupt`] if it isn't a JSON array of entries.
    /// A corrupt snapshot is never treated as empty.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Vec<Entry>, WatchError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No snapshot yet; treating every entry as new");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(WatchError::SnapshotRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let entries: Vec<Entry> =
            serde_json::from_str(&raw).map_err(|source| WatchError::SnapshotCorrupt {
                path: self.path.clone(),
                source,
            })?;
        info!(count = entries.len(), "Loaded snapshot");
        Ok(entries)
    }

    /// Replace the snapshot with `entries`.
    ///
    /// Written to a temporary sibling first and renamed into place, so an
    /// interrupted write leaves the old snapshot as it was.
    #[instrument(
        level = "info",
        skip_all,
        fields(path = %self.path.display(), count = entries.len())
    )]
    pub async fn save(&self, entries: &[Entry]) -> Result<(), WatchError> {
        let json = serde_json::to_string_pretty(entries).map_err(WatchError::SnapshotEncode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| self.write_error(source))?;
        }

        let tmp = self.tmp_path();
        debug!(tmp = %tmp.display(), "Writing snapshot");
        fs::write(&tmp, json)
            .await
            .map_err(|source| self.write_error(source))?;
        if let Err(source) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(self.write_error(source));
        }

        info!("Saved snapshot");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: std::io::Error) -> WatchError {
        WatchError::SnapshotWrite {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<Entry> {
        vec![
            Entry::new("2024-01-10", "Title A", "/a"),
            Entry::new("2024-01-05", "Title B", ""),
        ]
    }

    #[tokio::test]
    async fn test_missing_snapshot_loads_empty() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("previous_entries.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("previous_entries.json"));

        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), sample());
    }

    #[tokio::test]
    async fn test_save_empty_then_load() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("previous_entries.json"));

        store.save(&sample()).await.unwrap();
        store.save(&[]).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_is_pretty_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("previous_entries.json");
        let store = SnapshotStore::new(&path);

        store.save(&sample()[..1]).await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {"));
        assert!(raw.contains(r#""title": "Title A""#));
        assert!(!dir.path().join("previous_entries.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("state/nested/previous_entries.json"));

        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("previous_entries.json");
        std::fs::write(&path, "[{\"date\": \"2024").unwrap();

        let err = SnapshotStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, WatchError::SnapshotCorrupt { .. }));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("previous_entries.json");
        std::fs::write(&path, r#"{"date": "2024-01-10"}"#).unwrap();

        let err = SnapshotStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, WatchError::SnapshotCorrupt { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_is_read_error() {
        let dir = tempdir().unwrap();
        // A directory where the file should be can't be read as text.
        let err = SnapshotStore::new(dir.path()).load().await.unwrap_err();
        assert!(matches!(err, WatchError::SnapshotRead { .. }));
    }
}
