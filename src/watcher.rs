//! One check-and-report cycle.
//!
//! # Pipeline
//!
//! 1. **Extract**: fetch the listing and extract entries (never fails)
//! 2. **Load**: read the previous snapshot (fails on a corrupt store)
//! 3. **Diff**: keep the current entries missing from the snapshot
//! 4. **Report**: hand the new entries to the notifier
//! 5. **Save**: replace the snapshot with the current entries
//!
//! Nothing is kept in memory between runs; the snapshot file is the only
//! cross-run state.

use crate::config::{SavePolicy, WatchConfig};
use crate::differ::{EntryIdentity, diff_by};
use crate::error::WatchError;
use crate::models::Entry;
use crate::notify::Notifier;
use crate::scrapers::listing::{Extraction, PageSource, fetch_entries};
use crate::store::SnapshotStore;
use crate::utils::local_timestamp;
use tracing::{error, info, instrument, warn};

/// What a run saw and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub current: usize,
    pub previous: usize,
    pub new_entries: Vec<Entry>,
    pub fetch_failed: bool,
    pub snapshot_saved: bool,
}

/// Wires a page source, a snapshot store and a notifier together.
#[derive(Debug)]
pub struct Watcher<S, N> {
    source: S,
    notifier: N,
    store: SnapshotStore,
    url: String,
    identity: EntryIdentity,
    save_policy: SavePolicy,
}

impl<S, N> Watcher<S, N>
where
    S: PageSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: N, store: SnapshotStore, url: impl Into<String>) -> Self {
        Self {
            source,
            notifier,
            store,
            url: url.into(),
            identity: EntryIdentity::default(),
            save_policy: SavePolicy::default(),
        }
    }

    /// Build a watcher with the store location, identity and policy from `config`.
    pub fn from_config(source: S, notifier: N, config: &WatchConfig) -> Self {
        Self::new(
            source,
            notifier,
            SnapshotStore::new(&config.snapshot_path),
            config.url.as_str(),
        )
        .with_identity(config.identity)
        .with_save_policy(config.save_policy)
    }

    pub fn with_identity(mut self, identity: EntryIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_save_policy(mut self, save_policy: SavePolicy) -> Self {
        self.save_policy = save_policy;
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one cycle.
    ///
    /// # Errors
    ///
    /// Only snapshot errors abort the run. A corrupt snapshot stops it before
    /// anything is reported or saved. Notification failures are logged and
    /// the snapshot is still saved.
    #[instrument(level = "info", skip(self), fields(url = %self.url, identity = %self.identity))]
    pub async fn run(&self) -> Result<RunSummary, WatchError> {
        println!("🔍 Checking for updates at {}", local_timestamp());

        let extraction = fetch_entries(&self.source, &self.url).await;
        let fetch_failed = extraction.is_failed();
        if let Extraction::Failed { reason } = &extraction {
            warn!(%reason, "Continuing with an empty listing");
        }
        let current = extraction.into_entries();

        let previous = self.store.load().await?;

        let new_entries = diff_by(&current, &previous, self.identity);
        info!(
            current = current.len(),
            previous = previous.len(),
            new = new_entries.len(),
            "Computed new entries"
        );

        if let Err(e) = self.notifier.notify(&new_entries).await {
            error!(error = %e, "Notification failed; continuing");
        }

        let snapshot_saved = match (self.save_policy, fetch_failed) {
            (SavePolicy::SkipOnFetchError, true) => {
                warn!("Fetch failed; keeping previous snapshot");
                false
            }
            (_, failed) => {
                if failed {
                    warn!("Fetch failed; overwriting snapshot with an empty listing");
                }
                self.store.save(&current).await?;
                true
            }
        };

        Ok(RunSummary {
            current: current.len(),
            previous: previous.len(),
            new_entries,
            fetch_failed,
            snapshot_saved,
        })
    }
}
