//! # CAA News Watch
//!
//! Checks the CAA Luxembourg "Actualités" listing for entries that were not
//! there on the previous run and reports them.
//!
//! ## Usage
//!
//! ```sh
//! caa_news_watch
//! caa_news_watch --snapshot-path state/previous_entries.json --webhook-url https://...
//! ```
//!
//! ## Architecture
//!
//! Each invocation performs exactly one cycle, meant to be re-run by an
//! external scheduler:
//! 1. **Extract**: fetch the listing page and pull out `{date, title, link}` rows
//! 2. **Load**: read the entries saved by the previous run
//! 3. **Diff**: keep the rows the previous run did not have
//! 4. **Report**: print them, or post them to a webhook
//! 5. **Save**: store the current rows for the next run
//!
//! A failed fetch is not fatal. A corrupt snapshot is, and exits non-zero.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod differ;
mod error;
mod models;
mod notify;
mod scrapers;
mod store;
mod utils;
mod watcher;

use cli::Cli;
use config::WatchConfig;
use notify::Sink;
use scrapers::listing::HttpPageSource;
use utils::ensure_writable_parent;
use watcher::Watcher;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("caa_news_watch starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match WatchConfig::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        url = %config.url,
        snapshot = %config.snapshot_path.display(),
        identity = %config.identity,
        save_policy = ?config.save_policy,
        "Configuration loaded"
    );

    // Early check: a snapshot we can't write would make the run pointless
    if let Err(e) = ensure_writable_parent(&config.snapshot_path).await {
        error!(
            path = %config.snapshot_path.display(),
            error = %e,
            "Snapshot location is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let source = HttpPageSource::new(config.timeout)?;
    let webhook_url = config.webhook_url.as_ref().map(|u| u.as_str());
    let sink = Sink::from_webhook_url(webhook_url, config.timeout)?;
    debug!(webhook = sink.webhook().is_some(), "Notification sink ready");
    let watcher = Watcher::from_config(source, sink, &config);
    debug!(snapshot = %watcher.store().path().display(), "Watcher ready");

    let summary = match watcher.run().await {
        Ok(summary) => summary,
        Err(e) => {
            if e.is_snapshot_error() {
                error!(error = %e, "Snapshot unusable; aborting run");
            } else {
                error!(error = %e, "Run failed");
            }
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        current = summary.current,
        previous = summary.previous,
        new = summary.new_entries.len(),
        fetch_failed = summary.fetch_failed,
        snapshot_saved = summary.snapshot_saved,
        "Execution complete"
    );

    Ok(())
}
