//! Command-line interface definitions.
//!
//! Every option is optional: running the binary bare performs one check of
//! the default listing page with the snapshot in the working directory.
//! Options can also be given through environment variables.

use crate::differ::EntryIdentity;
use clap::Parser;

/// Command-line arguments for a single watch run.
///
/// # Examples
///
/// ```sh
/// # One check with built-in defaults
/// caa_news_watch
///
/// # Keep state elsewhere and post to a chat webhook
/// caa_news_watch --snapshot-path /var/lib/caa/previous_entries.json \
///     --webhook-url https://hooks.slack.com/services/XXX
///
/// # Settings from a YAML file
/// caa_news_watch --config watch.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing page to check
    #[arg(short, long, env = "LISTING_URL")]
    pub url: Option<String>,

    /// File holding the entries seen on the previous run
    #[arg(short, long, env = "SNAPSHOT_PATH")]
    pub snapshot_path: Option<String>,

    /// HTTP timeout in seconds for fetching the page and posting notifications
    #[arg(short, long, env = "FETCH_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Post new entries to this webhook instead of printing them
    #[arg(long, env = "WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// How entries are matched against the snapshot
    #[arg(long, env = "ENTRY_IDENTITY")]
    pub identity: Option<EntryIdentity>,

    /// Don't overwrite the snapshot when the page could not be fetched
    #[arg(long)]
    pub keep_snapshot_on_error: bool,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_without_arguments() {
        let cli = Cli::parse_from(["caa_news_watch"]);

        assert!(cli.url.is_none());
        assert!(cli.snapshot_path.is_none());
        assert!(cli.webhook_url.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.keep_snapshot_on_error);
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "caa_news_watch",
            "--url",
            "https://example.test/news",
            "--snapshot-path",
            "/tmp/previous.json",
            "--timeout-secs",
            "15",
            "--identity",
            "link-and-date",
            "--keep-snapshot-on-error",
        ]);

        assert_eq!(cli.url.as_deref(), Some("https://example.test/news"));
        assert_eq!(cli.snapshot_path.as_deref(), Some("/tmp/previous.json"));
        assert_eq!(cli.timeout_secs, Some(15));
        assert_eq!(cli.identity, Some(EntryIdentity::LinkAndDate));
        assert!(cli.keep_snapshot_on_error);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["caa_news_watch", "-s", "state.json", "-c", "watch.yaml"]);

        assert_eq!(cli.snapshot_path.as_deref(), Some("state.json"));
        assert_eq!(cli.config.as_deref(), Some("watch.yaml"));
    }

    #[test]
    fn test_cli_rejects_unknown_identity() {
        assert!(Cli::try_parse_from(["caa_news_watch", "--identity", "title"]).is_err());
    }
}
