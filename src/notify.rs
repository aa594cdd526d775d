//! Notification sinks for newly detected entries.
//!
//! The watcher only knows the [`Notifier`] trait. [`ConsoleNotifier`] prints
//! the report; [`WebhookNotifier`] posts it to a chat webhook. [`Sink`]
//! always prints and additionally posts when a webhook is configured.

use crate::error::WatchError;
use crate::models::Entry;
use crate::utils::USER_AGENT;
use reqwest::Client;
use serde::Serialize;
use std::cell::RefCell;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{info, instrument};

/// Trait for anything that can announce new entries.
///
/// Called once per run, also when there is nothing new, so that sinks can
/// emit a "no updates" notice.
pub trait Notifier {
    async fn notify(&self, new_entries: &[Entry]) -> Result<(), WatchError>;
}

/// Render the human-readable report for `new_entries`.
///
/// # Examples
///
/// ```ignore
/// let report = format_report(&[Entry::new("2024-02-01", "Title C", "/c")]);
/// assert_eq!(report, "🔔 1 new update(s) detected:\n- 2024-02-01: Title C (/c)");
/// ```
pub fn format_report(new_entries: &[Entry]) -> String {
    if new_entries.is_empty() {
        return "No new updates.".to_string();
    }

    let mut out = format!("🔔 {} new update(s) detected:", new_entries.len());
    for entry in new_entries {
        out.push_str("\n- ");
        out.push_str(&entry.to_string());
    }
    out
}

/// Writes the report to a console stream, stdout unless told otherwise.
#[derive(Debug)]
pub struct ConsoleNotifier<W = io::Stdout> {
    out: RefCell<W>,
}

impl ConsoleNotifier {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    async fn notify(&self, new_entries: &[Entry]) -> Result<(), WatchError> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "{}", format_report(new_entries))?;
        out.flush()?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    /// Slack-style message body.
    text: &'a str,
    /// Discord-style message body.
    content: &'a str,
    entries: &'a [Entry],
}

/// Posts the report as JSON to a webhook URL.
///
/// The payload carries the rendered report under both `text` and `content`,
/// which Slack and Discord incoming webhooks respectively accept, plus the raw
/// entries for anything else. Empty runs are not posted.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WatchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Notifier for WebhookNotifier {
    #[instrument(level = "info", skip_all, fields(count = new_entries.len()))]
    async fn notify(&self, new_entries: &[Entry]) -> Result<(), WatchError> {
        if new_entries.is_empty() {
            info!("No new updates; nothing posted to webhook");
            return Ok(());
        }

        let report = format_report(new_entries);
        let payload = WebhookPayload {
            text: &report,
            content: &report,
            entries: new_entries,
        };
        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::HttpStatus {
                url: self.url.clone(),
                status,
            });
        }
        info!(%status, "Posted new entries to webhook");
        Ok(())
    }
}

/// The notifier used by the binary.
///
/// The console report is always written, so every run ends with either the
/// update list or "No new updates."; the webhook is an extra channel.
#[derive(Debug)]
pub struct Sink<W = io::Stdout> {
    console: ConsoleNotifier<W>,
    webhook: Option<WebhookNotifier>,
}

impl Sink {
    /// Console on stdout, plus a webhook when a URL is configured.
    pub fn from_webhook_url(url: Option<&str>, timeout: Duration) -> Result<Self, WatchError> {
        let webhook = url
            .map(|url| WebhookNotifier::new(url, timeout))
            .transpose()?;
        Ok(Self::new(ConsoleNotifier::stdout(), webhook))
    }
}

impl<W: Write> Sink<W> {
    pub fn new(console: ConsoleNotifier<W>, webhook: Option<WebhookNotifier>) -> Self {
        Self { console, webhook }
    }

    pub fn webhook(&self) -> Option<&WebhookNotifier> {
        self.webhook.as_ref()
    }

    #[cfg(test)]
    pub fn into_console(self) -> ConsoleNotifier<W> {
        self.console
    }
}

impl<W: Write> Notifier for Sink<W> {
    async fn notify(&self, new_entries: &[Entry]) -> Result<(), WatchError> {
        self.console.notify(new_entries).await?;
        match &self.webhook {
            Some(webhook) => webhook.notify(new_entries).await,
            None => Ok(()),
        }
    }
}
