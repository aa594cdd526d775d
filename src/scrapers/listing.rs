//! News listing table scraper.
//!
//! The listing page is a plain HTML table, one news item per row:
//!
//! ```html
//! <table>
//!   <tr><td>10.01.2024</td><td><a href="/fr/actualites/a">Title A</a></td></tr>
//! </table>
//! ```
//!
//! The first cell is the displayed date, the second the title, optionally
//! wrapped in a link. Anything that doesn't look like that is skipped.

use crate::error::WatchError;
use crate::models::Entry;
use crate::utils::{USER_AGENT, truncate_for_log};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table tr").expect("valid row selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("valid cell selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// Something that can turn a URL into page markup.
///
/// The production implementation is [`HttpPageSource`]; tests use canned HTML.
pub trait PageSource {
    async fn fetch_page(&self, url: &str) -> Result<String, WatchError>;
}

/// [`PageSource`] backed by a `reqwest` client with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(timeout: Duration) -> Result<Self, WatchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    #[instrument(level = "info", skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<String, WatchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched listing page");
        Ok(body)
    }
}

/// Result of the fetch-and-extract stage.
///
/// Both an unreachable page and a page with an empty table produce no
/// entries; this keeps the two apart so the watcher can decide whether the
/// snapshot should be replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Fetched(Vec<Entry>),
    Failed { reason: String },
}

impl Extraction {
    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed { .. })
    }

    /// The plain entry sequence; empty when the fetch failed.
    pub fn into_entries(self) -> Vec<Entry> {
        match self {
            Extraction::Fetched(entries) => entries,
            Extraction::Failed { .. } => Vec::new(),
        }
    }
}

/// Fetch the listing page and extract its entries.
///
/// Never fails: transport errors and bad statuses are logged and reported as
/// [`Extraction::Failed`].
#[instrument(level = "info", skip(source))]
pub async fn fetch_entries<S: PageSource>(source: &S, url: &str) -> Extraction {
    match source.fetch_page(url).await {
        Ok(html) => {
            let entries = extract_entries(&html);
            info!(count = entries.len(), %url, "Extracted listing entries");
            Extraction::Fetched(entries)
        }
        Err(e) => {
            error!(error = %e, %url, "Error fetching news entries");
            Extraction::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Extract entries from listing markup, in row order.
///
/// Rows with fewer than two `td` cells (header rows, spacers) are skipped.
pub fn extract_entries(html: &str) -> Vec<Entry> {
    let document = Html::parse_document(html);

    let mut entries = Vec::new();
    for row in document.select(&ROW_SELECTOR) {
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
        if cells.len() < 2 {
            debug!(cells = cells.len(), "Skipping short row");
            continue;
        }

        let date = cell_text(&cells[0]);
        let title = cell_text(&cells[1]);
        let link = cells[1]
            .select(&LINK_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default()
            .to_string();

        entries.push(Entry::new(date, title, link));
    }

    if entries.is_empty() {
        debug!(
            preview = %truncate_for_log(html, 200),
            "No listing rows found in page"
        );
    }
    entries
}

/// Every text node of the cell trimmed on its own, then joined with nothing
/// in between. Keeps titles comparable with snapshots written by earlier
/// versions of the tool.
fn cell_text(cell: &ElementRef) -> String {
    cell.text().map(str::trim).collect()
}
