//! Listing page scrapers.
//!
//! Scraping is split in two phases, as for any HTML source:
//!
//! 1. **Fetching**: download the page markup through a [`listing::PageSource`]
//! 2. **Extraction**: turn the markup into ordered [`crate::models::Entry`] rows
//!
//! Failures in either phase are logged and degrade to an empty result; they
//! are never propagated to the caller.

pub mod listing;
