//! Data models for listing entries.
//!
//! [`Entry`] is the only domain record: one row of the listing table reduced
//! to its date, title and link. The same shape is used on the page, in the
//! snapshot file, and in notifications.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the news listing table.
///
/// Two entries are the same entry iff all three fields are equal, byte for
/// byte. A whitespace change on the source page therefore produces a "new"
/// entry; see [`crate::differ::EntryIdentity`] for looser comparisons.
///
/// # JSON Shape
///
/// ```json
/// {"date": "10.01.2024", "title": "Title A", "link": "/a"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Entry {
    /// The date as displayed on the page. Never parsed.
    pub date: String,
    /// The entry title, trimmed.
    pub title: String,
    /// The href of the title cell's anchor, or empty when there is none.
    pub link: String,
}

impl Entry {
    pub fn new(date: impl Into<String>, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            title: title.into(),
            link: link.into(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.date, self.title, self.link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_equality_is_exact() {
        let a = Entry::new("2024-01-10", "Title A", "/a");
        let b = Entry::new("2024-01-10", "Title A", "/a");
        let spaced = Entry::new("2024-01-10", "Title  A", "/a");

        assert_eq!(a, b);
        assert_ne!(a, spaced);
    }

    #[test]
    fn test_entry_serialization() {
        let entry = Entry::new("2024-01-10", "Title A", "/a");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"date":"2024-01-10","title":"Title A","link":"/a"}"#);
    }

    #[test]
    fn test_entry_deserialization() {
        let json = r#"{
            "date": "2024-01-05",
            "title": "Title B",
            "link": ""
        }"#;

        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.date, "2024-01-05");
        assert_eq!(entry.title, "Title B");
        assert!(entry.link.is_empty());
    }

    #[test]
    fn test_entry_display() {
        let entry = Entry::new("2024-02-01", "Title C", "/c");
        assert_eq!(entry.to_string(), "2024-02-01: Title C (/c)");
    }
}
