//! Snapshot-vs-current comparison.
//!
//! An entry is new when no entry of the previous snapshot has the same
//! identity. By default identity is the whole entry; [`EntryIdentity`] offers
//! looser keys for pages that reformat titles between runs.

use crate::models::Entry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How two entries are recognised as the same listing item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryIdentity {
    /// Date, title and link must all match exactly.
    #[default]
    Full,
    /// Only the link must match.
    Link,
    /// Link and date must match; the title may change.
    LinkAndDate,
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum IdentityKey<'a> {
    Full(&'a Entry),
    Link(&'a str),
    LinkAndDate(&'a str, &'a str),
}

impl EntryIdentity {
    fn key<'a>(&self, entry: &'a Entry) -> IdentityKey<'a> {
        match self {
            EntryIdentity::Full => IdentityKey::Full(entry),
            EntryIdentity::Link => IdentityKey::Link(&entry.link),
            EntryIdentity::LinkAndDate => IdentityKey::LinkAndDate(&entry.link, &entry.date),
        }
    }
}

impl fmt::Display for EntryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryIdentity::Full => "full",
            EntryIdentity::Link => "link",
            EntryIdentity::LinkAndDate => "link-and-date",
        };
        f.write_str(s)
    }
}

impl FromStr for EntryIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(EntryIdentity::Full),
            "link" => Ok(EntryIdentity::Link),
            "link-and-date" | "link_and_date" => Ok(EntryIdentity::LinkAndDate),
            other => Err(format!(
                "unknown identity '{other}' (expected full, link or link-and-date)"
            )),
        }
    }
}

/// Entries of `current` that are not in `previous`, in `current` order.
pub fn diff(current: &[Entry], previous: &[Entry]) -> Vec<Entry> {
    diff_by(current, previous, EntryIdentity::Full)
}

/// Like [`diff`], comparing entries by `identity`.
pub fn diff_by(current: &[Entry], previous: &[Entry], identity: EntryIdentity) -> Vec<Entry> {
    let seen: HashSet<IdentityKey> = previous.iter().map(|e| identity.key(e)).collect();
    current
        .iter()
        .filter(|e| !seen.contains(&identity.key(e)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Entry {
        Entry::new("2024-01-10", "Title A", "/a")
    }
    fn b() -> Entry {
        Entry::new("2024-01-05", "Title B", "/b")
    }
    fn c() -> Entry {
        Entry::new("2024-02-01", "Title C", "/c")
    }

    #[test]
    fn test_diff_against_itself_is_empty() {
        let entries = vec![a(), b(), c()];
        assert!(diff(&entries, &entries).is_empty());
    }

    #[test]
    fn test_diff_against_empty_is_everything() {
        let entries = vec![c(), a(), b()];
        assert_eq!(diff(&entries, &[]), entries);
    }

    #[test]
    fn test_diff_of_empty_current_is_empty() {
        assert!(diff(&[], &[a(), b()]).is_empty());
    }

    #[test]
    fn test_diff_keeps_current_order() {
        let current = vec![c(), a(), Entry::new("2024-03-01", "Title D", "/d"), b()];
        let previous = vec![b(), a()];
        let new = diff(&current, &previous);
        assert_eq!(new, vec![c(), Entry::new("2024-03-01", "Title D", "/d")]);
    }

    #[test]
    fn test_diff_result_is_subset_of_current_and_disjoint_from_previous() {
        let current = vec![a(), b(), c(), a()];
        let previous = vec![b()];
        let new = diff(&current, &previous);
        for entry in &new {
            assert!(current.contains(entry));
            assert!(!previous.contains(entry));
        }
        assert_eq!(new, vec![a(), c(), a()]);
    }

    #[test]
    fn test_whitespace_change_is_new_under_full_identity() {
        let retitled = Entry::new("2024-01-10", "Title A ", "/a");
        assert_eq!(diff(&[retitled.clone()], &[a()]), vec![retitled]);
    }

    #[test]
    fn test_link_identity_ignores_title_changes() {
        let retitled = Entry::new("2024-01-10", "Title A (updated)", "/a");
        assert!(diff_by(&[retitled.clone()], &[a()], EntryIdentity::Link).is_empty());
        assert!(diff_by(&[retitled], &[a()], EntryIdentity::LinkAndDate).is_empty());
    }

    #[test]
    fn test_link_and_date_identity_sees_redated_entry() {
        let redated = Entry::new("2024-01-11", "Title A", "/a");
        assert_eq!(
            diff_by(&[redated.clone()], &[a()], EntryIdentity::LinkAndDate),
            vec![redated.clone()]
        );
        assert!(diff_by(&[redated], &[a()], EntryIdentity::Link).is_empty());
    }

    #[test]
    fn test_identity_parse_and_display() {
        assert_eq!("full".parse::<EntryIdentity>().unwrap(), EntryIdentity::Full);
        assert_eq!("LINK".parse::<EntryIdentity>().unwrap(), EntryIdentity::Link);
        assert_eq!(
            "link_and_date".parse::<EntryIdentity>().unwrap(),
            EntryIdentity::LinkAndDate
        );
        assert!("title".parse::<EntryIdentity>().is_err());
        assert_eq!(EntryIdentity::LinkAndDate.to_string(), "link-and-date");
    }
}
