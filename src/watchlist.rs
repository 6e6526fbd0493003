//! Watch-list screening
//!
//! Fuzzy name and jurisdiction screening against sanctions/watch-list records.
//! Matching is deliberately loose: a case party only needs to be *near* a
//! listed name or share its country to be surfaced for review.

use serde::{Deserialize, Serialize};

/// A sanctions/watch-list record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchEntry {
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub country: String,
    pub program: String,
    pub reason: String,
}

impl WatchEntry {
    /// Name or alias contains the screened name, or the other way round
    fn matches_name(&self, name_lower: &str) -> bool {
        let contains_either = |candidate: &str| {
            let candidate = candidate.to_lowercase();
            !candidate.is_empty()
                && (candidate.contains(name_lower) || name_lower.contains(&candidate))
        };

        contains_either(&self.name) || self.aliases.iter().any(|alias| contains_either(alias))
    }
}

/// Watch-list screener
#[derive(Debug, Clone, Default)]
pub struct WatchList {
    entries: Vec<WatchEntry>,
}

impl WatchList {
    /// Create an empty watch list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a watch list from existing entries
    pub fn with_entries(entries: Vec<WatchEntry>) -> Self {
        Self { entries }
    }

    /// Add an entry
    pub fn add_entry(&mut self, entry: WatchEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Screen a name and country.
    ///
    /// An entry matches when its name or any alias is a case-insensitive
    /// substring of `name` (or vice versa), or, failing that, when its country
    /// equals `country` exactly. Blank names and countries never match.
    /// Entries are returned in list order.
    pub fn screen(&self, name: &str, country: &str) -> Vec<WatchEntry> {
        let name_lower = name.trim().to_lowercase();
        let country = country.trim();

        self.entries
            .iter()
            .filter(|entry| {
                (!name_lower.is_empty() && entry.matches_name(&name_lower))
                    || (!country.is_empty() && entry.country == country)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::watch_entries;

    #[test]
    fn test_name_substring_match() {
        let list = WatchList::with_entries(watch_entries());
        let matches = list.screen("Nadir Trading", "CA");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "W-001");
    }

    #[test]
    fn test_listed_name_inside_screened_name() {
        let list = WatchList::with_entries(watch_entries());
        let matches = list.screen("Global Tehran Petro Exchange Partners", "GB");

        assert!(matches.iter().any(|m| m.id == "W-002"));
    }

    #[test]
    fn test_alias_match_is_case_insensitive() {
        let list = WatchList::with_entries(watch_entries());
        let matches = list.screen("ntc group", "");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "W-001");
    }

    #[test]
    fn test_country_match() {
        let list = WatchList::with_entries(watch_entries());
        let matches = list.screen("Unrelated Person", "IR");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].program, "IRAN");
    }

    #[test]
    fn test_no_match() {
        let list = WatchList::with_entries(watch_entries());
        assert!(list.screen("Maple Bakery", "CA").is_empty());
    }

    #[test]
    fn test_blank_inputs_never_match() {
        let list = WatchList::with_entries(watch_entries());
        assert!(list.screen("", "").is_empty());
        assert!(list.screen("   ", " ").is_empty());
    }
}
