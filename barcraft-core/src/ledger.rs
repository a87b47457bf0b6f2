//! Append-only version history, indexed by recipe family.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::VersionHistoryEntry;

/// An arena of immutable history entries per recipe family.
///
/// Entries can only be appended; there is no update or delete. Readers get
/// entries in timestamp order regardless of insertion order. The sort is
/// defensive: two offline clients syncing later can interleave, and under
/// clock skew the resulting order is only as good as the clocks.
///
/// The ledger itself does no I/O; callers persist and rehydrate it through
/// its serde representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistoryLedger {
    families: HashMap<String, Vec<VersionHistoryEntry>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to a family's history. The family name is matched
    /// case-insensitively.
    pub fn append(&mut self, family: &str, entry: VersionHistoryEntry) {
        self.families
            .entry(family.to_lowercase())
            .or_default()
            .push(entry);
    }

    /// A family's entries, oldest first.
    pub fn history(&self, family: &str) -> Vec<VersionHistoryEntry> {
        let mut entries = self
            .families
            .get(&family.to_lowercase())
            .cloned()
            .unwrap_or_default();
        entries.sort_by_key(|entry| entry.timestamp);
        entries
    }

    /// All family keys with at least one entry.
    pub fn families(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.families.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.families.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VersionAction;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn entry_at(offset_secs: i64, action: VersionAction) -> VersionHistoryEntry {
        VersionHistoryEntry::new(Uuid::new_v4(), action, "alice")
            .with_timestamp(Utc::now() + Duration::seconds(offset_secs))
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = HistoryLedger::new();
        assert!(ledger.is_empty());
        assert!(ledger.history("old fashioned").is_empty());
        assert!(ledger.families().is_empty());
    }

    #[test]
    fn test_append_and_read_back() {
        let mut ledger = HistoryLedger::new();
        ledger.append("Old Fashioned", entry_at(0, VersionAction::Created));
        ledger.append("Old Fashioned", entry_at(1, VersionAction::Published));

        let history = ledger.history("Old Fashioned");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, VersionAction::Created);
        assert_eq!(history[1].action, VersionAction::Published);
    }

    #[test]
    fn test_family_key_is_case_insensitive() {
        let mut ledger = HistoryLedger::new();
        ledger.append("Old Fashioned", entry_at(0, VersionAction::Created));
        assert_eq!(ledger.history("OLD FASHIONED").len(), 1);
        assert_eq!(ledger.families(), vec!["old fashioned"]);
    }

    #[test]
    fn test_history_sorts_by_timestamp_regardless_of_insertion_order() {
        let mut ledger = HistoryLedger::new();
        ledger.append("Daiquiri", entry_at(30, VersionAction::Published));
        ledger.append("Daiquiri", entry_at(10, VersionAction::Created));
        ledger.append("Daiquiri", entry_at(20, VersionAction::Modified));

        let history = ledger.history("Daiquiri");
        let actions: Vec<_> = history.iter().map(|entry| entry.action).collect();
        assert_eq!(
            actions,
            vec![
                VersionAction::Created,
                VersionAction::Modified,
                VersionAction::Published
            ]
        );
    }

    #[test]
    fn test_families_are_independent() {
        let mut ledger = HistoryLedger::new();
        ledger.append("Daiquiri", entry_at(0, VersionAction::Created));
        ledger.append("Negroni", entry_at(0, VersionAction::Created));

        assert_eq!(ledger.history("Daiquiri").len(), 1);
        assert_eq!(ledger.history("Negroni").len(), 1);
        assert_eq!(ledger.families().len(), 2);
    }

    #[test]
    fn test_ledger_json_roundtrip() {
        let mut ledger = HistoryLedger::new();
        ledger.append("Mai Tai", entry_at(0, VersionAction::Created));
        ledger.append("Mai Tai", entry_at(5, VersionAction::Branched));

        let json = serde_json::to_string(&ledger).unwrap();
        let parsed: HistoryLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ledger);
    }
}
