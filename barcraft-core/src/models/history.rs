use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// The version-affecting action a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionAction {
    Created,
    Modified,
    Published,
    Archived,
    Branched,
    Merged,
}

impl fmt::Display for VersionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersionAction::Created => "created",
            VersionAction::Modified => "modified",
            VersionAction::Published => "published",
            VersionAction::Archived => "archived",
            VersionAction::Branched => "branched",
            VersionAction::Merged => "merged",
        };
        write!(f, "{}", s)
    }
}

/// One immutable line in a recipe family's history.
///
/// Entries are only ever created and appended by the lifecycle manager;
/// there is no update or delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionHistoryEntry {
    pub id: Uuid,
    pub version_id: Uuid,
    pub action: VersionAction,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub changes: Vec<String>,
    pub previous_version_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl VersionHistoryEntry {
    pub fn new(version_id: Uuid, action: VersionAction, author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            version_id,
            action,
            timestamp: Utc::now(),
            author: author.into(),
            changes: Vec::new(),
            previous_version_id: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_changes(mut self, changes: Vec<String>) -> Self {
        self.changes = changes;
        self
    }

    pub fn with_previous_version(mut self, previous: Uuid) -> Self {
        self.previous_version_id = Some(previous);
        self
    }

    pub fn with_metadata_entry(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for VersionHistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} by {}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.action,
            self.author
        )?;
        if !self.changes.is_empty() {
            write!(f, ": {}", self.changes.join("; "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_new() {
        let version_id = Uuid::new_v4();
        let entry = VersionHistoryEntry::new(version_id, VersionAction::Created, "alice");
        assert_eq!(entry.version_id, version_id);
        assert_eq!(entry.action, VersionAction::Created);
        assert_eq!(entry.author, "alice");
        assert!(entry.changes.is_empty());
        assert!(entry.previous_version_id.is_none());
        assert!(entry.metadata.is_empty());
    }

    #[test]
    fn test_entry_builder() {
        let version_id = Uuid::new_v4();
        let parent = Uuid::new_v4();
        let entry = VersionHistoryEntry::new(version_id, VersionAction::Branched, "alice")
            .with_changes(vec!["Branched from 1.0.0".to_string()])
            .with_previous_version(parent)
            .with_metadata_entry("branch_reason", "winter menu");

        assert_eq!(entry.changes.len(), 1);
        assert_eq!(entry.previous_version_id, Some(parent));
        assert_eq!(
            entry.metadata.get("branch_reason").map(String::as_str),
            Some("winter menu")
        );
    }

    #[test]
    fn test_entry_display() {
        let entry = VersionHistoryEntry::new(Uuid::new_v4(), VersionAction::Published, "bob")
            .with_changes(vec!["Ready for the menu".to_string()]);
        let line = format!("{}", entry);
        assert!(line.contains("published by bob"));
        assert!(line.contains("Ready for the menu"));
    }

    #[test]
    fn test_entry_json_roundtrip() {
        let entry = VersionHistoryEntry::new(Uuid::new_v4(), VersionAction::Merged, "alice")
            .with_previous_version(Uuid::new_v4())
            .with_metadata_entry("survivor", "true");
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: VersionHistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
