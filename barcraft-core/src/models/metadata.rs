use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::version::VersionNumber;

/// What kind of version this is relative to its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    Original,
    Variation,
    Improvement,
    Seasonal,
    Source,
    Custom,
}

impl fmt::Display for VersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersionType::Original => "original",
            VersionType::Variation => "variation",
            VersionType::Improvement => "improvement",
            VersionType::Seasonal => "seasonal",
            VersionType::Source => "source",
            VersionType::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for VersionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "original" => Ok(VersionType::Original),
            "variation" => Ok(VersionType::Variation),
            "improvement" => Ok(VersionType::Improvement),
            "seasonal" => Ok(VersionType::Seasonal),
            "source" => Ok(VersionType::Source),
            "custom" => Ok(VersionType::Custom),
            other => Err(format!("Unknown version type '{}'", other)),
        }
    }
}

/// Lifecycle status of a version.
///
/// Legal transitions: draft -> published -> archived -> published.
/// A version never returns to draft once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Draft,
    Published,
    Archived,
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersionStatus::Draft => "draft",
            VersionStatus::Published => "published",
            VersionStatus::Archived => "archived",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for VersionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(VersionStatus::Draft),
            "published" => Ok(VersionStatus::Published),
            "archived" => Ok(VersionStatus::Archived),
            other => Err(format!("Unknown version status '{}'", other)),
        }
    }
}

/// Version bookkeeping attached to every recipe document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionMetadata {
    pub version_number: VersionNumber,
    pub version_name: String,
    pub version_type: VersionType,
    pub status: VersionStatus,
    /// Exactly one version per recipe family carries this flag.
    pub is_main: bool,
    pub change_description: String,
    pub branch_reason: Option<String>,
    /// The version this one branched from; None for a family root.
    pub parent_version_id: Option<Uuid>,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl VersionMetadata {
    /// Metadata for the first version of a new recipe family.
    ///
    /// Roots start at 1.0.0 as the family's main version, in draft.
    pub fn root(author: impl Into<String>) -> Self {
        Self {
            version_number: VersionNumber::default(),
            version_name: "Original".to_string(),
            version_type: VersionType::Original,
            status: VersionStatus::Draft,
            is_main: true,
            change_description: "Initial version".to_string(),
            branch_reason: None,
            parent_version_id: None,
            author: author.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_version_name(mut self, name: impl Into<String>) -> Self {
        self.version_name = name.into();
        self
    }

    pub fn with_version_type(mut self, version_type: VersionType) -> Self {
        self.version_type = version_type;
        self
    }

    pub fn with_change_description(mut self, description: impl Into<String>) -> Self {
        self.change_description = description.into();
        self
    }

    pub fn with_branch_reason(mut self, reason: impl Into<String>) -> Self {
        self.branch_reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_metadata() {
        let meta = VersionMetadata::root("alice");
        assert_eq!(meta.version_number.to_string(), "1.0.0");
        assert_eq!(meta.version_type, VersionType::Original);
        assert_eq!(meta.status, VersionStatus::Draft);
        assert!(meta.is_main);
        assert!(meta.parent_version_id.is_none());
        assert_eq!(meta.author, "alice");
    }

    #[test]
    fn test_metadata_builder() {
        let meta = VersionMetadata::root("alice")
            .with_version_name("Smoky Twist")
            .with_version_type(VersionType::Variation)
            .with_branch_reason("Trying mezcal instead of tequila")
            .with_change_description("Swapped the base spirit");

        assert_eq!(meta.version_name, "Smoky Twist");
        assert_eq!(meta.version_type, VersionType::Variation);
        assert_eq!(
            meta.branch_reason.as_deref(),
            Some("Trying mezcal instead of tequila")
        );
        assert_eq!(meta.change_description, "Swapped the base spirit");
    }

    #[test]
    fn test_status_display_and_parse() {
        for status in [
            VersionStatus::Draft,
            VersionStatus::Published,
            VersionStatus::Archived,
        ] {
            let parsed: VersionStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("retired".parse::<VersionStatus>().is_err());
    }

    #[test]
    fn test_type_display_and_parse() {
        for vt in [
            VersionType::Original,
            VersionType::Variation,
            VersionType::Improvement,
            VersionType::Seasonal,
            VersionType::Source,
            VersionType::Custom,
        ] {
            let parsed: VersionType = vt.to_string().parse().unwrap();
            assert_eq!(parsed, vt);
        }
    }

    #[test]
    fn test_metadata_json_roundtrip() {
        let meta = VersionMetadata::root("alice").with_version_name("Original");
        let json = serde_json::to_string(&meta).unwrap();
        let parsed: VersionMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meta);
        assert!(json.contains("\"1.0.0\""));
        assert!(json.contains("\"draft\""));
    }
}
