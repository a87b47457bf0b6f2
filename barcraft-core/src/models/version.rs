//! Semantic version numbers for recipe versions.
//!
//! Version numbers follow `major.minor[.patch]`; a missing patch component
//! defaults to 0. Numbers serialize as plain strings ("1.2.3").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when handling version numbers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format '{0}': expected major.minor[.patch]")]
    InvalidFormat(String),
}

/// Which component of a version number to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Increment {
    /// patch + 1
    Patch,
    /// minor + 1, patch reset to 0
    Minor,
    /// major + 1, minor and patch reset to 0
    Major,
}

impl FromStr for Increment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "patch" => Ok(Increment::Patch),
            "minor" => Ok(Increment::Minor),
            "major" => Ok(Increment::Major),
            other => Err(format!(
                "Unknown increment '{}'. Use patch, minor, or major.",
                other
            )),
        }
    }
}

/// A `major.minor.patch` version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNumber {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionNumber {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns the next version number for the given increment.
    ///
    /// Pure: the receiver is not modified.
    pub fn bump(&self, increment: Increment) -> Self {
        match increment {
            Increment::Patch => Self::new(self.major, self.minor, self.patch + 1),
            Increment::Minor => Self::new(self.major, self.minor + 1, 0),
            Increment::Major => Self::new(self.major + 1, 0, 0),
        }
    }
}

impl Default for VersionNumber {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

fn parse_component(part: &str, original: &str) -> Result<u32, VersionError> {
    // u32::from_str accepts a leading '+', which is not a valid version digit
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(VersionError::InvalidFormat(original.to_string()));
    }
    part.parse()
        .map_err(|_| VersionError::InvalidFormat(original.to_string()))
}

impl FromStr for VersionNumber {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [major, minor] => Ok(Self::new(
                parse_component(major, s)?,
                parse_component(minor, s)?,
                0,
            )),
            [major, minor, patch] => Ok(Self::new(
                parse_component(major, s)?,
                parse_component(minor, s)?,
                parse_component(patch, s)?,
            )),
            _ => Err(VersionError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for VersionNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for VersionNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
