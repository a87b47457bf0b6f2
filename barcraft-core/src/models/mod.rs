mod history;
mod ingredient;
mod metadata;
mod recipe;
mod version;

pub use history::{VersionAction, VersionHistoryEntry};
pub use ingredient::Ingredient;
pub use metadata::{VersionMetadata, VersionStatus, VersionType};
pub use recipe::{Instructions, Recipe};
pub use version::{Increment, VersionError, VersionNumber};
