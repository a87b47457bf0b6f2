//! Barcraft Core Library
//!
//! Recipe version control for cocktail programs: branching, semantic
//! comparison, an append-only history ledger, and debounced draft autosave.

pub mod autosave;
pub mod diff;
pub mod ledger;
pub mod lifecycle;
pub mod models;
pub mod session;
pub mod storage;

pub use autosave::{
    Autosave, AutosaveHooks, AutosaveOptions, CloseDecision, CloseOutcome, SaveState, SaveStatus,
};
pub use diff::{
    compare_recipes, ComparisonResult, RecommendedAction, Similarity, SimilarityWeights,
    StepPolicy,
};
pub use ledger::HistoryLedger;
pub use lifecycle::{BranchOptions, LifecycleError, VersionManager};
pub use models::{
    Increment, Ingredient, Instructions, Recipe, VersionAction, VersionError,
    VersionHistoryEntry, VersionMetadata, VersionNumber, VersionStatus, VersionType,
};
pub use session::{Session, SystemSession};
pub use storage::{
    Draft, DraftStore, FileDraftStore, FileRecipeStore, MemoryDraftStore, MemoryRecipeStore,
    RecipeStore, StoreError,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
