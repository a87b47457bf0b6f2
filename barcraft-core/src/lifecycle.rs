//! Version lifecycle management.
//!
//! Every status transition, branch, merge, and main-version promotion goes
//! through [`VersionManager`], which is the only writer to the history
//! ledger. Status rules: draft -> published -> archived -> published; a
//! version never returns to draft once published.

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::diff::{
    compare_recipes, diff, ComparisonResult, SimilarityWeights, StepPolicy,
};
use crate::ledger::HistoryLedger;
use crate::models::{
    Increment, Instructions, Recipe, VersionAction, VersionHistoryEntry, VersionNumber,
    VersionStatus, VersionType,
};
use crate::session::Session;
use crate::storage::{RecipeStore, StoreError};

/// Errors from lifecycle operations.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Version not found: {0}")]
    VersionNotFound(Uuid),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Version {number} already exists for '{name}'")]
    DuplicateVersionNumber { name: String, number: VersionNumber },

    /// Main-version promotion could not be applied as a single unit. The
    /// promotion is rejected whole; this reaching a caller means the store
    /// misbehaved mid-update.
    #[error("Main-version promotion failed: {0}")]
    AtomicityViolation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a new branch copies from its parent version.
#[derive(Debug, Clone)]
pub struct BranchOptions {
    pub version_name: String,
    pub version_type: VersionType,
    pub increment: Increment,
    pub change_description: String,
    pub branch_reason: Option<String>,
    pub copy_ingredients: bool,
    pub copy_instructions: bool,
    pub copy_metadata: bool,
}

impl Default for BranchOptions {
    fn default() -> Self {
        Self {
            version_name: String::new(),
            version_type: VersionType::Variation,
            increment: Increment::Minor,
            change_description: String::new(),
            branch_reason: None,
            copy_ingredients: true,
            copy_instructions: true,
            copy_metadata: true,
        }
    }
}

impl BranchOptions {
    pub fn with_version_name(mut self, name: impl Into<String>) -> Self {
        self.version_name = name.into();
        self
    }

    pub fn with_version_type(mut self, version_type: VersionType) -> Self {
        self.version_type = version_type;
        self
    }

    pub fn with_increment(mut self, increment: Increment) -> Self {
        self.increment = increment;
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

    pub fn copy_ingredients(mut self, copy: bool) -> Self {
        self.copy_ingredients = copy;
        self
    }

    pub fn copy_instructions(mut self, copy: bool) -> Self {
        self.copy_instructions = copy;
        self
    }

    pub fn copy_metadata(mut self, copy: bool) -> Self {
        self.copy_metadata = copy;
        self
    }
}

/// Manages the versions of recipe families against a store.
///
/// Main-version promotion must update every sibling as one unit; the
/// manager serializes promotions through an in-process lock and rolls the
/// family back if the store fails mid-update.
pub struct VersionManager<S, C> {
    store: Arc<S>,
    session: C,
    ledger: Mutex<HistoryLedger>,
    promote_lock: Mutex<()>,
    policy: StepPolicy,
    weights: SimilarityWeights,
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<S: RecipeStore, C: Session> VersionManager<S, C> {
    pub fn new(store: Arc<S>, session: C) -> Self {
        Self {
            store,
            session,
            ledger: Mutex::new(HistoryLedger::new()),
            promote_lock: Mutex::new(()),
            policy: StepPolicy::default(),
            weights: SimilarityWeights::default(),
        }
    }

    /// Rehydrates a previously saved ledger.
    pub fn with_ledger(mut self, ledger: HistoryLedger) -> Self {
        self.ledger = Mutex::new(ledger);
        self
    }

    pub fn with_step_policy(mut self, policy: StepPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_weights(mut self, weights: SimilarityWeights) -> Self {
        self.weights = weights;
        self
    }

    /// A snapshot of the ledger, for persistence by the caller.
    pub fn ledger_snapshot(&self) -> HistoryLedger {
        lock(&self.ledger).clone()
    }

    fn require(&self, id: Uuid) -> Result<Recipe, LifecycleError> {
        self.store
            .get(id)?
            .ok_or(LifecycleError::VersionNotFound(id))
    }

    fn entry(&self, version_id: Uuid, action: VersionAction) -> VersionHistoryEntry {
        VersionHistoryEntry::new(version_id, action, self.session.author())
            .with_timestamp(self.session.now())
    }

    fn record(&self, family: &str, entry: VersionHistoryEntry) {
        debug!(family, action = %entry.action, "recorded history entry");
        lock(&self.ledger).append(family, entry);
    }

    /// Creates the first version of a new recipe family.
    pub fn create_root(&self, mut recipe: Recipe) -> Result<Recipe, LifecycleError> {
        if !self.store.list_family(&recipe.name)?.is_empty() {
            return Err(LifecycleError::InvalidTransition(format!(
                "'{}' already has versions; branch from one of them instead",
                recipe.name
            )));
        }

        recipe.version.status = VersionStatus::Draft;
        recipe.version.is_main = true;
        recipe.version.parent_version_id = None;
        self.store.put(&recipe)?;

        let entry = self
            .entry(recipe.id, VersionAction::Created)
            .with_changes(vec![format!("Created {}", recipe.version.version_number)]);
        self.record(&recipe.name, entry);
        info!(recipe = %recipe.name, version = %recipe.version.version_number, "created recipe family");
        Ok(recipe)
    }

    /// Branches a new version from an existing one.
    ///
    /// The new version starts in draft, is never the main version, and
    /// carries `parent_version_id` back to its source.
    pub fn create_version(
        &self,
        base_id: Uuid,
        options: BranchOptions,
    ) -> Result<Recipe, LifecycleError> {
        let base = self.require(base_id)?;
        let next_number = base.version.version_number.bump(options.increment);

        let family = self.store.list_family(&base.name)?;
        if family
            .iter()
            .any(|sibling| sibling.version.version_number == next_number)
        {
            return Err(LifecycleError::DuplicateVersionNumber {
                name: base.name.clone(),
                number: next_number,
            });
        }

        let now = self.session.now();
        let mut branch = Recipe::new(&base.name, self.session.author());
        branch.created_at = now;
        branch.updated_at = now;

        if options.copy_ingredients {
            branch.ingredients = base.ingredients.clone();
        }
        if options.copy_instructions {
            branch.instructions = base.instructions.clone();
        } else {
            branch.instructions = Instructions::default();
        }
        if options.copy_metadata {
            branch.category = base.category.clone();
            branch.glassware = base.glassware.clone();
            branch.garnish = base.garnish.clone();
            branch.prep_time = base.prep_time;
            branch.difficulty = base.difficulty.clone();
            branch.yields = base.yields.clone();
            branch.tags = base.tags.clone();
            branch.flavor_profile = base.flavor_profile.clone();
        }

        branch.version.version_number = next_number;
        branch.version.version_name = options.version_name;
        branch.version.version_type = options.version_type;
        branch.version.status = VersionStatus::Draft;
        branch.version.is_main = false;
        branch.version.change_description = options.change_description;
        branch.version.branch_reason = options.branch_reason.clone();
        branch.version.parent_version_id = Some(base_id);
        branch.version.created_at = now;

        self.store.put(&branch)?;

        let mut entry = self
            .entry(branch.id, VersionAction::Branched)
            .with_previous_version(base_id)
            .with_changes(vec![format!(
                "Branched {} from {}",
                next_number, base.version.version_number
            )]);
        if let Some(reason) = &options.branch_reason {
            entry = entry.with_metadata_entry("branch_reason", reason);
        }
        self.record(&branch.name, entry);
        info!(recipe = %branch.name, version = %next_number, "branched version");
        Ok(branch)
    }

    /// Persists edits to an existing version.
    ///
    /// Status, main flag, version number, and parentage are owned by the
    /// state machine and cannot be changed through an update. A no-op edit
    /// writes nothing and appends nothing.
    pub fn update_version(&self, edited: Recipe) -> Result<Recipe, LifecycleError> {
        let existing = self.require(edited.id)?;
        if existing.version.status == VersionStatus::Archived {
            return Err(LifecycleError::InvalidTransition(
                "archived versions are read-only; restore first".to_string(),
            ));
        }

        let mut next = edited;
        next.name = existing.name.clone();
        next.version.version_number = existing.version.version_number;
        next.version.status = existing.version.status;
        next.version.is_main = existing.version.is_main;
        next.version.parent_version_id = existing.version.parent_version_id;
        next.version.author = existing.version.author.clone();
        next.version.created_at = existing.version.created_at;

        let changes = diff(&existing, &next, self.policy).summary();
        if changes.is_empty() && existing.version == next.version {
            return Ok(existing);
        }

        next.updated_at = self.session.now();
        self.store.put(&next)?;

        let entry = self
            .entry(next.id, VersionAction::Modified)
            .with_changes(changes);
        self.record(&next.name, entry);
        Ok(next)
    }

    /// Publishes a draft. Requires a non-empty change description.
    pub fn publish(&self, id: Uuid) -> Result<Recipe, LifecycleError> {
        let mut recipe = self.require(id)?;
        match recipe.version.status {
            VersionStatus::Draft => {}
            VersionStatus::Published => {
                return Err(LifecycleError::InvalidTransition(
                    "version is already published".to_string(),
                ))
            }
            VersionStatus::Archived => {
                return Err(LifecycleError::InvalidTransition(
                    "archived versions are restored, not published".to_string(),
                ))
            }
        }
        if recipe.version.change_description.trim().is_empty() {
            return Err(LifecycleError::InvalidTransition(
                "publishing requires a change description".to_string(),
            ));
        }

        recipe.version.status = VersionStatus::Published;
        self.store.put(&recipe)?;

        let entry = self
            .entry(id, VersionAction::Published)
            .with_changes(vec![recipe.version.change_description.clone()]);
        self.record(&recipe.name, entry);
        info!(recipe = %recipe.name, version = %recipe.version.version_number, "published");
        Ok(recipe)
    }

    /// Archives a published version. Drafts cannot be archived.
    pub fn archive(&self, id: Uuid) -> Result<Recipe, LifecycleError> {
        let mut recipe = self.require(id)?;
        match recipe.version.status {
            VersionStatus::Published => {}
            VersionStatus::Draft => {
                return Err(LifecycleError::InvalidTransition(
                    "only published versions can be archived".to_string(),
                ))
            }
            VersionStatus::Archived => {
                return Err(LifecycleError::InvalidTransition(
                    "version is already archived".to_string(),
                ))
            }
        }

        recipe.version.status = VersionStatus::Archived;
        self.store.put(&recipe)?;
        let entry = self.entry(id, VersionAction::Archived);
        self.record(&recipe.name, entry);
        info!(recipe = %recipe.name, version = %recipe.version.version_number, "archived");
        Ok(recipe)
    }

    /// Brings an archived version back to published.
    pub fn restore(&self, id: Uuid) -> Result<Recipe, LifecycleError> {
        let mut recipe = self.require(id)?;
        if recipe.version.status != VersionStatus::Archived {
            return Err(LifecycleError::InvalidTransition(
                "only archived versions can be restored".to_string(),
            ));
        }

        recipe.version.status = VersionStatus::Published;
        self.store.put(&recipe)?;

        let entry = self
            .entry(id, VersionAction::Published)
            .with_metadata_entry("restored", "true");
        self.record(&recipe.name, entry);
        info!(recipe = %recipe.name, version = %recipe.version.version_number, "restored");
        Ok(recipe)
    }

    /// Combines two versions of one family: the survivor stays active, the
    /// other is archived. If the absorbed version was the family's main
    /// version, the survivor takes over the flag in the same operation.
    pub fn merge(&self, survivor_id: Uuid, merged_id: Uuid) -> Result<Recipe, LifecycleError> {
        if survivor_id == merged_id {
            return Err(LifecycleError::InvalidTransition(
                "cannot merge a version into itself".to_string(),
            ));
        }
        let mut survivor = self.require(survivor_id)?;
        let mut merged = self.require(merged_id)?;
        if survivor.family_key() != merged.family_key() {
            return Err(LifecycleError::InvalidTransition(format!(
                "'{}' and '{}' are different recipes",
                survivor.name, merged.name
            )));
        }

        let _guard = lock(&self.promote_lock);
        let transfer_main = merged.version.is_main;
        merged.version.status = VersionStatus::Archived;
        merged.version.is_main = false;
        self.store.put(&merged)?;
        if transfer_main {
            survivor.version.is_main = true;
            self.store.put(&survivor)?;
        }

        let entry = self
            .entry(survivor_id, VersionAction::Merged)
            .with_previous_version(merged_id)
            .with_changes(vec![format!(
                "Absorbed {}",
                merged.version.version_number
            )]);
        self.record(&survivor.name, entry);
        info!(
            recipe = %survivor.name,
            survivor = %survivor.version.version_number,
            merged = %merged.version.version_number,
            "merged versions"
        );
        Ok(survivor)
    }

    /// Promotes a version to be its family's main version, demoting every
    /// sibling in the same atomic unit.
    pub fn set_main(&self, id: Uuid) -> Result<Recipe, LifecycleError> {
        let _guard = lock(&self.promote_lock);

        let mut target = self.require(id)?;
        if target.version.is_main {
            return Ok(target);
        }

        let family = self.store.list_family(&target.name)?;
        let mut demoted: Vec<Recipe> = Vec::new();
        for sibling in family {
            if sibling.id != id && sibling.version.is_main {
                let mut updated = sibling.clone();
                updated.version.is_main = false;
                if let Err(e) = self.store.put(&updated) {
                    self.rollback_promotion(&demoted);
                    return Err(LifecycleError::AtomicityViolation(e.to_string()));
                }
                demoted.push(sibling);
            }
        }

        target.version.is_main = true;
        if let Err(e) = self.store.put(&target) {
            self.rollback_promotion(&demoted);
            return Err(LifecycleError::AtomicityViolation(e.to_string()));
        }

        let entry = self
            .entry(id, VersionAction::Modified)
            .with_changes(vec!["Set as main version".to_string()]);
        self.record(&target.name, entry);
        info!(recipe = %target.name, version = %target.version.version_number, "promoted to main");
        Ok(target)
    }

    fn rollback_promotion(&self, demoted: &[Recipe]) {
        for original in demoted {
            if let Err(e) = self.store.put(original) {
                warn!(version = %original.id, error = %e, "rollback of demoted sibling failed");
            }
        }
    }

    /// Loads both versions and runs the diff -> score -> recommend pipeline.
    pub fn compare(&self, id_a: Uuid, id_b: Uuid) -> Result<ComparisonResult, LifecycleError> {
        let a = self.require(id_a)?;
        let b = self.require(id_b)?;
        Ok(compare_recipes(&a, &b, self.policy, &self.weights))
    }

    /// A family's history entries, oldest first.
    pub fn history(&self, family: &str) -> Vec<VersionHistoryEntry> {
        lock(&self.ledger).history(family)
    }

    /// A family's versions, ordered by version number.
    pub fn versions(&self, family: &str) -> Result<Vec<Recipe>, LifecycleError> {
        let mut versions = self.store.list_family(family)?;
        versions.sort_by_key(|recipe| recipe.version.version_number);
        Ok(versions)
    }

    /// Every stored recipe version.
    pub fn all_versions(&self) -> Result<Vec<Recipe>, LifecycleError> {
        Ok(self.store.list_all()?)
    }
}
