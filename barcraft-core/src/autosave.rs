//! Debounced draft persistence and editor-close reconciliation.
//!
//! An [`Autosave`] belongs to one open editor and one document id. Edits are
//! recorded as full form-state snapshots; only the latest snapshot within a
//! debounce window is written. A new edit aborts and reschedules the pending
//! timer rather than queueing a second write, so there is at most one
//! pending write per document. Closing the editor only cancels the timer; a
//! write that has already started runs to completion.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Recipe;
use crate::storage::{Draft, DraftStore, StoreError};

/// Autosave tuning.
#[derive(Debug, Clone)]
pub struct AutosaveOptions {
    pub enabled: bool,
    /// Suppress the save triggered by the editor's initial state.
    pub skip_initial: bool,
    pub debounce: Duration,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_initial: false,
            debounce: Duration::from_millis(2000),
        }
    }
}

/// Lifecycle callbacks around draft writes.
#[derive(Default)]
pub struct AutosaveHooks {
    pub on_save_start: Option<Box<dyn Fn() + Send + Sync>>,
    pub on_save_success: Option<Box<dyn Fn(DateTime<Utc>) + Send + Sync>>,
    pub on_save_error: Option<Box<dyn Fn(&StoreError) + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Pending,
    Saved,
    Error,
}

/// Observable autosave state for the editor's save indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveState {
    pub status: SaveStatus,
    pub last_saved: Option<DateTime<Utc>>,
    pub has_unsaved_changes: bool,
    pub error: Option<String>,
}

impl SaveState {
    fn idle() -> Self {
        Self {
            status: SaveStatus::Idle,
            last_saved: None,
            has_unsaved_changes: false,
            error: None,
        }
    }
}

/// The editor's answer to the close-with-unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Throw the edits away and close.
    Discard,
    /// Persist the edits as the canonical document, then close.
    SaveAndClose,
    /// Stay in the editor.
    CancelClose,
}

/// What applying a [`CloseDecision`] led to.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseOutcome {
    /// Editor closed; the draft is gone.
    Closed,
    /// Caller must persist this snapshot as the canonical document and then
    /// call [`Autosave::clear_draft`]. The draft is kept until that
    /// succeeds so a failed save loses nothing.
    SaveRequired(Box<Recipe>),
    /// Close was cancelled; editing continues.
    KeptOpen,
}

struct Shared<D> {
    store: Arc<D>,
    pending: Mutex<Option<Recipe>>,
    state: Mutex<SaveState>,
    hooks: AutosaveHooks,
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Debounced draft writer for one open document.
pub struct Autosave<D: DraftStore + 'static> {
    shared: Arc<Shared<D>>,
    recipe_id: Uuid,
    options: AutosaveOptions,
    timer: Option<JoinHandle<()>>,
    saw_initial: bool,
}

impl<D: DraftStore + 'static> Autosave<D> {
    pub fn new(store: Arc<D>, recipe_id: Uuid, options: AutosaveOptions) -> Self {
        Self::with_hooks(store, recipe_id, options, AutosaveHooks::default())
    }

    pub fn with_hooks(
        store: Arc<D>,
        recipe_id: Uuid,
        options: AutosaveOptions,
        hooks: AutosaveHooks,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                pending: Mutex::new(None),
                state: Mutex::new(SaveState::idle()),
                hooks,
            }),
            recipe_id,
            options,
            timer: None,
            saw_initial: false,
        }
    }

    pub fn recipe_id(&self) -> Uuid {
        self.recipe_id
    }

    /// Current save state, for the editor's indicator.
    pub fn state(&self) -> SaveState {
        lock(&self.shared.state).clone()
    }

    /// The not-yet-persisted snapshot, if any.
    pub fn pending_snapshot(&self) -> Option<Recipe> {
        lock(&self.shared.pending).clone()
    }

    /// Records an edited form-state snapshot and (re)schedules the debounced
    /// write. The first call is suppressed when `skip_initial` is set.
    pub fn record(&mut self, snapshot: Recipe) {
        if !self.options.enabled {
            return;
        }
        if self.options.skip_initial && !self.saw_initial {
            self.saw_initial = true;
            return;
        }
        self.saw_initial = true;

        {
            let mut state = lock(&self.shared.state);
            state.status = SaveStatus::Pending;
            state.has_unsaved_changes = true;
        }
        *lock(&self.shared.pending) = Some(snapshot);

        // One pending write per document: a newer edit replaces the timer
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let shared = Arc::clone(&self.shared);
        let debounce = self.options.debounce;
        self.timer = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(debounce).await;
                if write_pending(&shared) {
                    break;
                }
                // Failed write: the snapshot is back in the pending slot
                // and is retried on the next tick, never immediately
            }
        }));
    }

    /// Persists any pending snapshot right now (explicit-save path).
    pub fn flush(&mut self) -> SaveState {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        write_pending(&self.shared);
        self.state()
    }

    /// Drops the pending timer and snapshot without writing. A write that
    /// already started is not interrupted.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        *lock(&self.shared.pending) = None;
    }

    /// Looks up an existing draft for this document, for the restore prompt
    /// shown when an editor opens.
    pub fn load_draft(&self) -> Result<Option<Draft>, StoreError> {
        self.shared.store.get(self.recipe_id)
    }

    /// Restores the draft into the editor: returns the snapshot to replace
    /// the in-memory form state and resets the dirty flag.
    pub fn restore_draft(&mut self) -> Result<Option<Recipe>, StoreError> {
        let Some(draft) = self.shared.store.get(self.recipe_id)? else {
            return Ok(None);
        };
        self.cancel();
        let mut state = lock(&self.shared.state);
        state.status = SaveStatus::Saved;
        state.last_saved = Some(draft.saved_at);
        state.has_unsaved_changes = false;
        state.error = None;
        Ok(Some(draft.snapshot))
    }

    /// Deletes the draft after an explicit save or discard.
    pub fn clear_draft(&mut self) -> Result<(), StoreError> {
        self.shared.store.delete(self.recipe_id)?;
        let mut state = lock(&self.shared.state);
        state.status = SaveStatus::Idle;
        state.has_unsaved_changes = false;
        state.error = None;
        Ok(())
    }

    /// Applies the editor's three-way close choice.
    pub fn close(&mut self, decision: CloseDecision) -> Result<CloseOutcome, StoreError> {
        match decision {
            CloseDecision::CancelClose => Ok(CloseOutcome::KeptOpen),
            CloseDecision::Discard => {
                self.cancel();
                self.clear_draft()?;
                Ok(CloseOutcome::Closed)
            }
            CloseDecision::SaveAndClose => {
                if let Some(timer) = self.timer.take() {
                    timer.abort();
                }
                if let Some(snapshot) = lock(&self.shared.pending).take() {
                    return Ok(CloseOutcome::SaveRequired(Box::new(snapshot)));
                }
                // The latest edits may already sit in the draft store
                match self.shared.store.get(self.recipe_id)? {
                    Some(draft) => Ok(CloseOutcome::SaveRequired(Box::new(draft.snapshot))),
                    None => {
                        self.clear_draft()?;
                        Ok(CloseOutcome::Closed)
                    }
                }
            }
        }
    }
}

/// Writes the pending snapshot, if any. Returns false when the write failed
/// and the snapshot was put back for the next tick.
fn write_pending<D: DraftStore>(shared: &Shared<D>) -> bool {
    let Some(snapshot) = lock(&shared.pending).take() else {
        return true;
    };

    if let Some(hook) = &shared.hooks.on_save_start {
        hook();
    }

    let draft = Draft::new(snapshot.clone());
    match shared.store.put(&draft) {
        Ok(()) => {
            {
                let mut state = lock(&shared.state);
                state.status = SaveStatus::Saved;
                state.last_saved = Some(draft.saved_at);
                state.has_unsaved_changes = false;
                state.error = None;
            }
            debug!(recipe = %draft.recipe_id, "autosaved draft");
            if let Some(hook) = &shared.hooks.on_save_success {
                hook(draft.saved_at);
            }
            true
        }
        Err(e) => {
            {
                let mut state = lock(&shared.state);
                state.status = SaveStatus::Error;
                state.error = Some(e.to_string());
                // has_unsaved_changes stays set: the indicator persists
            }
            warn!(recipe = %draft.recipe_id, error = %e, "autosave failed");
            if let Some(hook) = &shared.hooks.on_save_error {
                hook(&e);
            }
            let mut pending = lock(&shared.pending);
            if pending.is_none() {
                *pending = Some(snapshot);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, Recipe};
    use crate::storage::MemoryDraftStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn options() -> AutosaveOptions {
        AutosaveOptions {
            enabled: true,
            skip_initial: false,
            debounce: DEBOUNCE,
        }
    }

    /// Draft store double that counts writes.
    struct CountingDraftStore {
        inner: MemoryDraftStore,
        puts: AtomicUsize,
    }

    impl CountingDraftStore {
        fn new() -> Self {
            Self {
                inner: MemoryDraftStore::new(),
                puts: AtomicUsize::new(0),
            }
        }

        fn put_count(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }
    }

    impl DraftStore for CountingDraftStore {
        fn get(&self, id: Uuid) -> Result<Option<Draft>, StoreError> {
            self.inner.get(id)
        }

        fn put(&self, draft: &Draft) -> Result<(), StoreError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put(draft)
        }

        fn delete(&self, id: Uuid) -> Result<(), StoreError> {
            self.inner.delete(id)
        }
    }

    /// Draft store double that fails the first n writes.
    struct FailingDraftStore {
        inner: MemoryDraftStore,
        failures_left: AtomicUsize,
    }

    impl FailingDraftStore {
        fn failing(n: usize) -> Self {
            Self {
                inner: MemoryDraftStore::new(),
                failures_left: AtomicUsize::new(n),
            }
        }
    }

    impl DraftStore for FailingDraftStore {
        fn get(&self, id: Uuid) -> Result<Option<Draft>, StoreError> {
            self.inner.get(id)
        }

        fn put(&self, draft: &Draft) -> Result<(), StoreError> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(StoreError::Backend("disk full".to_string()));
            }
            self.inner.put(draft)
        }

        fn delete(&self, id: Uuid) -> Result<(), StoreError> {
            self.inner.delete(id)
        }
    }

    fn recipe_with_amount(amount: f64) -> Recipe {
        Recipe::new("Old Fashioned", "alice")
            .with_ingredients(vec![Ingredient::new("Bourbon", amount, "oz")])
    }

    /// Lets the spawned writer task run after the paused clock advances.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_rapid_edits() {
        let store = Arc::new(CountingDraftStore::new());
        let recipe = recipe_with_amount(2.0);
        let id = recipe.id;
        let mut autosave = Autosave::new(store.clone(), id, options());

        for amount in [2.0, 2.25, 2.5, 2.75, 3.0] {
            let mut snapshot = recipe.clone();
            snapshot.ingredients[0].amount = amount;
            autosave.record(snapshot);
        }
        assert_eq!(autosave.state().status, SaveStatus::Pending);

        tokio::time::sleep(DEBOUNCE * 2).await;
        settle().await;

        // Only the final state was persisted, in a single write
        assert_eq!(store.put_count(), 1);
        let draft = store.get(id).unwrap().unwrap();
        assert_eq!(draft.snapshot.ingredients[0].amount, 3.0);

        let state = autosave.state();
        assert_eq!(state.status, SaveStatus::Saved);
        assert!(!state.has_unsaved_changes);
        assert!(state.last_saved.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_edit_reschedules_timer() {
        let store = Arc::new(CountingDraftStore::new());
        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::new(store.clone(), recipe.id, options());

        autosave.record(recipe.clone());
        tokio::time::sleep(DEBOUNCE / 2).await;

        // Halfway through the window a new edit arrives: the clock restarts
        let mut second = recipe.clone();
        second.ingredients[0].amount = 2.5;
        autosave.record(second);

        tokio::time::sleep(DEBOUNCE / 2).await;
        settle().await;
        assert_eq!(store.put_count(), 0);

        tokio::time::sleep(DEBOUNCE).await;
        settle().await;
        assert_eq!(store.put_count(), 1);
        let draft = store.get(recipe.id).unwrap().unwrap();
        assert_eq!(draft.snapshot.ingredients[0].amount, 2.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_initial_suppresses_first_save() {
        let store = Arc::new(CountingDraftStore::new());
        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::new(
            store.clone(),
            recipe.id,
            AutosaveOptions {
                skip_initial: true,
                ..options()
            },
        );

        // The mount-time snapshot must not create a draft
        autosave.record(recipe.clone());
        tokio::time::sleep(DEBOUNCE * 2).await;
        settle().await;
        assert_eq!(store.put_count(), 0);
        assert_eq!(autosave.state().status, SaveStatus::Idle);

        // A real edit afterwards does
        let mut edited = recipe.clone();
        edited.ingredients[0].amount = 2.5;
        autosave.record(edited);
        tokio::time::sleep(DEBOUNCE * 2).await;
        settle().await;
        assert_eq!(store.put_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_autosave_never_writes() {
        let store = Arc::new(CountingDraftStore::new());
        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::new(
            store.clone(),
            recipe.id,
            AutosaveOptions {
                enabled: false,
                ..options()
            },
        );

        autosave.record(recipe);
        tokio::time::sleep(DEBOUNCE * 2).await;
        settle().await;
        assert_eq!(store.put_count(), 0);
        assert_eq!(autosave.state().status, SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_reports_and_retries_next_tick() {
        let store = Arc::new(FailingDraftStore::failing(1));
        let errors = Arc::new(AtomicUsize::new(0));
        let errors_seen = Arc::clone(&errors);
        let hooks = AutosaveHooks {
            on_save_error: Some(Box::new(move |_| {
                errors_seen.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        };

        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::with_hooks(store.clone(), recipe.id, options(), hooks);
        autosave.record(recipe.clone());

        tokio::time::sleep(DEBOUNCE + Duration::from_millis(10)).await;
        settle().await;

        // First tick failed: persistent unsaved indicator, error surfaced
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        let state = autosave.state();
        assert_eq!(state.status, SaveStatus::Error);
        assert!(state.has_unsaved_changes);
        assert!(state.error.as_deref().unwrap_or("").contains("disk full"));
        assert!(store.get(recipe.id).unwrap().is_none());

        // The retry happens one debounce tick later, not immediately
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(10)).await;
        settle().await;
        assert!(store.get(recipe.id).unwrap().is_some());
        let state = autosave.state();
        assert_eq!(state.status, SaveStatus::Saved);
        assert!(!state.has_unsaved_changes);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_write() {
        let store = Arc::new(CountingDraftStore::new());
        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::new(store.clone(), recipe.id, options());

        autosave.record(recipe);
        autosave.cancel();

        tokio::time::sleep(DEBOUNCE * 2).await;
        settle().await;
        assert_eq!(store.put_count(), 0);
        assert!(autosave.pending_snapshot().is_none());
    }

    #[tokio::test]
    async fn test_flush_writes_immediately() {
        let store = Arc::new(CountingDraftStore::new());
        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::new(store.clone(), recipe.id, options());

        autosave.record(recipe.clone());
        let state = autosave.flush();

        assert_eq!(store.put_count(), 1);
        assert_eq!(state.status, SaveStatus::Saved);
        assert!(store.get(recipe.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_hooks_fire_on_success() {
        let store = Arc::new(MemoryDraftStore::new());
        let started = Arc::new(AtomicUsize::new(0));
        let succeeded = Arc::new(AtomicUsize::new(0));
        let started_seen = Arc::clone(&started);
        let succeeded_seen = Arc::clone(&succeeded);
        let hooks = AutosaveHooks {
            on_save_start: Some(Box::new(move || {
                started_seen.fetch_add(1, Ordering::SeqCst);
            })),
            on_save_success: Some(Box::new(move |_| {
                succeeded_seen.fetch_add(1, Ordering::SeqCst);
            })),
            on_save_error: None,
        };

        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::with_hooks(store, recipe.id, options(), hooks);
        autosave.record(recipe);
        autosave.flush();

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(succeeded.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_restore_draft_resets_dirty_flag() {
        let store = Arc::new(MemoryDraftStore::new());
        let recipe = recipe_with_amount(2.75);
        store.put(&Draft::new(recipe.clone())).unwrap();

        let mut autosave = Autosave::new(store, recipe.id, options());
        let found = autosave.load_draft().unwrap();
        assert!(found.is_some());

        let restored = autosave.restore_draft().unwrap().unwrap();
        assert_eq!(restored.ingredients[0].amount, 2.75);
        let state = autosave.state();
        assert!(!state.has_unsaved_changes);
        assert!(state.last_saved.is_some());
    }

    #[tokio::test]
    async fn test_restore_without_draft_returns_none() {
        let store = Arc::new(MemoryDraftStore::new());
        let mut autosave = Autosave::new(store, Uuid::new_v4(), options());
        assert!(autosave.restore_draft().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_discard_deletes_draft() {
        let store = Arc::new(MemoryDraftStore::new());
        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::new(store.clone(), recipe.id, options());

        autosave.record(recipe.clone());
        autosave.flush();
        assert!(store.get(recipe.id).unwrap().is_some());

        let outcome = autosave.close(CloseDecision::Discard).unwrap();
        assert_eq!(outcome, CloseOutcome::Closed);
        assert!(store.get(recipe.id).unwrap().is_none());
        assert!(!autosave.state().has_unsaved_changes);
    }

    #[tokio::test]
    async fn test_close_save_and_close_hands_back_snapshot() {
        let store = Arc::new(MemoryDraftStore::new());
        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::new(store.clone(), recipe.id, options());

        let mut edited = recipe.clone();
        edited.ingredients[0].amount = 3.0;
        autosave.record(edited);

        let outcome = autosave.close(CloseDecision::SaveAndClose).unwrap();
        match outcome {
            CloseOutcome::SaveRequired(snapshot) => {
                assert_eq!(snapshot.ingredients[0].amount, 3.0);
            }
            other => panic!("expected SaveRequired, got {:?}", other),
        }

        // After the caller persists the document, the draft is cleared
        autosave.clear_draft().unwrap();
        assert!(store.get(recipe.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_save_and_close_falls_back_to_stored_draft() {
        // The debounce already flushed: the draft holds the latest edits
        let store = Arc::new(MemoryDraftStore::new());
        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::new(store.clone(), recipe.id, options());

        let mut edited = recipe.clone();
        edited.ingredients[0].amount = 3.0;
        autosave.record(edited);
        autosave.flush();
        assert!(autosave.pending_snapshot().is_none());

        let outcome = autosave.close(CloseDecision::SaveAndClose).unwrap();
        match outcome {
            CloseOutcome::SaveRequired(snapshot) => {
                assert_eq!(snapshot.ingredients[0].amount, 3.0);
            }
            other => panic!("expected SaveRequired, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_cancel_keeps_editing() {
        let store = Arc::new(MemoryDraftStore::new());
        let recipe = recipe_with_amount(2.0);
        let mut autosave = Autosave::new(store, recipe.id, options());

        autosave.record(recipe);
        let outcome = autosave.close(CloseDecision::CancelClose).unwrap();
        assert_eq!(outcome, CloseOutcome::KeptOpen);
        assert!(autosave.pending_snapshot().is_some());
    }
}
