//! Recipe and draft stores.
//!
//! The engine is storage-agnostic: it talks to [`RecipeStore`] and
//! [`DraftStore`] traits. File-backed implementations keep one JSON document
//! per file under a data directory; in-memory implementations back tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Recipe;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Backend-specific failure (used by non-file stores and test doubles).
    #[error("Store failure: {0}")]
    Backend(String),
}

/// An autosaved snapshot of in-progress edits, distinct from any persisted
/// version. Keyed by the document id it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Draft {
    pub recipe_id: Uuid,
    pub snapshot: Recipe,
    pub saved_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(snapshot: Recipe) -> Self {
        Self {
            recipe_id: snapshot.id,
            snapshot,
            saved_at: Utc::now(),
        }
    }
}

/// Canonical recipe document storage.
pub trait RecipeStore: Send + Sync {
    /// Returns `Ok(None)` when no document has this id.
    fn get(&self, id: Uuid) -> Result<Option<Recipe>, StoreError>;

    /// Inserts or overwrites the document.
    fn put(&self, recipe: &Recipe) -> Result<(), StoreError>;

    /// All versions in the family with this (case-insensitive) name.
    fn list_family(&self, name: &str) -> Result<Vec<Recipe>, StoreError>;

    /// Every stored recipe.
    fn list_all(&self) -> Result<Vec<Recipe>, StoreError>;
}

/// Draft storage keyed by document id.
pub trait DraftStore: Send + Sync {
    fn get(&self, id: Uuid) -> Result<Option<Draft>, StoreError>;
    fn put(&self, draft: &Draft) -> Result<(), StoreError>;
    /// Deleting a missing draft is not an error.
    fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let value = serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn write_json<T: Serialize>(dir: &Path, path: &Path, value: &T) -> Result<(), StoreError> {
    fs::create_dir_all(dir).map_err(|e| StoreError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let contents = serde_json::to_string_pretty(value).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, contents).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// File-backed recipe store: one `<uuid>.json` per document under
/// `<data_dir>/recipes`.
#[derive(Debug, Clone)]
pub struct FileRecipeStore {
    data_dir: PathBuf,
}

impl FileRecipeStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn recipes_dir(&self) -> PathBuf {
        self.data_dir.join("recipes")
    }

    fn path(&self, id: Uuid) -> PathBuf {
        self.recipes_dir().join(format!("{}.json", id))
    }
}

impl RecipeStore for FileRecipeStore {
    fn get(&self, id: Uuid) -> Result<Option<Recipe>, StoreError> {
        read_json(&self.path(id))
    }

    fn put(&self, recipe: &Recipe) -> Result<(), StoreError> {
        write_json(&self.recipes_dir(), &self.path(recipe.id), recipe)
    }

    fn list_family(&self, name: &str) -> Result<Vec<Recipe>, StoreError> {
        let key = name.to_lowercase();
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|recipe| recipe.family_key() == key)
            .collect())
    }

    fn list_all(&self) -> Result<Vec<Recipe>, StoreError> {
        let dir = self.recipes_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: dir,
                    source: e,
                })
            }
        };

        let mut recipes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io {
                path: dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(recipe) = read_json::<Recipe>(&path)? {
                    recipes.push(recipe);
                }
            }
        }
        // Directory order is platform-dependent
        recipes.sort_by_key(|recipe| (recipe.family_key(), recipe.version.version_number));
        Ok(recipes)
    }
}

/// File-backed draft store: one `<uuid>.json` per draft under
/// `<data_dir>/drafts`.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    data_dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn drafts_dir(&self) -> PathBuf {
        self.data_dir.join("drafts")
    }

    fn path(&self, id: Uuid) -> PathBuf {
        self.drafts_dir().join(format!("{}.json", id))
    }
}

impl DraftStore for FileDraftStore {
    fn get(&self, id: Uuid) -> Result<Option<Draft>, StoreError> {
        read_json(&self.path(id))
    }

    fn put(&self, draft: &Draft) -> Result<(), StoreError> {
        write_json(&self.drafts_dir(), &self.path(draft.recipe_id), draft)
    }

    fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let path = self.path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }
}

fn lock_map<T>(map: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory recipe store.
#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    recipes: Mutex<HashMap<Uuid, Recipe>>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecipeStore for MemoryRecipeStore {
    fn get(&self, id: Uuid) -> Result<Option<Recipe>, StoreError> {
        Ok(lock_map(&self.recipes).get(&id).cloned())
    }

    fn put(&self, recipe: &Recipe) -> Result<(), StoreError> {
        lock_map(&self.recipes).insert(recipe.id, recipe.clone());
        Ok(())
    }

    fn list_family(&self, name: &str) -> Result<Vec<Recipe>, StoreError> {
        let key = name.to_lowercase();
        let mut recipes: Vec<Recipe> = lock_map(&self.recipes)
            .values()
            .filter(|recipe| recipe.family_key() == key)
            .cloned()
            .collect();
        recipes.sort_by_key(|recipe| recipe.version.version_number);
        Ok(recipes)
    }

    fn list_all(&self) -> Result<Vec<Recipe>, StoreError> {
        let mut recipes: Vec<Recipe> = lock_map(&self.recipes).values().cloned().collect();
        recipes.sort_by_key(|recipe| (recipe.family_key(), recipe.version.version_number));
        Ok(recipes)
    }
}

/// In-memory draft store.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    drafts: Mutex<HashMap<Uuid, Draft>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, id: Uuid) -> Result<Option<Draft>, StoreError> {
        Ok(lock_map(&self.drafts).get(&id).cloned())
    }

    fn put(&self, draft: &Draft) -> Result<(), StoreError> {
        lock_map(&self.drafts).insert(draft.recipe_id, draft.clone());
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        lock_map(&self.drafts).remove(&id);
        Ok(())
    }
}
