//! Store and manager wiring for CLI commands.
//!
//! Each invocation rehydrates the history ledger from `history.json` in the
//! data directory and writes it back after a mutating command; the core
//! ledger itself does no I/O.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use barcraft_core::{
    AutosaveOptions, FileDraftStore, FileRecipeStore, HistoryLedger, SystemSession,
    VersionManager,
};

use crate::config::Config;

pub type CliManager = VersionManager<FileRecipeStore, SystemSession>;

pub struct Workspace {
    data_dir: PathBuf,
    author: String,
    autosave_enabled: bool,
    autosave_debounce: Duration,
}

impl Workspace {
    pub fn new(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir.value.clone(),
            author: config.author.value.clone(),
            autosave_enabled: config.autosave.enabled,
            autosave_debounce: Duration::from_millis(config.autosave.debounce_ms),
        }
    }

    fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.json")
    }

    pub fn manager(&self) -> Result<CliManager, Box<dyn std::error::Error>> {
        let ledger = self.load_ledger()?;
        let store = Arc::new(FileRecipeStore::new(self.data_dir.clone()));
        Ok(VersionManager::new(store, SystemSession::new(&self.author)).with_ledger(ledger))
    }

    pub fn draft_store(&self) -> Arc<FileDraftStore> {
        Arc::new(FileDraftStore::new(self.data_dir.clone()))
    }

    pub fn autosave_options(&self) -> AutosaveOptions {
        AutosaveOptions {
            enabled: self.autosave_enabled,
            skip_initial: false,
            debounce: self.autosave_debounce,
        }
    }

    fn load_ledger(&self) -> Result<HistoryLedger, Box<dyn std::error::Error>> {
        let path = self.history_path();
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HistoryLedger::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persists the manager's ledger back to disk. Call after any command
    /// that appended history.
    pub fn save_ledger(&self, manager: &CliManager) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(&self.data_dir)?;
        let contents = serde_json::to_string_pretty(&manager.ledger_snapshot())?;
        fs::write(self.history_path(), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AutosaveConfig, ConfigSource, ConfigValue};
    use barcraft_core::Recipe;
    use tempfile::TempDir;

    fn test_workspace() -> (Workspace, TempDir) {
        let temp = TempDir::new().unwrap();
        let config = Config {
            data_dir: ConfigValue::new(temp.path().to_path_buf(), ConfigSource::Default),
            author: ConfigValue::new("alice".to_string(), ConfigSource::Default),
            config_file: None,
            autosave: AutosaveConfig::default(),
        };
        (Workspace::new(&config), temp)
    }

    #[test]
    fn test_ledger_roundtrip_through_disk() {
        let (workspace, _temp) = test_workspace();

        let manager = workspace.manager().unwrap();
        manager
            .create_root(Recipe::new("Old Fashioned", "alice"))
            .unwrap();
        workspace.save_ledger(&manager).unwrap();

        let reloaded = workspace.manager().unwrap();
        assert_eq!(reloaded.history("Old Fashioned").len(), 1);
    }

    #[test]
    fn test_missing_history_file_starts_empty() {
        let (workspace, _temp) = test_workspace();
        let manager = workspace.manager().unwrap();
        assert!(manager.history("Anything").is_empty());
    }
}
