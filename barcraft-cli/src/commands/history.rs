use clap::Args;
use std::collections::HashMap;
use uuid::Uuid;

use barcraft_core::VersionNumber;

use super::OutputFormat;
use crate::repo::Workspace;

/// Show a recipe family's version history
#[derive(Args)]
pub struct HistoryCommand {
    /// Recipe name (case-insensitive)
    pub name: String,

    /// Show at most this many entries
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl HistoryCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let manager = workspace.manager()?;
        let entries = manager.history(&self.name);
        if entries.is_empty() {
            println!("No history for '{}'.", self.name);
            return Ok(());
        }

        let numbers: HashMap<Uuid, VersionNumber> = manager
            .versions(&self.name)?
            .into_iter()
            .map(|recipe| (recipe.id, recipe.version.version_number))
            .collect();

        // Stored oldest first; rendered newest first
        let limit = self.limit.unwrap_or(entries.len());
        let newest_first: Vec<_> = entries.iter().rev().take(limit).collect();

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&newest_first)?)
            }
            OutputFormat::Text => {
                println!("History for '{}'", self.name);
                for entry in newest_first {
                    match numbers.get(&entry.version_id) {
                        Some(number) => println!("  {} [{}]", entry, number),
                        None => println!("  {}", entry),
                    }
                }
            }
        }
        Ok(())
    }
}
