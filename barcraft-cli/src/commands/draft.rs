use clap::{Args, Subcommand};

use barcraft_core::DraftStore;

use super::{parse_uuid, OutputFormat};
use crate::repo::Workspace;

#[derive(Args)]
pub struct DraftCommand {
    #[command(subcommand)]
    pub command: DraftSubcommand,
}

#[derive(Subcommand)]
pub enum DraftSubcommand {
    /// Show the autosaved draft for a version
    Show {
        /// Version ID (UUID)
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Apply a draft to its recipe and delete it
    Apply {
        /// Version ID (UUID)
        id: String,
    },

    /// Delete a draft without applying it
    Discard {
        /// Version ID (UUID)
        id: String,
    },
}

impl DraftCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let drafts = workspace.draft_store();

        match &self.command {
            DraftSubcommand::Show { id, format } => {
                let id = parse_uuid(id)?;
                let draft = drafts
                    .get(id)?
                    .ok_or_else(|| format!("No draft for {}", id))?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&draft)?)
                    }
                    OutputFormat::Text => {
                        println!("Draft saved {}", draft.saved_at.format("%Y-%m-%d %H:%M"));
                        println!();
                        print!("{}", draft.snapshot);
                    }
                }
            }

            DraftSubcommand::Apply { id } => {
                let id = parse_uuid(id)?;
                let draft = drafts
                    .get(id)?
                    .ok_or_else(|| format!("No draft for {}", id))?;

                let manager = workspace.manager()?;
                let updated = manager.update_version(draft.snapshot)?;
                drafts.delete(id)?;
                workspace.save_ledger(&manager)?;

                println!(
                    "Applied draft to '{}' {}",
                    updated.name, updated.version.version_number
                );
            }

            DraftSubcommand::Discard { id } => {
                let id = parse_uuid(id)?;
                drafts.delete(id)?;
                println!("Draft discarded.");
            }
        }
        Ok(())
    }
}
