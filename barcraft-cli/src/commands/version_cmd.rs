use clap::{Args, Subcommand};

use barcraft_core::{BranchOptions, Increment, VersionType};

use super::parse_uuid;
use crate::repo::Workspace;

#[derive(Args)]
pub struct VersionCommand {
    #[command(subcommand)]
    pub command: VersionSubcommand,
}

#[derive(Subcommand)]
pub enum VersionSubcommand {
    /// Branch a new draft version from an existing one
    Branch {
        /// Base version ID (UUID)
        base: String,

        /// Name for the new version (e.g. "Smoky Twist")
        #[arg(long)]
        name: Option<String>,

        /// Version type (original, variation, improvement, seasonal, source, custom)
        #[arg(long = "type", short = 't', value_name = "TYPE", default_value = "variation")]
        version_type: String,

        /// Which version component to bump (patch, minor, major)
        #[arg(long, default_value = "minor")]
        increment: String,

        /// What changed and why
        #[arg(long, short)]
        description: Option<String>,

        /// Why this branch exists
        #[arg(long)]
        reason: Option<String>,

        /// Start from an empty ingredient list
        #[arg(long)]
        no_ingredients: bool,

        /// Start from empty instructions
        #[arg(long)]
        no_instructions: bool,

        /// Do not copy category, glassware, and the other detail fields
        #[arg(long)]
        no_metadata: bool,
    },

    /// Publish a draft version
    Publish {
        /// Version ID (UUID)
        id: String,
    },

    /// Archive a published version
    Archive {
        /// Version ID (UUID)
        id: String,
    },

    /// Restore an archived version to published
    Restore {
        /// Version ID (UUID)
        id: String,
    },

    /// Make a version its family's main version
    Promote {
        /// Version ID (UUID)
        id: String,
    },

    /// Merge one version into another, archiving the absorbed one
    Merge {
        /// Surviving version ID (UUID)
        survivor: String,

        /// Version ID to absorb (UUID)
        merged: String,
    },
}

impl VersionCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let manager = workspace.manager()?;

        match &self.command {
            VersionSubcommand::Branch {
                base,
                name,
                version_type,
                increment,
                description,
                reason,
                no_ingredients,
                no_instructions,
                no_metadata,
            } => {
                let base_id = parse_uuid(base)?;
                let version_type: VersionType = version_type.parse()?;
                let increment: Increment = increment.parse()?;

                let mut options = BranchOptions::default()
                    .with_version_type(version_type)
                    .with_increment(increment)
                    .copy_ingredients(!no_ingredients)
                    .copy_instructions(!no_instructions)
                    .copy_metadata(!no_metadata);
                if let Some(name) = name {
                    options = options.with_version_name(name);
                }
                if let Some(description) = description {
                    options = options.with_change_description(description);
                }
                if let Some(reason) = reason {
                    options = options.with_branch_reason(reason);
                }

                let branch = manager.create_version(base_id, options)?;
                workspace.save_ledger(&manager)?;
                println!(
                    "Branched '{}' {} ({})",
                    branch.name, branch.version.version_number, branch.id
                );
            }

            VersionSubcommand::Publish { id } => {
                let recipe = manager.publish(parse_uuid(id)?)?;
                workspace.save_ledger(&manager)?;
                println!(
                    "Published '{}' {}",
                    recipe.name, recipe.version.version_number
                );
            }

            VersionSubcommand::Archive { id } => {
                let recipe = manager.archive(parse_uuid(id)?)?;
                workspace.save_ledger(&manager)?;
                println!(
                    "Archived '{}' {}",
                    recipe.name, recipe.version.version_number
                );
            }

            VersionSubcommand::Restore { id } => {
                let recipe = manager.restore(parse_uuid(id)?)?;
                workspace.save_ledger(&manager)?;
                println!(
                    "Restored '{}' {}",
                    recipe.name, recipe.version.version_number
                );
            }

            VersionSubcommand::Promote { id } => {
                let recipe = manager.set_main(parse_uuid(id)?)?;
                workspace.save_ledger(&manager)?;
                println!(
                    "'{}' {} is now the main version",
                    recipe.name, recipe.version.version_number
                );
            }

            VersionSubcommand::Merge { survivor, merged } => {
                let recipe = manager.merge(parse_uuid(survivor)?, parse_uuid(merged)?)?;
                workspace.save_ledger(&manager)?;
                println!(
                    "Merged into '{}' {}",
                    recipe.name, recipe.version.version_number
                );
            }
        }
        Ok(())
    }
}
