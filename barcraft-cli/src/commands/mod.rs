mod compare;
mod config_cmd;
mod draft;
mod history;
mod recipe;
mod version_cmd;

pub use compare::CompareCommand;
pub use config_cmd::ConfigCommand;
pub use draft::DraftCommand;
pub use history::HistoryCommand;
pub use recipe::RecipeCommand;
pub use version_cmd::VersionCommand;

use clap::ValueEnum;
use uuid::Uuid;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub(crate) fn parse_uuid(input: &str) -> Result<Uuid, String> {
    Uuid::parse_str(input).map_err(|_| format!("Invalid version ID: {}", input))
}
