use clap::{Args, ValueEnum};

use barcraft_core::StepPolicy;

use super::{parse_uuid, OutputFormat};
use crate::repo::Workspace;

#[derive(Clone, ValueEnum, Default)]
pub enum PolicyArg {
    #[default]
    Sentences,
    Numbered,
}

/// Compare two versions and get a recommendation
#[derive(Args)]
pub struct CompareCommand {
    /// First version ID (UUID)
    pub a: String,

    /// Second version ID (UUID)
    pub b: String,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// How free-text instructions are split into steps
    #[arg(long, value_enum, default_value = "sentences")]
    pub steps: PolicyArg,
}

impl CompareCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let policy = match self.steps {
            PolicyArg::Sentences => StepPolicy::Sentences,
            PolicyArg::Numbered => StepPolicy::NumberedLines,
        };
        let manager = workspace.manager()?.with_step_policy(policy);
        let result = manager.compare(parse_uuid(&self.a)?, parse_uuid(&self.b)?)?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            OutputFormat::Text => print!("{}", result),
        }
        Ok(())
    }
}
