//! Normalizing instructions into ordered step lists.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::Instructions;

/// How free-text instructions are split into steps.
///
/// Explicit step lists pass through either policy unchanged (blank entries
/// dropped); the policy only decides how to break up free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepPolicy {
    /// Split on sentence terminators (`.`, `!`, `?`).
    #[default]
    Sentences,
    /// Split on line breaks, stripping any leading "1." / "2)" numbering.
    NumberedLines,
}

impl FromStr for StepPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sentences" => Ok(StepPolicy::Sentences),
            "numbered" | "numberedlines" | "lines" => Ok(StepPolicy::NumberedLines),
            other => Err(format!(
                "Unknown step policy '{}'. Use sentences or numbered.",
                other
            )),
        }
    }
}

impl StepPolicy {
    /// Normalizes instructions into an ordered sequence of step strings.
    pub fn split(&self, instructions: &Instructions) -> Vec<String> {
        match instructions {
            Instructions::Steps(steps) => steps
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Instructions::Text(text) => match self {
                StepPolicy::Sentences => split_sentences(text),
                StepPolicy::NumberedLines => split_numbered_lines(text),
            },
        }
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut steps = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if matches!(c, '.' | '!' | '?') {
            let step = current.trim();
            if !step.is_empty() {
                steps.push(step.to_string());
            }
            current.clear();
        } else {
            current.push(c);
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        steps.push(tail.to_string());
    }
    steps
}

fn split_numbered_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_step_numbering)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Strips a leading "3." / "3)" marker from a line.
fn strip_step_numbering(line: &str) -> String {
    let trimmed = line.trim();
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return stripped.trim().to_string();
        }
    }
    trimmed.to_string()
}
