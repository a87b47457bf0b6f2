//! Reducing a structural diff to a normalized similarity score.

use serde::{Deserialize, Serialize};

use super::engine::{RecipeDiff, SCALAR_FIELDS};

/// Relative weight of each diff dimension in the overall score.
///
/// The defaults are a tuning choice, not a contract; callers may supply
/// their own weights. Weights are normalized by their sum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimilarityWeights {
    pub ingredient: f64,
    pub instruction: f64,
    pub metadata: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            ingredient: 0.5,
            instruction: 0.35,
            metadata: 0.15,
        }
    }
}

/// Interpretation bucket boundaries.
const VERY_SIMILAR: f64 = 0.8;
const MODERATELY_SIMILAR: f64 = 0.5;

/// A normalized similarity score with its qualitative reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Similarity {
    /// In [0, 1]; 1.0 means the versions are identical across all compared
    /// dimensions.
    pub overall: f64,
    pub interpretation: String,
}

pub fn interpret(overall: f64) -> &'static str {
    if overall >= VERY_SIMILAR {
        "Very Similar"
    } else if overall >= MODERATELY_SIMILAR {
        "Moderately Similar"
    } else {
        "Significantly Different"
    }
}

/// Scores a diff into an overall similarity in [0, 1].
pub fn score(diff: &RecipeDiff, weights: &SimilarityWeights) -> Similarity {
    let ingredient = ingredient_score(diff);
    let instruction = instruction_score(diff);
    let metadata = metadata_score(diff);

    let sum = weights.ingredient + weights.instruction + weights.metadata;
    let overall = if sum > 0.0 {
        (ingredient * weights.ingredient
            + instruction * weights.instruction
            + metadata * weights.metadata)
            / sum
    } else {
        (ingredient + instruction + metadata) / 3.0
    };

    Similarity {
        overall,
        interpretation: interpret(overall).to_string(),
    }
}

fn ingredient_score(diff: &RecipeDiff) -> f64 {
    let analysis = &diff.ingredients;
    let unchanged = analysis.unchanged.len();
    let modified = analysis.modified.len();
    let total = unchanged + modified + analysis.added.len() + analysis.removed.len();
    if total == 0 {
        return 1.0;
    }
    // An amount or unit tweak is still the same ingredient: modified entries
    // count as half-matches, so a 2.0 -> 2.5 oz change on a two-ingredient
    // drink reads as near-identical rather than half-different.
    (unchanged as f64 + modified as f64 * 0.5) / total as f64
}

fn instruction_score(diff: &RecipeDiff) -> f64 {
    let instructions = &diff.instructions;
    let changed = instructions.step_changes.len()
        + instructions.added_steps.len()
        + instructions.removed_steps.len();
    let longest = instructions.steps_a.max(instructions.steps_b).max(1);
    (1.0 - changed as f64 / longest as f64).max(0.0)
}

fn metadata_score(diff: &RecipeDiff) -> f64 {
    let total = SCALAR_FIELDS.len();
    (total - diff.differences.len()) as f64 / total as f64
}
