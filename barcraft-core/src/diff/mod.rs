//! Semantic comparison of recipe versions.
//!
//! The pipeline is diff -> score -> recommend: [`engine::diff`] computes the
//! structural difference, [`similarity::score`] reduces it to a normalized
//! score, and [`recommend::recommend`] turns score and diff shape into an
//! actionable suggestion. [`compare_recipes`] runs all three.

mod engine;
mod recommend;
mod similarity;
mod steps;

pub use engine::{
    diff, ChangeType, Delta, FieldDifference, IngredientAnalysis, InstructionDiff,
    ModifiedIngredient, RecipeDiff, ScalarField, StepChange, StepEntry, SCALAR_FIELDS,
};
pub use recommend::{recommend, RecommendedAction};
pub use similarity::{interpret, score, Similarity, SimilarityWeights};
pub use steps::StepPolicy;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Recipe;

/// The full result of comparing two recipe versions.
///
/// Ephemeral: computed on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonResult {
    pub version_a: Recipe,
    pub version_b: Recipe,
    pub ingredients: IngredientAnalysis,
    pub instructions: InstructionDiff,
    pub differences: Vec<FieldDifference>,
    pub similarity: Similarity,
    pub recommended_action: RecommendedAction,
}

/// Runs the diff -> score -> recommend pipeline over two recipes.
pub fn compare_recipes(
    a: &Recipe,
    b: &Recipe,
    policy: StepPolicy,
    weights: &SimilarityWeights,
) -> ComparisonResult {
    let diff = engine::diff(a, b, policy);
    let similarity = similarity::score(&diff, weights);
    let recommended_action = recommend::recommend(&similarity, &diff);

    ComparisonResult {
        version_a: a.clone(),
        version_b: b.clone(),
        ingredients: diff.ingredients,
        instructions: diff.instructions,
        differences: diff.differences,
        similarity,
        recommended_action,
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Comparing {} {} with {}",
            self.version_a.name,
            self.version_a.version.version_number,
            self.version_b.version.version_number
        )?;
        writeln!(
            f,
            "Similarity: {:.0}% ({})",
            self.similarity.overall * 100.0,
            self.similarity.interpretation
        )?;
        writeln!(f, "Recommendation: {}", self.recommended_action)?;

        if !self.ingredients.added.is_empty() {
            writeln!(f, "\nAdded ingredients:")?;
            for ingredient in &self.ingredients.added {
                writeln!(f, "  + {}", ingredient)?;
            }
        }
        if !self.ingredients.removed.is_empty() {
            writeln!(f, "\nRemoved ingredients:")?;
            for ingredient in &self.ingredients.removed {
                writeln!(f, "  - {}", ingredient)?;
            }
        }
        if !self.ingredients.modified.is_empty() {
            writeln!(f, "\nChanged ingredients:")?;
            for modified in &self.ingredients.modified {
                if let Some(amount) = &modified.amount {
                    writeln!(
                        f,
                        "  ~ {} amount: {} -> {}",
                        modified.name, amount.before, amount.after
                    )?;
                }
                if let Some(unit) = &modified.unit {
                    writeln!(
                        f,
                        "  ~ {} unit: {} -> {}",
                        modified.name, unit.before, unit.after
                    )?;
                }
            }
        }

        if !self.instructions.step_changes.is_empty() {
            writeln!(f, "\nChanged steps:")?;
            for change in &self.instructions.step_changes {
                writeln!(
                    f,
                    "  {}. \"{}\" -> \"{}\"",
                    change.step_number, change.before, change.after
                )?;
            }
        }
        if !self.instructions.added_steps.is_empty() {
            writeln!(f, "\nAdded steps:")?;
            for step in &self.instructions.added_steps {
                writeln!(f, "  {}. {}", step.step_number, step.text)?;
            }
        }
        if !self.instructions.removed_steps.is_empty() {
            writeln!(f, "\nRemoved steps:")?;
            for step in &self.instructions.removed_steps {
                writeln!(f, "  {}. {}", step.step_number, step.text)?;
            }
        }

        if !self.differences.is_empty() {
            writeln!(f, "\nDetails:")?;
            for difference in &self.differences {
                writeln!(f, "  {}", difference)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;

    #[test]
    fn test_old_fashioned_amount_tweak_end_to_end() {
        let a = Recipe::new("Old Fashioned", "alice").with_ingredients(vec![
            Ingredient::new("Bourbon", 2.0, "oz"),
            Ingredient::new("Bitters", 2.0, "dash"),
        ]);
        let mut b = a.clone();
        b.ingredients[0].amount = 2.5;

        let result = compare_recipes(&a, &b, StepPolicy::Sentences, &SimilarityWeights::default());

        assert_eq!(result.ingredients.modified.len(), 1);
        let modified = &result.ingredients.modified[0];
        assert_eq!(modified.name, "Bourbon");
        assert_eq!(
            modified.amount,
            Some(Delta {
                before: 2.0,
                after: 2.5
            })
        );
        assert_eq!(result.ingredients.unchanged.len(), 1);
        assert_eq!(result.ingredients.unchanged[0].name, "Bitters");

        assert!(result.similarity.overall < 1.0);
        assert!(result.similarity.overall > 0.85);
        assert_eq!(
            result.recommended_action,
            RecommendedAction::MergeRecommended
        );
    }

    #[test]
    fn test_comparison_display_report() {
        let a = Recipe::new("Daiquiri", "alice").with_ingredients(vec![
            Ingredient::new("White Rum", 2.0, "oz"),
            Ingredient::new("Lime Juice", 1.0, "oz"),
        ]);
        let mut b = a.clone();
        b.ingredients[1].amount = 0.75;
        b.ingredients.push(Ingredient::new("Simple Syrup", 0.5, "oz"));

        let result = compare_recipes(&a, &b, StepPolicy::Sentences, &SimilarityWeights::default());
        let report = format!("{}", result);
        assert!(report.contains("Comparing Daiquiri"));
        assert!(report.contains("+ 0.5 oz Simple Syrup"));
        assert!(report.contains("~ Lime Juice amount: 1 -> 0.75"));
        assert!(report.contains("Recommendation:"));
    }

    #[test]
    fn test_comparison_serializes_to_json() {
        let a = Recipe::new("Negroni", "alice");
        let result = compare_recipes(&a, &a, StepPolicy::Sentences, &SimilarityWeights::default());
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"recommended_action\":\"merge_recommended\""));
        let parsed: ComparisonResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
