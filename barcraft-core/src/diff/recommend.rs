//! Mapping a similarity score and diff shape to an actionable suggestion.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::engine::RecipeDiff;
use super::similarity::Similarity;

/// What to do with two compared versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// Near-identical and the second version loses nothing: fold them
    /// together.
    MergeRecommended,
    /// Same drink, different take: keep both as named variations.
    KeepAsVariation,
    /// One version contains everything the other has, plus more: the larger
    /// one can replace the smaller.
    Supersede,
    /// Too far apart to relate; treat as distinct recipes.
    KeepSeparate,
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecommendedAction::MergeRecommended => "merge recommended",
            RecommendedAction::KeepAsVariation => "keep as variation",
            RecommendedAction::Supersede => "supersede",
            RecommendedAction::KeepSeparate => "keep separate",
        };
        write!(f, "{}", s)
    }
}

const MERGE_THRESHOLD: f64 = 0.85;
const VARIATION_THRESHOLD: f64 = 0.5;

/// Deterministic recommendation from score and diff shape. No side effects.
pub fn recommend(similarity: &Similarity, diff: &RecipeDiff) -> RecommendedAction {
    if similarity.overall >= MERGE_THRESHOLD && diff.ingredients.removed.is_empty() {
        return RecommendedAction::MergeRecommended;
    }
    if similarity.overall >= VARIATION_THRESHOLD {
        return RecommendedAction::KeepAsVariation;
    }
    if second_extends_first(diff) || first_extends_second(diff) {
        return RecommendedAction::Supersede;
    }
    RecommendedAction::KeepSeparate
}

/// The second version carries everything the first has, unchanged, plus
/// strictly more.
fn second_extends_first(diff: &RecipeDiff) -> bool {
    diff.ingredients.removed.is_empty()
        && diff.ingredients.modified.is_empty()
        && diff.instructions.step_changes.is_empty()
        && diff.instructions.removed_steps.is_empty()
        && (!diff.ingredients.added.is_empty() || !diff.instructions.added_steps.is_empty())
}

fn first_extends_second(diff: &RecipeDiff) -> bool {
    diff.ingredients.added.is_empty()
        && diff.ingredients.modified.is_empty()
        && diff.instructions.step_changes.is_empty()
        && diff.instructions.added_steps.is_empty()
        && (!diff.ingredients.removed.is_empty() || !diff.instructions.removed_steps.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::engine::diff;
    use crate::diff::similarity::{score, SimilarityWeights};
    use crate::diff::steps::StepPolicy;
    use crate::models::{Ingredient, Recipe};

    fn recommend_for(a: &Recipe, b: &Recipe) -> RecommendedAction {
        let result = diff(a, b, StepPolicy::Sentences);
        let similarity = score(&result, &SimilarityWeights::default());
        recommend(&similarity, &result)
    }

    fn base() -> Recipe {
        Recipe::new("Old Fashioned", "alice")
            .with_ingredients(vec![
                Ingredient::new("Bourbon", 2.0, "oz"),
                Ingredient::new("Bitters", 2.0, "dash"),
                Ingredient::new("Sugar", 1.0, "cube"),
            ])
            .with_instructions("Muddle sugar with bitters. Add bourbon. Stir with ice.")
    }

    #[test]
    fn test_identical_versions_merge() {
        let recipe = base();
        assert_eq!(
            recommend_for(&recipe, &recipe),
            RecommendedAction::MergeRecommended
        );
    }

    #[test]
    fn test_small_tweak_merges() {
        let a = base();
        let mut b = a.clone();
        b.ingredients[0].amount = 2.5;
        assert_eq!(recommend_for(&a, &b), RecommendedAction::MergeRecommended);
    }

    #[test]
    fn test_removed_ingredient_blocks_merge() {
        // Large overlap keeps the score above the merge threshold, but the
        // removal alone must block the merge suggestion
        let mut ingredients: Vec<Ingredient> = (1..=10)
            .map(|i| Ingredient::new(format!("Component {}", i), i as f64, "oz"))
            .collect();
        let a = Recipe::new("House Blend", "alice")
            .with_ingredients(ingredients.clone())
            .with_instructions("Combine. Stir.");
        ingredients.remove(9);
        let b = Recipe::new("House Blend", "alice")
            .with_ingredients(ingredients)
            .with_instructions("Combine. Stir.");

        let result = diff(&a, &b, StepPolicy::Sentences);
        let similarity = score(&result, &SimilarityWeights::default());
        assert!(similarity.overall >= 0.85, "got {}", similarity.overall);
        assert_eq!(
            recommend(&similarity, &result),
            RecommendedAction::KeepAsVariation
        );
    }

    #[test]
    fn test_moderate_differences_keep_as_variation() {
        let a = base();
        let mut b = a.clone();
        b.ingredients[0] = Ingredient::new("Rye", 2.0, "oz");
        b.garnish = Some("Orange twist".to_string());
        assert_eq!(recommend_for(&a, &b), RecommendedAction::KeepAsVariation);
    }

    #[test]
    fn test_strict_superset_supersedes() {
        let a = Recipe::new("House Punch", "alice")
            .with_ingredients(vec![Ingredient::new("Rum", 2.0, "oz")])
            .with_instructions("Combine everything.");
        let b = Recipe::new("House Punch", "alice")
            .with_ingredients(vec![
                Ingredient::new("Rum", 2.0, "oz"),
                Ingredient::new("Lime Juice", 1.0, "oz"),
                Ingredient::new("Demerara Syrup", 0.75, "oz"),
                Ingredient::new("Nutmeg", 1.0, "pinch"),
            ])
            .with_instructions(
                "Combine everything. Shake with ice. Strain into punch bowl. Grate nutmeg on top.",
            );

        assert_eq!(recommend_for(&a, &b), RecommendedAction::Supersede);
        // Symmetric: comparing the other way is still a supersede situation
        assert_eq!(recommend_for(&b, &a), RecommendedAction::Supersede);
    }

    #[test]
    fn test_disjoint_versions_keep_separate() {
        let a = base();
        let b = Recipe::new("Old Fashioned", "alice")
            .with_ingredients(vec![
                Ingredient::new("Vodka", 2.0, "oz"),
                Ingredient::new("Espresso", 1.0, "oz"),
                Ingredient::new("Coffee Liqueur", 0.5, "oz"),
            ])
            .with_instructions("Shake hard. Double strain. Garnish with beans. Serve up.");

        assert_eq!(recommend_for(&a, &b), RecommendedAction::KeepSeparate);
    }

    #[test]
    fn test_action_serde_snake_case() {
        let json = serde_json::to_string(&RecommendedAction::MergeRecommended).unwrap();
        assert_eq!(json, "\"merge_recommended\"");
        let parsed: RecommendedAction = serde_json::from_str("\"keep_separate\"").unwrap();
        assert_eq!(parsed, RecommendedAction::KeepSeparate);
    }
}
