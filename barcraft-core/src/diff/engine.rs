//! Structural diffing of two recipe versions.
//!
//! Ingredients are matched by lower-cased name, so reordering never
//! registers as a change. Instruction steps are aligned by position, not by
//! content similarity: one step inserted early shows up as a cascade of
//! changed steps after it. This mirrors the behavior users already see and
//! is kept deliberately instead of upgrading to a sequence alignment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::models::{Ingredient, Recipe};

use super::steps::StepPolicy;

/// A before/after pair for a single changed field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Delta<T> {
    pub before: T,
    pub after: T,
}

/// An ingredient present in both versions with a differing amount or unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModifiedIngredient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Delta<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Delta<String>>,
}

/// Classification of every ingredient across the two versions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IngredientAnalysis {
    /// Present only in the second version.
    pub added: Vec<Ingredient>,
    /// Present only in the first version.
    pub removed: Vec<Ingredient>,
    pub modified: Vec<ModifiedIngredient>,
    pub unchanged: Vec<Ingredient>,
}

impl IngredientAnalysis {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// A step present at the same position in both versions with different text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepChange {
    /// 1-based step position.
    pub step_number: usize,
    pub before: String,
    pub after: String,
}

/// A step present only on the longer side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepEntry {
    /// 1-based step position.
    pub step_number: usize,
    pub text: String,
}

/// Positional diff of the two versions' instruction steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InstructionDiff {
    pub step_changes: Vec<StepChange>,
    pub added_steps: Vec<StepEntry>,
    pub removed_steps: Vec<StepEntry>,
    /// Step count of the first version after normalization.
    pub steps_a: usize,
    /// Step count of the second version after normalization.
    pub steps_b: usize,
}

impl InstructionDiff {
    pub fn is_unchanged(&self) -> bool {
        self.step_changes.is_empty()
            && self.added_steps.is_empty()
            && self.removed_steps.is_empty()
    }
}

/// The scalar metadata fields compared between versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarField {
    Category,
    Glassware,
    Garnish,
    PrepTime,
    Difficulty,
    Yields,
}

pub const SCALAR_FIELDS: [ScalarField; 6] = [
    ScalarField::Category,
    ScalarField::Glassware,
    ScalarField::Garnish,
    ScalarField::PrepTime,
    ScalarField::Difficulty,
    ScalarField::Yields,
];

impl ScalarField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarField::Category => "category",
            ScalarField::Glassware => "glassware",
            ScalarField::Garnish => "garnish",
            ScalarField::PrepTime => "prep_time",
            ScalarField::Difficulty => "difficulty",
            ScalarField::Yields => "yields",
        }
    }
}

impl fmt::Display for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

/// A differing scalar metadata field.
///
/// The record carries the raw optional values; "Not set" is a display
/// convention only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDifference {
    pub field: ScalarField,
    pub value_a: Option<String>,
    pub value_b: Option<String>,
    pub change_type: ChangeType,
}

impl fmt::Display for FieldDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not_set = "Not set";
        write!(
            f,
            "{}: {} -> {}",
            self.field,
            self.value_a.as_deref().unwrap_or(not_set),
            self.value_b.as_deref().unwrap_or(not_set)
        )
    }
}

/// The full structural difference between two recipe versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeDiff {
    pub ingredients: IngredientAnalysis,
    pub instructions: InstructionDiff,
    pub differences: Vec<FieldDifference>,
}

impl RecipeDiff {
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_unchanged()
            && self.instructions.is_unchanged()
            && self.differences.is_empty()
    }

    /// One human-readable line per change, for history entries.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for ingredient in &self.ingredients.added {
            lines.push(format!("Added ingredient: {}", ingredient));
        }
        for ingredient in &self.ingredients.removed {
            lines.push(format!("Removed ingredient: {}", ingredient));
        }
        for modified in &self.ingredients.modified {
            if let Some(amount) = &modified.amount {
                lines.push(format!(
                    "{} amount: {} -> {}",
                    modified.name, amount.before, amount.after
                ));
            }
            if let Some(unit) = &modified.unit {
                lines.push(format!(
                    "{} unit: {} -> {}",
                    modified.name, unit.before, unit.after
                ));
            }
        }
        for change in &self.instructions.step_changes {
            lines.push(format!("Step {} changed", change.step_number));
        }
        if !self.instructions.added_steps.is_empty() {
            lines.push(format!(
                "{} step(s) added",
                self.instructions.added_steps.len()
            ));
        }
        if !self.instructions.removed_steps.is_empty() {
            lines.push(format!(
                "{} step(s) removed",
                self.instructions.removed_steps.len()
            ));
        }
        for difference in &self.differences {
            lines.push(difference.to_string());
        }
        lines
    }
}

/// Computes the structural diff between two recipe versions.
///
/// Never fails: empty ingredient lists and empty instructions diff as empty
/// sequences.
pub fn diff(a: &Recipe, b: &Recipe, policy: StepPolicy) -> RecipeDiff {
    RecipeDiff {
        ingredients: diff_ingredients(&a.ingredients, &b.ingredients),
        instructions: diff_instructions(a, b, policy),
        differences: diff_scalar_fields(a, b),
    }
}

fn diff_ingredients(a: &[Ingredient], b: &[Ingredient]) -> IngredientAnalysis {
    let b_by_key: HashMap<String, &Ingredient> =
        b.iter().map(|ingredient| (ingredient.key(), ingredient)).collect();
    let a_keys: std::collections::HashSet<String> =
        a.iter().map(|ingredient| ingredient.key()).collect();

    let mut analysis = IngredientAnalysis::default();

    for ingredient in a {
        match b_by_key.get(&ingredient.key()) {
            None => analysis.removed.push(ingredient.clone()),
            Some(other) => {
                let amount = (ingredient.amount != other.amount).then(|| Delta {
                    before: ingredient.amount,
                    after: other.amount,
                });
                let unit = (ingredient.unit != other.unit).then(|| Delta {
                    before: ingredient.unit.clone(),
                    after: other.unit.clone(),
                });
                if amount.is_some() || unit.is_some() {
                    analysis.modified.push(ModifiedIngredient {
                        name: ingredient.name.clone(),
                        amount,
                        unit,
                    });
                } else {
                    analysis.unchanged.push(ingredient.clone());
                }
            }
        }
    }

    for ingredient in b {
        if !a_keys.contains(&ingredient.key()) {
            analysis.added.push(ingredient.clone());
        }
    }

    analysis
}

fn diff_instructions(a: &Recipe, b: &Recipe, policy: StepPolicy) -> InstructionDiff {
    let steps_a = policy.split(&a.instructions);
    let steps_b = policy.split(&b.instructions);

    let mut result = InstructionDiff {
        steps_a: steps_a.len(),
        steps_b: steps_b.len(),
        ..Default::default()
    };

    let shared = steps_a.len().min(steps_b.len());
    for i in 0..shared {
        if steps_a[i] != steps_b[i] {
            result.step_changes.push(StepChange {
                step_number: i + 1,
                before: steps_a[i].clone(),
                after: steps_b[i].clone(),
            });
        }
    }
    for (i, text) in steps_b.iter().enumerate().skip(shared) {
        result.added_steps.push(StepEntry {
            step_number: i + 1,
            text: text.clone(),
        });
    }
    for (i, text) in steps_a.iter().enumerate().skip(shared) {
        result.removed_steps.push(StepEntry {
            step_number: i + 1,
            text: text.clone(),
        });
    }

    result
}

fn scalar_value(recipe: &Recipe, field: ScalarField) -> Option<String> {
    match field {
        ScalarField::Category => recipe.category.clone(),
        ScalarField::Glassware => recipe.glassware.clone(),
        ScalarField::Garnish => recipe.garnish.clone(),
        ScalarField::PrepTime => recipe.prep_time.map(|minutes| minutes.to_string()),
        ScalarField::Difficulty => recipe.difficulty.clone(),
        ScalarField::Yields => recipe.yields.clone(),
    }
}

fn diff_scalar_fields(a: &Recipe, b: &Recipe) -> Vec<FieldDifference> {
    let mut differences = Vec::new();
    for field in SCALAR_FIELDS {
        let value_a = scalar_value(a, field);
        let value_b = scalar_value(b, field);
        let change_type = match (&value_a, &value_b) {
            (None, Some(_)) => ChangeType::Added,
            (Some(_), None) => ChangeType::Removed,
            (Some(left), Some(right)) if left != right => ChangeType::Modified,
            _ => continue,
        };
        differences.push(FieldDifference {
            field,
            value_a,
            value_b,
            change_type,
        });
    }
    differences
}
