use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ingredient::Ingredient;
use super::metadata::VersionMetadata;

/// Recipe instructions: either free text or an explicit ordered step list.
///
/// Free text is normalized into steps on demand by the diff engine's
/// step policy; an explicit list is taken as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Instructions {
    Steps(Vec<String>),
    Text(String),
}

impl Instructions {
    pub fn is_empty(&self) -> bool {
        match self {
            Instructions::Steps(steps) => steps.is_empty(),
            Instructions::Text(text) => text.trim().is_empty(),
        }
    }
}

impl Default for Instructions {
    fn default() -> Self {
        Instructions::Text(String::new())
    }
}

impl From<&str> for Instructions {
    fn from(text: &str) -> Self {
        Instructions::Text(text.to_string())
    }
}

impl From<String> for Instructions {
    fn from(text: String) -> Self {
        Instructions::Text(text)
    }
}

impl From<Vec<String>> for Instructions {
    fn from(steps: Vec<String>) -> Self {
        Instructions::Steps(steps)
    }
}

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instructions::Text(text) => write!(f, "{}", text),
            Instructions::Steps(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}. {}", i + 1, step)?;
                }
                Ok(())
            }
        }
    }
}

/// A versioned recipe document.
///
/// All versions sharing a name form a version family; identity is by `id`,
/// so the name is deliberately not unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    /// A missing ingredient list reads back as empty.
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Instructions,
    pub category: Option<String>,
    pub glassware: Option<String>,
    pub garnish: Option<String>,
    pub prep_time: Option<i32>, // minutes
    pub difficulty: Option<String>,
    pub yields: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub flavor_profile: Vec<String>,
    pub version: VersionMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Creates the root version of a new recipe family.
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            ingredients: Vec::new(),
            instructions: Instructions::default(),
            category: None,
            glassware: None,
            garnish: None,
            prep_time: None,
            difficulty: None,
            yields: None,
            tags: Vec::new(),
            flavor_profile: Vec::new(),
            version: VersionMetadata::root(author),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<Instructions>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_glassware(mut self, glassware: impl Into<String>) -> Self {
        self.glassware = Some(glassware.into());
        self
    }

    pub fn with_garnish(mut self, garnish: impl Into<String>) -> Self {
        self.garnish = Some(garnish.into());
        self
    }

    pub fn with_prep_time(mut self, minutes: i32) -> Self {
        self.prep_time = Some(minutes);
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn with_yields(mut self, yields: impl Into<String>) -> Self {
        self.yields = Some(yields.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_flavor_profile(mut self, flavor_profile: Vec<String>) -> Self {
        self.flavor_profile = flavor_profile;
        self
    }

    /// Key identifying this recipe's version family (case-insensitive name).
    pub fn family_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Marks the document as edited now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;

        let main = if self.version.is_main { ", main" } else { "" };
        writeln!(
            f,
            "Version: {} \"{}\" ({}{}) {}",
            self.version.version_number,
            self.version.version_name,
            self.version.status,
            main,
            self.version.version_type
        )?;

        if let Some(category) = &self.category {
            writeln!(f, "Category: {}", category)?;
        }
        if let Some(glassware) = &self.glassware {
            writeln!(f, "Glassware: {}", glassware)?;
        }
        if let Some(garnish) = &self.garnish {
            writeln!(f, "Garnish: {}", garnish)?;
        }
        if let Some(prep) = self.prep_time {
            writeln!(f, "Prep time: {} min", prep)?;
        }
        if let Some(difficulty) = &self.difficulty {
            writeln!(f, "Difficulty: {}", difficulty)?;
        }
        if let Some(yields) = &self.yields {
            writeln!(f, "Yields: {}", yields)?;
        }
        if !self.tags.is_empty() {
            writeln!(f, "Tags: {}", self.tags.join(", "))?;
        }
        if !self.flavor_profile.is_empty() {
            writeln!(f, "Flavor: {}", self.flavor_profile.join(", "))?;
        }

        if !self.ingredients.is_empty() {
            writeln!(f, "\nIngredients:")?;
            for ingredient in &self.ingredients {
                writeln!(f, "  - {}", ingredient)?;
            }
        }

        if !self.instructions.is_empty() {
            writeln!(f, "\nInstructions:\n{}", self.instructions)?;
        }

        Ok(())
    }
}
