use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }

    /// Matching key for diffing: ingredients are identified by lower-cased
    /// name, never by position.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{} {}", self.amount, self.name)
        } else {
            write!(f, "{} {} {}", self.amount, self.unit, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_new() {
        let ingredient = Ingredient::new("Bourbon", 2.0, "oz");
        assert_eq!(ingredient.name, "Bourbon");
        assert_eq!(ingredient.amount, 2.0);
        assert_eq!(ingredient.unit, "oz");
    }

    #[test]
    fn test_ingredient_display() {
        let ingredient = Ingredient::new("Bourbon", 2.5, "oz");
        assert_eq!(format!("{}", ingredient), "2.5 oz Bourbon");
    }

    #[test]
    fn test_ingredient_display_no_unit() {
        let ingredient = Ingredient::new("egg white", 1.0, "");
        assert_eq!(format!("{}", ingredient), "1 egg white");
    }

    #[test]
    fn test_ingredient_key_is_case_insensitive() {
        let a = Ingredient::new("Angostura Bitters", 2.0, "dash");
        let b = Ingredient::new("angostura bitters", 2.0, "dash");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_ingredient_json_roundtrip() {
        let ingredient = Ingredient::new("Simple Syrup", 0.75, "oz");
        let json = serde_json::to_string(&ingredient).unwrap();
        let parsed: Ingredient = serde_json::from_str(&json).unwrap();
        assert_eq!(ingredient, parsed);
    }
}
