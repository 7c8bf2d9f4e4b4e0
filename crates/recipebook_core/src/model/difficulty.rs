//! Difficulty derivation.
//!
//! # Invariants
//! - Output depends only on `(cooking_time, ingredient_count)`.
//! - Thresholds are strict: `< 10` minutes and `< 4` ingredients.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Cooking time (minutes) below which a recipe counts as quick.
pub const QUICK_COOKING_TIME_MINUTES: u32 = 10;
/// Ingredient count below which a recipe counts as simple.
pub const FEW_INGREDIENTS: usize = 4;

/// Derived difficulty label stored alongside each recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Quick with few ingredients.
    Easy,
    /// Quick but with many ingredients.
    Medium,
    /// Slow with few ingredients.
    Intermediate,
    /// Slow with many ingredients.
    Hard,
}

impl Difficulty {
    /// All labels in ascending order.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Intermediate,
        Difficulty::Hard,
    ];

    /// Stable lowercase label used in storage and search.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Intermediate => "intermediate",
            Self::Hard => "hard",
        }
    }

    /// Parses a stored label. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "intermediate" => Some(Self::Intermediate),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps cooking time and ingredient count to a difficulty label.
pub fn derive_difficulty(cooking_time: u32, ingredient_count: usize) -> Difficulty {
    let few_ingredients = ingredient_count < FEW_INGREDIENTS;
    if cooking_time < QUICK_COOKING_TIME_MINUTES {
        if few_ingredients {
            Difficulty::Easy
        } else {
            Difficulty::Medium
        }
    } else if few_ingredients {
        Difficulty::Intermediate
    } else {
        Difficulty::Hard
    }
}
