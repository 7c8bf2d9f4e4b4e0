//! Recipe and ingredient records.
//!
//! # Responsibility
//! - Define read models returned by repositories.
//! - Define write requests accepted by repositories.
//!
//! # Invariants
//! - `Recipe::difficulty == derive_difficulty(cooking_time, ingredients.len())`
//!   for every value handed out by a repository.
//! - `Recipe::ingredients` holds canonical names in attach order, no repeats.

use crate::model::difficulty::{derive_difficulty, Difficulty};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned recipe identity.
pub type RecipeId = i64;
/// Store-assigned ingredient identity.
pub type IngredientId = i64;

/// Canonical ingredient record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    /// Trimmed, lowercased and unique across the catalog.
    pub name: String,
}

/// Recipe read model with its linked ingredient names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    /// Minutes, always > 0.
    pub cooking_time: u32,
    pub difficulty: Difficulty,
    pub ingredients: Vec<String>,
}

impl Recipe {
    /// Number of linked ingredients.
    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    /// Returns whether the stored difficulty matches the current inputs.
    pub fn difficulty_is_consistent(&self) -> bool {
        self.difficulty == derive_difficulty(self.cooking_time, self.ingredient_count())
    }

    /// One-line summary used in selection lists.
    pub fn summary(&self) -> String {
        format!(
            "Recipe ID: {} | {} | Difficulty: {}",
            self.id, self.name, self.difficulty
        )
    }
}

impl Display for Recipe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Recipe Name: {}", self.name)?;
        writeln!(f, "\tCooking Time: {} minutes", self.cooking_time)?;
        writeln!(f, "\tIngredients: {}", self.ingredients.join(", "))?;
        write!(f, "\tDifficulty: {}", self.difficulty)
    }
}

/// Request for creating one recipe.
///
/// Values are raw user input; the repository validates and canonicalizes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRecipe {
    pub name: String,
    pub cooking_time: i64,
    pub ingredients: Vec<String>,
}

impl NewRecipe {
    pub fn new(
        name: impl Into<String>,
        cooking_time: i64,
        ingredients: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            cooking_time,
            ingredients: ingredients.into_iter().map(Into::into).collect(),
        }
    }
}

/// Partial update request. `None` fields are left untouched.
///
/// `ingredients`, when present, replaces the whole ingredient set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub cooking_time: Option<i64>,
    pub ingredients: Option<Vec<String>>,
}

impl RecipePatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn cooking_time(mut self, minutes: i64) -> Self {
        self.cooking_time = Some(minutes);
        self
    }

    pub fn ingredients(mut self, ingredients: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ingredients = Some(ingredients.into_iter().map(Into::into).collect());
        self
    }

    /// Returns whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.cooking_time.is_none() && self.ingredients.is_none()
    }
}
