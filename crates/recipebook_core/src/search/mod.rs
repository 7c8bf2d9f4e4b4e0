//! Recipe search entry points.
//!
//! # Responsibility
//! - Ingredient-based and free-text recipe lookup.
//! - Keep result shaping (distinct, id order) inside core.

pub mod recipe_search;
