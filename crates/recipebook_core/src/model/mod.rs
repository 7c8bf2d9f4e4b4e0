//! Recipe catalog domain model.
//!
//! # Responsibility
//! - Define the records persisted by the catalog (`Recipe`, `Ingredient`).
//! - Own the pure rules: difficulty derivation, ingredient canonicalization
//!   and user-input validation.
//!
//! # Invariants
//! - Everything in this module is free of I/O; repositories call into it.
//! - `Recipe::difficulty` is never set from user input, only derived.

pub mod difficulty;
pub mod ingredient;
pub mod recipe;
pub mod validation;
