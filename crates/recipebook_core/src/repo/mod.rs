//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate user input before persistence.
//! - Link changes happen only through repository calls, so each one has a
//!   single explicit difficulty recompute.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateLink`) in
//!   addition to DB transport errors.

pub mod ingredient_repo;
pub mod recipe_repo;
