//! Core domain logic for the recipe book.
//! This crate is the single source of truth for catalog invariants:
//! validation, ingredient canonicalization and derived difficulty.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{load_config, AppConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::difficulty::{derive_difficulty, Difficulty};
pub use model::ingredient::{canonicalize_set, normalize};
pub use model::recipe::{Ingredient, IngredientId, NewRecipe, Recipe, RecipeId, RecipePatch};
pub use model::validation::{
    check_cooking_time, validate_cooking_time, validate_ingredient_token, validate_name,
    validate_name_with_limit, IngredientError, NameError, TimeError, ValidationError,
    CLI_NAME_MAX_CHARS, WEB_NAME_MAX_CHARS,
};
pub use repo::ingredient_repo::IngredientRepository;
pub use repo::recipe_repo::{RecipeRepository, RepoError, RepoResult, SqliteRecipeRepository};
pub use search::recipe_search::{search_by_ingredients, search_by_text, IngredientMatch, IngredientSearch};
pub use service::recipe_service::RecipeService;
pub use service::report::{
    build_chart, render_table_html, ChartData, ChartKind, RecipeReport, ReportRow, ReportService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
