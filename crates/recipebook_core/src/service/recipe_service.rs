//! Recipe use-case service.
//!
//! # Responsibility
//! - Provide stable catalog entry points for the CLI and web layers.
//! - Apply the configured ingredient search policy.
//! - Emit one metadata-only log event per write.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.
//! - Log events carry ids and error codes, never user-entered text.

use crate::model::recipe::{Ingredient, IngredientId, NewRecipe, Recipe, RecipeId, RecipePatch};
use crate::repo::ingredient_repo::IngredientRepository;
use crate::repo::recipe_repo::{RecipeRepository, RepoError, RepoResult};
use crate::search::recipe_search::{IngredientMatch, IngredientSearch};
use log::{error, info, warn};
use std::time::Instant;

/// Use-case service over a recipe + ingredient repository.
pub struct RecipeService<R> {
    repo: R,
    ingredient_match: IngredientMatch,
}

impl<R> RecipeService<R>
where
    R: RecipeRepository + IngredientRepository,
{
    /// Creates a service using the default `All` ingredient policy.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            ingredient_match: IngredientMatch::default(),
        }
    }

    /// Sets the policy used by [`Self::search_by_ingredients`].
    pub fn with_ingredient_match(mut self, mode: IngredientMatch) -> Self {
        self.ingredient_match = mode;
        self
    }

    pub fn ingredient_match(&self) -> IngredientMatch {
        self.ingredient_match
    }

    pub fn create_recipe(&mut self, recipe: &NewRecipe) -> RepoResult<Recipe> {
        let started_at = Instant::now();
        let result = self.repo.create_recipe(recipe);
        let recipe_id = result.as_ref().ok().map(|created| created.id);
        log_write("recipe_create", started_at, recipe_id, &result);
        result
    }

    /// Applies a partial update; an empty patch returns the stored recipe.
    pub fn update_recipe(&mut self, id: RecipeId, patch: &RecipePatch) -> RepoResult<Recipe> {
        let started_at = Instant::now();
        let result = self.repo.update_recipe(id, patch);
        log_write("recipe_update", started_at, Some(id), &result);
        result
    }

    pub fn delete_recipe(&mut self, id: RecipeId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.delete_recipe(id);
        log_write("recipe_delete", started_at, Some(id), &result);
        result
    }

    pub fn attach_ingredient(&mut self, id: RecipeId, ingredient: &str) -> RepoResult<Recipe> {
        let started_at = Instant::now();
        let result = self.repo.attach_ingredient(id, ingredient);
        log_write("link_attach", started_at, Some(id), &result);
        result
    }

    pub fn detach_ingredient(&mut self, id: RecipeId, ingredient: &str) -> RepoResult<Recipe> {
        let started_at = Instant::now();
        let result = self.repo.detach_ingredient(id, ingredient);
        log_write("link_detach", started_at, Some(id), &result);
        result
    }

    pub fn get_recipe(&self, id: RecipeId) -> RepoResult<Recipe> {
        self.repo.get_recipe(id)
    }

    pub fn list_recipes(&self) -> RepoResult<Vec<Recipe>> {
        self.repo.list_recipes()
    }

    pub fn recipe_count(&self) -> RepoResult<u64> {
        self.repo.recipe_count()
    }

    /// Searches by ingredients using the configured match policy.
    pub fn search_by_ingredients(&self, ingredients: &[String]) -> RepoResult<Vec<Recipe>> {
        self.repo.search_by_ingredients(&IngredientSearch {
            ingredients: ingredients.to_vec(),
            mode: self.ingredient_match,
        })
    }

    pub fn search_by_text(&self, text: &str) -> RepoResult<Vec<Recipe>> {
        self.repo.search_by_text(text)
    }

    /// Ingredients offered in the search picker: those used by any recipe.
    pub fn searchable_ingredients(&self) -> RepoResult<Vec<Ingredient>> {
        self.repo.list_used_ingredients()
    }

    pub fn list_ingredients(&self) -> RepoResult<Vec<Ingredient>> {
        self.repo.list_ingredients()
    }

    pub fn add_ingredient(&mut self, name: &str) -> RepoResult<Ingredient> {
        let started_at = Instant::now();
        let result = self.repo.add_ingredient(name);
        log_write("ingredient_add", started_at, None, &result);
        result
    }

    pub fn delete_ingredient(&mut self, id: IngredientId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.delete_ingredient(id);
        log_write("ingredient_delete", started_at, None, &result);
        result
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }
}

fn log_write<T>(
    event: &'static str,
    started_at: Instant,
    recipe_id: Option<RecipeId>,
    result: &RepoResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    let recipe_id = recipe_id.map_or_else(|| "none".to_string(), |id| id.to_string());
    match result {
        Ok(_) => info!(
            "event={event} module=service status=ok recipe_id={recipe_id} duration_ms={duration_ms}"
        ),
        Err(RepoError::Validation(err)) => warn!(
            "event={event} module=service status=rejected recipe_id={recipe_id} duration_ms={duration_ms} error_code={}",
            err.code()
        ),
        Err(err) => error!(
            "event={event} module=service status=error recipe_id={recipe_id} duration_ms={duration_ms} error_code={}",
            error_code(err)
        ),
    }
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation",
        RepoError::Db(_) => "storage",
        RepoError::NotFound(_) => "recipe_not_found",
        RepoError::IngredientNotFound(_) => "ingredient_not_found",
        RepoError::LinkNotFound { .. } => "link_not_found",
        RepoError::DuplicateLink { .. } => "duplicate_link",
        RepoError::UninitializedConnection { .. } => "uninitialized_connection",
        RepoError::MissingRequiredTable(_) => "missing_table",
        RepoError::InvalidData(_) => "invalid_data",
    }
}
