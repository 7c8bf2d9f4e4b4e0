//! Ingredient catalog operations.
//!
//! # Responsibility
//! - Explicit add/list/delete of canonical ingredient records.
//!
//! # Invariants
//! - Ingredients outlive their links; nothing here deletes one implicitly.
//! - Deleting an ingredient recomputes difficulty for every recipe that lost
//!   a link, inside the same transaction.

use crate::model::ingredient::normalize;
use crate::model::recipe::{Ingredient, IngredientId, RecipeId};
use crate::model::validation::validate_ingredient_token;
use crate::repo::recipe_repo::{
    ensure_ingredient, recompute_difficulty, RepoError, RepoResult, SqliteRecipeRepository,
};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

/// Repository interface for ingredient records.
pub trait IngredientRepository {
    /// Creates an ingredient; returns the existing record for a known name.
    fn add_ingredient(&mut self, name: &str) -> RepoResult<Ingredient>;
    /// Looks up an ingredient by its canonical form.
    fn find_ingredient(&self, name: &str) -> RepoResult<Option<Ingredient>>;
    /// Lists all ingredients sorted by name.
    fn list_ingredients(&self) -> RepoResult<Vec<Ingredient>>;
    /// Lists ingredients linked to at least one recipe, sorted by name.
    fn list_used_ingredients(&self) -> RepoResult<Vec<Ingredient>>;
    /// Deletes an ingredient and its links.
    fn delete_ingredient(&mut self, id: IngredientId) -> RepoResult<()>;
}

impl IngredientRepository for SqliteRecipeRepository<'_> {
    fn add_ingredient(&mut self, name: &str) -> RepoResult<Ingredient> {
        let canonical = validate_ingredient_token(name)?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = ensure_ingredient(&tx, &canonical)?;
        tx.commit()?;
        Ok(Ingredient {
            id,
            name: canonical,
        })
    }

    fn find_ingredient(&self, name: &str) -> RepoResult<Option<Ingredient>> {
        let canonical = normalize(name);
        let found = self
            .conn
            .query_row(
                "SELECT id, name FROM ingredients WHERE name = ?1;",
                [canonical.as_str()],
                |row| {
                    Ok(Ingredient {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    fn list_ingredients(&self) -> RepoResult<Vec<Ingredient>> {
        query_ingredients(
            self.conn,
            "SELECT id, name FROM ingredients ORDER BY name ASC;",
        )
    }

    fn list_used_ingredients(&self) -> RepoResult<Vec<Ingredient>> {
        query_ingredients(
            self.conn,
            "SELECT i.id, i.name
             FROM ingredients i
             WHERE EXISTS (
                SELECT 1 FROM recipe_ingredients ri WHERE ri.ingredient_id = i.id
             )
             ORDER BY i.name ASC;",
        )
    }

    fn delete_ingredient(&mut self, id: IngredientId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let affected = linked_recipe_ids(&tx, id)?;

        let changed = tx.execute("DELETE FROM ingredients WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::IngredientNotFound(id));
        }

        for recipe_id in affected {
            recompute_difficulty(&tx, recipe_id)?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn linked_recipe_ids(conn: &Connection, ingredient_id: IngredientId) -> RepoResult<Vec<RecipeId>> {
    let mut stmt = conn.prepare(
        "SELECT recipe_id
         FROM recipe_ingredients
         WHERE ingredient_id = ?1
         ORDER BY recipe_id ASC;",
    )?;
    let mut rows = stmt.query([ingredient_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

fn query_ingredients(conn: &Connection, sql: &str) -> RepoResult<Vec<Ingredient>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut ingredients = Vec::new();
    while let Some(row) = rows.next()? {
        ingredients.push(Ingredient {
            id: row.get("id")?,
            name: row.get("name")?,
        });
    }
    Ok(ingredients)
}
