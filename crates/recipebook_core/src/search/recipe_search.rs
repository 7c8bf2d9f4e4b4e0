//! SQL-backed recipe search.
//!
//! # Invariants
//! - Results are distinct recipes ordered by id.
//! - Ingredient selections are canonicalized before matching.
//! - Text queries match literally; `%` and `_` are not wildcards.

use crate::model::ingredient::canonicalize_set;
use crate::model::recipe::Recipe;
use crate::repo::recipe_repo::{query_recipes, RepoResult, RECIPE_SELECT_SQL};
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// How a multi-ingredient selection is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientMatch {
    /// Recipe must contain every selected ingredient.
    #[default]
    All,
    /// Recipe must contain at least one selected ingredient.
    Any,
}

impl Display for IngredientMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Any => f.write_str("any"),
        }
    }
}

impl FromStr for IngredientMatch {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" | "and" => Ok(Self::All),
            "any" | "or" => Ok(Self::Any),
            other => Err(format!(
                "unsupported ingredient match `{other}`; expected all|any"
            )),
        }
    }
}

/// Ingredient search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientSearch {
    /// Raw ingredient names; canonicalized before matching.
    pub ingredients: Vec<String>,
    pub mode: IngredientMatch,
}

impl IngredientSearch {
    /// Creates a request using the default `All` policy.
    pub fn all(ingredients: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            mode: IngredientMatch::All,
        }
    }

    /// Creates a request using the `Any` policy.
    pub fn any(ingredients: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            mode: IngredientMatch::Any,
            ..Self::all(ingredients)
        }
    }
}

/// Finds recipes by linked ingredients.
///
/// Returns an empty list for an empty (or all-blank) selection.
pub fn search_by_ingredients(
    conn: &Connection,
    query: &IngredientSearch,
) -> RepoResult<Vec<Recipe>> {
    let selected = canonicalize_set(&query.ingredients);
    if selected.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; selected.len()].join(", ");
    let comparison = match query.mode {
        IngredientMatch::All => "= ?",
        IngredientMatch::Any => "> 0",
    };
    let sql = format!(
        "{RECIPE_SELECT_SQL}
         WHERE (
            SELECT COUNT(DISTINCT i.id)
            FROM recipe_ingredients ri
            INNER JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = r.id
              AND i.name IN ({placeholders})
         ) {comparison}
         ORDER BY r.id ASC;"
    );

    let mut bind_values = selected
        .iter()
        .map(|name| Value::Text(name.clone()))
        .collect::<Vec<_>>();
    if query.mode == IngredientMatch::All {
        bind_values.push(Value::Integer(selected.len() as i64));
    }

    query_recipes(conn, &sql, bind_values)
}

/// Finds recipes whose name, any ingredient, or difficulty label contains
/// `text` (case-insensitive).
///
/// A blank query returns every recipe. Names are compared through the
/// `casefold` SQL function, so `conn` must come from [`crate::db::open_db`]
/// or have passed [`crate::SqliteRecipeRepository::try_new`].
pub fn search_by_text(conn: &Connection, text: &str) -> RepoResult<Vec<Recipe>> {
    let needle = text.trim();
    if needle.is_empty() {
        return query_recipes(
            conn,
            &format!("{RECIPE_SELECT_SQL} ORDER BY r.id ASC;"),
            Vec::new(),
        );
    }

    let sql = format!(
        "{RECIPE_SELECT_SQL}
         WHERE casefold(r.name) LIKE ?1 ESCAPE '\\'
            OR r.difficulty LIKE ?1 ESCAPE '\\'
            OR EXISTS (
                SELECT 1
                FROM recipe_ingredients ri
                INNER JOIN ingredients i ON i.id = ri.ingredient_id
                WHERE ri.recipe_id = r.id
                  AND i.name LIKE ?1 ESCAPE '\\'
            )
         ORDER BY r.id ASC;"
    );
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    query_recipes(conn, &sql, vec![Value::Text(pattern)])
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
