//! Recipe repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `recipes` and the `recipe_ingredients` link table.
//! - Keep `recipes.difficulty` consistent with cooking time and link count.
//!
//! # Invariants
//! - Every write runs in one `IMMEDIATE` transaction; any error rolls back
//!   all rows written by that call, including new ingredient rows.
//! - All validation happens before the first write of a call.
//! - Raw field writes and the difficulty recompute are separate steps; the
//!   recompute only touches `difficulty` and runs once per call.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{register_functions, DbError};
use crate::model::difficulty::{derive_difficulty, Difficulty};
use crate::model::ingredient::{canonicalize_set, normalize};
use crate::model::recipe::{IngredientId, NewRecipe, Recipe, RecipeId, RecipePatch};
use crate::model::validation::{
    check_cooking_time, validate_ingredient_token, validate_name_with_limit, IngredientError,
    NameError, TimeError, ValidationError, WEB_NAME_MAX_CHARS,
};
use crate::search::recipe_search::{self, IngredientSearch};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) const RECIPE_SELECT_SQL: &str = "SELECT
    r.id,
    r.name,
    r.cooking_time,
    r.difficulty
FROM recipes r";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for recipe/ingredient persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    /// User input rejected before any write.
    Validation(ValidationError),
    /// Storage backend failure.
    Db(DbError),
    /// Target recipe does not exist.
    NotFound(RecipeId),
    /// Target ingredient does not exist.
    IngredientNotFound(IngredientId),
    /// Ingredient is not linked to the recipe.
    LinkNotFound {
        recipe_id: RecipeId,
        ingredient: String,
    },
    /// Ingredient is already linked to the recipe.
    DuplicateLink {
        recipe_id: RecipeId,
        ingredient: String,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl RepoError {
    /// Returns the field-level validation error, if this is one.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "recipe not found: {id}"),
            Self::IngredientNotFound(id) => write!(f, "ingredient not found: {id}"),
            Self::LinkNotFound {
                recipe_id,
                ingredient,
            } => write!(
                f,
                "ingredient `{ingredient}` is not linked to recipe {recipe_id}"
            ),
            Self::DuplicateLink {
                recipe_id,
                ingredient,
            } => write!(
                f,
                "ingredient `{ingredient}` is already linked to recipe {recipe_id}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "recipe repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "recipe repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted recipe data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<NameError> for RepoError {
    fn from(value: NameError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<TimeError> for RepoError {
    fn from(value: TimeError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<IngredientError> for RepoError {
    fn from(value: IngredientError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for recipe operations.
pub trait RecipeRepository {
    /// Validates, canonicalizes and inserts one recipe with its links.
    fn create_recipe(&mut self, recipe: &NewRecipe) -> RepoResult<Recipe>;
    /// Applies the provided fields, then recomputes difficulty once.
    fn update_recipe(&mut self, id: RecipeId, patch: &RecipePatch) -> RepoResult<Recipe>;
    /// Deletes one recipe; its links cascade, ingredients stay.
    fn delete_recipe(&mut self, id: RecipeId) -> RepoResult<()>;
    /// Links one ingredient (created on first use) to a recipe.
    fn attach_ingredient(&mut self, id: RecipeId, ingredient: &str) -> RepoResult<Recipe>;
    /// Removes one ingredient link from a recipe.
    fn detach_ingredient(&mut self, id: RecipeId, ingredient: &str) -> RepoResult<Recipe>;
    fn get_recipe(&self, id: RecipeId) -> RepoResult<Recipe>;
    /// Lists all recipes in creation order.
    fn list_recipes(&self) -> RepoResult<Vec<Recipe>>;
    fn recipe_count(&self) -> RepoResult<u64>;
    /// Finds recipes by linked ingredients using the query's match mode.
    fn search_by_ingredients(&self, query: &IngredientSearch) -> RepoResult<Vec<Recipe>>;
    /// Case-insensitive substring search over name, ingredients and difficulty.
    fn search_by_text(&self, text: &str) -> RepoResult<Vec<Recipe>>;
}

/// SQLite-backed recipe repository.
pub struct SqliteRecipeRepository<'conn> {
    pub(crate) conn: &'conn mut Connection,
    name_max_chars: usize,
}

impl<'conn> SqliteRecipeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// Recipe names are limited to the storage-wide maximum; see
    /// [`Self::with_name_max_chars`] for the shorter CLI limit.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_recipe_connection_ready(conn)?;
        Ok(Self {
            conn,
            name_max_chars: WEB_NAME_MAX_CHARS,
        })
    }

    /// Overrides the recipe name length limit, capped at the storage limit.
    pub fn with_name_max_chars(mut self, max_chars: usize) -> Self {
        self.name_max_chars = max_chars.clamp(1, WEB_NAME_MAX_CHARS);
        self
    }

    /// Effective recipe name length limit.
    pub fn name_max_chars(&self) -> usize {
        self.name_max_chars
    }
}

impl RecipeRepository for SqliteRecipeRepository<'_> {
    fn create_recipe(&mut self, recipe: &NewRecipe) -> RepoResult<Recipe> {
        let name_max_chars = self.name_max_chars;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = names_matching(&tx, recipe.name.trim())?;
        let name = validate_name_with_limit(
            &recipe.name,
            existing.iter().map(String::as_str),
            None,
            name_max_chars,
        )?;
        let cooking_time = check_cooking_time(recipe.cooking_time)?;
        let ingredients = validate_ingredients(&recipe.ingredients)?;

        // Links inserted below are exactly `ingredients`, so the count is final.
        let difficulty = derive_difficulty(cooking_time, ingredients.len());
        tx.execute(
            "INSERT INTO recipes (name, cooking_time, difficulty) VALUES (?1, ?2, ?3);",
            params![name.as_str(), cooking_time, difficulty.as_str()],
        )
        .map_err(|err| map_name_conflict(err, &name))?;
        let recipe_id = tx.last_insert_rowid();

        for ingredient in &ingredients {
            let ingredient_id = ensure_ingredient(&tx, ingredient)?;
            insert_link(&tx, recipe_id, ingredient_id, ingredient)?;
        }

        let created = load_recipe(&tx, recipe_id)?.ok_or(RepoError::NotFound(recipe_id))?;
        tx.commit()?;
        Ok(created)
    }

    fn update_recipe(&mut self, id: RecipeId, patch: &RecipePatch) -> RepoResult<Recipe> {
        let name_max_chars = self.name_max_chars;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = load_recipe(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        if patch.is_empty() {
            return Ok(current);
        }

        let name = match patch.name.as_deref() {
            Some(raw) => {
                let existing = names_matching(&tx, raw.trim())?;
                Some(validate_name_with_limit(
                    raw,
                    existing.iter().map(String::as_str),
                    Some(current.name.as_str()),
                    name_max_chars,
                )?)
            }
            None => None,
        };
        let cooking_time = patch.cooking_time.map(check_cooking_time).transpose()?;
        let ingredients = patch
            .ingredients
            .as_deref()
            .map(validate_ingredients)
            .transpose()?;

        if name.is_some() || cooking_time.is_some() {
            tx.execute(
                "UPDATE recipes
                 SET
                    name = COALESCE(?2, name),
                    cooking_time = COALESCE(?3, cooking_time),
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![id, name.as_deref(), cooking_time],
            )
            .map_err(|err| map_name_conflict(err, name.as_deref().unwrap_or_default()))?;
        }

        if let Some(ingredients) = ingredients.as_deref() {
            replace_links(&tx, id, &current.ingredients, ingredients)?;
        }

        recompute_difficulty(&tx, id)?;
        let updated = load_recipe(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_recipe(&mut self, id: RecipeId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM recipes WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn attach_ingredient(&mut self, id: RecipeId, ingredient: &str) -> RepoResult<Recipe> {
        let canonical = validate_ingredient_token(ingredient)?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !recipe_exists(&tx, id)? {
            return Err(RepoError::NotFound(id));
        }

        let ingredient_id = ensure_ingredient(&tx, &canonical)?;
        insert_link(&tx, id, ingredient_id, &canonical)?;
        recompute_difficulty(&tx, id)?;

        let updated = load_recipe(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(updated)
    }

    fn detach_ingredient(&mut self, id: RecipeId, ingredient: &str) -> RepoResult<Recipe> {
        let canonical = normalize(ingredient);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !recipe_exists(&tx, id)? {
            return Err(RepoError::NotFound(id));
        }

        let changed = tx.execute(
            "DELETE FROM recipe_ingredients
             WHERE recipe_id = ?1
               AND ingredient_id = (SELECT id FROM ingredients WHERE name = ?2);",
            params![id, canonical.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::LinkNotFound {
                recipe_id: id,
                ingredient: canonical,
            });
        }
        recompute_difficulty(&tx, id)?;

        let updated = load_recipe(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(updated)
    }

    fn get_recipe(&self, id: RecipeId) -> RepoResult<Recipe> {
        load_recipe(self.conn, id)?.ok_or(RepoError::NotFound(id))
    }

    fn list_recipes(&self) -> RepoResult<Vec<Recipe>> {
        query_recipes(
            self.conn,
            &format!("{RECIPE_SELECT_SQL} ORDER BY r.id ASC;"),
            Vec::new(),
        )
    }

    fn recipe_count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM recipes;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative recipe count `{count}`")))
    }

    fn search_by_ingredients(&self, query: &IngredientSearch) -> RepoResult<Vec<Recipe>> {
        recipe_search::search_by_ingredients(self.conn, query)
    }

    fn search_by_text(&self, text: &str) -> RepoResult<Vec<Recipe>> {
        recipe_search::search_by_text(self.conn, text)
    }
}

/// Canonicalizes and validates a full ingredient list.
fn validate_ingredients(raw: &[String]) -> RepoResult<Vec<String>> {
    canonicalize_set(raw)
        .iter()
        .map(|token| validate_ingredient_token(token).map_err(RepoError::from))
        .collect()
}

/// Recomputes and stores `difficulty` from current persisted state.
///
/// Only writes the `difficulty` column; never re-enters the update path.
pub(crate) fn recompute_difficulty(conn: &Connection, id: RecipeId) -> RepoResult<Difficulty> {
    let (cooking_time, ingredient_count) = conn
        .query_row(
            "SELECT
                r.cooking_time,
                (SELECT COUNT(*) FROM recipe_ingredients ri WHERE ri.recipe_id = r.id)
             FROM recipes r
             WHERE r.id = ?1;",
            [id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?
        .ok_or(RepoError::NotFound(id))?;

    let cooking_time = parse_cooking_time(cooking_time)?;
    let ingredient_count = usize::try_from(ingredient_count).map_err(|_| {
        RepoError::InvalidData(format!("invalid link count `{ingredient_count}`"))
    })?;
    let difficulty = derive_difficulty(cooking_time, ingredient_count);

    conn.execute(
        "UPDATE recipes SET difficulty = ?2 WHERE id = ?1;",
        params![id, difficulty.as_str()],
    )?;
    debug!(
        "event=difficulty_recompute module=repo status=ok recipe_id={} ingredient_count={} difficulty={}",
        id, ingredient_count, difficulty
    );
    Ok(difficulty)
}

/// Replaces a recipe's link set by diff: drops removed links, appends new ones.
fn replace_links(
    conn: &Connection,
    id: RecipeId,
    current: &[String],
    desired: &[String],
) -> RepoResult<()> {
    let desired_set = desired.iter().map(String::as_str).collect::<HashSet<_>>();
    let current_set = current.iter().map(String::as_str).collect::<HashSet<_>>();

    for name in current.iter().filter(|name| !desired_set.contains(name.as_str())) {
        conn.execute(
            "DELETE FROM recipe_ingredients
             WHERE recipe_id = ?1
               AND ingredient_id = (SELECT id FROM ingredients WHERE name = ?2);",
            params![id, name.as_str()],
        )?;
    }

    for name in desired.iter().filter(|name| !current_set.contains(name.as_str())) {
        let ingredient_id = ensure_ingredient(conn, name)?;
        insert_link(conn, id, ingredient_id, name)?;
    }

    Ok(())
}

/// Returns the id of a canonical ingredient, inserting it when missing.
pub(crate) fn ensure_ingredient(conn: &Connection, canonical: &str) -> RepoResult<IngredientId> {
    conn.execute(
        "INSERT OR IGNORE INTO ingredients (name) VALUES (?1);",
        [canonical],
    )?;
    let id = conn.query_row(
        "SELECT id FROM ingredients WHERE name = ?1;",
        [canonical],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn insert_link(
    conn: &Connection,
    recipe_id: RecipeId,
    ingredient_id: IngredientId,
    ingredient: &str,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, position)
         SELECT ?1, ?2, COALESCE(MAX(position) + 1, 0)
         FROM recipe_ingredients
         WHERE recipe_id = ?1;",
        params![recipe_id, ingredient_id],
    )
    .map_err(|err| {
        if is_unique_violation(&err) {
            RepoError::DuplicateLink {
                recipe_id,
                ingredient: ingredient.to_string(),
            }
        } else {
            err.into()
        }
    })?;
    Ok(())
}

fn map_name_conflict(err: rusqlite::Error, name: &str) -> RepoError {
    if is_unique_violation(&err) {
        return NameError::Duplicate(name.to_string()).into();
    }
    err.into()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

fn names_matching(conn: &Connection, name: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM recipes WHERE name = ?1;")?;
    let mut rows = stmt.query([name])?;
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        names.push(row.get(0)?);
    }
    Ok(names)
}

pub(crate) fn recipe_exists(conn: &Connection, id: RecipeId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM recipes WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn load_recipe(conn: &Connection, id: RecipeId) -> RepoResult<Option<Recipe>> {
    let mut recipes = query_recipes(
        conn,
        &format!("{RECIPE_SELECT_SQL} WHERE r.id = ?;"),
        vec![Value::Integer(id)],
    )?;
    Ok(recipes.pop())
}

/// Runs a recipe select and attaches each row's ingredient names.
pub(crate) fn query_recipes(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<Recipe>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut recipes = Vec::new();
    while let Some(row) = rows.next()? {
        recipes.push(parse_recipe_row(conn, row)?);
    }
    Ok(recipes)
}

fn parse_recipe_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Recipe> {
    let id: RecipeId = row.get("id")?;
    let cooking_time = parse_cooking_time(row.get("cooking_time")?)?;

    let difficulty_text: String = row.get("difficulty")?;
    let difficulty = Difficulty::parse(&difficulty_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid difficulty `{difficulty_text}` in recipes.difficulty"
        ))
    })?;

    Ok(Recipe {
        id,
        name: row.get("name")?,
        cooking_time,
        difficulty,
        ingredients: load_ingredient_names(conn, id)?,
    })
}

fn parse_cooking_time(value: i64) -> RepoResult<u32> {
    check_cooking_time(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid cooking time `{value}` in recipes.cooking_time"
        ))
    })
}

fn load_ingredient_names(conn: &Connection, recipe_id: RecipeId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT i.name
         FROM recipe_ingredients ri
         INNER JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = ?1
         ORDER BY ri.position ASC, i.name ASC;",
    )?;
    let mut rows = stmt.query([recipe_id])?;
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        names.push(row.get(0)?);
    }
    Ok(names)
}

fn ensure_recipe_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["recipes", "ingredients", "recipe_ingredients"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    // Connections opened outside `open_db` lack the text search helpers.
    register_functions(conn)?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
