//! User-input validation for recipe names, cooking times and ingredients.
//!
//! # Responsibility
//! - Turn raw user text into validated values or a typed error the caller
//!   can show next to the offending field.
//!
//! # Invariants
//! - Validators are pure; uniqueness is checked against the names passed in.
//! - Recipe names keep their typed casing; ingredient names are lowercased.
//! - Lengths are counted in chars, after trimming.

use crate::model::ingredient::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum recipe name length accepted by the interactive CLI.
pub const CLI_NAME_MAX_CHARS: usize = 50;
/// Maximum recipe name length accepted by the web forms and storage.
pub const WEB_NAME_MAX_CHARS: usize = 128;
/// Maximum canonical ingredient name length.
pub const INGREDIENT_MAX_CHARS: usize = 128;

static NAME_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{Alphabetic}\p{N}]+$").expect("valid name regex"));
static INGREDIENT_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Alphabetic}+$").expect("valid ingredient regex"));

/// Recipe name rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooLong { max_chars: usize, actual_chars: usize },
    /// Something other than letters, digits and spaces.
    InvalidChars(String),
    /// Another recipe already uses this exact name.
    Duplicate(String),
}

impl Display for NameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "name cannot be empty"),
            Self::TooLong {
                max_chars,
                actual_chars,
            } => write!(
                f,
                "name must be between 1 and {max_chars} characters, got {actual_chars}"
            ),
            Self::InvalidChars(value) => {
                write!(f, "name `{value}` must be alphanumeric (spaces allowed)")
            }
            Self::Duplicate(value) => write!(f, "a recipe named `{value}` already exists"),
        }
    }
}

impl Error for NameError {}

/// Cooking time rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    NotNumeric(String),
    NotPositive(i64),
}

impl Display for TimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotNumeric(value) => {
                write!(f, "cooking time `{value}` is not a whole number of minutes")
            }
            Self::NotPositive(value) => {
                write!(f, "cooking time must be greater than zero, got {value}")
            }
        }
    }
}

impl Error for TimeError {}

/// Ingredient token rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngredientError {
    /// Blank, or something other than letters and spaces.
    InvalidChars(String),
    TooLong { max_chars: usize, actual_chars: usize },
}

impl Display for IngredientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidChars(value) => {
                write!(f, "invalid ingredient `{value}`: use letters and spaces only")
            }
            Self::TooLong {
                max_chars,
                actual_chars,
            } => write!(
                f,
                "ingredient must be at most {max_chars} characters, got {actual_chars}"
            ),
        }
    }
}

impl Error for IngredientError {}

/// Field-level validation failure surfaced by repository writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Name(NameError),
    CookingTime(TimeError),
    Ingredient(IngredientError),
}

impl ValidationError {
    /// Stable machine-readable code for logs and form layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Name(NameError::Empty) => "name_empty",
            Self::Name(NameError::TooLong { .. }) => "name_too_long",
            Self::Name(NameError::InvalidChars(_)) => "name_invalid_chars",
            Self::Name(NameError::Duplicate(_)) => "name_duplicate",
            Self::CookingTime(TimeError::NotNumeric(_)) => "time_not_numeric",
            Self::CookingTime(TimeError::NotPositive(_)) => "time_not_positive",
            Self::Ingredient(IngredientError::InvalidChars(_)) => "ingredient_invalid_chars",
            Self::Ingredient(IngredientError::TooLong { .. }) => "ingredient_too_long",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(err) => write!(f, "{err}"),
            Self::CookingTime(err) => write!(f, "{err}"),
            Self::Ingredient(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Name(err) => Some(err),
            Self::CookingTime(err) => Some(err),
            Self::Ingredient(err) => Some(err),
        }
    }
}

impl From<NameError> for ValidationError {
    fn from(value: NameError) -> Self {
        Self::Name(value)
    }
}

impl From<TimeError> for ValidationError {
    fn from(value: TimeError) -> Self {
        Self::CookingTime(value)
    }
}

impl From<IngredientError> for ValidationError {
    fn from(value: IngredientError) -> Self {
        Self::Ingredient(value)
    }
}

/// Validates a recipe name using the storage-wide length limit.
///
/// See [`validate_name_with_limit`].
pub fn validate_name<'a, I>(
    candidate: &str,
    existing_names: I,
    current_name: Option<&str>,
) -> Result<String, NameError>
where
    I: IntoIterator<Item = &'a str>,
{
    validate_name_with_limit(candidate, existing_names, current_name, WEB_NAME_MAX_CHARS)
}

/// Validates a recipe name and returns its trimmed form.
///
/// `current_name` is the name the recipe already has during an edit; keeping
/// it unchanged is not a duplicate. Comparison is case-sensitive.
pub fn validate_name_with_limit<'a, I>(
    candidate: &str,
    existing_names: I,
    current_name: Option<&str>,
    max_chars: usize,
) -> Result<String, NameError>
where
    I: IntoIterator<Item = &'a str>,
{
    let name = candidate.trim();
    let actual_chars = name.chars().count();
    if actual_chars == 0 {
        return Err(NameError::Empty);
    }
    if actual_chars > max_chars {
        return Err(NameError::TooLong {
            max_chars,
            actual_chars,
        });
    }

    let without_spaces = name.replace(' ', "");
    if !NAME_CHARS_RE.is_match(&without_spaces) {
        return Err(NameError::InvalidChars(name.to_string()));
    }

    if current_name != Some(name) && existing_names.into_iter().any(|existing| existing == name)
    {
        return Err(NameError::Duplicate(name.to_string()));
    }

    Ok(name.to_string())
}

/// Parses cooking time text into positive minutes.
pub fn validate_cooking_time(candidate: &str) -> Result<u32, TimeError> {
    let trimmed = candidate.trim();
    let minutes = trimmed
        .parse::<i64>()
        .map_err(|_| TimeError::NotNumeric(trimmed.to_string()))?;
    check_cooking_time(minutes)
}

/// Checks an already-numeric cooking time.
pub fn check_cooking_time(minutes: i64) -> Result<u32, TimeError> {
    if minutes <= 0 {
        return Err(TimeError::NotPositive(minutes));
    }
    u32::try_from(minutes).map_err(|_| TimeError::NotNumeric(minutes.to_string()))
}

/// Validates one ingredient token and returns its canonical form.
pub fn validate_ingredient_token(candidate: &str) -> Result<String, IngredientError> {
    let canonical = normalize(candidate);
    let without_spaces = canonical.replace(' ', "");
    if !INGREDIENT_CHARS_RE.is_match(&without_spaces) {
        return Err(IngredientError::InvalidChars(candidate.trim().to_string()));
    }

    let actual_chars = canonical.chars().count();
    if actual_chars > INGREDIENT_MAX_CHARS {
        return Err(IngredientError::TooLong {
            max_chars: INGREDIENT_MAX_CHARS,
            actual_chars,
        });
    }

    Ok(canonical)
}
