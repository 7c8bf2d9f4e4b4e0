//! Application configuration.
//!
//! Loaded with the following priority (highest to lowest):
//! 1. Environment variables with the `RECIPEBOOK__` prefix
//!    (e.g. `RECIPEBOOK__DATABASE_PATH`, `RECIPEBOOK__INGREDIENT_MATCH=any`)
//! 2. The TOML file passed explicitly, or `recipebook.toml` in the current
//!    directory when present
//! 3. Default values

use crate::logging::default_log_level;
use crate::model::validation::CLI_NAME_MAX_CHARS;
use crate::search::recipe_search::IngredientMatch;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_BASENAME: &str = "recipebook";
const ENV_PREFIX: &str = "RECIPEBOOK";

/// Runtime settings for the recipe book application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    #[serde(default = "default_level")]
    pub log_level: String,
    /// Absolute directory for rolling log files. Logging is off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Recipe name length limit applied by the interactive session.
    #[serde(default = "default_name_max_chars")]
    pub name_max_chars: usize,
    /// Policy for multi-ingredient search.
    #[serde(default)]
    pub ingredient_match: IngredientMatch,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: default_level(),
            log_dir: None,
            name_max_chars: default_name_max_chars(),
            ingredient_match: IngredientMatch::default(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("recipebook.sqlite3")
}

fn default_level() -> String {
    default_log_level().to_string()
}

fn default_name_max_chars() -> usize {
    CLI_NAME_MAX_CHARS
}

impl AppConfig {
    /// Loads configuration; see module docs for source priority.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        load_config(file)
    }
}

/// Loads configuration from an optional TOML file and the environment.
///
/// An explicitly passed file must exist; the implicit `recipebook.toml`
/// may be missing.
pub fn load_config(file: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let file_source = match file {
        Some(path) => File::from(path).format(FileFormat::Toml).required(true),
        None => File::with_name(DEFAULT_CONFIG_BASENAME)
            .format(FileFormat::Toml)
            .required(false),
    };

    let settings = Config::builder()
        .add_source(file_source)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_use_cli_name_limit_and_all_policy() {
        let config = AppConfig::default();
        assert_eq!(config.name_max_chars, 50);
        assert_eq!(config.ingredient_match, IngredientMatch::All);
        assert!(config.log_dir.is_none());
        assert_eq!(config.database_path, PathBuf::from("recipebook.sqlite3"));
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "database_path = \"/tmp/recipes.db\"\nname_max_chars = 128\ningredient_match = \"any\""
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/recipes.db"));
        assert_eq!(config.name_max_chars, 128);
        assert_eq!(config.ingredient_match, IngredientMatch::Any);
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn environment_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipebook.toml");
        std::fs::write(&path, "ingredient_match = \"all\"\n").unwrap();

        // Process-wide; no other test expects `all` from the environment.
        std::env::set_var("RECIPEBOOK__INGREDIENT_MATCH", "any");
        let loaded = load_config(Some(&path));
        std::env::remove_var("RECIPEBOOK__INGREDIENT_MATCH");

        let config = loaded.unwrap();
        assert_eq!(config.ingredient_match, IngredientMatch::Any);
        assert_eq!(config.name_max_chars, CLI_NAME_MAX_CHARS);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(load_config(Some(&path)).is_err());
    }
}
