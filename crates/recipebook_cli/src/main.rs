//! Interactive recipe book.
//!
//! Usage:
//! ```bash
//! # Use ./recipebook.sqlite3 and ./recipebook.toml when present
//! recipebook
//!
//! # Explicit database with rolling logs
//! recipebook --db /tmp/recipes.sqlite3 --log-dir /tmp/recipebook-logs
//!
//! # Match recipes containing any of the selected ingredients
//! recipebook --ingredient-match any
//! ```

mod prompt;
mod session;

use clap::Parser;
use log::info;
use recipebook_core::db::open_db;
use recipebook_core::{
    init_logging, AppConfig, IngredientMatch, RecipeService, SqliteRecipeRepository,
};
use session::Session;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "recipebook",
    version,
    about = "Recipe book",
    long_about = "Create, browse, search, edit and delete recipes stored in a local SQLite database."
)]
struct Cli {
    /// TOML config file (defaults to ./recipebook.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database file override
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level override (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Multi-ingredient search policy (all|any)
    #[arg(long)]
    ingredient_match: Option<IngredientMatch>,
}

impl Cli {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(db) = self.db {
            config.database_path = db;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = Some(dir);
        }
        if let Some(mode) = self.ingredient_match {
            config.ingredient_match = mode;
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("recipebook: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_file = cli.config.clone();
    let config = cli.apply(AppConfig::load(config_file.as_deref())?);

    if let Some(dir) = &config.log_dir {
        init_logging(&config.log_level, &dir.to_string_lossy())?;
    }

    let mut conn = open_db(&config.database_path)?;
    let repo = SqliteRecipeRepository::try_new(&mut conn)?.with_name_max_chars(config.name_max_chars);
    let name_max_chars = repo.name_max_chars();
    let mut service = RecipeService::new(repo).with_ingredient_match(config.ingredient_match);
    info!(
        "event=cli_start module=cli status=ok ingredient_match={} name_max_chars={}",
        config.ingredient_match, name_max_chars
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(&mut service, stdin.lock(), stdout.lock(), name_max_chars).run()?;

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}
