use recipebook_core::db::migrations::apply_migrations;
use recipebook_core::db::open_db_in_memory;
use recipebook_core::{
    ChartData, ChartKind, IngredientMatch, IngredientSearch, NewRecipe, Recipe,
    RecipeRepository, RecipeService, ReportService, SqliteRecipeRepository,
};
use rusqlite::Connection;

fn seed(repo: &mut SqliteRecipeRepository<'_>) {
    repo.create_recipe(&NewRecipe::new("Tea", 5, ["water", "tea leaves"]))
        .unwrap();
    repo.create_recipe(&NewRecipe::new("Broth", 40, ["water", "salt", "bones"]))
        .unwrap();
    repo.create_recipe(&NewRecipe::new(
        "Pancakes",
        20,
        ["flour", "eggs", "milk", "salt"],
    ))
    .unwrap();
}

fn names(recipes: &[Recipe]) -> Vec<&str> {
    recipes.iter().map(|recipe| recipe.name.as_str()).collect()
}

#[test]
fn all_mode_requires_every_selected_ingredient() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);

    let found = repo
        .search_by_ingredients(&IngredientSearch::all(["Water", "salt"]))
        .unwrap();
    assert_eq!(names(&found), vec!["Broth"]);

    let single = repo
        .search_by_ingredients(&IngredientSearch::all(["salt"]))
        .unwrap();
    assert_eq!(names(&single), vec!["Broth", "Pancakes"]);
}

#[test]
fn any_mode_matches_at_least_one_selected_ingredient() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);

    let found = repo
        .search_by_ingredients(&IngredientSearch::any(["tea leaves", "eggs", "saffron"]))
        .unwrap();
    assert_eq!(names(&found), vec!["Tea", "Pancakes"]);
}

#[test]
fn empty_or_unknown_selection_matches_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);

    for mode in [IngredientMatch::All, IngredientMatch::Any] {
        let empty = IngredientSearch {
            ingredients: Vec::new(),
            mode,
        };
        assert!(repo.search_by_ingredients(&empty).unwrap().is_empty());
    }
    assert!(repo
        .search_by_ingredients(&IngredientSearch::all(["water", "saffron"]))
        .unwrap()
        .is_empty());
}

#[test]
fn service_uses_configured_match_mode() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);
    let service = RecipeService::new(repo).with_ingredient_match(IngredientMatch::Any);

    let selection = vec!["bones".to_string(), "milk".to_string()];
    let found = service.search_by_ingredients(&selection).unwrap();
    assert_eq!(names(&found), vec!["Broth", "Pancakes"]);

    let picker = service
        .searchable_ingredients()
        .unwrap()
        .into_iter()
        .map(|ingredient| ingredient.name)
        .collect::<Vec<_>>();
    assert_eq!(
        picker,
        vec!["bones", "eggs", "flour", "milk", "salt", "tea leaves", "water"]
    );
}

#[test]
fn text_search_covers_name_ingredient_and_difficulty() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);

    assert_eq!(names(&repo.search_by_text("PAN").unwrap()), vec!["Pancakes"]);
    assert_eq!(
        names(&repo.search_by_text("leaves").unwrap()),
        vec!["Tea"]
    );
    assert_eq!(names(&repo.search_by_text("hard").unwrap()), vec!["Pancakes"]);
    assert_eq!(repo.search_by_text("   ").unwrap().len(), 3);
    assert!(repo.search_by_text("saffron").unwrap().is_empty());
}

#[test]
fn text_search_folds_non_ascii_name_case() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);
    repo.create_recipe(&NewRecipe::new("Éclair", 45, ["flour", "cream"]))
        .unwrap();
    repo.create_recipe(&NewRecipe::new("CRÈME BRÛLÉE", 50, ["cream", "sugar"]))
        .unwrap();

    for query in ["Éclair", "éclair", "ÉCLAIR", "clai"] {
        assert_eq!(names(&repo.search_by_text(query).unwrap()), vec!["Éclair"], "{query}");
    }
    assert_eq!(
        names(&repo.search_by_text("crème brûlée").unwrap()),
        vec!["CRÈME BRÛLÉE"]
    );
}

#[test]
fn text_search_works_on_connection_migrated_outside_open_db() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    apply_migrations(&mut conn).unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    repo.create_recipe(&NewRecipe::new("Éclair", 45, ["flour"]))
        .unwrap();

    assert_eq!(names(&repo.search_by_text("ÉCLAIR").unwrap()), vec!["Éclair"]);
}

#[test]
fn text_search_treats_wildcards_literally() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);

    assert!(repo.search_by_text("%").unwrap().is_empty());
    assert!(repo.search_by_text("_").unwrap().is_empty());
}

#[test]
fn report_shapes_rows_and_selected_chart() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    seed(&mut repo);
    let reports = ReportService::new(&repo);

    let report = reports.search(" salt ", ChartKind::CookingTimeBar).unwrap();
    assert_eq!(report.query, "salt");
    assert_eq!(report.rows.len(), 2);
    match &report.chart {
        Some(ChartData::Bar { labels, values, .. }) => {
            assert_eq!(labels, &vec!["Broth", "Pancakes"]);
            assert_eq!(values, &vec![40, 20]);
        }
        other => panic!("unexpected chart: {other:?}"),
    }

    let html = report.table_html(|id| format!("/recipes/{id}/"));
    assert!(html.contains(">Broth</a>"));

    let empty = reports.search("saffron", ChartKind::DifficultyPie).unwrap();
    assert!(empty.is_empty());
    assert!(empty.chart.is_none());
}
