use recipebook_core::db::open_db_in_memory;
use recipebook_core::{
    Difficulty, IngredientRepository, NameError, NewRecipe, RecipePatch, RecipeRepository,
    RepoError, SqliteRecipeRepository, TimeError, ValidationError,
};

#[test]
fn create_canonicalizes_and_derives_difficulty() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();

    let created = repo
        .create_recipe(&NewRecipe::new(
            "  Pancakes ",
            20,
            ["Flour", " eggs", "MILK", "flour", "Sugar"],
        ))
        .unwrap();

    assert_eq!(created.name, "Pancakes");
    assert_eq!(created.ingredients, vec!["flour", "eggs", "milk", "sugar"]);
    assert_eq!(created.difficulty, Difficulty::Hard);
    assert_eq!(repo.get_recipe(created.id).unwrap(), created);
}

#[test]
fn list_returns_recipes_in_creation_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();

    let tea = repo.create_recipe(&NewRecipe::new("Tea", 5, ["water"])).unwrap();
    let stew = repo
        .create_recipe(&NewRecipe::new("Stew", 90, ["beef", "carrot"]))
        .unwrap();

    let listed = repo.list_recipes().unwrap();
    assert_eq!(listed, vec![tea, stew]);
    assert_eq!(repo.recipe_count().unwrap(), 2);
}

#[test]
fn duplicate_name_is_rejected_case_sensitively() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    repo.create_recipe(&NewRecipe::new("Tea", 5, ["water"])).unwrap();

    let err = repo
        .create_recipe(&NewRecipe::new(" Tea ", 3, ["water"]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::Name(NameError::Duplicate(ref name))) if name == "Tea"
    ));

    repo.create_recipe(&NewRecipe::new("tea", 3, ["water"]))
        .expect("names differing only in case are distinct");
    assert_eq!(repo.recipe_count().unwrap(), 2);
}

#[test]
fn invalid_create_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();

    let bad_ingredient = repo
        .create_recipe(&NewRecipe::new("Toast", 3, ["bread", "butter2"]))
        .unwrap_err();
    assert_eq!(
        bad_ingredient.validation().map(ValidationError::code),
        Some("ingredient_invalid_chars")
    );

    let bad_time = repo
        .create_recipe(&NewRecipe::new("Toast", 0, ["bread"]))
        .unwrap_err();
    assert!(matches!(
        bad_time,
        RepoError::Validation(ValidationError::CookingTime(TimeError::NotPositive(0)))
    ));

    let bad_name = repo
        .create_recipe(&NewRecipe::new("Toast & Jam", 3, ["bread"]))
        .unwrap_err();
    assert_eq!(
        bad_name.validation().map(ValidationError::code),
        Some("name_invalid_chars")
    );

    assert_eq!(repo.recipe_count().unwrap(), 0);
    assert!(repo.list_ingredients().unwrap().is_empty());
}

#[test]
fn name_limit_follows_repository_setting() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn)
        .unwrap()
        .with_name_max_chars(50);
    assert_eq!(repo.name_max_chars(), 50);

    let err = repo
        .create_recipe(&NewRecipe::new("a".repeat(51), 5, ["water"]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::Name(NameError::TooLong {
            max_chars: 50,
            actual_chars: 51
        }))
    ));

    repo.create_recipe(&NewRecipe::new("a".repeat(50), 5, ["water"]))
        .unwrap();
}

#[test]
fn update_applies_only_provided_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    let created = repo
        .create_recipe(&NewRecipe::new("Soup", 30, ["water", "salt"]))
        .unwrap();

    let renamed = repo
        .update_recipe(created.id, &RecipePatch::default().name("Broth"))
        .unwrap();
    assert_eq!(renamed.name, "Broth");
    assert_eq!(renamed.cooking_time, 30);
    assert_eq!(renamed.ingredients, created.ingredients);

    let unchanged = repo
        .update_recipe(created.id, &RecipePatch::default())
        .unwrap();
    assert_eq!(unchanged, renamed);
}

#[test]
fn renaming_to_own_name_is_allowed_but_not_to_another() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    let tea = repo.create_recipe(&NewRecipe::new("Tea", 5, ["water"])).unwrap();
    repo.create_recipe(&NewRecipe::new("Coffee", 5, ["water"]))
        .unwrap();

    repo.update_recipe(tea.id, &RecipePatch::default().name("Tea"))
        .expect("keeping the current name is not a duplicate");

    let err = repo
        .update_recipe(tea.id, &RecipePatch::default().name("Coffee"))
        .unwrap_err();
    assert_eq!(
        err.validation().map(ValidationError::code),
        Some("name_duplicate")
    );
}

#[test]
fn failed_update_leaves_recipe_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    let created = repo
        .create_recipe(&NewRecipe::new("Soup", 30, ["water", "salt"]))
        .unwrap();

    let patch = RecipePatch::default()
        .name("Stock")
        .ingredients(["water", "bones", "leek"])
        .cooking_time(-5);
    let err = repo.update_recipe(created.id, &patch).unwrap_err();
    assert_eq!(
        err.validation().map(ValidationError::code),
        Some("time_not_positive")
    );

    assert_eq!(repo.get_recipe(created.id).unwrap(), created);
    assert!(repo.find_ingredient("bones").unwrap().is_none());
}

#[test]
fn missing_recipe_reports_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();

    assert!(matches!(repo.get_recipe(42), Err(RepoError::NotFound(42))));
    assert!(matches!(
        repo.update_recipe(42, &RecipePatch::default().cooking_time(5)),
        Err(RepoError::NotFound(42))
    ));
    assert!(matches!(repo.delete_recipe(42), Err(RepoError::NotFound(42))));
}

#[test]
fn delete_removes_recipe_and_links_but_keeps_ingredients() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
    let soup = repo
        .create_recipe(&NewRecipe::new("Soup", 30, ["water", "salt"]))
        .unwrap();
    let tea = repo.create_recipe(&NewRecipe::new("Tea", 5, ["water"])).unwrap();

    repo.delete_recipe(soup.id).unwrap();

    assert!(matches!(repo.get_recipe(soup.id), Err(RepoError::NotFound(_))));
    assert_eq!(repo.get_recipe(tea.id).unwrap().ingredients, vec!["water"]);
    let names = repo
        .list_ingredients()
        .unwrap()
        .into_iter()
        .map(|ingredient| ingredient.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["salt", "water"]);
    let used = repo
        .list_used_ingredients()
        .unwrap()
        .into_iter()
        .map(|ingredient| ingredient.name)
        .collect::<Vec<_>>();
    assert_eq!(used, vec!["water"]);
}
