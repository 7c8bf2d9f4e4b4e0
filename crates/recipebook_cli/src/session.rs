//! Interactive menu session.
//!
//! # Responsibility
//! - Drive create/view/search/edit/delete through numbered menus.
//! - Catch validation failures at the prompt and ask again.
//!
//! # Invariants
//! - Every repository failure is shown to the user; only I/O errors end
//!   the session early.
//! - End of input behaves like `quit`.

use crate::prompt::{parse_choices, parse_field_selection, parse_positive, Prompter};
use recipebook_core::{
    validate_cooking_time, validate_ingredient_token, validate_name_with_limit,
    IngredientMatch, IngredientRepository, NewRecipe, Recipe, RecipePatch, RecipeRepository,
    RecipeService, RepoError, WEB_NAME_MAX_CHARS,
};
use std::io::{self, BufRead, Write};

const RULE_WIDTH: usize = 60;

pub struct Session<'s, Repo, In, Out> {
    service: &'s mut RecipeService<Repo>,
    prompt: Prompter<In, Out>,
    name_max_chars: usize,
}

impl<'s, Repo, In, Out> Session<'s, Repo, In, Out>
where
    Repo: RecipeRepository + IngredientRepository,
    In: BufRead,
    Out: Write,
{
    /// `name_max_chars` is clamped to the storage limit, like the
    /// repository's own setting.
    pub fn new(
        service: &'s mut RecipeService<Repo>,
        input: In,
        output: Out,
        name_max_chars: usize,
    ) -> Self {
        Self {
            service,
            prompt: Prompter::new(input, output),
            name_max_chars: name_max_chars.clamp(1, WEB_NAME_MAX_CHARS),
        }
    }

    /// Runs the main menu until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        match self.main_loop() {
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => self.goodbye(),
            other => other,
        }
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.welcome()?;
        loop {
            self.print_menu()?;
            let choice = self.prompt.ask("Your choice: ")?.to_lowercase();
            match choice.as_str() {
                "1" => self.create_recipe()?,
                "2" => self.view_all_recipes()?,
                "3" => self.search_by_ingredients()?,
                "4" => self.edit_recipe()?,
                "5" => self.delete_recipe()?,
                "6" => self.search_by_text()?,
                "quit" => return self.goodbye(),
                _ => writeln!(
                    self.prompt.out(),
                    "Please enter a number from the menu or type 'quit'."
                )?,
            }
        }
    }

    fn welcome(&mut self) -> io::Result<()> {
        writeln!(self.prompt.out(), "\nWelcome to the Recipe Management Application!")?;
        match self.service.recipe_count() {
            Ok(count) => writeln!(
                self.prompt.out(),
                "Database connected. There are {count} recipes stored.\n"
            ),
            Err(err) => self.report_failure("Could not count recipes", &err),
        }
    }

    fn goodbye(&mut self) -> io::Result<()> {
        writeln!(self.prompt.out(), "\nExiting the program. Goodbye!")
    }

    fn print_menu(&mut self) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        let out = self.prompt.out();
        writeln!(out, "\nMain Menu:\n{rule}")?;
        writeln!(out, "Choose an operation:")?;
        writeln!(out, "    1. Create a new recipe")?;
        writeln!(out, "    2. View all recipes")?;
        writeln!(out, "    3. Search for recipes by ingredients")?;
        writeln!(out, "    4. Edit an existing recipe")?;
        writeln!(out, "    5. Delete a recipe")?;
        writeln!(out, "    6. Search recipes by name, ingredient or difficulty")?;
        writeln!(out, "Type 'quit' to exit the application")?;
        writeln!(out, "{rule}")
    }

    fn create_recipe(&mut self) -> io::Result<()> {
        let name = self.ask_name(None)?;
        let cooking_time = self.ask_cooking_time()?;
        let ingredients = self.ask_ingredients()?;

        let request = NewRecipe::new(name.as_str(), i64::from(cooking_time), ingredients);
        match self.service.create_recipe(&request) {
            Ok(recipe) => writeln!(
                self.prompt.out(),
                "\nRecipe '{}' added successfully! Difficulty: {}\n",
                recipe.name,
                recipe.difficulty
            ),
            Err(err) => self.report_failure(
                "Error occurred while adding the recipe. Changes are rolled back",
                &err,
            ),
        }
    }

    fn view_all_recipes(&mut self) -> io::Result<()> {
        let recipes = match self.service.list_recipes() {
            Ok(recipes) => recipes,
            Err(err) => return self.report_failure("Could not load recipes", &err),
        };
        if recipes.is_empty() {
            return writeln!(self.prompt.out(), "No recipes found in the database.");
        }

        writeln!(
            self.prompt.out(),
            "\nAll recipes from the database:\n{}",
            "-".repeat(80)
        )?;
        self.print_recipes(&recipes)
    }

    fn search_by_ingredients(&mut self) -> io::Result<()> {
        let available = match self.service.searchable_ingredients() {
            Ok(available) => available,
            Err(err) => return self.report_failure("Could not load ingredients", &err),
        };
        if available.is_empty() {
            return writeln!(
                self.prompt.out(),
                "No recipes with ingredients found in the database."
            );
        }

        writeln!(self.prompt.out(), "Available ingredients to search for:")?;
        for (index, ingredient) in available.iter().enumerate() {
            writeln!(self.prompt.out(), "{}. {}", index + 1, ingredient.name)?;
        }

        let max = available.len();
        let choices = self.prompt.ask_until(
            "Enter ingredient numbers to search for (separated by spaces): ",
            |reply| parse_choices(reply, max),
        )?;
        if choices.is_empty() {
            return writeln!(self.prompt.out(), "No input provided. Exiting search.");
        }

        let mut selected = Vec::new();
        for number in choices {
            let name = available[number - 1].name.clone();
            if !selected.contains(&name) {
                selected.push(name);
            }
        }

        let joiner = match self.service.ingredient_match() {
            IngredientMatch::All => "all of",
            IngredientMatch::Any => "any of",
        };
        let listed = selected.join(", ");
        writeln!(
            self.prompt.out(),
            "\nRecipes containing {joiner}: {listed}\n{}",
            "-".repeat(80)
        )?;

        match self.service.search_by_ingredients(&selected) {
            Ok(recipes) if recipes.is_empty() => {
                writeln!(self.prompt.out(), "No recipes found containing {listed}.")
            }
            Ok(recipes) => self.print_recipes(&recipes),
            Err(err) => self.report_failure("Search failed", &err),
        }
    }

    fn search_by_text(&mut self) -> io::Result<()> {
        let query = self
            .prompt
            .ask("Search by name, ingredient or difficulty (leave blank for all): ")?;
        match self.service.search_by_text(&query) {
            Ok(recipes) if recipes.is_empty() => {
                writeln!(self.prompt.out(), "No recipes match '{query}'.")
            }
            Ok(recipes) => self.print_recipes(&recipes),
            Err(err) => self.report_failure("Search failed", &err),
        }
    }

    fn edit_recipe(&mut self) -> io::Result<()> {
        let Some(recipe) = self.select_recipe()? else {
            return Ok(());
        };

        writeln!(
            self.prompt.out(),
            "Which fields would you like to update?\n\
             You can update one or several fields:\n    \
             (1) Name: {}\n    \
             (2) Ingredients: {}\n    \
             (3) Cooking time: {}\n\
             Difficulty will be recalculated automatically after any change.",
            recipe.name,
            recipe.ingredients.join(", "),
            recipe.cooking_time
        )?;
        let fields = self
            .prompt
            .ask_until("Selection (example: 1,3): ", parse_field_selection)?;

        let mut patch = RecipePatch::default();
        if fields.contains(&1) {
            patch = patch.name(self.ask_name(Some(recipe.name.as_str()))?);
        }
        if fields.contains(&2) {
            patch = patch.ingredients(self.ask_ingredients()?);
        }
        if fields.contains(&3) {
            patch = patch.cooking_time(i64::from(self.ask_cooking_time()?));
        }

        match self.service.update_recipe(recipe.id, &patch) {
            Ok(updated) => writeln!(
                self.prompt.out(),
                "Recipe ID '{}' updated successfully! Difficulty: {}",
                updated.id,
                updated.difficulty
            ),
            Err(err) => self.report_failure(
                "Error occurred while updating the recipe. Changes were not saved",
                &err,
            ),
        }
    }

    fn delete_recipe(&mut self) -> io::Result<()> {
        let Some(recipe) = self.select_recipe()? else {
            return Ok(());
        };

        let confirmation = self.prompt.ask(&format!(
            "Are you sure you want to delete the recipe '{}'? (yes/no): ",
            recipe.name
        ))?;
        if confirmation.to_lowercase() != "yes" {
            return writeln!(self.prompt.out(), "Deletion cancelled.");
        }

        match self.service.delete_recipe(recipe.id) {
            Ok(()) => writeln!(
                self.prompt.out(),
                "Recipe ID '{}' deleted successfully!",
                recipe.id
            ),
            Err(err) => self.report_failure(
                "Error occurred while deleting the recipe. Changes were not saved",
                &err,
            ),
        }
    }

    /// Lists recipes and asks for an id until one exists.
    fn select_recipe(&mut self) -> io::Result<Option<Recipe>> {
        let recipes = match self.service.list_recipes() {
            Ok(recipes) => recipes,
            Err(err) => {
                self.report_failure("Could not load recipes", &err)?;
                return Ok(None);
            }
        };
        if recipes.is_empty() {
            writeln!(self.prompt.out(), "No recipes found in the database.")?;
            return Ok(None);
        }

        writeln!(self.prompt.out(), "\nExisting recipes in the database:")?;
        for recipe in &recipes {
            writeln!(self.prompt.out(), "\t{}", recipe.summary())?;
        }

        let selected = self
            .prompt
            .ask_until("\nEnter the recipe ID to select: ", |reply| {
                let id = reply
                    .parse::<i64>()
                    .map_err(|_| "Invalid input. Numeric value expected.")?;
                recipes
                    .iter()
                    .find(|recipe| recipe.id == id)
                    .cloned()
                    .ok_or("Recipe not found. Please enter a valid recipe ID.")
            })?;
        Ok(Some(selected))
    }

    fn ask_name(&mut self, current_name: Option<&str>) -> io::Result<String> {
        let existing = match self.service.list_recipes() {
            Ok(recipes) => recipes.into_iter().map(|recipe| recipe.name).collect(),
            Err(err) => {
                self.report_failure("Could not load existing names", &err)?;
                Vec::new()
            }
        };
        let max_chars = self.name_max_chars;
        self.prompt.ask_until("Enter the recipe name: ", |reply| {
            validate_name_with_limit(
                reply,
                existing.iter().map(String::as_str),
                current_name,
                max_chars,
            )
        })
    }

    fn ask_cooking_time(&mut self) -> io::Result<u32> {
        self.prompt
            .ask_until("Enter the cooking time (in minutes): ", validate_cooking_time)
    }

    /// Asks for a count, then each ingredient; one invalid entry restarts
    /// the whole list.
    fn ask_ingredients(&mut self) -> io::Result<Vec<String>> {
        loop {
            let count = self
                .prompt
                .ask_until("Enter the number of ingredients: ", parse_positive)?;

            let mut ingredients = Vec::with_capacity(count);
            for index in 1..=count {
                let reply = self.prompt.ask(&format!("Enter ingredient {index}: "))?;
                match validate_ingredient_token(&reply) {
                    Ok(ingredient) => ingredients.push(ingredient),
                    Err(err) => {
                        writeln!(self.prompt.out(), "{err}")?;
                        break;
                    }
                }
            }

            if ingredients.len() == count {
                return Ok(ingredients);
            }
        }
    }

    fn print_recipes(&mut self, recipes: &[Recipe]) -> io::Result<()> {
        for recipe in recipes {
            writeln!(self.prompt.out(), "{recipe}\n")?;
        }
        Ok(())
    }

    fn report_failure(&mut self, context: &str, err: &RepoError) -> io::Result<()> {
        writeln!(self.prompt.out(), "{context}: {err}.")
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use recipebook_core::db::open_db_in_memory;
    use recipebook_core::{
        Difficulty, NewRecipe, RecipeRepository, RecipeService, SqliteRecipeRepository,
        CLI_NAME_MAX_CHARS,
    };

    fn run_script(
        service: &mut RecipeService<SqliteRecipeRepository<'_>>,
        script: &str,
    ) -> String {
        run_script_with_limit(service, script, CLI_NAME_MAX_CHARS)
    }

    fn run_script_with_limit(
        service: &mut RecipeService<SqliteRecipeRepository<'_>>,
        script: &str,
        name_max_chars: usize,
    ) -> String {
        let mut output = Vec::new();
        {
            let mut session =
                Session::new(service, script.as_bytes(), &mut output, name_max_chars);
            session.run().unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn create_reprompts_invalid_fields_then_stores_recipe() {
        let mut conn = open_db_in_memory().unwrap();
        let repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
        let mut service = RecipeService::new(repo);

        let script = "1\nTea!\nTea\nabc\n-3\n5\n2\nwater\nTea Leaves\nquit\n";
        let printed = run_script(&mut service, script);

        assert!(printed.contains("must be alphanumeric"));
        assert!(printed.contains("not a whole number"));
        assert!(printed.contains("greater than zero"));
        assert!(printed.contains("Recipe 'Tea' added successfully! Difficulty: easy"));

        let stored = service.list_recipes().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].ingredients, vec!["water", "tea leaves"]);
    }

    #[test]
    fn invalid_ingredient_restarts_the_ingredient_list() {
        let mut conn = open_db_in_memory().unwrap();
        let repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
        let mut service = RecipeService::new(repo);

        let script = "1\nToast\n3\n2\nbread\nbutter1\n1\nbread\nquit\n";
        let printed = run_script(&mut service, script);

        assert!(printed.contains("use letters and spaces only"));
        let stored = service.list_recipes().unwrap();
        assert_eq!(stored[0].ingredients, vec!["bread"]);
    }

    #[test]
    fn edit_applies_selected_fields_and_recomputes_difficulty() {
        let mut conn = open_db_in_memory().unwrap();
        let repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
        let mut service = RecipeService::new(repo);
        let created = service
            .create_recipe(&NewRecipe::new("Tea", 5, ["water"]))
            .unwrap();

        let script = format!("4\n{}\n3,1\nTea\n15\nquit\n", created.id);
        let printed = run_script(&mut service, &script);

        assert!(printed.contains("updated successfully! Difficulty: intermediate"));
        let stored = service.repository().get_recipe(created.id).unwrap();
        assert_eq!(stored.name, "Tea");
        assert_eq!(stored.cooking_time, 15);
        assert_eq!(stored.difficulty, Difficulty::Intermediate);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut conn = open_db_in_memory().unwrap();
        let repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
        let mut service = RecipeService::new(repo);
        let created = service
            .create_recipe(&NewRecipe::new("Soup", 30, ["water", "salt"]))
            .unwrap();

        let script = format!("5\n{id}\nno\n5\n{id}\nyes\nquit\n", id = created.id);
        let printed = run_script(&mut service, &script);

        assert!(printed.contains("Deletion cancelled."));
        assert!(printed.contains("deleted successfully!"));
        assert_eq!(service.recipe_count().unwrap(), 0);
    }

    #[test]
    fn ingredient_search_lists_numbered_choices() {
        let mut conn = open_db_in_memory().unwrap();
        let repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
        let mut service = RecipeService::new(repo);
        service
            .create_recipe(&NewRecipe::new("Tea", 5, ["water", "tea"]))
            .unwrap();
        service
            .create_recipe(&NewRecipe::new("Broth", 40, ["water", "salt"]))
            .unwrap();

        // Sorted picker: 1 salt, 2 tea, 3 water.
        let printed = run_script(&mut service, "3\n9\n3 2\nquit\n");

        assert!(printed.contains("1. salt"));
        assert!(printed.contains("out of range"));
        assert!(printed.contains("Recipe Name: Tea"));
        assert!(!printed.contains("Recipe Name: Broth"));
    }

    #[test]
    fn zero_name_limit_is_raised_to_one_char() {
        let mut conn = open_db_in_memory().unwrap();
        let repo = SqliteRecipeRepository::try_new(&mut conn)
            .unwrap()
            .with_name_max_chars(0);
        let mut service = RecipeService::new(repo);

        let script = "1\nTea\nT\n5\n1\nwater\nquit\n";
        let printed = run_script_with_limit(&mut service, script, 0);

        assert!(printed.contains("name must be between 1 and 1 characters, got 3"));
        assert!(printed.contains("Recipe 'T' added successfully!"));
        assert_eq!(service.recipe_count().unwrap(), 1);
    }

    #[test]
    fn oversized_name_limit_reprompts_at_storage_limit() {
        let mut conn = open_db_in_memory().unwrap();
        let repo = SqliteRecipeRepository::try_new(&mut conn)
            .unwrap()
            .with_name_max_chars(500);
        let mut service = RecipeService::new(repo);

        let script = format!("1\n{}\nTea\n5\n1\nwater\nquit\n", "a".repeat(129));
        let printed = run_script_with_limit(&mut service, &script, 500);

        assert!(printed.contains("name must be between 1 and 128 characters, got 129"));
        assert!(!printed.contains("Error occurred while adding"));
        assert!(printed.contains("Recipe 'Tea' added successfully!"));
    }

    #[test]
    fn end_of_input_ends_session_cleanly() {
        let mut conn = open_db_in_memory().unwrap();
        let repo = SqliteRecipeRepository::try_new(&mut conn).unwrap();
        let mut service = RecipeService::new(repo);

        let printed = run_script(&mut service, "7\n");
        assert!(printed.contains("Please enter a number from the menu"));
        assert!(printed.ends_with("Goodbye!\n"));
    }
}
