use anyhow::{Context, Result};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use cocktails_core::models::{CachedRecipe, Ingredient, Recipe, RecipeDetail};

pub(crate) fn print_recipe_table(recipes: &[Recipe]) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Ingredients")]
        ingredients: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .enumerate()
        .map(|(i, r)| RecipeRow {
            idx: i + 1,
            id: r.id.clone(),
            name: truncate(&r.name, 35),
            ingredients: truncate(&ingredient_summary(&r.ingredients), 50),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

#[derive(Tabled)]
struct CachedRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Fav")]
    favorite: &'static str,
    #[tabled(rename = "Offline")]
    offline: &'static str,
}

impl From<&CachedRecipe> for CachedRow {
    fn from(r: &CachedRecipe) -> Self {
        CachedRow {
            id: r.id.clone(),
            name: truncate(&r.name, 35),
            favorite: if r.is_favorite { "★" } else { "" },
            offline: if r.is_offline { "✓" } else { "" },
        }
    }
}

pub(crate) fn print_cached_table(recipes: &[CachedRecipe]) {
    let rows: Vec<CachedRow> = recipes.iter().map(CachedRow::from).collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// Like [`print_cached_table`], with the owning user of each row.
pub(crate) fn print_cache_table(recipes: &[CachedRecipe]) {
    #[derive(Tabled)]
    struct UserRow {
        #[tabled(inline)]
        row: CachedRow,
        #[tabled(rename = "User")]
        user: String,
    }

    let rows: Vec<UserRow> = recipes
        .iter()
        .map(|r| UserRow {
            row: CachedRow::from(r),
            user: if r.user_id.is_empty() {
                "-".to_string()
            } else {
                truncate(&r.user_id, 13)
            },
        })
        .collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_recipe_detail(detail: &RecipeDetail) {
    let recipe = &detail.recipe;
    let mut flags = Vec::new();
    if detail.is_favorite {
        flags.push("favorite");
    }
    if detail.is_offline {
        flags.push("saved offline");
    }

    println!("{} (id: {})", recipe.name, recipe.id);
    if !flags.is_empty() {
        println!("[{}]", flags.join(", "));
    }
    if !recipe.thumbnail.is_empty() {
        println!("{}", recipe.thumbnail);
    }

    if !recipe.ingredients.is_empty() {
        println!("\nIngredients:");
        for ing in &recipe.ingredients {
            if ing.measure.is_empty() {
                println!("  - {}", ing.name);
            } else {
                println!("  - {} ({})", ing.name, ing.measure);
            }
        }
    }

    if let Some(instructions) = &recipe.instructions {
        println!("\nInstructions:\n  {instructions}");
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

/// Use the password from the command line, or prompt for it without echo.
pub(crate) fn read_password(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => rpassword::prompt_password("Password: ").context("Failed to read password"),
    }
}

pub(crate) fn ingredient_summary(ingredients: &[Ingredient]) -> String {
    ingredients
        .iter()
        .map(|i| i.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
