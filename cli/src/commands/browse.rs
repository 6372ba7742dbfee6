use anyhow::Result;
use std::process;

use cocktails_core::models::Recipe;

use super::App;
use super::helpers::{json_error, print_json, print_recipe_detail, print_recipe_table};

fn print_recipes(recipes: &[Recipe], empty_message: &str, json: bool) -> Result<()> {
    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("{empty_message}");
        }
        process::exit(2);
    }

    if json {
        print_json(recipes)
    } else {
        print_recipe_table(recipes);
        Ok(())
    }
}

pub(crate) async fn cmd_random(app: &App, count: usize, json: bool) -> Result<()> {
    let updates = app.subscribe();
    app.load_random(count).await;
    let recipes = updates.borrow().clone();
    print_recipes(&recipes, "Could not load any recipes", json)
}

pub(crate) async fn cmd_search(app: &App, query: &str, json: bool) -> Result<()> {
    let updates = app.subscribe();
    app.search(query).await;
    let recipes = updates.borrow().clone();
    print_recipes(&recipes, &format!("No results found for '{query}'"), json)
}

pub(crate) async fn cmd_show(app: &App, id: &str, json: bool) -> Result<()> {
    let Some(detail) = app.detail(id).await? else {
        let message = format!("No recipe found with id '{id}'");
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    };

    if json {
        print_json(&detail)
    } else {
        print_recipe_detail(&detail);
        Ok(())
    }
}
