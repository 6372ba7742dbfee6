use anyhow::Result;
use std::process;

use cocktails_core::models::CachedRecipe;

use super::helpers::{json_error, print_cache_table, print_cached_table, print_json};
use super::{App, resolve_recipe};

fn print_saved(recipes: &[CachedRecipe], empty_message: &str, json: bool) -> Result<()> {
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
        print_cached_table(recipes);
        Ok(())
    }
}

pub(crate) async fn cmd_favorite(app: &App, id: &str, json: bool) -> Result<()> {
    let recipe = resolve_recipe(app, id, json).await?;
    let row = app.toggle_favorite(&recipe)?;

    if json {
        print_json(&row)
    } else {
        let name = &row.name;
        if row.is_favorite {
            println!("Added {name} to favorites (saved offline)");
        } else {
            println!("Removed {name} from favorites");
        }
        Ok(())
    }
}

pub(crate) async fn cmd_save(app: &App, id: &str, json: bool) -> Result<()> {
    let recipe = resolve_recipe(app, id, json).await?;
    let row = app.save_offline(&recipe)?;

    if json {
        print_json(&row)
    } else {
        let name = &row.name;
        println!("Saved {name} for offline use");
        Ok(())
    }
}

pub(crate) fn cmd_unsave(app: &App, id: &str, json: bool) -> Result<()> {
    if !app.remove_offline(id)? {
        let message = format!("Recipe '{id}' is not in your offline recipes");
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::json!({ "removed_offline": id }));
    } else {
        println!("Removed {id} from offline recipes");
    }
    Ok(())
}

pub(crate) fn cmd_favorites(app: &App, json: bool) -> Result<()> {
    let favorites = app.favorites()?;
    print_saved(&favorites, "No favorite recipes yet", json)
}

pub(crate) fn cmd_offline(app: &App, json: bool) -> Result<()> {
    let offline = app.offline()?;
    print_saved(&offline, "No recipes saved offline", json)
}

/// Every cached row across all users. Debugging aid, hidden from `--help`.
pub(crate) fn cmd_cache(app: &App, json: bool) -> Result<()> {
    let all = app.repository().all_cached()?;

    if all.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("Local cache is empty");
        }
        process::exit(2);
    }

    if json {
        print_json(&all)
    } else {
        print_cache_table(&all);
        Ok(())
    }
}
