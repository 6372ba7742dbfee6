mod account;
mod browse;
mod helpers;
mod saved;

use std::process;

use anyhow::Result;

use crate::cocktaildb::CocktailDbClient;
use cocktails_core::identity::LocalIdentity;
use cocktails_core::models::Recipe;
use cocktails_core::service::CocktailService;

use helpers::json_error;

pub(crate) use account::{cmd_login, cmd_logout, cmd_register, cmd_whoami};
pub(crate) use browse::{cmd_random, cmd_search, cmd_show};
pub(crate) use saved::{cmd_cache, cmd_favorite, cmd_favorites, cmd_offline, cmd_save, cmd_unsave};

pub(crate) type App = CocktailService<CocktailDbClient, LocalIdentity>;

/// Resolve a recipe id to a full recipe, from the local cache or the API.
/// Exits with status 2 when neither has it.
pub(super) async fn resolve_recipe(app: &App, id: &str, json: bool) -> Result<Recipe> {
    if let Some(detail) = app.detail(id).await? {
        return Ok(detail.recipe);
    }
    let message = format!("No recipe found with id '{id}'");
    if json {
        println!("{}", json_error(&message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}
