use serde::{Deserialize, Serialize};

/// One ingredient line of a recipe. `measure` is empty when the source gave none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub measure: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, measure: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            measure: measure.into(),
        }
    }
}

/// Normalized cocktail recipe as the rest of the app sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail: String,
    pub instructions: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

/// A recipe persisted locally together with one user's favorite/offline flags.
///
/// Rows are identified by `(id, user_id)`, so two users keep independent
/// flags for the same recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRecipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail: String,
    pub instructions: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    pub is_favorite: bool,
    pub is_offline: bool,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub updated_at: String,
}

impl CachedRecipe {
    #[must_use]
    pub fn from_recipe(recipe: &Recipe, user_id: &str, is_favorite: bool, is_offline: bool) -> Self {
        Self {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            thumbnail: recipe.thumbnail.clone(),
            instructions: recipe.instructions.clone(),
            ingredients: recipe.ingredients.clone(),
            is_favorite,
            is_offline,
            user_id: user_id.to_string(),
            updated_at: String::new(),
        }
    }

    #[must_use]
    pub fn to_recipe(&self) -> Recipe {
        Recipe {
            id: self.id.clone(),
            name: self.name.clone(),
            thumbnail: self.thumbnail.clone(),
            instructions: self.instructions.clone(),
            ingredients: self.ingredients.clone(),
        }
    }
}

/// What a detail view shows: the recipe plus the signed-in user's flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub is_favorite: bool,
    pub is_offline: bool,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: String,
    pub email: String,
    pub password_salt: String,
    pub password_hash: String,
    pub created_at: String,
}
