use serde::Deserialize;

use crate::models::{Ingredient, Recipe};

/// Number of ingredient/measure slots in a `TheCocktailDB` drink payload.
pub const INGREDIENT_SLOTS: usize = 10;

/// Envelope shared by `random.php`, `search.php` and `lookup.php`.
/// `drinks` is `null` when nothing matched.
#[derive(Debug, Deserialize)]
pub struct DrinksResponse {
    pub drinks: Option<Vec<DrinkData>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DrinkData {
    #[serde(rename = "idDrink")]
    pub id: Option<String>,
    #[serde(rename = "strDrink")]
    pub name: Option<String>,
    #[serde(rename = "strDrinkThumb")]
    pub thumbnail: Option<String>,
    #[serde(rename = "strInstructions")]
    pub instructions: Option<String>,
    #[serde(rename = "strDrinkAlternate")]
    pub alternate_name: Option<String>,
    #[serde(rename = "strIngredient1")]
    pub ingredient_1: Option<String>,
    #[serde(rename = "strIngredient2")]
    pub ingredient_2: Option<String>,
    #[serde(rename = "strIngredient3")]
    pub ingredient_3: Option<String>,
    #[serde(rename = "strIngredient4")]
    pub ingredient_4: Option<String>,
    #[serde(rename = "strIngredient5")]
    pub ingredient_5: Option<String>,
    #[serde(rename = "strIngredient6")]
    pub ingredient_6: Option<String>,
    #[serde(rename = "strIngredient7")]
    pub ingredient_7: Option<String>,
    #[serde(rename = "strIngredient8")]
    pub ingredient_8: Option<String>,
    #[serde(rename = "strIngredient9")]
    pub ingredient_9: Option<String>,
    #[serde(rename = "strIngredient10")]
    pub ingredient_10: Option<String>,
    #[serde(rename = "strMeasure1")]
    pub measure_1: Option<String>,
    #[serde(rename = "strMeasure2")]
    pub measure_2: Option<String>,
    #[serde(rename = "strMeasure3")]
    pub measure_3: Option<String>,
    #[serde(rename = "strMeasure4")]
    pub measure_4: Option<String>,
    #[serde(rename = "strMeasure5")]
    pub measure_5: Option<String>,
    #[serde(rename = "strMeasure6")]
    pub measure_6: Option<String>,
    #[serde(rename = "strMeasure7")]
    pub measure_7: Option<String>,
    #[serde(rename = "strMeasure8")]
    pub measure_8: Option<String>,
    #[serde(rename = "strMeasure9")]
    pub measure_9: Option<String>,
    #[serde(rename = "strMeasure10")]
    pub measure_10: Option<String>,
}

impl DrinkData {
    /// Ingredient/measure slots in index order (slot 1 first).
    #[must_use]
    pub fn slots(&self) -> [(Option<&str>, Option<&str>); INGREDIENT_SLOTS] {
        [
            (self.ingredient_1.as_deref(), self.measure_1.as_deref()),
            (self.ingredient_2.as_deref(), self.measure_2.as_deref()),
            (self.ingredient_3.as_deref(), self.measure_3.as_deref()),
            (self.ingredient_4.as_deref(), self.measure_4.as_deref()),
            (self.ingredient_5.as_deref(), self.measure_5.as_deref()),
            (self.ingredient_6.as_deref(), self.measure_6.as_deref()),
            (self.ingredient_7.as_deref(), self.measure_7.as_deref()),
            (self.ingredient_8.as_deref(), self.measure_8.as_deref()),
            (self.ingredient_9.as_deref(), self.measure_9.as_deref()),
            (self.ingredient_10.as_deref(), self.measure_10.as_deref()),
        ]
    }

    #[must_use]
    pub fn ingredients(&self) -> Vec<Ingredient> {
        self.slots()
            .into_iter()
            .filter_map(|(ingredient, measure)| {
                let name = ingredient.map(str::trim).filter(|n| !n.is_empty())?;
                Some(Ingredient::new(name, measure.map(str::trim).unwrap_or_default()))
            })
            .collect()
    }
}

/// Convert a wire drink into a [`Recipe`]. Returns `None` for payloads
/// without an id or name.
#[must_use]
pub fn drink_to_recipe(d: DrinkData) -> Option<Recipe> {
    let ingredients = d.ingredients();
    let id = d.id.map(|i| i.trim().to_string()).filter(|i| !i.is_empty())?;
    let name = d.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;

    Some(Recipe {
        id,
        name,
        thumbnail: d.thumbnail.unwrap_or_default(),
        instructions: d.instructions.filter(|i| !i.trim().is_empty()),
        ingredients,
    })
}
