use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use cocktails_core::cocktaildb::{DrinksResponse, drink_to_recipe};
use cocktails_core::models::Recipe;
use cocktails_core::repository::{RecipeSource, SourceError};

pub const DEFAULT_BASE_URL: &str = "https://www.thecocktaildb.com/api/json/v1/1/";

pub struct CocktailDbClient {
    client: reqwest::Client,
    base_url: String,
}

impl CocktailDbClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "cocktails/{} (recipe catalogue)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(%url, ?query, "GET");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Network(Box::new(e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SourceError::Network(Box::new(e)))?;
        serde_json::from_str(&body).map_err(|e| SourceError::InvalidResponse(e.to_string()))
    }

    async fn drinks(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<Recipe>, SourceError> {
        let data: DrinksResponse = self.get(endpoint, query).await?;
        Ok(data
            .drinks
            .unwrap_or_default()
            .into_iter()
            .filter_map(drink_to_recipe)
            .collect())
    }
}

impl RecipeSource for CocktailDbClient {
    async fn fetch_random(&self) -> Result<Option<Recipe>, SourceError> {
        Ok(self.drinks("random.php", &[]).await?.into_iter().next())
    }

    async fn search(&self, text: &str) -> Result<Vec<Recipe>, SourceError> {
        self.drinks("search.php", &[("s", text)]).await
    }

    async fn lookup(&self, id: &str) -> Result<Option<Recipe>, SourceError> {
        Ok(self
            .drinks("lookup.php", &[("i", id)])
            .await?
            .into_iter()
            .next())
    }
}

/// Endpoint names are appended directly, so the base must end with `/`.
fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}
