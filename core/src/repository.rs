use std::future::Future;

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::Database;
use crate::models::{CachedRecipe, Recipe};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Remote recipe catalogue.
///
/// The CLI implements this with reqwest against `TheCocktailDB`; tests use
/// in-process fakes. "Nothing found" is `Ok(None)` / `Ok(vec![])`, errors are
/// reserved for transport and payload failures.
pub trait RecipeSource {
    fn fetch_random(&self) -> impl Future<Output = Result<Option<Recipe>, SourceError>> + Send;
    fn search(&self, text: &str) -> impl Future<Output = Result<Vec<Recipe>, SourceError>> + Send;
    fn lookup(&self, id: &str) -> impl Future<Output = Result<Option<Recipe>, SourceError>> + Send;
}

/// Mediates between the local store and the remote source.
///
/// Source errors stop here: every remote read is downgraded to "no data" and
/// logged, so callers only ever see empty results.
pub struct SyncRepository<S> {
    db: Database,
    source: S,
}

impl<S: RecipeSource> SyncRepository<S> {
    pub fn new(db: Database, source: S) -> Self {
        Self { db, source }
    }

    // --- Remote reads ---

    pub async fn fetch_from_network(&self, id: &str) -> Option<Recipe> {
        match self.source.lookup(id).await {
            Ok(recipe) => recipe,
            Err(e) => {
                warn!(%id, error = %e, "Recipe lookup failed");
                None
            }
        }
    }

    pub async fn fetch_random(&self) -> Option<Recipe> {
        match self.source.fetch_random().await {
            Ok(recipe) => recipe,
            Err(e) => {
                warn!(error = %e, "Random recipe fetch failed");
                None
            }
        }
    }

    pub async fn search_remote(&self, text: &str) -> Vec<Recipe> {
        match self.source.search(text).await {
            Ok(recipes) => recipes,
            Err(e) => {
                warn!(query = %text, error = %e, "Recipe search failed");
                Vec::new()
            }
        }
    }

    // --- Local state ---

    pub fn get_by_id(&self, id: &str, user_id: &str) -> Result<Option<CachedRecipe>> {
        self.db.find(id, user_id)
    }

    /// The only path that creates rows: stores `recipe` as offline for `user_id`.
    pub fn save_offline(
        &self,
        recipe: &Recipe,
        favorite: bool,
        user_id: &str,
    ) -> Result<CachedRecipe> {
        self.db
            .upsert(&CachedRecipe::from_recipe(recipe, user_id, favorite, true))
    }

    /// Favoriting also makes the recipe available offline; unfavoriting leaves
    /// the offline flag alone.
    pub fn set_favorite(&self, id: &str, is_favorite: bool, user_id: &str) -> Result<()> {
        if !self.db.set_favorite(id, is_favorite, user_id)? {
            debug!(%id, %user_id, "No cached row to update favorite flag");
            return Ok(());
        }
        // Unfavoriting leaves is_offline untouched.
        if is_favorite
            && self
                .db
                .find(id, user_id)?
                .is_some_and(|row| !row.is_offline)
        {
            self.db.set_offline(id, true, user_id)?;
        }
        Ok(())
    }

    /// Returns `false` when there is no row for (`id`, `user_id`).
    pub fn set_offline(&self, id: &str, is_offline: bool, user_id: &str) -> Result<bool> {
        self.db.set_offline(id, is_offline, user_id)
    }

    pub fn favorites_for(&self, user_id: &str) -> Result<Vec<CachedRecipe>> {
        self.db.favorites_for(user_id)
    }

    pub fn offline_for(&self, user_id: &str) -> Result<Vec<CachedRecipe>> {
        self.db.offline_for(user_id)
    }

    pub fn all_cached(&self) -> Result<Vec<CachedRecipe>> {
        self.db.all()
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }
}
