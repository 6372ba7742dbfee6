use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::identity::{AuthError, IdentityProvider, validate_credentials};
use crate::models::{CachedRecipe, Recipe, RecipeDetail};
use crate::repository::{RecipeSource, SyncRepository};

/// Number of random recipes shown when there is nothing to search for.
pub const DEFAULT_RANDOM_COUNT: usize = 10;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Sign in to save favorites and offline recipes")]
    SignInRequired,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// View-facing entry point: the current browse list plus user actions.
///
/// Mutating actions require a signed-in user; anonymous calls are rejected
/// with [`ActionError::SignInRequired`] before the store is touched.
pub struct CocktailService<S, I> {
    repository: SyncRepository<S>,
    identity: I,
    recipes: watch::Sender<Vec<Recipe>>,
}

impl<S: RecipeSource, I: IdentityProvider> CocktailService<S, I> {
    pub fn new(repository: SyncRepository<S>, identity: I) -> Self {
        let (recipes, _) = watch::channel(Vec::new());
        Self {
            repository,
            identity,
            recipes,
        }
    }

    pub fn repository(&self) -> &SyncRepository<S> {
        &self.repository
    }

    // --- Browse list ---

    pub fn subscribe(&self) -> watch::Receiver<Vec<Recipe>> {
        self.recipes.subscribe()
    }

    pub fn current(&self) -> Vec<Recipe> {
        self.recipes.borrow().clone()
    }

    fn publish(&self, recipes: Vec<Recipe>) -> Vec<Recipe> {
        debug!(count = recipes.len(), "Publishing recipe list");
        self.recipes.send_replace(recipes.clone());
        recipes
    }

    /// Fetch `count` random recipes one after another. Failed fetches are
    /// skipped, so the list may be shorter than `count`.
    pub async fn load_random(&self, count: usize) -> Vec<Recipe> {
        let mut randoms = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(recipe) = self.repository.fetch_random().await {
                randoms.push(recipe);
            }
        }
        self.publish(randoms)
    }

    pub async fn search(&self, text: &str) -> Vec<Recipe> {
        let text = text.trim();
        if text.is_empty() {
            return self.load_random(DEFAULT_RANDOM_COUNT).await;
        }
        let results = self.repository.search_remote(text).await;
        self.publish(results)
    }

    /// Local row for the signed-in user first, then the remote catalogue.
    ///
    /// A local row always supplies the flags. Rows cached without
    /// instructions are completed from the network when it answers, and
    /// served as-is when it does not.
    pub async fn detail(&self, id: &str) -> Result<Option<RecipeDetail>, ActionError> {
        let row = match self.identity.current_user_id() {
            Some(user_id) => self.repository.get_by_id(id, &user_id)?,
            None => None,
        };

        let Some(row) = row else {
            return Ok(self
                .repository
                .fetch_from_network(id)
                .await
                .map(|recipe| RecipeDetail {
                    recipe,
                    is_favorite: false,
                    is_offline: false,
                }));
        };

        let recipe = if row.instructions.is_some() {
            row.to_recipe()
        } else {
            match self.repository.fetch_from_network(id).await {
                Some(remote) => remote,
                None => row.to_recipe(),
            }
        };
        Ok(Some(RecipeDetail {
            recipe,
            is_favorite: row.is_favorite,
            is_offline: row.is_offline,
        }))
    }

    // --- User actions ---

    fn require_user(&self) -> Result<String, ActionError> {
        self.identity
            .current_user_id()
            .ok_or(ActionError::SignInRequired)
    }

    /// Creates a favorite (and offline) row on first use, otherwise flips the
    /// favorite flag.
    pub fn toggle_favorite(&self, recipe: &Recipe) -> Result<CachedRecipe, ActionError> {
        let user_id = self.require_user()?;
        match self.repository.get_by_id(&recipe.id, &user_id)? {
            None => Ok(self.repository.save_offline(recipe, true, &user_id)?),
            Some(existing) => {
                self.repository
                    .set_favorite(&recipe.id, !existing.is_favorite, &user_id)?;
                self.reload(&recipe.id, &user_id)
            }
        }
    }

    pub fn save_offline(&self, recipe: &Recipe) -> Result<CachedRecipe, ActionError> {
        let user_id = self.require_user()?;
        if self.repository.get_by_id(&recipe.id, &user_id)?.is_none() {
            return Ok(self.repository.save_offline(recipe, false, &user_id)?);
        }
        self.repository.set_offline(&recipe.id, true, &user_id)?;
        self.reload(&recipe.id, &user_id)
    }

    /// Returns `false` when the user has no cached row for `id`.
    pub fn remove_offline(&self, id: &str) -> Result<bool, ActionError> {
        let user_id = self.require_user()?;
        Ok(self.repository.set_offline(id, false, &user_id)?)
    }

    pub fn favorites(&self) -> Result<Vec<CachedRecipe>, ActionError> {
        let user_id = self.require_user()?;
        Ok(self.repository.favorites_for(&user_id)?)
    }

    pub fn offline(&self) -> Result<Vec<CachedRecipe>, ActionError> {
        let user_id = self.require_user()?;
        Ok(self.repository.offline_for(&user_id)?)
    }

    fn reload(&self, id: &str, user_id: &str) -> Result<CachedRecipe, ActionError> {
        Ok(self
            .repository
            .get_by_id(id, user_id)?
            .ok_or_else(|| anyhow::anyhow!("Cached recipe {id} disappeared"))?)
    }

    // --- Accounts ---

    pub fn current_user_id(&self) -> Option<String> {
        self.identity.current_user_id()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthError> {
        validate_credentials(email, password)?;
        let user_id = self
            .identity
            .sign_in(email, password)
            .await
            .map_err(|e| AuthError::SignInRejected(e.to_string()))?;
        info!(%user_id, "User signed in");
        Ok(user_id)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<String, AuthError> {
        validate_credentials(email, password)?;
        self.identity
            .sign_up(email, password)
            .await
            .map_err(|e| AuthError::SignUpRejected(e.to_string()))
    }

    pub fn sign_out(&self) -> anyhow::Result<()> {
        self.identity.sign_out()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use anyhow::{Result, bail};

    use super::*;
    use crate::db::Database;
    use crate::repository::SourceError;
    use crate::repository::tests::{FakeSource, recipe};

    /// Identity stub: a fixed signed-in user (or none) and a log of provider calls.
    #[derive(Default)]
    struct FakeIdentity {
        user: RefCell<Option<String>>,
        provider_calls: Cell<usize>,
        reject: bool,
    }

    impl FakeIdentity {
        fn signed_in(user: &str) -> Self {
            Self {
                user: RefCell::new(Some(user.to_string())),
                ..Self::default()
            }
        }
    }

    impl IdentityProvider for FakeIdentity {
        async fn sign_in(&self, email: &str, _password: &str) -> Result<String> {
            self.provider_calls.set(self.provider_calls.get() + 1);
            if self.reject {
                bail!("no such user");
            }
            *self.user.borrow_mut() = Some(email.to_string());
            Ok(email.to_string())
        }

        async fn sign_up(&self, email: &str, password: &str) -> Result<String> {
            self.sign_in(email, password).await
        }

        fn sign_out(&self) -> Result<()> {
            *self.user.borrow_mut() = None;
            Ok(())
        }

        fn current_user_id(&self) -> Option<String> {
            self.user.borrow().clone()
        }
    }

    fn service(source: FakeSource, identity: FakeIdentity) -> CocktailService<FakeSource, FakeIdentity> {
        let repository = SyncRepository::new(Database::open_in_memory().unwrap(), source);
        CocktailService::new(repository, identity)
    }

    #[tokio::test]
    async fn test_load_random_skips_failures_in_arrival_order() {
        let source = FakeSource {
            randoms: Mutex::new(VecDeque::from([
                Ok(Some(recipe("1", "Negroni"))),
                Err(SourceError::Status(500)),
                Ok(Some(recipe("2", "Daiquiri"))),
                Err(SourceError::InvalidResponse("truncated".to_string())),
                Ok(Some(recipe("3", "Gimlet"))),
            ])),
            ..FakeSource::default()
        };
        let svc = service(source, FakeIdentity::default());
        let rx = svc.subscribe();

        let loaded = svc.load_random(5).await;
        let ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(*rx.borrow(), loaded);
        assert_eq!(svc.repository().source().call_count(), 5);
    }

    #[tokio::test]
    async fn test_search_with_no_matches_publishes_empty_list() {
        let source = FakeSource {
            randoms: Mutex::new(VecDeque::from([Ok(Some(recipe("1", "Negroni")))])),
            ..FakeSource::default()
        };
        let svc = service(source, FakeIdentity::default());
        svc.load_random(1).await;
        assert_eq!(svc.current().len(), 1);

        let results = svc.search("mojito").await;
        assert!(results.is_empty());
        assert!(svc.current().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_publishes_empty_list() {
        let source = FakeSource {
            fail_all: true,
            ..FakeSource::default()
        };
        let svc = service(source, FakeIdentity::default());
        assert!(svc.search("mojito").await.is_empty());
        assert!(svc.current().is_empty());
    }

    #[tokio::test]
    async fn test_search_returns_matches() {
        let mut source = FakeSource::default();
        source.searches.insert(
            "margarita".to_string(),
            vec![recipe("11007", "Margarita"), recipe("11118", "Blue Margarita")],
        );
        let svc = service(source, FakeIdentity::default());
        let results = svc.search("  margarita ").await;
        assert_eq!(results.len(), 2);
        assert_eq!(svc.current(), results);
    }

    #[tokio::test]
    async fn test_blank_search_falls_back_to_random() {
        let source = FakeSource::default();
        let svc = service(source, FakeIdentity::default());
        assert!(svc.search("   ").await.is_empty());
        assert_eq!(svc.repository().source().call_count(), DEFAULT_RANDOM_COUNT);
    }

    #[test]
    fn test_toggle_favorite_creates_single_row() {
        let svc = service(FakeSource::default(), FakeIdentity::signed_in("alice"));
        let row = svc.toggle_favorite(&recipe("1", "Negroni")).unwrap();
        assert!(row.is_favorite);
        assert!(row.is_offline);

        let all = svc.repository().all_cached().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].user_id, "alice");
        assert_eq!(all[0].ingredients.len(), 2);
    }

    #[test]
    fn test_toggle_favorite_flips_existing_row() {
        let svc = service(FakeSource::default(), FakeIdentity::signed_in("alice"));
        let negroni = recipe("1", "Negroni");
        svc.toggle_favorite(&negroni).unwrap();

        let row = svc.toggle_favorite(&negroni).unwrap();
        assert!(!row.is_favorite);
        assert!(row.is_offline);

        svc.remove_offline("1").unwrap();
        let row = svc.toggle_favorite(&negroni).unwrap();
        assert!(row.is_favorite);
        assert!(row.is_offline);
        assert_eq!(svc.repository().all_cached().unwrap().len(), 1);
    }

    #[test]
    fn test_anonymous_actions_are_rejected_without_writes() {
        let svc = service(FakeSource::default(), FakeIdentity::default());
        let negroni = recipe("1", "Negroni");

        assert!(matches!(
            svc.toggle_favorite(&negroni),
            Err(ActionError::SignInRequired)
        ));
        assert!(matches!(
            svc.save_offline(&negroni),
            Err(ActionError::SignInRequired)
        ));
        assert!(matches!(
            svc.remove_offline("1"),
            Err(ActionError::SignInRequired)
        ));
        assert!(matches!(svc.favorites(), Err(ActionError::SignInRequired)));
        assert!(svc.repository().all_cached().unwrap().is_empty());
        assert_eq!(
            ActionError::SignInRequired.to_string(),
            "Sign in to save favorites and offline recipes"
        );
    }

    #[test]
    fn test_save_and_remove_offline() {
        let svc = service(FakeSource::default(), FakeIdentity::signed_in("alice"));
        let negroni = recipe("1", "Negroni");

        let row = svc.save_offline(&negroni).unwrap();
        assert!(row.is_offline);
        assert!(!row.is_favorite);
        assert_eq!(svc.offline().unwrap().len(), 1);

        svc.remove_offline("1").unwrap();
        assert!(svc.offline().unwrap().is_empty());
        // The row stays resident, only the flag flips.
        assert_eq!(svc.repository().all_cached().unwrap().len(), 1);

        let row = svc.save_offline(&negroni).unwrap();
        assert!(row.is_offline);
        assert_eq!(svc.repository().all_cached().unwrap().len(), 1);
    }

    #[test]
    fn test_save_offline_keeps_favorite() {
        let svc = service(FakeSource::default(), FakeIdentity::signed_in("alice"));
        let negroni = recipe("1", "Negroni");
        svc.toggle_favorite(&negroni).unwrap();
        svc.remove_offline("1").unwrap();

        let row = svc.save_offline(&negroni).unwrap();
        assert!(row.is_favorite);
        assert!(row.is_offline);
        assert_eq!(svc.favorites().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_detail_prefers_local_row() {
        let mut source = FakeSource::default();
        source.by_id.insert("1".to_string(), recipe("1", "Remote Negroni"));
        let svc = service(source, FakeIdentity::signed_in("alice"));
        svc.toggle_favorite(&recipe("1", "Negroni")).unwrap();

        let detail = svc.detail("1").await.unwrap().unwrap();
        assert_eq!(detail.recipe.name, "Negroni");
        assert!(detail.is_favorite);
        assert!(detail.is_offline);
        assert_eq!(svc.repository().source().call_count(), 0);
    }

    #[tokio::test]
    async fn test_detail_falls_back_to_network() {
        let mut source = FakeSource::default();
        source.by_id.insert("1".to_string(), recipe("1", "Negroni"));
        let svc = service(source, FakeIdentity::default());

        let detail = svc.detail("1").await.unwrap().unwrap();
        assert_eq!(detail.recipe.name, "Negroni");
        assert!(!detail.is_favorite);
        assert!(!detail.is_offline);
        assert!(svc.detail("2").await.unwrap().is_none());
    }

    fn bare(id: &str, name: &str) -> Recipe {
        Recipe {
            instructions: None,
            ..recipe(id, name)
        }
    }

    #[tokio::test]
    async fn test_detail_keeps_flags_of_row_without_instructions() {
        let mut source = FakeSource::default();
        source.by_id.insert("1".to_string(), recipe("1", "Negroni"));
        let svc = service(source, FakeIdentity::signed_in("alice"));
        svc.toggle_favorite(&bare("1", "Negroni")).unwrap();

        let detail = svc.detail("1").await.unwrap().unwrap();
        assert!(detail.is_favorite);
        assert!(detail.is_offline);
        assert_eq!(
            detail.recipe.instructions.as_deref(),
            Some("Mix the Negroni.")
        );
    }

    #[tokio::test]
    async fn test_detail_serves_offline_row_when_network_is_down() {
        let source = FakeSource {
            fail_all: true,
            ..FakeSource::default()
        };
        let svc = service(source, FakeIdentity::signed_in("alice"));
        svc.save_offline(&bare("1", "Negroni")).unwrap();

        let detail = svc.detail("1").await.unwrap().unwrap();
        assert_eq!(detail.recipe.name, "Negroni");
        assert!(detail.recipe.instructions.is_none());
        assert_eq!(detail.recipe.ingredients.len(), 2);
        assert!(!detail.is_favorite);
        assert!(detail.is_offline);
    }

    #[test]
    fn test_remove_offline_reports_missing_row() {
        let svc = service(FakeSource::default(), FakeIdentity::signed_in("alice"));
        assert!(!svc.remove_offline("999").unwrap());

        svc.save_offline(&recipe("1", "Negroni")).unwrap();
        assert!(svc.remove_offline("1").unwrap());
        let row = svc.repository().get_by_id("1", "alice").unwrap().unwrap();
        assert!(!row.is_offline);
    }

    #[tokio::test]
    async fn test_credentials_checked_before_provider() {
        let svc = service(FakeSource::default(), FakeIdentity::default());

        assert!(matches!(
            svc.sign_in("", "secret1").await,
            Err(AuthError::EmptyFields)
        ));
        assert!(matches!(
            svc.sign_up("a@b.c", "short").await,
            Err(AuthError::PasswordTooShort)
        ));
        assert_eq!(svc.identity.provider_calls.get(), 0);

        let user = svc.sign_in("a@b.c", "secret1").await.unwrap();
        assert_eq!(svc.current_user_id(), Some(user));
        svc.sign_out().unwrap();
        assert!(svc.current_user_id().is_none());
    }

    #[tokio::test]
    async fn test_provider_rejection_is_reported() {
        let identity = FakeIdentity {
            reject: true,
            ..FakeIdentity::default()
        };
        let svc = service(FakeSource::default(), identity);

        let err = svc.sign_in("a@b.c", "secret1").await.unwrap_err();
        assert_eq!(err.to_string(), "Login error: no such user");
        let err = svc.sign_up("a@b.c", "secret1").await.unwrap_err();
        assert_eq!(err.to_string(), "Registration error: no such user");
    }
}
