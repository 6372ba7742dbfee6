use std::fmt::Write;
use std::future::Future;

use anyhow::{Result, bail};
use chrono::Local;
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::Database;
use crate::models::Account;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Settings key holding the signed-in user of the local provider.
pub const CURRENT_USER_KEY: &str = "current_user_id";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email and password cannot be empty")]
    EmptyFields,

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("Login error: {0}")]
    SignInRejected(String),

    #[error("Registration error: {0}")]
    SignUpRejected(String),
}

/// Checked before any identity provider call.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(AuthError::EmptyFields);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

/// External identity service. Sign-in and sign-up resolve to the user id.
///
/// Any error from `sign_in`/`sign_up` is treated as the provider refusing the
/// request; its message is shown to the user.
pub trait IdentityProvider {
    fn sign_in(&self, email: &str, password: &str) -> impl Future<Output = Result<String>>;
    fn sign_up(&self, email: &str, password: &str) -> impl Future<Output = Result<String>>;
    fn sign_out(&self) -> Result<()>;
    fn current_user_id(&self) -> Option<String>;
}

/// Identity provider backed by the local database: accounts with salted
/// SHA-256 password digests, and the signed-in user kept in `settings`.
pub struct LocalIdentity {
    db: Database,
}

impl LocalIdentity {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn remember(&self, user_id: &str) -> Result<()> {
        self.db.set_setting(CURRENT_USER_KEY, user_id)
    }
}

impl IdentityProvider for LocalIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<String> {
        let Some(account) = self.db.find_account_by_email(email.trim())? else {
            bail!("Invalid email or password");
        };
        if password_digest(&account.password_salt, password) != account.password_hash {
            bail!("Invalid email or password");
        }
        self.remember(&account.user_id)?;
        info!(user_id = %account.user_id, "Signed in");
        Ok(account.user_id)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<String> {
        let email = email.trim();
        if self.db.find_account_by_email(email)?.is_some() {
            bail!("An account already exists for {email}");
        }

        let salt_bytes: [u8; 16] = rand::rng().random();
        let password_salt = to_hex(&salt_bytes);
        let account = Account {
            user_id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: password_digest(&password_salt, password),
            password_salt,
            created_at: Local::now().to_rfc3339(),
        };
        self.db.insert_account(&account)?;
        self.remember(&account.user_id)?;
        info!(user_id = %account.user_id, "Registered new account");
        Ok(account.user_id)
    }

    fn sign_out(&self) -> Result<()> {
        if self.db.delete_setting(CURRENT_USER_KEY)? {
            info!("Signed out");
        }
        Ok(())
    }

    fn current_user_id(&self) -> Option<String> {
        self.db
            .get_setting(CURRENT_USER_KEY)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read signed-in user");
                None
            })
            .filter(|id| !id.is_empty())
    }
}

fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
            let _ = write!(acc, "{b:02x}");
            acc
        })
}
