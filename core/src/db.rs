use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params, types::Type};
use tracing::debug;

use crate::models::{Account, CachedRecipe, Ingredient};

const CACHED_RECIPE_COLUMNS: &str = "id, user_id, name, thumbnail, instructions, ingredients, is_favorite, is_offline, updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS cached_recipes (
                    id TEXT NOT NULL,
                    user_id TEXT NOT NULL DEFAULT '',
                    name TEXT NOT NULL,
                    thumbnail TEXT NOT NULL DEFAULT '',
                    instructions TEXT,
                    ingredients TEXT NOT NULL DEFAULT '[]',
                    is_favorite INTEGER NOT NULL DEFAULT 0,
                    is_offline INTEGER NOT NULL DEFAULT 0,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (id, user_id)
                );

                CREATE INDEX IF NOT EXISTS idx_cached_recipes_user ON cached_recipes(user_id);

                CREATE TABLE IF NOT EXISTS settings (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS accounts (
                    user_id TEXT PRIMARY KEY,
                    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                    password_salt TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // Expects columns in CACHED_RECIPE_COLUMNS order.
    fn cached_recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<CachedRecipe> {
        let ingredients_json: String = row.get(5)?;
        let ingredients: Vec<Ingredient> = serde_json::from_str(&ingredients_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
        Ok(CachedRecipe {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            thumbnail: row.get(3)?,
            instructions: row.get(4)?,
            ingredients,
            is_favorite: row.get(6)?,
            is_offline: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn query_cached_recipes(
        &self,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<CachedRecipe>> {
        let sql = format!(
            "SELECT {CACHED_RECIPE_COLUMNS} FROM cached_recipes {filter} ORDER BY name COLLATE NOCASE, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let recipes = stmt
            .query_map(params, Self::cached_recipe_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    // --- Cached recipes ---

    /// Insert a row, or fully replace the existing row for the same `(id, user_id)`.
    pub fn upsert(&self, recipe: &CachedRecipe) -> Result<CachedRecipe> {
        let now = Local::now().to_rfc3339();
        let ingredients = serde_json::to_string(&recipe.ingredients)
            .context("Failed to encode ingredients")?;
        self.conn.execute(
            "INSERT INTO cached_recipes (id, user_id, name, thumbnail, instructions, ingredients, is_favorite, is_offline, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id, user_id) DO UPDATE SET
                name = excluded.name,
                thumbnail = excluded.thumbnail,
                instructions = excluded.instructions,
                ingredients = excluded.ingredients,
                is_favorite = excluded.is_favorite,
                is_offline = excluded.is_offline,
                updated_at = excluded.updated_at",
            params![
                recipe.id,
                recipe.user_id,
                recipe.name,
                recipe.thumbnail,
                recipe.instructions,
                ingredients,
                recipe.is_favorite,
                recipe.is_offline,
                now,
            ],
        )?;
        debug!(id = %recipe.id, user_id = %recipe.user_id, "Upserted cached recipe");
        self.find(&recipe.id, &recipe.user_id)?
            .context("Cached recipe missing after upsert")
    }

    pub fn all(&self) -> Result<Vec<CachedRecipe>> {
        self.query_cached_recipes("", params![])
    }

    pub fn favorites_for(&self, user_id: &str) -> Result<Vec<CachedRecipe>> {
        self.query_cached_recipes(
            "WHERE is_favorite = 1 AND user_id = ?1",
            params![user_id],
        )
    }

    pub fn offline_for(&self, user_id: &str) -> Result<Vec<CachedRecipe>> {
        self.query_cached_recipes("WHERE is_offline = 1 AND user_id = ?1", params![user_id])
    }

    pub fn find(&self, id: &str, user_id: &str) -> Result<Option<CachedRecipe>> {
        let sql = format!(
            "SELECT {CACHED_RECIPE_COLUMNS} FROM cached_recipes WHERE id = ?1 AND user_id = ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![id, user_id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::cached_recipe_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn delete(&self, recipe: &CachedRecipe) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM cached_recipes WHERE id = ?1 AND user_id = ?2",
            params![recipe.id, recipe.user_id],
        )?;
        Ok(rows > 0)
    }

    /// Returns `false` when no row exists for `(id, user_id)`.
    pub fn set_favorite(&self, id: &str, is_favorite: bool, user_id: &str) -> Result<bool> {
        let now = Local::now().to_rfc3339();
        let rows = self.conn.execute(
            "UPDATE cached_recipes SET is_favorite = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
            params![is_favorite, now, id, user_id],
        )?;
        debug!(%id, %user_id, is_favorite, rows, "Set favorite flag");
        Ok(rows > 0)
    }

    /// Returns `false` when no row exists for `(id, user_id)`.
    pub fn set_offline(&self, id: &str, is_offline: bool, user_id: &str) -> Result<bool> {
        let now = Local::now().to_rfc3339();
        let rows = self.conn.execute(
            "UPDATE cached_recipes SET is_offline = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
            params![is_offline, now, id, user_id],
        )?;
        debug!(%id, %user_id, is_offline, rows, "Set offline flag");
        Ok(rows > 0)
    }

    // --- Accounts ---

    pub fn insert_account(&self, account: &Account) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO accounts (user_id, email, password_salt, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    account.user_id,
                    account.email,
                    account.password_salt,
                    account.password_hash,
                    account.created_at,
                ],
            )
            .with_context(|| format!("Failed to create account for {}", account.email))?;
        Ok(())
    }

    pub fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, email, password_salt, password_hash, created_at
             FROM accounts WHERE email = ?1",
        )?;
        let mut rows = stmt.query(params![email])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Account {
                user_id: row.get(0)?,
                email: row.get(1)?,
                password_salt: row.get(2)?,
                password_hash: row.get(3)?,
                created_at: row.get(4)?,
            }))
        } else {
            Ok(None)
        }
    }

    // --- Settings ---

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}
