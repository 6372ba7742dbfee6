use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use crate::cocktaildb::DEFAULT_BASE_URL;

/// Environment variable overriding the recipe API base URL.
const API_URL_VAR: &str = "COCKTAILS_API_URL";

pub struct Config {
    pub db_path: PathBuf,
    pub api_base_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "cocktails").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("cocktails.db");
        let api_base_url = api_base_url(std::env::var(API_URL_VAR).ok());

        Ok(Config {
            db_path,
            api_base_url,
        })
    }
}

fn api_base_url(from_env: Option<String>) -> String {
    from_env
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}
