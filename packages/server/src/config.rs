//! Application configuration.
//!
//! Runtime settings come from environment variables (with `.env`
//! support in development); the category/city allow-lists come from a
//! JSON app-config file shared with the rest of the product.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use tracing::warn;

/// Default location of the shared app-config file.
const DEFAULT_APP_CONFIG_PATH: &str = "config/app-config.json";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Absent key means degraded mode (placeholder extraction), not an error.
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub app_config_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_model: env::var("OPENAI_MODEL").ok().filter(|m| !m.is_empty()),
            app_config_path: env::var("APP_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_APP_CONFIG_PATH)),
        })
    }
}

/// Category and city allow-lists shared with the brand CRUD layer.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub categories: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
}

impl AppConfig {
    /// Load from a JSON file, falling back to the built-in lists when
    /// the file is missing or malformed.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<AppConfig>(&raw) {
                Ok(config) if !config.categories.is_empty() => config,
                Ok(_) => {
                    warn!(path = %path.display(), "App config has no categories, using defaults");
                    Self::default()
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid app config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "App config not readable, using defaults");
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            categories: [
                "Technology",
                "Fashion",
                "Food & Beverage",
                "Health & Fitness",
                "Travel",
                "Entertainment",
                "Education",
                "Gaming",
                "Beauty",
                "Sports",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            cities: [
                "Austin, TX",
                "San Francisco, CA",
                "New York, NY",
                "Los Angeles, CA",
                "Chicago, IL",
                "Miami, FL",
                "Seattle, WA",
                "Denver, CO",
                "Global",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}
