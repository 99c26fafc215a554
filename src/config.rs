//! TOML configuration.
//!
//! ```toml
//! [db]
//! url = "sqlite://data/cigars.sqlite"
//!
//! [server]
//! bind = "0.0.0.0:3000"
//! ```
//!
//! The file is optional. The `CIGAR_API_DB_URL` environment variable, when
//! set, replaces `db.url`; it is the usual way to hand the service its
//! connection string.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable that overrides `[db].url`.
pub const DB_URL_ENV: &str = "CIGAR_API_DB_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DbConfig {
    /// sqlx SQLite URL, e.g. `sqlite://data/cigars.sqlite`.
    ///
    /// Left unset, the server still starts but every store call fails.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

/// Loads the config file at `path` (defaults if it does not exist), then
/// applies the environment override and validates the result.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        parse_config(&content)?
    } else {
        Config::default()
    };

    if let Ok(url) = std::env::var(DB_URL_ENV) {
        config.apply_db_url(url);
    }

    validate(&config)?;
    Ok(config)
}

/// Parses config text without touching the environment.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}

impl Config {
    /// Sets the database URL; blank values clear it.
    pub fn apply_db_url(&mut self, url: String) {
        let url = url.trim();
        self.db.url = if url.is_empty() {
            None
        } else {
            Some(url.to_string())
        };
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }
    Ok(())
}
