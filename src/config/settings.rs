//! Application settings loaded from config.toml
//!
//! The file carries the language catalog used to seed the database and optional
//! overrides of the voting budget rules.

use crate::core::budget::BudgetRules;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Budget rules; any omitted field keeps its default
    #[serde(default)]
    pub budget: BudgetRules,
    /// Languages to seed
    #[serde(default)]
    pub languages: Vec<LanguageConfig>,
}

/// Configuration for a single catalog language
#[derive(Debug, Deserialize, Clone)]
pub struct LanguageConfig {
    /// Display name, unique across the catalog
    pub name: String,
    /// CSS color used by clients
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "#888888".to_string()
}

/// Loads the configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The budget rules are inconsistent
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text and checks the budget rules.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.budget.check()?;
    Ok(config)
}

/// Loads configuration from the path in `LANGRANK_CONFIG`, or ./config.toml
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("LANGRANK_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
