//! Application configuration.
//!
//! Layered from built-in defaults, an optional TOML file under the
//! user's config directory, and `CINETUI_*` environment overrides. The
//! base price and currency are client configuration pending a
//! server-supplied source of truth.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Default booking-service endpoint.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
/// Default per-seat base price before the ticket-type multiplier.
pub const DEFAULT_BASE_PRICE: f64 = 500.0;
/// Default currency symbol shown next to prices.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

const CONFIG_DIR: &str = "cinetui";
const CONFIG_FILE: &str = "config.toml";

/// Runtime configuration for the booking client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the booking-service API.
    pub api_base_url: String,
    /// Per-seat base price before the ticket-type multiplier.
    pub base_price: f64,
    /// Currency symbol for price display.
    pub currency_symbol: String,
    /// Directory holding durable client state (the last-ticket pointer).
    pub data_root: PathBuf,
}

impl AppConfig {
    /// Loads configuration from all layers.
    pub fn load() -> Result<Self> {
        Self::load_from(config_file_path())
    }

    fn load_from(file_path: PathBuf) -> Result<Self> {
        let settings = Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("base_price", DEFAULT_BASE_PRICE)?
            .set_default("currency_symbol", DEFAULT_CURRENCY_SYMBOL)?
            .set_default(
                "data_root",
                default_data_root().to_string_lossy().to_string(),
            )?
            .add_source(File::from(file_path).required(false))
            .add_source(Environment::with_prefix("CINETUI").try_parsing(true))
            .build()
            .context("failed to assemble configuration")?;
        settings
            .try_deserialize()
            .context("invalid configuration values")
    }
}

/// Directory holding the user config file and default client state.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
}

fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

fn default_data_root() -> PathBuf {
    config_dir()
}

/// Writes a commented default config file on first run, leaving an
/// existing file untouched.
pub fn ensure_default_config() -> Result<()> {
    let path = config_file_path();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let contents = format!(
        "# CineTUI configuration. Uncomment a key to override its default.\n\
         #\n\
         # api_base_url = \"{DEFAULT_API_BASE_URL}\"\n\
         # base_price = {DEFAULT_BASE_PRICE}\n\
         # currency_symbol = \"{DEFAULT_CURRENCY_SYMBOL}\"\n\
         # data_root = \"...\"\n"
    );
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_without_a_config_file() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("missing.toml"))?;
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.base_price, DEFAULT_BASE_PRICE);
        assert_eq!(config.currency_symbol, DEFAULT_CURRENCY_SYMBOL);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base_url = \"http://cinema.example:8080\"\nbase_price = 420.0\n",
        )?;
        let config = AppConfig::load_from(path)?;
        assert_eq!(config.api_base_url, "http://cinema.example:8080");
        assert_eq!(config.base_price, 420.0);
        assert_eq!(config.currency_symbol, DEFAULT_CURRENCY_SYMBOL);
        Ok(())
    }
}
