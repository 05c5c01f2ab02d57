//! Runtime configuration from the environment (`.env` is loaded first)

use serde::{Deserialize, Serialize};
use std::env;

/// ---------------------------------------------------------------------------
/// Defaults
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://lift-progression.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_FILTER: &str = "info";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "message")]
pub enum ConfigError {
  #[error("Invalid configuration: {0}")]
  Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub database_url: String,
  pub max_connections: u32,
  pub log_filter: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      max_connections: DEFAULT_MAX_CONNECTIONS,
      log_filter: DEFAULT_LOG_FILTER.to_string(),
    }
  }
}

impl AppConfig {
  /// Reads `PROGRESSION_DATABASE_URL`, `PROGRESSION_DB_MAX_CONNECTIONS` and
  /// `PROGRESSION_LOG`, falling back to defaults when unset
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let max_connections = match env::var("PROGRESSION_DB_MAX_CONNECTIONS") {
      Ok(raw) => match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
          return Err(ConfigError::Invalid(format!(
            "PROGRESSION_DB_MAX_CONNECTIONS must be a positive integer, got {:?}",
            raw
          )))
        }
      },
      Err(_) => defaults.max_connections,
    };

    Ok(Self {
      database_url: env::var("PROGRESSION_DATABASE_URL").unwrap_or(defaults.database_url),
      max_connections,
      log_filter: env::var("PROGRESSION_LOG").unwrap_or(defaults.log_filter),
    })
  }
}
