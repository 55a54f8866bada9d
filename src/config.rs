//! Application configuration loaded from a TOML file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::infrastructure::database::DatabaseConfig;

/// Top-level configuration (`config.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SeaORM connection URL, e.g. `sqlite://./tirta.db?mode=rwc`
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default tracing filter when RUST_LOG is unset
    pub level: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DatabaseConfig::default().url,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseSection::default(),
            logging: LoggingSection::default(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database.url.clone())
    }
}

/// `~/.config/tirta-billing/config.toml`, or a relative fallback when no
/// home directory is known.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tirta-billing")
        .join("config.toml")
}

/// Initialize tracing from the config. Call once at process startup;
/// RUST_LOG overrides the configured level.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = AppConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.database.url.starts_with("sqlite://"));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AppConfig = toml::from_str("[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.database.url, DatabaseSection::default().url);
    }
}
