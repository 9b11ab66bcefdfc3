//! Configuration management for Gramsky

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub archive: ArchiveConfig,
    pub bluesky: Option<BlueskyConfig>,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Root of the unpacked Instagram export.
    pub folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueskyConfig {
    /// Handle, e.g. "user.bsky.social".
    pub identifier: String,
    /// App password. May be omitted and supplied via `BLUESKY_PASSWORD`.
    pub password: Option<String>,
}

impl BlueskyConfig {
    /// App password from the config file, overridden by `BLUESKY_PASSWORD`.
    pub fn resolve_password(&self) -> Result<String> {
        if let Ok(password) = std::env::var("BLUESKY_PASSWORD") {
            return Ok(password);
        }
        self.password
            .clone()
            .ok_or_else(|| ConfigError::MissingField("bluesky.password".to_string()).into())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub simulate: bool,
    /// Inclusive lower date bound, RFC 3339 or YYYY-MM-DD.
    pub min_date: Option<String>,
    /// Upper date bound; posts beyond it stop the run.
    pub max_date: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    pub fn archive_folder(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.archive.folder).to_string())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("GRAMSKY_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("gramsky").join("config.toml"))
}

/// Parse a date bound: RFC 3339, or a plain date taken as midnight UTC.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = value.parse::<NaiveDate>() {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(ConfigError::InvalidDate(value.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_config() {
        let toml_str = r#"
            [archive]
            folder = "~/exports/instagram"

            [bluesky]
            identifier = "user.bsky.social"
            password = "app-password"

            [import]
            simulate = true
            min_date = "2018-01-01"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.archive.folder, "~/exports/instagram");
        assert!(config.import.simulate);
        assert_eq!(config.import.min_date.as_deref(), Some("2018-01-01"));
        assert!(config.import.max_date.is_none());
        let bluesky = config.bluesky.unwrap();
        assert_eq!(bluesky.identifier, "user.bsky.social");
    }

    #[test]
    fn test_import_section_optional() {
        let toml_str = r#"
            [archive]
            folder = "/data/export"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(!config.import.simulate);
        assert!(config.bluesky.is_none());
    }

    #[test]
    fn test_parse_date_plain() {
        let date = parse_date("2020-06-15").unwrap();
        assert_eq!(date.to_rfc3339(), "2020-06-15T00:00:00+00:00");
    }

    #[test]
    fn test_parse_date_rfc3339() {
        let date = parse_date("2020-06-15T12:30:00Z").unwrap();
        assert_eq!(date.timestamp(), 1592224200);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("June 15th").is_err());
    }
}
