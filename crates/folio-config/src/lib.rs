//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variables
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `notion.api_key`
//! - `notion.database_id`
//! - `notion.base_url`
//!
//! When `notion.api_key` or `notion.database_id` are absent, they are read
//! from `NOTION_API_KEY` and `NOTION_DATABASE_ID`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "NOTION_API_KEY";

/// Environment variable holding the content database id.
pub const DATABASE_ID_ENV: &str = "NOTION_DATABASE_ID";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the API credential.
    pub api_key: Option<String>,
    /// Override the content database id.
    pub database_id: Option<String>,
    /// Override the cache TTL in seconds.
    pub ttl_secs: Option<u64>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API configuration.
    pub notion: NotionConfig,
    /// Cache timing.
    pub cache: CacheSettings,
    /// Database property names used to shape pages.
    pub properties: PropertiesConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Remote API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Integration token.
    pub api_key: Option<String>,
    /// Content database id.
    pub database_id: Option<String>,
    /// API base URL.
    pub base_url: String,
    /// Value of the `Notion-Version` header.
    pub api_version: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            database_id: None,
            base_url: "https://api.notion.com/v1".to_owned(),
            api_version: "2022-06-28".to_owned(),
        }
    }
}

/// Longest accepted `cache.ttl_secs` (one year).
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Cache timing as written in the config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
    /// Fraction of the TTL after which hits refresh in the background.
    pub refresh_threshold: f64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            refresh_threshold: 0.8,
        }
    }
}

impl CacheSettings {
    /// Entry lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Notion property type backing the status property.
///
/// Database filters are typed, so a `status` property cannot be matched with
/// a `select` filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusType {
    /// Plain select property.
    #[default]
    Select,
    /// Notion's built-in status property.
    Status,
}

/// Names of the database properties pages are shaped from.
///
/// The title is taken from whichever property has the `title` type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PropertiesConfig {
    pub slug: String,
    pub summary: String,
    pub tags: String,
    pub category: String,
    pub status: String,
    pub status_type: StatusType,
    pub author: String,
    pub thumbnail: String,
    pub date: String,
    pub keywords: String,
}

impl Default for PropertiesConfig {
    fn default() -> Self {
        Self {
            slug: "Slug".to_owned(),
            summary: "Summary".to_owned(),
            tags: "Tags".to_owned(),
            category: "Category".to_owned(),
            status: "Status".to_owned(),
            status_type: StatusType::Select,
            author: "Author".to_owned(),
            thumbnail: "Thumbnail".to_owned(),
            date: "Date".to_owned(),
            keywords: "Keywords".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`notion.api_key`").
        field: String,
        /// Error message (e.g., "${`NOTION_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents,
    /// falling back to defaults when none exists.
    ///
    /// Missing credentials are then filled from the environment, and CLI
    /// settings are applied last so they take precedence.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result does not validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        config.apply_env_fallbacks(|name| std::env::var(name).ok());

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Fill unset credentials from the environment.
    fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());

        if blank(&self.notion.api_key) {
            self.notion.api_key = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty());
        }
        if blank(&self.notion.database_id) {
            self.notion.database_id = lookup(DATABASE_ID_ENV).filter(|v| !v.trim().is_empty());
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(api_key) = &settings.api_key {
            self.notion.api_key = Some(api_key.clone());
        }
        if let Some(database_id) = &settings.database_id {
            self.notion.database_id = Some(database_id.clone());
        }
        if let Some(ttl_secs) = settings.ttl_secs {
            self.cache.ttl_secs = ttl_secs;
        }
    }

    /// Get the API credential.
    ///
    /// Use this instead of reading `notion.api_key` directly when the
    /// command talks to the remote API.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if no credential is configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.notion
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "notion.api_key is required (set it in {CONFIG_FILENAME} or {API_KEY_ENV})"
                ))
            })
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Credentials are not checked here; see [`Config::require_api_key`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_notion()?;
        self.validate_cache()?;
        Ok(())
    }

    fn validate_notion(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.notion.base_url, "notion.base_url")?;
        require_http_url(&self.notion.base_url, "notion.base_url")?;
        require_non_empty(&self.notion.api_version, "notion.api_version")?;
        Ok(())
    }

    fn validate_cache(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache.ttl_secs must be greater than 0".to_owned(),
            ));
        }
        if self.cache.ttl_secs > MAX_TTL_SECS {
            return Err(ConfigError::Validation(format!(
                "cache.ttl_secs must be at most {MAX_TTL_SECS}, got {}",
                self.cache.ttl_secs
            )));
        }

        let threshold = self.cache.refresh_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "cache.refresh_threshold must be in (0, 1], got {threshold}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let notion = &mut self.notion;
        notion.api_key = expand::expand_env_opt(notion.api_key.as_deref(), "notion.api_key")?;
        notion.database_id =
            expand::expand_env_opt(notion.database_id.as_deref(), "notion.database_id")?;
        notion.base_url = expand::expand_env(&notion.base_url, "notion.base_url")?;
        Ok(())
    }
}
