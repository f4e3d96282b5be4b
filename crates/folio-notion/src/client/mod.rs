//! Caching content client.
//!
//! Every read goes through the shared [`ContentCache`] under a key derived
//! from the operation and its arguments. Remote failures are classified
//! into [`ContentError`] before they reach the cache, so a stale entry can
//! stand in for any of them.

mod blocks;
mod database;
mod pages;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use folio_cache::{CacheConfig, ContentCache};
use folio_config::{Config, PropertiesConfig};
use folio_model::Page;

use crate::api::NotionApi;
use crate::error::ContentError;
use crate::http::HttpNotionApi;
use crate::shape::shape_page;
use crate::types::RawPage;

pub use database::DEFAULT_STATUS;

/// Notion content client.
///
/// Cloning is cheap; clones share the API client and the cache.
#[derive(Clone)]
pub struct ContentClient {
    api: Arc<dyn NotionApi>,
    cache: ContentCache,
    database_id: Option<String>,
    properties: Arc<PropertiesConfig>,
}

impl ContentClient {
    /// Create a client without a database id and with default property names.
    pub fn new(api: Arc<dyn NotionApi>, cache: ContentCache) -> Self {
        Self {
            api,
            cache,
            database_id: None,
            properties: Arc::new(PropertiesConfig::default()),
        }
    }

    /// Set the content database queried by listing operations.
    #[must_use]
    pub fn with_database_id(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = Some(database_id.into());
        self
    }

    /// Set the property names pages are shaped from.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertiesConfig) -> Self {
        self.properties = Arc::new(properties);
        self
    }

    /// Create an HTTP-backed client with a fresh cache.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Configuration`] if no API key is configured
    /// and [`ContentError::Api`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ContentError> {
        let api_key = config
            .require_api_key()
            .map_err(|e| ContentError::Configuration(e.to_string()))?;
        let api = HttpNotionApi::from_config(&config.notion, api_key).map_err(|source| {
            ContentError::Api {
                context: "create HTTP client".to_owned(),
                source,
            }
        })?;
        let cache = ContentCache::new(
            CacheConfig::new(config.cache.ttl())
                .with_refresh_threshold(config.cache.refresh_threshold),
        );

        let mut client =
            Self::new(Arc::new(api), cache).with_properties(config.properties.clone());
        client.database_id.clone_from(&config.notion.database_id);
        Ok(client)
    }

    /// The shared cache.
    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Drop cached entries, all or those whose key starts with `prefix`.
    ///
    /// Returns the number of removed entries.
    pub fn clear_cache(&self, prefix: Option<&str>) -> usize {
        self.cache.clear(prefix)
    }

    /// Configured database id, checked before any cache or remote work.
    fn require_database_id(&self) -> Result<String, ContentError> {
        self.database_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| {
                ContentError::Configuration(format!(
                    "database id is not set (set notion.database_id or {})",
                    folio_config::DATABASE_ID_ENV
                ))
            })
    }

    fn shape(&self, raw: &RawPage, now: DateTime<Utc>) -> Page {
        shape_page(raw, &self.properties, now)
    }
}
