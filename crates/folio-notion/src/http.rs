//! reqwest-backed [`NotionApi`].

use async_trait::async_trait;
use folio_config::NotionConfig;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::NotionApi;
use crate::error::ApiError;
use crate::types::{BlockChildren, DatabaseQuery, QueryResponse, RawPage};

/// Rows requested per database query call.
const QUERY_PAGE_SIZE: u32 = 100;

/// Notion REST API client.
pub struct HttpNotionApi {
    client: Client,
    base_url: String,
}

impl HttpNotionApi {
    /// Create a client sending `api_key` as bearer token and `api_version`
    /// as the `Notion-Version` header.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Other`] if a header value is invalid and
    /// [`ApiError::Request`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str, api_version: &str) -> Result<Self, ApiError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| ApiError::Other(format!("invalid API key: {e}")))?;
        auth.set_sensitive(true);
        let version = HeaderValue::from_str(api_version)
            .map_err(|e| ApiError::Other(format!("invalid API version: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("notion-version", version);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Create client from the `[notion]` config section.
    ///
    /// # Errors
    ///
    /// Same as [`HttpNotionApi::new`].
    pub fn from_config(config: &NotionConfig, api_key: &str) -> Result<Self, ApiError> {
        Self::new(&config.base_url, api_key, &config.api_version)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Send a request and decode the JSON body.
    ///
    /// Statuses >= 400 become [`ApiError::Http`] with the response body.
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if status >= 400 {
            return Err(ApiError::Http { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl NotionApi for HttpNotionApi {
    async fn retrieve_page(&self, page_id: &str) -> Result<RawPage, ApiError> {
        debug!(page_id, "GET page");
        Self::send(self.client.get(self.url(&format!("pages/{page_id}")))).await
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        page_size: u32,
    ) -> Result<BlockChildren, ApiError> {
        debug!(block_id, ?start_cursor, "GET block children");
        let mut params = vec![("page_size", page_size.to_string())];
        if let Some(cursor) = start_cursor {
            params.push(("start_cursor", cursor.to_owned()));
        }

        let request = self
            .client
            .get(self.url(&format!("blocks/{block_id}/children")))
            .query(&params);
        Self::send(request).await
    }

    async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> Result<Vec<RawPage>, ApiError> {
        let url = self.url(&format!("databases/{database_id}/query"));
        let mut rows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            debug!(database_id, ?cursor, "POST database query");
            let body = query.to_body(cursor.as_deref(), QUERY_PAGE_SIZE);
            let page: QueryResponse = Self::send(self.client.post(&url).json(&body)).await?;
            rows.extend(page.results);

            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(rows)
    }
}
