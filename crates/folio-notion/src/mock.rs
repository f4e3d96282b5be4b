//! In-memory [`NotionApi`] for testing.
//!
//! Provides [`MockNotionApi`], which serves pages, block children and
//! database rows from memory, counts calls and can fail on demand.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use folio_model::{Block, plain_text};

use crate::api::NotionApi;
use crate::error::ApiError;
use crate::types::{BlockChildren, DatabaseQuery, Filter, PropertyValue, RawPage};

/// Mock Notion API.
///
/// Block children are stored as pre-split result pages; `page_size` is
/// ignored. Database queries apply the query filter to the stored rows and
/// return them in insertion order. Select and status filters only match
/// properties of their own type.
///
/// With [`MockNotionApi::with_latency`], every call sleeps on the tokio clock
/// before answering.
///
/// # Example
///
/// ```ignore
/// let api = MockNotionApi::new()
///     .with_children("page-1", vec![divider("b1")])
///     .with_failure("page-2", 404, "object_not_found");
/// ```
#[derive(Debug, Default)]
pub struct MockNotionApi {
    pages: RwLock<HashMap<String, RawPage>>,
    children: RwLock<HashMap<String, Vec<Vec<Block>>>>,
    rows: RwLock<Vec<RawPage>>,
    failures: RwLock<HashMap<String, (u16, String)>>,
    queries: RwLock<Vec<(String, DatabaseQuery)>>,
    page_calls: AtomicUsize,
    children_calls: AtomicUsize,
    query_calls: AtomicUsize,
    latency: Option<Duration>,
}

impl MockNotionApi {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page served by `retrieve_page`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, page: RawPage) -> Self {
        self.set_page(page);
        self
    }

    /// Add the children of a block as a single result page.
    #[must_use]
    pub fn with_children(self, block_id: impl Into<String>, blocks: Vec<Block>) -> Self {
        self.with_block_pages(block_id, vec![blocks])
    }

    /// Add the children of a block split over several result pages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_block_pages(self, block_id: impl Into<String>, pages: Vec<Vec<Block>>) -> Self {
        self.children.write().unwrap().insert(block_id.into(), pages);
        self
    }

    /// Add database rows.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_rows(self, rows: Vec<RawPage>) -> Self {
        self.rows.write().unwrap().extend(rows);
        self
    }

    /// Delay every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every call addressing `id` fail with an HTTP error.
    #[must_use]
    pub fn with_failure(self, id: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.fail(id, status, body);
        self
    }

    /// Replace or add a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_page(&self, page: RawPage) {
        self.pages.write().unwrap().insert(page.id.clone(), page);
    }

    /// Start failing calls addressing `id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail(&self, id: impl Into<String>, status: u16, body: impl Into<String>) {
        self.failures
            .write()
            .unwrap()
            .insert(id.into(), (status, body.into()));
    }

    /// Stop failing calls addressing `id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn recover(&self, id: &str) {
        self.failures.write().unwrap().remove(id);
    }

    /// Number of `retrieve_page` calls.
    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    /// Number of `list_block_children` calls.
    pub fn children_calls(&self) -> usize {
        self.children_calls.load(Ordering::SeqCst)
    }

    /// Number of `query_database` calls.
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Number of calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.page_calls() + self.children_calls() + self.query_calls()
    }

    /// Database queries received so far, with their database id.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn queries(&self) -> Vec<(String, DatabaseQuery)> {
        self.queries.read().unwrap().clone()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_failure(&self, id: &str) -> Result<(), ApiError> {
        match self.failures.read().unwrap().get(id) {
            Some((status, body)) => Err(ApiError::Http {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn matches_filter(row: &RawPage, filter: &Filter) -> bool {
    match (filter, row.property(filter.property())) {
        (
            Filter::SelectEquals { value, .. },
            Some(PropertyValue::Select {
                select: Some(option),
            }),
        )
        | (
            Filter::StatusEquals { value, .. },
            Some(PropertyValue::Status {
                status: Some(option),
            }),
        ) => option.name == *value,
        (
            Filter::MultiSelectContains { value, .. },
            Some(PropertyValue::MultiSelect { multi_select }),
        ) => multi_select.iter().any(|option| option.name == *value),
        (Filter::RichTextEquals { value, .. }, Some(PropertyValue::RichText { rich_text })) => {
            plain_text(rich_text) == *value
        }
        _ => false,
    }
}

#[async_trait]
impl NotionApi for MockNotionApi {
    async fn retrieve_page(&self, page_id: &str) -> Result<RawPage, ApiError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.check_failure(page_id)?;

        self.pages
            .read()
            .unwrap()
            .get(page_id)
            .cloned()
            .ok_or_else(|| ApiError::Http {
                status: 404,
                body: format!(r#"{{"code":"object_not_found","message":"{page_id}"}}"#),
            })
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        _page_size: u32,
    ) -> Result<BlockChildren, ApiError> {
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.check_failure(block_id)?;

        let index = match start_cursor {
            None => 0,
            Some(cursor) => cursor
                .rsplit(':')
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| ApiError::Http {
                    status: 400,
                    body: format!("invalid start_cursor {cursor}"),
                })?,
        };

        let children = self.children.read().unwrap();
        let pages = children.get(block_id);
        let results = pages
            .and_then(|pages| pages.get(index))
            .cloned()
            .unwrap_or_default();
        let has_more = pages.is_some_and(|pages| index + 1 < pages.len());

        Ok(BlockChildren {
            results,
            has_more,
            next_cursor: has_more.then(|| format!("{block_id}:{}", index + 1)),
        })
    }

    async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> Result<Vec<RawPage>, ApiError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.queries
            .write()
            .unwrap()
            .push((database_id.to_owned(), query.clone()));
        self.check_failure(database_id)?;

        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .filter(|row| query.filter.as_ref().is_none_or(|f| matches_filter(row, f)))
            .cloned()
            .collect())
    }
}
