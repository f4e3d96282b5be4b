//! Remote API seam.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{BlockChildren, DatabaseQuery, RawPage};

/// Operations the content client needs from the Notion API.
///
/// Implemented by [`HttpNotionApi`](crate::HttpNotionApi) and, for tests,
/// by `MockNotionApi`.
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Retrieve a page object by id.
    async fn retrieve_page(&self, page_id: &str) -> Result<RawPage, ApiError>;

    /// List one page of a block's children.
    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        page_size: u32,
    ) -> Result<BlockChildren, ApiError>;

    /// Query a database, following cursors until all rows are returned.
    async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> Result<Vec<RawPage>, ApiError>;
}
