//! Page retrieval.

use std::sync::Arc;

use chrono::Utc;
use folio_model::Page;

use super::ContentClient;
use crate::error::{ContentError, classify};
use crate::types::RawPage;

impl ContentClient {
    /// Raw page object, cached under `page:<id>`.
    ///
    /// # Errors
    ///
    /// Returns the classified remote failure when there is no cached copy.
    pub async fn get_page(&self, page_id: &str) -> Result<RawPage, ContentError> {
        let api = Arc::clone(&self.api);
        let id = page_id.to_owned();

        self.cache
            .get_or_fetch(&format!("page:{page_id}"), move || async move {
                api.retrieve_page(&id)
                    .await
                    .map_err(|err| classify(err, &id, format!("retrieve page {id}")))
            })
            .await
    }

    /// Shaped page, with its block tree unless `fetch_blocks` is false.
    ///
    /// Cached under `formatted-page:<id>:<fetch_blocks>`.
    ///
    /// # Errors
    ///
    /// Returns the classified remote failure when there is no cached copy.
    pub async fn get_formatted_page(
        &self,
        page_id: &str,
        fetch_blocks: bool,
    ) -> Result<Page, ContentError> {
        let client = self.clone();
        let id = page_id.to_owned();

        self.cache
            .get_or_fetch(
                &format!("formatted-page:{page_id}:{fetch_blocks}"),
                move || async move { client.build_page(&id, fetch_blocks).await },
            )
            .await
    }

    async fn build_page(&self, page_id: &str, fetch_blocks: bool) -> Result<Page, ContentError> {
        let raw = self.get_page(page_id).await?;
        let blocks = if fetch_blocks {
            self.get_blocks(page_id).await?
        } else {
            Vec::new()
        };

        Ok(Page {
            blocks,
            ..self.shape(&raw, Utc::now())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use crate::error::ContentError;
    use crate::fixtures::{client, paragraph, row};
    use crate::mock::MockNotionApi;

    #[tokio::test]
    async fn test_get_page_is_cached() {
        let api = Arc::new(MockNotionApi::new().with_page(row("p1", "Hello", "hello", "Public")));
        let client = client(&api);

        let first = client.get_page("p1").await.unwrap();
        let second = client.get_page("p1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(api.page_calls(), 1);
        assert!(client.cache().contains_key("page:p1"));
    }

    #[tokio::test]
    async fn test_get_page_not_found() {
        let api = Arc::new(MockNotionApi::new());
        let client = client(&api);

        let err = client.get_page("missing").await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound { ref id } if id == "missing"));
    }

    #[tokio::test]
    async fn test_get_page_unauthorized() {
        let api = Arc::new(
            MockNotionApi::new()
                .with_page(row("p1", "Hello", "hello", "Public"))
                .with_failure("p1", 401, r#"{"code":"unauthorized"}"#),
        );
        let client = client(&api);

        let err = client.get_page("p1").await.unwrap_err();
        assert!(matches!(err, ContentError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_formatted_page_with_blocks() {
        let api = Arc::new(
            MockNotionApi::new()
                .with_page(row("p1", "Hello", "hello", "Public"))
                .with_children("p1", vec![paragraph("b1", "One"), paragraph("b2", "Two")]),
        );
        let client = client(&api);

        let page = client.get_formatted_page("p1", true).await.unwrap();

        assert_eq!(page.title, "Hello");
        assert_eq!(page.slug, "hello");
        assert_eq!(page.status.as_deref(), Some("Public"));
        let ids: Vec<_> = page.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
        assert!(client.cache().contains_key("formatted-page:p1:true"));
        assert!(client.cache().contains_key("blocks:p1"));
    }

    #[tokio::test]
    async fn test_formatted_page_without_blocks_skips_block_fetch() {
        let api = Arc::new(
            MockNotionApi::new()
                .with_page(row("p1", "Hello", "hello", "Public"))
                .with_children("p1", vec![paragraph("b1", "One")]),
        );
        let client = client(&api);

        let page = client.get_formatted_page("p1", false).await.unwrap();

        assert!(page.blocks.is_empty());
        assert_eq!(api.children_calls(), 0);
        assert!(client.cache().contains_key("formatted-page:p1:false"));
    }

    #[tokio::test]
    async fn test_formatted_page_flags_are_cached_separately() {
        let api = Arc::new(
            MockNotionApi::new()
                .with_page(row("p1", "Hello", "hello", "Public"))
                .with_children("p1", vec![paragraph("b1", "One")]),
        );
        let client = client(&api);

        client.get_formatted_page("p1", false).await.unwrap();
        let full = client.get_formatted_page("p1", true).await.unwrap();
        client.get_formatted_page("p1", true).await.unwrap();

        assert_eq!(full.blocks.len(), 1);
        assert_eq!(api.page_calls(), 1);
        assert_eq!(api.children_calls(), 1);
    }

    #[tokio::test]
    async fn test_formatted_page_rate_limited() {
        let api = Arc::new(
            MockNotionApi::new()
                .with_page(row("p1", "Hello", "hello", "Public"))
                .with_failure("p1", 429, r#"{"code":"rate_limited"}"#),
        );
        let client = client(&api);

        let err = client.get_formatted_page("p1", true).await.unwrap_err();
        assert!(matches!(err, ContentError::RateLimited));
    }
}
