//! Block tree retrieval.

use folio_model::Block;
use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use tracing::info;

use super::ContentClient;
use crate::error::{ContentError, classify};

/// Children requested per call.
const PAGE_SIZE: u32 = 100;

impl ContentClient {
    /// Full block tree under `block_id`, cached under `blocks:<id>`.
    ///
    /// Children of blocks with `has_children` are resolved concurrently
    /// through this same operation, so every subtree is cached under its
    /// own key. Content trees are expected to be shallow; there is no depth
    /// limit.
    ///
    /// # Errors
    ///
    /// Returns the first classified failure of any request in the tree when
    /// there is no cached copy.
    pub fn get_blocks(
        &self,
        block_id: &str,
    ) -> BoxFuture<'static, Result<Vec<Block>, ContentError>> {
        let client = self.clone();
        let block_id = block_id.to_owned();

        async move {
            let key = format!("blocks:{block_id}");
            let fetcher = client.clone();
            client
                .cache
                .get_or_fetch(&key, move || async move {
                    fetcher.fetch_block_tree(&block_id).await
                })
                .await
        }
        .boxed()
    }

    async fn fetch_block_tree(&self, block_id: &str) -> Result<Vec<Block>, ContentError> {
        let mut blocks = self.fetch_children(block_id).await?;

        let pending: Vec<_> = blocks
            .iter()
            .filter(|block| block.has_children)
            .map(|block| self.get_blocks(&block.id))
            .collect();
        let nested = try_join_all(pending).await?;

        for (block, children) in blocks
            .iter_mut()
            .filter(|block| block.has_children)
            .zip(nested)
        {
            block.children = children;
        }

        Ok(blocks)
    }

    /// Flat child list of one block, following cursors.
    async fn fetch_children(&self, block_id: &str) -> Result<Vec<Block>, ContentError> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;
        let mut requests = 0_usize;

        loop {
            let page = self
                .api
                .list_block_children(block_id, cursor.as_deref(), PAGE_SIZE)
                .await
                .map_err(|err| classify(err, block_id, format!("list children of {block_id}")))?;
            requests += 1;
            blocks.extend(page.results);

            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        info!(block_id, blocks = blocks.len(), requests, "fetched block children");
        Ok(blocks)
    }
}
