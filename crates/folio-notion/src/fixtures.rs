//! Test data builders.

use std::sync::Arc;

use folio_cache::{CacheConfig, ContentCache};
use folio_model::{Block, BlockKind, RichText, TextBlock};
use serde_json::json;

use crate::client::ContentClient;
use crate::mock::MockNotionApi;
use crate::types::RawPage;

pub(crate) const DATABASE_ID: &str = "db-1";

/// Database row with the default property names.
pub(crate) fn row(id: &str, title: &str, slug: &str, status: &str) -> RawPage {
    row_with(id, title, slug, status, &[], None)
}

pub(crate) fn row_with(
    id: &str,
    title: &str,
    slug: &str,
    status: &str,
    tags: &[&str],
    category: Option<&str>,
) -> RawPage {
    let tags: Vec<_> = tags
        .iter()
        .map(|name| json!({"name": name, "color": "default"}))
        .collect();
    let category = category.map(|name| json!({"name": name, "color": "default"}));

    serde_json::from_value(json!({
        "id": id,
        "created_time": "2024-01-01T00:00:00.000Z",
        "last_edited_time": "2024-01-02T00:00:00.000Z",
        "properties": {
            "Name": {"type": "title", "title": [{"type": "text", "plain_text": title}]},
            "Slug": {"type": "rich_text", "rich_text": [{"type": "text", "plain_text": slug}]},
            "Summary": {"type": "rich_text", "rich_text": [
                {"type": "text", "plain_text": format!("About {title}")}
            ]},
            "Status": {"type": "select", "select": {"name": status, "color": "green"}},
            "Tags": {"type": "multi_select", "multi_select": tags},
            "Category": {"type": "select", "select": category}
        }
    }))
    .unwrap()
}

pub(crate) fn paragraph(id: &str, text: &str) -> Block {
    Block::new(
        id,
        BlockKind::Paragraph(TextBlock::new(vec![RichText::plain(text)])),
    )
}

pub(crate) fn bulleted(id: &str, text: &str) -> Block {
    Block::new(
        id,
        BlockKind::BulletedListItem(TextBlock::new(vec![RichText::plain(text)])),
    )
}

/// Block that reports children without carrying them.
pub(crate) fn parent(block: Block) -> Block {
    Block {
        has_children: true,
        ..block
    }
}

pub(crate) fn client(api: &Arc<MockNotionApi>) -> ContentClient {
    client_with_cache(api, CacheConfig::default())
}

pub(crate) fn client_with_cache(api: &Arc<MockNotionApi>, config: CacheConfig) -> ContentClient {
    ContentClient::new(Arc::<MockNotionApi>::clone(api), ContentCache::new(config))
        .with_database_id(DATABASE_ID)
}
