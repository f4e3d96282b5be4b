//! Shaped page entity.

use chrono::{DateTime, Utc};

use crate::block::Block;

/// Title used when a page has no title text.
pub const UNTITLED: &str = "untitled";

/// A tag with its display color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub color: String,
}

/// Page author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Page thumbnail image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// `"file"` for hosted images, `"external"` for linked ones.
    pub kind: String,
    pub url: String,
}

/// A page with metadata and (optionally) its content blocks.
///
/// Pages are built fresh from API data and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub summary: String,
    /// URL slug. Falls back to `id`.
    pub slug: String,
    pub tags: Vec<Tag>,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub author: Option<Author>,
    pub thumbnail: Option<Thumbnail>,
    pub date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: Option<String>,
    pub blocks: Vec<Block>,
}
