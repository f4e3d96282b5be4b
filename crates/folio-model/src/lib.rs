//! Content model for Folio.
//!
//! - [`RichText`]: styled text spans
//! - [`Block`] / [`BlockKind`]: content blocks as a closed sum type
//! - [`Page`]: page metadata plus its block tree
//!
//! Blocks deserialize directly from Notion API JSON. Unknown or malformed
//! blocks become [`BlockKind::Unsupported`] instead of failing the whole
//! response.

mod block;
mod page;
mod rich_text;

pub use block::{
    Block, BlockKind, CalloutBlock, CodeBlock, EquationBlock, FileBlock, FileUrl, HeadingBlock,
    Icon, LinkBlock, RawBlock, TableBlock, TableRowBlock, TextBlock, ToDoBlock,
};
pub use page::{Author, Page, Tag, Thumbnail, UNTITLED};
pub use rich_text::{Annotations, RichText, RichTextKind, plain_text};
