//! Block-to-HTML renderer for Folio content.
//!
//! Three layers, leaves first:
//!
//! - [`render_rich_text`]: styled spans to inline HTML
//! - [`group_blocks`]: flat block sequence to render units, merging list runs
//! - [`render_block`] / [`render_blocks`]: blocks to HTML subtrees
//!
//! Rendering is infallible. Unknown blocks and blocks with missing resources
//! degrade to visible notices.
//!
//! # Example
//!
//! ```
//! use folio_model::{Block, BlockKind, RichText, TextBlock};
//! use folio_renderer::render_blocks;
//!
//! let blocks = vec![Block::new(
//!     "b1",
//!     BlockKind::Paragraph(TextBlock::new(vec![RichText::plain("Hello")])),
//! )];
//! assert_eq!(
//!     render_blocks(&blocks),
//!     r#"<p class="notion-paragraph"><span>Hello</span></p>"#
//! );
//! ```

mod block;
mod escape;
mod group;
mod rich_text;
mod util;

pub use block::{render_block, render_blocks};
pub use escape::escape_html;
pub use group::{EMPTY_MESSAGE, Groupable, ListKind, RenderUnit, group_blocks};
pub use rich_text::{render_rich_text, rich_text_html};
