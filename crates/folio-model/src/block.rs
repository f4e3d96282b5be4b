//! Content blocks.
//!
//! A [`Block`] is one unit of page content. Its shape is a closed sum type,
//! [`BlockKind`], with one variant per supported block type. Raw API JSON is
//! converted through [`RawBlock`]: the payload is stored under a key equal to
//! the block's `type`, e.g.
//!
//! ```json
//! {"id": "b1", "type": "paragraph", "has_children": false,
//!  "paragraph": {"rich_text": [], "color": "default"}}
//! ```
//!
//! Unknown types and payloads that fail to deserialize become
//! [`BlockKind::Unsupported`], which carries no payload.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::rich_text::RichText;

fn default_color() -> String {
    "default".to_owned()
}

/// Payload shared by paragraphs, list items, quotes and toggles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default = "default_color")]
    pub color: String,
}

impl TextBlock {
    /// Text payload with default color.
    #[must_use]
    pub fn new(rich_text: Vec<RichText>) -> Self {
        Self {
            rich_text,
            color: default_color(),
        }
    }
}

/// Heading payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeadingBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default = "default_color")]
    pub color: String,
    /// Toggleable headings hide their children behind a disclosure.
    #[serde(default)]
    pub is_toggleable: bool,
}

/// To-do payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToDoBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default = "default_color")]
    pub color: String,
}

/// Code payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

/// URL holder used by file objects and icons.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileUrl {
    #[serde(default)]
    pub url: Option<String>,
}

impl FileUrl {
    fn non_empty(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Hosted (`file`) or linked (`external`) media payload, used by images and videos.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileBlock {
    /// `"external"` or `"file"`.
    #[serde(rename = "type", default)]
    pub source: Option<String>,
    #[serde(default)]
    pub external: Option<FileUrl>,
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

impl FileBlock {
    /// Resolve the media URL.
    ///
    /// The `type` sub-discriminant selects `external.url` or `file.url`; if
    /// the selected one is missing or empty the other is used.
    pub fn url(&self) -> Option<&str> {
        let external = self.external.as_ref().and_then(FileUrl::non_empty);
        let file = self.file.as_ref().and_then(FileUrl::non_empty);
        let (first, second) = match self.source.as_deref() {
            Some("file") => (file, external),
            _ => (external, file),
        };
        first.or(second)
    }
}

/// Payload of bookmarks, embeds and link previews.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkBlock {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

/// Callout icon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    External { external: FileUrl },
    File { file: FileUrl },
    #[serde(other)]
    Other,
}

/// Callout payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalloutBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default = "default_color")]
    pub color: String,
}

/// Table geometry. Rows are the table's children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub table_width: Option<u32>,
    #[serde(default)]
    pub has_column_header: bool,
    #[serde(default)]
    pub has_row_header: bool,
}

/// Table row payload: one rich text sequence per cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableRowBlock {
    #[serde(default)]
    pub cells: Vec<Vec<RichText>>,
}

/// Block-level `KaTeX` expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EquationBlock {
    #[serde(default)]
    pub expression: Option<String>,
}

/// Variant-specific block shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph(TextBlock),
    Heading1(HeadingBlock),
    Heading2(HeadingBlock),
    Heading3(HeadingBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    ToDo(ToDoBlock),
    Toggle(TextBlock),
    Code(CodeBlock),
    Quote(TextBlock),
    Image(FileBlock),
    Bookmark(LinkBlock),
    Callout(CalloutBlock),
    Table(TableBlock),
    TableRow(TableRowBlock),
    ColumnList,
    Column,
    Embed(LinkBlock),
    Video(FileBlock),
    Equation(EquationBlock),
    LinkPreview(LinkBlock),
    Divider,
    /// Unknown or malformed block. Only the original type name is kept.
    Unsupported { block_type: String },
}

impl BlockKind {
    /// Parse the payload of a block with the given API type.
    fn parse(block_type: &str, payload: Value) -> Result<Self, serde_json::Error> {
        let kind = match block_type {
            "paragraph" => Self::Paragraph(serde_json::from_value(payload)?),
            "heading_1" => Self::Heading1(serde_json::from_value(payload)?),
            "heading_2" => Self::Heading2(serde_json::from_value(payload)?),
            "heading_3" => Self::Heading3(serde_json::from_value(payload)?),
            "bulleted_list_item" => Self::BulletedListItem(serde_json::from_value(payload)?),
            "numbered_list_item" => Self::NumberedListItem(serde_json::from_value(payload)?),
            "to_do" => Self::ToDo(serde_json::from_value(payload)?),
            "toggle" => Self::Toggle(serde_json::from_value(payload)?),
            "code" => Self::Code(serde_json::from_value(payload)?),
            "quote" => Self::Quote(serde_json::from_value(payload)?),
            "image" => Self::Image(serde_json::from_value(payload)?),
            "bookmark" => Self::Bookmark(serde_json::from_value(payload)?),
            "callout" => Self::Callout(serde_json::from_value(payload)?),
            "table" => Self::Table(serde_json::from_value(payload)?),
            "table_row" => Self::TableRow(serde_json::from_value(payload)?),
            "column_list" => Self::ColumnList,
            "column" => Self::Column,
            "embed" => Self::Embed(serde_json::from_value(payload)?),
            "video" => Self::Video(serde_json::from_value(payload)?),
            "equation" => Self::Equation(serde_json::from_value(payload)?),
            "link_preview" => Self::LinkPreview(serde_json::from_value(payload)?),
            "divider" => Self::Divider,
            other => Self::Unsupported {
                block_type: other.to_owned(),
            },
        };
        Ok(kind)
    }

    /// API type name of this variant.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Paragraph(_) => "paragraph",
            Self::Heading1(_) => "heading_1",
            Self::Heading2(_) => "heading_2",
            Self::Heading3(_) => "heading_3",
            Self::BulletedListItem(_) => "bulleted_list_item",
            Self::NumberedListItem(_) => "numbered_list_item",
            Self::ToDo(_) => "to_do",
            Self::Toggle(_) => "toggle",
            Self::Code(_) => "code",
            Self::Quote(_) => "quote",
            Self::Image(_) => "image",
            Self::Bookmark(_) => "bookmark",
            Self::Callout(_) => "callout",
            Self::Table(_) => "table",
            Self::TableRow(_) => "table_row",
            Self::ColumnList => "column_list",
            Self::Column => "column",
            Self::Embed(_) => "embed",
            Self::Video(_) => "video",
            Self::Equation(_) => "equation",
            Self::LinkPreview(_) => "link_preview",
            Self::Divider => "divider",
            Self::Unsupported { block_type } => block_type,
        }
    }
}

/// Block as delivered by the API, before its payload is interpreted.
#[derive(Debug, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    has_children: bool,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

/// One content block with its resolved children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawBlock")]
pub struct Block {
    /// Opaque stable identifier.
    pub id: String,
    /// Whether the API reported nested content for this block.
    pub has_children: bool,
    /// Resolved children. Only populated when `has_children` is set.
    pub children: Vec<Block>,
    /// Variant and payload.
    pub kind: BlockKind,
}

impl Block {
    /// Create a childless block.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            has_children: false,
            children: Vec::new(),
            kind,
        }
    }

    /// Attach children, marking the block as having children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = true;
        self.children = children;
        self
    }

    /// API type name (the discriminant).
    pub fn block_type(&self) -> &str {
        self.kind.type_name()
    }
}

impl From<RawBlock> for Block {
    fn from(mut raw: RawBlock) -> Self {
        let payload = raw.payload.remove(&raw.block_type).unwrap_or(Value::Null);
        let kind = BlockKind::parse(&raw.block_type, payload).unwrap_or_else(|err| {
            tracing::warn!(
                block_id = %raw.id,
                block_type = %raw.block_type,
                "malformed block payload: {err}"
            );
            BlockKind::Unsupported {
                block_type: raw.block_type.clone(),
            }
        });

        Self {
            id: raw.id,
            has_children: raw.has_children,
            children: Vec::new(),
            kind,
        }
    }
}
