//! Styled text spans.

use serde::Deserialize;

/// Kind of a rich text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RichTextKind {
    /// Plain text (optionally linked).
    #[default]
    Text,
    /// Mention of a page, user or date. Rendered by its plain text.
    Mention,
    /// Inline `KaTeX` expression.
    Equation,
    /// Any span type this crate does not know about.
    #[serde(other)]
    Unknown,
}

/// Style annotations of a span.
///
/// `color` is `"default"`, a named foreground color (e.g. `"red"`), or a
/// background color (e.g. `"red_background"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: "default".to_owned(),
        }
    }
}

/// A single styled text span.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RichText {
    /// Span type.
    #[serde(rename = "type", default)]
    pub kind: RichTextKind,
    /// Text content without styling.
    #[serde(default)]
    pub plain_text: String,
    /// Style annotations.
    #[serde(default)]
    pub annotations: Annotations,
    /// Link target, if the span is a hyperlink.
    #[serde(default)]
    pub href: Option<String>,
}

impl RichText {
    /// Create an unstyled text span.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: RichTextKind::Text,
            plain_text: text.into(),
            annotations: Annotations::default(),
            href: None,
        }
    }

    /// Replace the span's annotations.
    #[must_use]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Turn the span into a hyperlink.
    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Concatenate the plain text of all spans.
pub fn plain_text(spans: &[RichText]) -> String {
    spans.iter().map(|s| s.plain_text.as_str()).collect()
}
