//! Rich text rendering.
//!
//! Each span becomes exactly one top-level element: `<a>` when it carries a
//! link, `<span>` otherwise. Inside it, style wrappers are applied from the
//! innermost outwards in a fixed order: code, bold, italic, strikethrough,
//! underline.

use std::fmt::Write;

use folio_model::{RichText, RichTextKind};

use crate::escape::escape_html;
use crate::util::safe_url;

/// Color names with a style class.
const COLORS: &[&str] = &[
    "gray", "brown", "orange", "yellow", "green", "blue", "purple", "pink", "red",
];

/// CSS classes for a color annotation.
///
/// Returns `None` for `"default"` and for unknown color names.
pub(crate) fn color_class(color: &str) -> Option<String> {
    if let Some(name) = color.strip_suffix("_background") {
        COLORS
            .contains(&name)
            .then(|| format!("notion-{name}_background notion-on-background notion-pad"))
    } else {
        COLORS
            .contains(&color)
            .then(|| format!("notion-{color}"))
    }
}

/// Render spans into `out`. Empty input writes nothing.
pub fn render_rich_text(spans: &[RichText], out: &mut String) {
    for span in spans {
        render_span(span, out);
    }
}

/// Render spans to a new string, or `None` when there is nothing to render.
///
/// # Example
///
/// ```
/// use folio_model::RichText;
/// use folio_renderer::rich_text_html;
///
/// assert_eq!(rich_text_html(&[]), None);
/// assert_eq!(
///     rich_text_html(&[RichText::plain("hi")]).as_deref(),
///     Some("<span>hi</span>")
/// );
/// ```
pub fn rich_text_html(spans: &[RichText]) -> Option<String> {
    if spans.is_empty() {
        return None;
    }
    let mut out = String::new();
    render_rich_text(spans, &mut out);
    Some(out)
}

fn render_span(span: &RichText, out: &mut String) {
    let text = escape_html(&span.plain_text);
    let mut html = match span.kind {
        RichTextKind::Equation => format!(r#"<span class="notion-inline-equation">{text}</span>"#),
        RichTextKind::Text | RichTextKind::Mention | RichTextKind::Unknown => text,
    };

    let annotations = &span.annotations;
    if annotations.code {
        html = format!(r#"<code class="notion-inline-code">{html}</code>"#);
    }
    if annotations.bold {
        html = format!("<strong>{html}</strong>");
    }
    if annotations.italic {
        html = format!("<em>{html}</em>");
    }
    if annotations.strikethrough {
        html = format!("<s>{html}</s>");
    }
    if annotations.underline {
        html = format!("<u>{html}</u>");
    }

    let class_attr = color_class(&annotations.color)
        .map(|class| format!(r#" class="{class}""#))
        .unwrap_or_default();

    match span.href.as_deref().and_then(safe_url) {
        Some(href) => write!(
            out,
            r#"<a href="{}"{class_attr} target="_blank" rel="noopener noreferrer">{html}</a>"#,
            escape_html(href)
        )
        .unwrap(),
        None => write!(out, "<span{class_attr}>{html}</span>").unwrap(),
    }
}
