//! Block rendering.
//!
//! Every [`BlockKind`] maps to a fixed HTML shape. Blocks with a missing
//! required resource render an inline error notice and unknown blocks render
//! an "unsupported" notice, so one bad block never breaks a page.

use std::fmt::Write;

use folio_model::{
    Block, BlockKind, CalloutBlock, CodeBlock, FileBlock, HeadingBlock, Icon, LinkBlock, RichText,
    TableBlock, TableRowBlock, TextBlock, ToDoBlock, plain_text,
};

use crate::escape::escape_html;
use crate::group::{EMPTY_MESSAGE, ListKind, RenderUnit, group_blocks};
use crate::rich_text::{color_class, render_rich_text};
use crate::util::{anchor_id, language_class, safe_url, youtube_embed_url};

/// Render a page's top-level blocks.
///
/// List runs are grouped into `<ul>`/`<ol>` containers. An empty sequence
/// renders an empty-state paragraph.
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::with_capacity(4096);
    for unit in group_blocks(blocks) {
        render_unit(&unit, &mut out);
    }
    out
}

/// Render a single block and its children.
pub fn render_block(block: &Block) -> String {
    let mut out = String::new();
    write_block(block, &mut out);
    out
}

fn render_unit(unit: &RenderUnit<'_, Block>, out: &mut String) {
    match unit {
        RenderUnit::Single(block) => write_block(block, out),
        RenderUnit::List { kind, items } => {
            let (open, close) = match kind {
                ListKind::Bulleted => (r#"<ul class="notion-bulleted-list">"#, "</ul>"),
                ListKind::Numbered => (r#"<ol class="notion-numbered-list">"#, "</ol>"),
            };
            out.push_str(open);
            for item in items {
                write_block(item, out);
            }
            out.push_str(close);
        }
        RenderUnit::Empty => {
            write!(out, r#"<p class="notion-empty">{EMPTY_MESSAGE}</p>"#).unwrap();
        }
    }
}

/// Render nested children. Nothing is written when there are none.
fn write_children(children: &[Block], out: &mut String) {
    if children.is_empty() {
        return;
    }
    for unit in group_blocks(children) {
        render_unit(&unit, out);
    }
}

#[allow(clippy::too_many_lines)]
fn write_block(block: &Block, out: &mut String) {
    match &block.kind {
        BlockKind::Paragraph(text) => {
            write_text_element("p", "notion-paragraph", text, out);
        }
        BlockKind::Heading1(heading) => write_heading(block, 1, heading, out),
        BlockKind::Heading2(heading) => write_heading(block, 2, heading, out),
        BlockKind::Heading3(heading) => write_heading(block, 3, heading, out),
        BlockKind::BulletedListItem(text) | BlockKind::NumberedListItem(text) => {
            write!(out, "<li{}>", class_attr("notion-list-item", &text.color)).unwrap();
            render_rich_text(&text.rich_text, out);
            write_children(&block.children, out);
            out.push_str("</li>");
        }
        BlockKind::ToDo(todo) => write_to_do(todo, out),
        BlockKind::Toggle(text) => {
            write!(out, "<details{}>", class_attr("notion-toggle", &text.color)).unwrap();
            out.push_str("<summary>");
            render_rich_text(&text.rich_text, out);
            out.push_str("</summary>");
            write_children(&block.children, out);
            out.push_str("</details>");
        }
        BlockKind::Code(code) => write_code(code, out),
        BlockKind::Quote(text) => {
            write_text_element("blockquote", "notion-quote", text, out);
        }
        BlockKind::Image(image) => write_image(image, out),
        BlockKind::Bookmark(link) => write_bookmark(link, out),
        BlockKind::Callout(callout) => write_callout(callout, out),
        BlockKind::Table(table) => write_table(table, &block.children, out),
        BlockKind::TableRow(row) => write_table_row(row, 0, None, out),
        BlockKind::ColumnList => {
            out.push_str(r#"<div class="notion-column-list">"#);
            write_children(&block.children, out);
            out.push_str("</div>");
        }
        BlockKind::Column => {
            out.push_str(r#"<div class="notion-column">"#);
            write_children(&block.children, out);
            out.push_str("</div>");
        }
        BlockKind::Embed(link) => match link.url.as_deref().and_then(safe_url) {
            Some(url) => write!(
                out,
                r#"<div class="notion-embed"><iframe src="{}" title="Embedded content" loading="lazy" allowfullscreen></iframe></div>"#,
                escape_html(url)
            )
            .unwrap(),
            None => write_error("Embed unavailable: missing URL", out),
        },
        BlockKind::Video(video) => write_video(video, out),
        BlockKind::Equation(equation) => {
            match equation.expression.as_deref().filter(|e| !e.is_empty()) {
                Some(expression) => write!(
                    out,
                    r#"<div class="notion-equation">{}</div>"#,
                    escape_html(expression)
                )
                .unwrap(),
                None => write_error("Equation unavailable: missing expression", out),
            }
        }
        BlockKind::LinkPreview(link) => match link.url.as_deref().and_then(safe_url) {
            Some(url) => {
                let url = escape_html(url);
                write!(
                    out,
                    r#"<a class="notion-link-preview" href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#
                )
                .unwrap();
            }
            None => write_error("Link preview unavailable: missing URL", out),
        },
        BlockKind::Divider => out.push_str(r#"<hr class="notion-divider">"#),
        BlockKind::Unsupported { block_type } => write!(
            out,
            r#"<div class="notion-unsupported">Unsupported block type: {}</div>"#,
            escape_html(block_type)
        )
        .unwrap(),
    }
}

/// `class="base"` plus the color classes, if any.
fn class_attr(base: &str, color: &str) -> String {
    match color_class(color) {
        Some(color) => format!(r#" class="{base} {color}""#),
        None => format!(r#" class="{base}""#),
    }
}

fn write_error(message: &str, out: &mut String) {
    write!(
        out,
        r#"<div class="notion-error" role="alert">{}</div>"#,
        escape_html(message)
    )
    .unwrap();
}

fn write_text_element(tag: &str, class: &str, text: &TextBlock, out: &mut String) {
    write!(out, "<{tag}{}>", class_attr(class, &text.color)).unwrap();
    render_rich_text(&text.rich_text, out);
    write!(out, "</{tag}>").unwrap();
}

fn write_caption(caption: &[RichText], out: &mut String) {
    if caption.is_empty() {
        return;
    }
    out.push_str("<figcaption>");
    render_rich_text(caption, out);
    out.push_str("</figcaption>");
}

fn write_heading(block: &Block, level: u8, heading: &HeadingBlock, out: &mut String) {
    let toggle = heading.is_toggleable && !block.children.is_empty();
    if toggle {
        out.push_str(r#"<details class="notion-toggle"><summary>"#);
    }

    write!(
        out,
        r#"<h{level} id="{}"{}>"#,
        escape_html(&anchor_id(&block.id)),
        class_attr(&format!("notion-h{level}"), &heading.color)
    )
    .unwrap();
    render_rich_text(&heading.rich_text, out);
    write!(out, "</h{level}>").unwrap();

    if toggle {
        out.push_str("</summary>");
        write_children(&block.children, out);
        out.push_str("</details>");
    }
}

fn write_to_do(todo: &ToDoBlock, out: &mut String) {
    let (checked_attr, text_class) = if todo.checked {
        (" checked", "notion-to-do-text notion-to-do-checked")
    } else {
        ("", "notion-to-do-text")
    };
    write!(
        out,
        r#"<div{}><input type="checkbox" disabled{checked_attr}> <span class="{text_class}">"#,
        class_attr("notion-to-do", &todo.color)
    )
    .unwrap();
    render_rich_text(&todo.rich_text, out);
    out.push_str("</span></div>");
}

fn write_code(code: &CodeBlock, out: &mut String) {
    let source = escape_html(&plain_text(&code.rich_text));
    out.push_str(r#"<figure class="notion-code">"#);
    match language_class(code.language.as_deref()) {
        Some(lang) => write!(
            out,
            r#"<pre><code class="language-{}">{source}</code></pre>"#,
            escape_html(&lang)
        )
        .unwrap(),
        None => write!(out, "<pre><code>{source}</code></pre>").unwrap(),
    }
    write_caption(&code.caption, out);
    out.push_str("</figure>");
}

fn write_image(image: &FileBlock, out: &mut String) {
    let Some(url) = image.url().and_then(safe_url) else {
        write_error("Image unavailable: missing URL", out);
        return;
    };
    write!(
        out,
        r#"<figure class="notion-image"><img src="{}" alt="{}" loading="lazy">"#,
        escape_html(url),
        escape_html(&plain_text(&image.caption))
    )
    .unwrap();
    write_caption(&image.caption, out);
    out.push_str("</figure>");
}

fn write_bookmark(link: &LinkBlock, out: &mut String) {
    let Some(url) = link.url.as_deref().and_then(safe_url) else {
        write_error("Bookmark unavailable: missing URL", out);
        return;
    };
    let url = escape_html(url);
    write!(
        out,
        r#"<figure class="notion-bookmark"><a href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#
    )
    .unwrap();
    write_caption(&link.caption, out);
    out.push_str("</figure>");
}

fn write_callout(callout: &CalloutBlock, out: &mut String) {
    write!(out, "<div{}>", class_attr("notion-callout", &callout.color)).unwrap();
    match &callout.icon {
        Some(Icon::Emoji { emoji }) => write!(
            out,
            r#"<span class="notion-callout-icon">{}</span>"#,
            escape_html(emoji)
        )
        .unwrap(),
        Some(Icon::External { external: file } | Icon::File { file }) => {
            if let Some(url) = file.url.as_deref().and_then(safe_url) {
                write!(
                    out,
                    r#"<img class="notion-callout-icon" src="{}" alt="">"#,
                    escape_html(url)
                )
                .unwrap();
            }
        }
        Some(Icon::Other) | None => {}
    }
    out.push_str(r#"<div class="notion-callout-text">"#);
    render_rich_text(&callout.rich_text, out);
    out.push_str("</div></div>");
}

fn write_table(table: &TableBlock, rows: &[Block], out: &mut String) {
    if table.table_width.is_none() {
        write_error("Table unavailable: missing table width", out);
        return;
    }
    out.push_str(r#"<div class="notion-table-wrapper"><table class="notion-table"><tbody>"#);
    let mut index = 0;
    for row in rows {
        if let BlockKind::TableRow(cells) = &row.kind {
            write_table_row(cells, index, Some(table), out);
            index += 1;
        }
    }
    out.push_str("</tbody></table></div>");
}

/// Render one row. `table` is `None` for a row rendered outside its table.
fn write_table_row(
    row: &TableRowBlock,
    index: usize,
    table: Option<&TableBlock>,
    out: &mut String,
) {
    let width = table
        .and_then(|t| t.table_width)
        .map_or(row.cells.len(), |w| w as usize);
    let column_header = table.is_some_and(|t| t.has_column_header) && index == 0;
    let row_header = table.is_some_and(|t| t.has_row_header);

    out.push_str("<tr>");
    for column in 0..width {
        let tag = if column_header || (row_header && column == 0) {
            "th"
        } else {
            "td"
        };
        write!(out, "<{tag}>").unwrap();
        if let Some(cell) = row.cells.get(column) {
            render_rich_text(cell, out);
        }
        write!(out, "</{tag}>").unwrap();
    }
    out.push_str("</tr>");
}

fn write_video(video: &FileBlock, out: &mut String) {
    let Some(url) = video.url().and_then(safe_url) else {
        write_error("Video unavailable: missing URL", out);
        return;
    };
    out.push_str(r#"<figure class="notion-video">"#);
    match youtube_embed_url(url) {
        Some(embed) => write!(
            out,
            r#"<iframe src="{}" title="Video" loading="lazy" allow="accelerometer; encrypted-media; picture-in-picture" allowfullscreen></iframe>"#,
            escape_html(&embed)
        )
        .unwrap(),
        None => write!(
            out,
            r#"<video src="{}" controls preload="metadata"></video>"#,
            escape_html(url)
        )
        .unwrap(),
    }
    write_caption(&video.caption, out);
    out.push_str("</figure>");
}
