//! Shaping of raw page objects into [`Page`] entities.

use chrono::{DateTime, Utc};
use folio_config::PropertiesConfig;
use folio_model::{Author, Page, RichText, Tag, Thumbnail, UNTITLED, plain_text};

use crate::types::{FileObject, PropertyValue, RawPage, SelectOption};

/// Build a [`Page`] from a raw page object, without blocks.
///
/// `now` is the last-resort publication date when the page has neither a
/// date property nor a creation time.
pub fn shape_page(raw: &RawPage, names: &PropertiesConfig, now: DateTime<Utc>) -> Page {
    let title = raw
        .properties
        .values()
        .find_map(|value| match value {
            PropertyValue::Title { title } => Some(plain_text(title)),
            _ => None,
        })
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_owned());

    let slug = text(raw, &names.slug)
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| raw.id.clone());

    let date = date(raw, &names.date)
        .or(raw.created_time)
        .unwrap_or(now);

    Page {
        id: raw.id.clone(),
        title,
        summary: text(raw, &names.summary).unwrap_or_default(),
        slug,
        tags: tags(raw, &names.tags),
        category: select(raw, &names.category),
        keywords: text(raw, &names.keywords)
            .map(|value| split_keywords(&value))
            .unwrap_or_default(),
        author: author(raw, &names.author),
        thumbnail: thumbnail(raw, &names.thumbnail),
        date,
        updated_at: raw.last_edited_time.unwrap_or(date),
        status: select(raw, &names.status),
        blocks: Vec::new(),
    }
}

/// Split a comma-separated keyword list, dropping empty pieces.
pub(crate) fn split_keywords(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_owned)
        .collect()
}

fn rich_text<'a>(raw: &'a RawPage, name: &str) -> Option<&'a [RichText]> {
    match raw.property(name)? {
        PropertyValue::RichText { rich_text } => Some(rich_text.as_slice()),
        _ => None,
    }
}

fn text(raw: &RawPage, name: &str) -> Option<String> {
    rich_text(raw, name).map(plain_text)
}

/// Name of a select or status option.
fn select(raw: &RawPage, name: &str) -> Option<String> {
    let option: &SelectOption = match raw.property(name)? {
        PropertyValue::Select { select } => select.as_ref()?,
        PropertyValue::Status { status } => status.as_ref()?,
        _ => return None,
    };
    Some(option.name.clone())
}

fn tags(raw: &RawPage, name: &str) -> Vec<Tag> {
    match raw.property(name) {
        Some(PropertyValue::MultiSelect { multi_select }) => multi_select
            .iter()
            .map(|option| Tag {
                name: option.name.clone(),
                color: option.color.clone(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn author(raw: &RawPage, name: &str) -> Option<Author> {
    let PropertyValue::People { people } = raw.property(name)? else {
        return None;
    };
    people.first().map(|person| Author {
        name: person.name.clone(),
        avatar_url: person.avatar_url.clone(),
    })
}

/// First file of the files property, else the page cover.
fn thumbnail(raw: &RawPage, name: &str) -> Option<Thumbnail> {
    let to_thumbnail = |file: &FileObject| {
        file.url().map(|url| Thumbnail {
            kind: file.kind.clone(),
            url: url.to_owned(),
        })
    };
    let from_property = match raw.property(name) {
        Some(PropertyValue::Files { files }) => files.first().and_then(to_thumbnail),
        _ => None,
    };

    from_property.or_else(|| raw.cover.as_ref().and_then(to_thumbnail))
}

fn date(raw: &RawPage, name: &str) -> Option<DateTime<Utc>> {
    match raw.property(name)? {
        PropertyValue::Date { date } => date.as_ref()?.start_utc(),
        _ => None,
    }
}
