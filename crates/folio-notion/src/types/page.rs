//! Page objects as returned by the pages and database query endpoints.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use folio_model::{FileUrl, RichText};
use serde::Deserialize;

/// Page object before shaping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPage {
    /// Page ID.
    pub id: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    /// Last edit timestamp.
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    /// Page-level cover image.
    #[serde(default)]
    pub cover: Option<FileObject>,
    /// Database properties keyed by property name.
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl RawPage {
    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// Typed property value. Types this crate does not read become `Other`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    Status {
        #[serde(default)]
        status: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    People {
        #[serde(default)]
        people: Vec<Person>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileObject>,
    },
    #[serde(other)]
    Other,
}

/// Option of a select, status or multi-select property.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "default".to_owned()
}

/// Value of a date property.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DateValue {
    /// ISO 8601 date or date-time.
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

impl DateValue {
    /// Parsed start. Date-only values are midnight UTC.
    pub fn start_utc(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.start)
    }
}

/// Parse an RFC 3339 date-time or a `YYYY-MM-DD` date.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// User in a people property.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Hosted or linked file, as used by covers and files properties.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileObject {
    /// `"file"` or `"external"`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub external: Option<FileUrl>,
    #[serde(default)]
    pub file: Option<FileUrl>,
}

impl FileObject {
    /// URL of the file, if any.
    pub fn url(&self) -> Option<&str> {
        let (primary, secondary) = if self.kind == "external" {
            (&self.external, &self.file)
        } else {
            (&self.file, &self.external)
        };
        primary
            .iter()
            .chain(secondary)
            .filter_map(|f| f.url.as_deref())
            .find(|url| !url.is_empty())
    }
}
