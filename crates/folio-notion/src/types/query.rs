//! Database queries and paginated list responses.

use folio_model::Block;
use serde::Deserialize;
use serde_json::{Value, json};

use super::RawPage;

/// One page of a block's children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BlockChildren {
    #[serde(default)]
    pub results: Vec<Block>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// One page of database query results.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<RawPage>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Property filter of a database query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Select property equals the value.
    SelectEquals { property: String, value: String },
    /// Status property equals the value.
    StatusEquals { property: String, value: String },
    /// Multi-select property contains the value.
    MultiSelectContains { property: String, value: String },
    /// Rich text property equals the value.
    RichTextEquals { property: String, value: String },
}

impl Filter {
    /// Property the filter applies to.
    pub fn property(&self) -> &str {
        match self {
            Self::SelectEquals { property, .. }
            | Self::StatusEquals { property, .. }
            | Self::MultiSelectContains { property, .. }
            | Self::RichTextEquals { property, .. } => property,
        }
    }

    /// Request body fragment.
    pub fn to_json(&self) -> Value {
        match self {
            Self::SelectEquals { property, value } => {
                json!({ "property": property, "select": { "equals": value } })
            }
            Self::StatusEquals { property, value } => {
                json!({ "property": property, "status": { "equals": value } })
            }
            Self::MultiSelectContains { property, value } => {
                json!({ "property": property, "multi_select": { "contains": value } })
            }
            Self::RichTextEquals { property, value } => {
                json!({ "property": property, "rich_text": { "equals": value } })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sort on a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

impl Sort {
    /// Sort on `property`, newest first.
    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Request body fragment.
    pub fn to_json(&self) -> Value {
        let direction = match self.direction {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        };
        json!({ "property": self.property, "direction": direction })
    }
}

/// Filter and sorts of a database query. Pagination is handled by the API
/// implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseQuery {
    pub filter: Option<Filter>,
    pub sorts: Vec<Sort>,
}

impl DatabaseQuery {
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    /// Request body for one page of results.
    pub fn to_body(&self, start_cursor: Option<&str>, page_size: u32) -> Value {
        let mut body = json!({ "page_size": page_size });
        if let Some(filter) = &self.filter {
            body["filter"] = filter.to_json();
        }
        if !self.sorts.is_empty() {
            body["sorts"] = self.sorts.iter().map(Sort::to_json).collect();
        }
        if let Some(cursor) = start_cursor {
            body["start_cursor"] = Value::from(cursor);
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_body() {
        let query = DatabaseQuery::default()
            .with_filter(Filter::SelectEquals {
                property: "Status".to_owned(),
                value: "Public".to_owned(),
            })
            .with_sort(Sort::descending("Date"));

        assert_eq!(
            query.to_body(Some("cursor-2"), 100),
            json!({
                "page_size": 100,
                "filter": {"property": "Status", "select": {"equals": "Public"}},
                "sorts": [{"property": "Date", "direction": "descending"}],
                "start_cursor": "cursor-2"
            })
        );
    }

    #[test]
    fn test_unfiltered_query_body() {
        assert_eq!(
            DatabaseQuery::default().to_body(None, 100),
            json!({ "page_size": 100 })
        );
    }

    #[test]
    fn test_filter_bodies() {
        let tag = Filter::MultiSelectContains {
            property: "Tags".to_owned(),
            value: "rust".to_owned(),
        };
        assert_eq!(
            tag.to_json(),
            json!({"property": "Tags", "multi_select": {"contains": "rust"}})
        );
        assert_eq!(tag.property(), "Tags");

        let status = Filter::StatusEquals {
            property: "State".to_owned(),
            value: "Done".to_owned(),
        };
        assert_eq!(
            status.to_json(),
            json!({"property": "State", "status": {"equals": "Done"}})
        );
        assert_eq!(status.property(), "State");

        let slug = Filter::RichTextEquals {
            property: "Slug".to_owned(),
            value: "hello-world".to_owned(),
        };
        assert_eq!(
            slug.to_json(),
            json!({"property": "Slug", "rich_text": {"equals": "hello-world"}})
        );
    }

    #[test]
    fn test_block_children_parse() {
        let page: BlockChildren = serde_json::from_value(json!({
            "object": "list",
            "results": [
                {"id": "b1", "type": "divider", "has_children": false, "divider": {}},
                {"id": "b2", "type": "toggle", "has_children": true,
                 "toggle": {"rich_text": []}}
            ],
            "has_more": true,
            "next_cursor": "b3"
        }))
        .unwrap();

        assert_eq!(page.results.len(), 2);
        assert!(page.results[1].has_children);
        assert_eq!(page.next_cursor.as_deref(), Some("b3"));
    }
}
