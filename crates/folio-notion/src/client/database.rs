//! Database listings, lookups and search.

use std::collections::BTreeSet;

use chrono::Utc;
use folio_config::StatusType;
use folio_model::Page;
use tracing::info;

use super::ContentClient;
use crate::error::{ContentError, classify};
use crate::types::{DatabaseQuery, Filter, RawPage, Sort};

/// Status value of published pages.
pub const DEFAULT_STATUS: &str = "Public";

impl ContentClient {
    /// Shaped database rows, newest first, without blocks.
    ///
    /// With `filter_by_status`, only rows whose status equals `status` are
    /// returned. Cached under `formatted-database:<filter_by_status>:<status>`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Configuration`] before any cache or remote
    /// work if no database id is set, otherwise the classified remote
    /// failure when there is no cached copy.
    pub async fn get_formatted_database(
        &self,
        filter_by_status: bool,
        status: &str,
    ) -> Result<Vec<Page>, ContentError> {
        let mut query = self.listing_query();
        if filter_by_status {
            query = query.with_filter(self.status_filter(status));
        }

        self.cached_query(
            format!("formatted-database:{filter_by_status}:{status}"),
            query,
        )
        .await
    }

    /// Page whose slug equals `slug`, with its block tree.
    ///
    /// Returns `Ok(None)` when no row matches. Cached under
    /// `page-by-slug:<slug>`.
    ///
    /// # Errors
    ///
    /// Same as [`ContentClient::get_formatted_database`].
    pub async fn get_page_by_slug(&self, slug: &str) -> Result<Option<Page>, ContentError> {
        let database_id = self.require_database_id()?;
        let query = DatabaseQuery::default().with_filter(Filter::RichTextEquals {
            property: self.properties.slug.clone(),
            value: slug.to_owned(),
        });
        let client = self.clone();

        self.cache
            .get_or_fetch(&format!("page-by-slug:{slug}"), move || async move {
                client.find_page(&database_id, &query).await
            })
            .await
    }

    /// Pages tagged with `tag`, newest first. Cached under `pages-by-tag:<tag>`.
    ///
    /// # Errors
    ///
    /// Same as [`ContentClient::get_formatted_database`].
    pub async fn get_pages_by_tag(&self, tag: &str) -> Result<Vec<Page>, ContentError> {
        let query = self.listing_query().with_filter(Filter::MultiSelectContains {
            property: self.properties.tags.clone(),
            value: tag.to_owned(),
        });
        self.cached_query(format!("pages-by-tag:{tag}"), query).await
    }

    /// Pages in `category`, newest first. Cached under
    /// `pages-by-category:<category>`.
    ///
    /// # Errors
    ///
    /// Same as [`ContentClient::get_formatted_database`].
    pub async fn get_pages_by_category(&self, category: &str) -> Result<Vec<Page>, ContentError> {
        let query = self.listing_query().with_filter(Filter::SelectEquals {
            property: self.properties.category.clone(),
            value: category.to_owned(),
        });
        self.cached_query(format!("pages-by-category:{category}"), query)
            .await
    }

    /// Sorted, deduplicated tag names of all published pages.
    ///
    /// # Errors
    ///
    /// Same as [`ContentClient::get_formatted_database`].
    pub async fn get_all_tags(&self) -> Result<Vec<String>, ContentError> {
        let pages = self.get_formatted_database(true, DEFAULT_STATUS).await?;
        let tags: BTreeSet<String> = pages
            .into_iter()
            .flat_map(|page| page.tags)
            .map(|tag| tag.name)
            .collect();
        Ok(tags.into_iter().collect())
    }

    /// Sorted, deduplicated category names of all published pages.
    ///
    /// # Errors
    ///
    /// Same as [`ContentClient::get_formatted_database`].
    pub async fn get_all_categories(&self) -> Result<Vec<String>, ContentError> {
        let pages = self.get_formatted_database(true, DEFAULT_STATUS).await?;
        let categories: BTreeSet<String> =
            pages.into_iter().filter_map(|page| page.category).collect();
        Ok(categories.into_iter().collect())
    }

    /// Pages whose title, summary, a tag or the category contains `query`,
    /// ignoring case. Newest first.
    ///
    /// Never cached. A blank query returns no pages without a remote call.
    ///
    /// # Errors
    ///
    /// Same as [`ContentClient::get_formatted_database`], except that there
    /// is never a cached copy to fall back to.
    pub async fn search_pages(&self, query: &str) -> Result<Vec<Page>, ContentError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let database_id = self.require_database_id()?;
        let pages = self.query_pages(&database_id, &self.listing_query()).await?;
        let found: Vec<Page> = pages
            .into_iter()
            .filter(|page| page_matches(page, &needle))
            .collect();

        info!(query = %needle, results = found.len(), "searched pages");
        Ok(found)
    }

    /// Query sorted by date, newest first.
    fn listing_query(&self) -> DatabaseQuery {
        DatabaseQuery::default().with_sort(Sort::descending(self.properties.date.as_str()))
    }

    async fn cached_query(
        &self,
        key: String,
        query: DatabaseQuery,
    ) -> Result<Vec<Page>, ContentError> {
        let database_id = self.require_database_id()?;
        let client = self.clone();

        self.cache
            .get_or_fetch(&key, move || async move {
                client.query_pages(&database_id, &query).await
            })
            .await
    }

    async fn query_rows(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> Result<Vec<RawPage>, ContentError> {
        let rows = self
            .api
            .query_database(database_id, query)
            .await
            .map_err(|err| classify(err, database_id, format!("query database {database_id}")))?;

        info!(database_id, rows = rows.len(), "queried database");
        Ok(rows)
    }

    async fn query_pages(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> Result<Vec<Page>, ContentError> {
        let rows = self.query_rows(database_id, query).await?;
        let now = Utc::now();
        Ok(rows.iter().map(|raw| self.shape(raw, now)).collect())
    }

    async fn find_page(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> Result<Option<Page>, ContentError> {
        let rows = self.query_rows(database_id, query).await?;
        let Some(raw) = rows.first() else {
            return Ok(None);
        };

        let blocks = self.get_blocks(&raw.id).await?;
        Ok(Some(Page {
            blocks,
            ..self.shape(raw, Utc::now())
        }))
    }
}

impl ContentClient {
    /// Equality filter matching the configured type of the status property.
    fn status_filter(&self, status: &str) -> Filter {
        let property = self.properties.status.clone();
        let value = status.to_owned();
        match self.properties.status_type {
            StatusType::Select => Filter::SelectEquals { property, value },
            StatusType::Status => Filter::StatusEquals { property, value },
        }
    }
}

/// Case-insensitive match of a lowercase needle against the searchable fields.
fn page_matches(page: &Page, needle: &str) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(needle);

    contains(&page.title)
        || contains(&page.summary)
        || page.tags.iter().any(|tag| contains(&tag.name))
        || page.category.as_deref().is_some_and(contains)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use folio_cache::{CacheConfig, ContentCache};
    use folio_config::PropertiesConfig;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fixtures::{DATABASE_ID, client, client_with_cache, paragraph, row, row_with};
    use crate::mock::MockNotionApi;
    use crate::shape::shape_page;
    use crate::types::{PropertyValue, SelectOption};

    fn titles(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.title.as_str()).collect()
    }

    fn post(id: &str, title: &str, status: &str, tags: &[&str], category: &str) -> RawPage {
        row_with(id, title, id, status, tags, Some(category))
    }

    fn blog() -> Arc<MockNotionApi> {
        Arc::new(MockNotionApi::new().with_rows(vec![
            post("p1", "Rust Caching", "Public", &["rust", "cache"], "Engineering"),
            post("p2", "Draft Notes", "Draft", &["notes"], "Personal"),
            post("p3", "Async Rendering", "Public", &["rust", "html"], "Engineering"),
            post("p4", "Travel Log", "Public", &["travel"], "Life"),
        ]))
    }

    #[tokio::test]
    async fn test_missing_database_id_fails_before_remote_call() {
        let api = Arc::new(MockNotionApi::new());
        let cache = ContentCache::new(CacheConfig::default());
        let client = ContentClient::new(Arc::<MockNotionApi>::clone(&api), cache);

        let err = client
            .get_formatted_database(true, DEFAULT_STATUS)
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::Configuration(_)));
        assert_eq!(api.total_calls(), 0);
        assert!(client.cache().is_empty());

        for result in [
            client.get_page_by_slug("x").await.map(|_| ()),
            client.get_pages_by_tag("rust").await.map(|_| ()),
            client.search_pages("rust").await.map(|_| ()),
        ] {
            assert!(matches!(result, Err(ContentError::Configuration(_))));
        }
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_formatted_database_filters_by_status() {
        let api = blog();
        let client = client(&api);

        let pages = client
            .get_formatted_database(true, DEFAULT_STATUS)
            .await
            .unwrap();

        assert_eq!(
            titles(&pages),
            vec!["Rust Caching", "Async Rendering", "Travel Log"]
        );
        assert!(pages.iter().all(|p| p.blocks.is_empty()));

        let queries = api.queries();
        assert_eq!(queries.len(), 1);
        let (database_id, query) = &queries[0];
        assert_eq!(database_id, DATABASE_ID);
        assert_eq!(
            query.filter,
            Some(Filter::SelectEquals {
                property: "Status".to_owned(),
                value: "Public".to_owned(),
            })
        );
        assert_eq!(query.sorts, vec![Sort::descending("Date")]);
        assert!(client.cache().contains_key("formatted-database:true:Public"));
    }

    /// Row whose status lives in Notion's built-in `status` property type.
    fn status_typed(id: &str, title: &str, status: &str) -> RawPage {
        let mut page = row_with(id, title, id, status, &["rust"], Some("Engineering"));
        page.properties.insert(
            "Status".to_owned(),
            PropertyValue::Status {
                status: Some(SelectOption {
                    name: status.to_owned(),
                    color: "green".to_owned(),
                }),
            },
        );
        page
    }

    #[tokio::test]
    async fn test_formatted_database_filters_status_typed_property() {
        let api = Arc::new(MockNotionApi::new().with_rows(vec![
            status_typed("s1", "Shipped", "Public"),
            status_typed("s2", "Pending", "Draft"),
        ]));
        let client = client(&api).with_properties(PropertiesConfig {
            status_type: StatusType::Status,
            ..PropertiesConfig::default()
        });

        let pages = client.get_formatted_database(true, "Public").await.unwrap();

        assert_eq!(titles(&pages), vec!["Shipped"]);
        assert_eq!(pages[0].status.as_deref(), Some("Public"));
        assert_eq!(
            api.queries()[0].1.filter,
            Some(Filter::StatusEquals {
                property: "Status".to_owned(),
                value: "Public".to_owned(),
            })
        );

        assert_eq!(client.get_all_tags().await.unwrap(), vec!["rust"]);
    }

    #[tokio::test]
    async fn test_select_filter_does_not_match_status_typed_property() {
        let api = Arc::new(
            MockNotionApi::new().with_rows(vec![status_typed("s1", "Shipped", "Public")]),
        );
        let client = client(&api);

        let pages = client.get_formatted_database(true, "Public").await.unwrap();
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn test_formatted_database_unfiltered() {
        let api = blog();
        let client = client(&api);

        let pages = client
            .get_formatted_database(false, DEFAULT_STATUS)
            .await
            .unwrap();

        assert_eq!(pages.len(), 4);
        assert_eq!(api.queries()[0].1.filter, None);
        assert!(client.cache().contains_key("formatted-database:false:Public"));
    }

    #[tokio::test]
    async fn test_formatted_database_is_cached() {
        let api = blog();
        let client = client(&api);

        client.get_formatted_database(true, "Public").await.unwrap();
        client.get_formatted_database(true, "Public").await.unwrap();
        client.get_formatted_database(true, "Draft").await.unwrap();

        assert_eq!(api.query_calls(), 2);
    }

    #[tokio::test]
    async fn test_page_by_slug_missing_is_none() {
        let api = blog();
        let client = client(&api);

        let page = client.get_page_by_slug("missing").await.unwrap();

        assert_eq!(page, None);
        assert_eq!(api.children_calls(), 0);
    }

    #[tokio::test]
    async fn test_page_by_slug_includes_blocks() {
        let api = Arc::new(
            MockNotionApi::new()
                .with_rows(vec![row("p1", "Hello", "hello", "Public")])
                .with_children("p1", vec![paragraph("b1", "Body")]),
        );
        let client = client(&api);

        let page = client.get_page_by_slug("hello").await.unwrap().unwrap();

        assert_eq!(page.id, "p1");
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(
            api.queries()[0].1.filter,
            Some(Filter::RichTextEquals {
                property: "Slug".to_owned(),
                value: "hello".to_owned(),
            })
        );
        assert!(client.cache().contains_key("page-by-slug:hello"));
    }

    #[tokio::test]
    async fn test_pages_by_tag_and_category() {
        let api = blog();
        let client = client(&api);

        let rust = client.get_pages_by_tag("rust").await.unwrap();
        assert_eq!(titles(&rust), vec!["Rust Caching", "Async Rendering"]);

        let life = client.get_pages_by_category("Life").await.unwrap();
        assert_eq!(titles(&life), vec!["Travel Log"]);

        let queries = api.queries();
        assert_eq!(queries[0].1.sorts, vec![Sort::descending("Date")]);
        assert_eq!(queries[1].1.sorts, vec![Sort::descending("Date")]);
        assert!(client.cache().contains_key("pages-by-tag:rust"));
        assert!(client.cache().contains_key("pages-by-category:Life"));
    }

    #[tokio::test]
    async fn test_pages_by_tag_includes_unpublished() {
        let api = blog();
        let client = client(&api);

        let notes = client.get_pages_by_tag("notes").await.unwrap();
        assert_eq!(titles(&notes), vec!["Draft Notes"]);
    }

    #[tokio::test]
    async fn test_all_tags_and_categories_from_published_listing() {
        let api = blog();
        let client = client(&api);

        assert_eq!(
            client.get_all_tags().await.unwrap(),
            vec!["cache", "html", "rust", "travel"]
        );
        assert_eq!(
            client.get_all_categories().await.unwrap(),
            vec!["Engineering", "Life"]
        );
        // Both derive from one cached listing.
        assert_eq!(api.query_calls(), 1);
    }

    #[tokio::test]
    async fn test_search_blank_query_makes_no_call() {
        let api = blog();
        let client = client(&api);

        assert!(client.search_pages("").await.unwrap().is_empty());
        assert!(client.search_pages("   ").await.unwrap().is_empty());
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_search_matches_fields_case_insensitively() {
        let api = blog();
        let client = client(&api);

        let by_title = client.search_pages("CACHING").await.unwrap();
        assert_eq!(titles(&by_title), vec!["Rust Caching"]);

        let by_tag = client.search_pages("html").await.unwrap();
        assert_eq!(titles(&by_tag), vec!["Async Rendering"]);

        let by_category = client.search_pages("engineering").await.unwrap();
        assert_eq!(titles(&by_category), vec!["Rust Caching", "Async Rendering"]);

        let by_summary = client.search_pages("about travel").await.unwrap();
        assert_eq!(titles(&by_summary), vec!["Travel Log"]);

        let drafts = client.search_pages("draft").await.unwrap();
        assert_eq!(titles(&drafts), vec!["Draft Notes"]);

        assert!(client.search_pages("nothing here").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_never_cached() {
        let api = blog();
        let client = client(&api);

        client.search_pages("rust").await.unwrap();
        client.search_pages("rust").await.unwrap();

        assert_eq!(api.query_calls(), 2);
        assert!(client.cache().is_empty());
        assert_eq!(api.queries()[0].1.filter, None);
    }

    #[tokio::test]
    async fn test_database_rate_limit_is_classified() {
        let api = Arc::new(MockNotionApi::new().with_failure(DATABASE_ID, 429, "slow down"));
        let client = client(&api);

        let err = client
            .get_formatted_database(true, DEFAULT_STATUS)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::RateLimited));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_listing_survives_outage() {
        let api = blog();
        let client = client_with_cache(&api, CacheConfig::new(Duration::from_secs(60)));

        let fresh = client.get_formatted_database(true, "Public").await.unwrap();
        tokio::time::advance(Duration::from_secs(120)).await;
        api.fail(DATABASE_ID, 500, "internal error");

        let stale = client.get_formatted_database(true, "Public").await.unwrap();
        assert_eq!(stale, fresh);
        assert_eq!(api.query_calls(), 2);

        client.clear_cache(Some("formatted-database:"));
        let err = client
            .get_formatted_database(true, "Public")
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Api { .. }));

        api.recover(DATABASE_ID);
        let recovered = client.get_formatted_database(true, "Public").await.unwrap();
        assert_eq!(recovered, fresh);
        assert_eq!(api.query_calls(), 4);
    }

    #[test]
    fn test_page_matches() {
        let raw = row_with("p", "Style Guide", "style", "Public", &["Rust"], None);
        let page = shape_page(&raw, &PropertiesConfig::default(), Utc::now());

        assert!(page_matches(&page, "guide"));
        assert!(page_matches(&page, "rust"));
        assert!(!page_matches(&page, "python"));
    }
}
