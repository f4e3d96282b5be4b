//! Notion content client for Folio.
//!
//! [`ContentClient`] fetches pages, block trees and database listings
//! through a [`NotionApi`] implementation and caches every result in a
//! shared [`ContentCache`](folio_cache::ContentCache):
//!
//! - [`HttpNotionApi`]: reqwest client for the Notion REST API
//! - [`MockNotionApi`]: in-memory API for tests (behind `mock` feature flag)
//!
//! Remote failures are classified once, at the client boundary, into
//! [`ContentError`] variants with remediation hints.
//!
//! # Example
//!
//! ```no_run
//! use folio_config::Config;
//! use folio_notion::{ContentClient, DEFAULT_STATUS};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(None, None)?;
//! let client = ContentClient::from_config(&config)?;
//!
//! for page in client.get_formatted_database(true, DEFAULT_STATUS).await? {
//!     println!("{} ({})", page.title, page.slug);
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod client;
mod error;
mod http;
mod shape;
mod types;

#[cfg(test)]
mod fixtures;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use api::NotionApi;
pub use client::{ContentClient, DEFAULT_STATUS};
pub use error::{ApiError, ContentError};
pub use http::HttpNotionApi;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockNotionApi;
pub use shape::shape_page;
pub use types::{
    BlockChildren, DatabaseQuery, DateValue, FileObject, Filter, Person, PropertyValue,
    QueryResponse, RawPage, SelectOption, Sort, SortDirection,
};
