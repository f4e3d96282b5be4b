//! Notion API payload types.

mod page;
mod query;

pub use page::{DateValue, FileObject, Person, PropertyValue, RawPage, SelectOption};
pub use query::{BlockChildren, DatabaseQuery, Filter, QueryResponse, Sort, SortDirection};
