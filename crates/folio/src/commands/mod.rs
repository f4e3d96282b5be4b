//! CLI command implementations.

pub(crate) mod list;
pub(crate) mod page;
pub(crate) mod terms;

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_model::Page;
use folio_notion::ContentClient;
use tracing::info;

use crate::error::CliError;
use crate::output::Output;

pub(crate) use list::{CategoryArgs, ListArgs, SearchArgs, TagArgs};
pub(crate) use page::{PageArgs, SlugArgs};

/// Options shared by all commands.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Notion API key (overrides config and NOTION_API_KEY).
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Content database id (overrides config and NOTION_DATABASE_ID).
    #[arg(long, global = true)]
    database_id: Option<String>,

    /// Enable verbose output (request and cache logs).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Load configuration and build the content client.
    pub(crate) fn client(&self) -> Result<ContentClient, CliError> {
        let cli_settings = CliSettings {
            api_key: self.api_key.clone(),
            database_id: self.database_id.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            info!(path = %path.display(), "loaded configuration");
        }

        Ok(ContentClient::from_config(&config)?)
    }
}

/// One summary line per page: date, slug and title.
pub(crate) fn page_line(page: &Page) -> String {
    format!(
        "{}  {:<32}  {}",
        page.date.format("%Y-%m-%d"),
        page.slug,
        page.title
    )
}

/// Print a page listing to stdout, or a warning if it is empty.
pub(crate) fn print_pages(output: &Output, pages: &[Page], empty: &str) -> Result<(), CliError> {
    if pages.is_empty() {
        output.warning(empty);
        return Ok(());
    }

    for page in pages {
        output.content(&page_line(page))?;
    }
    output.detail(&format!("{} page(s)", pages.len()));
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    pub(crate) fn page(slug: &str, title: &str) -> Page {
        let date = Utc.with_ymd_and_hms(2024, 5, 6, 9, 30, 0).unwrap();
        Page {
            id: format!("id-{slug}"),
            title: title.to_owned(),
            summary: String::new(),
            slug: slug.to_owned(),
            tags: Vec::new(),
            category: None,
            keywords: Vec::new(),
            author: None,
            thumbnail: None,
            date,
            updated_at: date,
            status: Some("Public".to_owned()),
            blocks: Vec::new(),
        }
    }

    #[test]
    fn test_page_line() {
        assert_eq!(
            page_line(&page("hello-world", "Hello World")),
            "2024-05-06  hello-world                       Hello World"
        );
    }
}
