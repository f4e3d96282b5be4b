//! Listing commands: `folio list`, `folio tag`, `folio category` and
//! `folio search`.

use clap::Args;
use folio_notion::{ContentClient, DEFAULT_STATUS};

use super::print_pages;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// List pages of every status.
    #[arg(long)]
    all: bool,

    /// Status to list.
    #[arg(long, default_value = DEFAULT_STATUS, conflicts_with = "all")]
    status: String,
}

impl ListArgs {
    /// Execute the list command.
    pub(crate) async fn execute(
        self,
        client: &ContentClient,
        output: &Output,
    ) -> Result<(), CliError> {
        let pages = client.get_formatted_database(!self.all, &self.status).await?;
        print_pages(output, &pages, "No pages found")
    }
}

/// Arguments for the tag command.
#[derive(Args)]
pub(crate) struct TagArgs {
    /// Tag name.
    name: String,
}

impl TagArgs {
    /// Execute the tag command.
    pub(crate) async fn execute(
        self,
        client: &ContentClient,
        output: &Output,
    ) -> Result<(), CliError> {
        let pages = client.get_pages_by_tag(&self.name).await?;
        print_pages(output, &pages, &format!("No pages tagged '{}'", self.name))
    }
}

/// Arguments for the category command.
#[derive(Args)]
pub(crate) struct CategoryArgs {
    /// Category name.
    name: String,
}

impl CategoryArgs {
    /// Execute the category command.
    pub(crate) async fn execute(
        self,
        client: &ContentClient,
        output: &Output,
    ) -> Result<(), CliError> {
        let pages = client.get_pages_by_category(&self.name).await?;
        print_pages(output, &pages, &format!("No pages in category '{}'", self.name))
    }
}

/// Arguments for the search command.
#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Text to look for in titles, summaries, tags and categories.
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
}

impl SearchArgs {
    /// Execute the search command.
    pub(crate) async fn execute(
        self,
        client: &ContentClient,
        output: &Output,
    ) -> Result<(), CliError> {
        let query = self.query.join(" ");
        let pages = client.search_pages(&query).await?;
        print_pages(output, &pages, &format!("No pages match '{query}'"))
    }
}
