//! `folio page` and `folio slug` command implementations.

use clap::Args;
use folio_model::Page;
use folio_notion::ContentClient;
use folio_renderer::render_blocks;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Page id.
    id: String,

    /// Print page metadata only, without fetching content blocks.
    #[arg(long)]
    no_blocks: bool,
}

impl PageArgs {
    /// Execute the page command.
    pub(crate) async fn execute(
        self,
        client: &ContentClient,
        output: &Output,
    ) -> Result<(), CliError> {
        let page = client.get_formatted_page(&self.id, !self.no_blocks).await?;
        print_page(output, &page, !self.no_blocks)
    }
}

/// Arguments for the slug command.
#[derive(Args)]
pub(crate) struct SlugArgs {
    /// Page slug.
    slug: String,
}

impl SlugArgs {
    /// Execute the slug command.
    pub(crate) async fn execute(
        self,
        client: &ContentClient,
        output: &Output,
    ) -> Result<(), CliError> {
        let page = client
            .get_page_by_slug(&self.slug)
            .await?
            .ok_or_else(|| CliError::NotFound(format!("No page with slug '{}'", self.slug)))?;
        print_page(output, &page, true)
    }
}

/// Print page metadata to stderr and, with `with_blocks`, the rendered HTML
/// to stdout.
fn print_page(output: &Output, page: &Page, with_blocks: bool) -> Result<(), CliError> {
    output.highlight(&page.title);
    for line in metadata_lines(page) {
        output.detail(&line);
    }

    if with_blocks {
        output.content(&render_blocks(&page.blocks))?;
    }
    Ok(())
}

fn metadata_lines(page: &Page) -> Vec<String> {
    let mut lines = vec![
        format!("id:       {}", page.id),
        format!("slug:     {}", page.slug),
        format!("date:     {}", page.date.format("%Y-%m-%d")),
    ];
    if let Some(status) = &page.status {
        lines.push(format!("status:   {status}"));
    }
    if let Some(category) = &page.category {
        lines.push(format!("category: {category}"));
    }
    if !page.tags.is_empty() {
        let tags: Vec<&str> = page.tags.iter().map(|t| t.name.as_str()).collect();
        lines.push(format!("tags:     {}", tags.join(", ")));
    }
    if !page.summary.is_empty() {
        lines.push(format!("summary:  {}", page.summary));
    }
    lines
}
