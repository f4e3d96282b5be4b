//! Folio CLI - Notion content renderer.
//!
//! Provides commands for:
//! - `page`, `slug`: Render a page to HTML
//! - `list`, `tag`, `category`, `search`: List pages
//! - `tags`, `categories`: List taxonomy terms

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use folio_notion::ContentClient;
use tracing_subscriber::EnvFilter;

use commands::{CategoryArgs, GlobalArgs, ListArgs, PageArgs, SearchArgs, SlugArgs, TagArgs};
use error::CliError;
use output::Output;

/// Folio - render Notion content as HTML.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a page by id.
    Page(PageArgs),
    /// Render a page by slug.
    Slug(SlugArgs),
    /// List pages, newest first.
    List(ListArgs),
    /// List all tags of published pages.
    Tags,
    /// List all categories of published pages.
    Categories,
    /// List pages with a tag.
    Tag(TagArgs),
    /// List pages in a category.
    Category(CategoryArgs),
    /// Search pages.
    Search(SearchArgs),
}

impl Commands {
    async fn execute(self, client: &ContentClient, output: &Output) -> Result<(), CliError> {
        match self {
            Self::Page(args) => args.execute(client, output).await,
            Self::Slug(args) => args.execute(client, output).await,
            Self::List(args) => args.execute(client, output).await,
            Self::Tags => commands::terms::tags(client, output).await,
            Self::Categories => commands::terms::categories(client, output).await,
            Self::Tag(args) => args.execute(client, output).await,
            Self::Category(args) => args.execute(client, output).await,
            Self::Search(args) => args.execute(client, output).await,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli, &output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli, output: &Output) -> Result<(), CliError> {
    let client = cli.global.client()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(cli.command.execute(&client, output))
}
