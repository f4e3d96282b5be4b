//! `folio tags` and `folio categories` command implementations.

use folio_notion::ContentClient;

use crate::error::CliError;
use crate::output::Output;

/// Print all tags of published pages.
pub(crate) async fn tags(client: &ContentClient, output: &Output) -> Result<(), CliError> {
    print_terms(output, &client.get_all_tags().await?, "No tags found")
}

/// Print all categories of published pages.
pub(crate) async fn categories(client: &ContentClient, output: &Output) -> Result<(), CliError> {
    print_terms(output, &client.get_all_categories().await?, "No categories found")
}

fn print_terms(output: &Output, terms: &[String], empty: &str) -> Result<(), CliError> {
    if terms.is_empty() {
        output.warning(empty);
        return Ok(());
    }
    for term in terms {
        output.content(term)?;
    }
    Ok(())
}
