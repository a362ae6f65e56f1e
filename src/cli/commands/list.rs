//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::session::Session;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let session = Session::new(settings)?;
    let store = session.store();

    let sources = store.list_sources().await?;

    if sources.is_empty() {
        Output::info("No sources indexed yet. Run 'consulta ingest' first.");
        return Ok(());
    }

    Output::header(&format!("Indexed sources ({})", sources.len()));
    for source in &sources {
        Output::source_info(&source.source, source.chunk_count);
    }

    let total = store.document_count().await?;
    println!();
    Output::kv("Total chunks", &total.to_string());

    Ok(())
}
