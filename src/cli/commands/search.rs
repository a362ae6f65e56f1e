//! Search command implementation.

use crate::cli::Output;
use crate::config::{EmbeddingProvider, Settings};
use crate::openai;
use crate::rag::ContextFormatter;
use crate::session::Session;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    if settings.embedding.provider == EmbeddingProvider::OpenAI {
        if let Err(e) = openai::ensure_api_key() {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    }

    let session = Session::new(settings)?;
    let retriever = session.retriever();
    let formatter = ContextFormatter::new();

    let spinner = Output::spinner("Searching...");
    let results = retriever.retrieve(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(docs) => {
            if docs.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!(
                    "Retrieved {} chunks, showing {}",
                    docs.len(),
                    docs.len().min(limit)
                ));

                for doc in docs.iter().take(limit) {
                    Output::search_result(
                        &formatter.clean_source(&doc.source),
                        doc.chunk_index,
                        &doc.text,
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
