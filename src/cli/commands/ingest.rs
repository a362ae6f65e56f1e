//! Ingest command implementation.

use crate::cli::Output;
use crate::config::{EmbeddingProvider, Settings};
use crate::openai;
use crate::session::Session;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(dir: Option<String>, force: bool, settings: Settings) -> Result<()> {
    if settings.embedding.provider == EmbeddingProvider::OpenAI {
        if let Err(e) = openai::ensure_api_key() {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    }

    let corpus_dir = dir
        .map(|d| Settings::expand_path(&d))
        .unwrap_or_else(|| settings.corpus_dir());

    let session = Session::new(settings)?;

    Output::info(&format!("Ingesting transcripts from {}", corpus_dir.display()));
    let spinner = Output::spinner("Chunking, embedding and indexing...");

    match session.ingest_corpus(&corpus_dir, force).await {
        Ok(report) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Indexed {} chunks from {} files ({} already indexed, skipped)",
                report.chunks_indexed, report.files_processed, report.files_skipped
            ));
            if report.files_skipped > 0 && report.files_processed == 0 {
                Output::info("Use --force to re-ingest existing sources.");
            }
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Ingestion failed: {}", e));
            Err(e.into())
        }
    }
}
