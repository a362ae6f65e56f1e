//! Scan command implementation.
//!
//! Literal lookup over the raw .srt files, bypassing the index entirely.
//! Useful for verifying that a term the retriever should find actually
//! exists in the corpus.

use crate::cli::Output;
use crate::config::Settings;
use crate::subtitle::CorpusScanner;
use anyhow::Result;

/// Run the scan command.
pub fn run_scan(term: &str, dir: Option<String>, limit: usize, settings: Settings) -> Result<()> {
    let corpus_dir = dir
        .map(|d| Settings::expand_path(&d))
        .unwrap_or_else(|| settings.corpus_dir());

    let scanner = CorpusScanner::new();
    let matches = scanner.scan_directory(&corpus_dir, term)?;

    if matches.is_empty() {
        Output::warning(&format!("No matches for '{}' in {}", term, corpus_dir.display()));
        return Ok(());
    }

    Output::success(&format!(
        "Found {} matches for '{}', showing {}",
        matches.len(),
        term,
        matches.len().min(limit)
    ));

    for m in matches.iter().take(limit) {
        Output::scan_match(&m.file, &m.timestamp, &m.snippet);
    }

    Ok(())
}
