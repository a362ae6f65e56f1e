//! Subtitle corpus access.
//!
//! Loads `.srt` transcript files for ingestion and supports a literal
//! scan over cue blocks for exact-term lookups outside the vector index.

use crate::error::{ConsultaError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

/// A subtitle transcript file loaded from the corpus directory.
#[derive(Debug, Clone)]
pub struct SrtFile {
    /// Full path on disk.
    pub path: PathBuf,
    /// File name (used as the document source identifier).
    pub name: String,
    /// Raw file contents.
    pub text: String,
}

/// Load every `.srt` file from a corpus directory.
///
/// Files are returned sorted by name so that repeated ingestion of the same
/// corpus produces the same document order in the store.
pub fn load_corpus(dir: &Path) -> Result<Vec<SrtFile>> {
    if !dir.is_dir() {
        return Err(ConsultaError::Corpus(format!(
            "Corpus directory not found: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_srt = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("srt"))
            .unwrap_or(false);
        if !path.is_file() || !is_srt {
            continue;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match std::fs::read_to_string(&path) {
            Ok(text) => files.push(SrtFile { path, name, text }),
            Err(e) => {
                tracing::warn!("Skipping unreadable file {}: {}", path.display(), e);
            }
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// A literal match found by scanning cue blocks.
#[derive(Debug, Clone)]
pub struct ScanMatch {
    /// File the match was found in.
    pub file: String,
    /// Cue timestamp range, or a placeholder when the block has none.
    pub timestamp: String,
    /// Cue text with index and timestamp lines removed.
    pub snippet: String,
}

/// Literal scanner over subtitle cue blocks.
pub struct CorpusScanner {
    timestamp_pattern: Regex,
    index_line_pattern: Regex,
}

impl CorpusScanner {
    pub fn new() -> Self {
        Self {
            // SRT cue timing line; milliseconds are optional so already
            // normalized transcripts still match.
            timestamp_pattern: Regex::new(
                r"(\d{2}:\d{2}:\d{2}),?\d{0,3}\s*-->\s*(\d{2}:\d{2}:\d{2}),?\d{0,3}",
            )
            .expect("valid cue timing pattern"),
            index_line_pattern: Regex::new(r"^\d+$").expect("valid index pattern"),
        }
    }

    /// Find cue blocks in a single file that contain `term` (case-insensitive).
    pub fn scan_file(&self, file: &SrtFile, term: &str) -> Vec<ScanMatch> {
        let needle = term.to_lowercase();
        let mut matches = Vec::new();
        let text = file.text.replace('\r', "");

        // Cue blocks are separated by blank lines.
        for block in text.split("\n\n") {
            if !block.to_lowercase().contains(&needle) {
                continue;
            }

            let timestamp = self
                .timestamp_pattern
                .find(block)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "Timestamp desconocido".to_string());

            let snippet = block
                .lines()
                .map(str::trim)
                .filter(|line| {
                    !line.is_empty()
                        && !self.index_line_pattern.is_match(line)
                        && !self.timestamp_pattern.is_match(line)
                })
                .collect::<Vec<_>>()
                .join(" ");

            if !snippet.is_empty() {
                matches.push(ScanMatch {
                    file: file.name.clone(),
                    timestamp,
                    snippet,
                });
            }
        }

        matches
    }

    /// Scan the whole corpus directory for a literal term.
    pub fn scan_directory(&self, dir: &Path, term: &str) -> Result<Vec<ScanMatch>> {
        let files = load_corpus(dir)?;
        let mut matches = Vec::new();
        for file in &files {
            matches.extend(self.scan_file(file, term));
        }
        Ok(matches)
    }
}

impl Default for CorpusScanner {
    fn default() -> Self {
        Self::new()
    }
}
