//! Context building for RAG responses.
//!
//! Turns a retrieval result into one prompt-ready text block. Transcripts
//! arrive with auto-generation artifacts (provenance tags, filler cues,
//! millisecond timestamps) that only waste prompt tokens; cleaning keeps
//! second-level timestamps so citations stay verifiable.

use crate::vector_store::Document;
use regex::Regex;
use tracing::debug;

/// Bracketed noise removed from document bodies and source names.
const BRACKETED_NOISE: &[&str] = &[
    "Spanish (auto-generated)",
    "DownSub.com",
    "Música",
    "Aplausos",
];

/// Plain (unbracketed) noise tokens removed from document bodies.
const PLAIN_NOISE: &[&str] = &["Spanish_auto_generated"];

/// Noise substrings removed from source file names.
const FILENAME_NOISE: &[&str] = &["[Spanish (auto-generated)]", "[DownSub.com]"];

/// Separator between formatted document blocks.
const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Formats retrieved documents into a single LLM context string.
///
/// All patterns are compiled once at construction; the formatter is then a
/// pure transform.
pub struct ContextFormatter {
    body_noise: Regex,
    timestamp_millis: Regex,
    whitespace_run: Regex,
}

impl ContextFormatter {
    pub fn new() -> Self {
        // single case-insensitive alternation over every noise form,
        // tolerating stray whitespace inside the brackets
        let alternation = BRACKETED_NOISE
            .iter()
            .map(|text| format!(r"\[\s*{}\s*\]", regex::escape(text)))
            .chain(PLAIN_NOISE.iter().map(|text| regex::escape(text)))
            .collect::<Vec<_>>()
            .join("|");

        Self {
            body_noise: Regex::new(&format!("(?i){}", alternation))
                .expect("valid noise pattern"),
            timestamp_millis: Regex::new(r"(\d{2}:\d{2}:\d{2}),\d{3}")
                .expect("valid timestamp pattern"),
            whitespace_run: Regex::new(r"\s+").expect("valid whitespace pattern"),
        }
    }

    /// Clean a source file name for citation display.
    ///
    /// Takes the basename, strips provenance tags, collapses whitespace and
    /// drops a trailing `.srt` extension.
    pub fn clean_source(&self, source: &str) -> String {
        let basename = source
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(source);

        let mut name = basename.to_string();
        for noise in FILENAME_NOISE {
            name = name.replace(noise, "");
        }
        let name = self.whitespace_run.replace_all(&name, " ");
        let name = name.trim();

        name.strip_suffix(".srt").unwrap_or(name).trim().to_string()
    }

    /// Clean a document body: drop noise tags, reduce timestamps to second
    /// precision, and remove blank lines. Applying it twice yields the same
    /// output as applying it once.
    pub fn clean_text(&self, text: &str) -> String {
        let without_noise = self.body_noise.replace_all(text, "");
        let without_millis = self
            .timestamp_millis
            .replace_all(&without_noise, "$1");

        without_millis
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render documents as `Fuente:`/`Contenido:` blocks joined by a fixed
    /// separator. Documents whose cleaned text is empty are dropped.
    pub fn format(&self, docs: &[Document]) -> String {
        debug!("Formatting {} documents into context", docs.len());

        let blocks: Vec<String> = docs
            .iter()
            .filter_map(|doc| {
                let source = doc
                    .metadata
                    .get("source")
                    .map(String::as_str)
                    .unwrap_or("Desconocido");
                let source = self.clean_source(source);
                let content = self.clean_text(&doc.text);

                (!content.is_empty())
                    .then(|| format!("Fuente: {}\nContenido:\n{}", source, content))
            })
            .collect();

        let result = blocks.join(BLOCK_SEPARATOR);
        debug!("Context is {} characters", result.len());
        result
    }
}

impl Default for ContextFormatter {
    fn default() -> Self {
        Self::new()
    }
}
