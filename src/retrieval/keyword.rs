//! Keyword extraction and docstore fallback ranking.
//!
//! Dense retrieval can miss documents that contain rare literal terms
//! (proper nouns, codes, exact titles) the embedding space does not separate
//! well. This module supplies the sparse half of hybrid retrieval: extract
//! the query's keywords, then rank the full document store by how many of
//! the still-missing keywords each document contains.

use crate::vector_store::Document;
use regex::Regex;

/// A document scored by the keyword fallback scan.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    /// Number of distinct missing keywords found in the document text.
    pub match_count: usize,
    /// The matched document.
    pub document: Document,
}

/// Extracts query keywords and ranks fallback candidates.
pub struct KeywordScanner {
    token_pattern: Regex,
}

impl KeywordScanner {
    pub fn new() -> Self {
        Self {
            // tokens of 3+ word characters; shorter ones are noise
            token_pattern: Regex::new(r"\b\w{3,}\b").expect("valid token pattern"),
        }
    }

    /// Extract the keyword set from a query: distinct tokens of length >= 3,
    /// lower-cased, first-occurrence order preserved.
    pub fn keywords(&self, query: &str) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut keywords = Vec::new();

        for token in self.token_pattern.find_iter(query) {
            let lowered = token.as_str().to_lowercase();
            if seen.insert(lowered.clone()) {
                keywords.push(lowered);
            }
        }
        keywords
    }

    /// Keywords not present in `blob` (lower-cased haystack).
    ///
    /// Containment is substring, not whole-word: "cat" counts as present
    /// inside "category". The over-match is a deliberate recall bias carried
    /// over from production behavior.
    pub fn missing_keywords(&self, keywords: &[String], blob: &str) -> Vec<String> {
        keywords
            .iter()
            .filter(|kw| !blob.contains(kw.as_str()))
            .cloned()
            .collect()
    }

    /// Scan documents for missing keywords and rank the hits.
    ///
    /// `documents` must arrive in store insertion order; the sort is stable,
    /// so equal match counts keep that order and the ranking is
    /// deterministic for a fixed index. Documents matching no keyword are
    /// dropped, never kept as zero-relevance filler.
    pub fn rank(
        &self,
        documents: Vec<Document>,
        missing: &[String],
        limit: usize,
    ) -> Vec<ScoredDocument> {
        let mut matches: Vec<ScoredDocument> = documents
            .into_iter()
            .filter_map(|document| {
                let text_lower = document.text.to_lowercase();
                let match_count = missing
                    .iter()
                    .filter(|kw| text_lower.contains(kw.as_str()))
                    .count();
                (match_count > 0).then_some(ScoredDocument {
                    match_count,
                    document,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.match_count.cmp(&a.match_count));
        matches.truncate(limit);
        matches
    }
}

impl Default for KeywordScanner {
    fn default() -> Self {
        Self::new()
    }
}
