// src/services/extract.rs

//! Joke extraction from markdown documents.
//!
//! The curated document lists one joke per bullet line:
//!
//! ```text
//! # Witze
//! - Was ist orange und geht über die Berge? Eine Wanderine.
//! - Treffen sich zwei Jäger. Beide tot.
//! ```

/// Prefix marking a joke line.
pub const JOKE_MARKER: &str = "- ";

/// Extract every joke line from a document, in document order.
///
/// Only the two-character marker is removed; whatever follows it, leading
/// whitespace included, is kept verbatim.
pub fn extract_jokes(document: &str) -> Vec<String> {
    document
        .lines()
        .filter_map(|line| line.strip_prefix(JOKE_MARKER))
        .map(str::to_string)
        .collect()
}
