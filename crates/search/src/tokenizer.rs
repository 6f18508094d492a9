//! Character-level tokenizer for short mixed-script queries
//!
//! Queries on the platform are short and mix Latin and CJK text, so instead
//! of word segmentation the tokenizer expands a term into the term itself,
//! its individual letters, and its 2- and 3-character substrings. The fuzzy
//! stage matches those fragments independently, which gives partial recall
//! for CJK titles without a dictionary.

use std::collections::HashSet;

/// Whether a character participates in generated tokens
///
/// Letters only: ASCII after lowercasing, plus the CJK Unified Ideographs
/// block. Digits and punctuation never form fragments on their own, though
/// they survive inside the full-term token.
pub fn is_indexable(c: char) -> bool {
    c.is_ascii_lowercase() || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Expand a search term into its match fragments
///
/// The first token is always the trimmed, lowercased term itself; the rest
/// are single indexable characters followed by substrings of `min_gram` to
/// `max_gram` characters whose characters are all indexable. Duplicates are
/// dropped, first occurrence wins.
///
/// An empty or whitespace-only term produces no tokens.
pub fn character_tokens(term: &str, min_gram: usize, max_gram: usize) -> Vec<String> {
    let normalized = term.trim().to_lowercase();
    if normalized.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = normalized.chars().collect();
    let mut tokens = vec![normalized.clone()];

    for &c in &chars {
        if is_indexable(c) {
            tokens.push(c.to_string());
        }
    }

    for width in min_gram..=max_gram {
        if width > chars.len() {
            break;
        }
        for window in chars.windows(width) {
            if window.iter().all(|&c| is_indexable(c)) {
                tokens.push(window.iter().collect());
            }
        }
    }

    let mut seen = HashSet::new();
    tokens.retain(|t| seen.insert(t.clone()));
    tokens
}
