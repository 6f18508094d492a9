//! Two-stage article search
//!
//! An exact substring stage ordered by recency, with a character-fragment
//! fuzzy fallback that engages only when exact results are thin. See
//! [`SearchEngine`] for the entry point and [`crate::tokenizer`] for how
//! terms are fragmented.

pub mod engine;
pub mod query;
pub mod scorer;
pub mod tokenizer;

pub use engine::SearchEngine;
pub use query::{FuzzyInfo, SearchField, SearchOptions, SearchOutcome};
