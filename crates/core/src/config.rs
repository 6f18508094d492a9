//! Tuning constants for the core
//!
//! The search weights and thresholds were chosen empirically; they live here
//! as configuration rather than as literals in the engine so they can be
//! tuned and tested independently.

use std::time::Duration;

/// Tuning knobs for the two-stage search engine
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTuning {
    /// Exact-stage hit count below which the fuzzy stage runs
    pub fallback_threshold: usize,
    /// Per-stage retrieval cap, larger than any sane page size
    pub stage_cap: usize,
    /// Shortest generated substring token, in characters
    pub min_gram: usize,
    /// Longest generated substring token, in characters
    pub max_gram: usize,
    /// Base score for exact-stage hits; position is subtracted from it, and
    /// it must stay far above anything the fuzzy scorer can produce
    pub exact_rank_base: i64,
    /// Score for a token equal to the whole field
    pub full_field_score: f32,
    /// Score for a token matching the field's prefix or suffix
    pub edge_score: f32,
    /// Field weight: title
    pub title_weight: f32,
    /// Field weight: summary
    pub summary_weight: f32,
    /// Field weight: tags (joined)
    pub tags_weight: f32,
    /// Field weight: author display name
    pub author_weight: f32,
    /// Field weight: body, applied only when bodies were loaded
    pub body_weight: f32,
}

impl Default for SearchTuning {
    fn default() -> Self {
        SearchTuning {
            fallback_threshold: 3,
            stage_cap: 50,
            min_gram: 2,
            max_gram: 3,
            exact_rank_base: 1000,
            full_field_score: 10.0,
            edge_score: 5.0,
            title_weight: 3.0,
            summary_weight: 2.0,
            tags_weight: 2.0,
            author_weight: 1.5,
            body_weight: 1.0,
        }
    }
}

/// Session lifecycle configuration
///
/// The lifetime doubles as the bounded-staleness window of the user snapshot
/// cached on each session: snapshots are only rebuilt at the next login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a session stays valid after creation
    pub lifetime: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            lifetime: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Retry policy for optimistic transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxnConfig {
    /// Additional attempts after the first, on commit-time conflict only
    pub max_retries: u32,
    /// Base backoff between attempts; doubled per retry
    pub backoff: Duration,
}

impl TxnConfig {
    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff * 2u32.saturating_pow(attempt)
    }
}

impl Default for TxnConfig {
    fn default() -> Self {
        TxnConfig {
            max_retries: 5,
            backoff: Duration::from_millis(1),
        }
    }
}
