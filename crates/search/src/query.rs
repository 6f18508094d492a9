//! Query options and result shapes

use synapse_core::{ArticleView, StatusFilter};

/// Which part of an article a query is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    /// Title only
    Title,
    /// Any tag
    Tags,
    /// Author display name
    Author,
    /// Article body
    Content,
    /// Title, summary, tags, author name and body together
    #[default]
    All,
}

/// Options accepted by [`crate::SearchEngine::search`]
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub field: SearchField,
    pub status: StatusFilter,
    /// Page size
    pub limit: usize,
    /// Offset into the merged result list
    pub skip: usize,
    /// Carry article bodies in the results and let the body contribute to
    /// fuzzy scores
    pub include_body: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            field: SearchField::All,
            status: StatusFilter::default(),
            limit: 20,
            skip: 0,
            include_body: false,
        }
    }
}

/// Diagnostics for a result list produced by the fuzzy stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyInfo {
    /// Fragments the fuzzy stage matched with, full term excluded
    pub tokens: Vec<String>,
}

/// Result of one search call
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// One page of the merged ranking
    pub articles: Vec<ArticleView>,
    /// Size of the merged ranking before pagination
    pub total: usize,
    /// Rank score per returned article, aligned with `articles`: exact hits
    /// score `exact_rank_base` minus their position, fuzzy hits carry their
    /// weighted fragment score
    pub scores: Vec<f32>,
    /// The normalized query the stages ran with
    pub query: String,
    /// Hits contributed by the exact stage
    pub exact_count: usize,
    /// Hits contributed by the fuzzy stage
    pub fuzzy_count: usize,
    /// Present only when the exact stage found nothing and the fuzzy stage
    /// supplied every result
    pub fuzzy: Option<FuzzyInfo>,
}

impl SearchOutcome {
    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy.is_some()
    }
}
