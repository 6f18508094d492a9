//! Two-stage search over the article collection
//!
//! Stage one is a plain case-insensitive substring scan, newest first. Only
//! when it comes back thin (fewer hits than the fallback threshold) does
//! stage two run: the term is expanded into character fragments and every
//! candidate that matches any fragment is scored and ranked. Exact hits
//! always outrank fuzzy ones, so the fallback can only ever append.
//!
//! The engine reads committed state directly and never opens a transaction;
//! a search observes some single commit's snapshot per collection scan, which
//! is all the ranking needs.

use crate::query::{FuzzyInfo, SearchField, SearchOptions, SearchOutcome};
use crate::scorer::match_score;
use crate::tokenizer::character_tokens;
use synapse_core::{Article, ArticleView, Error, Result, SearchTuning};
use synapse_store::EntityStore;
use tracing::debug;

/// Stateless search executor, cheap to construct
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    tuning: SearchTuning,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tuning(tuning: SearchTuning) -> Self {
        SearchEngine { tuning }
    }

    /// Run a search term through both stages and return one page
    pub fn search(
        &self,
        store: &EntityStore,
        term: &str,
        opts: &SearchOptions,
    ) -> Result<SearchOutcome> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::Validation("search term must not be empty".into()));
        }

        let mut exact: Vec<Article> = store.articles().filter(|a| {
            opts.status.admits(a.status) && field_matches(a, &needle, opts.field)
        });
        exact.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        exact.truncate(self.tuning.stage_cap);

        let tokens = character_tokens(&needle, self.tuning.min_gram, self.tuning.max_gram);
        let sub_tokens: Vec<String> = tokens.into_iter().skip(1).collect();

        let run_fuzzy = exact.len() < self.tuning.fallback_threshold && !sub_tokens.is_empty();
        let mut fuzzy_hits: Vec<(Article, f32)> = Vec::new();
        if run_fuzzy {
            fuzzy_hits = self.fuzzy_stage(store, &exact, &sub_tokens, opts);
        }
        debug!(
            term = %needle,
            exact = exact.len(),
            fuzzy = fuzzy_hits.len(),
            "search stages complete"
        );

        let fuzzy_info = (exact.is_empty() && run_fuzzy).then(|| FuzzyInfo {
            tokens: sub_tokens.clone(),
        });

        let exact_count = exact.len();
        let fuzzy_count = fuzzy_hits.len();
        // exact hits score down from the base by position, which keeps them
        // above any fuzzy score (the base dominates a full stage of fuzzy
        // field scores by construction)
        let base = self.tuning.exact_rank_base;
        let merged: Vec<(Article, f32)> = exact
            .into_iter()
            .enumerate()
            .map(|(position, a)| (a, (base - position as i64) as f32))
            .chain(fuzzy_hits)
            .collect();
        let total = merged.len();
        let mut articles = Vec::new();
        let mut scores = Vec::new();
        for (a, score) in merged.into_iter().skip(opts.skip).take(opts.limit) {
            articles.push(ArticleView::project(&a, opts.include_body));
            scores.push(score);
        }

        Ok(SearchOutcome {
            articles,
            total,
            scores,
            query: needle,
            exact_count,
            fuzzy_count,
            fuzzy: fuzzy_info,
        })
    }

    /// Score every fragment-matching candidate not already found exactly
    fn fuzzy_stage(
        &self,
        store: &EntityStore,
        exact: &[Article],
        sub_tokens: &[String],
        opts: &SearchOptions,
    ) -> Vec<(Article, f32)> {
        let candidates = store.articles().filter(|a| {
            opts.status.admits(a.status)
                && exact.iter().all(|e| e.id != a.id)
                && sub_tokens.iter().any(|t| field_matches(a, t, opts.field))
        });

        let mut scored: Vec<(Article, f32)> = candidates
            .into_iter()
            .filter_map(|a| {
                let score = self.score(&a, sub_tokens, opts);
                (score > 0.0).then_some((a, score))
            })
            .collect();
        scored.sort_by(|(a, sa), (b, sb)| {
            sb.total_cmp(sa).then_with(|| b.created_at.cmp(&a.created_at))
        });
        scored.truncate(self.tuning.stage_cap);
        scored
    }

    /// Weighted fragment score of one article
    ///
    /// The body participates for explicit content searches, and for `All`
    /// searches only when bodies were requested; summary scoring is part of
    /// `All` only.
    fn score(&self, article: &Article, sub_tokens: &[String], opts: &SearchOptions) -> f32 {
        let t = &self.tuning;
        let title = article.title.to_lowercase();
        let summary = article.summary.to_lowercase();
        let tags = article.tags.join(" ").to_lowercase();
        let author = article.author_name.to_lowercase();
        let body = article.body.to_lowercase();

        let mut score = 0.0;
        for token in sub_tokens {
            score += match opts.field {
                SearchField::Title => match_score(&title, token, t) * t.title_weight,
                SearchField::Tags => match_score(&tags, token, t) * t.tags_weight,
                SearchField::Author => match_score(&author, token, t) * t.author_weight,
                SearchField::Content => match_score(&body, token, t) * t.body_weight,
                SearchField::All => {
                    let mut s = match_score(&title, token, t) * t.title_weight
                        + match_score(&summary, token, t) * t.summary_weight
                        + match_score(&tags, token, t) * t.tags_weight
                        + match_score(&author, token, t) * t.author_weight;
                    if opts.include_body {
                        s += match_score(&body, token, t) * t.body_weight;
                    }
                    s
                }
            };
        }
        score
    }
}

/// Case-insensitive substring test against the selected field(s)
///
/// `All` always consults the body for matching, independent of whether the
/// caller wants bodies carried in results.
fn field_matches(article: &Article, needle: &str, field: SearchField) -> bool {
    match field {
        SearchField::Title => article.title.to_lowercase().contains(needle),
        SearchField::Tags => article
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle)),
        SearchField::Author => article.author_name.to_lowercase().contains(needle),
        SearchField::Content => article.body.to_lowercase().contains(needle),
        SearchField::All => {
            article.title.to_lowercase().contains(needle)
                || article.summary.to_lowercase().contains(needle)
                || article
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(needle))
                || article.author_name.to_lowercase().contains(needle)
                || article.body.to_lowercase().contains(needle)
        }
    }
}
