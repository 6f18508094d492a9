//! Admin dashboard aggregation
//!
//! The dashboard wants one snapshot of independent counters, so the metrics
//! are gathered on scoped threads and joined. A metric whose worker panics
//! degrades to zero with a warning instead of taking the dashboard down; the
//! other metrics are unaffected.

use chrono::{DateTime, NaiveTime, Utc};
use synapse_core::ArticleStatus;
use synapse_store::EntityStore;
use tracing::warn;

/// Counter snapshot for the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdminStats {
    pub users: u64,
    pub articles: u64,
    pub published_articles: u64,
    pub comments: u64,
    /// Sum of per-article like counters
    pub likes: u64,
    pub users_today: u64,
    /// Published articles created since midnight UTC
    pub articles_today: u64,
    pub comments_today: u64,
}

/// Just the since-midnight deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TodayStats {
    pub users: u64,
    pub articles: u64,
    pub comments: u64,
}

/// Start of the current UTC day
fn utc_midnight() -> DateTime<Utc> {
    Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn gather<T: Default>(label: &str, result: std::thread::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(_) => {
            warn!(metric = label, "stats worker failed, reporting zero");
            T::default()
        }
    }
}

/// Collect the dashboard counters concurrently
pub fn admin_stats(store: &EntityStore) -> AdminStats {
    let midnight = utc_midnight();
    std::thread::scope(|scope| {
        let users = scope.spawn(|| {
            (
                store.users().len() as u64,
                store.users().count_matching(|u| u.created_at >= midnight) as u64,
            )
        });
        let articles = scope.spawn(|| {
            (
                store.articles().len() as u64,
                store
                    .articles()
                    .count_matching(|a| a.status == ArticleStatus::Published)
                    as u64,
                store.articles().count_matching(|a| {
                    a.status == ArticleStatus::Published && a.created_at >= midnight
                }) as u64,
            )
        });
        let comments = scope.spawn(|| {
            (
                store.comments().len() as u64,
                store
                    .comments()
                    .count_matching(|c| c.created_at >= midnight) as u64,
            )
        });
        let likes = scope.spawn(|| {
            store
                .articles()
                .filter(|_| true)
                .iter()
                .map(|a| a.likes)
                .sum::<u64>()
        });

        let (users, users_today) = gather("users", users.join());
        let (articles, published_articles, articles_today) = gather("articles", articles.join());
        let (comments, comments_today) = gather("comments", comments.join());
        let likes = gather("likes", likes.join());

        AdminStats {
            users,
            articles,
            published_articles,
            comments,
            likes,
            users_today,
            articles_today,
            comments_today,
        }
    })
}

/// The since-midnight slice of [`admin_stats`]
pub fn today_stats(store: &EntityStore) -> TodayStats {
    let stats = admin_stats(store);
    TodayStats {
        users: stats.users_today,
        articles: stats.articles_today,
        comments: stats.comments_today,
    }
}
