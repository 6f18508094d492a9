//! Document schemas for the entity store
//!
//! These mirror the persisted shape of the collections. A few fields are
//! deliberately denormalized for read efficiency (`author_name` on articles
//! and comments, the whole user snapshot on sessions); keeping them in sync
//! is the job of the content mutators and the transaction coordinator, not
//! of the schema.

use crate::id::{DocId, SessionToken};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered account
///
/// `articles` and `likes` are membership sets stored as vectors; order is
/// irrelevant and never relied upon. `email` is unique case-insensitively
/// and always stored lowercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: DocId,
    pub name: String,
    /// Normalized (trimmed, lowercased) at write time
    pub email: String,
    /// Opaque credential hash; hashing happens outside the core
    pub password_hash: String,
    /// Personal bio line, may be empty
    pub signature: String,
    /// Ids of articles authored by this user
    pub articles: Vec<DocId>,
    /// Ids of articles this user has liked
    pub likes: Vec<DocId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle status of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// Visible only to the author
    Draft,
    /// Publicly visible and counted in admin stats
    Published,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

/// Status filter used by list and search operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// No status constraint
    All,
    /// Only the given status
    #[default]
    Published,
    /// Only drafts
    Draft,
}

impl StatusFilter {
    /// Whether an article with `status` passes this filter
    pub fn admits(self, status: ArticleStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Published => status == ArticleStatus::Published,
            StatusFilter::Draft => status == ArticleStatus::Draft,
        }
    }
}

/// Published or draft article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: DocId,
    pub title: String,
    pub summary: String,
    /// Normalized lowercase, trimmed, empties dropped
    pub tags: Vec<String>,
    /// Must reference an existing user; maintained transactionally
    pub author_id: DocId,
    /// Denormalized from the author's `name`
    pub author_name: String,
    pub body: String,
    pub status: ArticleStatus,
    /// Denormalized like counter; equals the number of users whose `likes`
    /// set contains this article's id
    pub likes: u64,
    /// Ids of comments attached to this article
    pub comments: Vec<DocId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing projection of an article
///
/// The body is heavy, so list and search operations only carry it when the
/// caller asked for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleView {
    pub id: DocId,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub author_id: DocId,
    pub author_name: String,
    pub status: ArticleStatus,
    pub likes: u64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ArticleView {
    /// Project an article, carrying the body only when requested
    pub fn project(article: &Article, include_body: bool) -> Self {
        ArticleView {
            id: article.id,
            title: article.title.clone(),
            summary: article.summary.clone(),
            tags: article.tags.clone(),
            author_id: article.author_id,
            author_name: article.author_name.clone(),
            status: article.status,
            likes: article.likes,
            created_at: article.created_at,
            body: include_body.then(|| article.body.clone()),
        }
    }
}

/// Comment attached to an article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: DocId,
    /// Parent article; the comment id appears in `Article::comments` iff the
    /// comment exists
    pub article_id: DocId,
    pub author_id: DocId,
    /// Denormalized from the author's `name`
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time snapshot of user fields captured at login
///
/// Deliberately stale: profile updates do not refresh open sessions; the
/// snapshot is only rebuilt at the next login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: DocId,
    pub name: String,
    pub email: String,
    pub articles: Vec<DocId>,
    pub likes: Vec<DocId>,
    pub signature: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        SessionUser {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            articles: user.articles.clone(),
            likes: user.likes.clone(),
            signature: user.signature.clone(),
        }
    }
}

/// Authenticated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: DocId,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Kind of notification message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Like,
    Comment,
}

/// Notification addressed to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: DocId,
    /// Recipient
    pub user_id: DocId,
    pub kind: MessageKind,
    pub article_id: DocId,
    /// Denormalized article title at the time of the event
    pub article_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<DocId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_content: Option<String>,
    /// User whose action triggered the notification
    pub from_user_id: DocId,
    pub from_user_name: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Admin grant; `user_id` is unique across the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: DocId,
    pub user_id: DocId,
    /// 0 = super admin, 1 = regular admin
    pub priority: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
