//! Comment attachment and queries
//!
//! A comment exists iff its id is listed in its parent article's `comments`
//! vector; creation and deletion keep both sides in one transaction. The
//! article author gets a notification for comments from anyone else.

use chrono::{DateTime, Utc};
use synapse_core::{Comment, DocId, Error, Result};
use synapse_store::EntityStore;

use crate::messages::comment_notification;

/// Attach a comment to an article and notify its author
pub fn create_comment(
    store: &EntityStore,
    article_id: &str,
    author_id: &str,
    content: &str,
) -> Result<Comment> {
    let article_id = DocId::parse(article_id)?;
    let author_id = DocId::parse(author_id)?;
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::Validation("comment must not be empty".into()));
    }

    store.with_txn(|txn| {
        let mut article = txn
            .article(article_id)
            .ok_or(Error::not_found("article", article_id))?;
        let commenter = txn
            .user(author_id)
            .ok_or(Error::not_found("user", author_id))?;
        let comment = Comment {
            id: DocId::new(),
            article_id,
            author_id,
            author_name: commenter.name.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        article.comments.push(comment.id);
        article.updated_at = comment.created_at;
        if commenter.id != article.author_id {
            txn.put_message(comment_notification(&article, &comment, &commenter));
        }
        txn.put_article(article);
        txn.put_comment(comment.clone());
        Ok(comment)
    })
}

/// Delete a comment and unlink it from its parent article
///
/// The parent may already be gone (it deletes its comments when it goes);
/// a dangling parent reference is not an error here.
pub fn delete_comment(store: &EntityStore, comment_id: &str) -> Result<()> {
    let comment_id = DocId::parse(comment_id)?;
    store.with_txn(|txn| {
        let comment = txn
            .comment(comment_id)
            .ok_or(Error::not_found("comment", comment_id))?;
        if let Some(mut article) = txn.article(comment.article_id) {
            article.comments.retain(|id| *id != comment_id);
            txn.put_article(article);
        }
        txn.delete_comment(comment_id);
        Ok(())
    })
}

/// Comments of one article, oldest first
pub fn get_comments_by_article(store: &EntityStore, article_id: &str) -> Result<Vec<Comment>> {
    let article_id = DocId::parse(article_id)?;
    let mut comments = store.comments().filter(|c| c.article_id == article_id);
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(comments)
}

/// Comments created after `since`, newest first, for the admin dashboard
pub fn get_comments_after(
    store: &EntityStore,
    since: DateTime<Utc>,
    limit: usize,
) -> Vec<Comment> {
    let mut comments = store.comments().filter(|c| c.created_at > since);
    comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    comments.truncate(limit);
    comments
}

/// Case-insensitive substring search over comment bodies, newest first
pub fn search_comments(
    store: &EntityStore,
    term: &str,
    limit: usize,
    skip: usize,
) -> Result<Vec<Comment>> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Err(Error::Validation("search term must not be empty".into()));
    }
    let mut comments = store
        .comments()
        .filter(|c| c.content.to_lowercase().contains(&needle));
    comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(comments.into_iter().skip(skip).take(limit).collect())
}
