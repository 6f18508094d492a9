//! Notification messages
//!
//! Messages are written transactionally alongside the event that caused them
//! (a like or a comment), but read-side upkeep (mark read, sweep read) is
//! single-collection and goes through `single_write` instead of a full
//! transaction.

use chrono::Utc;
use synapse_core::{Article, Comment, DocId, Error, Message, MessageKind, Result, User};
use synapse_store::EntityStore;

/// Build the notification recorded when `from` likes `article`
pub(crate) fn like_notification(article: &Article, from: &User) -> Message {
    Message {
        id: DocId::new(),
        user_id: article.author_id,
        kind: MessageKind::Like,
        article_id: article.id,
        article_title: article.title.clone(),
        comment_id: None,
        comment_content: None,
        from_user_id: from.id,
        from_user_name: from.name.clone(),
        created_at: Utc::now(),
        is_read: false,
    }
}

/// Build the notification recorded when `from` comments on `article`
pub(crate) fn comment_notification(article: &Article, comment: &Comment, from: &User) -> Message {
    Message {
        id: DocId::new(),
        user_id: article.author_id,
        kind: MessageKind::Comment,
        article_id: article.id,
        article_title: article.title.clone(),
        comment_id: Some(comment.id),
        comment_content: Some(comment.content.clone()),
        from_user_id: from.id,
        from_user_name: from.name.clone(),
        created_at: comment.created_at,
        is_read: false,
    }
}

/// One page of a user's inbox
#[derive(Debug, Clone)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// Inbox size before pagination
    pub total: usize,
    /// Unread messages across the whole inbox, not just this page
    pub unread: usize,
}

/// A user's notifications, newest first
pub fn messages_for_user(
    store: &EntityStore,
    user_id: &str,
    limit: usize,
    skip: usize,
) -> Result<MessagePage> {
    let user_id = DocId::parse(user_id)?;
    let mut messages = store.messages().filter(|m| m.user_id == user_id);
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = messages.len();
    let unread = messages.iter().filter(|m| !m.is_read).count();
    Ok(MessagePage {
        messages: messages.into_iter().skip(skip).take(limit).collect(),
        total,
        unread,
    })
}

/// Mark one message as read
pub fn mark_read(store: &EntityStore, message_id: &str) -> Result<()> {
    let message_id = DocId::parse(message_id)?;
    let touched = store.single_write(|v| {
        store
            .messages()
            .mutate(&message_id, v, |m| m.is_read = true)
    });
    if touched {
        Ok(())
    } else {
        Err(Error::not_found("message", message_id))
    }
}

/// Mark every unread message of one user as read; returns how many changed
pub fn mark_all_read(store: &EntityStore, user_id: &str) -> Result<usize> {
    let user_id = DocId::parse(user_id)?;
    Ok(store.single_write(|v| {
        store
            .messages()
            .mutate_matching(|m| m.user_id == user_id && !m.is_read, v, |m| {
                m.is_read = true
            })
    }))
}

/// Delete every already-read message of one user; returns how many went
pub fn delete_read(store: &EntityStore, user_id: &str) -> Result<usize> {
    let user_id = DocId::parse(user_id)?;
    Ok(store.single_write(|_| {
        store
            .messages()
            .remove_matching(|m| m.user_id == user_id && m.is_read)
    }))
}
