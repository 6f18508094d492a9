//! Like toggling
//!
//! The toggle is a membership check, not a stored flag: whatever the user's
//! `likes` set says right now decides the direction. Both directions read the
//! article and the user, so two racing toggles of the same article conflict
//! at commit and the loser re-runs against the winner's state. The counter on
//! the article therefore always equals the number of users whose `likes` set
//! contains it.

use chrono::Utc;
use synapse_core::{DocId, Error, Result};
use synapse_store::EntityStore;

use crate::messages::like_notification;

/// Direction a toggle resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Liked,
    Unliked,
}

/// Result of [`toggle_like`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub action: LikeAction,
    /// Article like counter after the toggle
    pub new_count: u64,
}

/// Toggle one user's like on one article
///
/// Liking also records a notification for the article's author in the same
/// transaction. Authors liking their own article notify themselves; the
/// toggle treats every liker the same.
pub fn toggle_like(store: &EntityStore, article_id: &str, user_id: &str) -> Result<LikeOutcome> {
    let article_id = DocId::parse(article_id)?;
    let user_id = DocId::parse(user_id)?;

    store.with_txn(|txn| {
        let mut article = txn
            .article(article_id)
            .ok_or(Error::not_found("article", article_id))?;
        let mut user = txn
            .user(user_id)
            .ok_or(Error::not_found("user", user_id))?;

        let action = if user.likes.contains(&article_id) {
            user.likes.retain(|id| *id != article_id);
            article.likes = article.likes.saturating_sub(1);
            LikeAction::Unliked
        } else {
            user.likes.push(article_id);
            article.likes += 1;
            txn.put_message(like_notification(&article, &user));
            LikeAction::Liked
        };

        let now = Utc::now();
        user.updated_at = now;
        article.updated_at = now;
        let new_count = article.likes;
        txn.put_user(user);
        txn.put_article(article);
        Ok(LikeOutcome { action, new_count })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seeded_article, seeded_user};
    use std::sync::Arc;

    #[test]
    fn toggle_flips_membership_and_counter() {
        let store = EntityStore::new();
        let author = seeded_user(&store, "author@example.com");
        let fan = seeded_user(&store, "fan@example.com");
        let article = seeded_article(&store, &author);
        let aid = article.id.to_string();
        let uid = fan.id.to_string();

        let on = toggle_like(&store, &aid, &uid).unwrap();
        assert_eq!(on.action, LikeAction::Liked);
        assert_eq!(on.new_count, 1);
        assert!(store.users().value(&fan.id).unwrap().likes.contains(&article.id));

        let off = toggle_like(&store, &aid, &uid).unwrap();
        assert_eq!(off.action, LikeAction::Unliked);
        assert_eq!(off.new_count, 0);
        assert!(store.users().value(&fan.id).unwrap().likes.is_empty());
        assert_eq!(store.articles().value(&article.id).unwrap().likes, 0);
    }

    #[test]
    fn like_notifies_the_author_once() {
        let store = EntityStore::new();
        let author = seeded_user(&store, "author@example.com");
        let fan = seeded_user(&store, "fan@example.com");
        let article = seeded_article(&store, &author);

        toggle_like(&store, &article.id.to_string(), &fan.id.to_string()).unwrap();
        let inbox = store.messages().filter(|m| m.user_id == author.id);
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].from_user_id, fan.id);
        assert_eq!(inbox[0].article_title, article.title);

        // unliking does not retract the notification
        toggle_like(&store, &article.id.to_string(), &fan.id.to_string()).unwrap();
        assert_eq!(store.messages().len(), 1);
    }

    #[test]
    fn self_like_notifies_like_any_other() {
        let store = EntityStore::new();
        let author = seeded_user(&store, "author@example.com");
        let article = seeded_article(&store, &author);

        let out = toggle_like(&store, &article.id.to_string(), &author.id.to_string()).unwrap();
        assert_eq!(out.new_count, 1);
        // the author is both sender and recipient; no special case
        let inbox = store.messages().filter(|m| m.user_id == author.id);
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].from_user_id, author.id);
    }

    #[test]
    fn toggle_bumps_both_timestamps() {
        let store = EntityStore::new();
        let author = seeded_user(&store, "author@example.com");
        let fan = seeded_user(&store, "fan@example.com");
        let article = seeded_article(&store, &author);
        let before_article = store.articles().value(&article.id).unwrap().updated_at;
        let before_fan = store.users().value(&fan.id).unwrap().updated_at;

        std::thread::sleep(std::time::Duration::from_millis(2));
        toggle_like(&store, &article.id.to_string(), &fan.id.to_string()).unwrap();
        let after_like_article = store.articles().value(&article.id).unwrap().updated_at;
        let after_like_fan = store.users().value(&fan.id).unwrap().updated_at;
        assert!(after_like_article > before_article);
        assert!(after_like_fan > before_fan);

        std::thread::sleep(std::time::Duration::from_millis(2));
        toggle_like(&store, &article.id.to_string(), &fan.id.to_string()).unwrap();
        assert!(store.articles().value(&article.id).unwrap().updated_at > after_like_article);
        assert!(store.users().value(&fan.id).unwrap().updated_at > after_like_fan);
    }

    #[test]
    fn missing_targets_abort_cleanly() {
        let store = EntityStore::new();
        let author = seeded_user(&store, "author@example.com");
        let article = seeded_article(&store, &author);

        let err = toggle_like(&store, &article.id.to_string(), &DocId::new().to_string())
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(store.articles().value(&article.id).unwrap().likes, 0);

        let err = toggle_like(&store, "garbage", &author.id.to_string()).unwrap_err();
        assert_eq!(err.code(), "INVALID_ID_FORMAT");
    }

    #[test]
    fn concurrent_toggles_keep_counter_and_membership_in_step() {
        // generous retry budget so heavy contention cannot exhaust it
        let store = Arc::new(EntityStore::with_txn_config(synapse_core::TxnConfig {
            max_retries: 50,
            ..synapse_core::TxnConfig::default()
        }));
        let author = seeded_user(&store, "author@example.com");
        let article = seeded_article(&store, &author);
        let aid = article.id.to_string();

        let fans: Vec<String> = (0..6)
            .map(|n| {
                seeded_user(&store, &format!("fan{n}@example.com"))
                    .id
                    .to_string()
            })
            .collect();

        let mut handles = Vec::new();
        for uid in fans {
            let store = Arc::clone(&store);
            let aid = aid.clone();
            handles.push(std::thread::spawn(move || {
                // like, then unlike, then like again
                toggle_like(&store, &aid, &uid).unwrap();
                toggle_like(&store, &aid, &uid).unwrap();
                toggle_like(&store, &aid, &uid).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let counted = store.articles().value(&article.id).unwrap().likes;
        let members = store
            .users()
            .count_matching(|u| u.likes.contains(&article.id));
        assert_eq!(counted, 6);
        assert_eq!(members as u64, counted);
    }
}
