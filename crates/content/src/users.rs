//! Account lifecycle, profile updates and user listings
//!
//! Emails are normalized (trimmed, lowercased) before they touch the store
//! and uniqueness is enforced by the commit path against the email index, so
//! the pre-checks here are fast-path rejections only; the race between two
//! signups with the same address is settled at commit.

use chrono::Utc;
use synapse_core::{DocId, Error, Result, User};
use synapse_store::EntityStore;

use crate::articles::remove_article;

/// Input for [`create_user`]
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Already hashed; this crate never sees plaintext credentials
    pub password_hash: String,
}

/// Partial profile update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub signature: Option<String>,
    pub password_hash: Option<String>,
}

/// Listing options for [`list_users`]
#[derive(Debug, Clone)]
pub struct UserListOptions {
    /// Substring filter over name and email
    pub search: Option<String>,
    pub limit: usize,
    pub skip: usize,
}

impl Default for UserListOptions {
    fn default() -> Self {
        UserListOptions {
            search: None,
            limit: 20,
            skip: 0,
        }
    }
}

/// One page of users plus the unpaginated total
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: usize,
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Shape check on an address: one `@`, no whitespace, dotted domain
pub(crate) fn validate_email(email: &str) -> Result<()> {
    let invalid = || Error::Validation(format!("invalid email address: '{email}'"));
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let clean = |s: &str| !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c == '@');
    if !clean(local) || !clean(domain) {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((head, tld)) if !head.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Register an account
pub fn create_user(store: &EntityStore, input: NewUser) -> Result<User> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation("user name must not be empty".into()));
    }
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    // fast path; the commit re-checks under the lock
    if store.user_id_by_email(&email).is_some() {
        return Err(Error::EmailExists(email));
    }

    store.with_txn(|txn| {
        let now = Utc::now();
        let user = User {
            id: DocId::new(),
            name: name.clone(),
            email: email.clone(),
            password_hash: input.password_hash.clone(),
            signature: String::new(),
            articles: Vec::new(),
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        txn.put_user(user.clone());
        Ok(user)
    })
}

/// Look an account up by address, normalizing the same way writes do
pub fn find_user_by_email(store: &EntityStore, email: &str) -> Result<User> {
    let email = normalize_email(email);
    validate_email(&email)?;
    let id = store
        .user_id_by_email(&email)
        .ok_or_else(|| Error::not_found("user", &email))?;
    store
        .users()
        .value(&id)
        .ok_or_else(|| Error::not_found("user", &email))
}

pub fn find_user_by_id(store: &EntityStore, id: &str) -> Result<User> {
    let user_id = DocId::parse(id)?;
    store
        .users()
        .value(&user_id)
        .ok_or(Error::not_found("user", user_id))
}

/// Apply a partial profile update
///
/// A name change is propagated to the denormalized `author_name` on the
/// user's own articles in the same transaction. Existing comments keep the
/// name they were written under, and open sessions keep their login-time
/// snapshot.
pub fn update_user_profile(
    store: &EntityStore,
    id: &str,
    update: ProfileUpdate,
) -> Result<User> {
    let user_id = DocId::parse(id)?;
    let new_email = match &update.email {
        Some(raw) => {
            let email = normalize_email(raw);
            validate_email(&email)?;
            Some(email)
        }
        None => None,
    };
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(Error::Validation("user name must not be empty".into()));
        }
    }

    store.with_txn(|txn| {
        let mut user = txn
            .user(user_id)
            .ok_or(Error::not_found("user", user_id))?;
        if let Some(name) = &update.name {
            user.name = name.trim().to_string();
            for article_id in user.articles.clone() {
                if let Some(mut article) = txn.article(article_id) {
                    article.author_name = user.name.clone();
                    txn.put_article(article);
                }
            }
        }
        if let Some(email) = &new_email {
            user.email = email.clone();
        }
        if let Some(signature) = &update.signature {
            user.signature = signature.trim().to_string();
        }
        if let Some(hash) = &update.password_hash {
            user.password_hash = hash.clone();
        }
        user.updated_at = Utc::now();
        txn.put_user(user.clone());
        Ok(user)
    })
}

/// Delete an account and everything hanging off it
///
/// Authored articles go down with their comments and like edges; likes the
/// user placed elsewhere are withdrawn; an admin grant, open sessions and the
/// inbox are removed as well.
pub fn delete_user(store: &EntityStore, id: &str) -> Result<()> {
    let user_id = DocId::parse(id)?;
    let removed_articles = store.with_txn(|txn| {
        let user = txn
            .user(user_id)
            .ok_or(Error::not_found("user", user_id))?;

        let mut removed = Vec::new();
        for article_id in &user.articles {
            if let Some(article) = txn.article(*article_id) {
                remove_article(txn, &article);
                removed.push(*article_id);
            }
        }
        // likes placed on other authors' articles; own ones read as deleted
        // by now and are skipped
        for article_id in &user.likes {
            if let Some(mut article) = txn.article(*article_id) {
                article.likes = article.likes.saturating_sub(1);
                txn.put_article(article);
            }
        }
        if let Some(grant_id) = store.admin_id_for_user(&user_id) {
            if txn.admin(grant_id).is_some() {
                txn.delete_admin(grant_id);
            }
        }
        txn.delete_user(user_id);
        Ok(removed)
    })?;

    store.sessions().retain(|_, session| session.user_id != user_id);
    store.single_write(|_| {
        store.messages().remove_matching(|m| {
            m.user_id == user_id
                || m.from_user_id == user_id
                || removed_articles.contains(&m.article_id)
        })
    });
    Ok(())
}

/// Page through users, optionally filtered by a name/email substring
pub fn list_users(store: &EntityStore, opts: &UserListOptions) -> UserPage {
    let needle = opts
        .search
        .as_ref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let mut users = store.users().filter(|u| match &needle {
        Some(n) => u.name.to_lowercase().contains(n) || u.email.contains(n),
        None => true,
    });
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = users.len();
    UserPage {
        users: users.into_iter().skip(opts.skip).take(opts.limit).collect(),
        total,
    }
}

/// Most recently active accounts, for the admin dashboard
pub fn recently_updated_users(store: &EntityStore, limit: usize) -> Vec<User> {
    let mut users = store.users().filter(|_| true);
    users.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    users.truncate(limit);
    users
}
