//! The entity store: one handle over every collection
//!
//! The store is an explicitly constructed, injectable handle — callers build
//! one at startup (usually behind an `Arc`) and pass it to whatever needs
//! data access. There is no process-global instance.
//!
//! Uniqueness that the collections themselves cannot express lives here as
//! side indexes: the lowercase-email index on users and the one-grant-per-user
//! index on admins. Both are validated and maintained inside the commit
//! critical section, so they can never drift from the primary collections.

use crate::collection::Collection;
use crate::doc::{DocKey, Space};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use synapse_core::{Admin, Article, Comment, DocId, Message, Session, SessionToken, TxnConfig, User};

/// Shared handle over the platform's collections
pub struct EntityStore {
    pub(crate) users: Collection<User>,
    pub(crate) articles: Collection<Article>,
    pub(crate) comments: Collection<Comment>,
    pub(crate) messages: Collection<Message>,
    pub(crate) admins: Collection<Admin>,

    /// Sessions are keyed by opaque token and never transactional
    sessions: DashMap<SessionToken, Session>,

    /// Unique index: normalized email -> user id
    pub(crate) email_index: RwLock<HashMap<String, DocId>>,
    /// Unique index: user id -> admin grant id
    pub(crate) admin_user_index: RwLock<HashMap<DocId, DocId>>,

    /// Serializes commit validation+apply and single-document writes
    pub(crate) commit_lock: Mutex<()>,
    /// Global commit version; each committed unit of work takes the next one
    version: AtomicU64,
    next_txn_id: AtomicU64,
    pub(crate) txn_config: TxnConfig,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::with_txn_config(TxnConfig::default())
    }

    pub fn with_txn_config(txn_config: TxnConfig) -> Self {
        EntityStore {
            users: Collection::new(),
            articles: Collection::new(),
            comments: Collection::new(),
            messages: Collection::new(),
            admins: Collection::new(),
            sessions: DashMap::new(),
            email_index: RwLock::new(HashMap::new()),
            admin_user_index: RwLock::new(HashMap::new()),
            commit_lock: Mutex::new(()),
            version: AtomicU64::new(0),
            next_txn_id: AtomicU64::new(0),
            txn_config,
        }
    }

    // === Collection access (committed state) ===

    pub fn users(&self) -> &Collection<User> {
        &self.users
    }

    pub fn articles(&self) -> &Collection<Article> {
        &self.articles
    }

    pub fn comments(&self) -> &Collection<Comment> {
        &self.comments
    }

    pub fn messages(&self) -> &Collection<Message> {
        &self.messages
    }

    pub fn admins(&self) -> &Collection<Admin> {
        &self.admins
    }

    pub fn sessions(&self) -> &DashMap<SessionToken, Session> {
        &self.sessions
    }

    // === Indexes ===

    /// Resolve a normalized email through the unique index
    pub fn user_id_by_email(&self, normalized_email: &str) -> Option<DocId> {
        self.email_index.read().get(normalized_email).copied()
    }

    /// Admin grant id for a user, if one exists
    pub fn admin_id_for_user(&self, user_id: &DocId) -> Option<DocId> {
        self.admin_user_index.read().get(user_id).copied()
    }

    // === Versioning ===

    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub(crate) fn allocate_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn next_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Current version of a document in any transactional collection
    pub(crate) fn version_of(&self, key: &DocKey) -> u64 {
        match key.space {
            Space::Users => self.users.version_of(&key.id),
            Space::Articles => self.articles.version_of(&key.id),
            Space::Comments => self.comments.version_of(&key.id),
            Space::Messages => self.messages.version_of(&key.id),
            Space::Admins => self.admins.version_of(&key.id),
        }
    }

    /// Run a single-collection, single-step write outside the transaction
    /// path
    ///
    /// Takes the commit lock so the write cannot interleave with a committing
    /// transaction, and hands the closure a freshly allocated version to
    /// stamp on whatever it touches.
    pub fn single_write<T>(&self, f: impl FnOnce(u64) -> T) -> T {
        let _guard = self.commit_lock.lock();
        let version = self.allocate_version();
        f(version)
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: DocId::new(),
            name: "n".into(),
            email: email.into(),
            password_hash: "h".into(),
            signature: String::new(),
            articles: vec![],
            likes: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fresh_store_is_empty() {
        let store = EntityStore::new();
        assert_eq!(store.current_version(), 0);
        assert!(store.users().is_empty());
        assert!(store.sessions().is_empty());
        assert_eq!(store.user_id_by_email("a@b.c"), None);
    }

    #[test]
    fn single_write_allocates_monotonic_versions() {
        let store = EntityStore::new();
        let v1 = store.single_write(|v| v);
        let v2 = store.single_write(|v| v);
        assert!(v2 > v1);
        assert_eq!(store.current_version(), v2);
    }

    #[test]
    fn version_of_dispatches_per_space() {
        let store = EntityStore::new();
        let u = user("a@b.c");
        let id = u.id;
        store.users.apply_put(id, u, 3);
        assert_eq!(store.version_of(&DocKey::new(Space::Users, id)), 3);
        assert_eq!(store.version_of(&DocKey::new(Space::Articles, id)), 0);
    }
}
