//! Transaction context
//!
//! Tracks every read and buffers every write a unit of work performs, so the
//! coordinator can validate and apply the whole batch atomically at commit.
//!
//! ## Read-your-writes
//!
//! Reads check the buffered write set first: a document written earlier in
//! the same transaction is returned as written, a document deleted earlier
//! reads as absent, and neither touches the read set. Only reads that fall
//! through to committed state record a `(key, version)` pair for commit-time
//! validation — version 0 when the document was absent, so a concurrent
//! insert of the same key is still detected as a conflict.

use crate::doc::{Doc, DocKey, Space};
use crate::store::EntityStore;
use rustc_hash::FxHashMap;
use synapse_core::{Admin, Article, Comment, DocId, Message, User};

/// A buffered effect awaiting commit
#[derive(Debug, Clone)]
pub(crate) enum Pending {
    Put(Doc),
    Delete,
}

/// Context handed to the closure of [`EntityStore::with_txn`]
pub struct Txn<'s> {
    store: &'s EntityStore,
    #[allow(dead_code)]
    txn_id: u64,
    /// Committed-state reads and the versions they observed
    pub(crate) read_set: FxHashMap<DocKey, u64>,
    /// Buffered puts and deletes, invisible until commit
    pub(crate) writes: FxHashMap<DocKey, Pending>,
}

macro_rules! typed_read {
    ($fn_name:ident, $ty:ty, $space:expr, $variant:ident, $coll:ident) => {
        /// Read one document, seeing this transaction's own buffered writes
        pub fn $fn_name(&mut self, id: DocId) -> Option<$ty> {
            let key = DocKey::new($space, id);
            match self.writes.get(&key) {
                Some(Pending::Put(Doc::$variant(value))) => return Some(value.clone()),
                Some(Pending::Delete) => return None,
                // A write under this key can only carry this space's variant
                Some(Pending::Put(_)) => return None,
                None => {}
            }
            match self.store.$coll().get(&id) {
                Some(stored) => {
                    self.read_set.insert(key, stored.version);
                    Some(stored.value)
                }
                None => {
                    self.read_set.insert(key, 0);
                    None
                }
            }
        }
    };
}

impl<'s> Txn<'s> {
    pub(crate) fn new(store: &'s EntityStore, txn_id: u64) -> Self {
        Txn {
            store,
            txn_id,
            read_set: FxHashMap::default(),
            writes: FxHashMap::default(),
        }
    }

    // === Reads ===

    typed_read!(user, User, Space::Users, User, users);
    typed_read!(article, Article, Space::Articles, Article, articles);
    typed_read!(comment, Comment, Space::Comments, Comment, comments);
    typed_read!(admin, Admin, Space::Admins, Admin, admins);

    /// Every user whose `likes` set contains `article_id`
    ///
    /// Matches from committed state record their read versions. Documents
    /// that do not match are not tracked: any concurrent mutation that could
    /// newly produce a match also writes the article document itself, which
    /// callers of this scan have already read into the read set.
    pub fn users_liking(&mut self, article_id: DocId) -> Vec<User> {
        self.scan_users(|u| u.likes.contains(&article_id))
    }

    /// Every comment whose parent is `article_id`, same tracking rules as
    /// [`Txn::users_liking`]
    pub fn comments_of(&mut self, article_id: DocId) -> Vec<Comment> {
        let committed = self
            .store
            .comments()
            .filter_stored(|c| c.article_id == article_id);
        let mut out = Vec::new();
        let mut seen = Vec::new();
        for stored in committed {
            let key = DocKey::new(Space::Comments, stored.value.id);
            seen.push(stored.value.id);
            match self.writes.get(&key) {
                Some(Pending::Delete) | Some(Pending::Put(_)) => {}
                None => {
                    self.read_set.insert(key, stored.version);
                    out.push(stored.value);
                }
            }
        }
        for pending in self.writes.values() {
            if let Pending::Put(Doc::Comment(c)) = pending {
                if c.article_id == article_id && !seen.contains(&c.id) {
                    out.push(c.clone());
                }
            }
        }
        out
    }

    fn scan_users(&mut self, pred: impl Fn(&User) -> bool) -> Vec<User> {
        let committed = self.store.users().filter_stored(|u| pred(u));
        let mut out = Vec::new();
        let mut seen = Vec::new();
        for stored in committed {
            let key = DocKey::new(Space::Users, stored.value.id);
            seen.push(stored.value.id);
            match self.writes.get(&key) {
                Some(Pending::Delete) => {}
                Some(Pending::Put(Doc::User(u))) => {
                    if pred(u) {
                        out.push(u.clone());
                    }
                }
                Some(Pending::Put(_)) => {}
                None => {
                    self.read_set.insert(key, stored.version);
                    out.push(stored.value);
                }
            }
        }
        for pending in self.writes.values() {
            if let Pending::Put(Doc::User(u)) = pending {
                if pred(u) && !seen.contains(&u.id) {
                    out.push(u.clone());
                }
            }
        }
        out
    }

    // === Writes (buffered) ===

    pub fn put_user(&mut self, user: User) {
        self.put(Doc::User(user));
    }

    pub fn put_article(&mut self, article: Article) {
        self.put(Doc::Article(article));
    }

    pub fn put_comment(&mut self, comment: Comment) {
        self.put(Doc::Comment(comment));
    }

    pub fn put_message(&mut self, message: Message) {
        self.put(Doc::Message(message));
    }

    pub fn put_admin(&mut self, admin: Admin) {
        self.put(Doc::Admin(admin));
    }

    fn put(&mut self, doc: Doc) {
        self.writes.insert(doc.key(), Pending::Put(doc));
    }

    pub fn delete_user(&mut self, id: DocId) {
        self.writes
            .insert(DocKey::new(Space::Users, id), Pending::Delete);
    }

    pub fn delete_article(&mut self, id: DocId) {
        self.writes
            .insert(DocKey::new(Space::Articles, id), Pending::Delete);
    }

    pub fn delete_comment(&mut self, id: DocId) {
        self.writes
            .insert(DocKey::new(Space::Comments, id), Pending::Delete);
    }

    pub fn delete_admin(&mut self, id: DocId) {
        self.writes
            .insert(DocKey::new(Space::Admins, id), Pending::Delete);
    }

    /// Number of buffered effects
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    pub(crate) fn into_writes(self) -> FxHashMap<DocKey, Pending> {
        self.writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use synapse_core::ArticleStatus;

    fn store_with_user(email: &str) -> (EntityStore, DocId) {
        let store = EntityStore::new();
        let now = Utc::now();
        let user = User {
            id: DocId::new(),
            name: "Ada".into(),
            email: email.into(),
            password_hash: "h".into(),
            signature: String::new(),
            articles: vec![],
            likes: vec![],
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        store.users().apply_put(id, user, 1);
        (store, id)
    }

    #[test]
    fn committed_read_records_version() {
        let (store, id) = store_with_user("a@b.c");
        let mut txn = Txn::new(&store, 0);
        assert!(txn.user(id).is_some());
        assert_eq!(txn.read_set.get(&DocKey::new(Space::Users, id)), Some(&1));
    }

    #[test]
    fn missing_read_records_version_zero() {
        let store = EntityStore::new();
        let mut txn = Txn::new(&store, 0);
        let ghost = DocId::new();
        assert!(txn.article(ghost).is_none());
        assert_eq!(
            txn.read_set.get(&DocKey::new(Space::Articles, ghost)),
            Some(&0)
        );
    }

    #[test]
    fn read_your_writes() {
        let (store, id) = store_with_user("a@b.c");
        let mut txn = Txn::new(&store, 0);
        let mut user = txn.user(id).unwrap();
        user.name = "Grace".into();
        txn.put_user(user);
        assert_eq!(txn.user(id).unwrap().name, "Grace");
        // committed state untouched until commit
        assert_eq!(store.users().value(&id).unwrap().name, "Ada");
    }

    #[test]
    fn read_your_deletes() {
        let (store, id) = store_with_user("a@b.c");
        let mut txn = Txn::new(&store, 0);
        txn.delete_user(id);
        assert!(txn.user(id).is_none());
        assert!(store.users().contains(&id));
    }

    #[test]
    fn users_liking_sees_overlay() {
        let (store, id) = store_with_user("a@b.c");
        let article_id = DocId::new();
        let mut txn = Txn::new(&store, 0);

        // no likers yet
        assert!(txn.users_liking(article_id).is_empty());

        // a buffered write that adds the like is visible to the scan
        let mut user = txn.user(id).unwrap();
        user.likes.push(article_id);
        txn.put_user(user);
        let likers = txn.users_liking(article_id);
        assert_eq!(likers.len(), 1);
        assert_eq!(likers[0].id, id);
    }

    #[test]
    fn comments_of_skips_buffered_deletes() {
        let store = EntityStore::new();
        let article_id = DocId::new();
        let now = Utc::now();
        let comment = Comment {
            id: DocId::new(),
            article_id,
            author_id: DocId::new(),
            author_name: "Ada".into(),
            content: "hi".into(),
            created_at: now,
        };
        let comment_id = comment.id;
        store.comments().apply_put(comment_id, comment, 1);

        let mut txn = Txn::new(&store, 0);
        assert_eq!(txn.comments_of(article_id).len(), 1);
        txn.delete_comment(comment_id);
        assert!(txn.comments_of(article_id).is_empty());
    }

    #[test]
    fn puts_are_buffered_not_applied() {
        let store = EntityStore::new();
        let now = Utc::now();
        let article = Article {
            id: DocId::new(),
            title: "t".into(),
            summary: "s".into(),
            tags: vec![],
            author_id: DocId::new(),
            author_name: "Ada".into(),
            body: "b".into(),
            status: ArticleStatus::Draft,
            likes: 0,
            comments: vec![],
            created_at: now,
            updated_at: now,
        };
        let id = article.id;
        let mut txn = Txn::new(&store, 0);
        txn.put_article(article);
        assert_eq!(txn.pending_writes(), 1);
        assert!(!store.articles().contains(&id));
    }
}
