//! Transaction coordinator: validate, commit, retry
//!
//! Commit protocol, all under the store's commit lock:
//!
//! 1. Validate the read set — every committed document the closure read must
//!    still be at the version it observed (first-committer-wins).
//! 2. Validate uniqueness constraints (user email, one admin grant per user)
//!    against the side indexes.
//! 3. Allocate one commit version and apply every buffered put/delete with
//!    it, maintaining the side indexes in the same critical section.
//!
//! Readers outside the lock only ever see the store before or after the
//! whole batch. A validation conflict re-runs the closure from scratch
//! (bounded by [`synapse_core::TxnConfig`]); the closure's own errors abort
//! immediately with zero visible effects and keep their typed variant, so
//! only conflict exhaustion and infrastructure failures surface as the
//! coarse `TRANSACTION_ERROR`.

use crate::doc::{Doc, DocKey, Space};
use crate::store::EntityStore;
use crate::txn::{Pending, Txn};
use synapse_core::{Error, Result};
use tracing::debug;

impl EntityStore {
    /// Execute a unit of work atomically
    ///
    /// The closure may run more than once: it is re-executed after a
    /// commit-time conflict, so it must derive everything from the `Txn` it
    /// is handed rather than from captured mutable state.
    pub fn with_txn<T>(&self, f: impl Fn(&mut Txn<'_>) -> Result<T>) -> Result<T> {
        let cfg = self.txn_config;
        let mut attempt: u32 = 0;
        loop {
            let mut txn = Txn::new(self, self.next_txn_id());
            match f(&mut txn) {
                Ok(value) => match self.commit(txn) {
                    Ok(()) => return Ok(value),
                    Err(e) if e.is_conflict() && attempt < cfg.max_retries => {
                        debug!(attempt, error = %e, "commit conflict, retrying unit of work");
                        std::thread::sleep(cfg.delay_for(attempt));
                        attempt += 1;
                    }
                    Err(e) if e.is_conflict() => {
                        return Err(Error::Transaction(format!(
                            "conflict retries exhausted after {} attempts: {e}",
                            attempt + 1
                        )));
                    }
                    Err(e) => return Err(e),
                },
                // Closure failure aborts the unit of work; the buffered
                // effects are dropped with the context and nothing became
                // visible to any reader.
                Err(e) => return Err(e),
            }
        }
    }

    /// Validate and apply a transaction's buffered effects
    fn commit(&self, txn: Txn<'_>) -> Result<()> {
        let _guard = self.commit_lock.lock();

        for (key, read_version) in &txn.read_set {
            let current = self.version_of(key);
            if current != *read_version {
                return Err(Error::TxnConflict { key: key.render() });
            }
        }

        self.validate_unique(&txn)?;

        let commit_version = self.allocate_version();
        for (key, pending) in txn.into_writes() {
            match pending {
                Pending::Put(doc) => self.apply_put(doc, commit_version),
                Pending::Delete => self.apply_delete(&key),
            }
        }
        Ok(())
    }

    /// Uniqueness checks that the primary collections cannot express
    fn validate_unique(&self, txn: &Txn<'_>) -> Result<()> {
        let email_index = self.email_index.read();
        let admin_index = self.admin_user_index.read();
        for pending in txn.writes.values() {
            match pending {
                Pending::Put(Doc::User(user)) => {
                    if let Some(holder) = email_index.get(&user.email) {
                        if *holder != user.id {
                            return Err(Error::EmailExists(user.email.clone()));
                        }
                    }
                }
                Pending::Put(Doc::Admin(admin)) => {
                    if let Some(holder) = admin_index.get(&admin.user_id) {
                        if *holder != admin.id {
                            return Err(Error::AdminExists {
                                user_id: admin.user_id.to_string(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn apply_put(&self, doc: Doc, version: u64) {
        match doc {
            Doc::User(user) => {
                let mut index = self.email_index.write();
                if let Some(prev) = self.users.get(&user.id) {
                    if prev.value.email != user.email {
                        index.remove(&prev.value.email);
                    }
                }
                index.insert(user.email.clone(), user.id);
                drop(index);
                self.users.apply_put(user.id, user, version);
            }
            Doc::Article(article) => self.articles.apply_put(article.id, article, version),
            Doc::Comment(comment) => self.comments.apply_put(comment.id, comment, version),
            Doc::Message(message) => self.messages.apply_put(message.id, message, version),
            Doc::Admin(admin) => {
                self.admin_user_index
                    .write()
                    .insert(admin.user_id, admin.id);
                self.admins.apply_put(admin.id, admin, version);
            }
        }
    }

    fn apply_delete(&self, key: &DocKey) {
        match key.space {
            Space::Users => {
                if let Some(prev) = self.users.get(&key.id) {
                    self.email_index.write().remove(&prev.value.email);
                }
                self.users.apply_delete(&key.id);
            }
            Space::Articles => {
                self.articles.apply_delete(&key.id);
            }
            Space::Comments => {
                self.comments.apply_delete(&key.id);
            }
            Space::Messages => {
                self.messages.apply_delete(&key.id);
            }
            Space::Admins => {
                if let Some(prev) = self.admins.get(&key.id) {
                    self.admin_user_index.write().remove(&prev.value.user_id);
                }
                self.admins.apply_delete(&key.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use synapse_core::{DocId, User};

    fn new_user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: DocId::new(),
            name: "Ada".into(),
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
    fn commit_applies_all_effects_at_one_version() {
        let store = EntityStore::new();
        let a = new_user("a@example.com");
        let b = new_user("b@example.com");
        let (a_id, b_id) = (a.id, b.id);

        store
            .with_txn(|txn| {
                txn.put_user(a.clone());
                txn.put_user(b.clone());
                Ok(())
            })
            .unwrap();

        let va = store.users().version_of(&a_id);
        let vb = store.users().version_of(&b_id);
        assert_eq!(va, vb);
        assert!(va > 0);
        assert_eq!(store.user_id_by_email("a@example.com"), Some(a_id));
    }

    #[test]
    fn closure_error_leaves_no_effects() {
        let store = EntityStore::new();
        let user = new_user("a@example.com");
        let id = user.id;

        let err = store
            .with_txn(|txn| -> Result<()> {
                txn.put_user(user.clone());
                Err(Error::not_found("article", "missing"))
            })
            .unwrap_err();

        assert_eq!(err.code(), "NOT_FOUND");
        assert!(!store.users().contains(&id));
        assert_eq!(store.user_id_by_email("a@example.com"), None);
        assert_eq!(store.current_version(), 0);
    }

    #[test]
    fn duplicate_email_rejected_at_commit() {
        let store = EntityStore::new();
        let first = new_user("same@example.com");
        store
            .with_txn(|txn| {
                txn.put_user(first.clone());
                Ok(())
            })
            .unwrap();

        let second = new_user("same@example.com");
        let err = store
            .with_txn(|txn| {
                txn.put_user(second.clone());
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err.code(), "EMAIL_EXISTS");
        assert!(!store.users().contains(&second.id));
    }

    #[test]
    fn email_index_follows_updates_and_deletes() {
        let store = EntityStore::new();
        let mut user = new_user("old@example.com");
        let id = user.id;
        store
            .with_txn(|txn| {
                txn.put_user(user.clone());
                Ok(())
            })
            .unwrap();

        user.email = "new@example.com".into();
        store
            .with_txn(|txn| {
                txn.put_user(user.clone());
                Ok(())
            })
            .unwrap();
        assert_eq!(store.user_id_by_email("old@example.com"), None);
        assert_eq!(store.user_id_by_email("new@example.com"), Some(id));

        store
            .with_txn(|txn| {
                txn.delete_user(id);
                Ok(())
            })
            .unwrap();
        assert_eq!(store.user_id_by_email("new@example.com"), None);
    }

    #[test]
    fn stale_read_conflicts_and_retries() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let store = EntityStore::new();
        let user = new_user("a@example.com");
        let id = user.id;
        store
            .with_txn(|txn| {
                txn.put_user(user.clone());
                Ok(())
            })
            .unwrap();

        // First attempt reads the user, then someone else bumps it before
        // commit; the closure must run again and succeed on fresh state.
        let attempts = AtomicU32::new(0);
        store
            .with_txn(|txn| {
                let mut u = txn.user(id).ok_or(Error::not_found("user", id))?;
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    let mut sneak = u.clone();
                    sneak.name = "Sneak".into();
                    store.single_write(|v| {
                        store.users().apply_put(id, sneak.clone(), v);
                    });
                }
                u.signature = "updated".into();
                txn.put_user(u);
                Ok(())
            })
            .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        let final_user = store.users().value(&id).unwrap();
        assert_eq!(final_user.name, "Sneak");
        assert_eq!(final_user.signature, "updated");
    }

    #[test]
    fn concurrent_counter_updates_do_not_lose_writes() {
        let store = Arc::new(EntityStore::new());
        let user = new_user("a@example.com");
        let id = user.id;
        store
            .with_txn(|txn| {
                txn.put_user(user.clone());
                Ok(())
            })
            .unwrap();

        let threads = 8;
        let mut handles = Vec::new();
        for n in 0..threads {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.with_txn(|txn| {
                    let mut u = txn.user(id).ok_or(Error::not_found("user", id))?;
                    u.likes.push(DocId::new());
                    u.signature = format!("writer-{n}");
                    txn.put_user(u);
                    Ok(())
                })
            }));
        }
        let mut committed = 0;
        for handle in handles {
            if handle.join().unwrap().is_ok() {
                committed += 1;
            }
        }
        // Every committed toggle-style read-modify-write must be reflected.
        let final_user = store.users().value(&id).unwrap();
        assert_eq!(final_user.likes.len(), committed);
        assert!(committed >= 1);
    }
}
