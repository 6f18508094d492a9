//! Versioned in-memory collection
//!
//! Each document carries the commit version that last wrote it; version 0
//! means "absent" and is what transactions record when they read a missing
//! key, so a later insert of that key is detected as a conflict.
//!
//! The `apply_*` and `mutate_*` methods do not allocate versions themselves;
//! callers (the commit path and [`crate::store::EntityStore::single_write`])
//! pass the version in, which keeps the global version counter in one place.

use parking_lot::RwLock;
use std::collections::HashMap;
use synapse_core::DocId;

/// A stored document plus the commit version that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub value: T,
    pub version: u64,
}

/// Thread-safe map of documents keyed by [`DocId`]
#[derive(Debug)]
pub struct Collection<T: Clone> {
    docs: RwLock<HashMap<DocId, Stored<T>>>,
}

impl<T: Clone> Collection<T> {
    pub fn new() -> Self {
        Collection {
            docs: RwLock::new(HashMap::new()),
        }
    }

    /// Committed value and version for a document
    pub fn get(&self, id: &DocId) -> Option<Stored<T>> {
        self.docs.read().get(id).cloned()
    }

    /// Committed value for a document
    pub fn value(&self, id: &DocId) -> Option<T> {
        self.docs.read().get(id).map(|s| s.value.clone())
    }

    /// Current version of a document, 0 when absent
    pub fn version_of(&self, id: &DocId) -> u64 {
        self.docs.read().get(id).map_or(0, |s| s.version)
    }

    pub fn contains(&self, id: &DocId) -> bool {
        self.docs.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Clone out every document matching `pred`
    pub fn filter<P>(&self, pred: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut pred = pred;
        self.docs
            .read()
            .values()
            .filter(|s| pred(&s.value))
            .map(|s| s.value.clone())
            .collect()
    }

    /// Clone out every matching document together with its version
    ///
    /// Transactions use this to record read versions for scanned documents.
    pub fn filter_stored<P>(&self, pred: P) -> Vec<Stored<T>>
    where
        P: FnMut(&T) -> bool,
    {
        let mut pred = pred;
        self.docs
            .read()
            .values()
            .filter(|s| pred(&s.value))
            .cloned()
            .collect()
    }

    /// Count documents matching `pred` without cloning
    pub fn count_matching<P>(&self, pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let mut pred = pred;
        self.docs.read().values().filter(|s| pred(&s.value)).count()
    }

    /// Insert or replace a document at `version`
    pub fn apply_put(&self, id: DocId, value: T, version: u64) {
        self.docs.write().insert(id, Stored { value, version });
    }

    /// Remove a document; reports whether it existed
    pub fn apply_delete(&self, id: &DocId) -> bool {
        self.docs.write().remove(id).is_some()
    }

    /// In-place update of one document at `version`; false when absent
    pub fn mutate<F>(&self, id: &DocId, version: u64, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut docs = self.docs.write();
        match docs.get_mut(id) {
            Some(stored) => {
                f(&mut stored.value);
                stored.version = version;
                true
            }
            None => false,
        }
    }

    /// In-place update of every document matching `pred`; returns the count
    pub fn mutate_matching<P, F>(&self, pred: P, version: u64, f: F) -> usize
    where
        P: Fn(&T) -> bool,
        F: Fn(&mut T),
    {
        let mut docs = self.docs.write();
        let mut touched = 0;
        for stored in docs.values_mut() {
            if pred(&stored.value) {
                f(&mut stored.value);
                stored.version = version;
                touched += 1;
            }
        }
        touched
    }

    /// Remove every document matching `pred`; returns the count
    pub fn remove_matching<P>(&self, pred: P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        let mut docs = self.docs.write();
        let before = docs.len();
        docs.retain(|_, stored| !pred(&stored.value));
        before - docs.len()
    }
}

impl<T: Clone> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}
