//! Entity store and transaction coordinator
//!
//! This crate owns the shared mutable state of the platform: the document
//! collections (users, articles, comments, messages, admins, sessions) and
//! the machinery that keeps cross-collection mutations atomic.
//!
//! ## Concurrency model
//!
//! Writes that touch more than one document go through optimistic
//! transactions ([`EntityStore::with_txn`]): the closure reads through a
//! version-tracked overlay, writes are buffered, and commit validates the
//! read set under a store-wide commit lock before applying anything. A
//! conflicting commit retries the whole closure. Readers outside a
//! transaction only ever observe committed state; buffered effects are
//! invisible until the commit applies them in one critical section.
//!
//! Single-document mutations (marking a message read, session upkeep) skip
//! the transaction path but still serialize against commits via
//! [`EntityStore::single_write`].

pub mod collection;
pub mod coordinator;
pub mod doc;
pub mod store;
pub mod txn;

pub use collection::{Collection, Stored};
pub use doc::{Doc, DocKey, Space};
pub use store::EntityStore;
pub use txn::Txn;
