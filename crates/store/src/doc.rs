//! Typed document keys for the transactional collections
//!
//! Transactions operate across heterogeneous collections, so read and write
//! sets are keyed by `(collection, id)` pairs and buffered values are carried
//! in a closed [`Doc`] enum. Sessions are absent on purpose: session upkeep
//! is single-document and never transactional.

use synapse_core::{Admin, Article, Comment, DocId, Message, User};

/// Transactional collection discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Space {
    Users,
    Articles,
    Comments,
    Messages,
    Admins,
}

impl Space {
    pub fn name(self) -> &'static str {
        match self {
            Space::Users => "users",
            Space::Articles => "articles",
            Space::Comments => "comments",
            Space::Messages => "messages",
            Space::Admins => "admins",
        }
    }
}

/// Key of a document within the transactional collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocKey {
    pub space: Space,
    pub id: DocId,
}

impl DocKey {
    pub fn new(space: Space, id: DocId) -> Self {
        DocKey { space, id }
    }

    /// `"space/id"` rendering for logs and conflict reports
    pub fn render(&self) -> String {
        format!("{}/{}", self.space.name(), self.id)
    }
}

/// A buffered document value, tagged with its collection
#[derive(Debug, Clone)]
pub enum Doc {
    User(User),
    Article(Article),
    Comment(Comment),
    Message(Message),
    Admin(Admin),
}

impl Doc {
    pub fn space(&self) -> Space {
        match self {
            Doc::User(_) => Space::Users,
            Doc::Article(_) => Space::Articles,
            Doc::Comment(_) => Space::Comments,
            Doc::Message(_) => Space::Messages,
            Doc::Admin(_) => Space::Admins,
        }
    }

    pub fn id(&self) -> DocId {
        match self {
            Doc::User(u) => u.id,
            Doc::Article(a) => a.id,
            Doc::Comment(c) => c.id,
            Doc::Message(m) => m.id,
            Doc::Admin(a) => a.id,
        }
    }

    /// Key this document lives under
    pub fn key(&self) -> DocKey {
        DocKey::new(self.space(), self.id())
    }
}
