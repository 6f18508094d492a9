//! Core types for the Synapse content platform
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace: document identifiers, the document schemas for the collections
//! (users, articles, comments, sessions, messages, admins), the error
//! taxonomy, and tuning constants.
//!
//! Nothing in here touches storage; the entity store and transaction
//! coordinator live in `synapse-store`.

pub mod config;
pub mod error;
pub mod id;
pub mod types;

pub use config::{SearchTuning, SessionConfig, TxnConfig};
pub use error::{Error, Result};
pub use id::{DocId, SessionToken};
pub use types::{
    Admin, Article, ArticleStatus, ArticleView, Comment, Message, MessageKind, Session,
    SessionUser, StatusFilter, User,
};
