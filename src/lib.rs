//! Synapse content core
//!
//! One facade over the workspace crates:
//!
//! - `synapse-core`: schemas, ids, errors, tuning
//! - `synapse-store`: versioned collections and the transaction coordinator
//! - `synapse-search`: two-stage article search
//! - `synapse-content`: the content graph mutators and queries
//!
//! ```
//! use synapse::content::users::{create_user, NewUser};
//! use synapse::EntityStore;
//!
//! let store = EntityStore::new();
//! let user = create_user(&store, NewUser {
//!     name: "Ada".into(),
//!     email: "ada@example.com".into(),
//!     password_hash: "not-a-real-hash".into(),
//! }).unwrap();
//! assert_eq!(store.user_id_by_email("ada@example.com"), Some(user.id));
//! ```

pub use synapse_content as content;
pub use synapse_core::{
    Admin, Article, ArticleStatus, ArticleView, Comment, DocId, Error, Message, MessageKind,
    Result, SearchTuning, Session, SessionConfig, SessionToken, SessionUser, StatusFilter,
    TxnConfig, User,
};
pub use synapse_search::{FuzzyInfo, SearchEngine, SearchField, SearchOptions, SearchOutcome};
pub use synapse_store::{EntityStore, Txn};
