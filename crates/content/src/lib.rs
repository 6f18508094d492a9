//! Content graph mutators and queries
//!
//! Every write that touches more than one document goes through
//! [`synapse_store::EntityStore::with_txn`], so the denormalized edges of the
//! content graph (author article lists, like sets and counters, comment
//! attachment) move atomically. Reads are plain committed-state scans.
//!
//! Identifiers cross this boundary as strings and are parsed up front;
//! nothing here touches the store with an unvalidated id.

pub mod admin;
pub mod articles;
pub mod comments;
pub mod likes;
pub mod messages;
pub mod sessions;
pub mod stats;
pub mod users;

#[cfg(test)]
pub(crate) mod testutil;

pub use admin::{admin_for_user, create_admin, initialize_admins, list_admins};
pub use articles::{ArticleUpdate, NewArticle};
pub use likes::{LikeAction, LikeOutcome};
pub use messages::MessagePage;
pub use stats::{admin_stats, today_stats, AdminStats, TodayStats};
pub use users::{NewUser, ProfileUpdate, UserListOptions, UserPage};
