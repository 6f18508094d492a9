//! Session lifecycle
//!
//! Sessions never participate in transactions: each operation touches one
//! entry of the session map. The user snapshot on a session is captured at
//! login and deliberately left stale afterwards; [`find_session`] only
//! checks that the account still exists, it does not refresh the snapshot.

use chrono::{Duration, Utc};
use synapse_core::{DocId, Error, Result, Session, SessionConfig, SessionToken, SessionUser};
use synapse_store::EntityStore;
use tracing::debug;

/// Open a session for a user, snapshotting their current profile
pub fn create_session(
    store: &EntityStore,
    user_id: &str,
    config: &SessionConfig,
) -> Result<Session> {
    let user_id = DocId::parse(user_id)?;
    let user = store
        .users()
        .value(&user_id)
        .ok_or(Error::not_found("user", user_id))?;

    let session = Session {
        token: SessionToken::generate(),
        user_id,
        user: SessionUser::from(&user),
        expires_at: Utc::now() + Duration::seconds(config.lifetime.as_secs() as i64),
    };
    store.sessions().insert(session.token.clone(), session.clone());
    Ok(session)
}

/// Resolve a token, lazily dropping expired and orphaned sessions
///
/// A session whose user has since been deleted is treated the same as an
/// expired one: removed on sight, reported as absent.
pub fn find_session(store: &EntityStore, token: &str) -> Option<Session> {
    let key = SessionToken::from(token);
    let session = store.sessions().get(&key)?.clone();
    if session.is_expired(Utc::now()) {
        debug!(user = %session.user_id, "dropping expired session");
        store.sessions().remove(&key);
        return None;
    }
    if !store.users().contains(&session.user_id) {
        debug!(user = %session.user_id, "dropping orphaned session");
        store.sessions().remove(&key);
        return None;
    }
    Some(session)
}

/// Log a session out; true when the token existed
pub fn delete_session(store: &EntityStore, token: &str) -> bool {
    store.sessions().remove(&SessionToken::from(token)).is_some()
}

/// Sweep every expired session; returns how many were dropped
pub fn purge_expired_sessions(store: &EntityStore) -> usize {
    let now = Utc::now();
    let before = store.sessions().len();
    store.sessions().retain(|_, session| !session.is_expired(now));
    before - store.sessions().len()
}
