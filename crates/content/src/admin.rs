//! Admin grants
//!
//! A grant ties one user to an admin role; `priority` 0 is the super admin,
//! 1 a regular admin. At most one grant per user, enforced by the commit path
//! against the grant index.

use chrono::Utc;
use synapse_core::{Admin, DocId, Error, Result};
use synapse_store::EntityStore;
use tracing::warn;

/// Grant admin rights to an existing user
pub fn create_admin(store: &EntityStore, user_id: &str, priority: u8) -> Result<Admin> {
    let user_id = DocId::parse(user_id)?;
    store.with_txn(|txn| {
        if txn.user(user_id).is_none() {
            return Err(Error::not_found("user", user_id));
        }
        // fast path; the commit re-checks under the lock
        if store.admin_id_for_user(&user_id).is_some() {
            return Err(Error::AdminExists {
                user_id: user_id.to_string(),
            });
        }
        let now = Utc::now();
        let admin = Admin {
            id: DocId::new(),
            user_id,
            priority,
            created_at: now,
            updated_at: now,
        };
        txn.put_admin(admin.clone());
        Ok(admin)
    })
}

/// The grant held by a user, if any
pub fn admin_for_user(store: &EntityStore, user_id: &str) -> Result<Option<Admin>> {
    let user_id = DocId::parse(user_id)?;
    Ok(store
        .admin_id_for_user(&user_id)
        .and_then(|id| store.admins().value(&id)))
}

/// Every grant, super admin first, then by grant age
pub fn list_admins(store: &EntityStore) -> Vec<Admin> {
    let mut admins = store.admins().filter(|_| true);
    admins.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    admins
}

/// Seed grants from a list of account emails at startup
///
/// The first email becomes the super admin, the rest regular admins.
/// Addresses without an account and accounts that already hold a grant are
/// skipped with a warning rather than failing the whole bootstrap.
pub fn initialize_admins(store: &EntityStore, emails: &[String]) -> Vec<Admin> {
    let mut granted = Vec::new();
    for (n, email) in emails.iter().enumerate() {
        let email = email.trim().to_lowercase();
        let Some(user_id) = store.user_id_by_email(&email) else {
            warn!(%email, "admin bootstrap: no account for address, skipping");
            continue;
        };
        let priority = if n == 0 { 0 } else { 1 };
        match create_admin(store, &user_id.to_string(), priority) {
            Ok(admin) => granted.push(admin),
            Err(Error::AdminExists { .. }) => {}
            Err(e) => warn!(%email, error = %e, "admin bootstrap: grant failed"),
        }
    }
    granted
}
