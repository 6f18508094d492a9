//! Document and session identifiers
//!
//! Every document in the entity store is keyed by a [`DocId`], a UUID that
//! is opaque to callers. Public operations accept ids as strings (they arrive
//! from an HTTP layer) and parse them up front so a malformed id is reported
//! as `INVALID_ID_FORMAT` before any store access happens.
//!
//! Sessions are keyed by a [`SessionToken`], which is deliberately not a
//! `DocId`: the token is a bearer credential, never derived from the user's
//! identity.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a stored document (user, article, comment, message, admin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(Uuid);

impl DocId {
    /// Mint a fresh random identifier
    pub fn new() -> Self {
        DocId(Uuid::new_v4())
    }

    /// Parse an identifier received from an external caller
    ///
    /// Returns [`Error::InvalidIdFormat`] when the string is not a valid id.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Uuid::parse_str(raw)
            .map(DocId)
            .map_err(|_| Error::InvalidIdFormat {
                id: raw.to_string(),
            })
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DocId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Opaque session token handed to clients at login
///
/// Stored as a string so the transport layer can round-trip it through a
/// cookie without caring about its internal shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        SessionToken(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(raw: String) -> Self {
        SessionToken(raw)
    }
}

impl From<&str> for SessionToken {
    fn from(raw: &str) -> Self {
        SessionToken(raw.to_string())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
