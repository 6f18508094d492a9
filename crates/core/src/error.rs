//! Error types for the content core
//!
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations. Every public operation returns [`Result`] rather than
//! panicking; the only place an error is deliberately coarse is
//! [`Error::Transaction`], which wraps infrastructure failures inside a unit
//! of work. Business-rule failures raised inside a transaction body (missing
//! author, duplicate email, ...) keep their own variant so callers can react
//! without parsing messages.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the content-consistency and search core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Caller supplied an identifier that does not parse
    #[error("invalid id format: '{id}'")]
    InvalidIdFormat {
        /// The raw string the caller supplied
        id: String,
    },

    /// Target entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Collection-level name of what was looked up
        entity: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// Input content was rejected before touching the store
    #[error("validation failed: {0}")]
    Validation(String),

    /// Email uniqueness conflict on user create or profile update
    #[error("email already in use: {0}")]
    EmailExists(String),

    /// The user already holds an admin grant
    #[error("admin grant already exists for user {user_id}")]
    AdminExists {
        /// User that already has a grant
        user_id: String,
    },

    /// A unit of work failed for a reason not attributable to its inputs
    ///
    /// Retry-unsafe for callers unless they can re-derive the precondition
    /// that failed.
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// Commit-time version conflict, internal to the coordinator
    ///
    /// Never escapes `with_txn`: conflicts drive the retry loop and collapse
    /// to [`Error::Transaction`] once retries are exhausted.
    #[error("transaction conflict on {key}")]
    TxnConflict {
        /// Human-readable key of the conflicting document
        key: String,
    },

    /// Infrastructure-level store failure
    #[error("store error: {0}")]
    Store(String),
}

impl Error {
    /// Shorthand for a typed not-found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable error code for the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidIdFormat { .. } => "INVALID_ID_FORMAT",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::EmailExists(_) => "EMAIL_EXISTS",
            Error::AdminExists { .. } => "ADMIN_EXISTS",
            Error::Transaction(_) | Error::TxnConflict { .. } => "TRANSACTION_ERROR",
            Error::Store(_) => "DB_ERROR",
        }
    }

    /// Whether this error is a commit-time conflict worth retrying
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::TxnConflict { .. })
    }
}
