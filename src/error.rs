//! Domain-specific errors for the ledger operation engine.
//!
//! Contains error variants for common failure cases like:
//! - Request errors (unknown operation, wrong argument count, bad amount)
//! - Account errors (not found, already exists, insufficient funds)
//! - Store errors (corrupted balance bytes, concurrent modification)
//!
//! Every variant is returned to the caller as-is. Nothing here is retried
//! by the engine; see [`Error::is_retryable`].

use thiserror::Error;

use crate::stores::StoreError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    #[error("expected {expected} arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("invalid amount `{0}`")]
    InvalidAmount(String),

    #[error("invalid account id `{0}`")]
    InvalidAccount(String),

    /// The same account id was given twice where distinct accounts are required.
    #[error("account `{0}` given more than once")]
    DuplicateAccount(String),

    #[error("account `{0}` not found")]
    AccountNotFound(String),

    #[error("account `{0}` already exists")]
    AccountAlreadyExists(String),

    #[error("insufficient funds in `{account}`: requested {requested}, available {available}")]
    InsufficientFunds {
        account: String,
        requested: i64,
        available: i64,
    },

    #[error("balance of `{account}` would overflow")]
    BalanceOverflow { account: String },

    /// Stored bytes are not a canonical balance. Indicates data corruption.
    #[error("malformed balance stored under `{key}`")]
    MalformedBalance { key: String },

    #[error("concurrent modification of `{key}`")]
    Conflict { key: String },

    #[error("store failure: {0}")]
    Store(String),
}

impl Error {
    /// Whether the caller may retry the whole operation in a fresh transaction.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { key } => Error::Conflict { key },
            StoreError::Unavailable(msg) => Error::Store(msg),
        }
    }
}
