//! Storage layer for the ledger engine. Provides:
//! - The per-invocation key/value contract the engine runs against ([`TransactionContext`])
//! - An in-memory store with optimistic multi-key commits ([`MemoryStore`])
//!
//! The engine only ever sees a [`TransactionContext`]; serializing
//! conflicting invocations is the job of whoever implements it.

mod memory;

pub use memory::{MemoryStore, StagedTransaction};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A value read by this transaction was changed by someone else.
    #[error("stale read of `{key}`")]
    Conflict { key: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Single-key get/put view of the state store for one operation invocation.
///
/// Writes are staged: they become visible to other invocations atomically,
/// together with every other write of the same invocation, when the owner of
/// the context commits it.
pub trait TransactionContext {
    /// Returns the value visible to this transaction, or `None` if absent.
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
}

impl<C: TransactionContext + ?Sized> TransactionContext for &mut C {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(key, value)
    }
}
