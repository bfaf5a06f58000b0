//! Transactional logic of a SmallBank ledger: accounts with a savings and a
//! checkings balance, mutated by a fixed set of named operations executed
//! against a key/value [`TransactionContext`].

mod codec;
pub mod csv_utils;
pub mod dto;
mod engine;
mod error;
pub mod observer;
mod operation;
mod runner;
pub mod stores;
pub mod telemetry;

pub use codec::{balance_key, decode, encode, BalanceKind};
pub use dto::{Request, ResultRow, Status};
pub use engine::{Balances, Engine, Output};
pub use error::{Error, Result};
pub use observer::{Applied, NoopObserver, Observer, Posting, TracingObserver};
pub use operation::{Operation, OperationKind, Seed};
pub use runner::{run, run_async, RequestProcessor};
pub use stores::{MemoryStore, StagedTransaction, StoreError, TransactionContext};
