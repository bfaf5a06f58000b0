//! The runner replays a request log against a fresh in-memory store: it reads
//! requests from CSV, executes each one in its own transaction, and writes one
//! result row per request to a writer.
//!
//! This module provides both a synchronous and an asynchronous runner implementations.
//!
mod async_runner;
mod processor;
mod sync_runner;

pub use async_runner::run as run_async;
pub use processor::RequestProcessor;
pub use sync_runner::run;
