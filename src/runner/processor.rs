use tracing::warn;

use crate::dto::{Request, ResultRow};
use crate::stores::MemoryStore;
use crate::{Engine, Error, Output};

/// Executes requests one by one against a store it owns.
///
/// Each request gets its own transaction, committed on success and dropped
/// on failure, so a rejected request leaves no trace in the store.
#[derive(Default)]
pub struct RequestProcessor {
    store: MemoryStore,
    engine: Engine,
    next_seq: u64,
}

impl RequestProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, request: &Request) -> ResultRow {
        let seq = self.next_seq;
        self.next_seq += 1;

        let outcome = self.apply(request);
        if let Err(err) = &outcome {
            warn!(seq, operation = %request.operation, error = %err, "request rejected");
        }
        ResultRow::new(seq, request, &outcome)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    fn apply(&self, request: &Request) -> Result<Output, Error> {
        let mut tx = self.store.begin();
        let output = self
            .engine
            .invoke(&mut tx, &request.operation, &request.args)?;
        tx.commit()?;
        Ok(output)
    }
}
