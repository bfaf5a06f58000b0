use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::{StoreError, TransactionContext};

#[derive(Debug, Clone)]
struct Versioned {
    value: Vec<u8>,
    /// Starts at 1 on first write. Version 0 stands for "absent".
    version: u64,
}

/// In-memory key/value store with optimistic, all-or-nothing commits.
///
/// Intended for tests, benches and the batch runner.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Versioned>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a transaction whose writes stay private until [`StagedTransaction::commit`].
    pub fn begin(&self) -> StagedTransaction<'_> {
        StagedTransaction {
            store: self,
            reads: HashMap::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Reads the last committed value, bypassing any transaction.
    pub fn get_committed(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    /// Number of committed keys.
    pub fn key_count(&self) -> Result<usize, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.len())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

fn version_of(entries: &HashMap<String, Versioned>, key: &str) -> u64 {
    entries.get(key).map(|entry| entry.version).unwrap_or(0)
}

/// A transaction over a [`MemoryStore`].
///
/// Remembers the version of every key it read and buffers every write.
/// Dropping it without committing discards the buffered writes.
#[derive(Debug)]
pub struct StagedTransaction<'a> {
    store: &'a MemoryStore,
    reads: HashMap<String, u64>,
    writes: BTreeMap<String, Vec<u8>>,
}

impl StagedTransaction<'_> {
    pub fn staged_writes(&self) -> usize {
        self.writes.len()
    }

    /// Applies all staged writes atomically.
    ///
    /// Fails with [`StoreError::Conflict`], applying nothing, if any key read
    /// by this transaction was committed by someone else in the meantime.
    pub fn commit(self) -> Result<(), StoreError> {
        let mut entries = self.store.entries.write().map_err(|_| poisoned())?;

        for (key, seen) in &self.reads {
            if version_of(&entries, key) != *seen {
                return Err(StoreError::Conflict { key: key.clone() });
            }
        }

        for (key, value) in self.writes {
            let version = version_of(&entries, &key) + 1;
            entries.insert(key, Versioned { value, version });
        }
        Ok(())
    }
}

impl TransactionContext for StagedTransaction<'_> {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(value) = self.writes.get(key) {
            return Ok(Some(value.clone()));
        }

        let entries = self.store.entries.read().map_err(|_| poisoned())?;
        let current = version_of(&entries, key);
        match self.reads.get(key) {
            Some(&seen) if seen != current => {
                return Err(StoreError::Conflict {
                    key: key.to_owned(),
                });
            }
            Some(_) => {}
            None => {
                self.reads.insert(key.to_owned(), current);
            }
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.writes.insert(key.to_owned(), value);
        Ok(())
    }
}
