//! In-memory and failing `Archive` implementations.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use commandsvc_core::archive::{Archive, ArchiveKey, ArchiveRecord};
use commandsvc_core::error::ArchiveError;

/// An ordered in-memory archive. Rejects writes until `ensure_namespace`
/// has been called, like the SQLite archive does.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    ready: AtomicBool,
    records: Mutex<BTreeMap<ArchiveKey, Vec<u8>>>,
}

impl MemoryArchive {
    /// Creates an empty archive with no namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `ensure_namespace` has been called.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Returns a snapshot of all records in key order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn records(&self) -> Vec<ArchiveRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(key, value)| ArchiveRecord {
                key: *key,
                value: value.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl Archive for MemoryArchive {
    async fn ensure_namespace(&self) -> Result<(), ArchiveError> {
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    async fn put(&self, key: &ArchiveKey, value: &[u8]) -> Result<(), ArchiveError> {
        if !self.is_ready() {
            return Err(ArchiveError::MissingNamespace("memory".into()));
        }
        self.records.lock().unwrap().insert(*key, value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &ArchiveKey) -> Result<Option<Vec<u8>>, ArchiveError> {
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    async fn scan(&self, from: Option<&ArchiveKey>) -> Result<Vec<ArchiveRecord>, ArchiveError> {
        Ok(self
            .records()
            .into_iter()
            .filter(|record| from.is_none_or(|from| record.key >= *from))
            .collect())
    }
}

/// An archive that accepts `ensure_namespace` and fails every write and
/// read. Useful for testing persistence error paths.
#[derive(Debug)]
pub struct FailingArchive;

#[async_trait]
impl Archive for FailingArchive {
    async fn ensure_namespace(&self) -> Result<(), ArchiveError> {
        Ok(())
    }

    async fn put(&self, _key: &ArchiveKey, _value: &[u8]) -> Result<(), ArchiveError> {
        Err(ArchiveError::Write("disk I/O error".into()))
    }

    async fn get(&self, _key: &ArchiveKey) -> Result<Option<Vec<u8>>, ArchiveError> {
        Err(ArchiveError::Read("disk I/O error".into()))
    }

    async fn scan(&self, _from: Option<&ArchiveKey>) -> Result<Vec<ArchiveRecord>, ArchiveError> {
        Err(ArchiveError::Read("disk I/O error".into()))
    }
}
