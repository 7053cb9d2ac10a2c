//! In-memory proposition backend.
//!
//! Keeps the encoded record bytes in memory, so it exercises the same record
//! format as the LMDB backend. Supports write-failure and raw-record injection
//! for tests and for hosts that want a process-local cache.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use courier_core::{CourierResult, PropositionMap, StorageError};

use super::record::{decode_record, encode_record, PersistedPropositions};
use super::traits::PropositionBackend;
use super::watermark::Watermark;

/// In-memory proposition backend.
#[derive(Debug, Default)]
pub struct InMemoryPropositionBackend {
    record: Mutex<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
    loads: AtomicU64,
}

impl InMemoryPropositionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `store`/`clear` fail with a persistence failure.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Replace the stored record with arbitrary bytes.
    pub fn inject_raw(&self, bytes: Vec<u8>) -> CourierResult<()> {
        let mut record = self.record.lock().map_err(|_| StorageError::LockPoisoned)?;
        *record = Some(bytes);
        Ok(())
    }

    /// Copy of the stored record bytes.
    pub fn raw(&self) -> Option<Vec<u8>> {
        self.record.lock().ok().and_then(|record| record.clone())
    }

    /// Number of `load` calls served.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::PersistenceFailure {
                reason: "in-memory backend is rejecting writes".to_string(),
            });
        }
        Ok(())
    }
}

impl PropositionBackend for InMemoryPropositionBackend {
    fn load(&self) -> CourierResult<Option<PersistedPropositions>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let record = self.record.lock().map_err(|_| StorageError::CacheMiss {
            reason: "record lock poisoned".to_string(),
        })?;
        match record.as_deref() {
            Some(bytes) => Ok(Some(decode_record(bytes)?)),
            None => Ok(None),
        }
    }

    fn store(&self, watermark: &Watermark, propositions: &PropositionMap) -> CourierResult<()> {
        self.check_writable()?;
        let bytes = encode_record(watermark, propositions)?;
        let mut record = self.record.lock().map_err(|_| StorageError::LockPoisoned)?;
        *record = Some(bytes);
        Ok(())
    }

    fn clear(&self) -> CourierResult<()> {
        self.check_writable()?;
        let mut record = self.record.lock().map_err(|_| StorageError::LockPoisoned)?;
        *record = None;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
