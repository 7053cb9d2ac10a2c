//! LMDB-backed proposition storage.
//!
//! Uses the heed crate (Rust bindings for LMDB) to keep the proposition
//! record in a memory-mapped environment owned by a single store.
//!
//! # Atomicity
//!
//! Each `store`/`clear` runs in one write transaction. A failed transaction
//! is aborted on drop, so the previously committed record stays intact.

use std::path::{Path, PathBuf};

use courier_core::{CourierResult, PropositionMap, StorageError};
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::debug;

use super::record::{decode_record, encode_record, PersistedPropositions};
use super::traits::PropositionBackend;
use super::watermark::Watermark;

/// Key of the single proposition record.
const RECORD_KEY: &[u8] = b"propositions";

/// Error type for LMDB cache operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbCacheError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LmdbCacheError {
    fn into_persistence_failure(self) -> StorageError {
        StorageError::PersistenceFailure {
            reason: self.to_string(),
        }
    }

    fn into_cache_miss(self) -> StorageError {
        StorageError::CacheMiss {
            reason: self.to_string(),
        }
    }
}

/// LMDB-backed proposition storage.
///
/// # Example
///
/// ```ignore
/// use courier_storage::{LmdbPropositionBackend, PropositionCacheStore};
/// use std::sync::Arc;
///
/// let backend = LmdbPropositionBackend::new("/var/lib/courier/cache", 16)?;
/// let store = PropositionCacheStore::new(Arc::new(backend));
/// ```
pub struct LmdbPropositionBackend {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
    /// Directory of the environment.
    path: PathBuf,
}

impl LmdbPropositionBackend {
    /// Create a new LMDB proposition backend.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbCacheError> {
        let map_size = max_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                LmdbCacheError::EnvOpen(format!("map size of {} MB overflows", max_size_mb))
            })?;
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbCacheError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbCacheError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(Self {
            env,
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Directory of the LMDB environment.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw record bytes, if present.
    pub fn raw_record(&self) -> Result<Option<Vec<u8>>, LmdbCacheError> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let bytes = self
            .db
            .get(&rtxn, RECORD_KEY)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(bytes.map(<[u8]>::to_vec))
    }

    /// Overwrite the raw record bytes without encoding.
    pub fn put_raw_record(&self, bytes: &[u8]) -> Result<(), LmdbCacheError> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, RECORD_KEY, bytes)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))
    }

    fn delete_record(&self) -> Result<bool, LmdbCacheError> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let deleted = self
            .db
            .delete(&mut wtxn, RECORD_KEY)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(deleted)
    }
}

impl PropositionBackend for LmdbPropositionBackend {
    fn load(&self) -> CourierResult<Option<PersistedPropositions>> {
        let bytes = self
            .raw_record()
            .map_err(LmdbCacheError::into_cache_miss)?;

        match bytes {
            Some(bytes) => Ok(Some(decode_record(&bytes)?)),
            None => Ok(None),
        }
    }

    fn store(&self, watermark: &Watermark, propositions: &PropositionMap) -> CourierResult<()> {
        let bytes = encode_record(watermark, propositions)?;
        self.put_raw_record(&bytes)
            .map_err(LmdbCacheError::into_persistence_failure)?;

        debug!(
            path = %self.path.display(),
            generation = watermark.generation,
            size_bytes = bytes.len(),
            "Persisted proposition record"
        );
        Ok(())
    }

    fn clear(&self) -> CourierResult<()> {
        let deleted = self
            .delete_record()
            .map_err(LmdbCacheError::into_persistence_failure)?;

        debug!(path = %self.path.display(), deleted, "Cleared proposition record");
        Ok(())
    }

    fn location(&self) -> String {
        format!("lmdb:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{CourierError, Proposition, Surface};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_backend() -> (LmdbPropositionBackend, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let backend = LmdbPropositionBackend::new(temp_dir.path(), 10)
            .expect("backend creation should succeed");
        (backend, temp_dir)
    }

    fn make_map(ids: &[&str]) -> PropositionMap {
        let surface = Surface::with_path("com.example.shop", "home").unwrap();
        let propositions = ids
            .iter()
            .map(|id| {
                Proposition::from_event_data(json!({
                    "id": id,
                    "scope": surface.uri(),
                    "scopeDetails": {},
                    "items": []
                }))
                .expect("valid proposition")
            })
            .collect();
        let mut map = PropositionMap::new();
        map.insert(surface, propositions);
        map
    }

    #[test]
    fn test_oversized_map_size_is_rejected() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let result = LmdbPropositionBackend::new(temp_dir.path(), usize::MAX);
        assert!(matches!(result, Err(LmdbCacheError::EnvOpen(_))));
    }

    #[test]
    fn test_load_empty_backend() {
        let (backend, _dir) = create_test_backend();
        assert!(backend.load().expect("load should succeed").is_none());
    }

    #[test]
    fn test_store_then_load() {
        let (backend, _dir) = create_test_backend();
        let map = make_map(&["a", "b", "c"]);

        backend
            .store(&Watermark::new(1), &map)
            .expect("store should succeed");

        let loaded = backend
            .load()
            .expect("load should succeed")
            .expect("record should exist");
        assert_eq!(loaded.propositions, map);
        assert_eq!(loaded.watermark.generation, 1);
    }

    #[test]
    fn test_store_replaces_record() {
        let (backend, _dir) = create_test_backend();
        backend
            .store(&Watermark::new(1), &make_map(&["a"]))
            .expect("first store should succeed");
        backend
            .store(&Watermark::new(2), &make_map(&["b"]))
            .expect("second store should succeed");

        let loaded = backend.load().unwrap().unwrap();
        assert_eq!(loaded.propositions, make_map(&["b"]));
        assert_eq!(loaded.watermark.generation, 2);
    }

    #[test]
    fn test_clear_removes_record() {
        let (backend, _dir) = create_test_backend();
        backend.store(&Watermark::new(1), &make_map(&["a"])).unwrap();
        backend.clear().expect("clear should succeed");
        assert!(backend.load().unwrap().is_none());
        // Clearing twice is fine.
        backend.clear().expect("second clear should succeed");
    }

    #[test]
    fn test_corrupt_record_is_cache_miss() {
        let (backend, _dir) = create_test_backend();
        backend.put_raw_record(b"garbage").unwrap();
        let result = backend.load();
        assert!(matches!(
            result,
            Err(CourierError::Storage(StorageError::CacheMiss { .. }))
        ));
    }

    #[test]
    fn test_record_survives_reopen() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let map = make_map(&["persisted"]);
        {
            let backend = LmdbPropositionBackend::new(temp_dir.path(), 10).unwrap();
            backend.store(&Watermark::new(9), &map).unwrap();
        }

        let reopened = LmdbPropositionBackend::new(temp_dir.path(), 10).unwrap();
        let loaded = reopened.load().unwrap().unwrap();
        assert_eq!(loaded.propositions, map);
        assert_eq!(loaded.watermark.generation, 9);
    }

    #[test]
    fn test_location_names_path() {
        let (backend, dir) = create_test_backend();
        assert!(backend
            .location()
            .contains(&dir.path().display().to_string()));
    }
}
