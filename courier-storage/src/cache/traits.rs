//! Backend trait for durable proposition storage and cache statistics.

use courier_core::{CourierResult, PropositionMap};

use super::record::PersistedPropositions;
use super::watermark::Watermark;

/// Durable storage for the proposition record.
///
/// A backend owns exactly one record. The store calls `store` or `clear`
/// while holding its state lock, so implementations see writes one at a time.
///
/// # Error contract
///
/// - `load` errors are treated by the store as cache misses.
/// - `store` and `clear` must report failures as
///   [`StorageError::PersistenceFailure`](courier_core::StorageError) and must
///   leave any previously persisted record readable.
pub trait PropositionBackend: Send + Sync {
    /// Load the persisted record. `Ok(None)` when nothing has been persisted.
    fn load(&self) -> CourierResult<Option<PersistedPropositions>>;

    /// Replace the persisted record.
    fn store(&self, watermark: &Watermark, propositions: &PropositionMap) -> CourierResult<()>;

    /// Remove the persisted record. Clearing an empty backend succeeds.
    fn clear(&self) -> CourierResult<()>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from hydrated memory.
    pub hits: u64,
    /// Hydrations that found no usable record.
    pub misses: u64,
    /// Hydrations that restored a persisted record.
    pub hydrations: u64,
    /// Completed writes (including clears).
    pub writes: u64,
    /// Writes rejected by the backend.
    pub write_failures: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.hydrations;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
