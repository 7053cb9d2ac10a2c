//! Durable storage for the proposition record.
//!
//! The store keeps the authoritative mapping in memory; backends only hold
//! the last committed generation so it can be restored after a restart.
//!
//! # Record lifecycle
//!
//! - `store` replaces the record wholesale on every non-empty write
//! - `clear` removes it when the store is written with no content
//! - `load` runs once per process, on the store's first access
//!
//! Anything `load` cannot decode is a cache miss, never an error the caller
//! sees: the cache must not block a fresh network fetch.

pub mod lmdb_backend;
pub mod memory_backend;
pub mod record;
pub mod traits;
pub mod watermark;

pub use lmdb_backend::{LmdbCacheError, LmdbPropositionBackend};
pub use memory_backend::InMemoryPropositionBackend;
pub use record::{decode_record, encode_record, PersistedPropositions};
pub use traits::{CacheStats, PropositionBackend};
pub use watermark::Watermark;
