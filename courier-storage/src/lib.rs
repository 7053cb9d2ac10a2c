//! COURIER Storage - Proposition Cache Store
//!
//! The surface → propositions cache: an in-memory mapping replaced wholesale
//! on every write and mirrored to a durable backend (LMDB in production).

pub mod cache;
pub mod content_cards;
pub mod store;

pub use cache::{
    decode_record, encode_record, CacheStats, InMemoryPropositionBackend, LmdbCacheError,
    LmdbPropositionBackend, PersistedPropositions, PropositionBackend, Watermark,
};
pub use content_cards::ContentCardProvider;
pub use store::PropositionCacheStore;

// Re-exported so callers can name the change channel.
pub use tokio::sync::watch;
