//! Watermarks for cache generations.
//!
//! Every completed write produces a new watermark. Watermarks are what the
//! store hands back to writers and broadcasts to subscribers, so callers can
//! await a specific write instead of sleeping.

use chrono::{DateTime, Utc};

/// A point in the cache's write history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark {
    /// Monotonically increasing generation number.
    /// Each completed write increments this value.
    pub generation: u64,
    /// When this generation was written.
    pub observed_at: DateTime<Utc>,
}

impl Watermark {
    /// Create a new watermark with the given generation.
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            observed_at: Utc::now(),
        }
    }

    /// Create a new watermark with explicit observed_at timestamp.
    pub fn with_timestamp(generation: u64, observed_at: DateTime<Utc>) -> Self {
        Self {
            generation,
            observed_at,
        }
    }

    /// Create a zero watermark (nothing written yet).
    pub fn zero() -> Self {
        Self {
            generation: 0,
            observed_at: DateTime::UNIX_EPOCH,
        }
    }

    /// The watermark that follows this one.
    pub fn next(&self) -> Self {
        Self::new(self.generation.saturating_add(1))
    }

    /// Check if this watermark is newer than another.
    pub fn is_newer_than(&self, other: &Watermark) -> bool {
        self.generation > other.generation
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::zero()
    }
}
