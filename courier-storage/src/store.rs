//! The proposition cache store.
//!
//! Holds the authoritative surface → propositions mapping in memory and
//! mirrors every write to a [`PropositionBackend`].
//!
//! # Consistency
//!
//! The state lock is held for the whole of a write, across persistence and
//! the in-memory swap. Writes are therefore linearized: a reader sees either
//! the complete previous mapping or the complete new one, and never an older
//! generation after a newer one. When the backend rejects a write, neither
//! memory nor the persisted record changes.
//!
//! # Hydration
//!
//! The first access in a process loads the persisted record. Load failures
//! and corrupt records hydrate as an empty mapping; the next write replaces
//! whatever was on disk.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use courier_core::{CourierResult, Proposition, PropositionMap, StorageError, Surface};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cache::{CacheStats, PropositionBackend, Watermark};

#[derive(Debug, Default)]
struct CacheState {
    propositions: PropositionMap,
    hydrated: bool,
    watermark: Watermark,
}

#[derive(Debug, Default)]
struct StatCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    hydrations: AtomicU64,
    writes: AtomicU64,
    write_failures: AtomicU64,
}

/// Surface → propositions cache with durable, full-replace writes.
///
/// Construct one per durable location and share it via `Arc`.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(PropositionCacheStore::new(Arc::new(backend)));
///
/// let watermark = store.write(Some(propositions))?;
/// assert!(store.exists());
///
/// // Elsewhere: wait for that write instead of sleeping.
/// store.wait_for_generation(watermark.generation).await;
/// ```
pub struct PropositionCacheStore<B: PropositionBackend> {
    backend: Arc<B>,
    state: RwLock<CacheState>,
    changes: watch::Sender<Watermark>,
    counters: StatCounters,
}

impl<B: PropositionBackend> PropositionCacheStore<B> {
    /// Create a store over `backend`. Nothing is loaded until first access.
    pub fn new(backend: Arc<B>) -> Self {
        let (changes, _) = watch::channel(Watermark::zero());
        Self {
            backend,
            state: RwLock::new(CacheState::default()),
            changes,
            counters: StatCounters::default(),
        }
    }

    /// Get a reference to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Replace the whole mapping.
    ///
    /// `None` or an empty mapping clears memory and the persisted record.
    /// Returns the watermark of the new generation once it is durable and
    /// visible to readers.
    ///
    /// # Errors
    ///
    /// [`StorageError::PersistenceFailure`] when the backend rejects the
    /// write; the previous generation stays in place.
    pub fn write(&self, propositions: Option<PropositionMap>) -> CourierResult<Watermark> {
        let propositions = propositions.unwrap_or_default();
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;

        if !state.hydrated {
            self.hydrate(&mut state);
        }

        let watermark = state.watermark.next();
        let persisted = if propositions.is_empty() {
            self.backend.clear()
        } else {
            self.backend.store(&watermark, &propositions)
        };

        if let Err(err) = persisted {
            self.counters.write_failures.fetch_add(1, Ordering::Relaxed);
            warn!(
                backend = %self.backend.location(),
                generation = state.watermark.generation,
                error = %err,
                "Proposition write failed, keeping previous generation"
            );
            return Err(err);
        }

        let surfaces = propositions.len();
        state.propositions = propositions;
        state.watermark = watermark;
        self.changes.send_replace(watermark);
        self.counters.writes.fetch_add(1, Ordering::Relaxed);

        debug!(
            backend = %self.backend.location(),
            generation = watermark.generation,
            surfaces,
            "Replaced cached propositions"
        );
        Ok(watermark)
    }

    /// Run [`write`](Self::write) on tokio's blocking pool.
    pub async fn write_async(
        self: Arc<Self>,
        propositions: Option<PropositionMap>,
    ) -> CourierResult<Watermark>
    where
        B: 'static,
    {
        tokio::task::spawn_blocking(move || self.write(propositions))
            .await
            .map_err(|e| StorageError::PersistenceFailure {
                reason: format!("write task did not complete: {}", e),
            })?
    }

    /// Clear memory and the persisted record.
    pub fn clear(&self) -> CourierResult<Watermark> {
        self.write(None)
    }

    /// The current mapping.
    pub fn read(&self) -> PropositionMap {
        self.with_state(|state| state.propositions.clone())
    }

    /// True iff the mapping has at least one surface.
    pub fn exists(&self) -> bool {
        self.with_state(|state| !state.propositions.is_empty())
    }

    /// Propositions cached for `surface`, in delivery order.
    pub fn propositions_for(&self, surface: &Surface) -> Vec<Proposition> {
        self.with_state(|state| {
            state
                .propositions
                .get(surface)
                .cloned()
                .unwrap_or_default()
        })
    }

    /// The subset of the mapping for the requested surfaces.
    ///
    /// Surfaces without an entry are omitted.
    pub fn propositions_for_surfaces(&self, surfaces: &[Surface]) -> PropositionMap {
        self.with_state(|state| {
            surfaces
                .iter()
                .filter_map(|surface| {
                    state
                        .propositions
                        .get(surface)
                        .map(|props| (surface.clone(), props.clone()))
                })
                .collect()
        })
    }

    /// Cached surfaces, sorted by URI.
    pub fn surfaces(&self) -> Vec<Surface> {
        let mut surfaces = self.with_state(|state| {
            state.propositions.keys().cloned().collect::<Vec<_>>()
        });
        surfaces.sort();
        surfaces
    }

    /// Watermark of the generation currently visible.
    pub fn watermark(&self) -> Watermark {
        self.with_state(|state| state.watermark)
    }

    /// Receive the watermark of every completed write.
    pub fn subscribe(&self) -> watch::Receiver<Watermark> {
        self.changes.subscribe()
    }

    /// Wait until a generation at or after `generation` is visible.
    ///
    /// Hydrates first, so a generation restored from durable storage counts.
    pub async fn wait_for_generation(&self, generation: u64) -> Watermark {
        let mut changes = self.changes.subscribe();
        let current = self.watermark();
        if current.generation >= generation {
            return current;
        }
        let reached = changes
            .wait_for(|watermark| watermark.generation >= generation)
            .await
            .map(|watermark| *watermark);
        reached.unwrap_or_else(|_| *self.changes.borrow())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            hydrations: self.counters.hydrations.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            write_failures: self.counters.write_failures.load(Ordering::Relaxed),
        }
    }

    /// Run `f` against hydrated state.
    fn with_state<R>(&self, f: impl FnOnce(&CacheState) -> R) -> R {
        {
            let state = self.read_state();
            if state.hydrated {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return f(&state);
            }
        }

        let mut state = self.write_state();
        if state.hydrated {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hydrate(&mut state);
        }
        f(&state)
    }

    fn hydrate(&self, state: &mut CacheState) {
        match self.backend.load() {
            Ok(Some(record)) => {
                self.counters.hydrations.fetch_add(1, Ordering::Relaxed);
                debug!(
                    backend = %self.backend.location(),
                    generation = record.watermark.generation,
                    surfaces = record.propositions.len(),
                    "Hydrated propositions from durable storage"
                );
                state.propositions = record.propositions;
                state.watermark = record.watermark;
            }
            Ok(None) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(backend = %self.backend.location(), "No persisted propositions");
            }
            Err(err) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                warn!(
                    backend = %self.backend.location(),
                    error = %err,
                    "Cache miss: persisted propositions unreadable, starting empty"
                );
            }
        }
        state.hydrated = true;
        self.changes.send_replace(state.watermark);
    }

    // Every mutation of `CacheState` completes before its guard is released,
    // so a poisoned lock still guards a consistent generation.
    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: PropositionBackend> std::fmt::Debug for PropositionCacheStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropositionCacheStore")
            .field("backend", &self.backend.location())
            .field("watermark", &*self.changes.borrow())
            .finish()
    }
}
