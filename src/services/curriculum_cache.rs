// src/services/curriculum_cache.rs

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::models::curriculum::{Subject, SubjectSummary};

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Default)]
struct CacheState {
    /// When the first entry of the current generation was stored.
    filled_at: Option<Instant>,
    subjects: HashMap<String, Arc<Subject>>,
    listing: Option<Arc<Vec<SubjectSummary>>>,
    /// Bumped whenever entries are dropped; fills started earlier are discarded.
    generation: u64,
}

impl CacheState {
    fn clear(&mut self) {
        self.filled_at = None;
        self.subjects.clear();
        self.listing = None;
        self.generation += 1;
    }
}

/// In-memory cache of curriculum reads.
///
/// All entries share one TTL window: once it has elapsed since the cache was
/// first filled, the whole cache is dropped on the next access.
pub struct CurriculumCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl CurriculumCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn with_system_clock(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    /// Locks the state, expiring it first if the TTL window has passed.
    fn fresh_state(&self) -> MutexGuard<'_, CacheState> {
        // A panic while holding the lock leaves plain data behind, still usable.
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(filled_at) = state.filled_at {
            if self.clock.now().duration_since(filled_at) >= self.ttl {
                tracing::debug!("Curriculum cache expired, clearing");
                state.clear();
            }
        }
        state
    }

    fn touch(&self, state: &mut CacheState) {
        if state.filled_at.is_none() {
            state.filled_at = Some(self.clock.now());
        }
    }

    /// Current generation. Read it before loading from the store and hand it
    /// back to `insert_subject`/`insert_listing`.
    pub fn generation(&self) -> u64 {
        self.fresh_state().generation
    }

    pub fn subject(&self, id: &str) -> Option<Arc<Subject>> {
        self.fresh_state().subjects.get(id).cloned()
    }

    /// Caches `subject` unless the cache was invalidated or expired since
    /// `generation` was read. The subject is returned either way.
    pub fn insert_subject(&self, subject: Subject, generation: u64) -> Arc<Subject> {
        let subject = Arc::new(subject);
        let mut state = self.fresh_state();
        if state.generation != generation {
            tracing::debug!("Dropping stale curriculum read for {}", subject.id);
            return subject;
        }
        self.touch(&mut state);
        state.subjects.insert(subject.id.clone(), subject.clone());
        subject
    }

    pub fn listing(&self) -> Option<Arc<Vec<SubjectSummary>>> {
        self.fresh_state().listing.clone()
    }

    pub fn insert_listing(
        &self,
        listing: Vec<SubjectSummary>,
        generation: u64,
    ) -> Arc<Vec<SubjectSummary>> {
        let listing = Arc::new(listing);
        let mut state = self.fresh_state();
        if state.generation != generation {
            tracing::debug!("Dropping stale subject listing");
            return listing;
        }
        self.touch(&mut state);
        state.listing = Some(listing.clone());
        listing
    }

    /// Drops one subject and the listing, which may summarise it.
    pub fn invalidate_subject(&self, id: &str) {
        let mut state = self.fresh_state();
        state.subjects.remove(id);
        state.listing = None;
        state.generation += 1;
    }

    pub fn invalidate_all(&self) {
        self.fresh_state().clear();
    }

    pub fn len(&self) -> usize {
        self.fresh_state().subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
