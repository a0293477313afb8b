//! Read-through cache in front of a [`VetRepository`].
//!
//! The vet list changes rarely and is read on every `/vets` request, so both
//! `find_all` and each requested page are kept in memory under the cache
//! name [`VETS_CACHE`]. Entries optionally expire after a TTL, and at most
//! `max_entries` are held; the oldest one is evicted to make room.

use crate::error::ClinicError;
use crate::model::Vet;
use crate::page::{Page, PageRequest};
use crate::repository::VetRepository;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

pub const VETS_CACHE: &str = "vets";

/// Entry limit used when the configuration does not set one.
pub const DEFAULT_MAX_ENTRIES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKey {
    All,
    Page(PageRequest),
}

#[derive(Clone)]
enum Cached {
    All(Vec<Vet>),
    Page(Page<Vet>),
}

struct Entry {
    value: Cached,
    created_at: Instant,
    /// Insertion order; the smallest is evicted first.
    seq: u64,
}

/// Hit and miss counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Share of lookups served from memory, `0.0` before the first lookup.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct CachedVetRepository<R> {
    inner: R,
    ttl: Option<Duration>,
    max_entries: usize,
    entries: Mutex<HashMap<CacheKey, Entry>>,
    next_seq: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<R: VetRepository> CachedVetRepository<R> {
    /// `max_entries` below one is raised to one.
    pub fn new(inner: R, ttl: Option<Duration>, max_entries: usize) -> Self {
        Self {
            inner,
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Number of entries currently held, fresh or not.
    pub fn entry_count(&self) -> Result<usize, ClinicError> {
        Ok(self.lock()?.len())
    }

    /// Drop every cached entry.
    pub fn clear(&self) -> Result<(), ClinicError> {
        self.lock()?.clear();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CacheKey, Entry>>, ClinicError> {
        self.entries
            .lock()
            .map_err(|_| ClinicError::Internal(format!("{VETS_CACHE} cache lock poisoned")))
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        self.ttl.map_or(true, |ttl| entry.created_at.elapsed() <= ttl)
    }

    fn lookup(&self, key: CacheKey) -> Result<Option<Cached>, ClinicError> {
        let mut entries = self.lock()?;
        let hit = match entries.get(&key) {
            Some(entry) if self.is_fresh(entry) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        };
        drop(entries);

        let counter = if hit.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        METRICS.record_cache_lookup(VETS_CACHE, hit.is_some());
        log::trace!("{VETS_CACHE} cache {:?}: {}", key, if hit.is_some() { "hit" } else { "miss" });
        Ok(hit)
    }

    fn store(&self, key: CacheKey, value: Cached) -> Result<(), ClinicError> {
        let mut entries = self.lock()?;
        if let Some(ttl) = self.ttl {
            entries.retain(|_, e| e.created_at.elapsed() <= ttl);
        }
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            if let Some(victim) = entries
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(k, _)| *k)
            {
                entries.remove(&victim);
                log::debug!("{VETS_CACHE} cache full, evicted {victim:?}");
            }
        }
        entries.insert(
            key,
            Entry {
                value,
                created_at: Instant::now(),
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            },
        );
        Ok(())
    }
}

impl<R: VetRepository> VetRepository for CachedVetRepository<R> {
    fn find_all(&self) -> Result<Vec<Vet>, ClinicError> {
        if let Some(Cached::All(vets)) = self.lookup(CacheKey::All)? {
            return Ok(vets);
        }
        let vets = self.inner.find_all()?;
        self.store(CacheKey::All, Cached::All(vets.clone()))?;
        Ok(vets)
    }

    fn find_all_paged(&self, page: PageRequest) -> Result<Page<Vet>, ClinicError> {
        let key = CacheKey::Page(page);
        if let Some(Cached::Page(vets)) = self.lookup(key)? {
            return Ok(vets);
        }
        let vets = self.inner.find_all_paged(page)?;
        self.store(key, Cached::Page(vets.clone()))?;
        Ok(vets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;
    use std::sync::Arc;

    /// Counts calls reaching the wrapped repository.
    struct Counting {
        store: MemoryStore,
        calls: Arc<AtomicU64>,
    }

    impl VetRepository for Counting {
        fn find_all(&self) -> Result<Vec<Vet>, ClinicError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            VetRepository::find_all(&self.store)
        }

        fn find_all_paged(&self, page: PageRequest) -> Result<Page<Vet>, ClinicError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.store.find_all_paged(page)
        }
    }

    fn counting() -> (Counting, Arc<AtomicU64>) {
        let calls = Arc::new(AtomicU64::new(0));
        let repo = Counting {
            store: MemoryStore::seeded(),
            calls: Arc::clone(&calls),
        };
        (repo, calls)
    }

    #[test]
    fn test_second_lookup_is_served_from_cache() {
        let (repo, calls) = counting();
        let cache = CachedVetRepository::new(repo, None, DEFAULT_MAX_ENTRIES);

        let first = cache.find_all().expect("vets");
        let second = cache.find_all().expect("vets");
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.stats().hit_ratio(), 0.5);
    }

    #[test]
    fn test_pages_are_cached_separately() {
        let (repo, calls) = counting();
        let cache = CachedVetRepository::new(repo, None, DEFAULT_MAX_ENTRIES);

        let first = cache.find_all_paged(PageRequest::new(1, 5)).expect("page 1");
        let second = cache.find_all_paged(PageRequest::new(2, 5)).expect("page 2");
        cache.find_all_paged(PageRequest::new(1, 5)).expect("page 1 again");

        assert_eq!(first.content().len(), 5);
        assert_eq!(second.content().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_expired_entries_are_reloaded() {
        let (repo, calls) = counting();
        let cache = CachedVetRepository::new(repo, Some(Duration::ZERO), DEFAULT_MAX_ENTRIES);

        cache.find_all().expect("vets");
        std::thread::sleep(Duration::from_millis(5));
        cache.find_all().expect("vets");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_clear_forces_reload() {
        let (repo, calls) = counting();
        let cache = CachedVetRepository::new(repo, None, DEFAULT_MAX_ENTRIES);

        cache.find_all().expect("vets");
        cache.clear().expect("clear");
        cache.find_all().expect("vets");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_entry_count_stays_within_limit() {
        let (repo, calls) = counting();
        let cache = CachedVetRepository::new(repo, None, 3);

        for page in 1..=10 {
            cache.find_all_paged(PageRequest::new(page, 5)).expect("page");
            assert!(cache.entry_count().expect("len") <= 3);
        }
        assert_eq!(cache.entry_count().expect("len"), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 10);

        // Page 10 is among the newest, page 1 was evicted.
        cache.find_all_paged(PageRequest::new(10, 5)).expect("page 10");
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        cache.find_all_paged(PageRequest::new(1, 5)).expect("page 1");
        assert_eq!(calls.load(Ordering::SeqCst), 11);
        assert_eq!(cache.entry_count().expect("len"), 3);
    }
}
