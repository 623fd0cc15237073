use std::hash::{BuildHasher, Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ahash::RandomState;
use log::{debug, trace};
use lru::LruCache;
use parking_lot::Mutex;

use crate::types::EditScript;
use super::backtrace::edit_script;

struct CachedScript {
    target: Vec<String>,
    said: Vec<String>,
    script: EditScript,
}

impl CachedScript {
    fn matches<S: AsRef<str>>(&self, target: &[S], said: &[S]) -> bool {
        self.target.iter().map(String::as_str).eq(target.iter().map(AsRef::as_ref))
            && self.said.iter().map(String::as_str).eq(said.iter().map(AsRef::as_ref))
    }
}

#[derive(Default)]
struct CacheStats {
    hits: AtomicUsize,
    misses: AtomicUsize,
    collisions: AtomicUsize,
}

/// LRU cache of edit scripts keyed by `(hash(target), hash(said))`.
///
/// The cache is owned by the caller and passed in explicitly; nothing in the
/// crate keeps one behind the scenes. A hash hit is only served when the
/// stored sequences are equal to the requested ones.
pub struct AlignmentCache<H = RandomState> {
    entries: Mutex<LruCache<(u64, u64), Arc<CachedScript>>>,
    hasher: H,
    stats: CacheStats,
}

impl AlignmentCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, RandomState::new())
    }
}

impl<H: BuildHasher> AlignmentCache<H> {
    /// Cache whose keys are computed with `hasher`.
    pub fn with_hasher(capacity: usize, hasher: H) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        debug!("Initializing alignment cache with capacity={}", capacity);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hasher,
            stats: CacheStats::default(),
        }
    }

    fn sequence_hash<S: AsRef<str>>(&self, tokens: &[S]) -> u64 {
        let mut state = self.hasher.build_hasher();
        tokens.len().hash(&mut state);
        for token in tokens {
            token.as_ref().hash(&mut state);
        }
        state.finish()
    }

    /// Returns the cached edit script for the pair, computing and storing it
    /// on a miss.
    pub fn get_or_compute<S: AsRef<str>>(&self, target: &[S], said: &[S]) -> EditScript {
        let key = (self.sequence_hash(target), self.sequence_hash(said));

        let cached = self.entries.lock().get(&key).cloned();
        if let Some(entry) = cached {
            if entry.matches(target, said) {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                trace!("Alignment cache hit for key {:?}", key);
                return entry.script.clone();
            }
            self.stats.collisions.fetch_add(1, Ordering::Relaxed);
            debug!("Alignment cache hash collision for key {:?}", key);
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        let script = edit_script(target, said);
        let entry = Arc::new(CachedScript {
            target: target.iter().map(|t| t.as_ref().to_string()).collect(),
            said: said.iter().map(|t| t.as_ref().to_string()).collect(),
            script: script.clone(),
        });
        self.entries.lock().put(key, entry);
        script
    }

    pub fn hits(&self) -> usize {
        self.stats.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.stats.misses.load(Ordering::Relaxed)
    }

    pub fn collisions(&self) -> usize {
        self.stats.collisions.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::BuildHasherDefault;

    /// Sends every sequence to the same bucket.
    #[derive(Default)]
    struct ConstantHasher;

    impl Hasher for ConstantHasher {
        fn finish(&self) -> u64 {
            7
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    #[test]
    fn test_hash_collision_is_recomputed() {
        let cache = AlignmentCache::with_hasher(8, BuildHasherDefault::<ConstantHasher>::default());
        let first = cache.get_or_compute(&["a", "b", "c"], &["a", "x", "c"]);
        let second = cache.get_or_compute(&["a", "b"], &["a", "b", "c"]);

        assert_eq!(first.distance, 1);
        assert_eq!(second, edit_script(&["a", "b"], &["a", "b", "c"]));
        assert_eq!(cache.collisions(), 1);
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.misses(), 2);

        // The colliding pair replaced the first one under the shared key.
        let again = cache.get_or_compute(&["a", "b"], &["a", "b", "c"]);
        assert_eq!(again, second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hit_after_miss() {
        let cache = AlignmentCache::new(8);
        let first = cache.get_or_compute(&["a", "b", "c"], &["a", "x", "c"]);
        let second = cache.get_or_compute(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(first, second);
        assert_eq!(first.distance, 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_order_of_pair_matters() {
        let cache = AlignmentCache::new(8);
        cache.get_or_compute(&["a", "b"], &["a"]);
        let swapped = cache.get_or_compute(&["a"], &["a", "b"]);
        assert_eq!(cache.misses(), 2);
        assert_eq!(swapped.operations.len(), 2);
        assert!(swapped.operations[1].target_index.is_none());
    }

    #[test]
    fn test_token_boundaries_are_hashed() {
        let cache = AlignmentCache::new(8);
        cache.get_or_compute(&["ab", "c"], &["x"]);
        cache.get_or_compute(&["a", "bc"], &["x"]);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = AlignmentCache::new(2);
        cache.get_or_compute(&["a"], &["a"]);
        cache.get_or_compute(&["b"], &["b"]);
        cache.get_or_compute(&["c"], &["c"]);
        assert_eq!(cache.len(), 2);
        cache.get_or_compute(&["a"], &["a"]);
        assert_eq!(cache.misses(), 4);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = AlignmentCache::new(0);
        cache.get_or_compute(&["a"], &["b"]);
        assert_eq!(cache.len(), 1);
    }
}
