//! Bounded memoization of enhanced text -> embedding vector.
//!
//! Keyed by the exact enhanced string, so the same raw text in category and
//! interest roles occupies separate entries. Eviction is LRU with a
//! configurable capacity; the reference behavior of growing without bound is
//! not reproduced here.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::engine::embedding::{Embedder, EmbeddingError};

/// Default number of cached embeddings. The whole taxonomy plus a large
/// working set of category strings fits comfortably.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Thread-safe LRU cache over embedding vectors.
///
/// Vectors are shared as `Arc` so an eviction never invalidates a vector a
/// concurrent caller is still scoring against.
pub struct EmbeddingCache {
    entries: Mutex<LruCache<String, Arc<Vec<f32>>>>,
}

impl EmbeddingCache {
    /// Create a cache bounded to `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return the cached vector for `enhanced_text`, computing and storing it
    /// on a miss.
    pub fn get_or_compute(
        &self,
        enhanced_text: &str,
        embedder: &dyn Embedder,
    ) -> Result<Arc<Vec<f32>>, EmbeddingError> {
        if let Some(hit) = self.lock().get(enhanced_text).cloned() {
            return Ok(hit);
        }

        // Computed outside the lock; a racing miss computes the same vector
        // (embedding is deterministic per backend) and the second put wins.
        let vector = Arc::new(embedder.embed(enhanced_text)?);
        self.lock().put(enhanced_text.to_string(), vector.clone());

        Ok(vector)
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, Arc<Vec<f32>>>> {
        // A poisoned lock only means another thread panicked mid-operation;
        // cached vectors are immutable, so the content stays valid.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
