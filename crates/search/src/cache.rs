//! Preview cache
//!
//! Cache-aside adapter in front of the [`DocumentStore`], keyed by entry id.
//! Holds [`Preview`] projections only, never full entries.
//!
//! Cached previews expire after the configured time-to-live; an expired
//! preview is treated as a miss and reloaded. With caching disabled the
//! cache is a pass-through: reads always hit the store and puts store
//! nothing.

use crate::config::SearchConfig;
use dashmap::mapref::entry::Entry as Slot;
use dashmap::DashMap;
use kbsearch_core::{DocumentStore, Entry, EntryId, Error, Preview, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct CachedPreview {
    preview: Preview,
    cached_at: Instant,
}

impl CachedPreview {
    fn new(preview: Preview) -> Self {
        CachedPreview {
            preview,
            cached_at: Instant::now(),
        }
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Reads answered from the cache
    pub hits: u64,
    /// Reads that went to the store
    pub misses: u64,
}

/// Cache-aside preview lookup
pub struct PreviewCache {
    store: Arc<dyn DocumentStore>,
    previews: DashMap<EntryId, CachedPreview>,
    enabled: bool,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PreviewCache {
    /// Create a cache over `store` configured by `config`
    pub fn new(store: Arc<dyn DocumentStore>, config: &SearchConfig) -> Self {
        Self::with_settings(store, config.cache_enabled, config.cache_ttl())
    }

    /// Create a cache with explicit settings
    pub fn with_settings(store: Arc<dyn DocumentStore>, enabled: bool, ttl: Duration) -> Self {
        PreviewCache {
            store,
            previews: DashMap::new(),
            enabled,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Whether previews are retained between reads
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Preview for `id`, loading it from the store on a miss
    ///
    /// # Errors
    ///
    /// Returns `Error::EntryNotFound` if the store has no such entry, or the
    /// store's own error if the backend fails.
    pub fn read(&self, id: EntryId) -> Result<Preview> {
        if let Some(preview) = self.fresh(id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(target: "kbsearch::search", id = %id, "Preview cache hit");
            return Ok(preview);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(target: "kbsearch::search", id = %id, "Preview cache miss");

        match self.store.find_by_id(id)? {
            Some(entry) => Ok(self.fill(&entry)),
            None => {
                self.previews
                    .remove_if(&id, |_, cached| cached.cached_at.elapsed() >= self.ttl);
                Err(Error::EntryNotFound(id))
            }
        }
    }

    /// Cache a preview loaded by a miss unless a fresh one landed meanwhile
    ///
    /// A `put` racing with the load is newer than what the load saw, so the
    /// slot's current value wins and is returned.
    fn fill(&self, entry: &Entry) -> Preview {
        let loaded = entry.preview();
        if !self.enabled {
            return loaded;
        }

        match self.previews.entry(entry.id) {
            Slot::Occupied(mut slot) => {
                if slot.get().cached_at.elapsed() < self.ttl {
                    return slot.get().preview.clone();
                }
                slot.insert(CachedPreview::new(loaded.clone()));
                loaded
            }
            Slot::Vacant(slot) => {
                slot.insert(CachedPreview::new(loaded.clone()));
                loaded
            }
        }
    }

    /// Cached, unexpired preview for `id`
    fn fresh(&self, id: EntryId) -> Option<Preview> {
        if !self.enabled {
            return None;
        }
        let cached = self.previews.get(&id)?;
        (cached.cached_at.elapsed() < self.ttl).then(|| cached.preview.clone())
    }

    /// Compute and cache the preview of `entry`, replacing any cached value
    pub fn put(&self, entry: &Entry) -> Preview {
        let preview = entry.preview();
        if self.enabled {
            debug!(target: "kbsearch::search", id = %entry.id, "Caching preview");
            self.previews
                .insert(entry.id, CachedPreview::new(preview.clone()));
        }
        preview
    }

    /// Drop any cached preview for `id`
    pub fn evict(&self, id: EntryId) {
        debug!(target: "kbsearch::search", id = %id, "Evicting preview");
        self.previews.remove(&id);
    }

    /// Drop every cached preview
    pub fn clear(&self) {
        self.previews.clear();
    }

    /// Number of cached previews (expired ones included until replaced)
    pub fn len(&self) -> usize {
        self.previews.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.previews.is_empty()
    }

    /// Hit/miss counters since creation
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for PreviewCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewCache")
            .field("enabled", &self.enabled)
            .field("ttl", &self.ttl)
            .field("len", &self.previews.len())
            .finish()
    }
}
