//! Startup index rebuild
//!
//! The index is never persisted. At process start, before the coordinator is
//! exposed to query traffic, every stored entry is replayed through
//! [`SearchCoordinator::index_entry`].
//!
//! ## How It Works
//!
//! 1. Optionally flush the preview cache (`flush_cache_on_startup`)
//! 2. Load every entry with `DocumentStore::find_all`
//! 3. Replay each entry; entries are independent, so the replay runs on the
//!    rayon pool when `parallel_rebuild` is set

use crate::coordinator::SearchCoordinator;
use kbsearch_core::{DocumentStore, Result};
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

/// Rebuild the index of `coordinator` from `store`
///
/// Returns the number of entries replayed.
///
/// # Errors
///
/// Returns an error if the store cannot list its entries.
pub fn rebuild_index(coordinator: &SearchCoordinator, store: &dyn DocumentStore) -> Result<usize> {
    let config = coordinator.config();

    if config.flush_cache_on_startup {
        info!(target: "kbsearch::recovery", "Clearing preview cache before rebuild");
        coordinator.cache().clear();
    }

    info!(target: "kbsearch::recovery", "Rebuilding search index from document store");
    let start = Instant::now();

    let entries = store.find_all()?;
    if config.parallel_rebuild {
        entries.par_iter().for_each(|entry| coordinator.index_entry(entry));
    } else {
        entries.iter().for_each(|entry| coordinator.index_entry(entry));
    }

    let elapsed_ms = start.elapsed().as_millis() as u64;
    info!(
        target: "kbsearch::recovery",
        entries_indexed = entries.len(),
        elapsed_ms,
        "Search index rebuild complete"
    );
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PreviewCache;
    use crate::config::SearchConfig;
    use crate::store::InMemoryDocumentStore;
    use crate::trie::PrefixIndex;
    use kbsearch_core::{Entry, EntryId, Error};
    use std::sync::Arc;

    struct FailingStore;

    impl DocumentStore for FailingStore {
        fn find_all(&self) -> Result<Vec<Entry>> {
            Err(Error::store("collection unavailable"))
        }

        fn find_by_id(&self, _id: EntryId) -> Result<Option<Entry>> {
            Err(Error::store("collection unavailable"))
        }
    }

    fn build(store: Arc<dyn DocumentStore>, config: SearchConfig) -> SearchCoordinator {
        let cache = Arc::new(PreviewCache::new(store, &config));
        SearchCoordinator::new(Arc::new(PrefixIndex::new()), cache, config)
    }

    fn sample_store() -> Arc<InMemoryDocumentStore> {
        Arc::new(InMemoryDocumentStore::with_entries((1..=50).map(|i| {
            Entry::new(i, format!("question {}", i))
                .with_keywords([format!("topic{}", (b'a' + (i % 5) as u8) as char), "faq".to_string()])
        })))
    }

    #[test]
    fn test_rebuild_replays_all_entries() {
        let store = sample_store();
        let coordinator = build(store.clone(), SearchConfig::default());

        let replayed = rebuild_index(&coordinator, store.as_ref()).unwrap();
        assert_eq!(replayed, 50);
        assert_eq!(coordinator.search("faq").unwrap().len(), 50);
        assert_eq!(coordinator.search("topica").unwrap().len(), 10);
    }

    #[test]
    fn test_sequential_rebuild_matches_parallel() {
        let store = sample_store();
        let parallel = build(store.clone(), SearchConfig::default());
        let sequential = build(
            store.clone(),
            SearchConfig {
                parallel_rebuild: false,
                ..SearchConfig::default()
            },
        );
        rebuild_index(&parallel, store.as_ref()).unwrap();
        rebuild_index(&sequential, store.as_ref()).unwrap();

        assert_eq!(
            parallel.search("topic faq").unwrap(),
            sequential.search("topic faq").unwrap()
        );
        assert_eq!(parallel.index().node_count(), sequential.index().node_count());
    }

    #[test]
    fn test_rebuild_flushes_cache_when_configured() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let coordinator = build(
            store.clone(),
            SearchConfig {
                flush_cache_on_startup: true,
                ..SearchConfig::default()
            },
        );
        coordinator.cache().put(&Entry::new(99, "stale"));

        rebuild_index(&coordinator, store.as_ref()).unwrap();
        assert!(coordinator.cache().is_empty());
    }

    #[test]
    fn test_rebuild_propagates_store_failure() {
        let store: Arc<dyn DocumentStore> = Arc::new(FailingStore);
        let coordinator = build(store.clone(), SearchConfig::default());

        let err = rebuild_index(&coordinator, store.as_ref()).unwrap_err();
        assert!(matches!(err, Error::StoreError(_)));
        assert!(coordinator.index().is_empty());
    }
}
