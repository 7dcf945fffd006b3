//! Search contract tests
//!
//! End-to-end behavior of the query path and the index-maintenance entry
//! points, run against the in-memory document store.

use kbsearch_core::{DocumentStore, Entry, EntryId, EntryUpdate, Error, Preview, Result};
use kbsearch_search::{
    normalize, EntryService, InMemoryDocumentStore, PrefixIndex, PreviewCache, SearchConfig,
    SearchCoordinator,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn coordinator_with(store: Arc<dyn DocumentStore>) -> SearchCoordinator {
    let config = SearchConfig::default();
    let cache = Arc::new(PreviewCache::new(store, &config));
    SearchCoordinator::new(Arc::new(PrefixIndex::new()), cache, config)
}

fn ids_of(previews: &[Preview]) -> Vec<u64> {
    previews.iter().map(|p| p.id.as_u64()).collect()
}

/// Store whose lookups can be switched to fail
struct FlakyStore {
    inner: InMemoryDocumentStore,
    failing: AtomicBool,
}

impl DocumentStore for FlakyStore {
    fn find_all(&self) -> Result<Vec<Entry>> {
        self.inner.find_all()
    }

    fn find_by_id(&self, id: EntryId) -> Result<Option<Entry>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::store("document store timed out"));
        }
        self.inner.find_by_id(id)
    }
}

// ============================================================================
// Query Path
// ============================================================================

/// Index, search by prefix, unindex, search again
#[test]
fn test_network_scenario() {
    let entry = Entry::new(7, "Network troubleshooting").with_keywords(["network"]);
    let store = Arc::new(InMemoryDocumentStore::with_entries([entry.clone()]));
    let coordinator = coordinator_with(store);

    coordinator.index_entry(&entry);
    let results = coordinator.search("net").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, EntryId::new(7));

    coordinator.unindex_entry(&entry);
    assert!(coordinator.search("net").unwrap().is_empty());
}

/// An entry matching more terms ranks higher
#[test]
fn test_more_matched_terms_rank_first() {
    let a = Entry::new(10, "A").with_keywords(["printer", "driver"]);
    let b = Entry::new(2, "B").with_keywords(["printer"]);
    let c = Entry::new(30, "C").with_keywords(["printer", "driver", "windows"]);
    let store = Arc::new(InMemoryDocumentStore::with_entries([
        a.clone(),
        b.clone(),
        c.clone(),
    ]));
    let coordinator = coordinator_with(store);
    for e in [&a, &b, &c] {
        coordinator.index_entry(e);
    }

    let results = coordinator.search("print driv win").unwrap();
    assert_eq!(ids_of(&results), vec![30, 10, 2]);
}

/// Inactive entries never surface, whatever they match
#[test]
fn test_inactive_never_returned() {
    let inactive = Entry::new(1, "old")
        .with_keywords(["billing", "invoice"])
        .with_active(false);
    let active = Entry::new(2, "new").with_keywords(["billing"]);
    let store = Arc::new(InMemoryDocumentStore::with_entries([
        inactive.clone(),
        active.clone(),
    ]));
    let coordinator = coordinator_with(store);
    coordinator.index_entry(&inactive);
    coordinator.index_entry(&active);

    let results = coordinator.search("billing invoice").unwrap();
    assert_eq!(ids_of(&results), vec![2]);
}

/// Ids present in the trie but gone from store and cache are omitted
#[test]
fn test_index_store_drift_is_tolerated() {
    let kept = Entry::new(1, "kept").with_keywords(["shared"]);
    let gone = Entry::new(2, "gone").with_keywords(["shared"]);
    let store = Arc::new(InMemoryDocumentStore::with_entries([kept.clone()]));
    let coordinator = coordinator_with(store.clone());

    coordinator.index_entry(&kept);
    coordinator.index_entry(&gone);
    coordinator.cache().evict(gone.id);

    let results = coordinator.search("shared").unwrap();
    assert_eq!(ids_of(&results), vec![1]);
}

/// Cache misses load from the store
#[test]
fn test_cache_miss_reads_through() {
    let entry = Entry::new(3, "From the store").with_keywords(["store"]);
    let store = Arc::new(InMemoryDocumentStore::with_entries([entry.clone()]));
    let coordinator = coordinator_with(store);
    coordinator.index().insert(&normalize("store"), entry.id);

    let results = coordinator.search("store").unwrap();
    assert_eq!(results, vec![entry.preview()]);
    assert_eq!(coordinator.cache().stats().misses, 1);
    coordinator.search("store").unwrap();
    assert_eq!(coordinator.cache().stats().hits, 1);
}

/// A failing backend is an error, not an empty result
#[test]
fn test_store_failure_propagates() {
    let store = Arc::new(FlakyStore {
        inner: InMemoryDocumentStore::with_entries([Entry::new(1, "q")]),
        failing: AtomicBool::new(true),
    });
    let coordinator = coordinator_with(store.clone());
    coordinator.index().insert("keyword", EntryId::new(1));

    let err = coordinator.search("key").unwrap_err();
    assert!(matches!(err, Error::StoreError(_)));

    store.failing.store(false, Ordering::SeqCst);
    assert_eq!(ids_of(&coordinator.search("key").unwrap()), vec![1]);
}

/// Explicit wildcard keywords act as a catch-all below their prefix
#[test]
fn test_wildcard_keyword_catch_all() {
    let entry = Entry::new(5, "Anything about mail").with_keywords(["mail*"]);
    let store = Arc::new(InMemoryDocumentStore::with_entries([entry.clone()]));
    let coordinator = coordinator_with(store);
    coordinator.index_entry(&entry);

    assert_eq!(ids_of(&coordinator.search("mailbox").unwrap()), vec![5]);
    assert_eq!(ids_of(&coordinator.search("mail").unwrap()), vec![5]);
    assert!(coordinator.search("mbox").unwrap().is_empty());
}

/// Query terms are normalized like keywords
#[test]
fn test_query_normalization() {
    let entry = Entry::new(1, "Café menu").with_keywords(["Café"]);
    let store = Arc::new(InMemoryDocumentStore::with_entries([entry.clone()]));
    let coordinator = coordinator_with(store);
    coordinator.index_entry(&entry);

    assert_eq!(ids_of(&coordinator.search("CAFÉ!!").unwrap()), vec![1]);
    assert_eq!(ids_of(&coordinator.search("  ca  ").unwrap()), vec![1]);
    assert!(coordinator.search("cafe").unwrap().is_empty());
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Update flow: old keywords go, new keywords arrive, orphans are pruned
#[test]
fn test_update_flow_keeps_index_consistent() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let service = EntryService::open(store.clone(), SearchConfig::default()).unwrap();

    service
        .create(Entry::new(1, "Email setup").with_keywords(["email", "outlook"]))
        .unwrap();
    service
        .create(Entry::new(2, "Email quota").with_keywords(["email"]))
        .unwrap();

    service
        .update(
            EntryId::new(1),
            EntryUpdate {
                keywords: Some(vec!["thunderbird".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(ids_of(&service.search("email").unwrap()), vec![2]);
    assert!(service.search("outlook").unwrap().is_empty());
    assert_eq!(ids_of(&service.search("thunder").unwrap()), vec![1]);
    assert_eq!(
        store.find_by_id(EntryId::new(1)).unwrap().unwrap().keywords,
        vec!["thunderbird"]
    );
}

/// Deleting every entry leaves an empty trie
#[test]
fn test_delete_all_leaves_empty_index() {
    let store = Arc::new(InMemoryDocumentStore::with_entries((1..=10).map(|i| {
        Entry::new(i, format!("entry {}", i)).with_keywords([format!("kw{}", i), "common".into()])
    })));
    let service = EntryService::open(store.clone(), SearchConfig::default()).unwrap();
    assert_eq!(service.search("common").unwrap().len(), 10);

    for i in 1..=10 {
        service.delete(EntryId::new(i)).unwrap();
    }

    assert!(store.is_empty());
    assert!(service.search("common").unwrap().is_empty());
    assert!(service.coordinator().index().is_empty());
    assert_eq!(service.coordinator().index().node_count(), 1);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Every prefix of an inserted token finds the id
    #[test]
    fn prop_every_prefix_matches(word in "[a-zé]{1,12}", raw_id in 0u64..1000) {
        let index = PrefixIndex::new();
        let id = EntryId::new(raw_id);
        index.insert(&word, id);

        let chars: Vec<char> = word.chars().collect();
        for len in 1..=chars.len() {
            let prefix: String = chars[..len].iter().collect();
            prop_assert!(index.search(&prefix).contains(&id));
        }
    }

    /// Inserting then removing every token and cleaning up restores an empty trie
    #[test]
    fn prop_insert_remove_cleanup_is_empty(words in prop::collection::vec("[a-d]{1,6}", 1..20)) {
        let index = PrefixIndex::new();
        for (i, w) in words.iter().enumerate() {
            index.insert(w, EntryId::new(i as u64));
        }
        for (i, w) in words.iter().enumerate() {
            index.remove(w, EntryId::new(i as u64));
        }
        index.cleanup_orphaned_nodes();
        prop_assert!(index.is_empty());
    }

    /// Search results are exactly the ids whose token starts with the query
    #[test]
    fn prop_search_matches_naive_prefix_scan(
        words in prop::collection::vec("[a-c]{1,5}", 1..15),
        query in "[a-c]{1,3}",
    ) {
        let index = PrefixIndex::new();
        for (i, w) in words.iter().enumerate() {
            index.insert(w, EntryId::new(i as u64));
        }

        let expected: HashSet<EntryId> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| w.starts_with(query.as_str()))
            .map(|(i, _)| EntryId::new(i as u64))
            .collect();
        prop_assert_eq!(index.search(&query), expected);
    }
}
