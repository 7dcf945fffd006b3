//! In-memory document store
//!
//! A DashMap-backed [`EntryStore`] for embedders without a document database,
//! and the store the test suites run against.

use dashmap::DashMap;
use kbsearch_core::{DocumentStore, Entry, EntryId, EntryStore, Result};

/// Entries keyed by id, safe for concurrent use
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    entries: DashMap<EntryId, Entry>,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`
    ///
    /// Later entries replace earlier ones with the same id.
    pub fn with_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let store = Self::new();
        for entry in entries {
            store.entries.insert(entry.id, entry);
        }
        store
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    /// Snapshot of all entries, ordered by id
    fn find_all(&self) -> Result<Vec<Entry>> {
        let mut all: Vec<Entry> = self.entries.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|e| e.id);
        Ok(all)
    }

    fn find_by_id(&self, id: EntryId) -> Result<Option<Entry>> {
        Ok(self.entries.get(&id).map(|r| r.value().clone()))
    }
}

impl EntryStore for InMemoryDocumentStore {
    fn save(&self, entry: Entry) -> Result<Entry> {
        self.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn delete(&self, id: EntryId) -> Result<()> {
        self.entries.remove(&id);
        Ok(())
    }
}
