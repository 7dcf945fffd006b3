//! Entry lifecycle workflow
//!
//! [`EntryService`] is the create/update/delete path that keeps the index in
//! step with the store. Every keyword-set change follows the same order:
//!
//! 1. `unindex_entry(old state)`
//! 2. apply the change and save it
//! 3. `index_entry(new state)`
//! 4. `sanitize()`
//!
//! Operations on the same id are serialized for the whole sequence, so two
//! concurrent updates cannot both unindex the same old state and leave both
//! new keyword sets in the trie.
//!
//! Lookups by id here surface `Error::EntryNotFound` to the caller, unlike
//! the search path which drops missing entries silently.

use crate::cache::PreviewCache;
use crate::config::SearchConfig;
use crate::coordinator::SearchCoordinator;
use crate::recovery::rebuild_index;
use crate::trie::PrefixIndex;
use dashmap::DashMap;
use kbsearch_core::{DocumentStore, Entry, EntryId, EntryStore, EntryUpdate, Error, Preview, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Store-backed entry workflow with search
pub struct EntryService<S: EntryStore + 'static> {
    store: Arc<S>,
    coordinator: Arc<SearchCoordinator>,
    /// Per-id lifecycle locks, present only while an operation holds one
    entry_locks: DashMap<EntryId, Arc<Mutex<()>>>,
}

impl<S: EntryStore + 'static> EntryService<S> {
    /// Wrap an existing coordinator
    ///
    /// The coordinator's cache must read from the same `store`.
    pub fn new(store: Arc<S>, coordinator: Arc<SearchCoordinator>) -> Self {
        EntryService {
            store,
            coordinator,
            entry_locks: DashMap::new(),
        }
    }

    /// Build index, cache and coordinator over `store` and rebuild the index
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the store cannot list its
    /// entries.
    pub fn open(store: Arc<S>, config: SearchConfig) -> Result<Self> {
        config.validate()?;

        let reader: Arc<dyn DocumentStore> = store.clone();
        let cache = Arc::new(PreviewCache::new(reader, &config));
        let coordinator = Arc::new(SearchCoordinator::new(
            Arc::new(PrefixIndex::new()),
            cache,
            config,
        ));
        rebuild_index(&coordinator, store.as_ref())?;

        Ok(Self::new(store, coordinator))
    }

    /// The coordinator shared with query traffic
    pub fn coordinator(&self) -> &Arc<SearchCoordinator> {
        &self.coordinator
    }

    /// Ranked previews for `query`; see [`SearchCoordinator::search`]
    ///
    /// # Errors
    ///
    /// Only a document store backend failure is returned.
    pub fn search(&self, query: &str) -> Result<Vec<Preview>> {
        self.coordinator.search(query)
    }

    /// Load one entry
    ///
    /// # Errors
    ///
    /// Returns `Error::EntryNotFound` if the store has no such entry.
    pub fn get(&self, id: EntryId) -> Result<Entry> {
        self.store.find_by_id(id)?.ok_or(Error::EntryNotFound(id))
    }

    /// Preview of one entry, through the cache
    ///
    /// # Errors
    ///
    /// Returns `Error::EntryNotFound` if the store has no such entry.
    pub fn preview(&self, id: EntryId) -> Result<Preview> {
        self.coordinator.preview(id)
    }

    /// Save and index a new entry
    ///
    /// Saving over an existing id replaces it: the previous keywords are
    /// unindexed first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn create(&self, entry: Entry) -> Result<Entry> {
        self.with_entry_lock(entry.id, || self.create_locked(entry))
    }

    fn create_locked(&self, entry: Entry) -> Result<Entry> {
        let previous = self.store.find_by_id(entry.id)?;
        if let Some(previous) = &previous {
            self.coordinator.unindex_entry(previous);
        }

        let saved = match self.store.save(entry) {
            Ok(saved) => saved,
            Err(e) => {
                if let Some(previous) = &previous {
                    self.coordinator.index_entry(previous);
                }
                return Err(e);
            }
        };
        self.coordinator.index_entry(&saved);
        if previous.is_some() {
            self.coordinator.sanitize();
        }

        info!(target: "kbsearch::search", id = %saved.id, "Saved and indexed entry");
        Ok(saved)
    }

    /// Apply a partial update and re-index
    ///
    /// # Errors
    ///
    /// Returns `Error::EntryNotFound` if the entry does not exist, or the
    /// store's error if saving fails (the previous state stays indexed).
    pub fn update(&self, id: EntryId, update: EntryUpdate) -> Result<Entry> {
        self.with_entry_lock(id, || self.update_locked(id, update))
    }

    fn update_locked(&self, id: EntryId, update: EntryUpdate) -> Result<Entry> {
        info!(target: "kbsearch::search", id = %id, "Updating entry");

        let current = self.get(id)?;
        self.coordinator.unindex_entry(&current);

        let mut updated = current.clone();
        updated.apply(update);
        let saved = match self.store.save(updated) {
            Ok(saved) => saved,
            Err(e) => {
                warn!(target: "kbsearch::search", id = %id, error = %e, "Update failed, restoring index");
                self.coordinator.index_entry(&current);
                return Err(e);
            }
        };

        self.coordinator.index_entry(&saved);
        self.coordinator.sanitize();

        info!(target: "kbsearch::search", id = %id, "Updated and re-indexed entry");
        Ok(saved)
    }

    /// Unindex and delete an entry
    ///
    /// # Errors
    ///
    /// Returns `Error::EntryNotFound` if the entry does not exist, or the
    /// store's error if deletion fails (the entry is re-indexed).
    pub fn delete(&self, id: EntryId) -> Result<()> {
        self.with_entry_lock(id, || self.delete_locked(id))
    }

    fn delete_locked(&self, id: EntryId) -> Result<()> {
        info!(target: "kbsearch::search", id = %id, "Deleting entry");

        let current = self.get(id)?;
        self.coordinator.unindex_entry(&current);
        self.coordinator.sanitize();

        if let Err(e) = self.store.delete(id) {
            warn!(target: "kbsearch::search", id = %id, error = %e, "Delete failed, restoring index");
            self.coordinator.index_entry(&current);
            return Err(e);
        }

        info!(target: "kbsearch::search", id = %id, "Deleted entry");
        Ok(())
    }

    /// Run `op` holding the lifecycle lock for `id`
    fn with_entry_lock<T>(&self, id: EntryId, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = Arc::clone(self.entry_locks.entry(id).or_default().value());
        let result = {
            let _guard = lock.lock();
            op()
        };
        drop(lock);

        // Clones are only taken under the map's shard lock, so a count of
        // one means no other operation holds or is waiting on this id.
        self.entry_locks
            .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }
}
