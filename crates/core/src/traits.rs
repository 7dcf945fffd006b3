//! Core traits for the document store boundary
//!
//! The search core never owns entry persistence. It is handed an
//! implementation of these traits and only reads through `DocumentStore`;
//! the lifecycle workflow additionally writes through `EntryStore`.

use crate::error::Result;
use crate::types::{Entry, EntryId};

/// Read access to the collection that holds indexable entries
///
/// Thread safety: All methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait DocumentStore: Send + Sync {
    /// Every currently stored entry
    ///
    /// Used once at startup to rebuild the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_all(&self) -> Result<Vec<Entry>>;

    /// Look up one entry
    ///
    /// Returns `Ok(None)` if the store has no such id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_by_id(&self, id: EntryId) -> Result<Option<Entry>>;
}

/// Write access used by the create/update/delete workflow
pub trait EntryStore: DocumentStore {
    /// Insert or replace an entry, returning what was stored
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn save(&self, entry: Entry) -> Result<Entry>;

    /// Remove an entry; removing an absent id is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete(&self, id: EntryId) -> Result<()>;
}
