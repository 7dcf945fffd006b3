//! kbsearch - incrementally maintained prefix search for knowledge-base entries
//!
//! Entries carry free-text keywords. Each keyword is normalized into a token
//! and indexed in a concurrent prefix trie; queries are split into terms,
//! looked up in parallel, and ranked by how many terms each entry matched.
//! Only active entries are returned.
//!
//! # Quick Start
//!
//! ```
//! use kbsearch::{Entry, EntryService, InMemoryDocumentStore, SearchConfig};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryDocumentStore::with_entries([
//!     Entry::new(1, "Reset a password").with_keywords(["password", "reset"]),
//!     Entry::new(2, "Password rules").with_keywords(["password"]),
//! ]));
//! let service = EntryService::open(store, SearchConfig::default()).unwrap();
//!
//! let hits = service.search("pass reset").unwrap();
//! assert_eq!(hits[0].question, "Reset a password");
//! ```
//!
//! # Architecture
//!
//! The document store is an external collaborator: implement
//! [`DocumentStore`] (and [`EntryStore`] for the lifecycle workflow) for your
//! backend. The index itself is never persisted; it is rebuilt from the
//! store when the service opens.

pub use kbsearch_core::*;
pub use kbsearch_search::*;
