//! Prefix search for knowledge-base entries
//!
//! This crate provides:
//! - Keyword normalizer (NFKC, lowercase, letters plus trailing wildcard)
//! - PrefixIndex: concurrent prefix trie with orphan cleanup
//! - PreviewCache: cache-aside previews in front of a DocumentStore
//! - SearchCoordinator: tokenize, parallel per-term lookup, weight, resolve
//! - Startup index rebuild from the document store
//! - EntryService: create/update/delete workflow keeping the index in step
//! - SearchConfig loaded from `kbsearch.toml`
//!
//! # Usage
//!
//! ```
//! use kbsearch_core::Entry;
//! use kbsearch_search::{EntryService, InMemoryDocumentStore, SearchConfig};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let service = EntryService::open(store, SearchConfig::default()).unwrap();
//!
//! service
//!     .create(Entry::new(7, "Why is the network slow?").with_keywords(["network"]))
//!     .unwrap();
//! let hits = service.search("net").unwrap();
//! assert_eq!(hits[0].id.as_u64(), 7);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod normalizer;
pub mod recovery;
pub mod service;
pub mod store;
pub mod trie;

// Re-export commonly used types
pub use cache::{CacheStats, PreviewCache};
pub use config::SearchConfig;
pub use coordinator::SearchCoordinator;
pub use normalizer::{is_valid, normalize, tokenize_query};
pub use recovery::rebuild_index;
pub use service::EntryService;
pub use store::InMemoryDocumentStore;
pub use trie::PrefixIndex;
