//! Core types and traits for kbsearch
//!
//! This crate defines the foundational types used throughout the system:
//! - EntryId: Opaque identifier for knowledge-base entries
//! - Entry / EntryUpdate: Stored entries and partial updates
//! - Preview: Projection returned by search
//! - Error: Error type hierarchy
//! - Traits: Document store boundary (DocumentStore, EntryStore)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use traits::{DocumentStore, EntryStore};
pub use types::{Entry, EntryId, EntryUpdate, Preview};
