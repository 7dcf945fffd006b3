//! Core types for kbsearch
//!
//! This module defines the foundational data types:
//! - EntryId: Opaque identifier correlating trie membership, cache and store
//! - Entry: A knowledge-base entry with its searchable keywords
//! - Preview: Lightweight projection returned by search and held in the cache
//! - EntryUpdate: Partial update applied by the lifecycle workflow

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an entry
///
/// Only equality carries meaning. `Ord` exists so that ties in search
/// ranking can be broken deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    /// Wrap a raw identifier
    pub const fn new(raw: u64) -> Self {
        EntryId(raw)
    }

    /// The raw identifier
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EntryId {
    fn from(raw: u64) -> Self {
        EntryId(raw)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn default_active() -> bool {
    true
}

/// A knowledge-base entry as held by the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Identifier
    pub id: EntryId,
    /// Display text shown in previews
    pub question: String,
    /// Full answer body (never indexed, never previewed)
    pub answer: String,
    /// Free-text keywords; each is normalized into one trie token
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Inactive entries are indexed but filtered out of search results
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Entry {
    /// Create an active entry with no answer body
    pub fn new(id: u64, question: impl Into<String>) -> Self {
        Entry {
            id: EntryId::new(id),
            question: question.into(),
            answer: String::new(),
            keywords: Vec::new(),
            active: true,
        }
    }

    /// Builder: set the answer body
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = answer.into();
        self
    }

    /// Builder: set the keywords
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Project this entry into its preview
    pub fn preview(&self) -> Preview {
        Preview {
            id: self.id,
            question: self.question.clone(),
            active: self.active,
        }
    }

    /// Apply a partial update in place
    ///
    /// Fields left as `None` are unchanged. The id is never touched.
    pub fn apply(&mut self, update: EntryUpdate) {
        if let Some(question) = update.question {
            self.question = question;
        }
        if let Some(answer) = update.answer {
            self.answer = answer;
        }
        if let Some(keywords) = update.keywords {
            self.keywords = keywords;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
    }
}

/// Minimal projection of an entry returned by search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    /// Identifier
    pub id: EntryId,
    /// Display text
    pub question: String,
    /// Active flag
    pub active: bool,
}

/// Partial update for an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryUpdate {
    /// New display text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// New answer body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Replacement keyword set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    /// New active flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}
