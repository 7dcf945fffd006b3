//! Search coordinator
//!
//! Turns a raw query into ranked previews:
//! 1. Split on whitespace, normalize each term, drop invalid ones
//! 2. Look every term up in the [`PrefixIndex`] (fanned out over rayon)
//! 3. Weight each entry by the number of terms it matched
//! 4. Sort by weight, highest first; ties by ascending entry id
//! 5. Resolve previews through the [`PreviewCache`], dropping entries the
//!    store no longer has
//! 6. Drop inactive entries
//!
//! Also owns the index-maintenance entry points called by the entry
//! lifecycle: [`index_entry`](SearchCoordinator::index_entry),
//! [`unindex_entry`](SearchCoordinator::unindex_entry) and
//! [`sanitize`](SearchCoordinator::sanitize).

use crate::cache::PreviewCache;
use crate::config::SearchConfig;
use crate::normalizer::{keyword_tokens, tokenize_query};
use crate::trie::PrefixIndex;
use kbsearch_core::{Entry, EntryId, Preview, Result};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Query-path and index-maintenance entry point
///
/// Cheap to share: holds the index and cache behind `Arc`s, and every
/// method takes `&self`.
#[derive(Debug)]
pub struct SearchCoordinator {
    index: Arc<PrefixIndex>,
    cache: Arc<PreviewCache>,
    config: SearchConfig,
}

impl SearchCoordinator {
    /// Create a coordinator over an existing index and cache
    pub fn new(index: Arc<PrefixIndex>, cache: Arc<PreviewCache>, config: SearchConfig) -> Self {
        SearchCoordinator {
            index,
            cache,
            config,
        }
    }

    /// The shared prefix index
    pub fn index(&self) -> &Arc<PrefixIndex> {
        &self.index
    }

    /// The shared preview cache
    pub fn cache(&self) -> &Arc<PreviewCache> {
        &self.cache
    }

    /// Active configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// Ranked previews of the active entries matching `query`
    ///
    /// Blank or all-punctuation queries return an empty list. Entries found
    /// in the index but missing from the store are skipped.
    ///
    /// # Errors
    ///
    /// Only a document store backend failure is returned.
    pub fn search(&self, query: &str) -> Result<Vec<Preview>> {
        let terms = tokenize_query(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let term_hits = self.lookup_terms(&terms);
        let ranked = rank_by_weight(&term_hits);
        let previews = self.resolve_previews(&ranked)?;

        debug!(
            target: "kbsearch::search",
            terms = terms.len(),
            candidates = ranked.len(),
            results = previews.len(),
            "Search completed"
        );
        Ok(previews)
    }

    /// Preview of a single entry
    ///
    /// Unlike [`search`](Self::search), a missing entry is an error here.
    ///
    /// # Errors
    ///
    /// Returns `Error::EntryNotFound` if the store has no such entry.
    pub fn preview(&self, id: EntryId) -> Result<Preview> {
        self.cache.read(id)
    }

    fn lookup_terms(&self, terms: &[String]) -> Vec<HashSet<EntryId>> {
        if self.config.parallel_search {
            terms.par_iter().map(|t| self.index.search(t)).collect()
        } else {
            terms.iter().map(|t| self.index.search(t)).collect()
        }
    }

    fn resolve_previews(&self, ranked: &[(EntryId, usize)]) -> Result<Vec<Preview>> {
        // Both branches keep rank order.
        let resolved: Vec<Result<Option<Preview>>> = if self.config.parallel_search {
            ranked.par_iter().map(|&(id, _)| self.resolve(id)).collect()
        } else {
            ranked.iter().map(|&(id, _)| self.resolve(id)).collect()
        };

        let mut previews = Vec::with_capacity(resolved.len());
        for preview in resolved {
            match preview? {
                Some(p) if p.active => previews.push(p),
                _ => {}
            }
        }
        Ok(previews)
    }

    /// `Ok(None)` when the index references an entry the store lacks
    fn resolve(&self, id: EntryId) -> Result<Option<Preview>> {
        match self.cache.read(id) {
            Ok(preview) => Ok(Some(preview)),
            Err(e) if e.is_not_found() => {
                warn!(
                    target: "kbsearch::search",
                    id = %id,
                    "Indexed entry missing from store, skipping"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Index Maintenance
    // ========================================================================

    /// Index every valid keyword of `entry` and cache its preview
    pub fn index_entry(&self, entry: &Entry) {
        debug!(target: "kbsearch::search", id = %entry.id, "Indexing entry");

        for token in keyword_tokens(&entry.keywords) {
            self.index.insert(&token, entry.id);
        }
        self.cache.put(entry);
    }

    /// Remove every valid keyword of `entry` and evict its preview
    ///
    /// Pass the entry as it was indexed: keywords it no longer carries
    /// would otherwise stay in the index.
    pub fn unindex_entry(&self, entry: &Entry) {
        debug!(target: "kbsearch::search", id = %entry.id, "Unindexing entry");

        for token in keyword_tokens(&entry.keywords) {
            self.index.remove(&token, entry.id);
        }
        self.cache.evict(entry.id);
    }

    /// Prune orphaned trie nodes after keyword sets changed
    pub fn sanitize(&self) {
        self.index.cleanup_orphaned_nodes();
    }
}

/// Count, per entry, how many term result sets contain it
///
/// Sorted by weight descending, then by entry id ascending.
fn rank_by_weight(term_hits: &[HashSet<EntryId>]) -> Vec<(EntryId, usize)> {
    let mut weights: HashMap<EntryId, usize> = HashMap::new();
    for hits in term_hits {
        for id in hits {
            *weights.entry(*id).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(EntryId, usize)> = weights.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
