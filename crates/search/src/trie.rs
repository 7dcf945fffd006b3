//! Concurrent prefix trie
//!
//! This module provides:
//! - TrieNode with a concurrent child map and a concurrent id set
//! - PrefixIndex: insert / search / remove / orphan cleanup
//!
//! Every operation takes a token already produced by the normalizer and
//! accepted by [`crate::normalizer::is_valid`]. Nothing here returns an error.
//!
//! # Thread Safety
//!
//! Uses DashMap/DashSet per node, so there is no tree-wide lock. Children are
//! held as `Arc<TrieNode>` so a walker can release the parent's shard lock
//! before descending. The tree is still strictly parent-owns-child: nodes are
//! never shared between parents and hold no back-references.
//!
//! Lock order is always parent before child:
//! - `insert` adds the id to a child while holding the parent's entry guard
//!   for that child's key
//! - cleanup unlinks a child with `remove_if` on the parent, re-checking the
//!   child's emptiness under the same shard lock
//!
//! A child that has received an id is therefore never unlinked, and an id is
//! never written into a node that cleanup has already detached.

use crate::normalizer::WILDCARD;
use dashmap::{DashMap, DashSet};
use kbsearch_core::EntryId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

// ============================================================================
// TrieNode
// ============================================================================

/// One character position in the trie
#[derive(Debug, Default)]
struct TrieNode {
    /// Character -> child node
    children: DashMap<char, Arc<TrieNode>>,
    /// Entries with a keyword whose token has this node's path as a prefix
    ids: DashSet<EntryId>,
}

impl TrieNode {
    fn new() -> Self {
        Self::default()
    }

    /// A node with no ids and no children has no reason to exist
    fn is_orphaned(&self) -> bool {
        self.ids.is_empty() && self.children.is_empty()
    }

    fn child(&self, c: char) -> Option<Arc<TrieNode>> {
        self.children.get(&c).map(|r| Arc::clone(r.value()))
    }

    fn snapshot_ids(&self) -> HashSet<EntryId> {
        self.ids.iter().map(|r| *r.key()).collect()
    }

    fn count_nodes(&self) -> usize {
        let children: Vec<Arc<TrieNode>> =
            self.children.iter().map(|r| Arc::clone(r.value())).collect();
        1 + children.iter().map(|c| c.count_nodes()).sum::<usize>()
    }
}

// ============================================================================
// PrefixIndex
// ============================================================================

/// Prefix trie mapping tokens to the entries indexed under them
///
/// Construct one per process (or per test) and share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct PrefixIndex {
    root: TrieNode,
}

impl PrefixIndex {
    /// Create an empty index
    pub fn new() -> Self {
        PrefixIndex {
            root: TrieNode::new(),
        }
    }

    /// Index `id` under `token`
    ///
    /// Every prefix of `token` (length >= 1) will afterwards match `id`.
    /// Not atomic across characters: a concurrent search may see the shorter
    /// prefixes updated before the longer ones.
    pub fn insert(&self, token: &str, id: EntryId) {
        let mut chars = token.chars();
        let Some(first) = chars.next() else {
            return;
        };

        let mut current = Self::link_child(&self.root, first, id);
        for c in chars {
            current = Self::link_child(&current, c, id);
        }
    }

    /// Get or create the child for `c` and add `id` to it under the parent's guard
    fn link_child(parent: &TrieNode, c: char, id: EntryId) -> Arc<TrieNode> {
        let entry = parent
            .children
            .entry(c)
            .or_insert_with(|| Arc::new(TrieNode::new()));
        entry.value().ids.insert(id);
        Arc::clone(entry.value())
    }

    /// Entries indexed under any keyword that `token` is a prefix of
    ///
    /// On a dead end, falls back to the wildcard child of the last node
    /// reached (entries indexed under a `*`-suffixed keyword), else empty.
    /// Returns an owned snapshot.
    pub fn search(&self, token: &str) -> HashSet<EntryId> {
        let mut chars = token.chars();
        let Some(first) = chars.next() else {
            return HashSet::new();
        };

        let mut current = match self.root.child(first) {
            Some(node) => node,
            None => return Self::wildcard_ids(&self.root),
        };
        for c in chars {
            current = match current.child(c) {
                Some(node) => node,
                None => return Self::wildcard_ids(&current),
            };
        }
        current.snapshot_ids()
    }

    fn wildcard_ids(node: &TrieNode) -> HashSet<EntryId> {
        node.child(WILDCARD)
            .map(|star| star.snapshot_ids())
            .unwrap_or_default()
    }

    /// Remove `id` from every node along `token`'s path
    ///
    /// Stops silently at the first missing child, so removing a token that
    /// was never indexed is a no-op. Does not unlink nodes; see
    /// [`cleanup_orphaned_nodes`](Self::cleanup_orphaned_nodes).
    pub fn remove(&self, token: &str, id: EntryId) {
        trace!(target: "kbsearch::search", token, id = %id, "Removing token");

        let mut chars = token.chars();
        let Some(first) = chars.next() else {
            return;
        };

        let Some(mut current) = self.root.child(first) else {
            return;
        };
        current.ids.remove(&id);
        for c in chars {
            current = match current.child(c) {
                Some(node) => node,
                None => return,
            };
            current.ids.remove(&id);
        }
    }

    /// Prune every node left with no ids and no children
    ///
    /// Post-order: a node's subtree is cleaned before the node itself is
    /// considered. The root is never pruned.
    pub fn cleanup_orphaned_nodes(&self) {
        debug!(target: "kbsearch::search", "Starting trie cleanup");
        let pruned = Self::cleanup_node(&self.root);
        debug!(target: "kbsearch::search", pruned, "Trie cleanup completed");
    }

    /// Clean `node`'s subtree, returning the number of nodes unlinked
    fn cleanup_node(node: &TrieNode) -> usize {
        // Snapshot first: no iterator guard may be held across remove_if.
        let children: Vec<(char, Arc<TrieNode>)> = node
            .children
            .iter()
            .map(|r| (*r.key(), Arc::clone(r.value())))
            .collect();

        let mut pruned = 0;
        for (c, child) in children {
            pruned += Self::cleanup_node(&child);
            let removed = node
                .children
                .remove_if(&c, |_, linked| {
                    Arc::ptr_eq(linked, &child) && linked.is_orphaned()
                })
                .is_some();
            if removed {
                pruned += 1;
            }
        }
        pruned
    }

    /// Whether the index holds nothing at all
    pub fn is_empty(&self) -> bool {
        self.root.is_orphaned()
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }
}

// ============================================================================
// Tests
// ============================================================================
