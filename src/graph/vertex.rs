//! Vertex handles and vertex records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Handle to a vertex inside a [`Graph`](super::Graph).
///
/// Handles are arena indices. They are never reused after the vertex they
/// name is deleted, so a stale handle is always detected as a non-member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(usize);

impl VertexId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A graph vertex: one payload plus parent and child handle sets.
///
/// Edge sets are only mutated through the owning graph, which keeps
/// `a.children ∋ b ⟺ b.parents ∋ a` for every pair.
#[derive(Debug, Clone)]
pub struct Vertex<T> {
    pub(crate) payload: T,
    pub(crate) parents: BTreeSet<VertexId>,
    pub(crate) children: BTreeSet<VertexId>,
}

impl<T> Vertex<T> {
    pub(crate) fn new(payload: T) -> Self {
        Self {
            payload,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    /// The payload carried by this vertex.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Parent handles, in handle order.
    pub fn parents(&self) -> &BTreeSet<VertexId> {
        &self.parents
    }

    /// Child handles, in handle order.
    pub fn children(&self) -> &BTreeSet<VertexId> {
        &self.children
    }

    /// Whether `parent` is recorded as a parent of this vertex.
    pub fn has_parent(&self, parent: VertexId) -> bool {
        self.parents.contains(&parent)
    }

    /// Whether `child` is recorded as a child of this vertex.
    pub fn has_child(&self, child: VertexId) -> bool {
        self.children.contains(&child)
    }

    /// The only parent, if there is exactly one.
    pub fn sole_parent(&self) -> Option<VertexId> {
        sole(&self.parents)
    }

    /// The only child, if there is exactly one.
    pub fn sole_child(&self) -> Option<VertexId> {
        sole(&self.children)
    }

    pub(crate) fn into_payload(self) -> T {
        self.payload
    }
}

fn sole(set: &BTreeSet<VertexId>) -> Option<VertexId> {
    if set.len() == 1 {
        set.iter().next().copied()
    } else {
        None
    }
}
