//! Arena-backed directed acyclic graph with mutual parent/child edges.
//!
//! ## Invariants
//!
//! - **Symmetry**: `w ∈ v.children ⟺ v ∈ w.parents`
//! - **Closure**: every handle stored in an edge set names a live member
//!
//! Every mutating method validates its handles before touching any edge
//! set, so a failed call leaves the graph unchanged.

use std::collections::{BTreeSet, HashSet};

use super::error::{EdgeRelation, GraphError};
use super::vertex::{Vertex, VertexId};

/// A graph owning its vertices in an arena.
///
/// Deleted vertices leave a tombstone so handles are never reused.
/// Cloning produces a structurally independent copy: edges are plain
/// handles into the copy's own arena, so nothing is shared with the source.
#[derive(Debug, Clone)]
pub struct Graph<T> {
    slots: Vec<Option<Vertex<T>>>,
    live: usize,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }
}

impl<T> Graph<T> {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live vertices.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Whether `id` names a live member of this graph.
    pub fn contains(&self, id: VertexId) -> bool {
        matches!(self.slots.get(id.index()), Some(Some(_)))
    }

    /// Get a vertex by handle.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex<T>> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a vertex's payload by handle.
    pub fn payload(&self, id: VertexId) -> Option<&T> {
        self.vertex(id).map(Vertex::payload)
    }

    /// Iterate live vertices in handle order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex<T>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (VertexId::new(i), v)))
    }

    /// Iterate live vertex handles in order.
    pub fn ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices().map(|(id, _)| id)
    }

    /// All `(parent, child)` edges, sorted.
    pub fn edges(&self) -> Vec<(VertexId, VertexId)> {
        self.vertices()
            .flat_map(|(id, v)| v.children.iter().map(move |&c| (id, c)))
            .collect()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.vertices().map(|(_, v)| v.children.len()).sum()
    }

    /// Create a new vertex and wire it to the given parents and children.
    ///
    /// All handles are validated first; on error no vertex is created.
    pub fn add_vertex(
        &mut self,
        payload: T,
        parents: &[VertexId],
        children: &[VertexId],
    ) -> Result<VertexId, GraphError> {
        let parents: BTreeSet<VertexId> = parents.iter().copied().collect();
        let children: BTreeSet<VertexId> = children.iter().copied().collect();
        for &id in parents.iter().chain(children.iter()) {
            self.require(id)?;
        }

        let id = VertexId::new(self.slots.len());
        self.slots.push(Some(Vertex::new(payload)));
        self.live += 1;

        for p in parents {
            self.link(p, id);
        }
        for c in children {
            self.link(id, c);
        }
        Ok(id)
    }

    /// Create an isolated vertex.
    pub fn add_isolated(&mut self, payload: T) -> VertexId {
        let id = VertexId::new(self.slots.len());
        self.slots.push(Some(Vertex::new(payload)));
        self.live += 1;
        id
    }

    /// Record `parent` as a parent of `vertex` (and `vertex` as its child).
    pub fn add_parent(&mut self, vertex: VertexId, parent: VertexId) -> Result<(), GraphError> {
        self.check_link(parent, vertex)?;
        self.link(parent, vertex);
        Ok(())
    }

    /// Record `child` as a child of `vertex` (and `vertex` as its parent).
    pub fn add_child(&mut self, vertex: VertexId, child: VertexId) -> Result<(), GraphError> {
        self.check_link(vertex, child)?;
        self.link(vertex, child);
        Ok(())
    }

    /// Remove the edge `parent → vertex` if present.
    pub fn remove_parent(&mut self, vertex: VertexId, parent: VertexId) -> Result<(), GraphError> {
        self.require(vertex)?;
        self.require(parent)?;
        self.unlink(parent, vertex);
        Ok(())
    }

    /// Remove the edge `vertex → child` if present.
    pub fn remove_child(&mut self, vertex: VertexId, child: VertexId) -> Result<(), GraphError> {
        self.require(vertex)?;
        self.require(child)?;
        self.unlink(vertex, child);
        Ok(())
    }

    /// Whether `parent` is a parent of `vertex`.
    pub fn is_parent_of(&self, parent: VertexId, vertex: VertexId) -> bool {
        self.vertex(vertex).map_or(false, |v| v.has_parent(parent))
    }

    /// Whether `child` is a child of `vertex`.
    pub fn is_child_of(&self, child: VertexId, vertex: VertexId) -> bool {
        self.vertex(vertex).map_or(false, |v| v.has_child(child))
    }

    /// Sever every edge incident to `id` and remove it, returning its payload.
    pub fn delete_vertex(&mut self, id: VertexId) -> Result<T, GraphError> {
        self.require(id)?;
        let vertex = self.slots[id.index()]
            .take()
            .ok_or(GraphError::NotAVertex(id))?;
        self.live -= 1;

        for p in &vertex.parents {
            if let Some(parent) = self.slot_mut(*p) {
                parent.children.remove(&id);
            }
        }
        for c in &vertex.children {
            if let Some(child) = self.slot_mut(*c) {
                child.parents.remove(&id);
            }
        }
        Ok(vertex.into_payload())
    }

    /// Build a derived graph with the same handles and topology and
    /// payloads transformed by `f`.
    pub fn map_payloads<U, F>(&self, mut f: F) -> Graph<U>
    where
        F: FnMut(VertexId, &T) -> U,
    {
        let slots = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.as_ref().map(|v| Vertex {
                    payload: f(VertexId::new(i), &v.payload),
                    parents: v.parents.clone(),
                    children: v.children.clone(),
                })
            })
            .collect();
        Graph {
            slots,
            live: self.live,
        }
    }

    /// Verify symmetry and closure over the whole graph.
    ///
    /// Walks every edge set of every live vertex; the first dangling or
    /// unreciprocated entry is reported. Intended for tests and debugging.
    pub fn check_invariants(&self) -> Result<(), GraphError> {
        let members: HashSet<VertexId> = self.ids().collect();

        for (id, vertex) in self.vertices() {
            for &p in &vertex.parents {
                if !members.contains(&p) {
                    return Err(violation(id, EdgeRelation::Parent, p, "partner is not a member"));
                }
                if !self.is_child_of(id, p) {
                    return Err(violation(id, EdgeRelation::Parent, p, "partner does not list vertex as child"));
                }
            }
            for &c in &vertex.children {
                if !members.contains(&c) {
                    return Err(violation(id, EdgeRelation::Child, c, "partner is not a member"));
                }
                if !self.is_parent_of(id, c) {
                    return Err(violation(id, EdgeRelation::Child, c, "partner does not list vertex as parent"));
                }
            }
        }
        Ok(())
    }

    fn require(&self, id: VertexId) -> Result<(), GraphError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(GraphError::NotAVertex(id))
        }
    }

    fn check_link(&self, parent: VertexId, child: VertexId) -> Result<(), GraphError> {
        self.require(parent)?;
        self.require(child)?;
        if parent == child {
            return Err(GraphError::SelfLoop(parent));
        }
        Ok(())
    }

    fn slot_mut(&mut self, id: VertexId) -> Option<&mut Vertex<T>> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    // Both endpoints must already be validated.
    fn link(&mut self, parent: VertexId, child: VertexId) {
        if let Some(p) = self.slot_mut(parent) {
            p.children.insert(child);
        }
        if let Some(c) = self.slot_mut(child) {
            c.parents.insert(parent);
        }
    }

    fn unlink(&mut self, parent: VertexId, child: VertexId) {
        if let Some(p) = self.slot_mut(parent) {
            p.children.remove(&child);
        }
        if let Some(c) = self.slot_mut(child) {
            c.parents.remove(&parent);
        }
    }

    /// Record `parent` on `child` without the reverse entry.
    #[cfg(test)]
    pub(crate) fn corrupt_one_sided_parent(&mut self, child: VertexId, parent: VertexId) {
        if let Some(c) = self.slot_mut(child) {
            c.parents.insert(parent);
        }
    }
}

fn violation(vertex: VertexId, relation: EdgeRelation, partner: VertexId, reason: &'static str) -> GraphError {
    GraphError::IntegrityViolation {
        vertex,
        relation,
        partner,
        reason,
    }
}
