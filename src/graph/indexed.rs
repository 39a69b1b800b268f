//! Graph with a payload → vertex index.
//!
//! Guarantees at most one vertex per distinct payload. Lookups accept any
//! borrowed form of the payload, so a payload whose `Hash`/`Eq` delegate to
//! an identity field can be found by that identity alone.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use super::dag::Graph;
use super::error::GraphError;
use super::vertex::{Vertex, VertexId};

/// A [`Graph`] whose payloads are unique and indexed.
#[derive(Debug, Clone)]
pub struct IndexedGraph<T: Hash + Eq> {
    graph: Graph<T>,
    index: HashMap<T, VertexId>,
}

impl<T: Hash + Eq> Default for IndexedGraph<T> {
    fn default() -> Self {
        Self {
            graph: Graph::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Hash + Eq + Clone> IndexedGraph<T> {
    /// Create a new empty indexed graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an existing graph. Fails on the first repeated payload.
    pub fn from_graph(graph: Graph<T>) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(graph.len());
        for (id, vertex) in graph.vertices() {
            if let Some(&existing) = index.get(vertex.payload()) {
                return Err(GraphError::DuplicateValue { existing });
            }
            index.insert(vertex.payload().clone(), id);
        }
        Ok(Self { graph, index })
    }

    /// Insert a new payload. Fails with `DuplicateValue` if it is present.
    pub fn insert(&mut self, payload: T, parents: &[VertexId], children: &[VertexId]) -> Result<VertexId, GraphError> {
        if let Some(&existing) = self.index.get(&payload) {
            return Err(GraphError::DuplicateValue { existing });
        }
        let id = self.graph.add_vertex(payload.clone(), parents, children)?;
        self.index.insert(payload, id);
        Ok(id)
    }

    /// Insert a payload, or return the vertex already holding it.
    ///
    /// The given edges are wired onto whichever vertex is returned.
    pub fn insert_or_get(
        &mut self,
        payload: T,
        parents: &[VertexId],
        children: &[VertexId],
    ) -> Result<VertexId, GraphError> {
        let Some(&existing) = self.index.get(&payload) else {
            return self.insert(payload, parents, children);
        };

        for &other in parents.iter().chain(children) {
            if !self.graph.contains(other) {
                return Err(GraphError::NotAVertex(other));
            }
            if other == existing {
                return Err(GraphError::SelfLoop(existing));
            }
        }
        for &p in parents {
            self.graph.add_parent(existing, p)?;
        }
        for &c in children {
            self.graph.add_child(existing, c)?;
        }
        Ok(existing)
    }

    /// Delete a vertex and its index entry, returning its payload.
    pub fn delete_vertex(&mut self, id: VertexId) -> Result<T, GraphError> {
        let payload = self.graph.delete_vertex(id)?;
        self.index.remove(&payload);
        Ok(payload)
    }

    /// Look up the vertex holding `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<VertexId>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).copied()
    }

    /// Whether a vertex holds `key`.
    pub fn contains_value<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Record `parent` as a parent of `vertex`.
    pub fn add_parent(&mut self, vertex: VertexId, parent: VertexId) -> Result<(), GraphError> {
        self.graph.add_parent(vertex, parent)
    }

    /// Record `child` as a child of `vertex`.
    pub fn add_child(&mut self, vertex: VertexId, child: VertexId) -> Result<(), GraphError> {
        self.graph.add_child(vertex, child)
    }

    /// Remove the edge `parent → vertex` if present.
    pub fn remove_parent(&mut self, vertex: VertexId, parent: VertexId) -> Result<(), GraphError> {
        self.graph.remove_parent(vertex, parent)
    }

    /// Remove the edge `vertex → child` if present.
    pub fn remove_child(&mut self, vertex: VertexId, child: VertexId) -> Result<(), GraphError> {
        self.graph.remove_child(vertex, child)
    }

    /// Get a vertex by handle.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex<T>> {
        self.graph.vertex(id)
    }

    /// Get a payload by handle.
    pub fn payload(&self, id: VertexId) -> Option<&T> {
        self.graph.payload(id)
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// The underlying ordinary graph.
    pub fn graph(&self) -> &Graph<T> {
        &self.graph
    }

    /// Drop the index and keep the ordinary graph.
    pub fn into_graph(self) -> Graph<T> {
        self.graph
    }

    /// Verify graph invariants plus index consistency.
    pub fn check_invariants(&self) -> Result<(), GraphError> {
        self.graph.check_invariants()?;
        if self.index.len() != self.graph.len() {
            return Err(GraphError::IndexOutOfSync("index size differs from vertex count"));
        }
        for (payload, &id) in &self.index {
            if self.graph.payload(id) != Some(payload) {
                return Err(GraphError::IndexOutOfSync("index entry points at a different payload"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut graph = IndexedGraph::new();
        let a = graph.insert("a".to_string(), &[], &[]).unwrap();

        let err = graph.insert("a".to_string(), &[], &[]).unwrap_err();

        assert_eq!(err, GraphError::DuplicateValue { existing: a });
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_insert_or_get_is_idempotent() {
        let mut graph = IndexedGraph::new();
        let first = graph.insert_or_get(7u32, &[], &[]).unwrap();
        let second = graph.insert_or_get(7u32, &[], &[]).unwrap();

        assert_eq!(first, second);
        assert_eq!(graph.len(), 1);
        graph.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_or_get_wires_edges_onto_existing() {
        let mut graph = IndexedGraph::new();
        let parent = graph.insert(1u32, &[], &[]).unwrap();
        let child = graph.insert(2u32, &[], &[]).unwrap();

        let again = graph.insert_or_get(2u32, &[parent], &[]).unwrap();

        assert_eq!(again, child);
        assert!(graph.graph().is_parent_of(parent, child));
        graph.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_or_get_rejects_self_edge_on_existing() {
        let mut graph = IndexedGraph::new();
        let a = graph.insert(1u32, &[], &[]).unwrap();

        assert_eq!(graph.insert_or_get(1u32, &[a], &[]), Err(GraphError::SelfLoop(a)));
    }

    #[test]
    fn test_delete_removes_index_entry() {
        let mut graph = IndexedGraph::new();
        let a = graph.insert("a".to_string(), &[], &[]).unwrap();

        graph.delete_vertex(a).unwrap();

        assert!(!graph.contains_value("a"));
        let b = graph.insert("a".to_string(), &[], &[]).unwrap();
        assert_ne!(a, b);
        graph.check_invariants().unwrap();
    }

    #[test]
    fn test_lookup_by_borrowed_form() {
        let mut graph = IndexedGraph::new();
        let id = graph.insert("main".to_string(), &[], &[]).unwrap();

        assert_eq!(graph.get("main"), Some(id));
        assert_eq!(graph.get("other"), None);
    }

    #[test]
    fn test_from_graph_detects_duplicates() {
        let mut plain = Graph::new();
        let first = plain.add_isolated('x');
        plain.add_isolated('x');

        let err = IndexedGraph::from_graph(plain).unwrap_err();
        assert_eq!(err, GraphError::DuplicateValue { existing: first });
    }
}
