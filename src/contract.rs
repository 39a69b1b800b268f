//! Run discovery and run contraction.
//!
//! A **run** is a maximal chain `v1 → v2 → … → vk` (parent to child) where
//! every link is contractible: the parent has exactly one child, the child
//! has exactly one parent, and the parent is not a highlighted payload.
//! Interesting vertices (highlighted payloads, roots, leaves, forks, merges)
//! never sit inside a run. They only terminate one:
//!
//! ```text
//!   C1   C2           [C1]  [C2]
//!     \ /               \   /
//!      C3      ──►    [C3, C4, C5]
//!      |
//!      C4
//!      |
//!      C5 (tip)
//! ```
//!
//! Contraction never mutates its input. It computes every run first, maps
//! each original vertex to the run that absorbs it, and only then builds
//! the result graph, wiring edges through that mapping.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::hash::Hash;

use tracing::debug;

use crate::graph::{Graph, GraphError, VertexId};

/// Ordered items absorbed into one contracted vertex, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run<T>(Vec<T>);

impl<T> Run<T> {
    /// Create a run from items ordered oldest first.
    pub fn new(items: Vec<T>) -> Self {
        Self(items)
    }

    /// The items, oldest first.
    pub fn items(&self) -> &[T] {
        &self.0
    }

    /// Newest item.
    pub fn last(&self) -> Option<&T> {
        self.0.last()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the run has no items.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate items, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

/// A run located in a source graph, with its external boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpan {
    /// Run members, oldest first.
    pub vertices: Vec<VertexId>,
    /// Parents of the oldest member.
    pub parents: BTreeSet<VertexId>,
    /// Children of the newest member.
    pub children: BTreeSet<VertexId>,
}

/// Finds runs, given the set of payloads that must stay visible.
#[derive(Debug, Clone)]
pub struct RunFinder<T: Hash + Eq> {
    interesting: HashSet<T>,
}

impl<T: Hash + Eq> Default for RunFinder<T> {
    fn default() -> Self {
        Self {
            interesting: HashSet::new(),
        }
    }
}

impl<T: Hash + Eq> RunFinder<T> {
    /// Create a finder that keeps the given payloads at run ends.
    pub fn new<I: IntoIterator<Item = T>>(interesting: I) -> Self {
        Self {
            interesting: interesting.into_iter().collect(),
        }
    }

    /// Whether `value` is in the caller-supplied interesting set.
    pub fn is_interesting_value<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.interesting.contains(value)
    }

    /// Whether a vertex is interesting: a highlighted payload, or anything
    /// but exactly one parent and exactly one child.
    ///
    /// Evaluated from the graph's current degrees on every call.
    pub fn is_interesting(&self, graph: &Graph<T>, id: VertexId) -> bool {
        match graph.vertex(id) {
            Some(v) => {
                self.interesting.contains(v.payload())
                    || v.parents().len() != 1
                    || v.children().len() != 1
            }
            None => false,
        }
    }

    /// Whether the edge `parent → child` may be collapsed into one run.
    pub fn is_contractible(&self, graph: &Graph<T>, parent: VertexId, child: VertexId) -> bool {
        let (Some(p), Some(c)) = (graph.vertex(parent), graph.vertex(child)) else {
            return false;
        };
        p.sole_child() == Some(child)
            && c.sole_parent() == Some(parent)
            && !self.interesting.contains(p.payload())
    }

    /// Find the maximal run containing `start`.
    pub fn find_run(&self, graph: &Graph<T>, start: VertexId) -> Result<RunSpan, GraphError> {
        if !graph.contains(start) {
            return Err(GraphError::NotAVertex(start));
        }

        let mut seen: HashSet<VertexId> = HashSet::from([start]);
        let mut older: Vec<VertexId> = Vec::new();
        let mut newer: Vec<VertexId> = Vec::new();

        let mut cursor = start;
        while let Some(parent) = graph.vertex(cursor).and_then(|v| v.sole_parent()) {
            if !self.is_contractible(graph, parent, cursor) || !seen.insert(parent) {
                break;
            }
            older.push(parent);
            cursor = parent;
        }

        cursor = start;
        while let Some(child) = graph.vertex(cursor).and_then(|v| v.sole_child()) {
            if !self.is_contractible(graph, cursor, child) || !seen.insert(child) {
                break;
            }
            newer.push(child);
            cursor = child;
        }

        older.reverse();
        let mut vertices = older;
        vertices.push(start);
        vertices.extend(newer);

        let boundary = |id: Option<&VertexId>, parents: bool| -> BTreeSet<VertexId> {
            id.and_then(|id| graph.vertex(*id))
                .map(|v| if parents { v.parents().clone() } else { v.children().clone() })
                .unwrap_or_default()
        };
        let parents = boundary(vertices.first(), true);
        let children = boundary(vertices.last(), false);

        Ok(RunSpan {
            vertices,
            parents,
            children,
        })
    }
}

/// Result of contracting a graph.
#[derive(Debug, Clone)]
pub struct Contraction<T> {
    /// The contracted graph; every payload is a run of original payloads.
    pub graph: Graph<Run<T>>,
    absorbed_by: BTreeMap<VertexId, VertexId>,
}

impl<T> Contraction<T> {
    /// The result vertex whose run contains `original`.
    pub fn result_for(&self, original: VertexId) -> Option<VertexId> {
        self.absorbed_by.get(&original).copied()
    }

    /// Number of runs (result vertices).
    pub fn run_count(&self) -> usize {
        self.graph.len()
    }

    /// Keep only the contracted graph.
    pub fn into_graph(self) -> Graph<Run<T>> {
        self.graph
    }
}

/// Contract every run of `graph` into a single vertex of a new graph.
pub fn contract<T>(graph: &Graph<T>, finder: &RunFinder<T>) -> Result<Contraction<T>, GraphError>
where
    T: Hash + Eq + Clone,
{
    // Stage 1: partition into runs.
    let mut spans: Vec<RunSpan> = Vec::new();
    let mut run_of: BTreeMap<VertexId, usize> = BTreeMap::new();
    for id in graph.ids() {
        if run_of.contains_key(&id) {
            continue;
        }
        let span = finder.find_run(graph, id)?;
        for &member in &span.vertices {
            if run_of.insert(member, spans.len()).is_some() {
                return Err(GraphError::IllegalOperation("runs overlap; graph is not acyclic"));
            }
        }
        spans.push(span);
    }

    // Stage 2: create one result vertex per run.
    let mut result: Graph<Run<T>> = Graph::new();
    let mut run_vertices: Vec<VertexId> = Vec::with_capacity(spans.len());
    for span in &spans {
        let items = span
            .vertices
            .iter()
            .filter_map(|&v| graph.payload(v).cloned())
            .collect();
        run_vertices.push(result.add_isolated(Run::new(items)));
    }

    let absorbed_by: BTreeMap<VertexId, VertexId> = run_of
        .iter()
        .map(|(&original, &run)| (original, run_vertices[run]))
        .collect();

    // Stage 3: wire boundaries through the mapping.
    for (span, &vertex) in spans.iter().zip(&run_vertices) {
        for p in &span.parents {
            let parent = absorbed_by.get(p).copied().ok_or(GraphError::NotAVertex(*p))?;
            result.add_parent(vertex, parent)?;
        }
        for c in &span.children {
            let child = absorbed_by.get(c).copied().ok_or(GraphError::NotAVertex(*c))?;
            result.add_child(vertex, child)?;
        }
    }

    debug!(
        original_vertices = graph.len(),
        runs = result.len(),
        edges = result.edge_count(),
        "contracted graph"
    );

    Ok(Contraction { graph: result, absorbed_by })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a graph from `(payload, parent payloads)` in insertion order.
    fn build(spec: &[(u32, &[u32])]) -> (Graph<u32>, BTreeMap<u32, VertexId>) {
        let mut graph = Graph::new();
        let mut ids = BTreeMap::new();
        for (payload, parents) in spec {
            let parent_ids: Vec<VertexId> = parents.iter().map(|p| ids[p]).collect();
            let id = graph.add_vertex(*payload, &parent_ids, &[]).unwrap();
            ids.insert(*payload, id);
        }
        (graph, ids)
    }

    fn runs(contraction: &Contraction<u32>) -> Vec<Vec<u32>> {
        let mut runs: Vec<Vec<u32>> = contraction
            .graph
            .vertices()
            .map(|(_, v)| v.payload().items().to_vec())
            .collect();
        runs.sort();
        runs
    }

    #[test]
    fn test_linear_history_is_one_run() {
        let (graph, ids) = build(&[(1, &[]), (2, &[1]), (3, &[2]), (4, &[3]), (5, &[4])]);
        let finder = RunFinder::new([5]);

        let span = finder.find_run(&graph, ids[&3]).unwrap();
        assert_eq!(span.vertices, vec![ids[&1], ids[&2], ids[&3], ids[&4], ids[&5]]);
        assert!(span.parents.is_empty());
        assert!(span.children.is_empty());

        let contraction = contract(&graph, &finder).unwrap();
        assert_eq!(runs(&contraction), vec![vec![1, 2, 3, 4, 5]]);
        assert_eq!(contraction.graph.edge_count(), 0);
    }

    #[test]
    fn test_merge_starts_a_run() {
        let (graph, ids) = build(&[(1, &[]), (2, &[]), (3, &[1, 2]), (4, &[3]), (5, &[4])]);
        let finder = RunFinder::new([5]);

        let contraction = contract(&graph, &finder).unwrap();

        assert_eq!(runs(&contraction), vec![vec![1], vec![2], vec![3, 4, 5]]);
        let merged = contraction.result_for(ids[&4]).unwrap();
        let left = contraction.result_for(ids[&1]).unwrap();
        let right = contraction.result_for(ids[&2]).unwrap();
        assert!(contraction.graph.is_parent_of(left, merged));
        assert!(contraction.graph.is_parent_of(right, merged));
        contraction.graph.check_invariants().unwrap();
    }

    #[test]
    fn test_fork_ends_a_run() {
        // 1 - 2 - 3 < 4 - 5
        //             6
        let (graph, _) = build(&[(1, &[]), (2, &[1]), (3, &[2]), (4, &[3]), (5, &[4]), (6, &[3])]);
        let finder = RunFinder::new([5, 6]);

        let contraction = contract(&graph, &finder).unwrap();

        assert_eq!(runs(&contraction), vec![vec![1, 2, 3], vec![4, 5], vec![6]]);
        assert_eq!(contraction.graph.edge_count(), 2);
    }

    #[test]
    fn test_interesting_payload_ends_a_run_mid_chain() {
        let (graph, ids) = build(&[(1, &[]), (2, &[1]), (3, &[2]), (4, &[3])]);
        let finder = RunFinder::new([2, 4]);

        assert!(finder.is_interesting(&graph, ids[&2]));
        assert!(!finder.is_contractible(&graph, ids[&2], ids[&3]));

        let contraction = contract(&graph, &finder).unwrap();
        assert_eq!(runs(&contraction), vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_interestingness_uses_live_degrees() {
        let (mut graph, ids) = build(&[(1, &[]), (2, &[1]), (3, &[2])]);
        let finder = RunFinder::default();
        assert!(!finder.is_interesting(&graph, ids[&2]));

        graph.remove_child(ids[&2], ids[&3]).unwrap();

        assert!(finder.is_interesting(&graph, ids[&2]));
    }

    #[test]
    fn test_find_run_rejects_non_member() {
        let (graph, _) = build(&[(1, &[])]);
        let finder = RunFinder::default();
        let missing = VertexId::new(10);
        assert_eq!(finder.find_run(&graph, missing), Err(GraphError::NotAVertex(missing)));
    }

    #[test]
    fn test_contraction_does_not_touch_source() {
        let (graph, _) = build(&[(1, &[]), (2, &[1]), (3, &[2])]);
        let before = graph.edges();

        let _ = contract(&graph, &RunFinder::default()).unwrap();

        assert_eq!(graph.edges(), before);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_diamond_keeps_both_paths() {
        //   1
        //  / \
        // 2   3
        //  \ /
        //   4
        let (graph, _) = build(&[(1, &[]), (2, &[1]), (3, &[1]), (4, &[2, 3])]);
        let contraction = contract(&graph, &RunFinder::default()).unwrap();

        assert_eq!(contraction.run_count(), 4);
        assert_eq!(contraction.graph.edge_count(), 4);
    }
}
