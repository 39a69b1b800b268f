//! JSON export of a finished graph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::canonical::canonical_hash_hex;
use crate::contract::Run;
use crate::graph::{Graph, VertexId};
use crate::types::Commit;
use crate::ANCESTRY_SCHEMA_VERSION;
use super::label::Labeler;
use super::RenderError;

/// Payloads that can list the history items they stand for.
pub trait ItemIds {
    /// Ids of the items, oldest first.
    fn item_ids(&self) -> Vec<String>;
}

impl ItemIds for Commit {
    fn item_ids(&self) -> Vec<String> {
        vec![self.id.to_hex()]
    }
}

impl<T: ItemIds> ItemIds for Run<T> {
    fn item_ids(&self) -> Vec<String> {
        self.iter().flat_map(ItemIds::item_ids).collect()
    }
}

/// One exported vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportVertex {
    /// Vertex handle index.
    pub id: usize,
    /// Rendered label.
    pub label: String,
    /// Item ids covered by this vertex, oldest first.
    pub items: Vec<String>,
    /// Whether the vertex is on the mainline.
    pub mainline: bool,
    /// Whether the vertex is highlighted (holds a branch tip).
    pub highlighted: bool,
}

/// Stable, ordered export of a graph with a content fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    /// Schema version.
    pub schema_version: String,
    /// Vertices in handle order.
    pub vertices: Vec<ExportVertex>,
    /// `(parent, child)` edges, sorted.
    pub edges: Vec<(usize, usize)>,
    /// xxh64 of the canonical vertices and edges.
    pub fingerprint: String,
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    schema_version: &'a str,
    vertices: &'a [ExportVertex],
    edges: &'a [(usize, usize)],
}

impl GraphExport {
    /// Export `graph`; vertices in `mainline` are flagged.
    pub fn new<T, L>(graph: &Graph<T>, labeler: &L, mainline: &BTreeSet<VertexId>) -> Result<Self, RenderError>
    where
        T: ItemIds,
        L: Labeler<T>,
    {
        let vertices: Vec<ExportVertex> = graph
            .vertices()
            .map(|(id, v)| ExportVertex {
                id: id.index(),
                label: labeler.label(v.payload()),
                items: v.payload().item_ids(),
                mainline: mainline.contains(&id),
                highlighted: labeler.is_highlighted(v.payload()),
            })
            .collect();
        let edges: Vec<(usize, usize)> = graph
            .edges()
            .into_iter()
            .map(|(p, c)| (p.index(), c.index()))
            .collect();

        let fingerprint = canonical_hash_hex(&FingerprintInput {
            schema_version: ANCESTRY_SCHEMA_VERSION,
            vertices: &vertices,
            edges: &edges,
        })?;

        Ok(Self {
            schema_version: ANCESTRY_SCHEMA_VERSION.to_string(),
            vertices,
            edges,
            fingerprint,
        })
    }

    /// Pretty JSON.
    pub fn to_json(&self) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Recompute the fingerprint and compare.
    pub fn verify(&self) -> bool {
        canonical_hash_hex(&FingerprintInput {
            schema_version: &self.schema_version,
            vertices: &self.vertices,
            edges: &self.edges,
        })
        .map_or(false, |fp| fp == self.fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CommitLabeler;
    use crate::types::CommitId;

    fn sample() -> Graph<Commit> {
        let mut graph = Graph::new();
        let a = graph.add_isolated(Commit::new(CommitId::from_u64(1), 10, vec![]));
        graph
            .add_vertex(Commit::new(CommitId::from_u64(2), 20, vec![CommitId::from_u64(1)]), &[a], &[])
            .unwrap();
        graph
    }

    #[test]
    fn test_export_is_deterministic() {
        let graph = sample();
        let labeler = CommitLabeler::new(&[]).unwrap();
        let mainline = BTreeSet::from([VertexId::new(0)]);

        let e1 = GraphExport::new(&graph, &labeler, &mainline).unwrap();
        let e2 = GraphExport::new(&graph, &labeler, &mainline).unwrap();

        assert_eq!(e1.fingerprint, e2.fingerprint);
        assert_eq!(e1.edges, vec![(0, 1)]);
        assert!(e1.vertices[0].mainline);
        assert!(!e1.vertices[1].mainline);
        assert!(e1.verify());
    }

    #[test]
    fn test_tampered_export_fails_verification() {
        let graph = sample();
        let labeler = CommitLabeler::new(&[]).unwrap();
        let mut export = GraphExport::new(&graph, &labeler, &BTreeSet::new()).unwrap();

        export.edges.clear();

        assert!(!export.verify());
    }

    #[test]
    fn test_run_item_ids_oldest_first() {
        let run = Run::new(vec![
            Commit::new(CommitId::from_u64(1), 1, vec![]),
            Commit::new(CommitId::from_u64(2), 2, vec![]),
        ]);
        let ids = run.item_ids();
        assert_eq!(ids, vec![CommitId::from_u64(1).to_hex(), CommitId::from_u64(2).to_hex()]);
    }
}
