//! Error type for structural graph operations.

use super::vertex::VertexId;

/// Error type for graph operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A handle that is not a live member of the graph was used as an edge
    /// endpoint. Always a programming error.
    #[error("Not a vertex of this graph: {0}")]
    NotAVertex(VertexId),

    /// An edge from a vertex to itself was requested.
    #[error("Self-loop on vertex {0}")]
    SelfLoop(VertexId),

    /// Strict insertion of a payload that is already indexed.
    #[error("Value already exists at vertex {existing}")]
    DuplicateValue {
        /// The vertex already holding the payload.
        existing: VertexId,
    },

    /// The invariant checker found an unreciprocated or dangling edge.
    #[error("Integrity violation at vertex {vertex} ({relation} {partner}): {reason}")]
    IntegrityViolation {
        /// Vertex whose edge set is inconsistent.
        vertex: VertexId,
        /// Which of the vertex's edge sets holds the bad entry.
        relation: EdgeRelation,
        /// The edge partner recorded on `vertex`.
        partner: VertexId,
        /// What is wrong with the edge.
        reason: &'static str,
    },

    /// The payload index disagrees with the vertex set.
    #[error("Payload index out of sync: {0}")]
    IndexOutOfSync(&'static str),

    /// The operation is not supported by this kind of graph.
    #[error("Illegal operation: {0}")]
    IllegalOperation(&'static str),
}

/// Which side of a vertex an edge was recorded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRelation {
    /// The partner is listed as a parent.
    Parent,
    /// The partner is listed as a child.
    Child,
}

impl std::fmt::Display for EdgeRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parent => write!(f, "parent"),
            Self::Child => write!(f, "child"),
        }
    }
}
