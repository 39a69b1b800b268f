//! Core graph types: vertices, the arena graph, and the value-indexed graph.

pub mod vertex;
pub mod dag;
pub mod indexed;
pub mod error;

pub use vertex::{Vertex, VertexId};
pub use dag::Graph;
pub use indexed::IndexedGraph;
pub use error::{GraphError, EdgeRelation};
