//! # ancestry-graph
//!
//! Compressed commit-ancestry graphs.
//!
//! The crate answers one question:
//!
//! > Given a set of branches, what does their shared history look like once
//! > every boring stretch of commits is folded away?
//!
//! ## Core Contract
//!
//! 1. Build one DAG holding the union of every branch's ancestry, walking
//!    each branch only until it meets a lazily extended mainline
//! 2. Contract every maximal linear chain of commits into a single vertex
//! 3. Render the result as a DOT diagram or a fingerprinted JSON export
//!
//! ## Architecture
//!
//! ```text
//! Branches → BranchSelector → AncestryBuilder → contract() → to_dot / GraphExport
//!                                   ↓
//!                   HistorySource (git or in-memory)
//! ```
//!
//! ## Structural Guarantees
//!
//! - Every parent edge has a matching child edge and vice versa
//! - Every edge endpoint is a live vertex of the same graph
//! - Contraction partitions vertices into runs and preserves reachability
//! - Output order follows vertex handles, so equal inputs render identically

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod graph;
pub mod contract;
pub mod ancestry;
pub mod history;
pub mod selection;
pub mod config;
pub mod render;
pub mod canonical;
pub mod pipeline;

// Re-exports
pub use types::{Branch, Commit, CommitId, CommitIdError};
pub use graph::{EdgeRelation, Graph, GraphError, IndexedGraph, Vertex, VertexId};
pub use contract::{contract, Contraction, Run, RunFinder, RunSpan};
pub use ancestry::{AncestryBuilder, AncestryError};
pub use history::{HistorySource, InMemoryHistory, InMemoryHistoryError};
#[cfg(feature = "git")]
pub use history::{GitHistory, GitHistoryError};
pub use selection::{resolve_mainline, BranchSelector, Selection, SelectionError};
pub use config::{AncestryConfig, ConfigError, OutputFormat};
pub use render::{to_dot, CommitLabeler, GraphExport, Labeler, RenderError};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use pipeline::{render_ancestry, AncestryReport, PipelineError};

/// Schema version for exported graphs.
/// Increment on breaking changes to the export format.
pub const ANCESTRY_SCHEMA_VERSION: &str = "1.0.0";
