//! Rendering collaborators: labels, DOT output, JSON export.

pub mod label;
pub mod dot;
pub mod export;

pub use label::{abbreviated_join, CommitLabeler, Labeler};
pub use dot::{escape_dot, to_dot, MAINLINE_CLUSTER_LABEL};
pub use export::{ExportVertex, GraphExport, ItemIds};

/// Error type for rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Writing the diagram failed.
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A label pattern failed to compile.
    #[error("Label pattern error: {0}")]
    Pattern(#[from] regex_lite::Error),
}
