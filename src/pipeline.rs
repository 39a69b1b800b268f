//! End-to-end run: select branches, build ancestry, contract, render.
//!
//! ```text
//! HistorySource → BranchSelector → AncestryBuilder → contract → to_dot / GraphExport
//! ```

use std::collections::BTreeSet;

use tracing::info;

use crate::ancestry::{AncestryBuilder, AncestryError};
use crate::config::{AncestryConfig, OutputFormat};
use crate::contract::RunFinder;
use crate::graph::{Graph, GraphError, VertexId};
use crate::history::HistorySource;
use crate::render::{to_dot, CommitLabeler, GraphExport, ItemIds, Labeler, RenderError};
use crate::selection::{resolve_mainline, BranchSelector, SelectionError};

/// Error type for a full rendering run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Branch selection failed.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// Ancestry construction failed.
    #[error(transparent)]
    Ancestry(#[from] AncestryError),
    /// Contraction failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Listing branches failed.
    #[error("History error: {0}")]
    History(String),
}

/// Output and bookkeeping of one run.
#[derive(Debug, Clone)]
pub struct AncestryReport {
    /// The rendered diagram or JSON document.
    pub output: String,
    /// Branches drawn, including the mainline.
    pub branches: Vec<String>,
    /// Patterns that matched nothing.
    pub unmatched_patterns: Vec<String>,
    /// Branches dropped for age.
    pub stale_branches: Vec<String>,
    /// Commits in the ancestry graph.
    pub commit_count: usize,
    /// Mainline length after construction.
    pub mainline_len: usize,
    /// Vertices in the rendered graph.
    pub rendered_vertices: usize,
}

/// Run the whole pipeline against `source`.
pub fn render_ancestry<S: HistorySource>(source: S, config: &AncestryConfig) -> Result<AncestryReport, PipelineError> {
    let all = source
        .branches()
        .map_err(|e| PipelineError::History(e.to_string()))?;

    let selection = BranchSelector::new(&config.branch_patterns)?
        .with_max_age(config.max_branch_age())
        .select(&all);
    let mainline = resolve_mainline(&all, &config.mainline_candidates)?;

    let mut tips = selection.branches.clone();
    if !tips.iter().any(|b| b.name == mainline.name) {
        tips.push(mainline.clone());
    }

    let mut builder = AncestryBuilder::new(source, mainline.tip.clone())?;
    for branch in &tips {
        builder.add_branch(branch)?;
    }

    let labeler = CommitLabeler::new(&tips)?;
    let mainline_vertices: BTreeSet<VertexId> = builder.mainline().iter().copied().collect();

    let (output, rendered_vertices) = if config.contract {
        let finder = RunFinder::new(tips.iter().map(|b| b.tip.clone()));
        let contraction = builder.contract(&finder)?;
        let cluster: BTreeSet<VertexId> = mainline_vertices
            .iter()
            .filter_map(|&v| contraction.result_for(v))
            .collect();
        (
            render(&contraction.graph, &labeler, &cluster, config.format)?,
            contraction.run_count(),
        )
    } else {
        let graph = builder.graph().graph();
        (render(graph, &labeler, &mainline_vertices, config.format)?, graph.len())
    };

    info!(
        branches = tips.len(),
        commits = builder.graph().len(),
        mainline_len = builder.mainline().len(),
        rendered_vertices,
        contracted = config.contract,
        "rendered ancestry graph"
    );

    Ok(AncestryReport {
        output,
        branches: tips.into_iter().map(|b| b.name).collect(),
        unmatched_patterns: selection.unmatched,
        stale_branches: selection.stale.into_iter().map(|b| b.name).collect(),
        commit_count: builder.graph().len(),
        mainline_len: builder.mainline().len(),
        rendered_vertices,
    })
}

fn render<T, L>(graph: &Graph<T>, labeler: &L, cluster: &BTreeSet<VertexId>, format: OutputFormat) -> Result<String, RenderError>
where
    T: ItemIds,
    L: Labeler<T>,
{
    match format {
        OutputFormat::Dot => to_dot(graph, labeler, Some(cluster)),
        OutputFormat::Json => GraphExport::new(graph, labeler, cluster)?.to_json(),
    }
}
