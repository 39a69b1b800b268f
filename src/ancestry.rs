//! Mainline-aware ancestry construction.
//!
//! The builder grows one graph holding the union of every requested
//! branch's ancestry. A privileged **mainline** (the first-parent chain of
//! the mainline tip) is extended lazily, only as far back as the oldest
//! commit processed so far. A walk stops as soon as it reaches a commit on
//! the mainline, so history shared with the mainline is never walked.
//!
//! ## Algorithm
//!
//! 1. Insert the commit (idempotent) and extend the mainline until its
//!    oldest commit is no newer than this one
//! 2. If the commit is on the mainline, or was already expanded, stop
//! 3. Otherwise resolve each parent (index first, history source second),
//!    link it, and repeat from step 1 for the parent
//!
//! The walk uses an explicit stack, so arbitrarily deep histories cannot
//! overflow the call stack.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::contract::{contract, Contraction, RunFinder};
use crate::graph::{Graph, GraphError, IndexedGraph, VertexId};
use crate::history::HistorySource;
use crate::types::{Branch, Commit, CommitId};

/// Error type for ancestry construction.
#[derive(Debug, thiserror::Error)]
pub enum AncestryError {
    /// Structural graph error.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    /// The history source failed.
    #[error("History error: {0}")]
    History(String),
}

impl AncestryError {
    /// Create a history error from any error type.
    pub fn from_history<E: std::error::Error>(e: E) -> Self {
        Self::History(e.to_string())
    }
}

/// Builds a commit graph around a lazily extended mainline.
pub struct AncestryBuilder<S: HistorySource> {
    source: S,
    graph: IndexedGraph<Commit>,
    /// Newest first; only ever extended at the tail.
    mainline: Vec<VertexId>,
    on_mainline: HashSet<VertexId>,
    expanded: HashSet<VertexId>,
}

impl<S: HistorySource> AncestryBuilder<S> {
    /// Create a builder whose mainline starts at `mainline_tip`.
    pub fn new(source: S, mainline_tip: Commit) -> Result<Self, AncestryError> {
        let mut graph = IndexedGraph::new();
        let tip = graph.insert(mainline_tip, &[], &[])?;
        Ok(Self {
            source,
            graph,
            mainline: vec![tip],
            on_mainline: HashSet::from([tip]),
            expanded: HashSet::new(),
        })
    }

    /// Mainline vertices, newest first.
    pub fn mainline(&self) -> &[VertexId] {
        &self.mainline
    }

    /// Whether `id` is on the mainline.
    pub fn is_on_mainline(&self, id: VertexId) -> bool {
        self.on_mainline.contains(&id)
    }

    /// Mainline commits, newest first.
    pub fn mainline_commits(&self) -> impl Iterator<Item = &Commit> + '_ {
        self.mainline.iter().filter_map(|&id| self.graph.payload(id))
    }

    /// The indexed commit graph built so far.
    pub fn graph(&self) -> &IndexedGraph<Commit> {
        &self.graph
    }

    /// Vertex holding the commit with `id`, if it has been added.
    pub fn vertex_for(&self, id: &CommitId) -> Option<VertexId> {
        self.graph.get(id)
    }

    /// Drop the builder, keeping the ordinary graph.
    pub fn into_graph(self) -> Graph<Commit> {
        self.graph.into_graph()
    }

    /// Add a branch tip and its ancestry.
    pub fn add_branch(&mut self, branch: &Branch) -> Result<VertexId, AncestryError> {
        let before = self.graph.len();
        let id = self.add_commit_and_ancestors(branch.tip.clone())?;
        debug!(
            branch = %branch.name,
            new_commits = self.graph.len() - before,
            mainline_len = self.mainline.len(),
            "added branch"
        );
        Ok(id)
    }

    /// Insert `commit` and every ancestor not already reachable through the
    /// mainline. Returns the commit's vertex.
    pub fn add_commit_and_ancestors(&mut self, commit: Commit) -> Result<VertexId, AncestryError> {
        let tip = match self.graph.get(&commit.id) {
            Some(id) => id,
            None => self.graph.insert(commit, &[], &[])?,
        };

        let mut stack: Vec<VertexId> = Vec::new();
        if self.claim(tip)? {
            stack.push(tip);
        }

        let mut walked = 0usize;
        while let Some(vertex) = stack.pop() {
            walked += 1;
            let parents = self
                .graph
                .payload(vertex)
                .map(|c| c.parents.clone())
                .ok_or(GraphError::NotAVertex(vertex))?;

            let mut pending = Vec::with_capacity(parents.len());
            for parent_id in &parents {
                let parent = self.resolve(parent_id)?;
                self.graph.add_parent(vertex, parent)?;
                if self.claim(parent)? {
                    pending.push(parent);
                }
            }
            // First parent is walked first.
            stack.extend(pending.into_iter().rev());
        }

        trace!(walked, vertices = self.graph.len(), "ancestry walk finished");
        Ok(tip)
    }

    /// Extend the mainline until its oldest commit is no newer than `time`.
    ///
    /// Stops early at a root commit.
    pub fn extend_until(&mut self, time: i64) -> Result<(), AncestryError> {
        let mut extended = 0usize;
        loop {
            let Some(&oldest) = self.mainline.last() else {
                break;
            };
            let commit = self.graph.payload(oldest).ok_or(GraphError::NotAVertex(oldest))?;
            if commit.time <= time {
                break;
            }
            let Some(first_parent) = commit.first_parent().copied() else {
                debug!(root = %commit.id.short(), "mainline reached root commit");
                break;
            };

            let parent = self.resolve(&first_parent)?;
            self.graph.add_parent(oldest, parent)?;
            self.mainline.push(parent);
            self.on_mainline.insert(parent);
            extended += 1;
        }
        if extended > 0 {
            trace!(extended, mainline_len = self.mainline.len(), "extended mainline");
        }
        Ok(())
    }

    /// Contract runs of a derived ordinary graph.
    pub fn contract(&self, finder: &RunFinder<Commit>) -> Result<Contraction<Commit>, GraphError> {
        contract(self.graph.graph(), finder)
    }

    /// The builder only grows; contraction always produces a new graph.
    pub fn contract_in_place(&mut self, _finder: &RunFinder<Commit>) -> Result<(), GraphError> {
        Err(GraphError::IllegalOperation(
            "ancestry graphs cannot be contracted in place; use contract() on the derived graph",
        ))
    }

    /// Vertex for `id`, fetching the commit from the history source if new.
    fn resolve(&mut self, id: &CommitId) -> Result<VertexId, AncestryError> {
        if let Some(vertex) = self.graph.get(id) {
            return Ok(vertex);
        }
        let commit = self.source.commit(id).map_err(AncestryError::from_history)?;
        Ok(self.graph.insert(commit, &[], &[])?)
    }

    /// Extend the mainline to cover `vertex` and report whether its
    /// parents still need walking.
    fn claim(&mut self, vertex: VertexId) -> Result<bool, AncestryError> {
        let time = self
            .graph
            .payload(vertex)
            .map(|c| c.time)
            .ok_or(GraphError::NotAVertex(vertex))?;
        self.extend_until(time)?;
        Ok(!self.on_mainline.contains(&vertex) && self.expanded.insert(vertex))
    }
}
