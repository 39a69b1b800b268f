//! In-memory history for tests and fixtures.

use std::collections::BTreeMap;

use crate::types::{Branch, Commit, CommitId};
use super::HistorySource;

/// Error type for in-memory history.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryHistoryError {
    /// Commit not found.
    #[error("Commit not found: {0}")]
    CommitNotFound(CommitId),
    /// A branch points at a commit that was never added.
    #[error("Branch {name} points at unknown commit {tip}")]
    DanglingBranch {
        /// Branch name.
        name: String,
        /// Missing tip id.
        tip: CommitId,
    },
}

/// In-memory commit history.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    commits: BTreeMap<CommitId, Commit>,
    branches: BTreeMap<String, CommitId>,
}

impl InMemoryHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit.
    pub fn add_commit(&mut self, commit: Commit) {
        self.commits.insert(commit.id, commit);
    }

    /// Point a branch at a commit.
    pub fn set_branch(&mut self, name: impl Into<String>, tip: CommitId) {
        self.branches.insert(name.into(), tip);
    }

    /// Get number of commits.
    pub fn num_commits(&self) -> usize {
        self.commits.len()
    }
}

impl HistorySource for InMemoryHistory {
    type Error = InMemoryHistoryError;

    fn commit(&self, id: &CommitId) -> Result<Commit, Self::Error> {
        self.commits
            .get(id)
            .cloned()
            .ok_or(InMemoryHistoryError::CommitNotFound(*id))
    }

    fn branches(&self) -> Result<Vec<Branch>, Self::Error> {
        self.branches
            .iter()
            .map(|(name, tip)| {
                let commit = self.commits.get(tip).cloned().ok_or_else(|| {
                    InMemoryHistoryError::DanglingBranch {
                        name: name.clone(),
                        tip: *tip,
                    }
                })?;
                Ok(Branch::new(name.clone(), commit))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(n: u64, parents: &[u64]) -> Commit {
        Commit::new(
            CommitId::from_u64(n),
            n as i64 * 100,
            parents.iter().map(|p| CommitId::from_u64(*p)).collect(),
        )
    }

    #[test]
    fn test_add_and_get_commit() {
        let mut history = InMemoryHistory::new();
        history.add_commit(commit(1, &[]));
        history.add_commit(commit(2, &[1]));

        let c = history.commit(&CommitId::from_u64(2)).unwrap();
        assert_eq!(c.parents, vec![CommitId::from_u64(1)]);
        assert_eq!(history.num_commits(), 2);
    }

    #[test]
    fn test_missing_commit() {
        let history = InMemoryHistory::new();
        let err = history.commit(&CommitId::from_u64(5)).unwrap_err();
        assert!(matches!(err, InMemoryHistoryError::CommitNotFound(_)));
    }

    #[test]
    fn test_branches_sorted_by_name() {
        let mut history = InMemoryHistory::new();
        history.add_commit(commit(1, &[]));
        history.set_branch("zeta", CommitId::from_u64(1));
        history.set_branch("alpha", CommitId::from_u64(1));

        let names: Vec<String> = history.branches().unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(history.branch("zeta").unwrap().is_some());
        assert!(history.branch("nope").unwrap().is_none());
    }

    #[test]
    fn test_dangling_branch() {
        let mut history = InMemoryHistory::new();
        history.set_branch("ghost", CommitId::from_u64(3));
        assert!(matches!(
            history.branches(),
            Err(InMemoryHistoryError::DanglingBranch { .. })
        ));
    }
}
