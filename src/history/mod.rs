//! History sources: where commits and branches come from.

pub mod memory;

#[cfg(feature = "git")]
pub mod git;

use crate::types::{Branch, Commit, CommitId};

/// Trait for commit history backends.
///
/// Implementations must return parents in their recorded order (first
/// parent first) and branches in a stable order.
pub trait HistorySource {
    /// Error type for history lookups.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch a commit by id.
    fn commit(&self, id: &CommitId) -> Result<Commit, Self::Error>;

    /// All branches, ordered by name.
    fn branches(&self) -> Result<Vec<Branch>, Self::Error>;

    /// A single branch by exact name.
    fn branch(&self, name: &str) -> Result<Option<Branch>, Self::Error> {
        Ok(self.branches()?.into_iter().find(|b| b.name == name))
    }
}

impl<S: HistorySource + ?Sized> HistorySource for &S {
    type Error = S::Error;

    fn commit(&self, id: &CommitId) -> Result<Commit, Self::Error> {
        (**self).commit(id)
    }

    fn branches(&self) -> Result<Vec<Branch>, Self::Error> {
        (**self).branches()
    }

    fn branch(&self, name: &str) -> Result<Option<Branch>, Self::Error> {
        (**self).branch(name)
    }
}

pub use memory::{InMemoryHistory, InMemoryHistoryError};

#[cfg(feature = "git")]
pub use git::{GitHistory, GitHistoryError};
