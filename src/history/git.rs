//! Git history backed by libgit2.

use std::path::{Path, PathBuf};

use git2::{BranchType, Oid, Repository};
use tracing::debug;

use crate::types::{Branch, Commit, CommitId, COMMIT_ID_LEN};
use super::HistorySource;

/// Error type for the git history source.
#[derive(Debug, thiserror::Error)]
pub enum GitHistoryError {
    /// Repository could not be opened.
    #[error("Failed to open repository at {0}: {1}")]
    OpenRepo(PathBuf, #[source] git2::Error),
    /// Commit lookup failed.
    #[error("Failed to read commit {0}: {1}")]
    Lookup(CommitId, #[source] git2::Error),
    /// Branch enumeration failed.
    #[error("Failed to list branches: {0}")]
    Branches(#[source] git2::Error),
    /// Object id with an unexpected width (e.g. a SHA-256 repository).
    #[error("Unsupported object id length: {0}")]
    OidLength(usize),
}

/// Commit history read from a git repository.
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    /// Open the repository containing `path` (searching parent directories).
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitHistoryError> {
        let path = path.as_ref();
        let repo = Repository::discover(path)
            .map_err(|e| GitHistoryError::OpenRepo(path.to_path_buf(), e))?;
        debug!(path = %path.display(), "opened repository");
        Ok(Self { repo })
    }

    /// Wrap an already opened repository.
    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    fn to_commit(commit: &git2::Commit<'_>) -> Result<Commit, GitHistoryError> {
        let parents = commit
            .parent_ids()
            .map(|oid| commit_id(&oid))
            .collect::<Result<Vec<_>, _>>()?;
        let author = commit.author().name().unwrap_or_default().to_string();
        let message = commit.message().unwrap_or_default().to_string();
        Ok(Commit::new(commit_id(&commit.id())?, commit.time().seconds(), parents)
            .with_author(author, message))
    }
}

fn commit_id(oid: &Oid) -> Result<CommitId, GitHistoryError> {
    let bytes: [u8; COMMIT_ID_LEN] = oid
        .as_bytes()
        .try_into()
        .map_err(|_| GitHistoryError::OidLength(oid.as_bytes().len()))?;
    Ok(CommitId::new(bytes))
}

impl HistorySource for GitHistory {
    type Error = GitHistoryError;

    fn commit(&self, id: &CommitId) -> Result<Commit, Self::Error> {
        let oid = Oid::from_bytes(id.as_bytes()).map_err(|e| GitHistoryError::Lookup(*id, e))?;
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|e| GitHistoryError::Lookup(*id, e))?;
        Self::to_commit(&commit)
    }

    fn branches(&self) -> Result<Vec<Branch>, Self::Error> {
        let mut branches = Vec::new();
        for entry in self.repo.branches(None).map_err(GitHistoryError::Branches)? {
            let (branch, kind) = entry.map_err(GitHistoryError::Branches)?;
            let Some(name) = branch.name().map_err(GitHistoryError::Branches)? else {
                continue;
            };
            // Remote HEAD aliases duplicate a real branch.
            if kind == BranchType::Remote && name.ends_with("/HEAD") {
                continue;
            }
            let name = name.to_string();
            let tip = branch.get().peel_to_commit().map_err(GitHistoryError::Branches)?;
            branches.push(Branch::new(name, Self::to_commit(&tip)?));
        }
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Signature, Time};

    fn commit_on(repo: &Repository, parents: &[&git2::Commit<'_>], secs: i64, message: &str) -> Oid {
        let sig = Signature::new("Ada Lovelace", "ada@example.com", &Time::new(secs, 0)).unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(None, &sig, &sig, message, &tree, parents).unwrap()
    }

    #[test]
    fn test_reads_commits_and_branches() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        {
            let root_oid = commit_on(&repo, &[], 1_000, "ab - root");
            let root = repo.find_commit(root_oid).unwrap();
            let child_oid = commit_on(&repo, &[&root], 2_000, "second");
            let child = repo.find_commit(child_oid).unwrap();
            repo.branch("feature", &child, false).unwrap();
        }

        let history = GitHistory::from_repository(repo);
        let branch = history.branch("feature").unwrap().unwrap();

        assert_eq!(branch.tip.time, 2_000);
        assert_eq!(branch.tip.author, "Ada Lovelace");
        assert_eq!(branch.tip.parents.len(), 1);

        let parent = history.commit(&branch.tip.parents[0]).unwrap();
        assert_eq!(parent.message, "ab - root");
        assert!(parent.is_root());
    }
}
