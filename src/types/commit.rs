//! Commit and branch types consumed by the ancestry builder.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Length of a commit id in bytes.
pub const COMMIT_ID_LEN: usize = 20;

/// Number of hex characters in an abbreviated commit id.
pub const SHORT_ID_LEN: usize = 7;

/// Unique identifier of a commit (a 20-byte object id).
///
/// Implements `Ord` for deterministic ordering and displays as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommitId([u8; COMMIT_ID_LEN]);

impl CommitId {
    /// Create a CommitId from raw bytes.
    pub fn new(bytes: [u8; COMMIT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an id whose leading bytes encode `n` little-endian, so small
    /// fixture ids still have distinct short forms.
    pub fn from_u64(n: u64) -> Self {
        let mut bytes = [0u8; COMMIT_ID_LEN];
        bytes[..8].copy_from_slice(&n.to_le_bytes());
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; COMMIT_ID_LEN] {
        &self.0
    }

    /// Full lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex form.
    pub fn short(&self) -> String {
        let mut s = self.to_hex();
        s.truncate(SHORT_ID_LEN);
        s
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Error parsing a hex commit id.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommitIdError {
    /// The string is not valid hex.
    #[error("Invalid hex in commit id: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// The decoded id has the wrong length.
    #[error("Commit id must be {COMMIT_ID_LEN} bytes, got {0}")]
    WrongLength(usize),
}

impl FromStr for CommitId {
    type Err = CommitIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let len = bytes.len();
        let array: [u8; COMMIT_ID_LEN] = bytes
            .try_into()
            .map_err(|_| CommitIdError::WrongLength(len))?;
        Ok(Self(array))
    }
}

/// A commit as seen by the graph engine.
///
/// Equality and hashing use the id only, so a `Commit` can be looked up in
/// an index by its [`CommitId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Unique commit identifier.
    pub id: CommitId,
    /// Commit time as unix seconds.
    pub time: i64,
    /// Parent ids; the first entry is the first parent.
    pub parents: Vec<CommitId>,
    /// Author display name.
    pub author: String,
    /// Full commit message.
    pub message: String,
}

impl Commit {
    /// Create a new commit.
    pub fn new(id: CommitId, time: i64, parents: Vec<CommitId>) -> Self {
        Self {
            id,
            time,
            parents,
            author: String::new(),
            message: String::new(),
        }
    }

    /// Set the author and message used for labels.
    pub fn with_author(mut self, author: impl Into<String>, message: impl Into<String>) -> Self {
        self.author = author.into();
        self.message = message.into();
        self
    }

    /// The first parent, if any.
    pub fn first_parent(&self) -> Option<&CommitId> {
        self.parents.first()
    }

    /// Whether this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Commit {}

// Must hash exactly like `CommitId` for the `Borrow` lookup to be sound.
impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Borrow<CommitId> for Commit {
    fn borrow(&self) -> &CommitId {
        &self.id
    }
}

/// A named branch and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name, e.g. `origin/feature`.
    pub name: String,
    /// The tip commit.
    pub tip: Commit,
}

impl Branch {
    /// Create a new branch.
    pub fn new(name: impl Into<String>, tip: Commit) -> Self {
        Self {
            name: name.into(),
            tip,
        }
    }
}
