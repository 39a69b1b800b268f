//! Core types for the ancestry graph.

pub mod commit;

pub use commit::{Branch, Commit, CommitId, CommitIdError, COMMIT_ID_LEN, SHORT_ID_LEN};
