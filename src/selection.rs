//! Branch selection: name patterns, staleness cutoff, mainline resolution.

use chrono::{DateTime, Duration, Utc};
use regex_lite::Regex;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::types::Branch;

/// Error type for branch selection.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    /// A branch pattern is not a valid regular expression.
    #[error("Invalid branch pattern {pattern:?}: {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Parser error.
        #[source]
        source: regex_lite::Error,
    },
    /// None of the mainline candidates exists.
    #[error("No mainline branch found (tried {0:?})")]
    NoMainline(Vec<String>),
}

/// Outcome of selecting branches.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Kept branches, in pattern order then branch order.
    pub branches: Vec<Branch>,
    /// Patterns that matched no branch.
    pub unmatched: Vec<String>,
    /// Branches dropped for having an old tip.
    pub stale: Vec<Branch>,
}

/// Filters branches by name pattern and tip age.
#[derive(Debug, Clone)]
pub struct BranchSelector {
    patterns: Vec<(String, Regex)>,
    max_age: Option<Duration>,
    now: DateTime<Utc>,
}

impl BranchSelector {
    /// Create a selector. Patterns match anywhere in the branch name.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, SelectionError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p)
                    .map(|re| (p.to_string(), re))
                    .map_err(|source| SelectionError::Pattern {
                        pattern: p.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            max_age: None,
            now: Utc::now(),
        })
    }

    /// Drop branches whose tip is older than `max_age`. `None` keeps all.
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Override the reference time for the age cutoff.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Select from `branches`. A branch matched by several patterns is kept once.
    pub fn select(&self, branches: &[Branch]) -> Selection {
        let mut selection = Selection::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for (pattern, re) in &self.patterns {
            let matching: Vec<&Branch> = branches.iter().filter(|b| re.is_match(&b.name)).collect();
            if matching.is_empty() {
                warn!(pattern = %pattern, "no branches match pattern");
                selection.unmatched.push(pattern.clone());
            }
            for branch in matching {
                if seen.insert(branch.name.as_str()) {
                    selection.branches.push(branch.clone());
                }
            }
        }

        if let Some(max_age) = self.max_age {
            let cutoff = (self.now - max_age).timestamp();
            let (kept, stale): (Vec<Branch>, Vec<Branch>) = selection
                .branches
                .into_iter()
                .partition(|b| b.tip.time >= cutoff);
            selection.branches = kept;
            selection.stale = stale;

            if !selection.stale.is_empty() {
                warn!(count = selection.stale.len(), "discarded branches for being too old");
                for branch in &selection.stale {
                    warn!(branch = %branch.name, date = %format_date(branch.tip.time), "stale branch");
                }
            }
        }

        info!(count = selection.branches.len(), "continuing with selected branches");
        for branch in &selection.branches {
            info!(branch = %branch.name, "selected");
        }
        selection
    }
}

/// Pick the first existing branch among `candidates`.
pub fn resolve_mainline<S: AsRef<str>>(branches: &[Branch], candidates: &[S]) -> Result<Branch, SelectionError> {
    candidates
        .iter()
        .find_map(|name| branches.iter().find(|b| b.name == name.as_ref()))
        .cloned()
        .ok_or_else(|| {
            SelectionError::NoMainline(candidates.iter().map(|c| c.as_ref().to_string()).collect())
        })
}

/// Format unix seconds as `%Y-%m-%d`.
pub fn format_date(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| secs.to_string())
}
