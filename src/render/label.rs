//! Labels and highlighting for rendered vertices.

use regex_lite::Regex;
use std::collections::{HashMap, HashSet};

use crate::contract::Run;
use crate::types::{Branch, Commit, CommitId};
use super::RenderError;

/// Lists longer than this are abbreviated by [`abbreviated_join`].
pub const COLLAPSE_AFTER: usize = 4;

/// Commit-message marker naming the authors, e.g. `ab/(cd) - fix parser`.
const INITIALS_PATTERN: &str = r"(?P<initials>\w{2,3}(/\(?\w{2,3}\)?)*) ?-";

/// Label and highlight policy for one payload type.
pub trait Labeler<T> {
    /// Human-readable label for a payload.
    fn label(&self, payload: &T) -> String;

    /// Whether the payload should be drawn filled.
    fn is_highlighted(&self, _payload: &T) -> bool {
        false
    }
}

/// Join `items`, collapsing the middle of long lists.
///
/// Lists of at most `collapse_after` items are joined as-is. Longer lists
/// keep `end_length` items from each end around `middle` (default
/// `"(N omitted)"`).
pub fn abbreviated_join(
    items: &[String],
    separator: &str,
    collapse_after: usize,
    end_length: usize,
    middle: Option<&str>,
) -> String {
    if items.len() <= collapse_after || items.len() <= 2 * end_length + 1 {
        return items.join(separator);
    }
    let omitted = items.len() - 2 * end_length;
    let middle = middle.map(str::to_string).unwrap_or_else(|| format!("({omitted} omitted)"));

    let mut parts: Vec<&str> = items[..end_length].iter().map(String::as_str).collect();
    parts.push(&middle);
    parts.extend(items[items.len() - end_length..].iter().map(String::as_str));
    parts.join(separator)
}

/// Labels commits and runs of commits.
///
/// Branch tips are labelled with their branch name; everything else with
/// the short id and author initials.
#[derive(Debug, Clone)]
pub struct CommitLabeler {
    tip_names: HashMap<CommitId, String>,
    highlighted: HashSet<CommitId>,
    initials_re: Regex,
}

impl CommitLabeler {
    /// Create a labeler for the given branches. The first branch naming a
    /// commit wins its label.
    pub fn new(branches: &[Branch]) -> Result<Self, RenderError> {
        let mut tip_names = HashMap::new();
        for branch in branches {
            tip_names.entry(branch.tip.id).or_insert_with(|| branch.name.clone());
        }
        Ok(Self {
            highlighted: tip_names.keys().copied().collect(),
            tip_names,
            initials_re: Regex::new(INITIALS_PATTERN)?,
        })
    }

    /// Author initials, from a marker in the message or else the author's name.
    pub fn authors_initials(&self, commit: &Commit) -> Vec<String> {
        if let Some(caps) = self.initials_re.captures(&commit.message) {
            if let Some(m) = caps.name("initials") {
                return m
                    .as_str()
                    .split('/')
                    .map(|s| s.replace(['(', ')'], ""))
                    .collect();
            }
        }
        let initials: String = commit
            .author
            .to_lowercase()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect();
        vec![initials]
    }

    /// Label for a single commit.
    pub fn label_commit(&self, commit: &Commit, with_initials: bool) -> String {
        if let Some(name) = self.tip_names.get(&commit.id) {
            return name.clone();
        }
        let mut label = commit.id.short();
        if with_initials {
            let initials = self.authors_initials(commit);
            label.push(' ');
            label.push_str(&abbreviated_join(&initials, "/", COLLAPSE_AFTER, 1, Some("...")));
        }
        label
    }

    /// Label for a run: `first..last`, the commit count, and the authors.
    pub fn label_run(&self, run: &Run<Commit>) -> String {
        match run.items() {
            [] => "[]".to_string(),
            [only] => self.label_commit(only, true),
            [first, .., last] => {
                let mut initials: Vec<String> = Vec::new();
                for commit in run.iter() {
                    for i in self.authors_initials(commit) {
                        if !initials.contains(&i) {
                            initials.push(i);
                        }
                    }
                }
                format!(
                    "{}..{}\n({} commits)\n{}",
                    self.label_commit(first, false),
                    self.label_commit(last, false),
                    run.len(),
                    abbreviated_join(&initials, "/", COLLAPSE_AFTER, 1, Some("...")),
                )
            }
        }
    }
}

impl Labeler<Commit> for CommitLabeler {
    fn label(&self, payload: &Commit) -> String {
        self.label_commit(payload, true)
    }

    fn is_highlighted(&self, payload: &Commit) -> bool {
        self.highlighted.contains(&payload.id)
    }
}

impl Labeler<Run<Commit>> for CommitLabeler {
    fn label(&self, payload: &Run<Commit>) -> String {
        self.label_run(payload)
    }

    // Tips are always the newest element of their run.
    fn is_highlighted(&self, payload: &Run<Commit>) -> bool {
        payload.last().map_or(false, |c| self.highlighted.contains(&c.id))
    }
}
