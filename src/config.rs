//! Run configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default mainline branch candidates, in preference order.
pub const DEFAULT_MAINLINE_CANDIDATES: [&str; 4] = ["origin/master", "master", "origin/main", "main"];

/// Branches with tips older than this are dropped unless disabled.
pub const DEFAULT_MAX_BRANCH_AGE_DAYS: i64 = 30;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    /// Config file is not valid JSON for this schema.
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Output format of the rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Graphviz DOT.
    #[default]
    Dot,
    /// JSON export with fingerprint.
    Json,
}

impl OutputFormat {
    /// Parse output format from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dot" => Some(Self::Dot),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dot => write!(f, "dot"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Settings for one ancestry rendering run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AncestryConfig {
    /// Branch name patterns (regular expressions).
    pub branch_patterns: Vec<String>,
    /// Mainline branch names, first existing wins.
    pub mainline_candidates: Vec<String>,
    /// Drop branches with tips older than this many days. `None` keeps all.
    pub max_branch_age_days: Option<i64>,
    /// Collapse linear runs before rendering.
    pub contract: bool,
    /// Output format.
    pub format: OutputFormat,
}

impl Default for AncestryConfig {
    fn default() -> Self {
        Self {
            branch_patterns: Vec::new(),
            mainline_candidates: DEFAULT_MAINLINE_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            max_branch_age_days: Some(DEFAULT_MAX_BRANCH_AGE_DAYS),
            contract: false,
            format: OutputFormat::Dot,
        }
    }
}

impl AncestryConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_json(&json)
    }

    /// The age cutoff as a duration.
    pub fn max_branch_age(&self) -> Option<chrono::Duration> {
        self.max_branch_age_days.map(chrono::Duration::days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AncestryConfig::default();
        assert_eq!(config.mainline_candidates[0], "origin/master");
        assert_eq!(config.max_branch_age_days, Some(30));
        assert!(!config.contract);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AncestryConfig::from_json(r#"{"contract": true, "format": "json"}"#).unwrap();
        assert!(config.contract);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.mainline_candidates.len(), 4);
    }

    #[test]
    fn test_null_age_keeps_all_branches() {
        let config = AncestryConfig::from_json(r#"{"max_branch_age_days": null}"#).unwrap();
        assert!(config.max_branch_age().is_none());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("DOT"), Some(OutputFormat::Dot));
        assert_eq!(OutputFormat::from_str("svg"), None);
    }
}
