//! Core domain models for rewrite outcomes and run reports
//!
//! A `FileOutcome` records what the rule set did to one target file; a
//! `RunReport` aggregates them for a whole traversal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Replacements made by a single rule in a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHit {
    /// Identifier of the rule that matched
    pub rule_id: String,
    /// Number of non-overlapping occurrences replaced
    pub replacements: usize,
}

/// Result of applying the ordered rule set to one target file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Path of the rewritten file, as discovered by the walker
    pub path: PathBuf,
    /// Number of rules applied (each one a full read and overwrite)
    pub rules_applied: usize,
    /// Rules that replaced at least one occurrence, in application order
    pub hits: Vec<RuleHit>,
    /// Whether the final content differs from the original
    pub changed: bool,
}

impl FileOutcome {
    /// Create an outcome for a file no rule has touched yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rules_applied: 0,
            hits: Vec::new(),
            changed: false,
        }
    }

    /// Record one rule application
    pub fn record(&mut self, rule_id: &str, replacements: usize) {
        self.rules_applied += 1;
        if replacements > 0 {
            self.hits.push(RuleHit {
                rule_id: rule_id.to_string(),
                replacements,
            });
        }
    }

    /// Total replacements across all rules
    pub fn replacements(&self) -> usize {
        self.hits.iter().map(|h| h.replacements).sum()
    }

    /// Format outcome for display
    pub fn format_display(&self) -> String {
        let count = self.replacements();
        format!(
            "{} ({} replacement{})",
            self.path.display(),
            count,
            if count == 1 { "" } else { "s" }
        )
    }
}

/// Summary statistics for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of target files visited
    pub files_visited: usize,
    /// Number of files whose content changed
    pub files_changed: usize,
    /// Total replacements across all files
    pub replacements: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    /// Timestamp when the run started
    pub started_at: DateTime<Utc>,
}

/// Complete report of a successful run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Per-file outcomes in visiting order
    pub files: Vec<FileOutcome>,
    /// Summary statistics
    pub summary: RunSummary,
    /// Whether files were left untouched on disk
    pub dry_run: bool,
}

impl RunReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            summary: RunSummary {
                started_at: Utc::now(),
                ..Default::default()
            },
            dry_run: false,
        }
    }

    /// Add a file outcome to the report
    pub fn add_outcome(&mut self, outcome: FileOutcome) {
        self.summary.files_visited += 1;
        if outcome.changed {
            self.summary.files_changed += 1;
        }
        self.summary.replacements += outcome.replacements();
        self.files.push(outcome);
    }

    /// Whether any file content changed
    pub fn has_changes(&self) -> bool {
        self.summary.files_changed > 0
    }

    /// Outcomes for files whose content changed
    pub fn changed_files(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.changed)
    }

    /// Look up the outcome for a path
    pub fn outcome_for(&self, path: &Path) -> Option<&FileOutcome> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Set the execution time
    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }

    /// Mark the report as produced without writing
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Error types that can occur during a run
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// Configuration file could not be loaded, parsed or validated
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The traversal root is missing or not a directory
    #[error("Root {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// A directory could not be listed or an entry could not be stat'ed
    #[error("Traversal error at {}: {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A target file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A target file could not be written back
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Regex rule or glob pattern failed to compile
    #[error("Pattern error: {message}")]
    Pattern { message: String },

    /// Any other I/O failure
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl NormalizeError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a pattern error
    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern {
            message: message.into(),
        }
    }

    /// Create a read error for a path
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a write error for a path
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Result type for md-normalize operations
pub type NormalizeResult<T> = Result<T, NormalizeError>;
