//! md-normalize - in-place cleanup of converted markdown
//!
//! Walks `root/category/subfolder/*.md` and applies an ordered list of literal
//! substitutions to every file found, rewriting each one in place. The built-in
//! rules fix ordered-list indentation and escaped-asterisk artifacts left by
//! HTML-to-markdown conversion.

pub mod config;
pub mod domain;
pub mod report;
pub mod rewriter;
pub mod walker;

// Re-export main types for convenient access
pub use domain::outcome::{
    FileOutcome, NormalizeError, NormalizeResult, RuleHit, RunReport, RunSummary,
};

pub use config::{ConfigBuilder, NormalizeConfig, RuleKind, SubstitutionRule, WalkerConfig};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use rewriter::TextRewriter;

pub use walker::DirectoryWalker;

use std::path::Path;
use std::time::Instant;

/// Walks a tree and rewrites every target file with the configured rules
pub struct Normalizer {
    walker: DirectoryWalker,
    rewriter: TextRewriter,
}

impl Normalizer {
    /// Create a normalizer with the given configuration
    pub fn new_with_config(config: NormalizeConfig) -> NormalizeResult<Self> {
        config.validate()?;
        let walker = DirectoryWalker::from_config(&config.walker)?;
        let rewriter = TextRewriter::new(config.enabled_rules())?;
        Ok(Self { walker, rewriter })
    }

    /// Create a normalizer with the built-in rules
    pub fn new() -> NormalizeResult<Self> {
        Self::new_with_config(NormalizeConfig::default())
    }

    /// Create a normalizer loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> NormalizeResult<Self> {
        Self::new_with_config(NormalizeConfig::load_from_file(path)?)
    }

    /// Report what would change without writing anything
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.rewriter = self.rewriter.with_dry_run(dry_run);
        self
    }

    /// Force sorted directory listings
    pub fn with_sorted_entries(mut self, sort: bool) -> Self {
        self.walker = self.walker.with_sorted_entries(sort);
        self
    }

    /// Walk `root` and rewrite every target file, stopping at the first error
    ///
    /// Files are rewritten as they are discovered. On error, files already
    /// processed keep their new content and the rest are left untouched.
    pub fn run<P: AsRef<Path>>(&self, root: P) -> NormalizeResult<RunReport> {
        let start_time = Instant::now();
        let root = root.as_ref();
        let mut report = RunReport::new();
        report.set_dry_run(self.rewriter.is_dry_run());

        tracing::debug!(
            "Normalizing .{} files under {} with {} rule(s)",
            self.walker.extension(),
            root.display(),
            self.rewriter.rules().len()
        );

        self.walker.walk(root, |path| {
            let outcome = self.rewriter.rewrite_file(path)?;
            report.add_outcome(outcome);
            Ok(())
        })?;

        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        Ok(report)
    }

    /// Rewrite a single file with the configured rules
    pub fn normalize_file<P: AsRef<Path>>(&self, path: P) -> NormalizeResult<FileOutcome> {
        self.rewriter.rewrite_file(path.as_ref())
    }

    /// Apply the configured rules to a string
    pub fn normalize_str(&self, content: &str) -> String {
        self.rewriter.rewrite_str(content).0
    }

    pub fn walker(&self) -> &DirectoryWalker {
        &self.walker
    }

    pub fn rewriter(&self) -> &TextRewriter {
        &self.rewriter
    }
}

/// Normalize `root` with the built-in rules
pub fn normalize_tree<P: AsRef<Path>>(root: P) -> NormalizeResult<RunReport> {
    Normalizer::new()?.run(root)
}
