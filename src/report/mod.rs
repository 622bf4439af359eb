//! Report generation for completed runs
//!
//! Renders a `RunReport` for people (`human`) or programs (`json`).

use crate::domain::outcome::{FileOutcome, NormalizeError, NormalizeResult, RunReport};
use std::io::Write;

/// Supported output formats for run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with colors
    Human,
    /// JSON format for programmatic consumption
    Json,
}

impl OutputFormat {
    /// Parse format from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use ANSI colors (human format)
    pub use_colors: bool,
    /// List files that were visited but left unchanged
    pub show_unchanged: bool,
    /// List per-rule replacement counts under each file
    pub show_rule_hits: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_unchanged: false,
            show_rule_hits: true,
        }
    }
}

/// Report formatter dispatching on output format
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a run report in the specified format
    pub fn format_report(&self, report: &RunReport, format: OutputFormat) -> NormalizeResult<String> {
        match format {
            OutputFormat::Human => Ok(self.format_human(report)),
            OutputFormat::Json => self.format_json(report),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &RunReport,
        format: OutputFormat,
        mut writer: W,
    ) -> NormalizeResult<()> {
        let formatted = self.format_report(report, format)?;
        writer
            .write_all(formatted.as_bytes())
            .map_err(|e| NormalizeError::Io { source: e })?;
        Ok(())
    }

    fn format_human(&self, report: &RunReport) -> String {
        let mut output = String::new();

        if !report.has_changes() {
            output.push_str(&self.paint("32", "No files needed normalization"));
            output.push('\n');
        } else {
            let header = if report.dry_run { "Files that would change" } else { "Files normalized" };
            output.push_str(&self.paint("33", header));
            output.push_str("\n\n");
        }

        for file in &report.files {
            if file.changed {
                output.push_str(&format!("  {}\n", file.format_display()));
                if self.options.show_rule_hits {
                    self.push_hits(&mut output, file);
                }
            } else if self.options.show_unchanged {
                output.push_str(&self.paint("2", &format!("  {} (unchanged)", file.path.display())));
                output.push('\n');
            }
        }

        output.push('\n');
        output.push_str(&self.format_summary(report));
        output
    }

    fn push_hits(&self, output: &mut String, file: &FileOutcome) {
        for hit in &file.hits {
            let line = format!("    {} x{}", hit.rule_id, hit.replacements);
            output.push_str(&self.paint("2", &line));
            output.push('\n');
        }
    }

    fn format_summary(&self, report: &RunReport) -> String {
        let summary = &report.summary;
        let verb = if report.dry_run { "would change" } else { "changed" };
        format!(
            "{} file{} visited, {} {}, {} replacement{} in {}ms\n",
            summary.files_visited,
            if summary.files_visited == 1 { "" } else { "s" },
            summary.files_changed,
            verb,
            summary.replacements,
            if summary.replacements == 1 { "" } else { "s" },
            summary.execution_time_ms
        )
    }

    fn format_json(&self, report: &RunReport) -> NormalizeResult<String> {
        let files: Vec<&FileOutcome> = report
            .files
            .iter()
            .filter(|f| f.changed || self.options.show_unchanged)
            .collect();

        let json_report = serde_json::json!({
            "files": files,
            "summary": {
                "files_visited": report.summary.files_visited,
                "files_changed": report.summary.files_changed,
                "replacements": report.summary.replacements,
                "execution_time_ms": report.summary.execution_time_ms,
                "started_at": report.summary.started_at.to_rfc3339(),
            },
            "dry_run": report.dry_run,
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| NormalizeError::config(format!("Failed to serialize report: {e}")))
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.options.use_colors {
            format!("\x1b[{color}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> RunReport {
        let mut report = RunReport::new();

        let mut changed = FileOutcome::new("analysis/buffer/README.md");
        changed.record("ordered_list_1", 2);
        changed.record("escaped_asterisk", 1);
        changed.changed = true;
        report.add_outcome(changed);

        let mut clean = FileOutcome::new("map/view/README.md");
        clean.record("ordered_list_1", 0);
        report.add_outcome(clean);

        report
    }

    fn plain() -> ReportFormatter {
        ReportFormatter::new(ReportOptions { use_colors: false, ..Default::default() })
    }

    #[test]
    fn test_human_lists_changed_files() {
        let output = plain().format_report(&sample_report(), OutputFormat::Human).unwrap();

        assert!(output.contains("Files normalized"));
        assert!(output.contains("analysis/buffer/README.md (3 replacements)"));
        assert!(output.contains("ordered_list_1 x2"));
        assert!(!output.contains("map/view/README.md"));
        assert!(output.contains("2 files visited, 1 changed, 3 replacements"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_human_shows_unchanged_on_request() {
        let formatter = ReportFormatter::new(ReportOptions {
            use_colors: false,
            show_unchanged: true,
            show_rule_hits: false,
        });
        let output = formatter.format_report(&sample_report(), OutputFormat::Human).unwrap();

        assert!(output.contains("map/view/README.md (unchanged)"));
        assert!(!output.contains("ordered_list_1 x2"));
    }

    #[test]
    fn test_empty_run_in_dry_run_mode() {
        let mut report = RunReport::new();
        report.set_dry_run(true);
        let output = plain().format_report(&report, OutputFormat::Human).unwrap();

        assert!(output.contains("No files needed normalization"));
        assert!(output.contains("0 files visited, 0 would change"));
    }

    #[test]
    fn test_json_format() {
        let json = plain().format_report(&sample_report(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["summary"]["files_visited"], 2);
        assert_eq!(parsed["summary"]["files_changed"], 1);
        assert_eq!(parsed["files"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["files"][0]["hits"][1]["rule_id"], "escaped_asterisk");
        assert_eq!(parsed["dry_run"], false);
    }

    #[test]
    fn test_write_report_matches_format_report() {
        let report = sample_report();
        let mut buffer = Vec::new();
        plain().write_report(&report, OutputFormat::Human, &mut buffer).unwrap();

        let expected = plain().format_report(&report, OutputFormat::Human).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), expected);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("xml"), None);
        assert_eq!(OutputFormat::all_formats().len(), 2);
    }
}
