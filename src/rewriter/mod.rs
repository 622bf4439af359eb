//! In-place text substitution
//!
//! Each rule is one full read, one replacement pass and one full overwrite of
//! the target file, even when nothing matched. Rules run in definition order,
//! each on the content the previous one left on disk.

use crate::config::{RuleKind, SubstitutionRule};
use crate::domain::outcome::{FileOutcome, NormalizeError, NormalizeResult};
use regex::Regex;
use std::fs;
use std::path::Path;

/// A rule ready to be applied
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: SubstitutionRule,
    regex: Option<Regex>,
}

impl CompiledRule {
    /// Compile a rule, building the regex for `kind: regex`
    pub fn new(rule: SubstitutionRule) -> NormalizeResult<Self> {
        let regex = match rule.kind {
            RuleKind::Literal => None,
            RuleKind::Regex => Some(Regex::new(&rule.find).map_err(|e| {
                NormalizeError::pattern(format!(
                    "Invalid regex pattern in rule '{}': {}",
                    rule.id, e
                ))
            })?),
        };
        Ok(Self { rule, regex })
    }

    pub fn id(&self) -> &str {
        &self.rule.id
    }

    pub fn rule(&self) -> &SubstitutionRule {
        &self.rule
    }

    /// Replace every non-overlapping match, returning the new text and the
    /// number of matches
    pub fn apply(&self, content: &str) -> (String, usize) {
        match &self.regex {
            Some(regex) => {
                let count = regex.find_iter(content).count();
                if count == 0 {
                    return (content.to_string(), 0);
                }
                (regex.replace_all(content, self.rule.replace.as_str()).into_owned(), count)
            }
            None => replace_literal(content, &self.rule.find, &self.rule.replace),
        }
    }
}

/// Literal, left-to-right, non-overlapping replacement
///
/// Scanning resumes after each inserted `replace`, so inserted text is never
/// matched again.
pub fn replace_literal(content: &str, find: &str, replace: &str) -> (String, usize) {
    if find.is_empty() {
        return (content.to_string(), 0);
    }

    let mut output = String::with_capacity(content.len());
    let mut last_end = 0;
    let mut count = 0;

    for (start, matched) in content.match_indices(find) {
        output.push_str(&content[last_end..start]);
        output.push_str(replace);
        last_end = start + matched.len();
        count += 1;
    }
    output.push_str(&content[last_end..]);

    (output, count)
}

/// Applies an ordered rule list to files in place
#[derive(Debug, Clone)]
pub struct TextRewriter {
    rules: Vec<CompiledRule>,
    dry_run: bool,
}

impl TextRewriter {
    /// Compile the given rules in order
    pub fn new<'a, I>(rules: I) -> NormalizeResult<Self>
    where
        I: IntoIterator<Item = &'a SubstitutionRule>,
    {
        let rules = rules
            .into_iter()
            .cloned()
            .map(CompiledRule::new)
            .collect::<NormalizeResult<Vec<_>>>()?;
        Ok(Self { rules, dry_run: false })
    }

    /// Compute outcomes without touching the files
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Apply every rule to the file at `path`
    ///
    /// The file is read and overwritten once per rule. In dry-run mode it is
    /// read once and never written. The first I/O failure is returned as is;
    /// rules already applied stay applied.
    pub fn rewrite_file(&self, path: &Path) -> NormalizeResult<FileOutcome> {
        let mut outcome = FileOutcome::new(path);
        let mut original: Option<String> = None;
        let mut current = String::new();

        for rule in &self.rules {
            // A dry run persists nothing, so later rules work on the in-memory text.
            if !self.dry_run || original.is_none() {
                current = read_target(path)?;
            }
            if original.is_none() {
                original = Some(current.clone());
            }

            let (rewritten, count) = rule.apply(&current);
            if !self.dry_run {
                write_target(path, &rewritten)?;
            }

            tracing::debug!("{}: rule '{}' replaced {} occurrence(s)", path.display(), rule.id(), count);
            outcome.record(rule.id(), count);
            current = rewritten;
        }

        outcome.changed = original.is_some_and(|original| original != current);
        if outcome.changed {
            tracing::info!("Normalized {}", outcome.format_display());
        }

        Ok(outcome)
    }

    /// Apply every rule to an in-memory string
    pub fn rewrite_str(&self, content: &str) -> (String, usize) {
        self.rules.iter().fold((content.to_string(), 0), |(text, total), rule| {
            let (next, count) = rule.apply(&text);
            (next, total + count)
        })
    }
}

fn read_target(path: &Path) -> NormalizeResult<String> {
    fs::read_to_string(path).map_err(|e| NormalizeError::read(path, e))
}

fn write_target(path: &Path, content: &str) -> NormalizeResult<()> {
    fs::write(path, content).map_err(|e| NormalizeError::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn rewriter(rules: &[SubstitutionRule]) -> TextRewriter {
        TextRewriter::new(rules).unwrap()
    }

    #[rstest]
    #[case::ordered_list_indent("  3. Item", "  3. ", "3. ", "3. Item", 1)]
    #[case::escaped_asterisk("text  \\*more", "  \\*", "\\*", "text\\*more", 1)]
    #[case::no_occurrence("plain text", "  3. ", "3. ", "plain text", 0)]
    #[case::every_occurrence("  1. a\n  1. b\n", "  1. ", "1. ", "1. a\n1. b\n", 2)]
    #[case::non_overlapping("aaaa", "aa", "b", "bb", 2)]
    #[case::no_rematch_of_inserted_text("ab", "a", "aa", "aab", 1)]
    #[case::special_chars_are_literal("a.*b", ".*", "-", "a-b", 1)]
    fn test_literal_replacement(
        #[case] content: &str,
        #[case] find: &str,
        #[case] replace: &str,
        #[case] expected: &str,
        #[case] expected_count: usize,
    ) {
        let (output, count) = replace_literal(content, find, replace);
        assert_eq!(output, expected);
        assert_eq!(count, expected_count);
    }

    #[test]
    fn test_regex_rule_expands_groups() {
        let rule = CompiledRule::new(SubstitutionRule::regex("num", r"  (\d+)\. ", "$1. ")).unwrap();
        let (output, count) = rule.apply("  12. twelve\n  3. three");
        assert_eq!(output, "12. twelve\n3. three");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let result = CompiledRule::new(SubstitutionRule::regex("bad", "(", ""));
        assert!(matches!(result, Err(NormalizeError::Pattern { .. })));
    }

    #[test]
    fn test_rules_apply_in_order_to_previous_result() {
        let rules = [
            SubstitutionRule::literal("first", "a", "b"),
            SubstitutionRule::literal("second", "b", "c"),
        ];
        let (output, total) = rewriter(&rules).rewrite_str("ab");
        assert_eq!(output, "cc");
        assert_eq!(total, 3);
    }

    #[test]
    fn test_rewrite_file_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("README.md");
        fs::write(&path, "Steps:\n  1. Open\n  2. Run  \\*fast\\*\n").unwrap();

        let config = crate::config::NormalizeConfig::default();
        let rewriter = TextRewriter::new(config.enabled_rules()).unwrap();
        let outcome = rewriter.rewrite_file(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Steps:\n1. Open\n2. Run\\*fast\\*\n"
        );
        assert!(outcome.changed);
        assert_eq!(outcome.rules_applied, 10);
        assert_eq!(outcome.replacements(), 3);
    }

    #[test]
    fn test_unchanged_file_keeps_identical_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clean.md");
        let content = "# Title\n\n1. already fine\n";
        fs::write(&path, content).unwrap();

        let rules = [SubstitutionRule::literal("indent", "  1. ", "1. ")];
        let outcome = rewriter(&rules).rewrite_file(&path).unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.rules_applied, 1);
        assert_eq!(fs::read(&path).unwrap(), content.as_bytes());
    }

    #[test]
    fn test_dry_run_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("draft.md");
        fs::write(&path, "  1. one\n  2. two\n").unwrap();

        let rules = [
            SubstitutionRule::literal("one", "  1. ", "1. "),
            SubstitutionRule::literal("two", "  2. ", "2. "),
        ];
        let outcome = rewriter(&rules).with_dry_run(true).rewrite_file(&path).unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.replacements(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "  1. one\n  2. two\n");
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let rules = [SubstitutionRule::literal("r", "a", "b")];
        let result = rewriter(&rules).rewrite_file(&temp_dir.path().join("gone.md"));
        assert!(matches!(result, Err(NormalizeError::Read { .. })));
    }

    #[test]
    fn test_failed_write_names_the_target() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir.md");
        fs::write(&blocker, "").unwrap();
        let target = blocker.join("child.md");

        match write_target(&target, "text") {
            Err(NormalizeError::Write { path, .. }) => assert_eq!(path, target),
            other => panic!("expected a write error, got {other:?}"),
        }
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("twice.md");
        fs::write(&path, "  4. four  \\*\n").unwrap();

        let config = crate::config::NormalizeConfig::default();
        let rewriter = TextRewriter::new(config.enabled_rules()).unwrap();
        rewriter.rewrite_file(&path).unwrap();
        let once = fs::read_to_string(&path).unwrap();

        let second = rewriter.rewrite_file(&path).unwrap();
        assert!(!second.changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), once);
    }
}
