//! Configuration loading and management for md-normalize
//!
//! The YAML file is optional. Without one, the built-in defaults reproduce the
//! fixed behavior: `md` files two levels below the root, ordered-list
//! indentation rules followed by the escaped-asterisk rule.

use crate::domain::outcome::{NormalizeError, NormalizeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Config file names probed in the working directory, in order
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    ["md_normalize.yaml", "md_normalize.yml", ".md_normalize.yaml"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Configuration format version
    pub version: String,
    /// Traversal settings
    #[serde(default)]
    pub walker: WalkerConfig,
    /// Substitution rules, applied in this order
    pub rules: Vec<SubstitutionRule>,
}

/// Traversal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Target extension, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Sort each directory listing by file name
    #[serde(default)]
    pub sort_entries: bool,
    /// Glob patterns on category directory names that are never descended
    #[serde(default)]
    pub ignored_categories: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            sort_entries: false,
            ignored_categories: Vec::new(),
        }
    }
}

/// An ordered (find, replace) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRule {
    /// Unique identifier for this rule
    pub id: String,
    /// Text to find
    pub find: String,
    /// Text substituted for every occurrence
    pub replace: String,
    /// How `find` is interpreted
    #[serde(default)]
    pub kind: RuleKind,
    /// Whether this rule is applied
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// How a rule's `find` text is matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Exact text, no special characters
    #[default]
    Literal,
    /// Regular expression; `replace` may use `$1`-style group references
    Regex,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Regex => "regex",
        }
    }
}

impl SubstitutionRule {
    /// Create an enabled literal rule
    pub fn literal(id: impl Into<String>, find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            find: find.into(),
            replace: replace.into(),
            kind: RuleKind::Literal,
            enabled: true,
        }
    }

    /// Create an enabled regex rule
    pub fn regex(id: impl Into<String>, find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Regex,
            ..Self::literal(id, find, replace)
        }
    }

    /// Whether a second application can find new matches introduced by the first
    pub fn reintroduces_find(&self) -> bool {
        self.kind == RuleKind::Literal && self.replace.contains(&self.find)
    }
}

impl NormalizeConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> NormalizeResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            NormalizeError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            NormalizeError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> NormalizeResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| NormalizeError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, else the first default file present in
    /// `dir`, else the built-in defaults
    pub fn discover<P: AsRef<Path>>(explicit: Option<&Path>, dir: P) -> NormalizeResult<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        for name in DEFAULT_CONFIG_FILES {
            let candidate = dir.as_ref().join(name);
            if candidate.is_file() {
                tracing::debug!("Using config file {}", candidate.display());
                return Self::load_from_file(candidate);
            }
        }

        Ok(Self::default())
    }

    /// Get default configuration with built-in rules
    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            walker: WalkerConfig::default(),
            rules: Self::default_rules(),
        }
    }

    /// Ordered-list indentation for items 1 to 9, then the escaped asterisk
    fn default_rules() -> Vec<SubstitutionRule> {
        let mut rules: Vec<SubstitutionRule> = (1..=9)
            .map(|n| {
                SubstitutionRule::literal(
                    format!("ordered_list_{n}"),
                    format!("  {n}. "),
                    format!("{n}. "),
                )
            })
            .collect();

        rules.push(SubstitutionRule::literal("escaped_asterisk", r"  \*", r"\*"));
        rules
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> NormalizeResult<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            return Err(NormalizeError::config(format!(
                "Unsupported configuration version: {}. Supported versions: 1.0",
                self.version
            )));
        }

        let extension = &self.walker.extension;
        if extension.is_empty() {
            return Err(NormalizeError::config("Target extension must not be empty"));
        }
        if extension.starts_with('.') {
            return Err(NormalizeError::config(format!(
                "Target extension '{extension}' must not start with a dot"
            )));
        }

        for pattern in &self.walker.ignored_categories {
            glob::Pattern::new(pattern).map_err(|e| {
                NormalizeError::pattern(format!("Invalid ignored category '{pattern}': {e}"))
            })?;
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(NormalizeError::config(format!("Duplicate rule ID '{}'", rule.id)));
            }

            if rule.find.is_empty() {
                return Err(NormalizeError::config(format!(
                    "Rule '{}' has an empty find text",
                    rule.id
                )));
            }

            if rule.kind == RuleKind::Regex {
                regex::Regex::new(&rule.find).map_err(|e| {
                    NormalizeError::pattern(format!(
                        "Invalid regex pattern in rule '{}': {}",
                        rule.id, e
                    ))
                })?;
            }

            if rule.reintroduces_find() {
                tracing::warn!(
                    "Rule '{}' reintroduces its own find text; repeated runs will keep rewriting",
                    rule.id
                );
            }
        }

        Ok(())
    }

    /// Enabled rules in application order
    pub fn enabled_rules(&self) -> impl Iterator<Item = &SubstitutionRule> {
        self.rules.iter().filter(|rule| rule.enabled)
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> NormalizeResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| NormalizeError::config(format!("Failed to serialize config: {e}")))
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_extension() -> String {
    "md".to_string()
}

fn default_true() -> bool {
    true
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: NormalizeConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self { config: NormalizeConfig::default() }
    }

    /// Start from an empty rule list
    pub fn without_rules(mut self) -> Self {
        self.config.rules.clear();
        self
    }

    /// Append a rule after the existing ones
    pub fn add_rule(mut self, rule: SubstitutionRule) -> Self {
        self.config.rules.push(rule);
        self
    }

    /// Set the target extension
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.config.walker.extension = extension.into();
        self
    }

    /// Sort directory listings by name
    pub fn sort_entries(mut self, sort: bool) -> Self {
        self.config.walker.sort_entries = sort;
        self
    }

    /// Skip category directories matching a glob
    pub fn ignore_category(mut self, pattern: impl Into<String>) -> Self {
        self.config.walker.ignored_categories.push(pattern.into());
        self
    }

    /// Build the final configuration
    pub fn build(self) -> NormalizeResult<NormalizeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_rules_order() {
        let config = NormalizeConfig::default();
        config.validate().unwrap();

        assert_eq!(config.walker.extension, "md");
        assert_eq!(config.rules.len(), 10);
        assert_eq!(config.rules[0].find, "  1. ");
        assert_eq!(config.rules[0].replace, "1. ");
        assert_eq!(config.rules[2].find, "  3. ");

        let last = config.rules.last().unwrap();
        assert_eq!(last.id, "escaped_asterisk");
        assert_eq!(last.find, "  \\*");
        assert_eq!(last.replace, "\\*");
        assert!(config.rules.iter().all(|r| !r.reintroduces_find()));
    }

    #[test]
    fn test_load_from_str_with_partial_walker() {
        let yaml = r##"
version: "1.0"
walker:
  sort_entries: true
rules:
  - id: nbsp
    find: "&nbsp;"
    replace: " "
  - id: heading
    find: "^#(\\w)"
    replace: "# $1"
    kind: regex
    enabled: false
"##;
        let config = NormalizeConfig::load_from_str(yaml).unwrap();

        assert_eq!(config.walker.extension, "md");
        assert!(config.walker.sort_entries);
        assert_eq!(config.rules[0].kind, RuleKind::Literal);
        assert!(config.rules[0].enabled);
        assert_eq!(config.rules[1].kind, RuleKind::Regex);
        assert_eq!(config.enabled_rules().count(), 1);
    }

    #[test]
    fn test_validation_failures() {
        let bad_version = "version: \"2.0\"\nrules: []\n";
        assert!(NormalizeConfig::load_from_str(bad_version).is_err());

        let dotted = ConfigBuilder::new().extension(".md").build();
        assert!(dotted.is_err());

        let empty_find = ConfigBuilder::new()
            .add_rule(SubstitutionRule::literal("empty", "", "x"))
            .build();
        assert!(empty_find.is_err());

        let duplicate = ConfigBuilder::new()
            .add_rule(SubstitutionRule::literal("ordered_list_1", "a", "b"))
            .build();
        assert!(duplicate.is_err());

        let bad_regex = ConfigBuilder::new()
            .add_rule(SubstitutionRule::regex("broken", "(unclosed", ""))
            .build();
        assert!(matches!(bad_regex, Err(NormalizeError::Pattern { .. })));

        let bad_glob = ConfigBuilder::new().ignore_category("[oops").build();
        assert!(matches!(bad_glob, Err(NormalizeError::Pattern { .. })));
    }

    #[test]
    fn test_discover_prefers_explicit_then_default_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        let config = NormalizeConfig::discover(None, dir).unwrap();
        assert_eq!(config.rules.len(), 10);

        fs::write(
            dir.join("md_normalize.yml"),
            "version: \"1.0\"\nrules:\n  - id: only\n    find: a\n    replace: b\n",
        )
        .unwrap();
        let config = NormalizeConfig::discover(None, dir).unwrap();
        assert_eq!(config.rules.len(), 1);

        let explicit = dir.join("custom.yaml");
        fs::write(&explicit, "version: \"1.0\"\nwalker:\n  extension: txt\nrules: []\n").unwrap();
        let config = NormalizeConfig::discover(Some(&explicit), dir).unwrap();
        assert_eq!(config.walker.extension, "txt");
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_yaml_round_trip_keeps_rules() {
        let config = NormalizeConfig::default();
        let yaml = config.to_yaml().unwrap();
        let reloaded = NormalizeConfig::load_from_str(&yaml).unwrap();
        assert_eq!(reloaded.rules, config.rules);
    }
}
