//! Naming rule definitions

use crate::casing::Casing;
use crate::config::ConfigError;
use crate::entity::EntityKind;
use crate::verdict::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule category for grouping related rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Identifier and file naming
    #[default]
    Naming,
    /// Formatting such as line length
    Style,
    /// Import organization
    Imports,
    /// Comments and doc comments
    Documentation,
    /// Project layout
    Structure,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Naming => write!(f, "naming"),
            RuleCategory::Style => write!(f, "style"),
            RuleCategory::Imports => write!(f, "imports"),
            RuleCategory::Documentation => write!(f, "documentation"),
            RuleCategory::Structure => write!(f, "structure"),
        }
    }
}

impl std::str::FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "naming" => Ok(RuleCategory::Naming),
            "style" => Ok(RuleCategory::Style),
            "imports" => Ok(RuleCategory::Imports),
            "documentation" | "docs" => Ok(RuleCategory::Documentation),
            "structure" => Ok(RuleCategory::Structure),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// A naming rule definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier (e.g., "class-naming")
    pub id: String,

    /// Kind of entity this rule applies to
    pub kind: EntityKind,

    /// Casing the name must follow (after affixes are stripped)
    pub casing: Casing,

    /// Required prefix (e.g., "_" for private members)
    #[serde(default)]
    pub prefix: Option<String>,

    /// Required suffix (e.g., "Error" for error classes)
    #[serde(default)]
    pub suffix: Option<String>,

    /// Detailed description
    #[serde(default)]
    pub description: Option<String>,

    /// Default severity level
    #[serde(default)]
    pub severity: Severity,

    /// Rule category
    #[serde(default)]
    pub category: RuleCategory,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether this rule is enabled by default
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Rationale explaining why this rule exists
    #[serde(default)]
    pub rationale: Option<String>,

    /// Example of a violating name
    #[serde(default)]
    pub example_bad: Option<String>,

    /// Example of a conforming name
    #[serde(default)]
    pub example_good: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Rule {
    /// Create a new rule with minimal required fields
    pub fn new(id: &str, kind: EntityKind, casing: Casing) -> Self {
        Self {
            id: id.to_string(),
            kind,
            casing,
            prefix: None,
            suffix: None,
            description: None,
            severity: Severity::Warning,
            category: RuleCategory::Naming,
            tags: Vec::new(),
            enabled: true,
            rationale: None,
            example_bad: None,
            example_good: None,
        }
    }

    /// Set the required prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Set the required suffix
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = Some(suffix.to_string());
        self
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the description
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Set the rationale
    pub fn with_rationale(mut self, rationale: &str) -> Self {
        self.rationale = Some(rationale.to_string());
        self
    }

    /// Set bad and good examples
    pub fn with_examples(mut self, bad: &str, good: &str) -> Self {
        self.example_bad = Some(bad.to_string());
        self.example_good = Some(good.to_string());
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Check if rule has the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Short description of what a conforming name looks like
    pub fn expectation(&self) -> String {
        let mut s = self.casing.to_string();
        if let Some(prefix) = &self.prefix {
            s.push_str(&format!(" with prefix '{}'", prefix));
        }
        if let Some(suffix) = &self.suffix {
            let joiner = if self.prefix.is_some() { " and" } else { " with" };
            s.push_str(&format!("{} suffix '{}'", joiner, suffix));
        }
        s
    }

    /// Reject definitions that cannot be evaluated
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::Invalid("rule id must not be empty".to_string()));
        }
        if !Casing::KebabCase.matches(&self.id) {
            return Err(ConfigError::Invalid(format!(
                "rule id '{}' must be kebab-case",
                self.id
            )));
        }
        if !self.kind.is_named() {
            return Err(ConfigError::Invalid(format!(
                "rule '{}' targets '{}', which has no name to check",
                self.id, self.kind
            )));
        }
        for (what, affix) in [("prefix", &self.prefix), ("suffix", &self.suffix)] {
            if let Some(affix) = affix {
                if affix.is_empty() || affix.chars().any(char::is_whitespace) {
                    return Err(ConfigError::Invalid(format!(
                        "rule '{}' has an invalid {} '{}'",
                        self.id, what, affix
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Rule file format (for loading from YAML/JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFile {
    /// File format version
    #[serde(default)]
    pub version: Option<String>,

    /// Rules defined in this file
    pub rules: Vec<Rule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_creation() {
        let rule = Rule::new("class-naming", EntityKind::Class, Casing::PascalCase);

        assert_eq!(rule.id, "class-naming");
        assert_eq!(rule.kind, EntityKind::Class);
        assert_eq!(rule.severity, Severity::Warning);
        assert_eq!(rule.category, RuleCategory::Naming);
        assert!(rule.enabled);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_rule_builder() {
        let rule = Rule::new("error-suffix", EntityKind::Class, Casing::PascalCase)
            .with_suffix("Error")
            .with_severity(Severity::Error)
            .with_tag("errors")
            .with_description("Error classes end in Error");

        assert_eq!(rule.suffix.as_deref(), Some("Error"));
        assert_eq!(rule.severity, Severity::Error);
        assert!(rule.has_tag("errors"));
        assert!(!rule.has_tag("naming"));
    }

    #[test]
    fn test_expectation() {
        let rule = Rule::new("p", EntityKind::PrivateProperty, Casing::CamelCase).with_prefix("_");
        assert_eq!(rule.expectation(), "camelCase with prefix '_'");

        let rule = Rule::new("s", EntityKind::Class, Casing::PascalCase)
            .with_prefix("Abstract")
            .with_suffix("Base");
        assert_eq!(
            rule.expectation(),
            "PascalCase with prefix 'Abstract' and suffix 'Base'"
        );
    }

    #[test]
    fn test_validate_rejects_malformed() {
        assert!(Rule::new("", EntityKind::Class, Casing::PascalCase)
            .validate()
            .is_err());
        assert!(Rule::new("ClassNaming", EntityKind::Class, Casing::PascalCase)
            .validate()
            .is_err());
        assert!(Rule::new("x", EntityKind::Line, Casing::PascalCase)
            .validate()
            .is_err());
        assert!(Rule::new("x", EntityKind::Class, Casing::PascalCase)
            .with_prefix("")
            .validate()
            .is_err());
        assert!(Rule::new("x", EntityKind::Class, Casing::PascalCase)
            .with_suffix("My Suffix")
            .validate()
            .is_err());
    }

    #[test]
    fn test_rule_file_deserialize() {
        let yaml = r#"
version: "1.0"
rules:
  - id: private-property-prefix
    kind: private-property
    casing: camelCase
    prefix: "_"
    severity: error
    tags:
      - members
"#;

        let file: RuleFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.version, Some("1.0".to_string()));
        assert_eq!(file.rules.len(), 1);
        let rule = &file.rules[0];
        assert_eq!(rule.kind, EntityKind::PrivateProperty);
        assert_eq!(rule.casing, Casing::CamelCase);
        assert_eq!(rule.prefix.as_deref(), Some("_"));
        assert_eq!(rule.severity, Severity::Error);
        assert!(rule.enabled);
    }

    #[test]
    fn test_rule_file_rejects_unknown_casing() {
        let yaml = r#"
rules:
  - id: bad
    kind: class
    casing: Train-Case
"#;
        assert!(serde_yaml::from_str::<RuleFile>(yaml).is_err());
    }
}
