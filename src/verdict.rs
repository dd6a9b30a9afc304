//! Verdict types for evaluation results

use crate::entity::{Entity, Location};
use serde::{Deserialize, Serialize};

/// Severity level of a failed verdict
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning - convention not followed
    #[default]
    Warning,
    /// Error - convention required by the project
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(()),
        }
    }
}

/// Outcome of applying one rule to one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// The entity that was checked
    pub entity: Entity,
    /// Rule ID that produced this verdict
    pub rule_id: String,
    /// Severity the rule carries (meaningful for failures)
    pub severity: Severity,
    /// Whether the entity satisfies the rule
    pub passed: bool,
    /// Human-readable message
    pub message: String,
    /// Help text (usually rule description)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Suggested replacement name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Verdict {
    /// Create a passing verdict
    pub fn pass(entity: &Entity, rule_id: &str, severity: Severity, message: &str) -> Self {
        Self {
            entity: entity.clone(),
            rule_id: rule_id.to_string(),
            severity,
            passed: true,
            message: message.to_string(),
            help: None,
            suggestion: None,
        }
    }

    /// Create a failing verdict
    pub fn fail(entity: &Entity, rule_id: &str, severity: Severity, message: &str) -> Self {
        Self {
            passed: false,
            ..Self::pass(entity, rule_id, severity, message)
        }
    }

    /// Add help text
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Add a suggested replacement
    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    /// Override the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn location(&self) -> &Location {
        &self.entity.location
    }

    /// Check if this is a failed error
    pub fn is_error(&self) -> bool {
        !self.passed && self.severity == Severity::Error
    }

    /// Check if this is a failed warning
    pub fn is_warning(&self) -> bool {
        !self.passed && self.severity == Severity::Warning
    }
}
