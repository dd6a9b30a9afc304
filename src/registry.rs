//! Rule registry
//!
//! Holds the naming rules for a run. Rules are validated once when the
//! registry is built and never change afterwards.

use crate::casing::Casing;
use crate::config::ConfigError;
use crate::entity::EntityKind;
use crate::rule::{Rule, RuleFile};
use crate::verdict::Severity;
use std::collections::HashSet;
use std::path::Path;

/// Get all built-in naming rules
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::new("file-naming", EntityKind::File, Casing::KebabCase)
            .with_description("File names use kebab-case")
            .with_rationale("Mixed-case file names break on case-insensitive file systems")
            .with_examples("UserService.ts", "user-service.ts")
            .with_tag("files"),
        Rule::new("class-naming", EntityKind::Class, Casing::PascalCase)
            .with_description("Class names use PascalCase")
            .with_examples("class userService {}", "class UserService {}")
            .with_tag("types"),
        Rule::new("interface-naming", EntityKind::Interface, Casing::PascalCase)
            .with_description("Interface names use PascalCase")
            .with_examples("interface user_profile {}", "interface UserProfile {}")
            .with_tag("types"),
        Rule::new("function-naming", EntityKind::Function, Casing::CamelCase)
            .with_description("Function names use camelCase")
            .with_examples("function GetUser() {}", "function getUser() {}")
            .with_tag("values"),
        Rule::new("variable-naming", EntityKind::Variable, Casing::CamelCase)
            .with_description("Variable names use camelCase")
            .with_examples("let user_name = '';", "let userName = '';")
            .with_tag("values"),
        Rule::new("constant-naming", EntityKind::Constant, Casing::UpperSnakeCase)
            .with_description("Module-level literal constants use UPPER_SNAKE_CASE")
            .with_examples("const maxRetries = 3;", "const MAX_RETRIES = 3;")
            .with_tag("values"),
        Rule::new("enum-naming", EntityKind::Enum, Casing::PascalCase)
            .with_description("Enum names use PascalCase")
            .with_examples("enum user_role {}", "enum UserRole {}")
            .with_tag("types"),
        Rule::new("type-alias-naming", EntityKind::TypeAlias, Casing::PascalCase)
            .with_description("Type alias names use PascalCase")
            .with_examples("type userId = string;", "type UserId = string;")
            .with_tag("types"),
        Rule::new("property-naming", EntityKind::Property, Casing::CamelCase)
            .with_description("Class properties use camelCase")
            .with_examples("public UserName: string;", "public userName: string;")
            .with_tag("members"),
        Rule::new(
            "private-property-prefix",
            EntityKind::PrivateProperty,
            Casing::CamelCase,
        )
        .with_prefix("_")
        .with_description("Private properties use camelCase with a leading underscore")
        .with_examples("private password: string;", "private _password: string;")
        .with_tag("members"),
    ]
}

/// Ordered, immutable set of naming rules
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Registry with the built-in rules
    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Build a registry, validating every rule
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            rule.validate()?;
            if !seen.insert(rule.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate rule id '{}'",
                    rule.id
                )));
            }
        }
        Ok(Self { rules })
    }

    /// Built-in rules followed by `extra`; an extra rule with a built-in id replaces it in place
    pub fn with_overrides(extra: Vec<Rule>) -> Result<Self, ConfigError> {
        let mut rules = builtin_rules();
        let mut appended = Vec::new();
        for rule in extra {
            match rules.iter_mut().find(|r| r.id == rule.id) {
                Some(existing) => *existing = rule,
                None => appended.push(rule),
            }
        }
        rules.extend(appended);
        Self::from_rules(rules)
    }

    /// Load rules from a YAML or JSON rule file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_rules(load_rule_file(path)?.rules)
    }

    /// Rules applicable to `kind`, in registration order
    pub fn rules_for(&self, kind: EntityKind) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.iter().filter(move |r| r.kind == kind)
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// All rules, in registration order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Severity of a rule, falling back to warning for unknown ids
    pub fn severity_of(&self, id: &str) -> Severity {
        self.get(id).map(|r| r.severity).unwrap_or_default()
    }
}

/// Parse a rule file by extension
pub fn load_rule_file(path: &Path) -> Result<RuleFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let file: RuleFile = match ext {
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "json" => serde_json::from_str(&content)?,
        _ => {
            return Err(ConfigError::Invalid(format!(
                "Unknown rule file format: {}",
                ext
            )))
        }
    };
    log::info!("Loaded {} rules from {}", file.rules.len(), path.display());
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_rules_are_valid() {
        let registry = RuleRegistry::from_rules(builtin_rules()).unwrap();
        assert_eq!(registry.len(), 10);
    }

    #[test]
    fn test_builtin_covers_every_named_kind() {
        let registry = RuleRegistry::builtin();
        for kind in EntityKind::NAMED {
            assert!(
                registry.rules_for(kind).next().is_some(),
                "no rule for {}",
                kind
            );
        }
    }

    #[test]
    fn test_rules_for_keeps_order() {
        let registry = RuleRegistry::from_rules(vec![
            Rule::new("b-rule", EntityKind::Class, Casing::PascalCase),
            Rule::new("fn-rule", EntityKind::Function, Casing::CamelCase),
            Rule::new("a-rule", EntityKind::Class, Casing::PascalCase).with_suffix("Impl"),
        ])
        .unwrap();

        let ids: Vec<_> = registry
            .rules_for(EntityKind::Class)
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b-rule", "a-rule"]);
        assert_eq!(registry.rules_for(EntityKind::Enum).count(), 0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = RuleRegistry::from_rules(vec![
            Rule::new("dup", EntityKind::Class, Casing::PascalCase),
            Rule::new("dup", EntityKind::Enum, Casing::PascalCase),
        ]);
        assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("dup")));
    }

    #[test]
    fn test_overrides_replace_in_place() {
        let registry = RuleRegistry::with_overrides(vec![
            Rule::new("file-naming", EntityKind::File, Casing::CamelCase),
            Rule::new("error-suffix", EntityKind::Class, Casing::PascalCase).with_suffix("Error"),
        ])
        .unwrap();

        assert_eq!(registry.rules()[0].id, "file-naming");
        assert_eq!(registry.rules()[0].casing, Casing::CamelCase);
        assert_eq!(registry.len(), 11);
        assert_eq!(registry.rules().last().unwrap().id, "error-suffix");
    }

    #[test]
    fn test_get_and_severity() {
        let registry = RuleRegistry::builtin();
        assert!(registry.get("class-naming").is_some());
        assert!(registry.get("nope").is_none());
        assert_eq!(registry.severity_of("nope"), Severity::Warning);
    }

    #[test]
    fn test_load_rule_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "rules:\n  - id: enum-member\n    kind: enum\n    casing: PascalCase\n    suffix: Kind"
        )
        .unwrap();

        let registry = RuleRegistry::load(file.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.rules()[0].suffix.as_deref(), Some("Kind"));
    }

    #[test]
    fn test_load_malformed_rule_file_fails() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{\"rules\": [{{\"id\": \"x\"}}]}}").unwrap();
        assert!(matches!(
            RuleRegistry::load(file.path()),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_load_unknown_extension_fails() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            RuleRegistry::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
