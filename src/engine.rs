//! Check engine
//!
//! Runs the scanner over a root, evaluates every entity against the naming
//! rules, runs the source checks, and collects it all into a [`Report`].

use crate::checks::{builtin_checks, SourceCheck};
use crate::config::{Config, ConfigError};
use crate::evaluator::evaluate_rule;
use crate::registry::RuleRegistry;
use crate::report::{Report, ReportBuilder};
use crate::rule::{Rule, RuleCategory};
use crate::scanner::Scanner;
use crate::source::SourceFile;
use crate::verdict::{Severity, Verdict};
use globset::GlobMatcher;
use std::path::Path;
use std::time::Instant;

/// The main check engine
pub struct Engine {
    config: Config,
    registry: RuleRegistry,
    checks: Vec<Box<dyn SourceCheck>>,
    per_file: Vec<(GlobMatcher, Vec<String>)>,
    min_severity: Option<Severity>,
}

impl Engine {
    /// Create an engine, validating the configuration
    pub fn new(config: Config, registry: RuleRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        let checks = builtin_checks(&config.checks);
        let per_file = config.per_file_matchers()?;
        Ok(Self {
            config,
            registry,
            checks,
            per_file,
            min_severity: None,
        })
    }

    /// Build the registry a configuration asks for and create an engine with it
    ///
    /// Uses `rules.file` when set, otherwise the built-in rules, then applies
    /// `rules.custom` on top.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let registry = match &config.rules.file {
            Some(path) => {
                let mut rules = crate::registry::load_rule_file(path)?.rules;
                for custom in config.rules.custom.iter().cloned() {
                    match rules.iter_mut().find(|r| r.id == custom.id) {
                        Some(existing) => *existing = custom,
                        None => rules.push(custom),
                    }
                }
                RuleRegistry::from_rules(rules)?
            }
            None => RuleRegistry::with_overrides(config.rules.custom.clone())?,
        };
        Self::new(config, registry)
    }

    /// Drop failures below `severity` from reports
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn checks(&self) -> &[Box<dyn SourceCheck>] {
        &self.checks
    }

    /// Naming rules that are active under the configuration
    pub fn active_rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.registry
            .rules()
            .iter()
            .filter(|rule| self.is_active(&rule.id, rule.category, rule.enabled))
    }

    /// Source checks that are active under the configuration
    pub fn active_checks(&self) -> impl Iterator<Item = &dyn SourceCheck> + '_ {
        self.checks
            .iter()
            .map(|check| check.as_ref())
            .filter(|check| self.is_active(check.id(), check.category(), true))
    }

    fn is_active(&self, id: &str, category: RuleCategory, enabled: bool) -> bool {
        if !self.config.is_rule_enabled(id) {
            return false;
        }
        // An explicit selection turns on rules that are off by default
        let selected = self.config.rules.enabled.iter().any(|r| r == id);
        (enabled || selected) && self.config.is_category_enabled(category)
    }

    fn ignored_for_file(&self, rule_id: &str, file: &Path, root: &Path) -> bool {
        let relative = file.strip_prefix(root).unwrap_or(file);
        self.per_file.iter().any(|(matcher, rules)| {
            (matcher.is_match(relative) || matcher.is_match(file))
                && rules.iter().any(|r| r == "all" || r == rule_id)
        })
    }

    fn severity_for(&self, rule_id: &str, default: Severity) -> Severity {
        self.config.get_severity_override(rule_id).unwrap_or(default)
    }

    /// Check everything under `root`
    pub fn run(&self, root: &Path) -> Result<Report, ConfigError> {
        let start = Instant::now();
        let scanner = Scanner::new(root, &self.config)?;
        let rules: Vec<&Rule> = self.active_rules().collect();
        let checks: Vec<&dyn SourceCheck> = self.active_checks().collect();

        let mut builder = ReportBuilder::new();
        if let Some(min) = self.min_severity {
            builder = builder.with_min_severity(min);
        }

        for file in scanner.files() {
            match file {
                Ok(file) => {
                    builder.file_scanned();
                    builder.extend(self.check_file(&file, root, &rules, &checks));
                }
                Err(err) => builder.add_scan_error(err),
            }
        }

        for check in &checks {
            for verdict in check.check_project(root) {
                let severity = self.severity_for(&verdict.rule_id, verdict.severity);
                builder.add(verdict.with_severity(severity));
            }
        }

        let report = builder.build();
        log::info!(
            "Checked {} files in {:?}: {} passed, {} failed",
            report.files_scanned,
            start.elapsed(),
            report.passed_count(),
            report.failed_count()
        );
        Ok(report)
    }

    /// Check several roots and merge the results
    pub fn run_all(&self, roots: &[impl AsRef<Path>]) -> Result<Report, ConfigError> {
        let mut report = Report::default();
        for root in roots {
            report.merge(self.run(root.as_ref())?);
        }
        Ok(report)
    }

    /// Verdicts for one source file
    fn check_file(
        &self,
        file: &SourceFile,
        root: &Path,
        rules: &[&Rule],
        checks: &[&dyn SourceCheck],
    ) -> Vec<Verdict> {
        let path = file.path();
        let keep = |rule_id: &str, line: usize| {
            !self.ignored_for_file(rule_id, path, root) && !file.is_suppressed(rule_id, line)
        };

        let mut verdicts = Vec::new();
        for entity in file.entities() {
            for rule in rules.iter().filter(|r| r.kind == entity.kind) {
                if !keep(&rule.id, entity.location.line) {
                    continue;
                }
                let verdict = evaluate_rule(&entity, rule);
                let severity = self.severity_for(&rule.id, verdict.severity);
                verdicts.push(verdict.with_severity(severity));
            }
        }

        for check in checks {
            for verdict in check.check_file(file) {
                if keep(&verdict.rule_id, verdict.location().line) {
                    let severity = self.severity_for(&verdict.rule_id, verdict.severity);
                    verdicts.push(verdict.with_severity(severity));
                }
            }
        }

        log::debug!("{}: {} verdicts", path.display(), verdicts.len());
        verdicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn engine(config: Config) -> Engine {
        Engine::from_config(config).unwrap()
    }

    #[test]
    fn test_disabled_rules_are_inactive() {
        let mut config = Config::default();
        config.rules.disabled.push("class-naming".to_string());
        config.rules.disabled.push("line-length".to_string());
        let engine = engine(config);

        assert!(engine.active_rules().all(|r| r.id != "class-naming"));
        assert!(engine.active_checks().all(|c| c.id() != "line-length"));
    }

    #[test]
    fn test_categories_filter_checks() {
        let engine = engine(Config::preset("minimal").unwrap());
        assert_eq!(engine.active_checks().count(), 0);
        assert_eq!(engine.active_rules().count(), 10);
    }

    #[test]
    fn test_rule_disabled_by_default_can_be_selected() {
        let mut config = Config::default();
        let mut rule = Rule::new("error-suffix", EntityKind::Class, crate::casing::Casing::PascalCase)
            .with_suffix("Error");
        rule.enabled = false;
        config.rules.custom.push(rule);
        assert!(engine(config.clone()).active_rules().all(|r| r.id != "error-suffix"));

        config.rules.enabled = vec!["error-suffix".to_string()];
        let ids: Vec<_> = engine(config).active_rules().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["error-suffix"]);
    }

    #[test]
    fn test_severity_override_and_suppression() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("user.ts"),
            "class userModel {}\n// convcheck-disable-next-line class-naming\nclass orderModel {}\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.rules.severity.insert("class-naming".to_string(), Severity::Error);
        let report = engine(config).run(dir.path()).unwrap();

        let class_failures: Vec<_> = report
            .failed
            .iter()
            .filter(|v| v.rule_id == "class-naming")
            .collect();
        assert_eq!(class_failures.len(), 1);
        assert_eq!(class_failures[0].entity.name, "userModel");
        assert_eq!(class_failures[0].severity, Severity::Error);
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_per_file_ignore_uses_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("legacy")).unwrap();
        fs::write(dir.path().join("legacy/OldThing.ts"), "class old_thing {}\n").unwrap();

        let mut config = Config::default();
        config
            .rules
            .per_file
            .insert("legacy/**".to_string(), vec!["all".to_string()]);
        let report = engine(config).run(dir.path()).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.files_scanned, 1);
    }

    #[test]
    fn test_project_structure_verdicts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.checks.required_files.push("README.md".to_string());
        let report = engine(config).run(dir.path()).unwrap();
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failed[0].rule_id, "project-structure");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.categories.push("speed".to_string());
        assert!(Engine::from_config(config).is_err());

        let mut config = Config::default();
        config.rules.custom.push(Rule::new(
            "Bad Id",
            EntityKind::Class,
            crate::casing::Casing::PascalCase,
        ));
        assert!(matches!(
            Engine::from_config(config),
            Err(ConfigError::Invalid(_))
        ));
    }
}
