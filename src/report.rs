//! Report building
//!
//! Collects verdicts from a run into a [`Report`] with a stable ordering:
//! by file, line, column, then rule id.

use crate::scanner::ScanError;
use crate::verdict::{Severity, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Result of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Failing verdicts, in location order
    pub failed: Vec<Verdict>,

    /// Passing verdicts, in location order
    pub passed: Vec<Verdict>,

    /// Paths that could not be scanned
    pub scan_errors: Vec<ScanError>,

    /// Files scanned successfully
    pub files_scanned: usize,

    /// Failed verdicts with error severity
    pub error_count: usize,

    /// Failed verdicts with warning severity
    pub warning_count: usize,

    /// Failed verdicts with info severity
    pub info_count: usize,
}

impl Report {
    pub fn passed_count(&self) -> usize {
        self.passed.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Total number of verdicts
    pub fn len(&self) -> usize {
        self.failed.len() + self.passed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty() && self.passed.is_empty()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Check if result is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Check if scan errors kept anything from being checked (e.g. a missing root)
    pub fn nothing_scanned(&self) -> bool {
        self.files_scanned == 0 && !self.scan_errors.is_empty()
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors or nothing scanned)
    pub fn exit_code(&self) -> i32 {
        if self.has_errors() || self.nothing_scanned() {
            2
        } else if self.has_warnings() {
            1
        } else {
            0
        }
    }

    /// Failed verdicts grouped by file, files in path order
    pub fn failed_by_file(&self) -> BTreeMap<&Path, Vec<&Verdict>> {
        let mut groups: BTreeMap<&Path, Vec<&Verdict>> = BTreeMap::new();
        for verdict in &self.failed {
            groups
                .entry(verdict.location().file.as_path())
                .or_default()
                .push(verdict);
        }
        groups
    }

    /// Number of distinct files with at least one failure
    pub fn files_with_failures(&self) -> usize {
        self.failed_by_file().len()
    }

    /// Failure counts per rule id, sorted by id
    pub fn counts_by_rule(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for verdict in &self.failed {
            *counts.entry(verdict.rule_id.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Merge another report into this one, keeping the ordering
    pub fn merge(&mut self, other: Report) {
        let mut builder = ReportBuilder::new();
        builder.extend(self.failed.drain(..));
        builder.extend(self.passed.drain(..));
        builder.extend(other.failed);
        builder.extend(other.passed);
        for err in self.scan_errors.drain(..).chain(other.scan_errors) {
            builder.add_scan_error(err);
        }
        builder.files_scanned = self.files_scanned + other.files_scanned;
        *self = builder.build();
    }
}

/// Accumulates verdicts for a [`Report`]
#[derive(Debug, Default)]
pub struct ReportBuilder {
    verdicts: Vec<Verdict>,
    scan_errors: Vec<ScanError>,
    files_scanned: usize,
    min_severity: Option<Severity>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop failures below `severity`
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    pub fn add(&mut self, verdict: Verdict) {
        self.verdicts.push(verdict);
    }

    pub fn extend(&mut self, verdicts: impl IntoIterator<Item = Verdict>) {
        self.verdicts.extend(verdicts);
    }

    pub fn add_scan_error(&mut self, err: ScanError) {
        self.scan_errors.push(err);
    }

    /// Count one successfully scanned file
    pub fn file_scanned(&mut self) {
        self.files_scanned += 1;
    }

    pub fn build(self) -> Report {
        let min_severity = self.min_severity;
        let (mut failed, mut passed): (Vec<_>, Vec<_>) = self
            .verdicts
            .into_iter()
            .filter(|v| v.passed || min_severity.map_or(true, |min| v.severity >= min))
            .partition(|v| !v.passed);

        failed.sort_by(compare);
        passed.sort_by(compare);

        let mut scan_errors = self.scan_errors;
        scan_errors.sort_by(|a, b| a.path.cmp(&b.path));

        let count = |severity| failed.iter().filter(|v| v.severity == severity).count();
        let error_count = count(Severity::Error);
        let warning_count = count(Severity::Warning);
        let info_count = count(Severity::Info);

        Report {
            failed,
            passed,
            scan_errors,
            files_scanned: self.files_scanned,
            error_count,
            warning_count,
            info_count,
        }
    }
}

fn compare(a: &Verdict, b: &Verdict) -> std::cmp::Ordering {
    let (la, lb) = (a.location(), b.location());
    la.file
        .cmp(&lb.file)
        .then(la.line.cmp(&lb.line))
        .then(la.column.cmp(&lb.column))
        .then_with(|| a.rule_id.cmp(&b.rule_id))
        .then_with(|| a.message.cmp(&b.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, EntityKind, Location};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn verdict(file: &str, line: usize, rule: &str, passed: bool, severity: Severity) -> Verdict {
        let entity = Entity::new(
            "x",
            EntityKind::Variable,
            Location::new(PathBuf::from(file), line, 1),
        );
        if passed {
            Verdict::pass(&entity, rule, severity, "ok")
        } else {
            Verdict::fail(&entity, rule, severity, "bad")
        }
    }

    #[test]
    fn test_empty_report() {
        let report = ReportBuilder::new().build();
        assert!(report.is_empty());
        assert!(report.is_clean());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_ordering_and_partition() {
        let mut builder = ReportBuilder::new();
        builder.add(verdict("b.ts", 1, "r", false, Severity::Warning));
        builder.add(verdict("a.ts", 9, "r", true, Severity::Warning));
        builder.add(verdict("a.ts", 2, "z-rule", false, Severity::Error));
        builder.add(verdict("a.ts", 2, "a-rule", false, Severity::Info));
        let report = builder.build();

        let failed: Vec<_> = report
            .failed
            .iter()
            .map(|v| (v.location().file.display().to_string(), v.location().line, v.rule_id.as_str()))
            .collect();
        assert_eq!(
            failed,
            vec![
                ("a.ts".to_string(), 2, "a-rule"),
                ("a.ts".to_string(), 2, "z-rule"),
                ("b.ts".to_string(), 1, "r"),
            ]
        );
        assert_eq!(report.passed_count(), 1);
        assert_eq!((report.error_count, report.warning_count, report.info_count), (1, 1, 1));
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_exit_codes() {
        let mut builder = ReportBuilder::new();
        builder.add(verdict("a.ts", 1, "r", false, Severity::Info));
        builder.add(verdict("a.ts", 2, "r", true, Severity::Error));
        assert_eq!(builder.build().exit_code(), 0);

        let mut builder = ReportBuilder::new();
        builder.add(verdict("a.ts", 1, "r", false, Severity::Warning));
        assert_eq!(builder.build().exit_code(), 1);

        let mut builder = ReportBuilder::new();
        builder.add_scan_error(ScanError::new(Path::new("srcc"), "No such file or directory"));
        let report = builder.build();
        assert!(report.nothing_scanned());
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_min_severity() {
        let mut builder = ReportBuilder::new().with_min_severity(Severity::Error);
        builder.add(verdict("a.ts", 1, "r", false, Severity::Warning));
        builder.add(verdict("a.ts", 2, "r", false, Severity::Error));
        builder.add(verdict("a.ts", 3, "r", true, Severity::Info));
        let report = builder.build();
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.warning_count, 0);
    }

    #[test]
    fn test_group_by_file_and_rule() {
        let mut builder = ReportBuilder::new();
        builder.add(verdict("b.ts", 1, "r1", false, Severity::Warning));
        builder.add(verdict("a.ts", 1, "r1", false, Severity::Warning));
        builder.add(verdict("a.ts", 2, "r2", false, Severity::Warning));
        let report = builder.build();

        let groups = report.failed_by_file();
        let files: Vec<_> = groups.keys().map(|p| p.display().to_string()).collect();
        assert_eq!(files, vec!["a.ts", "b.ts"]);
        assert_eq!(groups[Path::new("a.ts")].len(), 2);
        assert_eq!(report.files_with_failures(), 2);
        assert_eq!(report.counts_by_rule().get("r1"), Some(&2));
    }

    #[test]
    fn test_merge() {
        let mut first = ReportBuilder::new();
        first.add(verdict("b.ts", 1, "r", false, Severity::Warning));
        first.file_scanned();
        let mut first = first.build();

        let mut second = ReportBuilder::new();
        second.add(verdict("a.ts", 1, "r", false, Severity::Error));
        second.add_scan_error(ScanError::new(Path::new("c.ts"), "denied"));
        second.file_scanned();

        first.merge(second.build());
        assert_eq!(first.files_scanned, 2);
        assert_eq!(first.failed[0].location().file, PathBuf::from("a.ts"));
        assert_eq!(first.scan_errors.len(), 1);
        assert_eq!(first.exit_code(), 2);
    }
}
