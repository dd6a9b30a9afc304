//! JSON output formatter

use super::OutputFormatter;
use crate::report::Report;
use crate::verdict::Verdict;
use serde::Serialize;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty print with indentation
    pub pretty: bool,

    /// Include passing verdicts
    pub include_passed: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    failed: Vec<JsonVerdict<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    passed: Option<Vec<JsonVerdict<'a>>>,
    scan_errors: Vec<JsonScanError<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonVerdict<'a> {
    rule_id: &'a str,
    passed: bool,
    severity: String,
    message: &'a str,
    entity: &'a str,
    kind: &'a str,
    file: String,
    line: usize,
    column: usize,
    length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_line: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
}

impl<'a> From<&'a Verdict> for JsonVerdict<'a> {
    fn from(v: &'a Verdict) -> Self {
        let location = v.location();
        Self {
            rule_id: &v.rule_id,
            passed: v.passed,
            severity: v.severity.to_string(),
            message: &v.message,
            entity: &v.entity.name,
            kind: v.entity.kind.as_str(),
            file: location.file.display().to_string(),
            line: location.line,
            column: location.column,
            length: location.length,
            source_line: v.entity.source_line.as_deref(),
            help: v.help.as_deref(),
            suggestion: v.suggestion.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct JsonScanError<'a> {
    path: String,
    message: &'a str,
}

#[derive(Serialize)]
struct JsonSummary {
    files_scanned: usize,
    files_with_failures: usize,
    passed_count: usize,
    failed_count: usize,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
    scan_error_count: usize,
    exit_code: i32,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &Report) -> String {
        let output = JsonOutput {
            failed: report.failed.iter().map(JsonVerdict::from).collect(),
            passed: self
                .include_passed
                .then(|| report.passed.iter().map(JsonVerdict::from).collect()),
            scan_errors: report
                .scan_errors
                .iter()
                .map(|e| JsonScanError {
                    path: e.path.display().to_string(),
                    message: &e.message,
                })
                .collect(),
            summary: JsonSummary {
                files_scanned: report.files_scanned,
                files_with_failures: report.files_with_failures(),
                passed_count: report.passed_count(),
                failed_count: report.failed_count(),
                error_count: report.error_count,
                warning_count: report.warning_count,
                info_count: report.info_count,
                scan_error_count: report.scan_errors.len(),
                exit_code: report.exit_code(),
            },
        };

        self.render(&output)
    }

    fn format_verdict(&self, verdict: &Verdict) -> String {
        self.render(&JsonVerdict::from(verdict))
    }
}
