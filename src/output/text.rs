//! Human-readable text output formatter

use super::{plural, OutputFormatter};
use crate::report::Report;
use crate::verdict::{Severity, Verdict};
use colored::*;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show the offending source line
    pub show_source: bool,

    /// Show help text
    pub show_help: bool,

    /// Show suggested names
    pub show_suggestions: bool,

    /// Show statistics
    pub show_stats: bool,

    /// List passing verdicts after the failures
    pub show_passed: bool,

    /// Add per-rule failure counts to the statistics
    pub verbose: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_source: true,
            show_help: true,
            show_suggestions: true,
            show_stats: true,
            show_passed: false,
            verbose: false,
        }
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.colored {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn severity_str(&self, severity: Severity) -> String {
        let s = severity.to_string();
        match severity {
            Severity::Error => self.paint(&s, |t| t.red().bold()),
            Severity::Warning => self.paint(&s, |t| t.yellow().bold()),
            Severity::Info => self.paint(&s, |t| t.blue()),
        }
    }

    fn format_stats(&self, report: &Report) -> String {
        let mut output = format!("{} scanned", plural(report.files_scanned, "file"));

        let mut counts = Vec::new();
        if report.error_count > 0 {
            counts.push(self.paint(&plural(report.error_count, "error"), |t| t.red()));
        }
        if report.warning_count > 0 {
            counts.push(self.paint(&plural(report.warning_count, "warning"), |t| t.yellow()));
        }
        if report.info_count > 0 {
            counts.push(self.paint(&plural(report.info_count, "info"), |t| t.blue()));
        }
        if !counts.is_empty() {
            output.push_str(&format!(": {}", counts.join(", ")));
        }
        output.push_str(&format!(
            " ({} passed, {} failed)\n",
            report.passed_count(),
            report.failed_count()
        ));

        if self.verbose {
            for (rule_id, count) in report.counts_by_rule() {
                output.push_str(&format!("  {:<28} {}\n", rule_id, count));
            }
        }

        if !report.scan_errors.is_empty() {
            output.push_str(&format!(
                "{} could not be scanned:\n",
                plural(report.scan_errors.len(), "path")
            ));
            for err in &report.scan_errors {
                output.push_str(&format!("  {}\n", err));
            }
        }

        output
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &Report) -> String {
        let mut output = String::new();

        for (file, verdicts) in report.failed_by_file() {
            output.push_str(&self.paint(&file.display().to_string(), |t| t.underline()));
            output.push('\n');
            for verdict in verdicts {
                output.push_str(&self.format_verdict(verdict));
            }
            output.push('\n');
        }

        if self.show_passed && !report.passed.is_empty() {
            output.push_str(&self.paint("Passed", |t| t.green().bold()));
            output.push('\n');
            for verdict in &report.passed {
                output.push_str(&self.format_verdict(verdict));
            }
            output.push('\n');
        }

        if self.show_stats {
            output.push_str(&self.format_stats(report));
        }

        output
    }

    fn format_verdict(&self, verdict: &Verdict) -> String {
        let mut output = String::new();
        let location = verdict.location();

        let status = if verdict.passed {
            self.paint("pass", |t| t.green())
        } else {
            self.severity_str(verdict.severity)
        };
        output.push_str(&format!(
            "{}: {}[{}]: {}\n",
            location,
            status,
            self.paint(&verdict.rule_id, |t| t.cyan()),
            verdict.message
        ));

        if verdict.passed {
            return output;
        }

        let bar = self.paint("|", |t| t.blue());
        if self.show_source && location.line > 0 {
            if let Some(source) = &verdict.entity.source_line {
                output.push_str(&format!(
                    "{} {} {}\n",
                    self.paint(&format!("{:>4}", location.line), |t| t.blue()),
                    bar,
                    source
                ));
                if location.column > 0 {
                    let padding = " ".repeat(location.column - 1);
                    let underline = "^".repeat(location.length.max(1));
                    output.push_str(&format!(
                        "     {} {}{}\n",
                        bar,
                        padding,
                        self.paint(&underline, |t| t.red())
                    ));
                }
            }
        }

        if self.show_help {
            if let Some(help) = &verdict.help {
                output.push_str(&format!("     {} help: {}\n", self.paint("=", |t| t.blue()), help));
            }
        }

        if self.show_suggestions {
            if let Some(suggestion) = &verdict.suggestion {
                output.push_str(&format!(
                    "     {} suggestion: {}\n",
                    self.paint("=", |t| t.green()),
                    self.paint(suggestion, |t| t.green())
                ));
            }
        }

        output
    }
}
