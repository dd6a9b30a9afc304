//! Markdown report formatter

use super::{plural, OutputFormatter};
use crate::report::Report;
use crate::verdict::Verdict;

/// Markdown report grouped by file
#[derive(Default)]
pub struct MarkdownFormatter {
    /// Add a section listing passing verdicts
    pub show_passed: bool,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format(&self, report: &Report) -> String {
        let mut lines = vec!["# Convention Check Report".to_string(), String::new()];

        if report.failed.is_empty() {
            lines.push("No violations found.".to_string());
        } else {
            lines.push(format!(
                "Total violations found: {} ({} in {})",
                report.failed_count(),
                plural(report.error_count, "error"),
                plural(report.files_with_failures(), "file")
            ));
            for (file, verdicts) in report.failed_by_file() {
                lines.push(String::new());
                lines.push(format!("## {}", file.display()));
                lines.push(String::new());
                for verdict in verdicts {
                    lines.push(self.format_verdict(verdict));
                }
            }
        }

        if self.show_passed && !report.passed.is_empty() {
            lines.push(String::new());
            lines.push(format!("## Passed ({})", report.passed_count()));
            lines.push(String::new());
            for verdict in &report.passed {
                lines.push(format!(
                    "- `{}` [{}] {}",
                    verdict.location(),
                    verdict.rule_id,
                    verdict.message
                ));
            }
        }

        if !report.scan_errors.is_empty() {
            lines.push(String::new());
            lines.push("## Scan errors".to_string());
            lines.push(String::new());
            for err in &report.scan_errors {
                lines.push(format!("- `{}`: {}", err.path.display(), err.message));
            }
        }

        lines.push(String::new());
        lines.join("\n")
    }

    fn format_verdict(&self, verdict: &Verdict) -> String {
        let location = verdict.location();
        let mut line = if location.line > 0 {
            format!(
                "- Line {}: **{}** [{}] {}",
                location.line, verdict.severity, verdict.rule_id, verdict.message
            )
        } else {
            format!(
                "- **{}** [{}] {}",
                verdict.severity, verdict.rule_id, verdict.message
            )
        };
        if let Some(suggestion) = &verdict.suggestion {
            line.push_str(&format!(" (suggested: `{}`)", suggestion));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, EntityKind, Location};
    use crate::report::ReportBuilder;
    use crate::verdict::Severity;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_clean_report() {
        let output = MarkdownFormatter::new().format(&ReportBuilder::new().build());
        assert_eq!(output, "# Convention Check Report\n\nNo violations found.\n");
    }

    #[test]
    fn test_grouped_by_file() {
        let mut builder = ReportBuilder::new();
        builder.add(
            Verdict::fail(
                &Entity::file(Path::new("src/UserService.ts")),
                "file-naming",
                Severity::Warning,
                "File name 'UserService.ts' should be kebab-case",
            )
            .with_suggestion("user-service.ts"),
        );
        builder.add(Verdict::fail(
            &Entity::new(
                "x",
                EntityKind::Line,
                Location::new(PathBuf::from("src/UserService.ts"), 4, 101),
            ),
            "line-length",
            Severity::Error,
            "Line is 120 characters, exceeds 100",
        ));

        let output = MarkdownFormatter::new().format(&builder.build());
        let expected = "\
# Convention Check Report

Total violations found: 2 (1 error in 1 file)

## src/UserService.ts

- **warning** [file-naming] File name 'UserService.ts' should be kebab-case (suggested: `user-service.ts`)
- Line 4: **error** [line-length] Line is 120 characters, exceeds 100
";
        assert_eq!(output, expected);
    }
}
