//! Output formatters for reports

mod json;
mod markdown;
mod text;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

use crate::config::{ColorMode, OutputConfig, OutputFormat};
use crate::report::Report;
use crate::verdict::Verdict;

/// Output formatter trait
pub trait OutputFormatter {
    /// Format the entire report
    fn format(&self, report: &Report) -> String;

    /// Format a single verdict
    fn format_verdict(&self, verdict: &Verdict) -> String;
}

/// Formatter for the configured output settings
pub fn formatter_for(output: &OutputConfig) -> Box<dyn OutputFormatter> {
    match output.format {
        OutputFormat::Text => {
            let mut formatter = TextFormatter::new();
            formatter.show_passed = output.show_passed;
            formatter.show_stats = output.statistics;
            formatter.verbose = output.verbose;
            if output.color == ColorMode::Never {
                formatter = formatter.without_color();
            }
            Box::new(formatter)
        }
        OutputFormat::Json => Box::new(JsonFormatter {
            pretty: true,
            include_passed: output.show_passed,
        }),
        OutputFormat::Markdown => Box::new(MarkdownFormatter {
            show_passed: output.show_passed,
        }),
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}
