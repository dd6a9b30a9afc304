//! convcheck - Naming Convention Checker
//!
//! Checks a TypeScript source tree against documented naming conventions:
//! file names in kebab-case, classes in PascalCase, private members with a
//! leading underscore, and so on. A handful of content checks (line length,
//! parent-directory imports, TODO assignees, JSDoc on functions, project
//! layout) run alongside the naming rules.
//!
//! # Architecture
//!
//! ```text
//! CLI/API -> Engine -> Scanner -> Evaluator (+ SourceChecks) -> ReportBuilder
//!                        ^             ^
//!                      Config      RuleRegistry
//! ```
//!
//! # Custom rules
//!
//! Rules are plain data, so projects can add their own in the configuration
//! file or in a separate rule file:
//!
//! ```yaml
//! rules:
//!   custom:
//!     - id: error-class-suffix
//!       kind: class
//!       casing: PascalCase
//!       suffix: Error
//!       severity: error
//! ```

pub mod casing;
pub mod checks;
pub mod config;
pub mod engine;
pub mod entity;
pub mod evaluator;
pub mod extract;
pub mod output;
pub mod registry;
pub mod report;
pub mod rule;
pub mod scanner;
pub mod source;
pub mod verdict;

// Re-export main types
pub use casing::Casing;
pub use checks::SourceCheck;
pub use config::{Config, ConfigError};
pub use engine::Engine;
pub use entity::{Entity, EntityKind, Location};
pub use evaluator::{evaluate, evaluate_rule};
pub use output::{JsonFormatter, MarkdownFormatter, OutputFormatter, TextFormatter};
pub use registry::RuleRegistry;
pub use report::{Report, ReportBuilder};
pub use rule::{Rule, RuleCategory};
pub use scanner::{ScanError, Scanner};
pub use source::SourceFile;
pub use verdict::{Severity, Verdict};
