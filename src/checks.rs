//! Source checks
//!
//! Content checks that look at raw lines or at the project layout rather than
//! at declaration names. They only ever report failures.

use crate::config::ChecksConfig;
use crate::entity::{Entity, EntityKind, Location};
use crate::extract::{mask_line, MaskState};
use crate::rule::RuleCategory;
use crate::source::SourceFile;
use crate::verdict::{Severity, Verdict};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?:import|export)\b.*?\bfrom\s+['"]([^'"]*)['"]|^\s*import\s+['"]([^'"]*)['"]|\brequire\(\s*['"]([^'"]*)['"]\s*\)"#)
        .unwrap()
});

static TODO_ASSIGNED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"TODO\s*\(@\w+\)").unwrap());

static FUNCTION_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+(?:default\s+)?)?(?:async\s+)?function\b|^\s*(?:export\s+)?const\s+[\w$]+\s*=\s*(?:async\s+)?function\b")
        .unwrap()
});

/// How many lines above a function a `/**` block may start
const JSDOC_WINDOW: usize = 3;

/// A content check addressed by id, like a naming rule
pub trait SourceCheck {
    /// Check identifier (e.g., "line-length")
    fn id(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    fn category(&self) -> RuleCategory;

    /// Default severity level
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// Check one source file
    fn check_file(&self, _file: &SourceFile) -> Vec<Verdict> {
        Vec::new()
    }

    /// Check the scanned root as a whole
    fn check_project(&self, _root: &Path) -> Vec<Verdict> {
        Vec::new()
    }
}

/// All source checks, configured from `config`
pub fn builtin_checks(config: &ChecksConfig) -> Vec<Box<dyn SourceCheck>> {
    vec![
        Box::new(LineLength {
            max: config.max_line_length,
        }),
        Box::new(NoParentImports),
        Box::new(TodoAssignee),
        Box::new(JsDocRequired),
        Box::new(ProjectStructure {
            files: config.required_files.clone(),
            dirs: config.required_dirs.clone(),
        }),
    ]
}

fn line_failure(
    check: &dyn SourceCheck,
    file: &SourceFile,
    kind: EntityKind,
    line_num: usize,
    column: usize,
    line: &str,
    message: &str,
) -> Verdict {
    let location = Location::new(file.path().to_path_buf(), line_num, column);
    let entity = Entity::new(line.trim(), kind, location).with_source_line(line);
    Verdict::fail(&entity, check.id(), check.severity(), message).with_help(check.description())
}

/// Lines longer than the configured maximum
pub struct LineLength {
    pub max: usize,
}

impl SourceCheck for LineLength {
    fn id(&self) -> &'static str {
        "line-length"
    }

    fn description(&self) -> &'static str {
        "Lines stay within the configured maximum length"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Style
    }

    fn check_file(&self, file: &SourceFile) -> Vec<Verdict> {
        let mut verdicts = Vec::new();
        for (idx, line) in file.lines().enumerate() {
            let length = line.trim_end().chars().count();
            if length > self.max {
                let verdict = line_failure(
                    self,
                    file,
                    EntityKind::Line,
                    idx + 1,
                    self.max + 1,
                    line,
                    &format!("Line is {} characters, exceeds {}", length, self.max),
                );
                verdicts.push(verdict);
            }
        }
        verdicts
    }
}

/// Imports reaching into a parent directory
pub struct NoParentImports;

impl SourceCheck for NoParentImports {
    fn id(&self) -> &'static str {
        "no-parent-imports"
    }

    fn description(&self) -> &'static str {
        "Import through a path alias or module index instead of '..'"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Imports
    }

    fn check_file(&self, file: &SourceFile) -> Vec<Verdict> {
        let mut state = MaskState::Code;
        let mut verdicts = Vec::new();
        for (idx, line) in file.lines().enumerate() {
            let code = mask_line(line, &mut state);
            let Some(caps) = IMPORT_RE.captures(line) else {
                continue;
            };
            let Some(spec) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
                continue;
            };
            // The opening quote survives masking only when it is code
            let quote_at = line[..spec.start()].chars().count().saturating_sub(1);
            if !matches!(code.chars().nth(quote_at), Some('\'' | '"')) {
                continue;
            }
            if spec.as_str().split('/').any(|part| part == "..") {
                let column = line[..spec.start()].chars().count() + 1;
                verdicts.push(line_failure(
                    self,
                    file,
                    EntityKind::Import,
                    idx + 1,
                    column,
                    line,
                    &format!("Avoid parent directory import '{}'", spec.as_str()),
                ));
            }
        }
        verdicts
    }
}

/// TODO comments without an `(@user)` assignee
pub struct TodoAssignee;

impl SourceCheck for TodoAssignee {
    fn id(&self) -> &'static str {
        "todo-assignee"
    }

    fn description(&self) -> &'static str {
        "TODO comments name an assignee, as in TODO(@user)"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Documentation
    }

    fn check_file(&self, file: &SourceFile) -> Vec<Verdict> {
        let mut verdicts = Vec::new();
        for (idx, line) in file.lines().enumerate() {
            let Some(pos) = line.find("TODO") else {
                continue;
            };
            if TODO_ASSIGNED_RE.is_match(line) {
                continue;
            }
            verdicts.push(line_failure(
                self,
                file,
                EntityKind::Comment,
                idx + 1,
                line[..pos].chars().count() + 1,
                line,
                "TODO comment should have an assignee (@username)",
            ));
        }
        verdicts
    }
}

/// Function declarations without a JSDoc block right above them
pub struct JsDocRequired;

impl SourceCheck for JsDocRequired {
    fn id(&self) -> &'static str {
        "jsdoc-required"
    }

    fn description(&self) -> &'static str {
        "Functions are documented with a /** */ block"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Documentation
    }

    fn check_file(&self, file: &SourceFile) -> Vec<Verdict> {
        let lines: Vec<&str> = file.lines().collect();
        let mut state = MaskState::Code;
        let mut verdicts = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let code = mask_line(line, &mut state);
            // A function on the first line has nothing above it to check
            if idx == 0 || !FUNCTION_DECL_RE.is_match(&code) {
                continue;
            }
            let window = &lines[idx.saturating_sub(JSDOC_WINDOW)..idx];
            if window.iter().any(|l| l.contains("/**")) {
                continue;
            }
            let column = code.len() - code.trim_start().len() + 1;
            verdicts.push(line_failure(
                self,
                file,
                EntityKind::Function,
                idx + 1,
                column,
                line,
                "Missing JSDoc comment for function",
            ));
        }
        verdicts
    }
}

/// Files and directories every project must have
pub struct ProjectStructure {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
}

impl SourceCheck for ProjectStructure {
    fn id(&self) -> &'static str {
        "project-structure"
    }

    fn description(&self) -> &'static str {
        "The project contains the configured files and directories"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }

    fn check_project(&self, root: &Path) -> Vec<Verdict> {
        if !root.is_dir() {
            return Vec::new();
        }

        let entity = Entity::new("", EntityKind::Project, Location::file(root));
        let mut verdicts = Vec::new();
        for file in &self.files {
            if !root.join(file).is_file() {
                verdicts.push(
                    Verdict::fail(
                        &entity,
                        self.id(),
                        self.severity(),
                        &format!("Missing required file: {}", file),
                    )
                    .with_help(self.description()),
                );
            }
        }
        for dir in &self.dirs {
            if !root.join(dir).is_dir() {
                verdicts.push(
                    Verdict::fail(
                        &entity,
                        self.id(),
                        self.severity(),
                        &format!("Missing required directory: {}", dir),
                    )
                    .with_help(self.description()),
                );
            }
        }
        verdicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(content: &str) -> SourceFile {
        SourceFile::new(Path::new("src/a.ts"), content.to_string())
    }

    #[test]
    fn test_line_length() {
        let check = LineLength { max: 10 };
        let file = source("short\nthis line is too long\nexactly10c   \n");
        let verdicts = check.check_file(&file);
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].location().line, 2);
        assert_eq!(verdicts[0].location().column, 11);
        assert!(!verdicts[0].passed);
        assert_eq!(verdicts[0].rule_id, "line-length");
    }

    #[test]
    fn test_parent_imports() {
        let file = source(concat!(
            "import { a } from '../a';\n",
            "import { b } from './b';\n",
            "import '../../polyfill';\n",
            "const c = require(\"../c\");\n",
            "export * from '..';\n",
            "import { d } from '@app/..d';\n",
        ));
        let lines: Vec<_> = NoParentImports
            .check_file(&file)
            .iter()
            .map(|v| v.location().line)
            .collect();
        assert_eq!(lines, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_parent_imports_in_comments_and_strings_ignored() {
        let file = source(concat!(
            "// const x = require('../x');\n",
            "/*\n",
            "import { y } from '../y';\n",
            "*/\n",
            "const help = `\n",
            "const z = require('../z');\n",
            "`;\n",
            "const w = require('../w'); // real\n",
        ));
        let lines: Vec<_> = NoParentImports
            .check_file(&file)
            .iter()
            .map(|v| v.location().line)
            .collect();
        assert_eq!(lines, vec![8]);
    }

    #[test]
    fn test_todo_assignee() {
        let file = source("// TODO: fix\n// TODO(@sam): fix\n// TODO (@kim) later\nconst x = 1;\n");
        let verdicts = TodoAssignee.check_file(&file);
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].location().line, 1);
        assert_eq!(verdicts[0].location().column, 4);
    }

    #[test]
    fn test_jsdoc_required() {
        let file = source(concat!(
            "function first() {}\n",
            "\n",
            "/**\n",
            " * Documented.\n",
            " */\n",
            "export function documented() {}\n",
            "\n",
            "\n",
            "\n",
            "\n",
            "async function undocumented() {}\n",
            "const handler = function () {};\n",
            "// function in a comment\n",
        ));
        let lines: Vec<_> = JsDocRequired
            .check_file(&file)
            .iter()
            .map(|v| v.location().line)
            .collect();
        assert_eq!(lines, vec![11, 12]);
    }

    #[test]
    fn test_project_structure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();

        let check = ProjectStructure {
            files: vec!["package.json".to_string(), "README.md".to_string()],
            dirs: vec!["src".to_string(), "test".to_string()],
        };
        let messages: Vec<_> = check
            .check_project(dir.path())
            .into_iter()
            .map(|v| v.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Missing required file: README.md",
                "Missing required directory: test"
            ]
        );
    }

    #[test]
    fn test_project_structure_defaults_to_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let checks = builtin_checks(&ChecksConfig::default());
        let total: usize = checks.iter().map(|c| c.check_project(dir.path()).len()).sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_check_ids_are_unique() {
        let checks = builtin_checks(&ChecksConfig::default());
        let mut ids: Vec<_> = checks.iter().map(|c| c.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), checks.len());
    }
}
