//! Source files and inline suppression comments

use crate::entity::Entity;
use crate::extract::extract;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

// Supported forms, in `//` or `/* */` comments:
//   convcheck-disable-line rule-id
//   convcheck-disable-next-line rule-a, rule-b -- reason
//   convcheck-disable-file all
static DISABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"convcheck-disable-(line|next-line|file)\s+([\w-]+(?:\s*,\s*[\w-]+)*)(?:\s*(?::|--)\s*(.*?))?\s*(?:\*/)?\s*$",
    )
    .unwrap()
});

/// Information about a disable comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisableInfo {
    /// Line the suppression applies to (0 = whole file)
    pub line: usize,
    pub rule_id: String,
    pub reason: Option<String>,
}

/// A readable, UTF-8 source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    content: String,
    disabled_lines: HashMap<String, HashSet<usize>>,
    disabled_file_rules: HashSet<String>,
    disables: Vec<DisableInfo>,
}

impl SourceFile {
    /// Wrap already-loaded content
    pub fn new(path: &Path, content: String) -> Self {
        let mut disabled_lines: HashMap<String, HashSet<usize>> = HashMap::new();
        let mut disabled_file_rules = HashSet::new();
        let mut disables = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let line_num = idx + 1;
            let Some(cap) = DISABLE_RE.captures(line) else {
                continue;
            };
            let target = match &cap[1] {
                "line" => line_num,
                "next-line" => line_num + 1,
                _ => 0,
            };
            let reason = cap
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .filter(|r| !r.is_empty());

            for rule_id in cap[2].split(',').map(str::trim) {
                if target == 0 {
                    disabled_file_rules.insert(rule_id.to_string());
                } else {
                    disabled_lines
                        .entry(rule_id.to_string())
                        .or_default()
                        .insert(target);
                }
                disables.push(DisableInfo {
                    line: target,
                    rule_id: rule_id.to_string(),
                    reason: reason.clone(),
                });
            }
        }

        Self {
            path: path.to_path_buf(),
            content,
            disabled_lines,
            disabled_file_rules,
            disables,
        }
    }

    /// Read a file, failing on I/O errors and non-UTF-8 content
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8(bytes).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("not valid UTF-8 (byte {})", e.utf8_error().valid_up_to()),
            )
        })?;
        Ok(Self::new(path, content))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines of the file without terminators
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.content.lines()
    }

    /// Get source line at line number (1-based)
    pub fn line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.content.lines().nth(idx))
    }

    /// The file entity followed by its declarations, in source order
    pub fn entities(&self) -> Vec<Entity> {
        let mut entities = vec![Entity::file(&self.path)];
        entities.extend(extract(&self.path, &self.content));
        entities
    }

    /// Check if a rule is disabled at a specific line
    pub fn is_rule_disabled(&self, rule_id: &str, line: usize) -> bool {
        ["all", rule_id].iter().any(|id| {
            self.disabled_lines
                .get(*id)
                .is_some_and(|lines| lines.contains(&line))
        })
    }

    /// Check if a rule is disabled for the entire file
    pub fn is_rule_disabled_for_file(&self, rule_id: &str) -> bool {
        self.disabled_file_rules.contains("all") || self.disabled_file_rules.contains(rule_id)
    }

    /// Check if a verdict for `rule_id` at `line` (0 = whole file) is suppressed
    pub fn is_suppressed(&self, rule_id: &str, line: usize) -> bool {
        self.is_rule_disabled_for_file(rule_id) || (line > 0 && self.is_rule_disabled(rule_id, line))
    }

    /// All disable comments found in the file
    pub fn disables(&self) -> &[DisableInfo] {
        &self.disables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(content: &str) -> SourceFile {
        SourceFile::new(Path::new("src/a.ts"), content.to_string())
    }

    #[test]
    fn test_disable_next_line() {
        let file = source("// convcheck-disable-next-line class-naming\nclass foo {}\nclass bar {}\n");
        assert!(file.is_suppressed("class-naming", 2));
        assert!(!file.is_suppressed("class-naming", 3));
        assert!(!file.is_suppressed("function-naming", 2));
    }

    #[test]
    fn test_disable_same_line() {
        let file = source("let Foo = 1; // convcheck-disable-line variable-naming\n");
        assert!(file.is_suppressed("variable-naming", 1));
        assert!(!file.is_suppressed("variable-naming", 2));
    }

    #[test]
    fn test_disable_file_all() {
        let file = source("/* convcheck-disable-file all */\nclass foo {}\n");
        assert!(file.is_suppressed("class-naming", 2));
        assert!(file.is_suppressed("file-naming", 0));
    }

    #[test]
    fn test_line_suppression_does_not_cover_file_entity() {
        let file = source("// convcheck-disable-next-line all\n");
        assert!(!file.is_suppressed("file-naming", 0));
    }

    #[test]
    fn test_multiple_ids_and_reason() {
        let file = source(
            "// convcheck-disable-next-line line-length, todo-assignee -- generated table\nx\n",
        );
        assert!(file.is_suppressed("line-length", 2));
        assert!(file.is_suppressed("todo-assignee", 2));

        let disables = file.disables();
        assert_eq!(disables.len(), 2);
        assert_eq!(disables[0].line, 2);
        assert_eq!(disables[1].reason.as_deref(), Some("generated table"));
    }

    #[test]
    fn test_reason_with_colon() {
        let file = source("// convcheck-disable-file file-naming: matches the upstream name\n");
        assert_eq!(file.disables()[0].line, 0);
        assert_eq!(
            file.disables()[0].reason.as_deref(),
            Some("matches the upstream name")
        );
    }

    #[test]
    fn test_entities_start_with_file() {
        let file = source("export class UserService {}\n");
        let entities = file.entities();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].name, "a");
        assert_eq!(entities[1].name, "UserService");
    }

    #[test]
    fn test_line_lookup() {
        let file = source("one\ntwo\n");
        assert_eq!(file.line(2), Some("two"));
        assert_eq!(file.line(0), None);
        assert_eq!(file.line(3), None);
    }

    #[test]
    fn test_read_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ts");
        std::fs::write(&path, [0x63, 0x6f, 0xff, 0xfe]).unwrap();
        let err = SourceFile::read(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
