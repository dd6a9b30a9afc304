//! Rule evaluation
//!
//! Maps an entity and the rules that apply to it onto verdicts. Evaluation is
//! pure: it never touches the file system or configuration, so the same
//! inputs always give the same verdicts.

use crate::entity::{Entity, EntityKind};
use crate::rule::Rule;
use crate::verdict::Verdict;

/// Evaluate `entity` against each rule, one verdict per rule
///
/// Rules that target a different kind are skipped.
pub fn evaluate<'r>(entity: &Entity, rules: impl IntoIterator<Item = &'r Rule>) -> Vec<Verdict> {
    rules
        .into_iter()
        .filter(|rule| rule.kind == entity.kind)
        .map(|rule| evaluate_rule(entity, rule))
        .collect()
}

/// Evaluate a single rule against an entity
pub fn evaluate_rule(entity: &Entity, rule: &Rule) -> Verdict {
    let label = display_name(entity);

    match check_name(&entity.name, rule).and_then(|()| check_file_name_rest(entity)) {
        Ok(()) => Verdict::pass(
            entity,
            &rule.id,
            rule.severity,
            &format!("{} '{}' is {}", describe(entity.kind), label, rule.expectation()),
        ),
        Err(problem) => {
            let mut verdict = Verdict::fail(
                entity,
                &rule.id,
                rule.severity,
                &format!(
                    "{} '{}' should be {}{}",
                    describe(entity.kind),
                    label,
                    rule.expectation(),
                    problem
                ),
            );
            if let Some(desc) = &rule.description {
                verdict = verdict.with_help(desc);
            }
            if let Some(suggestion) = suggest(entity, rule) {
                verdict = verdict.with_suggestion(&suggestion);
            }
            verdict
        }
    }
}

/// Check a name against a rule's affixes and casing
///
/// On failure returns a short clause explaining which part failed.
fn check_name(name: &str, rule: &Rule) -> Result<(), &'static str> {
    let mut core = name;

    if let Some(prefix) = &rule.prefix {
        core = core.strip_prefix(prefix.as_str()).ok_or(" (missing prefix)")?;
    }
    if let Some(suffix) = &rule.suffix {
        core = core.strip_suffix(suffix.as_str()).ok_or(" (missing suffix)")?;
    }
    if core.is_empty() {
        return Err(" (nothing besides the affixes)");
    }
    if rule.casing.matches(core) {
        Ok(())
    } else {
        Err("")
    }
}

/// Segments after a file name's stem (`.test.ts`, the extension) must be lowercase
fn check_file_name_rest(entity: &Entity) -> Result<(), &'static str> {
    if entity.kind == EntityKind::File && file_name_rest(entity).chars().any(char::is_uppercase) {
        Err(" (uppercase after the first '.')")
    } else {
        Ok(())
    }
}

/// Conforming name derived from the entity's name, if one exists
fn suggest(entity: &Entity, rule: &Rule) -> Option<String> {
    let mut core = entity.name.as_str();
    if let Some(prefix) = &rule.prefix {
        core = core.strip_prefix(prefix.as_str()).unwrap_or(core);
    }
    if let Some(suffix) = &rule.suffix {
        core = core.strip_suffix(suffix.as_str()).unwrap_or(core);
    }

    let converted = rule.casing.convert(core)?;
    let mut name = format!(
        "{}{}{}",
        rule.prefix.as_deref().unwrap_or(""),
        converted,
        rule.suffix.as_deref().unwrap_or("")
    );

    if entity.kind == EntityKind::File {
        name.push_str(&file_name_rest(entity).to_lowercase());
    }

    if name == display_name(entity) {
        None
    } else {
        Some(name)
    }
}

/// Name shown in messages: the full file name for files, the name otherwise
fn display_name(entity: &Entity) -> String {
    if entity.kind == EntityKind::File {
        if let Some(file_name) = entity.location.file.file_name() {
            return file_name.to_string_lossy().into_owned();
        }
    }
    entity.name.clone()
}

/// Extension part of a file entity's file name (`.test.ts` for `foo.test.ts`)
fn file_name_rest(entity: &Entity) -> &str {
    entity
        .location
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.get(entity.name.len()..))
        .unwrap_or("")
}

fn describe(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::File => "File name",
        EntityKind::Class => "Class",
        EntityKind::Interface => "Interface",
        EntityKind::Function => "Function",
        EntityKind::Variable => "Variable",
        EntityKind::Constant => "Constant",
        EntityKind::Enum => "Enum",
        EntityKind::TypeAlias => "Type alias",
        EntityKind::Property => "Property",
        EntityKind::PrivateProperty => "Private property",
        EntityKind::Line => "Line",
        EntityKind::Import => "Import",
        EntityKind::Comment => "Comment",
        EntityKind::Project => "Project",
    }
}
