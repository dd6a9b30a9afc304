//! Declaration extraction for TypeScript/JavaScript source
//!
//! Line-oriented: each line is masked (comments and string contents blanked,
//! columns preserved) and matched against declaration patterns. Brace depth is
//! tracked so class members can be told apart from ordinary bindings.

use crate::entity::{Entity, EntityKind, Location};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

const NAME: &str = r"[A-Za-z_$][\w$]*";

static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*(?:export\s+(?:default\s+)?)?(?:declare\s+)?(?:abstract\s+)?class\s+({})",
        NAME
    ))
    .unwrap()
});

static INTERFACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*(?:export\s+(?:default\s+)?)?(?:declare\s+)?interface\s+({})",
        NAME
    ))
    .unwrap()
});

static ENUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*(?:export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+({})",
        NAME
    ))
    .unwrap()
});

static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*(?:export\s+)?(?:declare\s+)?type\s+({})\s*(?:<[^=]*>)?\s*=",
        NAME
    ))
    .unwrap()
});

static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*(?:export\s+(?:default\s+)?)?(?:declare\s+)?(?:async\s+)?function\s*\*?\s*({})\s*[<(]",
        NAME
    ))
    .unwrap()
});

static BINDING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(\s*)(?:export\s+)?(?:declare\s+)?(const|let|var)\s+({})\s*(?::[^=]*)?(?:=\s*(.*))?$",
        NAME
    ))
    .unwrap()
});

static ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:async\s+)?(?:\([^)]*\)|{})\s*(?::[^=]*)?=>",
        NAME
    ))
    .unwrap()
});

static FUNCTION_EXPR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:async\s+)?function\b").unwrap());

static LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:-?\d[\d_]*(?:\.[\d_]+)?(?:[eE][+-]?\d+)?n?|'[^']*'|"[^"]*"|`[^`$]*`|true|false)\s*(?:as\s+const\s*)?;?\s*$"#)
        .unwrap()
});

const MODIFIERS: &str = r"(?:(?:public|protected|private|static|readonly|declare|override|abstract|accessor)\s+)*";

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*({})(#?{})\s*[?!]?\s*(?::|=|;|$)",
        MODIFIERS, NAME
    ))
    .unwrap()
});

static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*{}(?:async\s+)?(?:(?:get|set)\s+)?\*?\s*({})\s*(?:<[^>]*>)?\s*\(",
        MODIFIERS, NAME
    ))
    .unwrap()
});

/// Names that look like members but are language constructs
const MEMBER_KEYWORDS: &[&str] = &[
    "constructor",
    "if",
    "for",
    "while",
    "switch",
    "return",
    "catch",
    "super",
    "this",
];

/// Extract named declarations from `content`
///
/// Entities come out in source order. The file itself is not included.
pub fn extract(path: &Path, content: &str) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut state = MaskState::Code;
    let mut depth: usize = 0;
    let mut class_bodies: Vec<usize> = Vec::new();
    let mut pending_class = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_num = idx + 1;
        let masked = mask_line(raw, &mut state);
        let at_member_level = class_bodies.last() == Some(&depth);

        let mut push = |name_match: Option<regex::Match>, kind: EntityKind, strip_hash: bool| {
            let Some(name_match) = name_match else {
                return;
            };
            let mut name = name_match.as_str();
            let mut start = name_match.start();
            if strip_hash {
                if let Some(rest) = name.strip_prefix('#') {
                    name = rest;
                    start += 1;
                }
            }
            let column = masked[..start].chars().count() + 1;
            let location = Location::new(path.to_path_buf(), line_num, column)
                .with_length(name.chars().count());
            entities.push(Entity::new(name, kind, location).with_source_line(raw));
        };

        if at_member_level {
            if let Some(caps) = METHOD_RE.captures(&masked) {
                let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                if !MEMBER_KEYWORDS.contains(&name) {
                    push(caps.get(1), EntityKind::Function, false);
                }
            } else if let Some(caps) = FIELD_RE.captures(&masked) {
                let modifiers = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let name = caps.get(2);
                if !MEMBER_KEYWORDS.contains(&name.map_or("", |m| m.as_str())) {
                    let kind = if modifiers.split_whitespace().any(|m| m == "private") {
                        EntityKind::PrivateProperty
                    } else {
                        EntityKind::Property
                    };
                    push(name, kind, true);
                }
            }
        } else if let Some(caps) = CLASS_RE.captures(&masked) {
            push(caps.get(1), EntityKind::Class, false);
            pending_class = true;
        } else if let Some(caps) = INTERFACE_RE.captures(&masked) {
            push(caps.get(1), EntityKind::Interface, false);
        } else if let Some(caps) = ENUM_RE.captures(&masked) {
            push(caps.get(1), EntityKind::Enum, false);
        } else if let Some(caps) = TYPE_RE.captures(&masked) {
            push(caps.get(1), EntityKind::TypeAlias, false);
        } else if let Some(caps) = FUNCTION_RE.captures(&masked) {
            push(caps.get(1), EntityKind::Function, false);
        } else if let Some(caps) = BINDING_RE.captures(&masked) {
            let indent = caps.get(1).map_or(0, |m| m.len());
            let keyword = caps.get(2).map_or("", |m| m.as_str());
            let init = caps.get(4).map_or("", |m| m.as_str().trim());
            let kind = classify_binding(keyword, indent == 0, init);
            push(caps.get(3), kind, false);
        }

        for c in masked.chars() {
            match c {
                '{' => {
                    depth += 1;
                    if pending_class {
                        class_bodies.push(depth);
                        pending_class = false;
                    }
                }
                '}' => {
                    if class_bodies.last() == Some(&depth) {
                        class_bodies.pop();
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
        }
    }

    entities
}

/// Decide what a `const`/`let`/`var` binding declares
fn classify_binding(keyword: &str, top_level: bool, init: &str) -> EntityKind {
    if FUNCTION_EXPR_RE.is_match(init) || ARROW_RE.is_match(init) {
        EntityKind::Function
    } else if keyword == "const" && top_level && LITERAL_RE.is_match(init) {
        EntityKind::Constant
    } else {
        EntityKind::Variable
    }
}

/// What an unterminated construct at the end of a line leaves open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaskState {
    #[default]
    Code,
    /// Inside `/* ... */`
    BlockComment,
    /// Inside a `` `...` `` template literal
    Template,
}

/// Blank out comments and string contents, keeping quotes and column positions
///
/// `state` carries block comments and template literals across lines; `'` and
/// `"` strings end at the end of the line.
pub fn mask_line(line: &str, state: &mut MaskState) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut in_string: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match *state {
            MaskState::BlockComment => {
                if c == '*' && next == Some('/') {
                    out.push_str("  ");
                    *state = MaskState::Code;
                    i += 2;
                } else {
                    out.push(' ');
                    i += 1;
                }
                continue;
            }
            MaskState::Template => {
                if c == '\\' && next.is_some() {
                    out.push_str("  ");
                    i += 2;
                    continue;
                }
                if c == '`' {
                    out.push(c);
                    *state = MaskState::Code;
                } else {
                    out.push(' ');
                }
                i += 1;
                continue;
            }
            MaskState::Code => {}
        }

        if let Some(quote) = in_string {
            if c == '\\' && next.is_some() {
                out.push_str("  ");
                i += 2;
                continue;
            }
            if c == quote {
                out.push(c);
                in_string = None;
            } else {
                out.push(' ');
            }
            i += 1;
            continue;
        }

        match (c, next) {
            ('/', Some('/')) => {
                out.extend(std::iter::repeat(' ').take(chars.len() - i));
                break;
            }
            ('/', Some('*')) => {
                out.push_str("  ");
                *state = MaskState::BlockComment;
                i += 2;
                continue;
            }
            ('`', _) => {
                *state = MaskState::Template;
                out.push(c);
            }
            ('\'' | '"', _) => {
                in_string = Some(c);
                out.push(c);
            }
            _ => out.push(c),
        }
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(content: &str) -> Vec<(String, EntityKind)> {
        extract(Path::new("a.ts"), content)
            .into_iter()
            .map(|e| (e.name, e.kind))
            .collect()
    }

    fn one(name: &str, kind: EntityKind) -> Vec<(String, EntityKind)> {
        vec![(name.to_string(), kind)]
    }

    #[test]
    fn test_type_declarations() {
        let src = "export class UserService {}\n\
                   export default abstract class Base {}\n\
                   interface IUser {}\n\
                   export const enum Role { Admin }\n\
                   type UserId = string;\n\
                   export type Pair<T> = [T, T];\n";
        assert_eq!(
            kinds(src),
            vec![
                ("UserService".to_string(), EntityKind::Class),
                ("Base".to_string(), EntityKind::Class),
                ("IUser".to_string(), EntityKind::Interface),
                ("Role".to_string(), EntityKind::Enum),
                ("UserId".to_string(), EntityKind::TypeAlias),
                ("Pair".to_string(), EntityKind::TypeAlias),
            ]
        );
    }

    #[test]
    fn test_functions() {
        assert_eq!(kinds("function getUser() {}"), one("getUser", EntityKind::Function));
        assert_eq!(
            kinds("export async function LoadAll<T>(x: T) {}"),
            one("LoadAll", EntityKind::Function)
        );
        assert_eq!(
            kinds("const fetchUser = async (id: string) => {"),
            one("fetchUser", EntityKind::Function)
        );
        assert_eq!(
            kinds("const handler = function () {};"),
            one("handler", EntityKind::Function)
        );
        assert_eq!(kinds("let double = x => x * 2;"), one("double", EntityKind::Function));
    }

    #[test]
    fn test_constants_and_variables() {
        assert_eq!(kinds("const MAX_RETRIES = 3;"), one("MAX_RETRIES", EntityKind::Constant));
        assert_eq!(
            kinds("export const API_URL = 'https://x';"),
            one("API_URL", EntityKind::Constant)
        );
        assert_eq!(kinds("const config = loadConfig();"), one("config", EntityKind::Variable));
        assert_eq!(kinds("let userName: string;"), one("userName", EntityKind::Variable));
        assert_eq!(
            kinds("function f() {\n  const limit = 10;\n}"),
            vec![
                ("f".to_string(), EntityKind::Function),
                ("limit".to_string(), EntityKind::Variable),
            ]
        );
    }

    #[test]
    fn test_class_members() {
        let src = "class UserService {\n\
                   \x20 private _password: string;\n\
                   \x20 private readonly cache = new Map();\n\
                   \x20 public userName: string;\n\
                   \x20 #secret = 1;\n\
                   \x20 constructor(private repo: Repo) {\n\
                   \x20   const local = 1;\n\
                   \x20 }\n\
                   \x20 async getUser(id: string) {\n\
                   \x20   if (id) { return null; }\n\
                   \x20 }\n\
                   }\n\
                   const after = compute();\n";
        assert_eq!(
            kinds(src),
            vec![
                ("UserService".to_string(), EntityKind::Class),
                ("_password".to_string(), EntityKind::PrivateProperty),
                ("cache".to_string(), EntityKind::PrivateProperty),
                ("userName".to_string(), EntityKind::Property),
                ("secret".to_string(), EntityKind::Property),
                ("local".to_string(), EntityKind::Variable),
                ("getUser".to_string(), EntityKind::Function),
                ("after".to_string(), EntityKind::Variable),
            ]
        );
    }

    #[test]
    fn test_comments_and_strings_ignored() {
        let src = "// class Commented {}\n\
                   /* interface Hidden {}\n\
                   function alsoHidden() {} */\n\
                   const msg = 'class NotReal {}';\n";
        assert_eq!(kinds(src), one("msg", EntityKind::Constant));
    }

    #[test]
    fn test_locations() {
        let entities = extract(Path::new("a.ts"), "\nexport class UserService {}\n");
        assert_eq!(entities.len(), 1);
        let loc = &entities[0].location;
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 14);
        assert_eq!(loc.length, "UserService".len());
        assert_eq!(
            entities[0].source_line.as_deref(),
            Some("export class UserService {}")
        );
    }

    #[test]
    fn test_mask_line() {
        let mut state = MaskState::Code;
        assert_eq!(mask_line("a // b", &mut state), "a     ");
        assert_eq!(mask_line("x = 'a\\'b';", &mut state), "x = '    ';");
        assert_eq!(mask_line("a /* b", &mut state), "a     ");
        assert_eq!(state, MaskState::BlockComment);
        assert_eq!(mask_line("c */ d", &mut state), "     d");
        assert_eq!(state, MaskState::Code);
    }

    #[test]
    fn test_mask_line_template_spans_lines() {
        let mut state = MaskState::Code;
        assert_eq!(mask_line("const q = `select", &mut state), "const q = `      ");
        assert_eq!(state, MaskState::Template);
        assert_eq!(mask_line("a { b", &mut state), "     ");
        assert_eq!(mask_line("x`;", &mut state), " `;");
        assert_eq!(state, MaskState::Code);
    }

    #[test]
    fn test_multiline_template_contents_ignored() {
        let src = "const doc = `\n\
                   class fake_thing {\n\
                   \x20 private secret: string;\n\
                   }\n\
                   `;\n\
                   class RealThing {\n\
                   \x20 private _id: string;\n\
                   }\n";
        assert_eq!(
            kinds(src),
            vec![
                ("doc".to_string(), EntityKind::Variable),
                ("RealThing".to_string(), EntityKind::Class),
                ("_id".to_string(), EntityKind::PrivateProperty),
            ]
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let entities = extract(Path::new("a.ts"), "const grüße = compute();\n");
        assert_eq!(entities[0].location.length, 5);
    }
}
