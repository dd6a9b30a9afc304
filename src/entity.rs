//! Entities extracted from a source tree

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of entity a rule can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// A source file (checked by its stem)
    File,
    /// `class Foo`
    Class,
    /// `interface Foo`
    Interface,
    /// `function foo()` or a function-valued binding
    Function,
    /// `let`/`var`/non-literal `const` binding
    Variable,
    /// Top-level `const` bound to a literal
    Constant,
    /// `enum Foo`
    Enum,
    /// `type Foo = ...`
    TypeAlias,
    /// Public/protected class field
    Property,
    /// `private` class field
    PrivateProperty,
    /// A physical source line
    Line,
    /// An import statement
    Import,
    /// A comment
    Comment,
    /// The scanned project root
    Project,
}

impl EntityKind {
    /// Kinds that carry a name and can be targeted by naming rules
    pub const NAMED: [EntityKind; 10] = [
        EntityKind::File,
        EntityKind::Class,
        EntityKind::Interface,
        EntityKind::Function,
        EntityKind::Variable,
        EntityKind::Constant,
        EntityKind::Enum,
        EntityKind::TypeAlias,
        EntityKind::Property,
        EntityKind::PrivateProperty,
    ];

    /// Check if naming rules can target this kind
    pub fn is_named(&self) -> bool {
        Self::NAMED.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::File => "file",
            EntityKind::Class => "class",
            EntityKind::Interface => "interface",
            EntityKind::Function => "function",
            EntityKind::Variable => "variable",
            EntityKind::Constant => "constant",
            EntityKind::Enum => "enum",
            EntityKind::TypeAlias => "type-alias",
            EntityKind::Property => "property",
            EntityKind::PrivateProperty => "private-property",
            EntityKind::Line => "line",
            EntityKind::Import => "import",
            EntityKind::Comment => "comment",
            EntityKind::Project => "project",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(EntityKind::File),
            "class" => Ok(EntityKind::Class),
            "interface" => Ok(EntityKind::Interface),
            "function" => Ok(EntityKind::Function),
            "variable" => Ok(EntityKind::Variable),
            "constant" => Ok(EntityKind::Constant),
            "enum" => Ok(EntityKind::Enum),
            "type-alias" | "type" => Ok(EntityKind::TypeAlias),
            "property" => Ok(EntityKind::Property),
            "private-property" => Ok(EntityKind::PrivateProperty),
            "line" => Ok(EntityKind::Line),
            "import" => Ok(EntityKind::Import),
            "comment" => Ok(EntityKind::Comment),
            "project" => Ok(EntityKind::Project),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}

/// Source code location
///
/// Ordering is file, then line, then column, which is the order reports use.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-based, 0 for whole-file entities)
    pub line: usize,
    /// Column number (1-based, 0 for whole-file entities)
    pub column: usize,
    /// Length of the highlighted region
    pub length: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            length: 0,
        }
    }

    /// Location covering a whole file
    pub fn file(file: &Path) -> Self {
        Self::new(file.to_path_buf(), 0, 0)
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file.display())
        } else {
            write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
        }
    }
}

/// A named thing found during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Name checked by rules (file stem for files)
    pub name: String,
    /// What kind of declaration this is
    pub kind: EntityKind,
    /// Where it was found
    pub location: Location,
    /// Source line, when the entity sits on one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl Entity {
    pub fn new(name: &str, kind: EntityKind, location: Location) -> Self {
        Self {
            name: name.to_string(),
            kind,
            location,
            source_line: None,
        }
    }

    /// File entity for `path`, named after the part of the file name before the first `.`
    pub fn file(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_stem(&file_name).to_string();
        let length = file_name.chars().count();
        Self::new(&stem, EntityKind::File, Location::file(path).with_length(length))
    }

    pub fn with_source_line(mut self, line: &str) -> Self {
        self.source_line = Some(line.to_string());
        self
    }
}

/// Part of a file name before the first `.` (`user.service.spec.ts` -> `user`)
///
/// A leading dot is kept as part of the stem so dotfiles are not reduced to "".
pub fn file_stem(file_name: &str) -> &str {
    let search_from = usize::from(file_name.starts_with('.'));
    match file_name[search_from..].find('.') {
        Some(idx) => &file_name[..idx + search_from],
        None => file_name,
    }
}
