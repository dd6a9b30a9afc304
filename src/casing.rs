//! Casing styles and exact-match checks

use serde::{Deserialize, Serialize};
use std::fmt;

/// Casing style a name is expected to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Casing {
    /// `user-service`
    #[serde(rename = "kebab-case", alias = "kebab")]
    KebabCase,
    /// `UserService`
    #[serde(rename = "PascalCase", alias = "pascal")]
    PascalCase,
    /// `userService`
    #[serde(rename = "camelCase", alias = "camel")]
    CamelCase,
    /// `MAX_RETRIES`
    #[serde(rename = "UPPER_SNAKE_CASE", alias = "upper-snake")]
    UpperSnakeCase,
}

impl Casing {
    /// Check whether `name` follows this casing exactly
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Casing::KebabCase => segmented(name, '-', |c| c.is_ascii_lowercase()),
            Casing::UpperSnakeCase => segmented(name, '_', |c| c.is_ascii_uppercase()),
            Casing::PascalCase => alnum_starting_with(name, |c| c.is_ascii_uppercase()),
            Casing::CamelCase => alnum_starting_with(name, |c| c.is_ascii_lowercase()),
        }
    }

    /// Rewrite `name` into this casing, if it has any word characters
    pub fn convert(&self, name: &str) -> Option<String> {
        let words = split_words(name);
        if words.is_empty() {
            return None;
        }

        let converted = match self {
            Casing::KebabCase => words
                .iter()
                .map(|w| w.to_ascii_lowercase())
                .collect::<Vec<_>>()
                .join("-"),
            Casing::UpperSnakeCase => words
                .iter()
                .map(|w| w.to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join("_"),
            Casing::PascalCase => words.iter().map(|w| capitalize(w)).collect(),
            Casing::CamelCase => words
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    if i == 0 {
                        w.to_ascii_lowercase()
                    } else {
                        capitalize(w)
                    }
                })
                .collect(),
        };

        // Names that start with a digit can never conform
        if converted.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        Some(converted)
    }

    /// Example name in this casing, used in messages
    pub fn example(&self) -> &'static str {
        match self {
            Casing::KebabCase => "user-service",
            Casing::PascalCase => "UserService",
            Casing::CamelCase => "userService",
            Casing::UpperSnakeCase => "MAX_RETRIES",
        }
    }
}

impl fmt::Display for Casing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Casing::KebabCase => write!(f, "kebab-case"),
            Casing::PascalCase => write!(f, "PascalCase"),
            Casing::CamelCase => write!(f, "camelCase"),
            Casing::UpperSnakeCase => write!(f, "UPPER_SNAKE_CASE"),
        }
    }
}

impl std::str::FromStr for Casing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "kebab-case" | "kebab" => Ok(Casing::KebabCase),
            "pascalcase" | "pascal" => Ok(Casing::PascalCase),
            "camelcase" | "camel" => Ok(Casing::CamelCase),
            "upper-snake-case" | "upper-snake" => Ok(Casing::UpperSnakeCase),
            _ => Err(format!("Unknown casing: {}", s)),
        }
    }
}

/// Segments of `[first-class][first-class or digit]*` joined by single `sep`,
/// first character a letter
fn segmented(name: &str, sep: char, letter: impl Fn(char) -> bool) -> bool {
    if !name.starts_with(|c: char| letter(c)) {
        return false;
    }
    name.split(sep)
        .all(|seg| !seg.is_empty() && seg.chars().all(|c| letter(c) || c.is_ascii_digit()))
}

fn alnum_starting_with(name: &str, first: impl Fn(char) -> bool) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if first(c) => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

fn capitalize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Split a name into words on separators and case boundaries
///
/// `HTTPServerError` -> `HTTP`, `Server`, `Error`; `user_id2` -> `user`, `id2`.
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}
