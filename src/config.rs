//! Configuration system for the checker
//!
//! Reads configuration from:
//! - `.convcheckrc.yaml` / `.convcheckrc.json` (project-level)
//! - `~/.convcheckrc.yaml` (user-level)
//! - built-in presets (`recommended`, `strict`, `minimal`)

use crate::rule::{Rule, RuleCategory};
use crate::verdict::Severity;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Color mode
    pub color: ColorMode,

    /// Verbose output
    pub verbose: bool,

    /// Include passed verdicts in the output
    pub show_passed: bool,

    /// Show statistics
    pub statistics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: ColorMode::Auto,
            verbose: false,
            show_passed: false,
            statistics: true,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// File handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Extensions (without dot) of files to scan
    pub extensions: Vec<String>,

    /// Exclude patterns, matched against paths relative to the scan root
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["ts".to_string(), "tsx".to_string()],
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/dist/**".to_string(),
                "**/coverage/**".to_string(),
                "**/.git/**".to_string(),
            ],
        }
    }
}

/// Rule configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Disabled rules
    pub disabled: Vec<String>,

    /// Enabled rules (empty = all)
    pub enabled: Vec<String>,

    /// Severity overrides (rule_id -> severity)
    pub severity: HashMap<String, Severity>,

    /// Per-file rule ignores (glob pattern -> rule IDs, "all" for every rule)
    pub per_file: HashMap<String, Vec<String>>,

    /// Extra naming rules; a rule with a built-in id replaces the built-in
    pub custom: Vec<Rule>,

    /// Rule file to load instead of the built-in rules
    pub file: Option<PathBuf>,
}

/// Settings for the source checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Longest allowed line, trailing whitespace excluded
    pub max_line_length: usize,

    /// Files that must exist under the scan root
    pub required_files: Vec<String>,

    /// Directories that must exist under the scan root
    pub required_dirs: Vec<String>,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            max_line_length: 100,
            required_files: Vec::new(),
            required_dirs: Vec::new(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extend from other configuration files or presets
    pub extends: Vec<String>,

    /// Output settings
    pub output: OutputConfig,

    /// File handling settings
    pub files: FilesConfig,

    /// Rule configuration
    pub rules: RulesConfig,

    /// Source check settings
    pub checks: ChecksConfig,

    /// Rule categories to enable (empty = all)
    pub categories: Vec<String>,
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a preset configuration by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::preset_recommended()),
            "strict" => Some(Self::preset_strict()),
            "minimal" => Some(Self::preset_minimal()),
            _ => None,
        }
    }

    /// Recommended preset - naming, style, imports and docs
    fn preset_recommended() -> Self {
        Self {
            categories: vec![
                "naming".to_string(),
                "style".to_string(),
                "imports".to_string(),
                "documentation".to_string(),
            ],
            ..Self::default()
        }
    }

    /// Strict preset - everything, naming as errors, standard project layout required
    fn preset_strict() -> Self {
        let mut config = Self {
            categories: Vec::new(),
            ..Self::default()
        };
        config.checks.required_files = vec![
            "package.json".to_string(),
            "tsconfig.json".to_string(),
            "README.md".to_string(),
        ];
        config.checks.required_dirs =
            vec!["src".to_string(), "test".to_string(), "dist".to_string()];
        for rule in crate::registry::builtin_rules() {
            config.rules.severity.insert(rule.id, Severity::Error);
        }
        config
    }

    /// Minimal preset - naming rules only
    fn preset_minimal() -> Self {
        Self {
            categories: vec!["naming".to_string()],
            ..Self::default()
        }
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_depth(path, 0)
    }

    /// Load with recursion depth limit (to prevent infinite loops)
    fn load_with_depth(path: &Path, depth: usize) -> Result<Self, ConfigError> {
        const MAX_DEPTH: usize = 10;
        if depth >= MAX_DEPTH {
            return Err(ConfigError::Invalid(
                "Maximum config inheritance depth exceeded".to_string(),
            ));
        }

        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let mut config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        let base_dir = path.parent().unwrap_or(Path::new("."));

        // Relative rule files resolve against the config file
        if let Some(file) = &config.rules.file {
            if file.is_relative() {
                config.rules.file = Some(base_dir.join(file));
            }
        }

        if !config.extends.is_empty() {
            let mut base_config = Self::default();

            for extend in &config.extends.clone() {
                let extended = if let Some(preset) = Self::preset(extend) {
                    preset
                } else {
                    let extend_path = if Path::new(extend).is_absolute() {
                        PathBuf::from(extend)
                    } else {
                        base_dir.join(extend)
                    };
                    Self::load_with_depth(&extend_path, depth + 1)?
                };
                base_config.merge(extended);
            }

            base_config.merge(config);
            config = base_config;
        }

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        // Output settings
        if other.output.format != OutputFormat::Text {
            self.output.format = other.output.format;
        }
        if other.output.verbose {
            self.output.verbose = true;
        }
        if other.output.show_passed {
            self.output.show_passed = true;
        }
        if other.output.color != ColorMode::Auto {
            self.output.color = other.output.color;
        }
        self.output.statistics = other.output.statistics;

        // Files - other's extension list wins if it differs from the default
        if other.files.extensions != FilesConfig::default().extensions {
            self.files.extensions = other.files.extensions;
        }
        for pattern in other.files.exclude {
            if !self.files.exclude.contains(&pattern) {
                self.files.exclude.push(pattern);
            }
        }

        // Rules
        self.rules.disabled.extend(other.rules.disabled);
        if !other.rules.enabled.is_empty() {
            self.rules.enabled = other.rules.enabled;
        }
        self.rules.severity.extend(other.rules.severity);
        for (pattern, rules) in other.rules.per_file {
            self.rules.per_file.entry(pattern).or_default().extend(rules);
        }
        // A custom rule redefined by id replaces the inherited one in place
        for rule in other.rules.custom {
            match self.rules.custom.iter_mut().find(|r| r.id == rule.id) {
                Some(existing) => *existing = rule,
                None => self.rules.custom.push(rule),
            }
        }
        if other.rules.file.is_some() {
            self.rules.file = other.rules.file;
        }

        // Checks
        if other.checks.max_line_length != ChecksConfig::default().max_line_length {
            self.checks.max_line_length = other.checks.max_line_length;
        }
        self.checks.required_files.extend(other.checks.required_files);
        self.checks.required_dirs.extend(other.checks.required_dirs);

        if !other.categories.is_empty() {
            self.categories = other.categories;
        }
    }

    /// Configuration file names searched by `load_default`
    pub const FILE_NAMES: [&'static str; 3] =
        [".convcheckrc.yaml", ".convcheckrc.yml", ".convcheckrc.json"];

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        for name in &Self::FILE_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            for name in &Self::FILE_NAMES {
                let path = home.join(name);
                if path.exists() {
                    return Self::load(&path);
                }
            }
        }

        Ok(Self::default())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        verbose: Option<bool>,
        disabled_rules: Option<Vec<String>>,
        enabled_rules: Option<Vec<String>>,
        exclude: Option<Vec<String>>,
    ) {
        if let Some(f) = format {
            self.output.format = f;
        }
        if let Some(v) = verbose {
            self.output.verbose = v;
        }
        if let Some(disabled) = disabled_rules {
            self.rules.disabled.extend(disabled);
        }
        if let Some(enabled) = enabled_rules {
            self.rules.enabled = enabled;
        }
        if let Some(patterns) = exclude {
            self.files.exclude.extend(patterns);
        }
    }

    /// Check if a rule is enabled
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if self.rules.disabled.iter().any(|r| r == rule_id) {
            return false;
        }

        if !self.rules.enabled.is_empty() {
            return self.rules.enabled.iter().any(|r| r == rule_id);
        }

        true
    }

    /// Check if a rule category is enabled
    pub fn is_category_enabled(&self, category: RuleCategory) -> bool {
        if self.categories.is_empty() {
            return true;
        }
        self.categories
            .iter()
            .filter_map(|c| c.parse::<RuleCategory>().ok())
            .any(|c| c == category)
    }

    /// Get severity override for a rule
    pub fn get_severity_override(&self, rule_id: &str) -> Option<Severity> {
        self.rules.severity.get(rule_id).copied()
    }

    /// Reject settings that cannot be applied
    pub fn validate(&self) -> Result<(), ConfigError> {
        for category in &self.categories {
            category
                .parse::<RuleCategory>()
                .map_err(ConfigError::Invalid)?;
        }
        if self.checks.max_line_length == 0 {
            return Err(ConfigError::Invalid(
                "checks.max_line_length must be greater than 0".to_string(),
            ));
        }
        self.exclude_set()?;
        self.per_file_matchers()?;
        Ok(())
    }

    /// Compile the exclude patterns
    pub fn exclude_set(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.files.exclude {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }

    /// Compile the per-file ignore patterns
    pub fn per_file_matchers(&self) -> Result<Vec<(globset::GlobMatcher, Vec<String>)>, ConfigError> {
        let mut matchers = Vec::with_capacity(self.rules.per_file.len());
        for (pattern, rules) in &self.rules.per_file {
            matchers.push((Glob::new(pattern)?.compile_matcher(), rules.clone()));
        }
        Ok(matchers)
    }
}
