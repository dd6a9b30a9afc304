//! Source tree scanning
//!
//! The scanner walks a root path and yields the files and entities found
//! under it. Nothing is cached: every call to [`Scanner::files`] or
//! [`Scanner::entities`] starts a fresh walk, so a scanner can be reused on a
//! tree that changes between runs.

use crate::config::{Config, ConfigError};
use crate::entity::Entity;
use crate::source::SourceFile;
use globset::GlobSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// A recoverable failure for one path; the scan continues past it
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}: {message}", path.display())]
pub struct ScanError {
    pub path: PathBuf,
    pub message: String,
}

impl ScanError {
    pub fn new(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

impl From<walkdir::Error> for ScanError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        let message = match err.io_error() {
            Some(io) => io.to_string(),
            None => err.to_string(),
        };
        Self { path, message }
    }
}

/// Walks a root path for source files
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    extensions: Vec<String>,
    exclude: GlobSet,
}

impl Scanner {
    /// Scanner using the file settings of `config`
    pub fn new(root: &Path, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            root: root.to_path_buf(),
            extensions: config.files.extensions.clone(),
            exclude: config.exclude_set()?,
        })
    }

    /// Scanner with the default extensions and exclusions
    pub fn with_defaults(root: &Path) -> Result<Self, ConfigError> {
        Self::new(root, &Config::default())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if a path (relative to the root) is excluded
    pub fn is_excluded(&self, relative: &Path) -> bool {
        !relative.as_os_str().is_empty() && self.exclude.is_match(relative)
    }

    fn has_scanned_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Paths of the files to scan, in sorted order
    ///
    /// A root that is itself a file is yielded as is, whatever its extension.
    pub fn paths(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
                !self.is_excluded(relative)
            })
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        return None;
                    }
                    if entry.depth() == 0 || self.has_scanned_extension(entry.path()) {
                        Some(Ok(entry.into_path()))
                    } else {
                        None
                    }
                }
                Err(err) => Some(Err(ScanError::from(err))),
            })
    }

    /// Readable source files; unreadable ones come through as errors
    pub fn files(&self) -> impl Iterator<Item = Result<SourceFile, ScanError>> + '_ {
        self.paths()
            .map(|path| {
                let path = path?;
                SourceFile::read(&path).map_err(|e| ScanError::new(&path, e.to_string()))
            })
            .inspect(|result| {
                if let Err(err) = result {
                    log::warn!("Skipping {}", err);
                }
            })
    }

    /// Entities of every file: the file itself, then its declarations
    pub fn entities(&self) -> impl Iterator<Item = Result<Entity, ScanError>> + '_ {
        self.files().flat_map(|file| match file {
            Ok(file) => file.entities().into_iter().map(Ok).collect::<Vec<_>>(),
            Err(err) => vec![Err(err)],
        })
    }
}
