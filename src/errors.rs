//! Structured build errors.
//!
//! A failing page never aborts the pass: every recoverable failure is
//! recorded as a [`BuildError`] and the pipeline keeps going with a safe
//! default. [`BuildErrors`] collects them in append order, which callers
//! and tests may rely on (it matches content discovery order).

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Taxonomy
// ============================================================================

/// What subsystem produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Template parse or render failure reported by the template engine.
    Template,
    /// Data file read or YAML parse failure.
    Yaml,
    /// Filesystem read/write failure in the build pipeline itself.
    Build,
    /// A named include or layout template that does not exist.
    Include,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Template => "template",
            Self::Yaml => "yaml",
            Self::Build => "build",
            Self::Include => "include",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warning => "warning",
        };
        f.write_str(s)
    }
}

// ============================================================================
// BuildError
// ============================================================================

/// One recoverable failure recorded during a build pass.
#[derive(Debug, Clone, Error)]
#[error("{}:{line}:{column}: {kind} {severity}: {message}", file.display())]
pub struct BuildError {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub kind: ErrorKind,
    pub severity: Severity,
}

impl BuildError {
    /// New error at the default 1:1 location.
    pub fn new(kind: ErrorKind, file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: 1,
            column: 1,
            message: message.into(),
            kind,
            severity: Severity::Error,
        }
    }

    /// Attach a source location.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line.max(1);
        self.column = column.max(1);
        self
    }

    /// Downgrade to warning severity.
    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }
}

// ============================================================================
// BuildErrors
// ============================================================================

/// Append-ordered error accumulator for one build pass.
///
/// Only grows; iteration yields errors in the order they were recorded.
#[derive(Debug, Default)]
pub struct BuildErrors {
    items: Vec<BuildError>,
}

impl BuildErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: BuildError) {
        self.items.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = BuildError>) {
        self.items.extend(errors);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BuildError> {
        self.items.iter()
    }
}

impl IntoIterator for BuildErrors {
    type Item = BuildError;
    type IntoIter = std::vec::IntoIter<BuildError>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a BuildErrors {
    type Item = &'a BuildError;
    type IntoIter = std::slice::Iter<'a, BuildError>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let err =
            BuildError::new(ErrorKind::Include, "pages/index.html", "template not found").at(3, 7);
        let display = err.to_string();
        assert!(display.contains("pages/index.html:3:7"));
        assert!(display.contains("include error"));
        assert!(display.contains("template not found"));
    }

    #[test]
    fn test_build_error_defaults_to_one_one() {
        let err = BuildError::new(ErrorKind::Yaml, "site.yaml", "bad mapping");
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 1);
        assert_eq!(err.severity, Severity::Error);
    }

    #[test]
    fn test_at_clamps_zero_location() {
        // Some engines report 0-based or missing locations
        let err = BuildError::new(ErrorKind::Template, "a.html", "boom").at(0, 0);
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 1);
    }

    #[test]
    fn test_errors_keep_append_order() {
        let mut errors = BuildErrors::new();
        errors.push(BuildError::new(ErrorKind::Yaml, "a.yaml", "first"));
        errors.push(BuildError::new(ErrorKind::Build, "b.html", "second"));
        errors.extend([BuildError::new(ErrorKind::Include, "c.html", "third")]);

        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
    }

    #[test]
    fn test_warning_severity_rendered() {
        let err = BuildError::new(ErrorKind::Build, "templates/bad.html", "cannot read").warning();
        assert_eq!(err.severity, Severity::Warning);
        assert!(err.to_string().contains("build warning"));
    }

    #[test]
    fn test_kind_display_matches_taxonomy() {
        assert_eq!(ErrorKind::Template.to_string(), "template");
        assert_eq!(ErrorKind::Yaml.to_string(), "yaml");
        assert_eq!(ErrorKind::Build.to_string(), "build");
        assert_eq!(ErrorKind::Include.to_string(), "include");
    }
}
