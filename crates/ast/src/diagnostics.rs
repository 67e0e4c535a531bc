//! # Diagnostic Reporting
//!
//! Collects problems surfaced by every translation phase:
//! - Per-file parse failures (fatal for the file, siblings continue)
//! - Type-resolution warnings (contained to one expression)
//! - Pipeline-level errors such as an exceeded fixpoint budget

use crate::source::SourceRef;
use std::fmt;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Note,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Note => write!(f, "note"),
        }
    }
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    /// Where the problem originates, when known.
    pub origin: Option<SourceRef>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            origin: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Note, message)
    }

    pub fn at(mut self, origin: SourceRef) -> Self {
        self.origin = Some(origin);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{}: {}: {}", origin, self.level, self.message),
            None => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

/// Accumulates diagnostics across phases and files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn error(&mut self, message: impl Into<String>, origin: Option<SourceRef>) {
        let mut d = Diagnostic::error(message);
        d.origin = origin;
        self.push(d);
    }

    pub fn warning(&mut self, message: impl Into<String>, origin: Option<SourceRef>) {
        let mut d = Diagnostic::warning(message);
        d.origin = origin;
        self.push(d);
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Location, SourceRef};

    #[test]
    fn collects_by_severity() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_errors());

        diags.warning("unresolved member `frame`", None);
        assert!(!diags.has_errors());

        diags.error(
            "unexpected token `@end`",
            Some(SourceRef::new("Thing.m", Location::new(4, 1, 30))),
        );
        assert!(diags.has_errors());
        assert_eq!(diags.errors().count(), 1);
        assert_eq!(diags.warnings().count(), 1);
    }

    #[test]
    fn display_includes_origin() {
        let d = Diagnostic::error("bad type")
            .at(SourceRef::new("A.h", Location::new(2, 7, 15)));
        assert_eq!(d.to_string(), "A.h:2:7: error: bad type");
    }
}
