//! Soft-error channel.
//!
//! Every recoverable scheduling problem (a start pushed by a vacation, an
//! overcharged resource, a malformed task) is emitted through the `log`
//! facade at its severity and kept here so callers can report it later.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    MalformedConstraints,
    StartShifted,
    EndSlipped,
    DependencyViolation,
    ResourceOvercharge,
    VacationConflict,
    EmptyProject,
    NoResources,
    UnsupportedScale,
    InvalidWindow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Task, resource or project name the entry is about.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{level} - {}", self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, kind: DiagnosticKind, subject: impl Into<String>, message: String) {
        log::warn!("{message}");
        self.push(Severity::Warning, kind, subject.into(), message);
    }

    pub fn error(&mut self, kind: DiagnosticKind, subject: impl Into<String>, message: String) {
        log::error!("{message}");
        self.push(Severity::Error, kind, subject.into(), message);
    }

    pub fn critical(&mut self, kind: DiagnosticKind, subject: impl Into<String>, message: String) {
        log::error!("CRITICAL {message}");
        self.push(Severity::Critical, kind, subject.into(), message);
    }

    fn push(&mut self, severity: Severity, kind: DiagnosticKind, subject: String, message: String) {
        self.entries.push(Diagnostic {
            severity,
            kind,
            subject,
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
