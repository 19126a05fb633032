// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Diagnostics for stacklint.
//!
//! Lexer errors, parser errors and analyzer findings all convert into one
//! [`Diagnostic`] type through [`ToDiagnostic`], which the terminal
//! formatter and the JSON report both consume.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;
pub mod suggestions;

use serde::Serialize;
use stacklint_ast::Span;

pub use codes::{ErrorCategory, ErrorCodeInfo, ErrorCodeRegistry, RuleRegistry};
pub use formatter::DiagnosticFormatter;
pub use json::{to_json_report, DiagnosticReport};

// ============================================================================
// Core Types
// ============================================================================

/// A diagnostic with enough context for display.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Option<Help>,
}

/// A labeled source span within a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub span: Span,
    pub style: LabelStyle,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Where the diagnostic is reported (`^` underline).
    Primary,
    /// Related location (`-` underline).
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl From<stacklint_analyzer::Severity> for Severity {
    fn from(severity: stacklint_analyzer::Severity) -> Self {
        match severity {
            stacklint_analyzer::Severity::Error => Severity::Error,
            stacklint_analyzer::Severity::Warning => Severity::Warning,
            stacklint_analyzer::Severity::Note => Severity::Note,
        }
    }
}

/// An error code like `E0100`, or a rule id for analyzer findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct Help {
    pub message: String,
    pub suggestion: Option<CodeSuggestion>,
}

/// A replacement for the text under `span`.
#[derive(Debug, Clone, Serialize)]
pub struct CodeSuggestion {
    pub span: Span,
    pub replacement: String,
}

// ============================================================================
// Builder API
// ============================================================================

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(ErrorCode(code.into()));
        self
    }

    pub fn with_label(mut self, span: Span, style: LabelStyle, msg: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            style,
            message: Some(msg.into()),
        });
        self
    }

    pub fn with_primary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Primary, msg)
    }

    pub fn with_secondary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Secondary, msg)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(Help {
            message: help.into(),
            suggestion: None,
        });
        self
    }

    /// Attach a replacement to the current help. No-op without help.
    pub fn with_suggestion(mut self, span: Span, replacement: impl Into<String>) -> Self {
        if let Some(ref mut help) = self.help {
            help.suggestion = Some(CodeSuggestion {
                span,
                replacement: replacement.into(),
            });
        }
        self
    }

    /// Returns the primary span (first primary label, or first label).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|l| l.style == LabelStyle::Primary)
            .or(self.labels.first())
            .map(|l| l.span)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// Conversion Trait
// ============================================================================

/// Convert an error or finding into a displayable diagnostic.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let d = Diagnostic::warning("msg")
            .with_code("perf/small-array-on-stack")
            .with_secondary(Span::new(10, 20), "this array")
            .with_primary(Span::new(8, 9), "reported here")
            .with_note("n")
            .with_help("h")
            .with_suggestion(Span::new(10, 13), "stackalloc");

        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.code, Some(ErrorCode("perf/small-array-on-stack".into())));
        assert_eq!(d.primary_span(), Some(Span::new(8, 9)));
        assert_eq!(d.notes, vec!["n".to_string()]);
        assert!(d.help.as_ref().and_then(|h| h.suggestion.as_ref()).is_some());
        assert!(!d.is_error());
    }

    #[test]
    fn suggestion_requires_help() {
        let d = Diagnostic::error("msg").with_suggestion(Span::new(0, 1), "x");
        assert!(d.help.is_none());
    }

    #[test]
    fn primary_span_falls_back_to_first_label() {
        let d = Diagnostic::error("msg").with_secondary(Span::new(3, 4), "here");
        assert_eq!(d.primary_span(), Some(Span::new(3, 4)));
        assert_eq!(Diagnostic::error("msg").primary_span(), None);
    }
}
