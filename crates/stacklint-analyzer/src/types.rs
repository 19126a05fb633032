// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Output and option types for `stacklint check`.

use serde::{Deserialize, Serialize};
use stacklint_ast::Span;
use stacklint_lexer::LexError;
use stacklint_parser::ParseError;
use std::collections::HashMap;

/// Severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// Source location, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
    pub source_line: String,
}

/// A single finding: an array allocation that could live on the stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
    /// Source text of the allocation expression.
    pub allocation: String,
    /// Where the finding is reported: the `=` of the declarator's initializer.
    pub location: Location,
    pub span: Span,
    /// The allocation expression itself.
    pub allocation_span: Span,
    pub fix: String,
}

/// Compilation-level switches the analysis depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompilationOptions {
    /// Whether `unsafe` code (and so `stackalloc`) is permitted.
    pub allow_unsafe: bool,
}

/// Options for analysis.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOpts {
    pub compilation: CompilationOptions,
    /// Include rules matching these patterns (e.g., "perf/*")
    pub rules: Vec<String>,
    /// Exclude rules matching these patterns
    pub excludes: Vec<String>,
    /// Per-rule severity overrides, keyed by rule id
    pub severity: HashMap<String, Severity>,
}

/// Complete analysis report for a file.
#[derive(Debug)]
pub struct AnalysisReport {
    pub file: String,
    /// False when the file had lex or parse errors.
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub lex_errors: Vec<LexError>,
    pub parse_errors: Vec<ParseError>,
}

impl AnalysisReport {
    pub fn error_count(&self) -> usize {
        self.lex_errors.len() + self.parse_errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}
