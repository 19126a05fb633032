// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Use `stacklint check --format json` to get this output. Each diagnostic
//! carries 1-based line/column locations, the source line and, for
//! findings, the rewritten line with `stackalloc` applied.

use serde::Serialize;
use stacklint_ast::{LineMap, Span};

use crate::codes::ErrorCodeRegistry;
use crate::{Diagnostic, LabelStyle, Severity};

/// A complete JSON diagnostic report for one file.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub file: String,
    /// False when the file had lex or parse errors.
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// A single diagnostic in JSON form, enriched with source context.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: Severity,
    /// Error code (e.g. "E0101") or rule id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// "Syntax" or "Performance".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<JsonSuggestion>,
}

/// A source location with line/column (1-based, column in UTF-16 units).
#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub byte_offset: usize,
    pub source_line: String,
}

#[derive(Debug, Serialize)]
pub struct JsonLabel {
    pub role: LabelStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub start: LineCol,
    pub end: LineCol,
}

#[derive(Debug, Serialize)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
    pub byte_offset: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonSuggestion {
    pub span: Span,
    pub replacement: String,
    /// The full line after applying the replacement.
    pub result_line: String,
}

/// Convert one file's diagnostics into a report.
pub fn to_json_report(diagnostics: &[Diagnostic], source: &str, file: &str) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let line_map = LineMap::new(source);
    let ctx = Context { source, line_map: &line_map, registry: &registry };

    let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warning_count = diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics: diagnostics.iter().map(|d| ctx.convert(d)).collect(),
        error_count,
        warning_count,
    }
}

/// Serialize a report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

struct Context<'a> {
    source: &'a str,
    line_map: &'a LineMap,
    registry: &'a ErrorCodeRegistry,
}

impl Context<'_> {
    fn convert(&self, diag: &Diagnostic) -> JsonDiagnostic {
        let code = diag.code.as_ref().map(|c| c.0.clone());
        let category = code
            .as_deref()
            .and_then(|c| self.registry.category_of(c))
            .map(|c| c.to_string());

        let location = diag.primary_span().map(|span| {
            let at = self.line_col(span.start);
            SourceLocation {
                line: at.line,
                column: at.column,
                byte_offset: at.byte_offset,
                source_line: self.line(at.line).to_string(),
            }
        });

        let labels = diag
            .labels
            .iter()
            .map(|l| JsonLabel {
                role: l.style,
                message: l.message.clone(),
                start: self.line_col(l.span.start),
                end: self.line_col(l.span.end),
            })
            .collect();

        let suggestion = diag
            .help
            .as_ref()
            .and_then(|h| h.suggestion.as_ref())
            .map(|s| {
                let (line_num, byte_col) = self.line_map.offset_to_line_col(s.span.start);
                let line = self.line(line_num);
                let start = (byte_col as usize - 1).min(line.len());
                let end = (start + s.span.len()).min(line.len());
                let result_line = match (line.get(..start), line.get(end..)) {
                    (Some(prefix), Some(suffix)) => format!("{}{}{}", prefix, s.replacement, suffix),
                    _ => line.to_string(),
                };
                JsonSuggestion { span: s.span, replacement: s.replacement.clone(), result_line }
            });

        JsonDiagnostic {
            severity: diag.severity,
            code,
            category,
            message: diag.message.clone(),
            location,
            labels,
            notes: diag.notes.clone(),
            help: diag.help.as_ref().map(|h| h.message.clone()),
            suggestion,
        }
    }

    fn line_col(&self, offset: usize) -> LineCol {
        let (line, column) = self.line_map.offset_to_line_utf16_col(self.source, offset);
        LineCol { line, column, byte_offset: offset }
    }

    fn line(&self, line: u32) -> &str {
        self.line_map.line_text(self.source, line).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToDiagnostic;
    use pretty_assertions::assert_eq;
    use stacklint_analyzer::{analyze_source, AnalyzeOpts, CompilationOptions};

    #[test]
    fn finding_report() {
        let source = "class C\n{\n    unsafe void M() { var b = new int[2]; }\n}\n";
        let opts = AnalyzeOpts {
            compilation: CompilationOptions { allow_unsafe: true },
            ..Default::default()
        };
        let analysis = analyze_source(source, "c.cs", &opts);
        let diags: Vec<Diagnostic> = analysis.diagnostics.iter().map(|d| d.to_diagnostic()).collect();

        let report = to_json_report(&diags, source, "c.cs");
        assert!(report.success);
        assert_eq!(report.warning_count, 1);

        let json = serde_json::to_value(&report).unwrap_or_default();
        let d = &json["diagnostics"][0];
        assert_eq!(d["severity"], "warning");
        assert_eq!(d["code"], "perf/small-array-on-stack");
        assert_eq!(d["category"], "Performance");
        assert_eq!(d["location"]["line"], 3);
        assert_eq!(d["location"]["column"], 29);
        assert_eq!(d["labels"][0]["role"], "primary");
        assert_eq!(d["labels"][1]["role"], "secondary");
        assert_eq!(d["suggestion"]["result_line"], "    unsafe void M() { var b = stackalloc int[2]; }");
        assert!(d.get("notes").is_none());
    }

    #[test]
    fn error_report() {
        let source = "class C { int x = 1 }";
        let parsed = stacklint_parser::parse_source(source);
        let diags: Vec<Diagnostic> = parsed.errors.iter().map(|e| e.to_diagnostic()).collect();

        let report = to_json_report(&diags, source, "c.cs");
        assert!(!report.success);
        assert_eq!(report.error_count, diags.len());
        assert_eq!(report.diagnostics[0].category.as_deref(), Some("Syntax"));

        let text = to_json_string(&report);
        assert!(text.contains("\"version\": 1"));
    }
}
