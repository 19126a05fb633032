// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions into `Diagnostic`.

use crate::{Diagnostic, ToDiagnostic};

// ============================================================================
// Lex Errors
// ============================================================================

impl ToDiagnostic for stacklint_lexer::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, label) = if self.message.starts_with("Unterminated") {
            ("E0002", "string starts here")
        } else if self.message.starts_with("Invalid escape") {
            ("E0003", "invalid escape")
        } else if self.message.starts_with("Invalid number") {
            ("E0004", "invalid literal")
        } else {
            ("E0001", "unexpected character")
        };

        let mut diag = Diagnostic::error(&self.message)
            .with_code(code)
            .with_primary(self.span, label);
        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }
        diag
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

impl ToDiagnostic for stacklint_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        let code = if self.message.starts_with("Expected") {
            "E0101"
        } else if self.message.contains("not supported") {
            "E0102"
        } else {
            "E0100"
        };

        let mut diag = Diagnostic::error(&self.message)
            .with_code(code)
            .with_primary(self.span, "here");
        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }
        diag
    }
}

// ============================================================================
// Analyzer Findings
// ============================================================================

impl ToDiagnostic for stacklint_analyzer::Diagnostic {
    fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::new(self.severity.into(), &self.message)
            .with_code(self.rule)
            .with_primary(self.span, "reported here")
            .with_secondary(self.allocation_span, "allocated on the heap")
            .with_help(&self.fix);

        match self.allocation.strip_prefix("new") {
            Some(rest) => diag.with_suggestion(self.allocation_span, format!("stackalloc{}", rest)),
            None => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LabelStyle, Severity};
    use pretty_assertions::assert_eq;
    use stacklint_analyzer::{analyze_source, AnalyzeOpts, CompilationOptions};

    #[test]
    fn lex_error_codes() {
        let lexed = stacklint_lexer::Lexer::new("class C { string s = \"abc; }").tokenize();
        let diags: Vec<_> = lexed.errors.iter().map(|e| e.to_diagnostic()).collect();
        assert!(!diags.is_empty());
        assert_eq!(diags[0].code.as_ref().map(|c| c.0.as_str()), Some("E0002"));
        assert!(diags[0].help.is_some());
    }

    #[test]
    fn parse_error_codes() {
        let parsed = stacklint_parser::parse_source("class C { void M() { var x = 1 } }");
        let diag = parsed.errors[0].to_diagnostic();
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("E0101"));
        assert_eq!(diag.labels[0].style, LabelStyle::Primary);
    }

    #[test]
    fn finding_labels_and_suggestion() {
        let source = "class C { unsafe void M() { var b = new byte[4]; } }";
        let opts = AnalyzeOpts {
            compilation: CompilationOptions { allow_unsafe: true },
            ..Default::default()
        };
        let report = analyze_source(source, "c.cs", &opts);
        assert_eq!(report.diagnostics.len(), 1);

        let diag = report.diagnostics[0].to_diagnostic();
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.code.as_ref().map(|c| c.0.as_str()), Some("perf/small-array-on-stack"));
        assert_eq!(diag.primary_span().and_then(|s| s.text(source)), Some("="));
        assert_eq!(diag.labels[1].span.text(source), Some("new byte[4]"));

        let suggestion = diag.help.and_then(|h| h.suggestion).map(|s| s.replacement);
        assert_eq!(suggestion.as_deref(), Some("stackalloc byte[4]"));
    }
}
