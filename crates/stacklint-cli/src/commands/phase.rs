// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Front-end inspection commands: lex, parse.

use std::fs;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use stacklint_ast::token::TokenKind;
use stacklint_ast::Span;
use stacklint_diagnostics::{to_json_report, Diagnostic, DiagnosticFormatter, ToDiagnostic};

use crate::cli::Format;
use crate::output;

#[derive(Debug, Serialize)]
struct JsonToken {
    kind: String,
    span: Span,
}

fn read(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!(
                "{}: reading {}: {}",
                output::error_label(),
                output::file_path(&path.display().to_string()),
                e
            );
            None
        }
    }
}

fn show_diagnostics(diags: &[Diagnostic], source: &str, file: &str, phase: &str, format: Format) {
    match format {
        Format::Human => {
            let formatter = DiagnosticFormatter::new(source).with_file_name(file);
            for diag in diags {
                eprintln!("{}", formatter.format(diag));
            }
            eprintln!("{}", output::banner_fail(phase, diags.len()));
        }
        Format::Json => {
            let report = to_json_report(diags, source, file);
            println!("{}", stacklint_diagnostics::json::to_json_string(&report));
        }
    }
}

pub fn cmd_lex(path: &Path, format: Format) -> i32 {
    let Some(source) = read(path) else {
        return 1;
    };
    let file = path.display().to_string();

    let result = stacklint_lexer::Lexer::new(&source).tokenize();
    if !result.is_ok() {
        let diags: Vec<Diagnostic> = result.errors.iter().map(|e| e.to_diagnostic()).collect();
        show_diagnostics(&diags, &source, &file, "Lex", format);
        return 1;
    }

    match format {
        Format::Human => {
            println!("{} Tokens ({}) {}\n", "===".dimmed(), result.tokens.len(), "===".dimmed());
            for tok in &result.tokens {
                if matches!(tok.kind, TokenKind::Eof) {
                    continue;
                }
                println!("{:4}:{:<4} {:?}", tok.span.start, tok.span.end, tok.kind);
            }
            println!("\n{}", output::banner_ok(&format!("Lex: {} tokens", result.tokens.len())));
        }
        Format::Json => {
            let tokens: Vec<JsonToken> = result
                .tokens
                .iter()
                .map(|t| JsonToken { kind: format!("{:?}", t.kind), span: t.span })
                .collect();
            match serde_json::to_string_pretty(&tokens) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("{}: {}", output::error_label(), e);
                    return 1;
                }
            }
        }
    }
    0
}

pub fn cmd_parse(path: &Path, format: Format) -> i32 {
    let Some(source) = read(path) else {
        return 1;
    };
    let file = path.display().to_string();

    let lexed = stacklint_lexer::Lexer::new(&source).tokenize();
    let mut diags: Vec<Diagnostic> = lexed.errors.iter().map(|e| e.to_diagnostic()).collect();
    let parsed = stacklint_parser::Parser::new(lexed.tokens).parse();
    diags.extend(parsed.errors.iter().map(|e| e.to_diagnostic()));

    if !diags.is_empty() {
        show_diagnostics(&diags, &source, &file, "Parse", format);
        return 1;
    }

    match format {
        Format::Human => {
            println!("{} AST ({} declarations) {}\n", "===".dimmed(), parsed.unit.decls.len(), "===".dimmed());
            for (i, decl) in parsed.unit.decls.iter().enumerate() {
                println!("--- Declaration {} ---", i + 1);
                println!("{:#?}", decl);
                println!();
            }
            println!("{}", output::banner_ok("Parse"));
        }
        Format::Json => {
            let report = to_json_report(&diags, &source, &file);
            println!("{}", stacklint_diagnostics::json::to_json_string(&report));
        }
    }
    0
}
