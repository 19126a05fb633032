// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! Produces rustc-style output:
//!
//! ```text
//! warning[perf/small-array-on-stack]: Array 'new byte[16]' can be allocated on the stack
//!   --> src/Buffer.cs:12:20
//!     |
//!  12 |         var buffer = new byte[16];
//!     |                    ^ ------------ allocated on the heap
//!     |                    |
//!     |                    reported here
//!     |
//!     = help: use `stackalloc` and a `Span<T>` (requires unsafe code to be allowed)
//!     |
//!  12 |         var buffer = stackalloc byte[16];
//!     |                      ~~~~~~~~~~~~~~~~~~~~
//! ```

use std::collections::BTreeMap;

use colored::Colorize;
use stacklint_ast::LineMap;

use crate::{Diagnostic, Help, LabelStyle, Severity};

/// Formats diagnostics against one source file.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

/// A source line with its labels.
struct AnnotatedLine {
    line_num: usize,
    text: String,
    annotations: Vec<Annotation>,
}

struct Annotation {
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            file_name: None,
            line_map: LineMap::new(source),
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let annotated = self.collect_annotated_lines(diagnostic);
        let Some(primary) = diagnostic.primary_span() else {
            self.format_footer(&mut out, diagnostic);
            return out;
        };
        if annotated.is_empty() {
            self.format_footer(&mut out, diagnostic);
            return out;
        }

        let (line, col) = self.offset_to_line_col(primary.start);
        out.push_str(&format!(
            "  {} {}:{}:{}\n",
            "-->".blue(),
            self.file_name.unwrap_or("<source>"),
            line,
            col
        ));

        let max_line = annotated.last().map(|a| a.line_num).unwrap_or(1);
        let gutter_width = max_line.to_string().len().max(2);

        let mut prev_line_num: Option<usize> = None;
        for annotated_line in &annotated {
            match prev_line_num {
                Some(prev) if annotated_line.line_num > prev + 1 => {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter_width), "...".blue()));
                }
                Some(_) => {}
                None => {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
                }
            }

            out.push_str(&format!(
                "{:>width$} {} {}\n",
                annotated_line.line_num.to_string().blue().bold(),
                "|".blue(),
                annotated_line.text,
                width = gutter_width + 1,
            ));
            self.format_annotations(&mut out, annotated_line, gutter_width);

            prev_line_num = Some(annotated_line.line_num);
        }

        if !diagnostic.notes.is_empty() || diagnostic.help.is_some() {
            out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
        }
        self.format_footer(&mut out, diagnostic);
        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity_str = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };

        match diagnostic.code {
            Some(ref code) => out.push_str(&format!(
                "{}[{}]: {}\n",
                severity_str,
                code.0.as_str().bold(),
                diagnostic.message.bold()
            )),
            None => out.push_str(&format!("{}: {}\n", severity_str, diagnostic.message.bold())),
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic) {
        let gutter_width = 2;

        for note in &diagnostic.notes {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter_width + 1),
                "=".cyan(),
                "note".cyan().bold(),
                note
            ));
        }
        if let Some(ref help) = diagnostic.help {
            self.format_help(out, help, gutter_width);
        }
    }

    fn format_help(&self, out: &mut String, help: &Help, gutter_width: usize) {
        out.push_str(&format!(
            "{} {} {}: {}\n",
            " ".repeat(gutter_width + 1),
            "=".cyan(),
            "help".cyan().bold(),
            help.message
        ));

        let Some(ref suggestion) = help.suggestion else {
            return;
        };
        let (line, col) = self.offset_to_line_col(suggestion.span.start);
        let Some(source_line) = self.get_line(line) else {
            return;
        };

        // Splice the replacement into the original line.
        let start = col.saturating_sub(1).min(source_line.len());
        let end = (start + suggestion.span.len()).min(source_line.len());
        let (Some(prefix), Some(suffix)) = (source_line.get(..start), source_line.get(end..)) else {
            return;
        };

        out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
        out.push_str(&format!(
            "{:>width$} {} {}{}{}\n",
            line.to_string().blue().bold(),
            "|".blue(),
            prefix,
            suggestion.replacement.green(),
            suffix,
            width = gutter_width + 1,
        ));
        out.push_str(&format!(
            "{} {} {}{}\n",
            " ".repeat(gutter_width + 1),
            "|".blue(),
            " ".repeat(start),
            "~".repeat(suggestion.replacement.chars().count()).green(),
        ));
    }

    fn collect_annotated_lines(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine> {
        let mut lines: BTreeMap<usize, AnnotatedLine> = BTreeMap::new();

        for label in &diagnostic.labels {
            let (line_num, col_start) = self.offset_to_line_col(label.span.start);
            let (end_line, col_end) = self.offset_to_line_col(label.span.end);
            let text = self.get_line(line_num).unwrap_or("");

            // Multi-line spans are underlined to the end of their first line.
            let col_end = if end_line == line_num { col_end } else { text.len() + 1 };

            let entry = lines.entry(line_num).or_insert_with(|| AnnotatedLine {
                line_num,
                text: text.to_string(),
                annotations: Vec::new(),
            });
            entry.annotations.push(Annotation {
                col_start,
                col_end: col_end.max(col_start + 1),
                style: label.style,
                message: label.message.clone(),
            });
        }

        lines.into_values().collect()
    }

    fn format_annotations(&self, out: &mut String, annotated_line: &AnnotatedLine, gutter_width: usize) {
        let mut sorted: Vec<&Annotation> = annotated_line.annotations.iter().collect();
        sorted.sort_by_key(|a| (a.style.priority(), a.col_start));

        let line_len = annotated_line.text.len() + 10;
        let mut underline = vec![' '; line_len];
        let mut messages: Vec<(usize, LabelStyle, &str)> = Vec::new();

        for ann in &sorted {
            let ch = match ann.style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };
            let start = (ann.col_start - 1).min(line_len);
            let end = (ann.col_end - 1).min(line_len);
            for slot in &mut underline[start..end] {
                if *slot == ' ' {
                    *slot = ch;
                }
            }
            if let Some(ref msg) = ann.message {
                messages.push((ann.col_start, ann.style, msg));
            }
        }

        let underline: String = underline.into_iter().collect();
        let underline = underline.trim_end();
        if underline.is_empty() {
            return;
        }
        let pad = " ".repeat(gutter_width + 1);
        let painted = color_underline(underline);

        if messages.len() <= 1 {
            match messages.first() {
                Some((_, style, msg)) => out.push_str(&format!(
                    "{} {} {} {}\n",
                    pad,
                    "|".blue(),
                    painted,
                    style_message(*style, msg)
                )),
                None => out.push_str(&format!("{} {} {}\n", pad, "|".blue(), painted)),
            }
            return;
        }

        // The rightmost message goes inline, the others hang below.
        messages.sort_by_key(|&(col, _, _)| col);
        let mut hanging = messages;
        let inline = hanging.pop();
        match inline {
            Some((_, style, msg)) => out.push_str(&format!(
                "{} {} {} {}\n",
                pad,
                "|".blue(),
                painted,
                style_message(style, msg)
            )),
            None => out.push_str(&format!("{} {} {}\n", pad, "|".blue(), painted)),
        }

        let connectors = |upto: usize| -> String {
            let mut s = String::new();
            let mut at = 1;
            for &(col, _, _) in hanging.iter().take(upto) {
                s.push_str(&" ".repeat(col.saturating_sub(at)));
                s.push('|');
                at = col + 1;
            }
            s
        };
        out.push_str(&format!("{} {} {}\n", pad, "|".blue(), connectors(hanging.len()).blue()));
        for i in (0..hanging.len()).rev() {
            let (col, style, msg) = hanging[i];
            let prefix = connectors(i);
            let used = prefix.chars().count();
            out.push_str(&format!(
                "{} {} {}{}{}\n",
                pad,
                "|".blue(),
                prefix.blue(),
                " ".repeat((col - 1).saturating_sub(used)),
                style_message(style, msg)
            ));
        }
    }

    /// Byte offset to 1-based (line, col).
    fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let (line, col) = self.line_map.offset_to_line_col(offset);
        (line as usize, col as usize)
    }

    fn get_line(&self, line_num: usize) -> Option<&'a str> {
        self.line_map.line_text(self.source, line_num as u32)
    }
}

impl LabelStyle {
    fn priority(&self) -> u8 {
        match self {
            LabelStyle::Primary => 0,
            LabelStyle::Secondary => 1,
        }
    }
}

fn style_message(style: LabelStyle, msg: &str) -> String {
    match style {
        LabelStyle::Primary => msg.yellow().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

/// Color runs of underline characters (`^` bold yellow, `-` blue).
fn color_underline(s: &str) -> String {
    let mut result = String::new();
    let mut current = None;
    let mut run = String::new();

    for ch in s.chars() {
        let kind = matches!(ch, '^' | '-').then_some(ch);
        if kind != current && !run.is_empty() {
            result.push_str(&flush_run(&run, current));
            run.clear();
        }
        run.push(ch);
        current = kind;
    }
    if !run.is_empty() {
        result.push_str(&flush_run(&run, current));
    }

    result
}

fn flush_run(run: &str, kind: Option<char>) -> String {
    match kind {
        Some('^') => run.yellow().bold().to_string(),
        Some('-') => run.blue().to_string(),
        _ => run.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToDiagnostic;
    use pretty_assertions::assert_eq;
    use stacklint_ast::Span;

    fn plain<F: FnOnce() -> String>(f: F) -> String {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn header_only() {
        let source = "";
        let out = plain(|| DiagnosticFormatter::new(source).format(&Diagnostic::error("boom")));
        assert_eq!(out, "error: boom\n");
    }

    #[test]
    fn single_label() {
        let source = "class C {\n    int x = 1\n}\n";
        let diag = Diagnostic::error("Expected ';', found '}'")
            .with_code("E0101")
            .with_primary(Span::new(23, 24), "here");
        let out = plain(|| DiagnosticFormatter::new(source).with_file_name("a.cs").format(&diag));
        assert_eq!(
            out,
            "error[E0101]: Expected ';', found '}'\n  --> a.cs:2:14\n    |\n  2 |     int x = 1\n    |              ^ here\n"
        );
    }

    #[test]
    fn finding_with_suggestion() {
        let source = "class C {\n    unsafe void M() { var b = new byte[4]; }\n}\n";
        let finding = stacklint_analyzer::Diagnostic {
            rule: "perf/small-array-on-stack",
            severity: stacklint_analyzer::Severity::Warning,
            message: "Array 'new byte[4]' can be allocated on the stack".into(),
            allocation: "new byte[4]".into(),
            location: stacklint_analyzer::Location {
                line: 2,
                column: 29,
                source_line: "    unsafe void M() { var b = new byte[4]; }".into(),
            },
            span: Span::new(38, 39),
            allocation_span: Span::new(40, 51),
            fix: "use stackalloc".into(),
        };
        let out = plain(|| {
            DiagnosticFormatter::new(source)
                .with_file_name("c.cs")
                .format(&finding.to_diagnostic())
        });

        let expected = [
            "warning[perf/small-array-on-stack]: Array 'new byte[4]' can be allocated on the stack",
            "  --> c.cs:2:29",
            "    |",
            "  2 |     unsafe void M() { var b = new byte[4]; }",
            "    |                             ^ ----------- allocated on the heap",
            "    |                             |",
            "    |                             reported here",
            "    |",
            "    = help: use stackalloc",
            "    |",
            "  2 |     unsafe void M() { var b = stackalloc byte[4]; }",
            "    |                               ~~~~~~~~~~~~~~~~~~",
            "",
        ]
        .join("\n");
        assert_eq!(out, expected);
    }
}
