// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `stacklint check`: small, non-escaping heap arrays that could be
//! stack allocated.
//!
//! Every explicitly typed array creation goes through three stages:
//! the [context filter](context::filter), the
//! [size evaluator](size::evaluate) and an [`EscapeProver`]. A site that
//! passes all three becomes a [`Diagnostic`].

pub mod context;
pub mod escape;
pub mod rules;
pub mod site;
pub mod size;
pub mod types;

pub use context::{ContextVerdict, IneligibleReason};
pub use escape::{EscapeEvidence, EscapeProver, EscapeVerdict, SyntacticEscapeProver};
pub use rules::{RuleDescriptor, RULE};
pub use site::{AllocationSite, SizeSpec};
pub use size::{ElementSizeTable, SizeFailure, SizeVerdict, SIZE_THRESHOLD};
pub use types::{AnalysisReport, AnalyzeOpts, CompilationOptions, Diagnostic, Location, Severity};

use rayon::prelude::*;
use stacklint_ast::{LineMap, NodeRef, Span, SyntaxTree};
use stacklint_semantic::SemanticModel;
use tracing::{debug, trace};

/// The classifier over one compilation unit.
pub struct Analyzer<'m, 'a, P = SyntacticEscapeProver> {
    model: &'m SemanticModel<'a>,
    source: &'m str,
    line_map: LineMap,
    options: CompilationOptions,
    severity: Severity,
    sizes: ElementSizeTable,
    prover: P,
}

impl<'m, 'a> Analyzer<'m, 'a> {
    pub fn new(model: &'m SemanticModel<'a>, source: &'m str, options: CompilationOptions) -> Self {
        Self {
            model,
            source,
            line_map: LineMap::new(source),
            options,
            severity: RULE.default_severity,
            sizes: ElementSizeTable::standard(),
            prover: SyntacticEscapeProver,
        }
    }
}

impl<'m, 'a, P: EscapeProver> Analyzer<'m, 'a, P> {
    /// Swap in a different escape strategy.
    pub fn with_prover<Q: EscapeProver>(self, prover: Q) -> Analyzer<'m, 'a, Q> {
        Analyzer {
            model: self.model,
            source: self.source,
            line_map: self.line_map,
            options: self.options,
            severity: self.severity,
            sizes: self.sizes,
            prover,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Classify one node. Anything but an eligible, sized, confined array
    /// creation yields `None`.
    pub fn analyze(&self, node: NodeRef<'a>) -> Option<Diagnostic> {
        if !self.options.allow_unsafe {
            return None;
        }
        let expr = node.as_expr()?;
        let site = AllocationSite::new(self.model, expr)?;
        trace!(start = expr.span.start, size = ?site.size_spec, "visiting allocation");

        if let ContextVerdict::Ineligible(reason) = context::filter(&site, self.model.tree()) {
            debug!(start = expr.span.start, %reason, "rejected by context");
            return None;
        }

        let bytes = match size::evaluate(&site, self.model, &self.sizes) {
            SizeVerdict::Sized(bytes) => bytes,
            SizeVerdict::ExceedsThreshold(bytes) => {
                debug!(start = expr.span.start, bytes, "rejected by size");
                return None;
            }
            SizeVerdict::Indeterminate(failure) => {
                debug!(start = expr.span.start, %failure, "size indeterminate");
                return None;
            }
        };

        if let EscapeVerdict::Escaping(evidence) = self.prover.prove(&site) {
            debug!(start = expr.span.start, ?evidence, "rejected by escape");
            return None;
        }

        trace!(start = expr.span.start, bytes, "stack candidate");
        self.report(&site)
    }

    /// All findings in the unit, ordered by source offset.
    pub fn analyze_tree(&self) -> Vec<Diagnostic> {
        let tree = self.model.tree();
        let sites: Vec<NodeRef<'a>> = tree.array_creations().map(NodeRef::Expr).collect();

        let mut found: Vec<Diagnostic> =
            sites.into_par_iter().filter_map(|node| self.analyze(node)).collect();
        found.sort_by_key(|d| d.span.start);
        found
    }

    fn report(&self, site: &AllocationSite<'a>) -> Option<Diagnostic> {
        let allocation = site.expr.span.text(self.source)?;
        let span = site
            .local
            .and_then(|d| d.init.as_ref())
            .map(|init| init.eq_span)
            .unwrap_or(site.expr.span);

        Some(Diagnostic {
            rule: RULE.id,
            severity: self.severity,
            message: rules::message(allocation),
            allocation: allocation.to_string(),
            location: self.location(span),
            span,
            allocation_span: site.expr.span,
            fix: RULE.fix.to_string(),
        })
    }

    fn location(&self, span: Span) -> Location {
        let (line, column) = self.line_map.offset_to_line_utf16_col(self.source, span.start);
        let source_line = self
            .line_map
            .line_text(self.source, line)
            .unwrap_or_default()
            .to_string();
        Location { line, column, source_line }
    }
}

/// Lex, parse and analyze one source file.
///
/// Lex and parse errors are carried in the report. A file with errors is not
/// analyzed: recovery drops the constructs it cannot parse, so uses of a local
/// inside them would be invisible to the escape check.
pub fn analyze_source(source: &str, file: &str, opts: &AnalyzeOpts) -> AnalysisReport {
    let lexed = stacklint_lexer::Lexer::new(source).tokenize();
    let parsed = stacklint_parser::Parser::new(lexed.tokens).parse();
    let success = lexed.errors.is_empty() && parsed.errors.is_empty();

    let diagnostics = if !success {
        debug!(
            file,
            lex_errors = lexed.errors.len(),
            parse_errors = parsed.errors.len(),
            "skipping analysis of file with errors"
        );
        Vec::new()
    } else if rules::should_run(RULE.id, opts) {
        let tree = SyntaxTree::new(&parsed.unit);
        let model = SemanticModel::new(&tree);
        Analyzer::new(&model, source, opts.compilation)
            .with_severity(rules::severity_for(&RULE, opts))
            .analyze_tree()
    } else {
        debug!(file, rule = RULE.id, "rule disabled");
        Vec::new()
    };

    AnalysisReport {
        file: file.to_string(),
        success,
        diagnostics,
        lex_errors: lexed.errors,
        parse_errors: parsed.errors,
    }
}
