// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Escape prover: shows that a local array never leaves its frame.
//!
//! The check is syntactic. It looks at every use of the local's name in
//! the enclosing function, without regard to control flow or shadowing.

use stacklint_ast::expr::{Argument, Expr, ExprKind};
use stacklint_ast::stmt::StmtKind;
use stacklint_ast::{NodeRef, SyntaxTree};

use crate::site::AllocationSite;

/// Which kinds of escaping use were seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscapeEvidence {
    pub is_returned: bool,
    pub is_argument_to_call: bool,
    pub is_argument_to_construction: bool,
    pub is_assigned_to_other_storage: bool,
}

impl EscapeEvidence {
    pub fn escapes(&self) -> bool {
        self.is_returned
            || self.is_argument_to_call
            || self.is_argument_to_construction
            || self.is_assigned_to_other_storage
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeVerdict {
    Confined,
    /// Evidence is all-false when the allocation is not bound to a local.
    Escaping(EscapeEvidence),
}

/// Strategy deciding whether an allocation may outlive its frame.
///
/// `Confined` means no escaping use was recognised. How much aliasing an
/// implementation follows is up to it.
pub trait EscapeProver: Send + Sync {
    fn prove(&self, site: &AllocationSite<'_>) -> EscapeVerdict;
}

/// Name-based single pass over the function body.
///
/// A use escapes only when the bound name *is* the returned value, a call or
/// constructor argument, or the right-hand side of an assignment (parentheses
/// aside). Aliasing through a larger expression is not followed:
/// `x = cond ? b : c`, `Wrap((object)b)`, `var c = b;` and `new[] { b }`
/// all leave the allocation `Confined`. A stricter prover can be plugged in
/// through [`EscapeProver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntacticEscapeProver;

impl EscapeProver for SyntacticEscapeProver {
    fn prove(&self, site: &AllocationSite<'_>) -> EscapeVerdict {
        let (Some(name), Some(function)) = (site.local_name(), site.function) else {
            return EscapeVerdict::Escaping(EscapeEvidence::default());
        };

        let mut evidence = EscapeEvidence::default();
        for node in SyntaxTree::descendants(NodeRef::Member(function.member)) {
            match node {
                NodeRef::Stmt(stmt) => {
                    if let StmtKind::Return(Some(value)) = &stmt.kind {
                        evidence.is_returned |= is_name(value, name);
                    }
                }
                NodeRef::Expr(expr) => collect_expr(expr, name, &mut evidence),
                _ => {}
            }
        }

        if evidence.escapes() {
            EscapeVerdict::Escaping(evidence)
        } else {
            EscapeVerdict::Confined
        }
    }
}

fn collect_expr(expr: &Expr, name: &str, evidence: &mut EscapeEvidence) {
    match &expr.kind {
        ExprKind::Invocation { args, .. } => {
            evidence.is_argument_to_call |= passes(args, name);
        }
        ExprKind::ObjectCreation { args, .. } => {
            evidence.is_argument_to_construction |= passes(args, name);
        }
        ExprKind::Assign { value, .. } => {
            evidence.is_assigned_to_other_storage |= is_name(value, name);
        }
        _ => {}
    }
}

fn passes(args: &[Argument], name: &str) -> bool {
    args.iter().any(|arg| is_name(&arg.expr, name))
}

fn is_name(expr: &Expr, name: &str) -> bool {
    expr.unparenthesized().as_ident() == Some(name)
}
