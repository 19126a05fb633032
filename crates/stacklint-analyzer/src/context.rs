// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Context filter: is the allocation somewhere stack allocation is possible?

use stacklint_ast::decl::Modifier;
use stacklint_ast::stmt::StmtKind;
use stacklint_ast::{NodeRef, SyntaxTree};
use std::fmt;

use crate::site::AllocationSite;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextVerdict {
    Eligible,
    Ineligible(IneligibleReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    /// Field initializer, property accessor or other non-method position.
    NoEnclosingFunction,
    AsyncFunction,
    InsideLoop,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IneligibleReason::NoEnclosingFunction => "not inside a method or constructor",
            IneligibleReason::AsyncFunction => "inside an async method",
            IneligibleReason::InsideLoop => "inside a loop",
        })
    }
}

/// Reject sites outside a synchronous method body or nested in a loop.
pub fn filter(site: &AllocationSite<'_>, tree: &SyntaxTree<'_>) -> ContextVerdict {
    let Some(function) = site.function else {
        return ContextVerdict::Ineligible(IneligibleReason::NoEnclosingFunction);
    };
    if function.modifiers.has(Modifier::Async) {
        return ContextVerdict::Ineligible(IneligibleReason::AsyncFunction);
    }

    let function_id = function.member.id;
    let in_loop = tree
        .ancestors(site.expr.id)
        .take_while(|node| node.id() != function_id)
        .any(|node| is_loop(&node));
    if in_loop {
        return ContextVerdict::Ineligible(IneligibleReason::InsideLoop);
    }

    ContextVerdict::Eligible
}

fn is_loop(node: &NodeRef<'_>) -> bool {
    matches!(
        node.as_stmt().map(|s| &s.kind),
        Some(StmtKind::For { .. } | StmtKind::ForEach { .. } | StmtKind::While { .. } | StmtKind::Do { .. })
    )
}
