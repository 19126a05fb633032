// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Allocation sites: one array-creation expression and its surroundings.

use stacklint_ast::decl::Declarator;
use stacklint_ast::expr::{ArraySize, Expr, ExprKind, RankSpecifier};
use stacklint_ast::stmt::StmtKind;
use stacklint_ast::types::TypeRef;
use stacklint_ast::{Function, NodeRef, SyntaxTree};
use stacklint_semantic::SemanticModel;

/// How the element count of an allocation is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSpec {
    /// `new T[16]`
    Literal,
    /// `new T[N]` with `N` a constant
    NamedConstant,
    /// `new T[] { ... }`
    Omitted,
    /// Anything else
    NonConstant,
}

/// One array-creation expression, built transiently while walking the tree.
#[derive(Debug, Clone, Copy)]
pub struct AllocationSite<'a> {
    pub expr: &'a Expr,
    pub element: &'a TypeRef,
    pub ranks: &'a [RankSpecifier],
    pub initializer: Option<&'a [Expr]>,
    pub size_spec: SizeSpec,
    /// The enclosing method or constructor. `None` in field initializers,
    /// property accessors and anywhere else without an analyzable body.
    pub function: Option<Function<'a>>,
    /// The local declarator this allocation directly initializes.
    pub local: Option<&'a Declarator>,
}

impl<'a> AllocationSite<'a> {
    /// Build a site for `expr`; `None` unless it is an explicitly typed
    /// array creation.
    pub fn new(model: &SemanticModel<'a>, expr: &'a Expr) -> Option<Self> {
        let ExprKind::ArrayCreation { element, ranks, initializer } = &expr.kind else {
            return None;
        };
        let tree = model.tree();

        let size_spec = match ranks.first().and_then(|r| r.sizes.first()) {
            None | Some(ArraySize::Omitted) => SizeSpec::Omitted,
            Some(ArraySize::Expr(size)) => {
                let size = size.unparenthesized();
                if matches!(size.kind, ExprKind::Int(..)) {
                    SizeSpec::Literal
                } else if model.is_constant_reference(size) {
                    SizeSpec::NamedConstant
                } else {
                    SizeSpec::NonConstant
                }
            }
        };

        Some(Self {
            expr,
            element,
            ranks,
            initializer: initializer.as_deref(),
            size_spec,
            function: enclosing_function(tree, expr),
            local: bound_local(tree, expr),
        })
    }

    /// Name of the local this allocation initializes.
    pub fn local_name(&self) -> Option<&'a str> {
        self.local.map(|d| d.name.as_str())
    }

    /// Declared dimension count of the outermost rank specifier.
    pub fn rank(&self) -> usize {
        self.ranks.first().map(|r| r.sizes.len()).unwrap_or(0)
    }
}

/// The nearest member decides: a method or constructor yields its body,
/// while a field, property or accessor has no analyzable function.
fn enclosing_function<'a>(tree: &SyntaxTree<'a>, expr: &Expr) -> Option<Function<'a>> {
    tree.ancestors(expr.id)
        .find_map(|node| match node {
            NodeRef::Accessor(_) => Some(None),
            NodeRef::Member(member) => Some(member.as_function()),
            _ => None,
        })
        .flatten()
}

/// `T x = new T[n];`: the declarator must be the direct parent and belong
/// to a local declaration statement.
fn bound_local<'a>(tree: &SyntaxTree<'a>, expr: &Expr) -> Option<&'a Declarator> {
    let declarator = tree.parent(expr.id)?.as_declarator()?;
    let stmt = tree.parent(declarator.id)?.as_stmt()?;
    matches!(stmt.kind, StmtKind::Local(_)).then_some(declarator)
}
