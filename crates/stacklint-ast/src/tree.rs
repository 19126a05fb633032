// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Read-only navigation over a parsed compilation unit.
//!
//! The AST itself only has downward links. [`SyntaxTree`] walks it once and
//! records every node's parent in a side table keyed by [`NodeId`], so
//! ancestor queries never need back-pointers in the nodes themselves.

use std::collections::HashMap;

use crate::decl::{
    Accessor, CompilationUnit, Decl, DeclKind, Declarator, FnBody, Member, MemberKind, Modifiers,
    Param,
};
use crate::expr::{ArraySize, Expr, ExprKind};
use crate::stmt::{Stmt, StmtKind};
use crate::{NodeId, Span};

/// A borrowed reference to any node that carries a [`NodeId`].
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Decl(&'a Decl),
    Member(&'a Member),
    Declarator(&'a Declarator),
    Accessor(&'a Accessor),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

/// A method or constructor, the only members with analyzable bodies.
#[derive(Debug, Clone, Copy)]
pub struct Function<'a> {
    pub member: &'a Member,
    pub name: &'a str,
    pub modifiers: &'a Modifiers,
    pub params: &'a [Param],
    pub body: Option<&'a FnBody>,
    pub is_constructor: bool,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::Decl(d) => d.id,
            NodeRef::Member(m) => m.id,
            NodeRef::Declarator(d) => d.id,
            NodeRef::Accessor(a) => a.id,
            NodeRef::Stmt(s) => s.id,
            NodeRef::Expr(e) => e.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            NodeRef::Decl(d) => d.span,
            NodeRef::Member(m) => m.span,
            NodeRef::Declarator(d) => d.span,
            NodeRef::Accessor(a) => a.span,
            NodeRef::Stmt(s) => s.span,
            NodeRef::Expr(e) => e.span,
        }
    }

    pub fn as_expr(&self) -> Option<&'a Expr> {
        match self {
            NodeRef::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_stmt(&self) -> Option<&'a Stmt> {
        match self {
            NodeRef::Stmt(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_declarator(&self) -> Option<&'a Declarator> {
        match self {
            NodeRef::Declarator(d) => Some(d),
            _ => None,
        }
    }

    /// The method or constructor this node is, if any.
    pub fn as_function(&self) -> Option<Function<'a>> {
        match self {
            NodeRef::Member(m) => m.as_function(),
            _ => None,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        self.push_children(&mut out);
        out
    }

    fn push_children(&self, out: &mut Vec<NodeRef<'a>>) {
        match *self {
            NodeRef::Decl(decl) => match &decl.kind {
                DeclKind::Using(_) => {}
                DeclKind::Namespace(ns) => out.extend(ns.decls.iter().map(NodeRef::Decl)),
                DeclKind::Type(ty) => out.extend(ty.members.iter().map(NodeRef::Member)),
            },
            NodeRef::Member(member) => push_member_children(member, out),
            NodeRef::Declarator(d) => {
                if let Some(init) = &d.init {
                    out.push(NodeRef::Expr(&init.value));
                }
            }
            NodeRef::Accessor(a) => {
                if let Some(body) = &a.body {
                    push_body(body, out);
                }
            }
            NodeRef::Stmt(stmt) => push_stmt_children(stmt, out),
            NodeRef::Expr(expr) => push_expr_children(expr, out),
        }
    }
}

fn push_body<'a>(body: &'a FnBody, out: &mut Vec<NodeRef<'a>>) {
    match body {
        FnBody::Block(stmts) => out.extend(stmts.iter().map(NodeRef::Stmt)),
        FnBody::Expr(e) => out.push(NodeRef::Expr(e)),
    }
}

fn push_params<'a>(params: &'a [Param], out: &mut Vec<NodeRef<'a>>) {
    out.extend(params.iter().filter_map(|p| p.default.as_ref()).map(NodeRef::Expr));
}

fn push_member_children<'a>(member: &'a Member, out: &mut Vec<NodeRef<'a>>) {
    match &member.kind {
        MemberKind::Field(f) => out.extend(f.declarators.iter().map(NodeRef::Declarator)),
        MemberKind::Method(m) => {
            push_params(&m.params, out);
            if let Some(body) = &m.body {
                push_body(body, out);
            }
        }
        MemberKind::Constructor(c) => {
            push_params(&c.params, out);
            if let Some(chain) = &c.chain {
                out.extend(chain.args.iter().map(|a| NodeRef::Expr(&a.expr)));
            }
            if let Some(body) = &c.body {
                push_body(body, out);
            }
        }
        MemberKind::Property(p) => {
            out.extend(p.accessors.iter().map(NodeRef::Accessor));
            if let Some(e) = &p.expr_body {
                out.push(NodeRef::Expr(e));
            }
            if let Some(init) = &p.init {
                out.push(NodeRef::Expr(&init.value));
            }
        }
        MemberKind::Type(ty) => out.extend(ty.members.iter().map(NodeRef::Member)),
        MemberKind::EnumMember(e) => {
            if let Some(v) = &e.value {
                out.push(NodeRef::Expr(v));
            }
        }
    }
}

fn push_stmt_children<'a>(stmt: &'a Stmt, out: &mut Vec<NodeRef<'a>>) {
    match &stmt.kind {
        StmtKind::Block(stmts) | StmtKind::Unsafe(stmts) => {
            out.extend(stmts.iter().map(NodeRef::Stmt))
        }
        StmtKind::Local(local) => out.extend(local.declarators.iter().map(NodeRef::Declarator)),
        StmtKind::Expr(e) | StmtKind::YieldReturn(e) => out.push(NodeRef::Expr(e)),
        StmtKind::Return(e) | StmtKind::Throw(e) => {
            if let Some(e) = e {
                out.push(NodeRef::Expr(e));
            }
        }
        StmtKind::If { cond, then_branch, else_branch } => {
            out.push(NodeRef::Expr(cond));
            out.push(NodeRef::Stmt(then_branch));
            if let Some(e) = else_branch {
                out.push(NodeRef::Stmt(e));
            }
        }
        StmtKind::For { init, cond, update, body } => {
            out.extend(init.iter().map(NodeRef::Stmt));
            if let Some(c) = cond {
                out.push(NodeRef::Expr(c));
            }
            out.extend(update.iter().map(NodeRef::Expr));
            out.push(NodeRef::Stmt(body));
        }
        StmtKind::ForEach { iter, body, .. } => {
            out.push(NodeRef::Expr(iter));
            out.push(NodeRef::Stmt(body));
        }
        StmtKind::While { cond, body } => {
            out.push(NodeRef::Expr(cond));
            out.push(NodeRef::Stmt(body));
        }
        StmtKind::Do { body, cond } => {
            out.push(NodeRef::Stmt(body));
            out.push(NodeRef::Expr(cond));
        }
        StmtKind::Switch { expr, sections } => {
            out.push(NodeRef::Expr(expr));
            for section in sections {
                out.extend(section.labels.iter().flatten().map(NodeRef::Expr));
                out.extend(section.body.iter().map(NodeRef::Stmt));
            }
        }
        StmtKind::Fixed { decl, body } => {
            out.extend(decl.declarators.iter().map(NodeRef::Declarator));
            out.push(NodeRef::Stmt(body));
        }
        StmtKind::Using { resource, body } => {
            out.push(NodeRef::Stmt(resource));
            out.push(NodeRef::Stmt(body));
        }
        StmtKind::Lock { expr, body } => {
            out.push(NodeRef::Expr(expr));
            out.push(NodeRef::Stmt(body));
        }
        StmtKind::Try { body, catches, finally } => {
            out.extend(body.iter().map(NodeRef::Stmt));
            for catch in catches {
                out.extend(catch.body.iter().map(NodeRef::Stmt));
            }
            if let Some(f) = finally {
                out.extend(f.iter().map(NodeRef::Stmt));
            }
        }
        StmtKind::Break | StmtKind::Continue | StmtKind::YieldBreak | StmtKind::Empty => {}
    }
}

fn push_expr_children<'a>(expr: &'a Expr, out: &mut Vec<NodeRef<'a>>) {
    match &expr.kind {
        ExprKind::Int(..)
        | ExprKind::Real(..)
        | ExprKind::String(_)
        | ExprKind::Char(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Ident(_)
        | ExprKind::This
        | ExprKind::Base
        | ExprKind::TypeOf(_)
        | ExprKind::SizeOf(_)
        | ExprKind::Default(_) => {}
        ExprKind::Member { object, .. } => out.push(NodeRef::Expr(object)),
        ExprKind::Invocation { callee, args } => {
            out.push(NodeRef::Expr(callee));
            out.extend(args.iter().map(|a| NodeRef::Expr(&a.expr)));
        }
        ExprKind::ElementAccess { object, args } => {
            out.push(NodeRef::Expr(object));
            out.extend(args.iter().map(|a| NodeRef::Expr(&a.expr)));
        }
        ExprKind::ObjectCreation { args, initializer, .. } => {
            out.extend(args.iter().map(|a| NodeRef::Expr(&a.expr)));
            if let Some(init) = initializer {
                out.extend(init.iter().map(NodeRef::Expr));
            }
        }
        ExprKind::ArrayCreation { ranks, initializer, .. } => {
            for rank in ranks {
                out.extend(rank.sizes.iter().filter_map(ArraySize::expr).map(NodeRef::Expr));
            }
            if let Some(init) = initializer {
                out.extend(init.iter().map(NodeRef::Expr));
            }
        }
        ExprKind::ImplicitArrayCreation { elements } | ExprKind::ArrayInitializer(elements) => {
            out.extend(elements.iter().map(NodeRef::Expr))
        }
        ExprKind::StackAlloc { size, initializer, .. } => {
            if let Some(s) = size {
                out.push(NodeRef::Expr(s));
            }
            if let Some(init) = initializer {
                out.extend(init.iter().map(NodeRef::Expr));
            }
        }
        ExprKind::Assign { target, value, .. } => {
            out.push(NodeRef::Expr(target));
            out.push(NodeRef::Expr(value));
        }
        ExprKind::Conditional { cond, then_expr, else_expr } => {
            out.push(NodeRef::Expr(cond));
            out.push(NodeRef::Expr(then_expr));
            out.push(NodeRef::Expr(else_expr));
        }
        ExprKind::Binary { left, right, .. } => {
            out.push(NodeRef::Expr(left));
            out.push(NodeRef::Expr(right));
        }
        ExprKind::Unary { operand, .. } | ExprKind::Postfix { operand, .. } => {
            out.push(NodeRef::Expr(operand))
        }
        ExprKind::Cast { expr, .. }
        | ExprKind::Is { expr, .. }
        | ExprKind::As { expr, .. }
        | ExprKind::Paren(expr) => out.push(NodeRef::Expr(expr)),
    }
}

/// Parent table and node index over a borrowed [`CompilationUnit`].
pub struct SyntaxTree<'a> {
    unit: &'a CompilationUnit,
    nodes: HashMap<NodeId, NodeRef<'a>>,
    parents: HashMap<NodeId, NodeId>,
}

impl<'a> SyntaxTree<'a> {
    pub fn new(unit: &'a CompilationUnit) -> Self {
        let mut nodes = HashMap::new();
        let mut parents = HashMap::new();
        let mut stack: Vec<(NodeRef<'a>, Option<NodeId>)> =
            unit.decls.iter().rev().map(|d| (NodeRef::Decl(d), None)).collect();
        let mut children = Vec::new();

        while let Some((node, parent)) = stack.pop() {
            let id = node.id();
            nodes.insert(id, node);
            if let Some(parent) = parent {
                parents.insert(id, parent);
            }
            children.clear();
            node.push_children(&mut children);
            stack.extend(children.drain(..).rev().map(|c| (c, Some(id))));
        }

        SyntaxTree { unit, nodes, parents }
    }

    pub fn unit(&self) -> &'a CompilationUnit {
        self.unit
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'a>> {
        self.nodes.get(&id).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeRef<'a>> {
        self.parents.get(&id).and_then(|p| self.node(*p))
    }

    /// Ancestors of `id`, nearest first, excluding the node itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, 'a> {
        Ancestors { tree: self, current: id }
    }

    pub fn first_ancestor(
        &self,
        id: NodeId,
        mut pred: impl FnMut(&NodeRef<'a>) -> bool,
    ) -> Option<NodeRef<'a>> {
        self.ancestors(id).find(|n| pred(n))
    }

    /// Pre-order descendants of `node`, excluding `node` itself.
    pub fn descendants(node: NodeRef<'a>) -> Descendants<'a> {
        Descendants { stack: node.children().into_iter().rev().collect() }
    }

    /// Every node in the unit, pre-order.
    pub fn walk(&self) -> Descendants<'a> {
        Descendants { stack: self.unit.decls.iter().rev().map(NodeRef::Decl).collect() }
    }

    /// All explicitly typed array-creation expressions, in source order.
    pub fn array_creations(&self) -> impl Iterator<Item = &'a Expr> {
        self.walk()
            .filter_map(|n| n.as_expr())
            .filter(|e| matches!(e.kind, ExprKind::ArrayCreation { .. }))
    }
}

/// Lazy ancestor iterator; see [`SyntaxTree::ancestors`].
pub struct Ancestors<'t, 'a> {
    tree: &'t SyntaxTree<'a>,
    current: NodeId,
}

impl<'t, 'a> Iterator for Ancestors<'t, 'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<NodeRef<'a>> {
        let parent = self.tree.parent(self.current)?;
        self.current = parent.id();
        Some(parent)
    }
}

/// Lazy pre-order iterator with an explicit stack. Calling
/// [`SyntaxTree::descendants`] again restarts from the beginning.
pub struct Descendants<'a> {
    stack: Vec<NodeRef<'a>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<NodeRef<'a>> {
        let node = self.stack.pop()?;
        let start = self.stack.len();
        node.push_children(&mut self.stack);
        self.stack[start..].reverse();
        Some(node)
    }
}
