// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement AST nodes.

use crate::decl::Declarator;
use crate::expr::Expr;
use crate::types::TypeRef;
use crate::{NodeId, Span};

/// A statement in the AST.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `{ ... }`
    Block(Vec<Stmt>),
    /// Local variable or local constant declaration
    Local(LocalDecl),
    /// Expression statement
    Expr(Expr),
    /// Return statement
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// `for (init; cond; update) body`; `init` holds local or expression statements
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        ty: TypeRef,
        name: String,
        iter: Expr,
        body: Box<Stmt>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Do {
        body: Box<Stmt>,
        cond: Expr,
    },
    Switch {
        expr: Expr,
        sections: Vec<SwitchSection>,
    },
    Break,
    Continue,
    Throw(Option<Expr>),
    YieldReturn(Expr),
    YieldBreak,
    /// `unsafe { ... }`
    Unsafe(Vec<Stmt>),
    /// `fixed (T* p = e) body`
    Fixed {
        decl: LocalDecl,
        body: Box<Stmt>,
    },
    /// `using (resource) body`; the resource is a local or expression statement
    Using {
        resource: Box<Stmt>,
        body: Box<Stmt>,
    },
    Lock {
        expr: Expr,
        body: Box<Stmt>,
    },
    Try {
        body: Vec<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Stmt>>,
    },
    /// `;`
    Empty,
}

/// `T a = x, b;` or `const T a = x;`
#[derive(Debug, Clone)]
pub struct LocalDecl {
    pub ty: TypeRef,
    pub is_const: bool,
    pub declarators: Vec<Declarator>,
}

/// One `case`/`default` group in a switch statement.
#[derive(Debug, Clone)]
pub struct SwitchSection {
    /// `None` for the `default` label
    pub labels: Vec<Option<Expr>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub ty: Option<TypeRef>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
}
