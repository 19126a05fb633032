// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.

use crate::token::{IntSuffix, RealSuffix};
use crate::types::TypeRef;
use crate::{NodeId, Span};

/// An expression in the AST.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Integer literal
    Int(u64, Option<IntSuffix>),
    /// Real literal
    Real(f64, Option<RealSuffix>),
    /// String literal (regular, verbatim or interpolated)
    String(String),
    /// Character literal
    Char(char),
    /// Boolean literal
    Bool(bool),
    /// `null`
    Null,
    /// Simple name
    Ident(String),
    /// `this`
    This,
    /// `base`
    Base,
    /// Member access (`a.b`, `a?.b`)
    Member {
        object: Box<Expr>,
        name: String,
        conditional: bool,
    },
    /// Invocation (`f(x)`, `a.M(x)`)
    Invocation {
        callee: Box<Expr>,
        args: Vec<Argument>,
    },
    /// Element access (`a[i]`)
    ElementAccess {
        object: Box<Expr>,
        args: Vec<Argument>,
    },
    /// Object creation (`new T(args) { ... }`); `ty` is `None` for target-typed `new()`
    ObjectCreation {
        ty: Option<TypeRef>,
        args: Vec<Argument>,
        initializer: Option<Vec<Expr>>,
    },
    /// Explicitly typed array creation (`new T[n]`, `new T[] { ... }`)
    ArrayCreation {
        element: TypeRef,
        ranks: Vec<RankSpecifier>,
        initializer: Option<Vec<Expr>>,
    },
    /// Implicitly typed array creation (`new[] { ... }`)
    ImplicitArrayCreation { elements: Vec<Expr> },
    /// Stack allocation (`stackalloc T[n]`); `element` is `None` for `stackalloc[] { ... }`
    StackAlloc {
        element: Option<TypeRef>,
        size: Option<Box<Expr>>,
        initializer: Option<Vec<Expr>>,
    },
    /// Bare array initializer (`int[] a = { 1, 2 };`)
    ArrayInitializer(Vec<Expr>),
    /// Simple or compound assignment
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// Conditional (`c ? a : b`)
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Prefix unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Postfix increment or decrement
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    /// Cast (`(int)x`)
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    /// Type test (`x is T`, `x is T name`)
    Is {
        expr: Box<Expr>,
        ty: TypeRef,
        /// Local declared by the pattern.
        designation: Option<String>,
    },
    /// Type conversion (`x as T`)
    As {
        expr: Box<Expr>,
        ty: TypeRef,
    },
    /// `typeof(T)`
    TypeOf(TypeRef),
    /// `sizeof(T)`
    SizeOf(TypeRef),
    /// `default(T)` or `default`
    Default(Option<TypeRef>),
    /// Parenthesized expression
    Paren(Box<Expr>),
}

/// One `[...]` in an array creation; `sizes.len()` is its dimension count.
#[derive(Debug, Clone)]
pub struct RankSpecifier {
    pub sizes: Vec<ArraySize>,
    pub span: Span,
}

/// A single dimension inside a rank specifier.
#[derive(Debug, Clone)]
pub enum ArraySize {
    /// `[]` or the empty slot in `[,]`
    Omitted,
    Expr(Expr),
}

/// An argument in an invocation, element access or object creation.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Option<String>,
    pub modifier: Option<ArgModifier>,
    pub expr: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgModifier {
    Ref,
    Out,
    In,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Coalesce,
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    /// `&x`
    AddressOf,
    /// `*p`
    Deref,
    /// `await x`
    Await,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Inc,
    Dec,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Coalesce,
}

impl ArraySize {
    pub fn expr(&self) -> Option<&Expr> {
        match self {
            ArraySize::Omitted => None,
            ArraySize::Expr(e) => Some(e),
        }
    }
}

impl Expr {
    /// The identifier name if this is a simple name.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        let mut e = self;
        while let ExprKind::Paren(inner) = &e.kind {
            e = inner;
        }
        e
    }
}
