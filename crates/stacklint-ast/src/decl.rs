// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration AST nodes.

use crate::expr::{Argument, Expr};
use crate::stmt::Stmt;
use crate::types::TypeRef;
use crate::{NodeId, Span};

/// A parsed source file.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub decls: Vec<Decl>,
    pub span: Span,
}

/// A namespace-level declaration.
#[derive(Debug, Clone)]
pub struct Decl {
    pub id: NodeId,
    pub kind: DeclKind,
    pub span: Span,
}

/// The kind of declaration.
#[derive(Debug, Clone)]
pub enum DeclKind {
    /// `using System;`, `using static X;`, `using A = B;`
    Using(UsingDirective),
    /// Block or file-scoped namespace
    Namespace(NamespaceDecl),
    /// Class, struct, interface, record or enum
    Type(TypeDecl),
}

#[derive(Debug, Clone)]
pub struct UsingDirective {
    pub path: Vec<String>,
    pub alias: Option<String>,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    pub name: Vec<String>,
    pub decls: Vec<Decl>,
    pub file_scoped: bool,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    pub name_span: Span,
    pub modifiers: Modifiers,
    pub type_params: Vec<String>,
    pub bases: Vec<TypeRef>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Record,
    Enum,
}

/// A member of a type declaration.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: NodeId,
    pub kind: MemberKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum MemberKind {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Property(PropertyDecl),
    /// Nested type
    Type(TypeDecl),
    /// `Name` or `Name = value` inside an enum
    EnumMember(EnumMember),
}

/// `modifiers T a = x, b;` at type level.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub declarators: Vec<Declarator>,
}

/// A single variable in a field or local declaration.
#[derive(Debug, Clone)]
pub struct Declarator {
    pub id: NodeId,
    pub name: String,
    pub name_span: Span,
    pub init: Option<Initializer>,
    pub span: Span,
}

/// `= value` following a declarator. `eq_span` covers the `=` token.
#[derive(Debug, Clone)]
pub struct Initializer {
    pub eq_span: Span,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub return_ty: TypeRef,
    pub name: String,
    pub name_span: Span,
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub body: Option<FnBody>,
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub modifiers: Modifiers,
    pub name: String,
    pub name_span: Span,
    pub params: Vec<Param>,
    pub chain: Option<ConstructorChain>,
    pub body: Option<FnBody>,
}

/// `: this(args)` or `: base(args)`
#[derive(Debug, Clone)]
pub struct ConstructorChain {
    pub is_base: bool,
    pub args: Vec<Argument>,
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub name: String,
    pub name_span: Span,
    pub accessors: Vec<Accessor>,
    /// `T P => expr;`
    pub expr_body: Option<Expr>,
    /// `T P { get; } = expr;`
    pub init: Option<Initializer>,
}

/// A `get`, `set` or `init` accessor.
#[derive(Debug, Clone)]
pub struct Accessor {
    pub id: NodeId,
    pub kind: AccessorKind,
    pub modifiers: Modifiers,
    pub body: Option<FnBody>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
    Init,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub name_span: Span,
    pub value: Option<Expr>,
}

/// Block body or expression body (`=> expr;`).
#[derive(Debug, Clone)]
pub enum FnBody {
    Block(Vec<Stmt>),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub modifier: Option<ParamModifier>,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamModifier {
    Ref,
    Out,
    In,
    Params,
    This,
}

/// Declaration modifiers, including the contextual `async` and `partial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Const,
    Readonly,
    Unsafe,
    Abstract,
    Virtual,
    Override,
    Sealed,
    Extern,
    Volatile,
    New,
    Async,
    Partial,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub list: Vec<Modifier>,
}

impl Modifiers {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.list.contains(&modifier)
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl Member {
    /// Methods and constructors, viewed uniformly.
    pub fn as_function(&self) -> Option<crate::tree::Function<'_>> {
        match &self.kind {
            MemberKind::Method(m) => Some(crate::tree::Function {
                member: self,
                name: &m.name,
                modifiers: &m.modifiers,
                params: &m.params,
                body: m.body.as_ref(),
                is_constructor: false,
            }),
            MemberKind::Constructor(c) => Some(crate::tree::Function {
                member: self,
                name: &c.name,
                modifiers: &c.modifiers,
                params: &c.params,
                body: c.body.as_ref(),
                is_constructor: true,
            }),
            _ => None,
        }
    }
}
