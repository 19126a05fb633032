// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The semantic model: type, constant and symbol queries over a syntax tree.

use stacklint_ast::decl::{DeclKind, Declarator, Member, MemberKind, Modifier, TypeDecl};
use stacklint_ast::expr::{ArgModifier, Expr, ExprKind};
use stacklint_ast::stmt::StmtKind;
use stacklint_ast::types::{TypeRef, TypeRefKind};
use stacklint_ast::{NodeId, NodeRef, SyntaxTree};
use tracing::trace;

use crate::constant::{fold_binary, fold_cast, fold_unary, ConstError, ConstValue};
use crate::symbol::SymbolTable;
use crate::types::{ArrayTypeSymbol, SpecialType, TypeSymbol};

/// What a simple or qualified name refers to.
#[derive(Debug, Clone, Copy)]
enum Binding<'a> {
    ConstLocal(&'a Declarator),
    ConstField(&'a Declarator),
    Local,
    Parameter,
    Field,
    Unresolved,
}

/// A local declaration found while binding a simple name.
#[derive(Debug, Clone, Copy)]
enum LocalDeclaration<'a> {
    Const(&'a Declarator),
    Variable,
}

/// Immutable semantic snapshot of one compilation unit.
///
/// All queries are pure; the model can be shared across threads.
pub struct SemanticModel<'a> {
    tree: &'a SyntaxTree<'a>,
    symbols: SymbolTable,
}

impl<'a> SemanticModel<'a> {
    pub fn new(tree: &'a SyntaxTree<'a>) -> Self {
        let symbols = SymbolTable::build(tree.unit());
        trace!(symbols = symbols.len(), nodes = tree.len(), "built semantic model");
        Self { tree, symbols }
    }

    pub fn tree(&self) -> &'a SyntaxTree<'a> {
        self.tree
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// The array type created by an array-creation expression.
    pub fn array_type(&self, expr: &Expr) -> Option<ArrayTypeSymbol> {
        let ExprKind::ArrayCreation { element, ranks, .. } = &expr.kind else {
            return None;
        };
        let (outer, inner) = ranks.split_first()?;

        let mut element_ty = self.resolve_type(element);
        for rank in inner.iter().rev() {
            element_ty = TypeSymbol::Array(Box::new(ArrayTypeSymbol {
                element: element_ty,
                rank: rank.sizes.len() as u32,
            }));
        }
        Some(ArrayTypeSymbol { element: element_ty, rank: outer.sizes.len() as u32 })
    }

    /// Resolve a written type. Declared types shadow the runtime's.
    pub fn resolve_type(&self, ty: &TypeRef) -> TypeSymbol {
        match &ty.kind {
            TypeRefKind::Predefined(p) => TypeSymbol::Special(SpecialType::from_predefined(*p)),
            TypeRefKind::Named { path, args } => {
                let Some(last) = path.last() else {
                    return TypeSymbol::Unknown;
                };
                if let Some(declared) = self.find_type(path) {
                    return TypeSymbol::Named(declared.to_string());
                }
                let system_path = path.len() == 1 || (path.len() == 2 && path[0] == "System");
                if !args.is_empty() || !system_path {
                    return TypeSymbol::Unknown;
                }
                let special = match last.as_str() {
                    "nint" if path.len() == 1 => Some(SpecialType::IntPtr),
                    "nuint" if path.len() == 1 => Some(SpecialType::UIntPtr),
                    name => SpecialType::from_metadata_name(name),
                };
                special.map(TypeSymbol::Special).unwrap_or(TypeSymbol::Unknown)
            }
            TypeRefKind::Array { element, ranks } => {
                let mut symbol = self.resolve_type(element);
                for &rank in ranks.iter().rev() {
                    symbol = TypeSymbol::Array(Box::new(ArrayTypeSymbol { element: symbol, rank }));
                }
                symbol
            }
            TypeRefKind::Pointer(inner) => TypeSymbol::Pointer(Box::new(self.resolve_type(inner))),
            TypeRefKind::Nullable(inner) => TypeSymbol::Nullable(Box::new(self.resolve_type(inner))),
        }
    }

    /// Qualified name of the declared type matching a (possibly dotted) path.
    fn find_type(&self, path: &[String]) -> Option<&str> {
        let last = path.last()?;
        let suffix = path.join(".");
        self.symbols
            .types_named(last)
            .find(|s| {
                s.qualified_name == suffix || s.qualified_name.ends_with(&format!(".{}", suffix))
            })
            .map(|s| s.qualified_name.as_str())
    }

    // =========================================================================
    // Constants
    // =========================================================================

    /// The compile-time value of `expr`, if it has one.
    pub fn constant_value(&self, expr: &Expr) -> Option<ConstValue> {
        match self.evaluate_constant(expr) {
            Ok(value) => Some(value),
            Err(err) => {
                trace!(node = expr.id.0, %err, "not a constant");
                None
            }
        }
    }

    /// Fold `expr` to a constant, reporting why folding failed.
    pub fn evaluate_constant(&self, expr: &Expr) -> Result<ConstValue, ConstError> {
        let mut visiting = Vec::new();
        self.eval(expr, &mut visiting)
    }

    /// True if `expr` names a `const` field or local, whatever its value.
    pub fn is_constant_reference(&self, expr: &Expr) -> bool {
        matches!(self.bind(expr), Binding::ConstLocal(_) | Binding::ConstField(_))
    }

    fn eval(&self, expr: &Expr, visiting: &mut Vec<NodeId>) -> Result<ConstValue, ConstError> {
        match &expr.kind {
            ExprKind::Int(v, _) => Ok(ConstValue::Int(*v as i128)),
            ExprKind::Real(v, _) => Ok(ConstValue::Real(*v)),
            ExprKind::Bool(b) => Ok(ConstValue::Bool(*b)),
            ExprKind::Char(c) => Ok(ConstValue::Char(*c)),
            ExprKind::String(s) => Ok(ConstValue::String(s.clone())),
            ExprKind::Null => Ok(ConstValue::Null),
            ExprKind::Paren(inner) => self.eval(inner, visiting),
            ExprKind::Unary { op, operand } => fold_unary(*op, self.eval(operand, visiting)?),
            ExprKind::Binary { op, left, right } => {
                let l = self.eval(left, visiting)?;
                let r = self.eval(right, visiting)?;
                fold_binary(*op, l, r)
            }
            ExprKind::Conditional { cond, then_expr, else_expr } => {
                let cond = self.eval(cond, visiting)?.as_bool().ok_or(ConstError::NotConstant)?;
                self.eval(if cond { then_expr } else { else_expr }, visiting)
            }
            ExprKind::Cast { ty, expr: inner } => {
                let value = self.eval(inner, visiting)?;
                match self.resolve_type(ty) {
                    TypeSymbol::Special(target) => fold_cast(target, value),
                    _ => Err(ConstError::NotConstant),
                }
            }
            ExprKind::Ident(_) | ExprKind::Member { .. } => match self.bind(expr) {
                Binding::ConstLocal(d) | Binding::ConstField(d) => self.eval_declarator(d, visiting),
                _ => Err(ConstError::NotConstant),
            },
            _ => Err(ConstError::NotConstant),
        }
    }

    fn eval_declarator(
        &self,
        d: &'a Declarator,
        visiting: &mut Vec<NodeId>,
    ) -> Result<ConstValue, ConstError> {
        if visiting.contains(&d.id) {
            return Err(ConstError::Cycle { name: d.name.clone() });
        }
        let init = d.init.as_ref().ok_or(ConstError::NotConstant)?;
        visiting.push(d.id);
        let value = self.eval(&init.value, visiting);
        visiting.pop();
        value
    }

    // =========================================================================
    // Name Binding
    // =========================================================================

    fn bind(&self, expr: &Expr) -> Binding<'a> {
        match &expr.kind {
            ExprKind::Ident(name) => self.bind_simple(expr.id, name),
            ExprKind::Member { object, name, conditional: false } => match dotted_path(object) {
                Some(path) => self.bind_qualified(&path, name),
                None => Binding::Unresolved,
            },
            ExprKind::Paren(inner) => self.bind(inner),
            _ => Binding::Unresolved,
        }
    }

    /// Resolve a simple name at `at`: locals and parameters of the enclosing
    /// function first, then fields of the enclosing types, innermost first.
    ///
    /// A local only binds as a constant when it is the function's sole
    /// declaration of `name`, a `const`, and declared earlier in a block that
    /// encloses `at`. Any other local declaration of the name (another block,
    /// an `out` variable, a pattern) makes the name a plain local.
    fn bind_simple(&self, at: NodeId, name: &str) -> Binding<'a> {
        if let Some(function) = self.tree.ancestors(at).find_map(|n| n.as_function()) {
            if function.params.iter().any(|p| p.name == name) {
                return Binding::Parameter;
            }
            let declared = self.local_declarations(function.member, name);
            match declared.as_slice() {
                [] => {}
                [LocalDeclaration::Const(d)] if self.in_scope(d, at) => return Binding::ConstLocal(d),
                _ => return Binding::Local,
            }
        }

        for ty in self.tree.ancestors(at).filter_map(|n| type_decl(&n)) {
            if let Some(binding) = field_binding(ty, name) {
                return binding;
            }
        }
        Binding::Unresolved
    }

    /// Every local of `name` declared anywhere in `member`.
    fn local_declarations(&self, member: &'a Member, name: &str) -> Vec<LocalDeclaration<'a>> {
        let mut found = Vec::new();
        for node in SyntaxTree::descendants(NodeRef::Member(member)) {
            match node {
                NodeRef::Declarator(d) if d.name == name => {
                    let is_const = self
                        .tree
                        .parent(d.id)
                        .and_then(|p| p.as_stmt())
                        .map(|s| matches!(&s.kind, StmtKind::Local(local) if local.is_const))
                        .unwrap_or(false);
                    found.push(if is_const { LocalDeclaration::Const(d) } else { LocalDeclaration::Variable });
                }
                NodeRef::Stmt(s) => match &s.kind {
                    StmtKind::ForEach { name: var, .. } if var == name => found.push(LocalDeclaration::Variable),
                    StmtKind::Try { catches, .. } => found.extend(
                        catches
                            .iter()
                            .filter(|c| c.name.as_deref() == Some(name))
                            .map(|_| LocalDeclaration::Variable),
                    ),
                    _ => {}
                },
                NodeRef::Expr(e) => match &e.kind {
                    ExprKind::Is { designation: Some(var), .. } if var == name => {
                        found.push(LocalDeclaration::Variable)
                    }
                    ExprKind::Invocation { args, .. }
                    | ExprKind::ElementAccess { args, .. }
                    | ExprKind::ObjectCreation { args, .. } => found.extend(
                        args.iter()
                            .filter(|a| a.modifier == Some(ArgModifier::Out))
                            .filter(|a| matches!(&a.expr.kind, ExprKind::Ident(n) if n == name))
                            .map(|_| LocalDeclaration::Variable),
                    ),
                    _ => {}
                },
                _ => {}
            }
        }
        found
    }

    /// `d` is visible at `at`: its scope encloses `at` and it comes first.
    fn in_scope(&self, d: &Declarator, at: NodeId) -> bool {
        let Some(scope) = self.tree.parent(d.id).and_then(|stmt| self.tree.parent(stmt.id())) else {
            return false;
        };
        let Some(use_site) = self.tree.node(at) else {
            return false;
        };
        d.span.end <= use_site.span().start
            && self.tree.ancestors(at).any(|n| n.id() == scope.id())
    }

    /// Resolve `Type.Name` or `Outer.Type.Name` against declared types.
    fn bind_qualified(&self, type_path: &[String], name: &str) -> Binding<'a> {
        let Some(last) = type_path.last() else {
            return Binding::Unresolved;
        };
        let suffix = type_path.join(".");
        let found = self.symbols.types_named(last).find(|s| {
            s.qualified_name == suffix || s.qualified_name.ends_with(&format!(".{}", suffix))
        });
        found
            .and_then(|s| self.tree.node(s.node))
            .and_then(|n| type_decl(&n))
            .and_then(|ty| field_binding(ty, name))
            .unwrap_or(Binding::Unresolved)
    }
}

/// The type declared by a node, for top-level and nested declarations.
fn type_decl<'a>(node: &NodeRef<'a>) -> Option<&'a TypeDecl> {
    match node {
        NodeRef::Decl(d) => match &d.kind {
            DeclKind::Type(t) => Some(t),
            _ => None,
        },
        NodeRef::Member(m) => match &m.kind {
            MemberKind::Type(t) => Some(t),
            _ => None,
        },
        _ => None,
    }
}

fn field_binding<'a>(ty: &'a TypeDecl, name: &str) -> Option<Binding<'a>> {
    ty.members.iter().find_map(|member| match &member.kind {
        MemberKind::Field(field) => field.declarators.iter().find(|d| d.name == name).map(|d| {
            if field.modifiers.has(Modifier::Const) {
                Binding::ConstField(d)
            } else {
                Binding::Field
            }
        }),
        _ => None,
    })
}

/// `A.B.C` as `["A", "B", "C"]`; `None` for anything but names and member access.
fn dotted_path(expr: &Expr) -> Option<Vec<String>> {
    match &expr.kind {
        ExprKind::Ident(name) => Some(vec![name.clone()]),
        ExprKind::Member { object, name, conditional: false } => {
            let mut path = dotted_path(object)?;
            path.push(name.clone());
            Some(path)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_paths() {
        let ident = |name: &str| Expr {
            id: NodeId::DUMMY,
            kind: ExprKind::Ident(name.to_string()),
            span: Default::default(),
        };
        let member = Expr {
            id: NodeId::DUMMY,
            kind: ExprKind::Member { object: Box::new(ident("Outer")), name: "Sizes".into(), conditional: false },
            span: Default::default(),
        };
        assert_eq!(dotted_path(&member), Some(vec!["Outer".to_string(), "Sizes".to_string()]));
        assert_eq!(
            dotted_path(&Expr { id: NodeId::DUMMY, kind: ExprKind::This, span: Default::default() }),
            None
        );
    }
}
