// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Symbol definitions and symbol table.

use stacklint_ast::decl::{CompilationUnit, Decl, DeclKind, MemberKind, Modifier, TypeDecl, TypeKind};
use stacklint_ast::{NodeId, Span};
use std::collections::HashMap;

/// Unique identifier for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// The kind of symbol.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    /// A class, struct, interface, record or enum.
    Type {
        kind: TypeKind,
        /// Fields, methods, constructors and nested types.
        members: Vec<SymbolId>,
    },
    /// One declarator of a field declaration.
    Field {
        owner: SymbolId,
        is_const: bool,
    },
    Method {
        owner: SymbolId,
        is_async: bool,
    },
    Constructor {
        owner: SymbolId,
    },
}

/// A declared symbol.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    /// Dotted namespace and enclosing type path ending in `name`.
    pub qualified_name: String,
    pub kind: SymbolKind,
    /// The declaring node: the type's `Decl` or `Member`, the field's
    /// declarator, or the method/constructor member.
    pub node: NodeId,
    /// Where this symbol was declared.
    pub span: Span,
}

/// Table of all symbols declared in a compilation unit.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_node: HashMap<NodeId, SymbolId>,
    types_by_name: HashMap<String, Vec<SymbolId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every type and member declaration in `unit`.
    pub fn build(unit: &CompilationUnit) -> Self {
        let mut table = Self::new();
        let mut path = Vec::new();
        table.collect_decls(&unit.decls, &mut path);
        table
    }

    /// Insert a new symbol and return its ID.
    pub fn insert(
        &mut self,
        name: String,
        qualified_name: String,
        kind: SymbolKind,
        node: NodeId,
        span: Span,
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        if matches!(kind, SymbolKind::Type { .. }) {
            self.types_by_name.entry(name.clone()).or_default().push(id);
        }
        self.by_node.insert(node, id);
        self.symbols.push(Symbol { id, name, qualified_name, kind, node, span });
        id
    }

    /// Get a symbol by ID.
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// The symbol declared by `node`, if any.
    pub fn by_node(&self, node: NodeId) -> Option<&Symbol> {
        self.by_node.get(&node).and_then(|id| self.get(*id))
    }

    /// Types with the given simple name, in declaration order.
    pub fn types_named<'s>(&'s self, name: &str) -> impl Iterator<Item = &'s Symbol> + 's {
        self.types_by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.get(*id))
    }

    /// The member of `owner` called `name`.
    pub fn member(&self, owner: SymbolId, name: &str) -> Option<&Symbol> {
        match &self.get(owner)?.kind {
            SymbolKind::Type { members, .. } => members
                .iter()
                .filter_map(|id| self.get(*id))
                .find(|s| s.name == name),
            _ => None,
        }
    }

    /// Iterate over all symbols.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn collect_decls(&mut self, decls: &[Decl], path: &mut Vec<String>) {
        for decl in decls {
            match &decl.kind {
                DeclKind::Using(_) => {}
                DeclKind::Namespace(ns) => {
                    let depth = path.len();
                    path.extend(ns.name.iter().cloned());
                    self.collect_decls(&ns.decls, path);
                    path.truncate(depth);
                }
                DeclKind::Type(ty) => {
                    self.collect_type(ty, decl.id, path);
                }
            }
        }
    }

    fn collect_type(&mut self, ty: &TypeDecl, node: NodeId, path: &mut Vec<String>) -> SymbolId {
        path.push(ty.name.clone());
        let qualified = path.join(".");
        let type_id = self.insert(
            ty.name.clone(),
            qualified.clone(),
            SymbolKind::Type { kind: ty.kind, members: Vec::new() },
            node,
            ty.name_span,
        );

        let mut members = Vec::new();
        for member in &ty.members {
            match &member.kind {
                MemberKind::Field(field) => {
                    let is_const = field.modifiers.has(Modifier::Const);
                    for d in &field.declarators {
                        members.push(self.insert(
                            d.name.clone(),
                            format!("{}.{}", qualified, d.name),
                            SymbolKind::Field { owner: type_id, is_const },
                            d.id,
                            d.name_span,
                        ));
                    }
                }
                MemberKind::Method(m) => members.push(self.insert(
                    m.name.clone(),
                    format!("{}.{}", qualified, m.name),
                    SymbolKind::Method { owner: type_id, is_async: m.modifiers.has(Modifier::Async) },
                    member.id,
                    m.name_span,
                )),
                MemberKind::Constructor(c) => members.push(self.insert(
                    c.name.clone(),
                    format!("{}.{}", qualified, c.name),
                    SymbolKind::Constructor { owner: type_id },
                    member.id,
                    c.name_span,
                )),
                MemberKind::Type(nested) => members.push(self.collect_type(nested, member.id, path)),
                MemberKind::Property(_) | MemberKind::EnumMember(_) => {}
            }
        }

        if let Some(SymbolKind::Type { members: slot, .. }) =
            self.symbols.get_mut(type_id.0 as usize).map(|s| &mut s.kind)
        {
            *slot = members;
        }
        path.pop();
        type_id
    }
}
