// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type syntax.

use std::fmt;

use crate::Span;

/// A type as written in source.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub span: Span,
}

/// The kind of type reference.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRefKind {
    /// Keyword type (`int`, `byte`, `object`)
    Predefined(PredefinedType),
    /// Possibly qualified name with type arguments (`System.Int32`, `List<int>`)
    Named { path: Vec<String>, args: Vec<TypeRef> },
    /// Array type; each entry is the dimension count of one rank specifier,
    /// so `int[][,]` has `ranks == [1, 2]`
    Array { element: Box<TypeRef>, ranks: Vec<u32> },
    /// Pointer type (`byte*`)
    Pointer(Box<TypeRef>),
    /// Nullable type (`int?`)
    Nullable(Box<TypeRef>),
}

/// The keyword types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredefinedType {
    Bool,
    Byte,
    SByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Char,
    Float,
    Double,
    Decimal,
    Object,
    String,
    Void,
}

impl PredefinedType {
    pub fn keyword(self) -> &'static str {
        match self {
            PredefinedType::Bool => "bool",
            PredefinedType::Byte => "byte",
            PredefinedType::SByte => "sbyte",
            PredefinedType::Short => "short",
            PredefinedType::UShort => "ushort",
            PredefinedType::Int => "int",
            PredefinedType::UInt => "uint",
            PredefinedType::Long => "long",
            PredefinedType::ULong => "ulong",
            PredefinedType::Char => "char",
            PredefinedType::Float => "float",
            PredefinedType::Double => "double",
            PredefinedType::Decimal => "decimal",
            PredefinedType::Object => "object",
            PredefinedType::String => "string",
            PredefinedType::Void => "void",
        }
    }
}

impl TypeRef {
    pub fn new(kind: TypeRefKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// True for the contextual `var` keyword in a local declaration.
    pub fn is_var(&self) -> bool {
        matches!(&self.kind, TypeRefKind::Named { path, args } if args.is_empty() && path.len() == 1 && path[0] == "var")
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeRefKind::Predefined(p) => f.write_str(p.keyword()),
            TypeRefKind::Named { path, args } => {
                f.write_str(&path.join("."))?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeRefKind::Array { element, ranks } => {
                write!(f, "{}", element)?;
                for &dims in ranks {
                    f.write_str("[")?;
                    for _ in 1..dims {
                        f.write_str(",")?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
            TypeRefKind::Pointer(inner) => write!(f, "{}*", inner),
            TypeRefKind::Nullable(inner) => write!(f, "{}?", inner),
        }
    }
}
