// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolved type symbols.

use stacklint_ast::types::PredefinedType;
use std::fmt;

/// Runtime types with a fixed identity, named by their metadata name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialType {
    Boolean,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Char,
    Half,
    Single,
    Double,
    Decimal,
    IntPtr,
    UIntPtr,
    Object,
    String,
    Void,
}

impl SpecialType {
    /// The runtime name, without namespace (`Int32` for `int`).
    pub fn metadata_name(self) -> &'static str {
        match self {
            SpecialType::Boolean => "Boolean",
            SpecialType::Byte => "Byte",
            SpecialType::SByte => "SByte",
            SpecialType::Int16 => "Int16",
            SpecialType::UInt16 => "UInt16",
            SpecialType::Int32 => "Int32",
            SpecialType::UInt32 => "UInt32",
            SpecialType::Int64 => "Int64",
            SpecialType::UInt64 => "UInt64",
            SpecialType::Char => "Char",
            SpecialType::Half => "Half",
            SpecialType::Single => "Single",
            SpecialType::Double => "Double",
            SpecialType::Decimal => "Decimal",
            SpecialType::IntPtr => "IntPtr",
            SpecialType::UIntPtr => "UIntPtr",
            SpecialType::Object => "Object",
            SpecialType::String => "String",
            SpecialType::Void => "Void",
        }
    }

    pub fn from_predefined(ty: PredefinedType) -> Self {
        match ty {
            PredefinedType::Bool => SpecialType::Boolean,
            PredefinedType::Byte => SpecialType::Byte,
            PredefinedType::SByte => SpecialType::SByte,
            PredefinedType::Short => SpecialType::Int16,
            PredefinedType::UShort => SpecialType::UInt16,
            PredefinedType::Int => SpecialType::Int32,
            PredefinedType::UInt => SpecialType::UInt32,
            PredefinedType::Long => SpecialType::Int64,
            PredefinedType::ULong => SpecialType::UInt64,
            PredefinedType::Char => SpecialType::Char,
            PredefinedType::Float => SpecialType::Single,
            PredefinedType::Double => SpecialType::Double,
            PredefinedType::Decimal => SpecialType::Decimal,
            PredefinedType::Object => SpecialType::Object,
            PredefinedType::String => SpecialType::String,
            PredefinedType::Void => SpecialType::Void,
        }
    }

    /// Inverse of [`metadata_name`](Self::metadata_name).
    pub fn from_metadata_name(name: &str) -> Option<Self> {
        Some(match name {
            "Boolean" => SpecialType::Boolean,
            "Byte" => SpecialType::Byte,
            "SByte" => SpecialType::SByte,
            "Int16" => SpecialType::Int16,
            "UInt16" => SpecialType::UInt16,
            "Int32" => SpecialType::Int32,
            "UInt32" => SpecialType::UInt32,
            "Int64" => SpecialType::Int64,
            "UInt64" => SpecialType::UInt64,
            "Char" => SpecialType::Char,
            "Half" => SpecialType::Half,
            "Single" => SpecialType::Single,
            "Double" => SpecialType::Double,
            "Decimal" => SpecialType::Decimal,
            "IntPtr" => SpecialType::IntPtr,
            "UIntPtr" => SpecialType::UIntPtr,
            "Object" => SpecialType::Object,
            "String" => SpecialType::String,
            "Void" => SpecialType::Void,
            _ => return None,
        })
    }

    /// Inclusive value range for integral types.
    pub fn integral_range(self) -> Option<(i128, i128)> {
        Some(match self {
            SpecialType::Byte => (0, u8::MAX as i128),
            SpecialType::SByte => (i8::MIN as i128, i8::MAX as i128),
            SpecialType::Int16 => (i16::MIN as i128, i16::MAX as i128),
            SpecialType::UInt16 | SpecialType::Char => (0, u16::MAX as i128),
            SpecialType::Int32 => (i32::MIN as i128, i32::MAX as i128),
            SpecialType::UInt32 => (0, u32::MAX as i128),
            SpecialType::Int64 | SpecialType::IntPtr => (i64::MIN as i128, i64::MAX as i128),
            SpecialType::UInt64 | SpecialType::UIntPtr => (0, u64::MAX as i128),
            _ => return None,
        })
    }
}

/// The resolved type of a type reference or expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSymbol {
    Special(SpecialType),
    /// A type declared in the analyzed source, by qualified name.
    Named(String),
    Array(Box<ArrayTypeSymbol>),
    Pointer(Box<TypeSymbol>),
    Nullable(Box<TypeSymbol>),
    Unknown,
}

impl TypeSymbol {
    pub fn as_special(&self) -> Option<SpecialType> {
        match self {
            TypeSymbol::Special(s) => Some(*s),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeSymbol::Array(_))
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSymbol::Special(s) => write!(f, "System.{}", s.metadata_name()),
            TypeSymbol::Named(name) => f.write_str(name),
            TypeSymbol::Array(array) => write!(f, "{}", array),
            TypeSymbol::Pointer(inner) => write!(f, "{}*", inner),
            TypeSymbol::Nullable(inner) => write!(f, "{}?", inner),
            TypeSymbol::Unknown => f.write_str("?"),
        }
    }
}

/// An array type: element type plus the dimension count of the outermost
/// rank specifier. `int[][,]` is rank 1 with element `int[,]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayTypeSymbol {
    pub element: TypeSymbol,
    pub rank: u32,
}

impl ArrayTypeSymbol {
    /// Jagged arrays have an array element type.
    pub fn is_jagged(&self) -> bool {
        self.element.is_array()
    }
}

impl fmt::Display for ArrayTypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Specifiers print outermost first, so peel nested arrays off the element
        let mut ranks = vec![self.rank];
        let mut element = &self.element;
        while let TypeSymbol::Array(inner) = element {
            ranks.push(inner.rank);
            element = &inner.element;
        }
        write!(f, "{}", element)?;
        for rank in ranks {
            f.write_str("[")?;
            for _ in 1..rank {
                f.write_str(",")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_names_round_trip() {
        for ty in [
            SpecialType::Boolean,
            SpecialType::Byte,
            SpecialType::Int32,
            SpecialType::Single,
            SpecialType::Decimal,
            SpecialType::Half,
        ] {
            assert_eq!(SpecialType::from_metadata_name(ty.metadata_name()), Some(ty));
        }
        assert_eq!(SpecialType::from_metadata_name("Guid"), None);
    }

    #[test]
    fn predefined_keywords_map_to_runtime_types() {
        assert_eq!(SpecialType::from_predefined(PredefinedType::Int), SpecialType::Int32);
        assert_eq!(SpecialType::from_predefined(PredefinedType::Float), SpecialType::Single);
        assert_eq!(SpecialType::from_predefined(PredefinedType::Bool), SpecialType::Boolean);
    }

    #[test]
    fn jagged_display() {
        let inner = ArrayTypeSymbol { element: TypeSymbol::Special(SpecialType::Int32), rank: 2 };
        let outer = ArrayTypeSymbol { element: TypeSymbol::Array(Box::new(inner)), rank: 1 };
        assert!(outer.is_jagged());
        assert_eq!(outer.to_string(), "System.Int32[][,]");
    }
}
