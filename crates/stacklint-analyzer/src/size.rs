// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Size evaluator: element width times element count, against a threshold.

use stacklint_ast::expr::{ArraySize, ExprKind};
use stacklint_semantic::{SemanticModel, TypeSymbol};
use std::fmt;

use crate::site::AllocationSite;

/// Largest allocation, in bytes, that is suggested for the stack.
pub const SIZE_THRESHOLD: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeVerdict {
    Sized(u64),
    ExceedsThreshold(u64),
    Indeterminate(SizeFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeFailure {
    /// The creation has no resolvable array type.
    Unresolved,
    /// Multi-dimensional or jagged.
    Rank,
    /// The count is neither a literal nor a constant, or is negative.
    NonConstantCount,
}

impl fmt::Display for SizeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SizeFailure::Unresolved => "array type did not resolve",
            SizeFailure::Rank => "array has more than one dimension",
            SizeFailure::NonConstantCount => "element count is not a compile-time constant",
        })
    }
}

/// Byte widths of element types, keyed by runtime metadata name.
#[derive(Debug, Clone, Copy)]
pub struct ElementSizeTable {
    entries: &'static [(&'static str, u64)],
}

impl ElementSizeTable {
    /// Width of any type missing from the table. Always fails the threshold.
    pub const UNBOUNDED: u64 = u64::MAX;

    pub const fn standard() -> Self {
        Self {
            entries: &[
                ("Boolean", 1),
                ("Byte", 1),
                ("SByte", 1),
                ("Int16", 2),
                ("UInt16", 2),
                ("Char", 2),
                ("Half", 2),
                ("Int32", 4),
                ("UInt32", 4),
                ("Single", 4),
                ("Int64", 8),
                ("UInt64", 8),
                ("Double", 8),
                ("Decimal", 16),
            ],
        }
    }

    pub fn width_by_name(&self, metadata_name: &str) -> u64 {
        self.entries
            .iter()
            .find(|(name, _)| *name == metadata_name)
            .map(|&(_, width)| width)
            .unwrap_or(Self::UNBOUNDED)
    }

    /// Only runtime special types are in the table; declared types with the
    /// same simple name are not.
    pub fn width(&self, ty: &TypeSymbol) -> u64 {
        match ty.as_special() {
            Some(special) => self.width_by_name(special.metadata_name()),
            None => Self::UNBOUNDED,
        }
    }
}

impl Default for ElementSizeTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Compute the byte size of an eligible allocation.
pub fn evaluate(site: &AllocationSite<'_>, model: &SemanticModel<'_>, table: &ElementSizeTable) -> SizeVerdict {
    let Some(array) = model.array_type(site.expr) else {
        return SizeVerdict::Indeterminate(SizeFailure::Unresolved);
    };
    if array.rank > 1 || array.is_jagged() {
        return SizeVerdict::Indeterminate(SizeFailure::Rank);
    }

    let Some(count) = element_count(site, model) else {
        return SizeVerdict::Indeterminate(SizeFailure::NonConstantCount);
    };

    let width = table.width(&array.element);
    if width == ElementSizeTable::UNBOUNDED {
        return SizeVerdict::ExceedsThreshold(width);
    }

    let bytes = width.saturating_mul(count);
    if bytes > SIZE_THRESHOLD {
        SizeVerdict::ExceedsThreshold(bytes)
    } else {
        SizeVerdict::Sized(bytes)
    }
}

/// Explicit dimension if present, else the initializer length.
fn element_count(site: &AllocationSite<'_>, model: &SemanticModel<'_>) -> Option<u64> {
    let size = site.ranks.first()?.sizes.first()?;
    match size {
        ArraySize::Omitted => site.initializer.map(|elements| elements.len() as u64),
        ArraySize::Expr(expr) => {
            let expr = expr.unparenthesized();
            let value = match &expr.kind {
                ExprKind::Int(value, _) => *value as i128,
                _ if model.is_constant_reference(expr) => model.constant_value(expr)?.as_int()?,
                _ => return None,
            };
            u64::try_from(value).ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacklint_semantic::SpecialType;

    #[test]
    fn table_widths() {
        let table = ElementSizeTable::standard();
        assert_eq!(table.width(&TypeSymbol::Special(SpecialType::Byte)), 1);
        assert_eq!(table.width(&TypeSymbol::Special(SpecialType::Char)), 2);
        assert_eq!(table.width(&TypeSymbol::Special(SpecialType::Single)), 4);
        assert_eq!(table.width(&TypeSymbol::Special(SpecialType::Double)), 8);
        assert_eq!(table.width(&TypeSymbol::Special(SpecialType::Decimal)), 16);
    }

    #[test]
    fn unknown_types_are_unbounded() {
        let table = ElementSizeTable::default();
        assert_eq!(table.width(&TypeSymbol::Special(SpecialType::Object)), ElementSizeTable::UNBOUNDED);
        assert_eq!(table.width(&TypeSymbol::Special(SpecialType::IntPtr)), ElementSizeTable::UNBOUNDED);
        assert_eq!(table.width(&TypeSymbol::Named("Byte".into())), ElementSizeTable::UNBOUNDED);
        assert_eq!(table.width(&TypeSymbol::Unknown), ElementSizeTable::UNBOUNDED);
        assert_eq!(table.width_by_name("Guid"), ElementSizeTable::UNBOUNDED);
    }
}
