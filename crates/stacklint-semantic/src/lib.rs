// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Symbol resolution for the C# subset analyzed by stacklint.
//!
//! Builds a [`SymbolTable`] of declared types and members, and answers the
//! queries the analyzer needs through [`SemanticModel`]: the array type of a
//! creation expression, the constant value of an expression, and whether a
//! name refers to a constant.

mod constant;
mod model;
mod symbol;
mod types;

pub use constant::{fold_binary, fold_cast, fold_unary, ConstError, ConstValue};
pub use model::SemanticModel;
pub use symbol::{Symbol, SymbolId, SymbolKind, SymbolTable};
pub use types::{ArrayTypeSymbol, SpecialType, TypeSymbol};
