// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Syntax tree types for the C# subset analyzed by stacklint.
//!
//! This crate defines the nodes shared between the lexer, parser,
//! semantic model and analyzer, plus [`SyntaxTree`], a read-only index
//! over a parsed compilation unit that answers parent and ancestor
//! queries.

pub mod span;
pub mod token;
pub mod types;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod tree;

pub use span::{Span, LineMap};
pub use tree::{Ancestors, Descendants, Function, NodeRef, SyntaxTree};

/// Unique identifier for syntax nodes.
///
/// Assigned by the parser in creation order; used as the key for parent
/// links and semantic lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}
