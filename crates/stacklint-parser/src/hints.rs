// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use stacklint_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        // Terminators
        ("';'", TokenKind::RBrace) => Some("the previous statement is missing its ';'"),
        ("';'", _) => Some("end statements and field declarations with ';'"),

        // Block hints
        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", _) => Some("every '{' needs a matching '}'"),
        ("'{', '=>' or ';'", _) => Some("give the member a body, an expression body, or end it with ';'"),

        // Parentheses hints
        ("'('", _) => Some("conditions and argument lists are wrapped in parentheses"),
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("')'", _) => None,

        // Bracket hints
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),
        ("']'", _) => None,

        // Generic angle bracket
        ("'>'", _) => Some("close the type argument list with '>'"),

        // Expression hints
        ("expression", TokenKind::Eq) => Some("put the value after '='"),
        ("expression", TokenKind::Semi) => Some("statement is incomplete"),
        ("expression", _) => Some("try a value, variable, or method call"),

        // Name/identifier hints
        ("a name", TokenKind::Int(..)) => Some("names can't start with a number"),
        ("a name", k) if k.is_predefined_type() || k.is_modifier() => {
            Some("prefix a keyword with '@' to use it as a name")
        }
        ("a name", _) => Some("names start with a letter or '_'"),

        // Type hints
        ("type", _) => Some("try a type like 'int', 'byte[]', or a class name"),

        // Declaration hints
        ("type declaration", _) => {
            Some("start with 'class', 'struct', 'interface', 'record', 'enum', 'namespace' or 'using'")
        }
        ("member declaration", _) => {
            Some("members are fields, methods, constructors, properties or nested types")
        }
        ("'get', 'set' or 'init'", _) => Some("property accessors are 'get', 'set' or 'init'"),

        // Array creation
        ("array size or initializer", _) => Some("write 'new T[n]' or 'new T[] { ... }'"),

        _ => None,
    }
}
