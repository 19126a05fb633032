// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use logos::Logos;
use stacklint_ast::token::{IntSuffix, RealSuffix, Token, TokenKind};
use stacklint_ast::Span;
use thiserror::Error;

/// Raw token type for logos - we parse values in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    // === Keywords ===
    #[token("using")]
    Using,
    #[token("namespace")]
    Namespace,
    #[token("class")]
    Class,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("record")]
    Record,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("internal")]
    Internal,
    #[token("static")]
    Static,
    #[token("const")]
    Const,
    #[token("readonly")]
    Readonly,
    #[token("unsafe")]
    Unsafe,
    #[token("abstract")]
    Abstract,
    #[token("virtual")]
    Virtual,
    #[token("override")]
    Override,
    #[token("sealed")]
    Sealed,
    #[token("extern")]
    Extern,
    #[token("volatile")]
    Volatile,
    #[token("new")]
    New,
    #[token("bool")]
    BoolKw,
    #[token("byte")]
    Byte,
    #[token("sbyte")]
    SByte,
    #[token("short")]
    Short,
    #[token("ushort")]
    UShort,
    #[token("int")]
    IntKw,
    #[token("uint")]
    UInt,
    #[token("long")]
    Long,
    #[token("ulong")]
    ULong,
    #[token("char")]
    CharKw,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("decimal")]
    Decimal,
    #[token("object")]
    Object,
    #[token("string")]
    StringKw,
    #[token("void")]
    Void,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("foreach")]
    Foreach,
    #[token("in")]
    In,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("throw")]
    Throw,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("this")]
    This,
    #[token("base")]
    Base,
    #[token("typeof")]
    Typeof,
    #[token("sizeof")]
    Sizeof,
    #[token("default")]
    Default,
    #[token("stackalloc")]
    Stackalloc,
    #[token("is")]
    Is,
    #[token("as")]
    As,
    #[token("ref")]
    Ref,
    #[token("out")]
    Out,
    #[token("params")]
    Params,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Operators (order matters - longer first) ===
    // Three-character operators
    #[token("<<=")]
    LtLtEq,
    #[token(">>=")]
    GtGtEq,
    #[token("??=")]
    QuestionQuestionEq,

    // Two-character operators
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("??")]
    QuestionQuestion,
    #[token("?.")]
    QuestionDot,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("::")]
    ColonColon,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,

    // Single-character operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,

    // === Trivia (skipped) ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // #region, #if, #pragma, ... are dropped without evaluating conditions
    #[regex(r"#[^\n]*", logos::skip)]
    Directive,

    // === Literals ===
    #[regex(r"0[xX][0-9a-fA-F_]+([uU][lL]?|[lL][uU]?)?")]
    HexInt,

    #[regex(r"0[bB][01_]+([uU][lL]?|[lL][uU]?)?")]
    BinInt,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFdDmM]?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[fFdDmM]?")]
    #[regex(r"[0-9][0-9_]*[fFdDmM]")]
    Real,

    #[regex(r"[0-9][0-9_]*([uU][lL]?|[lL][uU]?)?")]
    DecInt,

    #[regex(r"'([^'\\\n]|\\[^ux\n]|\\u[0-9a-fA-F]{4}|\\x[0-9a-fA-F]{1,4})'")]
    Char,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,

    #[regex(r#"@"([^"]|"")*""#)]
    VerbatimString,

    // Holes are not tokenized; the whole literal is one string token
    #[regex(r#"\$"([^"\\\n]|\\[^\n])*""#)]
    InterpolatedString,

    #[regex(r#"(\$@|@\$)"([^"]|"")*""#)]
    InterpolatedVerbatimString,

    // === Identifier (must come after keywords) ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // `@class` names an identifier spelled like a keyword
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*")]
    VerbatimIdent,
}

/// Skip a block comment. C# block comments do not nest.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> logos::Skip {
    let remainder = lexer.remainder();
    let consumed = match remainder.find("*/") {
        Some(end) => end + 2,
        None => remainder.len(),
    };
    lexer.bump(consumed);
    logos::Skip
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The lexer for C# source code.
pub struct Lexer<'a> {
    source: &'a str,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self { source, errors: Vec::new() }
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut logos_lexer = RawToken::lexer(self.source);

        while let Some(result) = logos_lexer.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let span = logos_lexer.span();
            let slice = logos_lexer.slice();

            let kind = match result {
                Ok(raw) => match convert_token(raw, slice, span.start, span.end) {
                    Ok(kind) => kind,
                    Err(e) => {
                        self.errors.push(e);
                        continue;
                    }
                },
                Err(()) => {
                    let ch = self.source[span.start..].chars().next().unwrap_or('?');
                    self.errors.push(LexError::unexpected_char(ch, span.start, slice));
                    continue;
                }
            };

            tokens.push(Token { kind, span: Span::new(span.start, span.end) });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.source.len(), self.source.len()),
        });

        LexResult { tokens, errors: std::mem::take(&mut self.errors) }
    }
}

/// Convert a raw logos token to our TokenKind, parsing literals.
fn convert_token(raw: RawToken, slice: &str, start: usize, end: usize) -> Result<TokenKind, LexError> {
    Ok(match raw {
        // Keywords
        RawToken::Using => TokenKind::Using,
        RawToken::Namespace => TokenKind::Namespace,
        RawToken::Class => TokenKind::Class,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Interface => TokenKind::Interface,
        RawToken::Enum => TokenKind::Enum,
        RawToken::Record => TokenKind::Record,
        RawToken::Public => TokenKind::Public,
        RawToken::Private => TokenKind::Private,
        RawToken::Protected => TokenKind::Protected,
        RawToken::Internal => TokenKind::Internal,
        RawToken::Static => TokenKind::Static,
        RawToken::Const => TokenKind::Const,
        RawToken::Readonly => TokenKind::Readonly,
        RawToken::Unsafe => TokenKind::Unsafe,
        RawToken::Abstract => TokenKind::Abstract,
        RawToken::Virtual => TokenKind::Virtual,
        RawToken::Override => TokenKind::Override,
        RawToken::Sealed => TokenKind::Sealed,
        RawToken::Extern => TokenKind::Extern,
        RawToken::Volatile => TokenKind::Volatile,
        RawToken::New => TokenKind::New,
        RawToken::BoolKw => TokenKind::BoolKw,
        RawToken::Byte => TokenKind::Byte,
        RawToken::SByte => TokenKind::SByte,
        RawToken::Short => TokenKind::Short,
        RawToken::UShort => TokenKind::UShort,
        RawToken::IntKw => TokenKind::IntKw,
        RawToken::UInt => TokenKind::UInt,
        RawToken::Long => TokenKind::Long,
        RawToken::ULong => TokenKind::ULong,
        RawToken::CharKw => TokenKind::CharKw,
        RawToken::Float => TokenKind::Float,
        RawToken::Double => TokenKind::Double,
        RawToken::Decimal => TokenKind::Decimal,
        RawToken::Object => TokenKind::Object,
        RawToken::StringKw => TokenKind::StringKw,
        RawToken::Void => TokenKind::Void,
        RawToken::Return => TokenKind::Return,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::For => TokenKind::For,
        RawToken::Foreach => TokenKind::Foreach,
        RawToken::In => TokenKind::In,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Throw => TokenKind::Throw,
        RawToken::Try => TokenKind::Try,
        RawToken::Catch => TokenKind::Catch,
        RawToken::Finally => TokenKind::Finally,
        RawToken::This => TokenKind::This,
        RawToken::Base => TokenKind::Base,
        RawToken::Typeof => TokenKind::Typeof,
        RawToken::Sizeof => TokenKind::Sizeof,
        RawToken::Default => TokenKind::Default,
        RawToken::Stackalloc => TokenKind::Stackalloc,
        RawToken::Is => TokenKind::Is,
        RawToken::As => TokenKind::As,
        RawToken::Ref => TokenKind::Ref,
        RawToken::Out => TokenKind::Out,
        RawToken::Params => TokenKind::Params,
        RawToken::True => TokenKind::Bool(true),
        RawToken::False => TokenKind::Bool(false),
        RawToken::Null => TokenKind::Null,

        // Operators
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Eq => TokenKind::Eq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::BangEq => TokenKind::BangEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Question => TokenKind::Question,
        RawToken::QuestionQuestion => TokenKind::QuestionQuestion,
        RawToken::QuestionQuestionEq => TokenKind::QuestionQuestionEq,
        RawToken::QuestionDot => TokenKind::QuestionDot,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::LtLt => TokenKind::LtLt,
        RawToken::GtGt => TokenKind::GtGt,
        RawToken::ColonColon => TokenKind::ColonColon,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::AmpEq => TokenKind::AmpEq,
        RawToken::PipeEq => TokenKind::PipeEq,
        RawToken::CaretEq => TokenKind::CaretEq,
        RawToken::LtLtEq => TokenKind::LtLtEq,
        RawToken::GtGtEq => TokenKind::GtGtEq,

        // Delimiters
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,

        // Literals - parse the values
        RawToken::DecInt => {
            let (digits, suffix) = split_int_suffix(slice);
            TokenKind::Int(parse_radix(digits, 10, start, end)?, suffix)
        }
        RawToken::HexInt => {
            let (digits, suffix) = split_int_suffix(slice);
            TokenKind::Int(parse_radix(&digits[2..], 16, start, end)?, suffix)
        }
        RawToken::BinInt => {
            let (digits, suffix) = split_int_suffix(slice);
            TokenKind::Int(parse_radix(&digits[2..], 2, start, end)?, suffix)
        }
        RawToken::Real => {
            let suffix = match slice.chars().last() {
                Some('f' | 'F') => Some(RealSuffix::F),
                Some('d' | 'D') => Some(RealSuffix::D),
                Some('m' | 'M') => Some(RealSuffix::M),
                _ => None,
            };
            let body = if suffix.is_some() { &slice[..slice.len() - 1] } else { slice };
            let cleaned: String = body.chars().filter(|c| *c != '_').collect();
            let value = cleaned.parse::<f64>().map_err(|_| LexError::invalid_number(start, end))?;
            TokenKind::Real(value, suffix)
        }
        RawToken::Char => {
            let inner = &slice[1..slice.len() - 1];
            TokenKind::Char(parse_char(inner, start)?)
        }
        RawToken::String => {
            let inner = &slice[1..slice.len() - 1];
            TokenKind::String(parse_string(inner, start)?)
        }
        RawToken::InterpolatedString => {
            let inner = &slice[2..slice.len() - 1];
            TokenKind::String(parse_string(inner, start)?)
        }
        RawToken::VerbatimString => TokenKind::String(slice[2..slice.len() - 1].replace("\"\"", "\"")),
        RawToken::InterpolatedVerbatimString => {
            TokenKind::String(slice[3..slice.len() - 1].replace("\"\"", "\""))
        }
        RawToken::Ident => TokenKind::Ident(slice.to_string()),
        RawToken::VerbatimIdent => TokenKind::Ident(slice[1..].to_string()),

        RawToken::LineComment | RawToken::BlockComment | RawToken::Directive => {
            return Err(LexError::unexpected_char(
                slice.chars().next().unwrap_or('?'),
                start,
                slice,
            ));
        }
    })
}

/// Split `123UL` into `("123", Some(UL))`.
fn split_int_suffix(s: &str) -> (&str, Option<IntSuffix>) {
    let digits = s.trim_end_matches(['u', 'U', 'l', 'L']);
    let suffix = &s[digits.len()..];
    let has_u = suffix.contains(['u', 'U']);
    let has_l = suffix.contains(['l', 'L']);
    let suffix = match (has_u, has_l) {
        (true, true) => Some(IntSuffix::UL),
        (true, false) => Some(IntSuffix::U),
        (false, true) => Some(IntSuffix::L),
        (false, false) => None,
    };
    (digits, suffix)
}

fn parse_radix(digits: &str, radix: u32, start: usize, end: usize) -> Result<u64, LexError> {
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    u64::from_str_radix(&cleaned, radix).map_err(|_| LexError::invalid_number(start, end))
}

/// Parse a character literal (handling escape sequences).
fn parse_char(s: &str, pos: usize) -> Result<char, LexError> {
    let mut chars = s.chars();
    match chars.next() {
        Some('\\') => parse_escape(&mut chars, pos),
        Some(c) => Ok(c),
        None => Err(LexError::invalid_escape(pos)),
    }
}

/// Parse a string literal (handling escape sequences).
fn parse_string(s: &str, pos: usize) -> Result<String, LexError> {
    let mut result = String::new();
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            result.push(parse_escape(&mut chars, pos)?);
        } else {
            result.push(c);
        }
    }

    Ok(result)
}

/// Parse an escape sequence.
fn parse_escape(chars: &mut std::str::Chars<'_>, pos: usize) -> Result<char, LexError> {
    match chars.next() {
        Some('n') => Ok('\n'),
        Some('r') => Ok('\r'),
        Some('t') => Ok('\t'),
        Some('a') => Ok('\u{7}'),
        Some('b') => Ok('\u{8}'),
        Some('f') => Ok('\u{c}'),
        Some('v') => Ok('\u{b}'),
        Some('\\') => Ok('\\'),
        Some('0') => Ok('\0'),
        Some('\'') => Ok('\''),
        Some('"') => Ok('"'),
        Some('u') => parse_hex_escape(chars, 4, 4, pos),
        Some('x') => parse_hex_escape(chars, 1, 4, pos),
        _ => Err(LexError::invalid_escape(pos)),
    }
}

/// Parse the digits of `\uXXXX` (exactly four) or `\xH[H][H][H]` (one to four).
fn parse_hex_escape(chars: &mut std::str::Chars<'_>, min: usize, max: usize, pos: usize) -> Result<char, LexError> {
    let mut hex = String::new();
    while hex.len() < max {
        let mut lookahead = chars.clone();
        match lookahead.next() {
            Some(c) if c.is_ascii_hexdigit() => {
                hex.push(c);
                *chars = lookahead;
            }
            _ => break,
        }
    }

    if hex.len() < min {
        return Err(LexError::invalid_escape(pos));
    }

    let code_point = u32::from_str_radix(&hex, 16).map_err(|_| LexError::invalid_escape(pos))?;
    char::from_u32(code_point).ok_or_else(|| LexError::invalid_escape(pos))
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LexError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl LexError {
    fn unexpected_char(ch: char, pos: usize, slice: &str) -> Self {
        if ch == '"' || (slice.starts_with(['@', '$']) && slice.contains('"')) {
            return Self::unterminated_string(pos, pos + slice.len());
        }
        Self {
            span: Span::new(pos, pos + ch.len_utf8()),
            message: format!("Unexpected character '{}'", ch),
            hint: None,
        }
    }

    fn unterminated_string(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Unterminated string".to_string(),
            hint: Some("Add a closing '\"'".to_string()),
        }
    }

    fn invalid_escape(pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + 1),
            message: "Invalid escape sequence".to_string(),
            hint: Some("Valid: \\n \\r \\t \\a \\b \\f \\v \\\\ \\0 \\' \\\" \\uXXXX \\xH".to_string()),
        }
    }

    fn invalid_number(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Invalid number".to_string(),
            hint: Some("Integer literals must fit in 64 bits".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let result = Lexer::new(src).tokenize();
        assert!(result.is_ok(), "lex errors: {:?}", result.errors);
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn array_declaration() {
        assert_eq!(
            kinds("var b = new byte[1];"),
            vec![
                TokenKind::Ident("var".into()),
                TokenKind::Ident("b".into()),
                TokenKind::Eq,
                TokenKind::New,
                TokenKind::Byte,
                TokenKind::LBracket,
                TokenKind::Int(1, None),
                TokenKind::RBracket,
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn contextual_keywords_are_identifiers() {
        assert_eq!(
            kinds("async await yield partial"),
            vec![
                TokenKind::Ident("async".into()),
                TokenKind::Ident("await".into()),
                TokenKind::Ident("yield".into()),
                TokenKind::Ident("partial".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn integer_literals() {
        assert_eq!(
            kinds("0x1F 0b1010 1_000 5u 7L 9UL 3lu"),
            vec![
                TokenKind::Int(31, None),
                TokenKind::Int(10, None),
                TokenKind::Int(1000, None),
                TokenKind::Int(5, Some(IntSuffix::U)),
                TokenKind::Int(7, Some(IntSuffix::L)),
                TokenKind::Int(9, Some(IntSuffix::UL)),
                TokenKind::Int(3, Some(IntSuffix::UL)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn real_literals() {
        assert_eq!(
            kinds("1.5 2f 3e2 4.0m"),
            vec![
                TokenKind::Real(1.5, None),
                TokenKind::Real(2.0, Some(RealSuffix::F)),
                TokenKind::Real(300.0, None),
                TokenKind::Real(4.0, Some(RealSuffix::M)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_and_chars() {
        assert_eq!(
            kinds(r#""a\tb" @"c:\dir""x" $"n={n}" 'z' '\n' '\u0041'"#),
            vec![
                TokenKind::String("a\tb".into()),
                TokenKind::String("c:\\dir\"x".into()),
                TokenKind::String("n={n}".into()),
                TokenKind::Char('z'),
                TokenKind::Char('\n'),
                TokenKind::Char('A'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn trivia_is_skipped() {
        let src = "#region Fields\n// line\n/* block\n comment */ int /**/ x; // tail\n#endregion";
        assert_eq!(
            kinds(src),
            vec![TokenKind::IntKw, TokenKind::Ident("x".into()), TokenKind::Semi, TokenKind::Eof]
        );
    }

    #[test]
    fn verbatim_identifier() {
        assert_eq!(kinds("@class"), vec![TokenKind::Ident("class".into()), TokenKind::Eof]);
    }

    #[test]
    fn spans_are_byte_offsets() {
        let result = Lexer::new("int  x").tokenize();
        assert_eq!(result.tokens[0].span, Span::new(0, 3));
        assert_eq!(result.tokens[1].span, Span::new(5, 6));
        assert_eq!(result.tokens[2].span, Span::new(6, 6));
    }

    #[test]
    fn unexpected_character_is_collected() {
        let result = Lexer::new("int ` x;").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Unexpected character '`'");
        assert_eq!(result.errors[0].span, Span::new(4, 5));
        // lexing continues past the error
        assert!(result.tokens.iter().any(|t| t.kind == TokenKind::Ident("x".into())));
    }

    #[test]
    fn overflowing_literal_is_an_error() {
        let result = Lexer::new("99999999999999999999999").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].to_string(), "Invalid number");
    }
}
