// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use crate::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Suffix on an integer literal (`1u`, `1L`, `1UL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntSuffix {
    U,
    L,
    UL,
}

/// Suffix on a real literal (`1f`, `1d`, `1m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealSuffix {
    F,
    D,
    M,
}

/// The kind of token.
///
/// Contextual keywords (`var`, `async`, `await`, `yield`, `partial`,
/// `get`, `set`, `init`, `nameof`) are lexed as identifiers; the parser
/// recognizes them by position.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(u64, Option<IntSuffix>),
    Real(f64, Option<RealSuffix>),
    String(String),
    Char(char),
    Bool(bool),
    Null,

    // Identifier
    Ident(String),

    // Declaration keywords
    Using,
    Namespace,
    Class,
    Struct,
    Interface,
    Enum,
    Record,

    // Modifiers
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

    // Predefined types
    BoolKw,
    Byte,
    SByte,
    Short,
    UShort,
    IntKw,
    UInt,
    Long,
    ULong,
    CharKw,
    Float,
    Double,
    Decimal,
    Object,
    StringKw,
    Void,

    // Statements
    Return,
    If,
    Else,
    For,
    Foreach,
    In,
    While,
    Do,
    Break,
    Continue,
    Throw,
    Try,
    Catch,
    Finally,

    // Expressions
    This,
    Base,
    Typeof,
    Sizeof,
    Default,
    Stackalloc,
    Is,
    As,
    Ref,
    Out,
    Params,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Bang,
    Question,
    QuestionQuestion,
    QuestionQuestionEq, // ??=
    QuestionDot,        // ?.
    PlusPlus,
    MinusMinus,
    Arrow,    // ->
    FatArrow, // =>
    Dot,
    Amp,
    Pipe,
    Caret,
    Tilde,
    LtLt,
    GtGt,
    ColonColon,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LtLtEq,
    GtGtEq,

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semi,
    Comma,

    // Special
    Eof,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            // Literals
            TokenKind::Int(..) => "a number",
            TokenKind::Real(..) => "a number",
            TokenKind::String(_) => "a string",
            TokenKind::Char(_) => "a character",
            TokenKind::Bool(_) => "'true' or 'false'",
            TokenKind::Null => "'null'",

            // Identifier
            TokenKind::Ident(_) => "a name",

            // Keywords
            TokenKind::Using => "'using'",
            TokenKind::Namespace => "'namespace'",
            TokenKind::Class => "'class'",
            TokenKind::Struct => "'struct'",
            TokenKind::Interface => "'interface'",
            TokenKind::Enum => "'enum'",
            TokenKind::Record => "'record'",
            TokenKind::Public => "'public'",
            TokenKind::Private => "'private'",
            TokenKind::Protected => "'protected'",
            TokenKind::Internal => "'internal'",
            TokenKind::Static => "'static'",
            TokenKind::Const => "'const'",
            TokenKind::Readonly => "'readonly'",
            TokenKind::Unsafe => "'unsafe'",
            TokenKind::Abstract => "'abstract'",
            TokenKind::Virtual => "'virtual'",
            TokenKind::Override => "'override'",
            TokenKind::Sealed => "'sealed'",
            TokenKind::Extern => "'extern'",
            TokenKind::Volatile => "'volatile'",
            TokenKind::New => "'new'",
            TokenKind::BoolKw => "'bool'",
            TokenKind::Byte => "'byte'",
            TokenKind::SByte => "'sbyte'",
            TokenKind::Short => "'short'",
            TokenKind::UShort => "'ushort'",
            TokenKind::IntKw => "'int'",
            TokenKind::UInt => "'uint'",
            TokenKind::Long => "'long'",
            TokenKind::ULong => "'ulong'",
            TokenKind::CharKw => "'char'",
            TokenKind::Float => "'float'",
            TokenKind::Double => "'double'",
            TokenKind::Decimal => "'decimal'",
            TokenKind::Object => "'object'",
            TokenKind::StringKw => "'string'",
            TokenKind::Void => "'void'",
            TokenKind::Return => "'return'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::Foreach => "'foreach'",
            TokenKind::In => "'in'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Throw => "'throw'",
            TokenKind::Try => "'try'",
            TokenKind::Catch => "'catch'",
            TokenKind::Finally => "'finally'",
            TokenKind::This => "'this'",
            TokenKind::Base => "'base'",
            TokenKind::Typeof => "'typeof'",
            TokenKind::Sizeof => "'sizeof'",
            TokenKind::Default => "'default'",
            TokenKind::Stackalloc => "'stackalloc'",
            TokenKind::Is => "'is'",
            TokenKind::As => "'as'",
            TokenKind::Ref => "'ref'",
            TokenKind::Out => "'out'",
            TokenKind::Params => "'params'",

            // Operators
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Question => "'?'",
            TokenKind::QuestionQuestion => "'??'",
            TokenKind::QuestionQuestionEq => "'??='",
            TokenKind::QuestionDot => "'?.'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::Arrow => "'->'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Dot => "'.'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::LtLt => "'<<'",
            TokenKind::GtGt => "'>>'",
            TokenKind::ColonColon => "'::'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::LtLtEq => "'<<='",
            TokenKind::GtGtEq => "'>>='",

            // Delimiters
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::Comma => "','",

            // Special
            TokenKind::Eof => "end of file",
        }
    }

    /// Whether this token names a predefined type (`int`, `byte`, ...).
    pub fn is_predefined_type(&self) -> bool {
        matches!(
            self,
            TokenKind::BoolKw
                | TokenKind::Byte
                | TokenKind::SByte
                | TokenKind::Short
                | TokenKind::UShort
                | TokenKind::IntKw
                | TokenKind::UInt
                | TokenKind::Long
                | TokenKind::ULong
                | TokenKind::CharKw
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Decimal
                | TokenKind::Object
                | TokenKind::StringKw
                | TokenKind::Void
        )
    }

    /// Whether this token is a declaration modifier.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Internal
                | TokenKind::Static
                | TokenKind::Const
                | TokenKind::Readonly
                | TokenKind::Unsafe
                | TokenKind::Abstract
                | TokenKind::Virtual
                | TokenKind::Override
                | TokenKind::Sealed
                | TokenKind::Extern
                | TokenKind::Volatile
                | TokenKind::New
        )
    }
}
