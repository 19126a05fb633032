// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using Pratt parsing for expressions.

use stacklint_ast::decl::{
    Accessor, AccessorKind, CompilationUnit, ConstructorChain, ConstructorDecl, Decl, DeclKind,
    Declarator, EnumMember, FieldDecl, FnBody, Initializer, Member, MemberKind, MethodDecl,
    Modifier, Modifiers, NamespaceDecl, Param, ParamModifier, PropertyDecl, TypeDecl, TypeKind,
    UsingDirective,
};
use stacklint_ast::expr::{
    ArgModifier, Argument, ArraySize, AssignOp, BinOp, Expr, ExprKind, PostfixOp, RankSpecifier,
    UnaryOp,
};
use stacklint_ast::stmt::{CatchClause, LocalDecl, Stmt, StmtKind, SwitchSection};
use stacklint_ast::token::{Token, TokenKind};
use stacklint_ast::types::{PredefinedType, TypeRef, TypeRefKind};
use stacklint_ast::{NodeId, Span};
use thiserror::Error;

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The parser for C# source code.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Track pending `>` from splitting `>>` in type argument lists
    pending_gt: bool,
    /// Collected errors during parsing
    errors: Vec<ParseError>,
    /// Counter for generating unique NodeIds
    next_node_id: u32,
    /// Returned when reading past the token stream
    eof: Token,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
        Self {
            tokens,
            pos: 0,
            pending_gt: false,
            errors: Vec::new(),
            next_node_id: 0,
            eof: Token { kind: TokenKind::Eof, span: Span::new(end, end) },
        }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Record error, return if should continue.
    fn record_error(&mut self, error: ParseError) -> bool {
        self.errors.push(error);
        self.errors.len() < MAX_ERRORS
    }

    /// Skip to the next namespace-level declaration after an error.
    fn synchronize(&mut self) {
        let mut brace_depth = 0;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    if brace_depth > 0 {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            return;
                        }
                    }
                }
                TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Record
                | TokenKind::Namespace
                | TokenKind::Using
                | TokenKind::Public
                | TokenKind::Internal
                    if brace_depth == 0 =>
                {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip to the next member inside a type body.
    fn synchronize_in_type(&mut self) {
        let mut depth = 0;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                }
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.kind_at(self.pos + n)
    }

    fn kind_at(&self, pos: usize) -> &TokenKind {
        self.tokens.get(pos).map(|t| &t.kind).unwrap_or(&self.eof.kind)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        let idx = self.pos;
        if !self.at_end() {
            self.pos += 1;
        }
        self.tokens.get(idx).unwrap_or(&self.eof)
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn check_ident(&self, name: &str) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(s) if s == name)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(kind.display_name(), self.current_kind(), self.current().span))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::expected("a name", self.current_kind(), self.current().span)),
        }
    }

    /// Handle `>>` splitting in type argument lists.
    fn expect_gt_in_generic(&mut self) -> Result<(), ParseError> {
        if self.pending_gt {
            self.pending_gt = false;
            return Ok(());
        }

        match self.current_kind() {
            TokenKind::Gt => {
                self.advance();
                Ok(())
            }
            TokenKind::GtGt => {
                self.advance();
                self.pending_gt = true;
                Ok(())
            }
            _ => Err(ParseError::expected("'>'", self.current_kind(), self.current().span)),
        }
    }

    fn mk_expr(&mut self, kind: ExprKind, start: usize) -> Expr {
        Expr { id: self.next_id(), kind, span: Span::new(start, self.prev_end()) }
    }

    fn mk_stmt(&mut self, kind: StmtKind, start: usize) -> Stmt {
        Stmt { id: self.next_id(), kind, span: Span::new(start, self.prev_end()) }
    }

    // =========================================================================
    // Lookahead Scanning
    // =========================================================================

    /// Scan a type starting at `pos` without consuming anything.
    /// Returns the position just past the type.
    fn scan_type(&self, pos: usize) -> Option<usize> {
        let mut p = pos;
        let first = self.kind_at(p);
        if first.is_predefined_type() {
            p += 1;
        } else if matches!(first, TokenKind::Ident(_)) {
            p += 1;
            if matches!(self.kind_at(p), TokenKind::ColonColon)
                && matches!(self.kind_at(p + 1), TokenKind::Ident(_))
            {
                p += 2;
            }
            loop {
                if matches!(self.kind_at(p), TokenKind::Lt) {
                    p = self.scan_type_args(p)?;
                }
                if matches!(self.kind_at(p), TokenKind::Dot)
                    && matches!(self.kind_at(p + 1), TokenKind::Ident(_))
                {
                    p += 2;
                } else {
                    break;
                }
            }
        } else {
            return None;
        }

        loop {
            match self.kind_at(p) {
                TokenKind::Question | TokenKind::Star => p += 1,
                TokenKind::LBracket => match self.scan_rank_specifier(p) {
                    Some(next) => p = next,
                    None => break,
                },
                _ => break,
            }
        }
        Some(p)
    }

    /// Scan `<...>` at `pos` by bracket depth. Only tokens that can appear
    /// inside a type argument list are allowed.
    fn scan_type_args(&self, pos: usize) -> Option<usize> {
        let mut p = pos + 1;
        let mut depth: i32 = 1;
        while depth > 0 {
            match self.kind_at(p) {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => depth -= 1,
                TokenKind::GtGt => depth -= 2,
                TokenKind::Ident(_)
                | TokenKind::Comma
                | TokenKind::Dot
                | TokenKind::Question
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::ColonColon => {}
                k if k.is_predefined_type() => {}
                _ => return None,
            }
            p += 1;
        }
        if depth == 0 {
            Some(p)
        } else {
            None
        }
    }

    /// `[` `,`* `]` at `pos`.
    fn scan_rank_specifier(&self, pos: usize) -> Option<usize> {
        if !matches!(self.kind_at(pos), TokenKind::LBracket) {
            return None;
        }
        let mut p = pos + 1;
        while matches!(self.kind_at(p), TokenKind::Comma) {
            p += 1;
        }
        matches!(self.kind_at(p), TokenKind::RBracket).then_some(p + 1)
    }

    /// `T name =`, `T name;` or `T name,` at the current position.
    fn is_local_decl_start(&self) -> bool {
        match self.scan_type(self.pos) {
            Some(p) => {
                matches!(self.kind_at(p), TokenKind::Ident(_))
                    && matches!(
                        self.kind_at(p + 1),
                        TokenKind::Eq | TokenKind::Semi | TokenKind::Comma
                    )
            }
            None => false,
        }
    }

    /// At `(`: does this start a cast?
    fn looks_like_cast(&self) -> bool {
        let Some(end) = self.scan_type(self.pos + 1) else {
            return false;
        };
        if !matches!(self.kind_at(end), TokenKind::RParen) {
            return false;
        }
        if self.peek(1).is_predefined_type() {
            return true;
        }
        let next = self.kind_at(end + 1);
        next.is_predefined_type()
            || matches!(
                next,
                TokenKind::Ident(_)
                    | TokenKind::Int(..)
                    | TokenKind::Real(..)
                    | TokenKind::String(_)
                    | TokenKind::Char(_)
                    | TokenKind::Bool(_)
                    | TokenKind::Null
                    | TokenKind::LParen
                    | TokenKind::This
                    | TokenKind::Base
                    | TokenKind::New
                    | TokenKind::Bang
                    | TokenKind::Tilde
                    | TokenKind::Typeof
                    | TokenKind::Sizeof
                    | TokenKind::Default
            )
    }

    /// `Name<T>(` or `Name<T>.` at the current identifier.
    fn looks_like_generic_name(&self) -> bool {
        if !matches!(self.peek(1), TokenKind::Lt) {
            return false;
        }
        match self.scan_type_args(self.pos + 1) {
            Some(p) => matches!(self.kind_at(p), TokenKind::LParen | TokenKind::Dot),
            None => false,
        }
    }

    fn is_expr_start_at(&self, pos: usize) -> bool {
        let kind = self.kind_at(pos);
        kind.is_predefined_type()
            || matches!(
                kind,
                TokenKind::Ident(_)
                    | TokenKind::Int(..)
                    | TokenKind::Real(..)
                    | TokenKind::String(_)
                    | TokenKind::Char(_)
                    | TokenKind::Bool(_)
                    | TokenKind::Null
                    | TokenKind::LParen
                    | TokenKind::This
                    | TokenKind::Base
                    | TokenKind::New
                    | TokenKind::Typeof
                    | TokenKind::Sizeof
                    | TokenKind::Default
            )
    }

    // =========================================================================
    // Top-Level Parsing
    // =========================================================================

    pub fn parse(&mut self) -> ParseResult {
        let decls = self.parse_namespace_body(true);
        let end = self.eof.span.end;
        ParseResult {
            unit: CompilationUnit { decls, span: Span::new(0, end) },
            errors: std::mem::take(&mut self.errors),
        }
    }

    fn parse_namespace_body(&mut self, top_level: bool) -> Vec<Decl> {
        let mut decls = Vec::new();
        while !self.at_end() && (top_level || !self.check(&TokenKind::RBrace)) {
            let before = self.pos;
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.synchronize();
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }
        decls
    }

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        self.skip_attributes()?;
        let start = self.current().span.start;

        let kind = match self.current_kind() {
            TokenKind::Using => DeclKind::Using(self.parse_using_directive()?),
            TokenKind::Namespace => DeclKind::Namespace(self.parse_namespace()?),
            _ => {
                let modifiers = self.parse_modifiers();
                if self.at_type_keyword() {
                    DeclKind::Type(self.parse_type_decl(modifiers)?)
                } else {
                    return Err(ParseError::expected(
                        "type declaration",
                        self.current_kind(),
                        self.current().span,
                    ));
                }
            }
        };

        Ok(Decl { id: self.next_id(), kind, span: Span::new(start, self.prev_end()) })
    }

    fn parse_using_directive(&mut self) -> Result<UsingDirective, ParseError> {
        self.expect(&TokenKind::Using)?;
        let is_static = self.match_token(&TokenKind::Static);
        let alias = if matches!(self.peek(1), TokenKind::Eq) {
            let alias = self.expect_ident()?;
            self.advance();
            Some(alias)
        } else {
            None
        };
        let path = match self.parse_type()?.kind {
            TypeRefKind::Named { path, .. } => path,
            TypeRefKind::Predefined(p) => vec![p.keyword().to_string()],
            _ => Vec::new(),
        };
        self.expect(&TokenKind::Semi)?;
        Ok(UsingDirective { path, alias, is_static })
    }

    fn parse_namespace(&mut self) -> Result<NamespaceDecl, ParseError> {
        self.expect(&TokenKind::Namespace)?;
        let mut name = vec![self.expect_ident()?];
        while self.match_token(&TokenKind::Dot) {
            name.push(self.expect_ident()?);
        }

        if self.match_token(&TokenKind::Semi) {
            let decls = self.parse_namespace_body(true);
            return Ok(NamespaceDecl { name, decls, file_scoped: true });
        }

        self.expect(&TokenKind::LBrace)?;
        let decls = self.parse_namespace_body(false);
        self.expect(&TokenKind::RBrace)?;
        Ok(NamespaceDecl { name, decls, file_scoped: false })
    }

    /// Skip `[Attr(...)]` lists; their contents are not analyzed.
    fn skip_attributes(&mut self) -> Result<(), ParseError> {
        while self.check(&TokenKind::LBracket) {
            let open = self.current().span;
            self.advance();
            let mut depth = 1;
            while depth > 0 {
                match self.current_kind() {
                    TokenKind::LBracket => depth += 1,
                    TokenKind::RBracket => depth -= 1,
                    TokenKind::Eof => {
                        return Err(ParseError::expected("']'", &TokenKind::Eof, open));
                    }
                    _ => {}
                }
                self.advance();
            }
        }
        Ok(())
    }

    fn parse_modifiers(&mut self) -> Modifiers {
        let mut list = Vec::new();
        loop {
            let modifier = match self.current_kind() {
                TokenKind::Public => Modifier::Public,
                TokenKind::Private => Modifier::Private,
                TokenKind::Protected => Modifier::Protected,
                TokenKind::Internal => Modifier::Internal,
                TokenKind::Static => Modifier::Static,
                TokenKind::Const => Modifier::Const,
                TokenKind::Readonly => Modifier::Readonly,
                TokenKind::Unsafe => Modifier::Unsafe,
                TokenKind::Abstract => Modifier::Abstract,
                TokenKind::Virtual => Modifier::Virtual,
                TokenKind::Override => Modifier::Override,
                TokenKind::Sealed => Modifier::Sealed,
                TokenKind::Extern => Modifier::Extern,
                TokenKind::Volatile => Modifier::Volatile,
                TokenKind::New => Modifier::New,
                TokenKind::Ident(s) if s == "async" && self.contextual_modifier_follows() => {
                    Modifier::Async
                }
                TokenKind::Ident(s) if s == "partial" && self.contextual_modifier_follows() => {
                    Modifier::Partial
                }
                _ => break,
            };
            self.advance();
            list.push(modifier);
        }
        Modifiers { list }
    }

    /// `async` and `partial` are modifiers only when a type, name or
    /// another modifier follows them.
    fn contextual_modifier_follows(&self) -> bool {
        let next = self.peek(1);
        next.is_predefined_type()
            || next.is_modifier()
            || matches!(
                next,
                TokenKind::Ident(_)
                    | TokenKind::Class
                    | TokenKind::Struct
                    | TokenKind::Interface
                    | TokenKind::Record
            )
    }

    fn at_type_keyword(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Record
        )
    }

    // =========================================================================
    // Type Declarations
    // =========================================================================

    fn parse_type_decl(&mut self, modifiers: Modifiers) -> Result<TypeDecl, ParseError> {
        let kind = match self.current_kind() {
            TokenKind::Class => TypeKind::Class,
            TokenKind::Struct => TypeKind::Struct,
            TokenKind::Interface => TypeKind::Interface,
            TokenKind::Enum => TypeKind::Enum,
            TokenKind::Record => TypeKind::Record,
            _ => {
                return Err(ParseError::expected(
                    "type declaration",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };
        self.advance();
        if kind == TypeKind::Record && !self.match_token(&TokenKind::Class) {
            self.match_token(&TokenKind::Struct);
        }

        let name_span = self.current().span;
        let name = self.expect_ident()?;
        let type_params =
            if self.check(&TokenKind::Lt) { self.parse_type_params()? } else { Vec::new() };

        // Positional record parameters become properties; they hold no code
        if kind == TypeKind::Record && self.check(&TokenKind::LParen) {
            self.parse_params()?;
        }

        let mut bases = Vec::new();
        if self.match_token(&TokenKind::Colon) {
            loop {
                bases.push(self.parse_type()?);
                if self.check(&TokenKind::LParen) {
                    // record base with arguments: `: Base(x)`
                    self.parse_arguments()?;
                }
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.skip_constraint_clauses();

        if kind == TypeKind::Record && self.match_token(&TokenKind::Semi) {
            return Ok(TypeDecl { kind, name, name_span, modifiers, type_params, bases, members: Vec::new() });
        }

        self.expect(&TokenKind::LBrace)?;
        let members = if kind == TypeKind::Enum {
            self.parse_enum_members()?
        } else {
            self.parse_members(&name)
        };
        self.expect(&TokenKind::RBrace)?;
        self.match_token(&TokenKind::Semi);

        Ok(TypeDecl { kind, name, name_span, modifiers, type_params, bases, members })
    }

    /// `<T, in U, out V>`
    fn parse_type_params(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(&TokenKind::Lt)?;
        let mut params = Vec::new();
        loop {
            self.skip_attributes()?;
            if !self.match_token(&TokenKind::In) {
                self.match_token(&TokenKind::Out);
            }
            params.push(self.expect_ident()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_gt_in_generic()?;
        Ok(params)
    }

    /// Skip `where T : class, new()` clauses.
    fn skip_constraint_clauses(&mut self) {
        if !self.check_ident("where") {
            return;
        }
        while !matches!(
            self.current_kind(),
            TokenKind::LBrace | TokenKind::FatArrow | TokenKind::Semi | TokenKind::Eof
        ) {
            self.advance();
        }
    }

    fn parse_enum_members(&mut self) -> Result<Vec<Member>, ParseError> {
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            self.skip_attributes()?;
            let start = self.current().span.start;
            let name_span = self.current().span;
            let name = self.expect_ident()?;
            let value = if self.match_token(&TokenKind::Eq) { Some(self.parse_expr()?) } else { None };
            let kind = MemberKind::EnumMember(EnumMember { name, name_span, value });
            members.push(Member { id: self.next_id(), kind, span: Span::new(start, self.prev_end()) });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(members)
    }

    fn parse_members(&mut self, type_name: &str) -> Vec<Member> {
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.match_token(&TokenKind::Semi) {
                continue;
            }
            let before = self.pos;
            match self.parse_member(type_name) {
                Ok(member) => members.push(member),
                Err(e) => {
                    if !self.record_error(e) {
                        self.skip_to_closing_brace();
                        break;
                    }
                    self.synchronize_in_type();
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }
        members
    }

    fn parse_member(&mut self, type_name: &str) -> Result<Member, ParseError> {
        self.skip_attributes()?;
        let start = self.current().span.start;
        let modifiers = self.parse_modifiers();

        let kind = if self.at_type_keyword() {
            MemberKind::Type(self.parse_type_decl(modifiers)?)
        } else if self.check_ident(type_name) && matches!(self.peek(1), TokenKind::LParen) {
            MemberKind::Constructor(self.parse_constructor(modifiers)?)
        } else if self.check(&TokenKind::Tilde) {
            return Err(ParseError {
                span: self.current().span,
                message: "Finalizers are not supported".to_string(),
                hint: Some("move cleanup into a Dispose method".to_string()),
            });
        } else {
            let ty = self.parse_type()?;
            if self.check(&TokenKind::This) {
                return Err(ParseError {
                    span: self.current().span,
                    message: "Indexers are not supported".to_string(),
                    hint: None,
                });
            }
            if self.check_ident("operator") {
                return Err(ParseError {
                    span: self.current().span,
                    message: "Operator declarations are not supported".to_string(),
                    hint: None,
                });
            }

            let name_start = self.current().span.start;
            let mut name = self.expect_ident()?;
            // explicit interface implementation: `void IFoo.Bar()`
            while self.check(&TokenKind::Dot) && matches!(self.peek(1), TokenKind::Ident(_)) {
                self.advance();
                name.push('.');
                name.push_str(&self.expect_ident()?);
            }
            let name_span = Span::new(name_start, self.prev_end());

            match self.current_kind() {
                TokenKind::LParen | TokenKind::Lt => {
                    MemberKind::Method(self.parse_method(modifiers, ty, name, name_span)?)
                }
                TokenKind::LBrace | TokenKind::FatArrow => {
                    MemberKind::Property(self.parse_property(modifiers, ty, name, name_span)?)
                }
                TokenKind::Eq | TokenKind::Semi | TokenKind::Comma => {
                    let mut declarators = vec![self.parse_declarator_rest(name, name_span)?];
                    while self.match_token(&TokenKind::Comma) {
                        declarators.push(self.parse_declarator()?);
                    }
                    self.expect(&TokenKind::Semi)?;
                    MemberKind::Field(FieldDecl { modifiers, ty, declarators })
                }
                _ => {
                    return Err(ParseError::expected(
                        "member declaration",
                        self.current_kind(),
                        self.current().span,
                    ))
                }
            }
        };

        Ok(Member { id: self.next_id(), kind, span: Span::new(start, self.prev_end()) })
    }

    fn parse_method(
        &mut self,
        modifiers: Modifiers,
        return_ty: TypeRef,
        name: String,
        name_span: Span,
    ) -> Result<MethodDecl, ParseError> {
        let type_params =
            if self.check(&TokenKind::Lt) { self.parse_type_params()? } else { Vec::new() };
        let params = self.parse_params()?;
        self.skip_constraint_clauses();
        let body = self.parse_fn_body()?;
        Ok(MethodDecl { modifiers, return_ty, name, name_span, type_params, params, body })
    }

    fn parse_constructor(&mut self, modifiers: Modifiers) -> Result<ConstructorDecl, ParseError> {
        let name_span = self.current().span;
        let name = self.expect_ident()?;
        let params = self.parse_params()?;

        let chain = if self.match_token(&TokenKind::Colon) {
            let is_base = match self.current_kind() {
                TokenKind::Base => true,
                TokenKind::This => false,
                _ => {
                    return Err(ParseError::expected(
                        "'base' or 'this'",
                        self.current_kind(),
                        self.current().span,
                    ))
                }
            };
            self.advance();
            let args = self.parse_arguments()?;
            Some(ConstructorChain { is_base, args })
        } else {
            None
        };

        let body = self.parse_fn_body()?;
        Ok(ConstructorDecl { modifiers, name, name_span, params, chain, body })
    }

    fn parse_property(
        &mut self,
        modifiers: Modifiers,
        ty: TypeRef,
        name: String,
        name_span: Span,
    ) -> Result<PropertyDecl, ParseError> {
        if self.match_token(&TokenKind::FatArrow) {
            let expr = self.parse_expr()?;
            self.expect(&TokenKind::Semi)?;
            return Ok(PropertyDecl {
                modifiers,
                ty,
                name,
                name_span,
                accessors: Vec::new(),
                expr_body: Some(expr),
                init: None,
            });
        }

        self.expect(&TokenKind::LBrace)?;
        let mut accessors = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            self.skip_attributes()?;
            let start = self.current().span.start;
            let accessor_modifiers = self.parse_modifiers();
            let kind = match self.current_kind() {
                TokenKind::Ident(s) if s == "get" => AccessorKind::Get,
                TokenKind::Ident(s) if s == "set" => AccessorKind::Set,
                TokenKind::Ident(s) if s == "init" => AccessorKind::Init,
                _ => {
                    return Err(ParseError::expected(
                        "'get', 'set' or 'init'",
                        self.current_kind(),
                        self.current().span,
                    ))
                }
            };
            self.advance();
            let body = self.parse_fn_body()?;
            accessors.push(Accessor {
                id: self.next_id(),
                kind,
                modifiers: accessor_modifiers,
                body,
                span: Span::new(start, self.prev_end()),
            });
        }
        self.expect(&TokenKind::RBrace)?;

        let init = if self.check(&TokenKind::Eq) {
            let eq_span = self.advance().span;
            let value = self.parse_var_initializer()?;
            self.expect(&TokenKind::Semi)?;
            Some(Initializer { eq_span, value })
        } else {
            None
        };

        Ok(PropertyDecl { modifiers, ty, name, name_span, accessors, expr_body: None, init })
    }

    /// `{ ... }`, `=> expr;` or `;`
    fn parse_fn_body(&mut self) -> Result<Option<FnBody>, ParseError> {
        match self.current_kind() {
            TokenKind::LBrace => Ok(Some(FnBody::Block(self.parse_block_body()?))),
            TokenKind::FatArrow => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::Semi)?;
                Ok(Some(FnBody::Expr(expr)))
            }
            TokenKind::Semi => {
                self.advance();
                Ok(None)
            }
            _ => Err(ParseError::expected(
                "'{', '=>' or ';'",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                self.skip_attributes()?;
                let start = self.current().span.start;
                let modifier = match self.current_kind() {
                    TokenKind::Ref => Some(ParamModifier::Ref),
                    TokenKind::Out => Some(ParamModifier::Out),
                    TokenKind::In => Some(ParamModifier::In),
                    TokenKind::Params => Some(ParamModifier::Params),
                    TokenKind::This => Some(ParamModifier::This),
                    _ => None,
                };
                if modifier.is_some() {
                    self.advance();
                }
                let ty = self.parse_type()?;
                let name = self.expect_ident()?;
                let default =
                    if self.match_token(&TokenKind::Eq) { Some(self.parse_expr()?) } else { None };
                params.push(Param { name, ty, modifier, default, span: Span::new(start, self.prev_end()) });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_declarator(&mut self) -> Result<Declarator, ParseError> {
        let name_span = self.current().span;
        let name = self.expect_ident()?;
        self.parse_declarator_rest(name, name_span)
    }

    /// The part of a declarator after its name: `= initializer` or nothing.
    fn parse_declarator_rest(&mut self, name: String, name_span: Span) -> Result<Declarator, ParseError> {
        let init = if self.check(&TokenKind::Eq) {
            let eq_span = self.advance().span;
            let value = self.parse_var_initializer()?;
            Some(Initializer { eq_span, value })
        } else {
            None
        };
        Ok(Declarator {
            id: self.next_id(),
            name,
            name_span,
            init,
            span: Span::new(name_span.start, self.prev_end()),
        })
    }

    /// An expression or a bare `{ ... }` array initializer.
    fn parse_var_initializer(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::LBrace) {
            let start = self.current().span.start;
            let elements = self.parse_initializer_elements()?;
            Ok(self.mk_expr(ExprKind::ArrayInitializer(elements), start))
        } else {
            self.parse_expr()
        }
    }

    /// `{ a, b, { c }, }` including object initializer members (`X = 1`).
    fn parse_initializer_elements(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            elements.push(self.parse_var_initializer()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(elements)
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.current().span.start;
        let mut ty = self.parse_non_array_type()?;

        let mut ranks = Vec::new();
        while !self.pending_gt && self.scan_rank_specifier(self.pos).is_some() {
            self.advance();
            let mut dims = 1;
            while self.match_token(&TokenKind::Comma) {
                dims += 1;
            }
            self.expect(&TokenKind::RBracket)?;
            ranks.push(dims);
        }
        if !ranks.is_empty() {
            ty = TypeRef::new(
                TypeRefKind::Array { element: Box::new(ty), ranks },
                Span::new(start, self.prev_end()),
            );
            if !self.pending_gt && self.match_token(&TokenKind::Question) {
                ty = TypeRef::new(TypeRefKind::Nullable(Box::new(ty)), Span::new(start, self.prev_end()));
            }
        }
        Ok(ty)
    }

    /// A predefined or named type with `?` and `*` suffixes, but no rank specifiers.
    fn parse_non_array_type(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.current().span.start;
        let kind = if let Some(p) = predefined_type(self.current_kind()) {
            self.advance();
            TypeRefKind::Predefined(p)
        } else if matches!(self.current_kind(), TokenKind::Ident(_)) {
            let mut path = vec![self.expect_ident()?];
            if self.match_token(&TokenKind::ColonColon) {
                // `global::System.Int32`
                path = vec![self.expect_ident()?];
            }
            let mut args = Vec::new();
            loop {
                if self.check(&TokenKind::Lt) {
                    args = self.parse_type_args()?;
                }
                if !self.pending_gt
                    && self.check(&TokenKind::Dot)
                    && matches!(self.peek(1), TokenKind::Ident(_))
                {
                    self.advance();
                    path.push(self.expect_ident()?);
                    args.clear();
                } else {
                    break;
                }
            }
            TypeRefKind::Named { path, args }
        } else {
            return Err(ParseError::expected("type", self.current_kind(), self.current().span));
        };

        let mut ty = TypeRef::new(kind, Span::new(start, self.prev_end()));
        while !self.pending_gt {
            if self.match_token(&TokenKind::Question) {
                ty = TypeRef::new(TypeRefKind::Nullable(Box::new(ty)), Span::new(start, self.prev_end()));
            } else if self.match_token(&TokenKind::Star) {
                ty = TypeRef::new(TypeRefKind::Pointer(Box::new(ty)), Span::new(start, self.prev_end()));
            } else {
                break;
            }
        }
        Ok(ty)
    }

    fn parse_type_args(&mut self) -> Result<Vec<TypeRef>, ParseError> {
        self.expect(&TokenKind::Lt)?;
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            if self.pending_gt || !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_gt_in_generic()?;
        Ok(args)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let before = self.pos;
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    // Record error but stay within the block
                    if !self.record_error(e) {
                        self.skip_to_closing_brace();
                        break;
                    }
                    self.synchronize_in_block();
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(stmts)
    }

    /// Synchronize within a block - skip to the next statement boundary.
    fn synchronize_in_block(&mut self) {
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::RBrace => return,
                TokenKind::Semi => {
                    self.advance();
                    return;
                }
                TokenKind::Return
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Foreach
                | TokenKind::Do
                | TokenKind::Try
                | TokenKind::Throw
                | TokenKind::Const => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip to the closing brace of a block.
    fn skip_to_closing_brace(&mut self) {
        let mut depth = 1;
        while !self.at_end() && depth > 0 {
            match self.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                self.advance();
            }
        }
    }

    /// Parse a statement.
    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;

        if self.check_ident("yield") {
            match self.peek(1) {
                TokenKind::Return => {
                    self.advance();
                    self.advance();
                    let value = self.parse_expr()?;
                    self.expect(&TokenKind::Semi)?;
                    return Ok(self.mk_stmt(StmtKind::YieldReturn(value), start));
                }
                TokenKind::Break => {
                    self.advance();
                    self.advance();
                    self.expect(&TokenKind::Semi)?;
                    return Ok(self.mk_stmt(StmtKind::YieldBreak, start));
                }
                _ => {}
            }
        }
        if self.check_ident("fixed") && matches!(self.peek(1), TokenKind::LParen) {
            return self.parse_fixed_stmt(start);
        }
        if self.check_ident("lock") && matches!(self.peek(1), TokenKind::LParen) {
            self.advance();
            self.advance();
            let expr = self.parse_expr()?;
            self.expect(&TokenKind::RParen)?;
            let body = Box::new(self.parse_stmt()?);
            return Ok(self.mk_stmt(StmtKind::Lock { expr, body }, start));
        }

        let kind = match self.current_kind() {
            TokenKind::LBrace => StmtKind::Block(self.parse_block_body()?),
            TokenKind::Semi => {
                self.advance();
                StmtKind::Empty
            }
            TokenKind::If => self.parse_if_stmt()?,
            TokenKind::While => {
                self.advance();
                let cond = self.parse_paren_expr()?;
                let body = Box::new(self.parse_stmt()?);
                StmtKind::While { cond, body }
            }
            TokenKind::Do => {
                self.advance();
                let body = Box::new(self.parse_stmt()?);
                self.expect(&TokenKind::While)?;
                let cond = self.parse_paren_expr()?;
                self.expect(&TokenKind::Semi)?;
                StmtKind::Do { body, cond }
            }
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::Foreach => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let ty = self.parse_type()?;
                let name = self.expect_ident()?;
                self.expect(&TokenKind::In)?;
                let iter = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                StmtKind::ForEach { ty, name, iter, body }
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
                self.expect(&TokenKind::Semi)?;
                StmtKind::Return(value)
            }
            TokenKind::Throw => {
                self.advance();
                let value = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
                self.expect(&TokenKind::Semi)?;
                StmtKind::Throw(value)
            }
            TokenKind::Break => {
                self.advance();
                self.expect(&TokenKind::Semi)?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(&TokenKind::Semi)?;
                StmtKind::Continue
            }
            TokenKind::Try => self.parse_try_stmt()?,
            TokenKind::Unsafe if matches!(self.peek(1), TokenKind::LBrace) => {
                self.advance();
                StmtKind::Unsafe(self.parse_block_body()?)
            }
            TokenKind::Const => {
                self.advance();
                let decl = self.parse_local_decl(true)?;
                self.expect(&TokenKind::Semi)?;
                StmtKind::Local(decl)
            }
            TokenKind::Using if matches!(self.peek(1), TokenKind::LParen) => self.parse_using_stmt()?,
            TokenKind::Using => {
                // `using var x = ...;` declares an ordinary local
                self.advance();
                let decl = self.parse_local_decl(false)?;
                self.expect(&TokenKind::Semi)?;
                StmtKind::Local(decl)
            }
            TokenKind::Ident(s) if s == "switch" && matches!(self.peek(1), TokenKind::LParen) => {
                self.parse_switch_stmt()?
            }
            _ if self.is_local_decl_start() => {
                let decl = self.parse_local_decl(false)?;
                self.expect(&TokenKind::Semi)?;
                StmtKind::Local(decl)
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::Semi)?;
                StmtKind::Expr(expr)
            }
        };

        Ok(self.mk_stmt(kind, start))
    }

    fn parse_local_decl(&mut self, is_const: bool) -> Result<LocalDecl, ParseError> {
        let ty = self.parse_type()?;
        let mut declarators = vec![self.parse_declarator()?];
        while self.match_token(&TokenKind::Comma) {
            declarators.push(self.parse_declarator()?);
        }
        Ok(LocalDecl { ty, is_const, declarators })
    }

    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_if_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::If)?;
        let cond = self.parse_paren_expr()?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch =
            if self.match_token(&TokenKind::Else) { Some(Box::new(self.parse_stmt()?)) } else { None };
        Ok(StmtKind::If { cond, then_branch, else_branch })
    }

    fn parse_for_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::For)?;
        self.expect(&TokenKind::LParen)?;

        let mut init = Vec::new();
        if !self.check(&TokenKind::Semi) {
            let start = self.current().span.start;
            if self.is_local_decl_start() {
                let decl = self.parse_local_decl(false)?;
                init.push(self.mk_stmt(StmtKind::Local(decl), start));
            } else {
                loop {
                    let start = self.current().span.start;
                    let expr = self.parse_expr()?;
                    init.push(self.mk_stmt(StmtKind::Expr(expr), start));
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
            }
        }
        self.expect(&TokenKind::Semi)?;

        let cond = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
        self.expect(&TokenKind::Semi)?;

        let mut update = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                update.push(self.parse_expr()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;

        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::For { init, cond, update, body })
    }

    fn parse_try_stmt(&mut self) -> Result<StmtKind, ParseError> {
        let try_span = self.current().span;
        self.expect(&TokenKind::Try)?;
        let body = self.parse_block_body()?;

        let mut catches = Vec::new();
        while self.check(&TokenKind::Catch) {
            let start = self.current().span.start;
            self.advance();
            let (ty, name) = if self.match_token(&TokenKind::LParen) {
                let ty = self.parse_type()?;
                let name = if matches!(self.current_kind(), TokenKind::Ident(_)) {
                    Some(self.expect_ident()?)
                } else {
                    None
                };
                self.expect(&TokenKind::RParen)?;
                (Some(ty), name)
            } else {
                (None, None)
            };
            if self.check_ident("when") {
                // exception filters are evaluated but never allocate into the handler
                self.advance();
                self.parse_paren_expr()?;
            }
            let body = self.parse_block_body()?;
            catches.push(CatchClause { ty, name, body, span: Span::new(start, self.prev_end()) });
        }

        let finally =
            if self.match_token(&TokenKind::Finally) { Some(self.parse_block_body()?) } else { None };

        if catches.is_empty() && finally.is_none() {
            return Err(ParseError::expected("'catch' or 'finally'", self.current_kind(), self.current().span)
                .with_hint("a 'try' block needs at least one 'catch' or a 'finally'")
                .at(try_span));
        }

        Ok(StmtKind::Try { body, catches, finally })
    }

    fn parse_switch_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        let expr = self.parse_paren_expr()?;
        self.expect(&TokenKind::LBrace)?;

        let mut sections = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let mut labels = Vec::new();
            loop {
                if self.check_ident("case") {
                    self.advance();
                    labels.push(Some(self.parse_expr()?));
                    self.expect(&TokenKind::Colon)?;
                } else if self.check(&TokenKind::Default) && matches!(self.peek(1), TokenKind::Colon) {
                    self.advance();
                    self.advance();
                    labels.push(None);
                } else {
                    break;
                }
            }
            if labels.is_empty() {
                return Err(ParseError::expected("'case' or 'default'", self.current_kind(), self.current().span));
            }

            let mut body = Vec::new();
            while !self.check(&TokenKind::RBrace)
                && !self.at_end()
                && !self.check_ident("case")
                && !(self.check(&TokenKind::Default) && matches!(self.peek(1), TokenKind::Colon))
            {
                body.push(self.parse_stmt()?);
            }
            sections.push(SwitchSection { labels, body });
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(StmtKind::Switch { expr, sections })
    }

    fn parse_using_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Using)?;
        self.expect(&TokenKind::LParen)?;
        let start = self.current().span.start;
        let resource = if self.is_local_decl_start() {
            let decl = self.parse_local_decl(false)?;
            self.mk_stmt(StmtKind::Local(decl), start)
        } else {
            let expr = self.parse_expr()?;
            self.mk_stmt(StmtKind::Expr(expr), start)
        };
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::Using { resource: Box::new(resource), body })
    }

    fn parse_fixed_stmt(&mut self, start: usize) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let decl = self.parse_local_decl(false)?;
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(self.mk_stmt(StmtKind::Fixed { decl, body }, start))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Parse an expression, including (right associative) assignment.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let target = self.parse_expr_bp(0)?;

        if let Some(op) = assign_op(self.current_kind()) {
            self.advance();
            let value = self.parse_expr()?;
            return Ok(self.mk_expr(
                ExprKind::Assign { op, target: Box::new(target), value: Box::new(value) },
                start,
            ));
        }

        Ok(target)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let mut lhs = self.parse_prefix()?;

        loop {
            if let Some(bp) = self.postfix_bp() {
                if bp < min_bp {
                    break;
                }
                lhs = self.parse_postfix(lhs, start)?;
                continue;
            }

            if self.check(&TokenKind::Is) || self.check(&TokenKind::As) {
                if Self::RELATIONAL_BP < min_bp {
                    break;
                }
                lhs = self.parse_type_test(lhs, start)?;
                continue;
            }

            if self.check(&TokenKind::Question) {
                if Self::CONDITIONAL_BP < min_bp {
                    break;
                }
                self.advance();
                let then_expr = self.parse_expr()?;
                self.expect(&TokenKind::Colon)?;
                let else_expr = self.parse_expr_bp(Self::CONDITIONAL_BP)?;
                lhs = self.mk_expr(
                    ExprKind::Conditional {
                        cond: Box::new(lhs),
                        then_expr: Box::new(then_expr),
                        else_expr: Box::new(else_expr),
                    },
                    start,
                );
                continue;
            }

            if let Some((l_bp, r_bp)) = self.infix_bp() {
                if l_bp < min_bp {
                    break;
                }
                let op = self.parse_binop()?;
                let rhs = self.parse_expr_bp(r_bp)?;
                lhs = self.mk_expr(ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) }, start);
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    /// `x is T`, `x is T name`, `x is null`, `x is not null`, `x as T`
    fn parse_type_test(&mut self, lhs: Expr, start: usize) -> Result<Expr, ParseError> {
        if self.match_token(&TokenKind::As) {
            let ty = self.parse_type()?;
            return Ok(self.mk_expr(ExprKind::As { expr: Box::new(lhs), ty }, start));
        }

        self.expect(&TokenKind::Is)?;
        let negated = self.check_ident("not") && matches!(self.peek(1), TokenKind::Null);
        if negated {
            self.advance();
        }
        if self.check(&TokenKind::Null) {
            let null_start = self.current().span.start;
            self.advance();
            let null = self.mk_expr(ExprKind::Null, null_start);
            let op = if negated { BinOp::Ne } else { BinOp::Eq };
            return Ok(self.mk_expr(ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(null) }, start));
        }

        let ty = self.parse_type()?;
        let designation = match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Some(name)
            }
            _ => None,
        };
        Ok(self.mk_expr(ExprKind::Is { expr: Box::new(lhs), ty, designation }, start))
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;

        match self.current_kind().clone() {
            TokenKind::Int(n, suffix) => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Int(n, suffix), start))
            }
            TokenKind::Real(n, suffix) => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Real(n, suffix), start))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(self.mk_expr(ExprKind::String(s), start))
            }
            TokenKind::Char(c) => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Char(c), start))
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Bool(b), start))
            }
            TokenKind::Null => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Null, start))
            }
            TokenKind::This => {
                self.advance();
                Ok(self.mk_expr(ExprKind::This, start))
            }
            TokenKind::Base => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Base, start))
            }

            TokenKind::Ident(name) if name == "await" && self.is_expr_start_at(self.pos + 1) => {
                self.advance();
                let operand = self.parse_expr_bp(Self::PREFIX_BP)?;
                Ok(self.mk_expr(ExprKind::Unary { op: UnaryOp::Await, operand: Box::new(operand) }, start))
            }
            TokenKind::Ident(name) => {
                let generic = self.looks_like_generic_name();
                self.advance();
                if generic {
                    // type arguments on a generic method or type name carry no values
                    self.parse_type_args()?;
                }
                Ok(self.mk_expr(ExprKind::Ident(name), start))
            }

            // `int.MaxValue`, `string.Empty`
            ref k if k.is_predefined_type() => {
                let keyword = predefined_type(k).map(PredefinedType::keyword).unwrap_or("object");
                self.advance();
                Ok(self.mk_expr(ExprKind::Ident(keyword.to_string()), start))
            }

            TokenKind::LParen => {
                if self.looks_like_cast() {
                    self.advance();
                    let ty = self.parse_type()?;
                    self.expect(&TokenKind::RParen)?;
                    let expr = self.parse_expr_bp(Self::PREFIX_BP)?;
                    return Ok(self.mk_expr(ExprKind::Cast { ty, expr: Box::new(expr) }, start));
                }
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(self.mk_expr(ExprKind::Paren(Box::new(inner)), start))
            }

            TokenKind::New => self.parse_new(start),
            TokenKind::Stackalloc => self.parse_stackalloc(start),

            TokenKind::Typeof => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let ty = self.parse_type()?;
                self.expect(&TokenKind::RParen)?;
                Ok(self.mk_expr(ExprKind::TypeOf(ty), start))
            }
            TokenKind::Sizeof => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let ty = self.parse_type()?;
                self.expect(&TokenKind::RParen)?;
                Ok(self.mk_expr(ExprKind::SizeOf(ty), start))
            }
            TokenKind::Default => {
                self.advance();
                let ty = if self.check(&TokenKind::LParen) && self.scan_type(self.pos + 1).is_some() {
                    self.advance();
                    let ty = self.parse_type()?;
                    self.expect(&TokenKind::RParen)?;
                    Some(ty)
                } else {
                    None
                };
                Ok(self.mk_expr(ExprKind::Default(ty), start))
            }

            // Unary operators
            TokenKind::Minus => self.parse_unary(UnaryOp::Neg, start),
            TokenKind::Plus => self.parse_unary(UnaryOp::Plus, start),
            TokenKind::Bang => self.parse_unary(UnaryOp::Not, start),
            TokenKind::Tilde => self.parse_unary(UnaryOp::BitNot, start),
            TokenKind::PlusPlus => self.parse_unary(UnaryOp::PreInc, start),
            TokenKind::MinusMinus => self.parse_unary(UnaryOp::PreDec, start),
            TokenKind::Amp => self.parse_unary(UnaryOp::AddressOf, start),
            TokenKind::Star => self.parse_unary(UnaryOp::Deref, start),

            _ => Err(ParseError::expected("expression", self.current_kind(), self.current().span)),
        }
    }

    fn parse_unary(&mut self, op: UnaryOp, start: usize) -> Result<Expr, ParseError> {
        self.advance();
        let operand = self.parse_expr_bp(Self::PREFIX_BP)?;
        Ok(self.mk_expr(ExprKind::Unary { op, operand: Box::new(operand) }, start))
    }

    fn parse_new(&mut self, start: usize) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::New)?;

        // `new[] { ... }`
        if self.check(&TokenKind::LBracket) {
            self.advance();
            while self.match_token(&TokenKind::Comma) {}
            self.expect(&TokenKind::RBracket)?;
            let elements = self.parse_initializer_elements()?;
            return Ok(self.mk_expr(ExprKind::ImplicitArrayCreation { elements }, start));
        }

        // target-typed `new(...)`
        if self.check(&TokenKind::LParen) {
            let args = self.parse_arguments()?;
            let initializer =
                if self.check(&TokenKind::LBrace) { Some(self.parse_initializer_elements()?) } else { None };
            return Ok(self.mk_expr(ExprKind::ObjectCreation { ty: None, args, initializer }, start));
        }

        let ty = self.parse_non_array_type()?;

        if self.check(&TokenKind::LBracket) {
            let mut ranks = Vec::new();
            while self.check(&TokenKind::LBracket) {
                let rank_start = self.current().span.start;
                self.advance();
                let mut sizes = Vec::new();
                loop {
                    if self.check(&TokenKind::Comma) || self.check(&TokenKind::RBracket) {
                        sizes.push(ArraySize::Omitted);
                    } else {
                        sizes.push(ArraySize::Expr(self.parse_expr()?));
                    }
                    if !self.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket)?;
                ranks.push(RankSpecifier { sizes, span: Span::new(rank_start, self.prev_end()) });
            }

            let initializer =
                if self.check(&TokenKind::LBrace) { Some(self.parse_initializer_elements()?) } else { None };
            let sized = ranks
                .first()
                .map(|r| r.sizes.iter().all(|s| matches!(s, ArraySize::Expr(_))))
                .unwrap_or(false);
            if initializer.is_none() && !sized {
                return Err(ParseError::expected(
                    "array size or initializer",
                    self.current_kind(),
                    Span::new(start, self.prev_end()),
                ));
            }
            return Ok(self.mk_expr(ExprKind::ArrayCreation { element: ty, ranks, initializer }, start));
        }

        let has_args = self.check(&TokenKind::LParen);
        let args = if has_args { self.parse_arguments()? } else { Vec::new() };
        let initializer =
            if self.check(&TokenKind::LBrace) { Some(self.parse_initializer_elements()?) } else { None };
        if !has_args && initializer.is_none() {
            return Err(ParseError::expected("'('", self.current_kind(), self.current().span));
        }
        Ok(self.mk_expr(ExprKind::ObjectCreation { ty: Some(ty), args, initializer }, start))
    }

    fn parse_stackalloc(&mut self, start: usize) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::Stackalloc)?;
        let element = if self.check(&TokenKind::LBracket) { None } else { Some(self.parse_non_array_type()?) };
        self.expect(&TokenKind::LBracket)?;
        let size = if self.check(&TokenKind::RBracket) { None } else { Some(Box::new(self.parse_expr()?)) };
        self.expect(&TokenKind::RBracket)?;
        let initializer =
            if self.check(&TokenKind::LBrace) { Some(self.parse_initializer_elements()?) } else { None };
        Ok(self.mk_expr(ExprKind::StackAlloc { element, size, initializer }, start))
    }

    fn parse_postfix(&mut self, lhs: Expr, start: usize) -> Result<Expr, ParseError> {
        match self.current_kind() {
            TokenKind::Dot | TokenKind::QuestionDot | TokenKind::Arrow => {
                let conditional = self.check(&TokenKind::QuestionDot);
                self.advance();
                let generic = self.looks_like_generic_name();
                let name = self.expect_ident()?;
                if generic {
                    self.parse_type_args()?;
                }
                Ok(self.mk_expr(ExprKind::Member { object: Box::new(lhs), name, conditional }, start))
            }
            TokenKind::LParen => {
                let args = self.parse_arguments()?;
                Ok(self.mk_expr(ExprKind::Invocation { callee: Box::new(lhs), args }, start))
            }
            TokenKind::LBracket => {
                self.advance();
                let args = self.parse_argument_list(&TokenKind::RBracket)?;
                self.expect(&TokenKind::RBracket)?;
                Ok(self.mk_expr(ExprKind::ElementAccess { object: Box::new(lhs), args }, start))
            }
            TokenKind::PlusPlus => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Postfix { op: PostfixOp::Inc, operand: Box::new(lhs) }, start))
            }
            TokenKind::MinusMinus => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Postfix { op: PostfixOp::Dec, operand: Box::new(lhs) }, start))
            }
            _ => Err(ParseError::expected("expression", self.current_kind(), self.current().span)),
        }
    }

    /// `( args )`
    fn parse_arguments(&mut self) -> Result<Vec<Argument>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let args = self.parse_argument_list(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_argument_list(&mut self, close: &TokenKind) -> Result<Vec<Argument>, ParseError> {
        let mut args = Vec::new();
        if self.check(close) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_argument()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn parse_argument(&mut self) -> Result<Argument, ParseError> {
        let name = match self.current_kind().clone() {
            TokenKind::Ident(name) if matches!(self.peek(1), TokenKind::Colon) => {
                self.advance();
                self.advance();
                Some(name)
            }
            _ => None,
        };

        let modifier = match self.current_kind() {
            TokenKind::Ref => Some(ArgModifier::Ref),
            TokenKind::Out => Some(ArgModifier::Out),
            TokenKind::In => Some(ArgModifier::In),
            _ => None,
        };
        if modifier.is_some() {
            self.advance();
        }

        // `out var x` / `out int x` declares x in the enclosing scope
        if modifier == Some(ArgModifier::Out) {
            if let Some(p) = self.scan_type(self.pos) {
                if matches!(self.kind_at(p), TokenKind::Ident(_))
                    && matches!(self.kind_at(p + 1), TokenKind::Comma | TokenKind::RParen)
                {
                    self.parse_type()?;
                    let start = self.current().span.start;
                    let declared = self.expect_ident()?;
                    let expr = self.mk_expr(ExprKind::Ident(declared), start);
                    return Ok(Argument { name, modifier, expr });
                }
            }
        }

        let expr = self.parse_expr()?;
        Ok(Argument { name, modifier, expr })
    }

    // =========================================================================
    // Operator Precedence
    // =========================================================================

    const CONDITIONAL_BP: u8 = 2;
    const RELATIONAL_BP: u8 = 17;
    const PREFIX_BP: u8 = 25;

    fn postfix_bp(&self) -> Option<u8> {
        match self.current_kind() {
            TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::Dot
            | TokenKind::QuestionDot
            | TokenKind::Arrow
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => Some(27),
            _ => None,
        }
    }

    fn infix_bp(&self) -> Option<(u8, u8)> {
        match self.current_kind() {
            TokenKind::QuestionQuestion => Some((4, 3)),
            TokenKind::PipePipe => Some((5, 6)),
            TokenKind::AmpAmp => Some((7, 8)),
            TokenKind::Pipe => Some((9, 10)),
            TokenKind::Caret => Some((11, 12)),
            TokenKind::Amp => Some((13, 14)),
            TokenKind::EqEq | TokenKind::BangEq => Some((15, 16)),
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
                Some((Self::RELATIONAL_BP, Self::RELATIONAL_BP + 1))
            }
            TokenKind::LtLt | TokenKind::GtGt => Some((19, 20)),
            TokenKind::Plus | TokenKind::Minus => Some((21, 22)),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((23, 24)),
            _ => None,
        }
    }

    fn parse_binop(&mut self) -> Result<BinOp, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::BangEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::GtEq => BinOp::Ge,
            TokenKind::AmpAmp => BinOp::And,
            TokenKind::PipePipe => BinOp::Or,
            TokenKind::Amp => BinOp::BitAnd,
            TokenKind::Pipe => BinOp::BitOr,
            TokenKind::Caret => BinOp::BitXor,
            TokenKind::LtLt => BinOp::Shl,
            TokenKind::GtGt => BinOp::Shr,
            TokenKind::QuestionQuestion => BinOp::Coalesce,
            _ => {
                return Err(ParseError::expected(
                    "operator like '+' or '-'",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };
        self.advance();
        Ok(op)
    }
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Mod,
        TokenKind::AmpEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        TokenKind::LtLtEq => AssignOp::Shl,
        TokenKind::GtGtEq => AssignOp::Shr,
        TokenKind::QuestionQuestionEq => AssignOp::Coalesce,
        _ => return None,
    })
}

fn predefined_type(kind: &TokenKind) -> Option<PredefinedType> {
    Some(match kind {
        TokenKind::BoolKw => PredefinedType::Bool,
        TokenKind::Byte => PredefinedType::Byte,
        TokenKind::SByte => PredefinedType::SByte,
        TokenKind::Short => PredefinedType::Short,
        TokenKind::UShort => PredefinedType::UShort,
        TokenKind::IntKw => PredefinedType::Int,
        TokenKind::UInt => PredefinedType::UInt,
        TokenKind::Long => PredefinedType::Long,
        TokenKind::ULong => PredefinedType::ULong,
        TokenKind::CharKw => PredefinedType::Char,
        TokenKind::Float => PredefinedType::Float,
        TokenKind::Double => PredefinedType::Double,
        TokenKind::Decimal => PredefinedType::Decimal,
        TokenKind::Object => PredefinedType::Object,
        TokenKind::StringKw => PredefinedType::String,
        TokenKind::Void => PredefinedType::Void,
        _ => return None,
    })
}

/// Result of parsing: the compilation unit plus any errors found.
#[derive(Debug)]
pub struct ParseResult {
    pub unit: CompilationUnit,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A parse error with location and friendly message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl ParseError {
    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format_expected_message(expected, found);
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self { span, message, hint }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &TokenKind) -> String {
    match expected {
        "';'" => format!("Expected ';', found {}", found.display_name()),
        "'{'" => format!("Expected '{{' to start block, found {}", found.display_name()),
        "'}'" => format!("Expected '}}' to close block, found {}", found.display_name()),
        "')'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '(' - missing ')'".to_string()
            } else {
                format!("Expected ')', found {}", found.display_name())
            }
        }
        "']'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '[' - missing ']'".to_string()
            } else {
                format!("Expected ']', found {}", found.display_name())
            }
        }
        "a name" => format!("Expected name, found {}", found.display_name()),
        "array size or initializer" => "Array creation needs a size or an initializer".to_string(),
        _ => format!("Expected {}, found {}", expected, found.display_name()),
    }
}
