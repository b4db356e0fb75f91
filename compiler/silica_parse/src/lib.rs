//! Recursive-descent parser for the silica shading language.
//!
//! Consumes the preprocessor's one-token-lookahead stream and builds the
//! arena AST. Expression parsing is precedence climbing in GLSL's order;
//! type specifiers resolve through the lexer's exhaustive keyword table.
//! The first unexpected token aborts the unit — diagnostics stay
//! deterministic because there is deliberately no recovery.

mod error;
mod grammar;

pub use error::ParseError;

use silica_ir::{
    Ast, Expr, ExprId, ExprKind, Module, Name, SharedInterner, Span, Stmt, StmtId, StmtKind,
    Token, TokenKind,
};
use silica_pp::Preprocessor;
use tracing::trace;

/// Parser over a preprocessed token stream.
pub struct Parser {
    stream: Preprocessor,
    pub(crate) ast: Ast,
    interner: SharedInterner,
}

impl Parser {
    pub fn new(stream: Preprocessor) -> Self {
        let interner = stream.interner().clone();
        Parser { stream, ast: Ast::new(), interner }
    }

    /// Parse a whole translation unit.
    pub fn parse(mut self) -> Result<(Ast, Module), ParseError> {
        let module = self.parse_module()?;
        trace!(decls = module.decls.len(), "parsed translation unit");
        Ok((self.ast, module))
    }

    // ===== Cursor over the preprocessed stream =====

    /// The current token (one-token lookahead), without consuming it.
    pub(crate) fn current(&mut self) -> Result<Token, ParseError> {
        Ok(*self.stream.peek()?)
    }

    pub(crate) fn advance(&mut self) -> Result<Token, ParseError> {
        Ok(self.stream.consume()?)
    }

    pub(crate) fn at_eof(&mut self) -> Result<bool, ParseError> {
        Ok(self.current()?.kind == TokenKind::Eof)
    }

    /// Whether the current token matches `kind` exactly.
    pub(crate) fn check(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        Ok(self.current()?.kind == kind)
    }

    /// Consume the current token if it matches `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.check(kind)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume a token of kind `kind` or fail with "expected ...".
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        let token = self.current()?;
        if token.kind == kind {
            self.advance()
        } else {
            Err(ParseError::expected(what, &token))
        }
    }

    /// Consume an identifier, returning its name and span.
    pub(crate) fn expect_ident(&mut self) -> Result<(Name, Span), ParseError> {
        let token = self.current()?;
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance()?;
                Ok((name, token.span))
            }
            _ => Err(ParseError::expected("identifier", &token)),
        }
    }

    pub(crate) fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    // ===== Node construction =====

    pub(crate) fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.ast.alloc_expr(Expr { kind, span })
    }

    pub(crate) fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.ast.alloc_stmt(Stmt { kind, span })
    }

    pub(crate) fn expr_span(&self, id: ExprId) -> Span {
        self.ast.expr(id).span
    }
}
