//! Statement parsing.

use crate::{ParseError, Parser};
use silica_ir::{StmtId, StmtKind, TokenKind};

impl Parser {
    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> Result<StmtId, ParseError> {
        let open = self.expect(TokenKind::LBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace)? {
            if self.at_eof()? {
                let token = self.current()?;
                return Err(ParseError::expected("`}`", &token));
            }
            stmts.push(self.parse_stmt()?);
        }
        let close = self.advance()?; // the `}`
        let stmts = self.ast.alloc_stmt_list(stmts);
        Ok(self.alloc_stmt(StmtKind::Block { stmts }, open.span.merge(close.span)))
    }

    pub(crate) fn parse_stmt(&mut self) -> Result<StmtId, ParseError> {
        let token = self.current()?;
        match token.kind {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Semicolon => {
                let token = self.advance()?;
                Ok(self.alloc_stmt(StmtKind::Empty, token.span))
            }
            TokenKind::TypeName(_) => self.parse_local(),
            _ => {
                let expr = self.parse_expr()?;
                let semi = self.expect(TokenKind::Semicolon, "`;`")?;
                let span = self.expr_span(expr).merge(semi.span);
                Ok(self.alloc_stmt(StmtKind::Expr(expr), span))
            }
        }
    }

    /// `type name [= init] ;`
    fn parse_local(&mut self) -> Result<StmtId, ParseError> {
        let (ty, ty_span) = self.parse_type()?;
        let (name, _) = self.expect_ident()?;
        let init = if self.eat(TokenKind::Eq)? {
            Some(self.parse_initializer()?)
        } else {
            None
        };
        let semi = self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(self.alloc_stmt(StmtKind::Local { ty, name, init }, ty_span.merge(semi.span)))
    }

    fn parse_if(&mut self) -> Result<StmtId, ParseError> {
        let kw = self.expect(TokenKind::If, "`if`")?;
        self.expect(TokenKind::LParen, "`(`")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "`)`")?;
        let then_branch = self.parse_stmt()?;
        let mut span = kw.span.merge(self.ast.stmt(then_branch).span);

        let else_branch = if self.eat(TokenKind::Else)? {
            let stmt = self.parse_stmt()?;
            span = span.merge(self.ast.stmt(stmt).span);
            Some(stmt)
        } else {
            None
        };

        Ok(self.alloc_stmt(StmtKind::If { cond, then_branch, else_branch }, span))
    }

    fn parse_while(&mut self) -> Result<StmtId, ParseError> {
        let kw = self.expect(TokenKind::While, "`while`")?;
        self.expect(TokenKind::LParen, "`(`")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "`)`")?;
        let body = self.parse_stmt()?;
        let span = kw.span.merge(self.ast.stmt(body).span);
        Ok(self.alloc_stmt(StmtKind::While { cond, body }, span))
    }

    /// `for (init; cond; step) body`, each clause optional.
    fn parse_for(&mut self) -> Result<StmtId, ParseError> {
        let kw = self.expect(TokenKind::For, "`for`")?;
        self.expect(TokenKind::LParen, "`(`")?;

        let init = if self.eat(TokenKind::Semicolon)? {
            None
        } else if matches!(self.current()?.kind, TokenKind::TypeName(_)) {
            Some(self.parse_local()?)
        } else {
            let expr = self.parse_expr()?;
            let semi = self.expect(TokenKind::Semicolon, "`;`")?;
            let span = self.expr_span(expr).merge(semi.span);
            Some(self.alloc_stmt(StmtKind::Expr(expr), span))
        };

        let cond = if self.check(TokenKind::Semicolon)? {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "`;`")?;

        let step = if self.check(TokenKind::RParen)? {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RParen, "`)`")?;

        let body = self.parse_stmt()?;
        let span = kw.span.merge(self.ast.stmt(body).span);
        Ok(self.alloc_stmt(StmtKind::For { init, cond, step, body }, span))
    }

    fn parse_return(&mut self) -> Result<StmtId, ParseError> {
        let kw = self.expect(TokenKind::Return, "`return`")?;
        let value = if self.check(TokenKind::Semicolon)? {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let semi = self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(self.alloc_stmt(StmtKind::Return { value }, kw.span.merge(semi.span)))
    }
}
