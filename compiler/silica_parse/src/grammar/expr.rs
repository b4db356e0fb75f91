//! Expression parsing: precedence climbing in GLSL's operator order
//! (assignment < comma < ternary < logical-or < logical-and < bitwise-or <
//! bitwise-xor < bitwise-and < equality < relational < shift < additive <
//! multiplicative < unary < postfix).

use crate::{ParseError, Parser};
use silica_ir::{BinaryOp, ExprId, ExprKind, TokenKind, UnaryOp};

fn match_equality_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::EqEq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        _ => None,
    }
}

fn match_relational_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        _ => None,
    }
}

fn match_shift_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Shl => Some(BinaryOp::Shl),
        TokenKind::Shr => Some(BinaryOp::Shr),
        _ => None,
    }
}

fn match_additive_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        _ => None,
    }
}

fn match_multiplicative_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Mod),
        _ => None,
    }
}

fn match_unary_op(kind: TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Bang => Some(UnaryOp::Not),
        TokenKind::Tilde => Some(UnaryOp::BitNot),
        _ => None,
    }
}

macro_rules! binary_tier {
    ($name:ident, $next:ident, $matcher:ident) => {
        fn $name(&mut self) -> Result<ExprId, ParseError> {
            let mut lhs = self.$next()?;
            loop {
                let Some(op) = $matcher(self.current()?.kind) else {
                    return Ok(lhs);
                };
                self.advance()?;
                let rhs = self.$next()?;
                let span = self.expr_span(lhs).merge(self.expr_span(rhs));
                lhs = self.alloc_expr(ExprKind::Binary { op, lhs, rhs }, span);
            }
        }
    };
}

impl Parser {
    /// Full expression: the assignment level.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        self.parse_assign()
    }

    /// Expression in contexts where `,` separates (arguments, initializers):
    /// enters the ladder at the ternary level.
    pub(crate) fn parse_initializer(&mut self) -> Result<ExprId, ParseError> {
        self.parse_ternary()
    }

    fn parse_assign(&mut self) -> Result<ExprId, ParseError> {
        let target = self.parse_comma()?;
        if !self.eat(TokenKind::Eq)? {
            return Ok(target);
        }
        // Right-associative.
        let value = self.parse_assign()?;
        let span = self.expr_span(target).merge(self.expr_span(value));
        Ok(self.alloc_expr(ExprKind::Assign { target, value }, span))
    }

    fn parse_comma(&mut self) -> Result<ExprId, ParseError> {
        let mut first = self.parse_ternary()?;
        while self.eat(TokenKind::Comma)? {
            let second = self.parse_ternary()?;
            let span = self.expr_span(first).merge(self.expr_span(second));
            first = self.alloc_expr(ExprKind::Comma { first, second }, span);
        }
        Ok(first)
    }

    fn parse_ternary(&mut self) -> Result<ExprId, ParseError> {
        let cond = self.parse_logical_or()?;
        if !self.eat(TokenKind::Question)? {
            return Ok(cond);
        }
        let then_branch = self.parse_ternary()?;
        self.expect(TokenKind::Colon, "`:`")?;
        let else_branch = self.parse_ternary()?;
        let span = self.expr_span(cond).merge(self.expr_span(else_branch));
        Ok(self.alloc_expr(ExprKind::Ternary { cond, then_branch, else_branch }, span))
    }

    fn parse_logical_or(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_logical_and()?;
        while self.check(TokenKind::PipePipe)? {
            self.advance()?;
            let rhs = self.parse_logical_and()?;
            let span = self.expr_span(lhs).merge(self.expr_span(rhs));
            lhs = self.alloc_expr(
                ExprKind::Binary { op: BinaryOp::LogicalOr, lhs, rhs },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_logical_and(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_bit_or()?;
        while self.check(TokenKind::AmpAmp)? {
            self.advance()?;
            let rhs = self.parse_bit_or()?;
            let span = self.expr_span(lhs).merge(self.expr_span(rhs));
            lhs = self.alloc_expr(
                ExprKind::Binary { op: BinaryOp::LogicalAnd, lhs, rhs },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_bit_or(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_bit_xor()?;
        while self.check(TokenKind::Pipe)? {
            self.advance()?;
            let rhs = self.parse_bit_xor()?;
            let span = self.expr_span(lhs).merge(self.expr_span(rhs));
            lhs = self.alloc_expr(ExprKind::Binary { op: BinaryOp::BitOr, lhs, rhs }, span);
        }
        Ok(lhs)
    }

    fn parse_bit_xor(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_bit_and()?;
        while self.check(TokenKind::Caret)? {
            self.advance()?;
            let rhs = self.parse_bit_and()?;
            let span = self.expr_span(lhs).merge(self.expr_span(rhs));
            lhs = self.alloc_expr(ExprKind::Binary { op: BinaryOp::BitXor, lhs, rhs }, span);
        }
        Ok(lhs)
    }

    fn parse_bit_and(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.check(TokenKind::Amp)? {
            self.advance()?;
            let rhs = self.parse_equality()?;
            let span = self.expr_span(lhs).merge(self.expr_span(rhs));
            lhs = self.alloc_expr(ExprKind::Binary { op: BinaryOp::BitAnd, lhs, rhs }, span);
        }
        Ok(lhs)
    }

    binary_tier!(parse_equality, parse_relational, match_equality_op);
    binary_tier!(parse_relational, parse_shift, match_relational_op);
    binary_tier!(parse_shift, parse_additive, match_shift_op);
    binary_tier!(parse_additive, parse_multiplicative, match_additive_op);
    binary_tier!(parse_multiplicative, parse_unary, match_multiplicative_op);

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.current()?;
        let Some(op) = match_unary_op(token.kind) else {
            return self.parse_postfix();
        };
        self.advance()?;
        let operand = self.parse_unary()?;
        let span = token.span.merge(self.expr_span(operand));
        Ok(self.alloc_expr(ExprKind::Unary { op, operand }, span))
    }

    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(TokenKind::Dot)? {
                let (field, field_span) = self.expect_ident()?;
                let span = self.expr_span(expr).merge(field_span);
                expr = self.alloc_expr(ExprKind::Member { base: expr, field }, span);
            } else if self.eat(TokenKind::LBracket)? {
                let index = self.parse_expr()?;
                let close = self.expect(TokenKind::RBracket, "`]`")?;
                let span = self.expr_span(expr).merge(close.span);
                expr = self.alloc_expr(ExprKind::Index { base: expr, index }, span);
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.current()?;
        match token.kind {
            TokenKind::Int(n) => {
                self.advance()?;
                Ok(self.alloc_expr(ExprKind::Int(n), token.span))
            }
            TokenKind::Uint(n) => {
                self.advance()?;
                Ok(self.alloc_expr(ExprKind::Uint(n), token.span))
            }
            TokenKind::Float(bits) => {
                self.advance()?;
                Ok(self.alloc_expr(ExprKind::Float(bits), token.span))
            }
            TokenKind::Double(bits) => {
                self.advance()?;
                Ok(self.alloc_expr(ExprKind::Double(bits), token.span))
            }
            TokenKind::Bool(b) => {
                self.advance()?;
                Ok(self.alloc_expr(ExprKind::Bool(b), token.span))
            }
            TokenKind::Ident(name) => {
                self.advance()?;
                if self.check(TokenKind::LParen)? {
                    let (args, end) = self.parse_call_args()?;
                    let span = token.span.merge(end);
                    Ok(self.alloc_expr(ExprKind::Call { callee: name, args }, span))
                } else {
                    Ok(self.alloc_expr(ExprKind::Ident(name), token.span))
                }
            }
            TokenKind::TypeName(ty) => {
                // Type names in expressions are constructor calls.
                self.advance()?;
                if !self.check(TokenKind::LParen)? {
                    let found = self.current()?;
                    return Err(ParseError::expected("`(`", &found));
                }
                let (args, end) = self.parse_call_args()?;
                let span = token.span.merge(end);
                Ok(self.alloc_expr(ExprKind::Construct { ty, args }, span))
            }
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            _ => Err(ParseError::expected("expression", &token)),
        }
    }

    /// `( [arg [, arg]*] )`, arguments at the ternary level so `,` keeps its
    /// separator role. Returns the arguments and the closing paren's span.
    fn parse_call_args(
        &mut self,
    ) -> Result<(silica_ir::ExprRange, silica_ir::Span), ParseError> {
        self.expect(TokenKind::LParen, "`(`")?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen)? {
            loop {
                args.push(self.parse_initializer()?);
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen, "`)`")?;
        let args = self.ast.alloc_expr_list(args);
        Ok((args, close.span))
    }
}
