//! Type specifier parsing.

use crate::{ParseError, Parser};
use silica_ir::{Span, TokenKind};
use silica_types::Type;

impl Parser {
    /// Parse a type specifier.
    ///
    /// The lexer already resolved every built-in type name to its type, so
    /// this is a direct lookup with no fallback rule.
    pub(crate) fn parse_type(&mut self) -> Result<(Type, Span), ParseError> {
        let token = self.current()?;
        match token.kind {
            TokenKind::TypeName(ty) => {
                self.advance()?;
                Ok((ty, token.span))
            }
            _ => Err(ParseError::expected("type specifier", &token)),
        }
    }
}
