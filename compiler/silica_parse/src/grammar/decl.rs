//! Top-level declaration parsing.

use crate::{ParseError, Parser};
use silica_diagnostic::ErrorCode;
use silica_ir::{
    Decl, DeclId, DeclKind, FunctionDecl, GlobalDecl, LayoutQualifiers, Module, Param,
    StorageQualifier, TokenKind,
};
use silica_types::Type;
use tracing::trace;

impl Parser {
    pub(crate) fn parse_module(&mut self) -> Result<Module, ParseError> {
        let mut module = Module::default();
        while !self.at_eof()? {
            module.decls.push(self.parse_decl()?);
        }
        Ok(module)
    }

    /// One global declaration:
    /// `[layout(...)] [in|out|uniform|const] type name (function | variable)`.
    fn parse_decl(&mut self) -> Result<DeclId, ParseError> {
        let start = self.current()?.span;

        let layout = if self.check(TokenKind::Layout)? {
            self.parse_layout_qualifiers()?
        } else {
            LayoutQualifiers::default()
        };

        let storage = self.parse_storage_qualifier()?;
        let (ty, _) = self.parse_type()?;
        let (name, name_span) = self.expect_ident()?;

        if self.check(TokenKind::LParen)? {
            if storage != StorageQualifier::None || !layout.is_empty() {
                return Err(ParseError::syntax(
                    ErrorCode::E2001,
                    start.merge(name_span),
                    "qualifiers are not allowed on function definitions",
                ));
            }
            return self.parse_function(ty, name, start);
        }

        let init = if self.eat(TokenKind::Eq)? {
            Some(self.parse_initializer()?)
        } else {
            None
        };
        let semi = self.expect(TokenKind::Semicolon, "`;`")?;

        let decl = Decl {
            kind: DeclKind::Global(GlobalDecl { ty, name, storage, layout, init }),
            span: start.merge(semi.span),
        };
        Ok(self.ast.alloc_decl(decl))
    }

    fn parse_storage_qualifier(&mut self) -> Result<StorageQualifier, ParseError> {
        let storage = match self.current()?.kind {
            TokenKind::In => StorageQualifier::In,
            TokenKind::Out => StorageQualifier::Out,
            TokenKind::Uniform => StorageQualifier::Uniform,
            TokenKind::Const => StorageQualifier::Const,
            _ => return Ok(StorageQualifier::None),
        };
        self.advance()?;
        Ok(storage)
    }

    /// `layout ( key = INT [, key = INT]* )` with keys location/binding/set.
    fn parse_layout_qualifiers(&mut self) -> Result<LayoutQualifiers, ParseError> {
        self.expect(TokenKind::Layout, "`layout`")?;
        self.expect(TokenKind::LParen, "`(`")?;

        let mut layout = LayoutQualifiers::default();
        loop {
            let (key, key_span) = self.expect_ident()?;
            self.expect(TokenKind::Eq, "`=`")?;
            let value_token = self.current()?;
            let TokenKind::Int(value) = value_token.kind else {
                return Err(ParseError::expected("integer literal", &value_token));
            };
            self.advance()?;
            let value = u32::try_from(value).map_err(|_| {
                ParseError::syntax(
                    ErrorCode::E2001,
                    value_token.span,
                    "layout qualifier value out of range",
                )
            })?;

            match self.interner().lookup(key) {
                "location" => layout.location = Some(value),
                "binding" => layout.binding = Some(value),
                "set" => layout.set = Some(value),
                other => {
                    return Err(ParseError::syntax(
                        ErrorCode::E2001,
                        key_span,
                        format!("unknown layout qualifier `{other}`"),
                    ));
                }
            }

            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;
        Ok(layout)
    }

    fn parse_function(
        &mut self,
        return_type: Type,
        name: silica_ir::Name,
        start: silica_ir::Span,
    ) -> Result<DeclId, ParseError> {
        self.expect(TokenKind::LParen, "`(`")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen)? {
            // `(void)` is an empty parameter list.
            if self.current()?.kind == TokenKind::TypeName(Type::VOID) {
                self.advance()?;
            } else {
                loop {
                    let (ty, ty_span) = self.parse_type()?;
                    let (param_name, name_span) = self.expect_ident()?;
                    params.push(Param { ty, name: param_name, span: ty_span.merge(name_span) });
                    if !self.eat(TokenKind::Comma)? {
                        break;
                    }
                }
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;
        let params = self.ast.alloc_params(params);

        let body = self.parse_block()?;
        let end = self.ast.stmt(body).span;

        trace!(name = self.interner().lookup(name), "parsed function");

        let decl = Decl {
            kind: DeclKind::Function(FunctionDecl { return_type, name, params, body }),
            span: start.merge(end),
        };
        Ok(self.ast.alloc_decl(decl))
    }
}
