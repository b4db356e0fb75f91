//! Preprocessor for the silica shading language.
//!
//! Wraps the lexed token stream and hands the parser a macro-expanded,
//! newline-free view with one-token lookahead ([`Preprocessor::peek`] /
//! [`Preprocessor::consume`]).
//!
//! Directives: `#define` (plain and simple function-like), `#undef`,
//! `#ifdef`/`#ifndef`/`#else`/`#endif`, `#error`, and `#version`/
//! `#extension` (recognized, not enforced). Macro expansion tracks an
//! active-expansion set so recursive substitution stops at the recursive
//! mention instead of looping.
//!
//! The per-unit macro table is seeded from an immutable [`Defines`]
//! configuration before the first source token is read; the most recent
//! write for a name wins regardless of origin.

mod defines;

pub use defines::Defines;

use rustc_hash::{FxHashMap, FxHashSet};
use silica_diagnostic::{Diagnostic, ErrorCode};
use silica_ir::{Name, SharedInterner, Span, Token, TokenKind, TokenList};
use std::collections::VecDeque;

/// Preprocessing failure: code, offending span, rendered message.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PpError {
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
}

impl PpError {
    fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        PpError { code, span, message: message.into() }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, self.message)
    }
}

impl std::fmt::Display for PpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PpError {}

/// One macro definition.
#[derive(Clone, Debug)]
struct Macro {
    /// `Some` for function-like macros, with the parameter names in order.
    params: Option<Vec<Name>>,
    body: Vec<Token>,
    /// Seeded from [`Defines`]; a source `#define` may overwrite these
    /// without a conflict error (most recent write wins).
    from_cli: bool,
}

impl Macro {
    /// "Same text": identical parameter lists and body token kinds.
    fn same_definition(&self, other: &Macro) -> bool {
        self.params == other.params
            && self.body.len() == other.body.len()
            && self
                .body
                .iter()
                .zip(&other.body)
                .all(|(a, b)| a.kind == b.kind)
    }
}

/// One `#ifdef`/`#ifndef` nesting frame.
#[derive(Clone, Copy, Debug)]
struct CondFrame {
    /// Tokens in the current branch reach the parser.
    active: bool,
    /// The enclosing region was active when this frame opened.
    parent_active: bool,
    /// Some branch of this conditional has already been taken.
    taken: bool,
    seen_else: bool,
    /// Span of the opening directive, for unterminated-block reporting.
    open_span: Span,
}

/// Macro-expanding token stream with one-token lookahead.
pub struct Preprocessor {
    tokens: TokenList,
    pos: usize,
    interner: SharedInterner,
    macros: FxHashMap<Name, Macro>,
    /// Fully expanded tokens awaiting delivery.
    pending: VecDeque<Token>,
    lookahead: Option<Token>,
    conds: Vec<CondFrame>,
    at_line_start: bool,
}

impl Preprocessor {
    /// Build a preprocessor over `tokens`, seeding the macro table from
    /// `defines` (later entries for a name override earlier ones).
    pub fn new(
        tokens: TokenList,
        defines: &Defines,
        interner: SharedInterner,
    ) -> Result<Self, PpError> {
        let mut pp = Preprocessor {
            tokens,
            pos: 0,
            interner,
            macros: FxHashMap::default(),
            pending: VecDeque::new(),
            lookahead: None,
            conds: Vec::new(),
            at_line_start: true,
        };
        pp.seed(defines)?;
        Ok(pp)
    }

    fn seed(&mut self, defines: &Defines) -> Result<(), PpError> {
        for (name, value) in defines.iter() {
            let name_tokens = silica_lexer::lex(name, &self.interner).map_err(|e| {
                PpError::new(
                    ErrorCode::E1001,
                    Span::DUMMY,
                    format!("invalid external macro name `{name}`: {e}"),
                )
            })?;
            let name = match (name_tokens.get(0).map(|t| t.kind), name_tokens.len()) {
                // One token plus EOF, and it is an identifier.
                (Some(TokenKind::Ident(n)), 2) => n,
                _ => {
                    return Err(PpError::new(
                        ErrorCode::E1001,
                        Span::DUMMY,
                        format!("invalid external macro name `{name}`"),
                    ));
                }
            };

            let body = match value {
                Some(text) => {
                    let lexed = silica_lexer::lex(text, &self.interner).map_err(|e| {
                        PpError::new(
                            ErrorCode::E1001,
                            Span::DUMMY,
                            format!("invalid external macro value `{text}`: {e}"),
                        )
                    })?;
                    lexed
                        .iter()
                        .filter(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Eof))
                        .copied()
                        .collect()
                }
                None => Vec::new(),
            };

            // Most recent write wins; external seeds never conflict.
            self.macros
                .insert(name, Macro { params: None, body, from_cli: true });
        }
        Ok(())
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Whether `name` is currently defined (tests and tooling).
    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(&self.interner.intern(name))
    }

    /// Look at the next parser-visible token without consuming it.
    pub fn peek(&mut self) -> Result<&Token, PpError> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.next_token()?);
        }
        Ok(self
            .lookahead
            .as_ref()
            .unwrap_or_else(|| unreachable!("lookahead was just filled")))
    }

    /// Consume and return the next parser-visible token.
    pub fn consume(&mut self) -> Result<Token, PpError> {
        self.peek()?;
        Ok(self
            .lookahead
            .take()
            .unwrap_or_else(|| unreachable!("lookahead was just filled")))
    }

    // ===== Raw stream access =====

    fn raw_peek(&self) -> Token {
        self.tokens[self.pos]
    }

    fn raw_bump(&mut self) -> Token {
        let token = self.tokens[self.pos];
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn active(&self) -> bool {
        self.conds.last().map_or(true, |f| f.active)
    }

    // ===== The core pump =====

    fn next_token(&mut self) -> Result<Token, PpError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }

            let token = self.raw_peek();
            match token.kind {
                TokenKind::Eof => {
                    if let Some(frame) = self.conds.last() {
                        return Err(PpError::new(
                            ErrorCode::E1003,
                            frame.open_span,
                            "unterminated conditional block",
                        ));
                    }
                    return Ok(token);
                }
                TokenKind::Newline => {
                    self.raw_bump();
                    self.at_line_start = true;
                }
                TokenKind::Hash if self.at_line_start => {
                    self.raw_bump();
                    self.directive(token.span)?;
                }
                _ if !self.active() => {
                    self.raw_bump();
                    self.at_line_start = false;
                }
                TokenKind::Hash => {
                    return Err(PpError::new(
                        ErrorCode::E1001,
                        token.span,
                        "directives must start at the beginning of a line",
                    ));
                }
                TokenKind::Ident(name) if self.macros.contains_key(&name) => {
                    self.at_line_start = false;
                    self.expand_invocation(name)?;
                }
                _ => {
                    self.raw_bump();
                    self.at_line_start = false;
                    return Ok(token);
                }
            }
        }
    }

    /// Expand a macro mention found in the raw stream. Collects the
    /// invocation (name plus any parenthesized arguments), fully expands
    /// it, and queues the result.
    fn expand_invocation(&mut self, name: Name) -> Result<(), PpError> {
        let name_token = self.raw_bump();
        let function_like = self
            .macros
            .get(&name)
            .is_some_and(|m| m.params.is_some());

        let mut invocation = vec![name_token];
        if function_like {
            if self.raw_peek().kind == TokenKind::LParen {
                // Copy the argument list (newlines dropped, parens matched).
                invocation.push(self.raw_bump());
                let mut depth = 1usize;
                loop {
                    let token = self.raw_peek();
                    match token.kind {
                        TokenKind::Eof => {
                            return Err(PpError::new(
                                ErrorCode::E1001,
                                name_token.span,
                                "unterminated macro invocation",
                            ));
                        }
                        TokenKind::Newline => {
                            self.raw_bump();
                        }
                        TokenKind::LParen => {
                            depth += 1;
                            invocation.push(self.raw_bump());
                        }
                        TokenKind::RParen => {
                            depth -= 1;
                            invocation.push(self.raw_bump());
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {
                            invocation.push(self.raw_bump());
                        }
                    }
                }
            } else {
                // Function-like macro without arguments stays an identifier.
                self.pending.push_back(name_token);
                return Ok(());
            }
        }

        let mut active = FxHashSet::default();
        let expanded = expand_list(&self.macros, &self.interner, &invocation, &mut active)?;
        self.pending.extend(expanded);
        Ok(())
    }

    // ===== Directives =====

    fn directive(&mut self, hash_span: Span) -> Result<(), PpError> {
        let token = self.raw_peek();
        match token.kind {
            // A lone `#` is the null directive.
            TokenKind::Newline | TokenKind::Eof => Ok(()),
            TokenKind::Else => {
                self.raw_bump();
                self.directive_else(token.span)
            }
            TokenKind::Ident(name) => {
                self.raw_bump();
                match self.interner.lookup(name) {
                    "define" => self.directive_define(token.span),
                    "undef" => self.directive_undef(token.span),
                    "ifdef" => self.directive_ifdef(token.span, false),
                    "ifndef" => self.directive_ifdef(token.span, true),
                    "endif" => self.directive_endif(token.span),
                    "error" => self.directive_error(token.span),
                    "version" | "extension" => {
                        // Recognized but not semantically enforced.
                        self.skip_line();
                        Ok(())
                    }
                    other => Err(PpError::new(
                        ErrorCode::E1002,
                        token.span,
                        format!("unknown directive `#{other}`"),
                    )),
                }
            }
            _ => Err(PpError::new(
                ErrorCode::E1001,
                hash_span.merge(token.span),
                format!("malformed directive: expected a directive name, found {}", token.kind),
            )),
        }
    }

    /// Consume the rest of the directive line (excluding the newline).
    fn take_line(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            match self.raw_peek().kind {
                TokenKind::Newline | TokenKind::Eof => break,
                _ => tokens.push(self.raw_bump()),
            }
        }
        tokens
    }

    fn skip_line(&mut self) {
        while !matches!(self.raw_peek().kind, TokenKind::Newline | TokenKind::Eof) {
            self.raw_bump();
        }
    }

    fn expect_macro_name(&mut self, directive_span: Span) -> Result<(Name, Span), PpError> {
        let token = self.raw_peek();
        match token.kind {
            TokenKind::Ident(name) => {
                self.raw_bump();
                Ok((name, token.span))
            }
            _ => Err(PpError::new(
                ErrorCode::E1001,
                if matches!(token.kind, TokenKind::Newline | TokenKind::Eof) {
                    directive_span
                } else {
                    token.span
                },
                format!("expected macro name, found {}", token.kind),
            )),
        }
    }

    fn directive_define(&mut self, directive_span: Span) -> Result<(), PpError> {
        if !self.active() {
            self.skip_line();
            return Ok(());
        }
        let (name, name_span) = self.expect_macro_name(directive_span)?;

        // `#define F(x)` is function-like only when the paren is adjacent.
        let params = if self.raw_peek().kind == TokenKind::LParen
            && self.raw_peek().span.start == name_span.end
        {
            self.raw_bump();
            let mut params = Vec::new();
            if self.raw_peek().kind == TokenKind::RParen {
                self.raw_bump();
            } else {
                loop {
                    let token = self.raw_peek();
                    let TokenKind::Ident(param) = token.kind else {
                        return Err(PpError::new(
                            ErrorCode::E1001,
                            token.span,
                            format!("expected macro parameter name, found {}", token.kind),
                        ));
                    };
                    self.raw_bump();
                    params.push(param);
                    let token = self.raw_peek();
                    match token.kind {
                        TokenKind::Comma => {
                            self.raw_bump();
                        }
                        TokenKind::RParen => {
                            self.raw_bump();
                            break;
                        }
                        _ => {
                            return Err(PpError::new(
                                ErrorCode::E1001,
                                token.span,
                                format!("expected `,` or `)` in macro parameter list, found {}", token.kind),
                            ));
                        }
                    }
                }
            }
            Some(params)
        } else {
            None
        };

        let body = self.take_line();
        let mac = Macro { params, body, from_cli: false };

        if let Some(existing) = self.macros.get(&name) {
            if !existing.from_cli && !existing.same_definition(&mac) {
                return Err(PpError::new(
                    ErrorCode::E1004,
                    name_span,
                    format!(
                        "conflicting redefinition of macro `{}`",
                        self.interner.lookup(name)
                    ),
                ));
            }
        }
        self.macros.insert(name, mac);
        Ok(())
    }

    fn directive_undef(&mut self, directive_span: Span) -> Result<(), PpError> {
        if !self.active() {
            self.skip_line();
            return Ok(());
        }
        let (name, _) = self.expect_macro_name(directive_span)?;
        self.end_of_directive()?;
        self.macros.remove(&name);
        Ok(())
    }

    fn directive_ifdef(&mut self, directive_span: Span, invert: bool) -> Result<(), PpError> {
        let parent_active = self.active();
        if !parent_active {
            // Inactive region: track nesting, keep every branch inactive.
            self.skip_line();
            self.conds.push(CondFrame {
                active: false,
                parent_active: false,
                taken: true,
                seen_else: false,
                open_span: directive_span,
            });
            return Ok(());
        }
        let (name, _) = self.expect_macro_name(directive_span)?;
        self.end_of_directive()?;
        let defined = self.macros.contains_key(&name);
        let active = parent_active && (defined != invert);
        self.conds.push(CondFrame {
            active,
            parent_active,
            taken: active,
            seen_else: false,
            open_span: directive_span,
        });
        Ok(())
    }

    fn directive_else(&mut self, span: Span) -> Result<(), PpError> {
        self.end_of_directive()?;
        let Some(frame) = self.conds.last_mut() else {
            return Err(PpError::new(
                ErrorCode::E1006,
                span,
                "`#else` without matching `#ifdef`",
            ));
        };
        if frame.seen_else {
            return Err(PpError::new(ErrorCode::E1006, span, "duplicate `#else`"));
        }
        frame.seen_else = true;
        frame.active = frame.parent_active && !frame.taken;
        frame.taken |= frame.active;
        Ok(())
    }

    fn directive_endif(&mut self, span: Span) -> Result<(), PpError> {
        self.end_of_directive()?;
        if self.conds.pop().is_none() {
            return Err(PpError::new(
                ErrorCode::E1006,
                span,
                "`#endif` without matching `#ifdef`",
            ));
        }
        Ok(())
    }

    fn directive_error(&mut self, span: Span) -> Result<(), PpError> {
        if !self.active() {
            self.skip_line();
            return Ok(());
        }
        let message = self.take_line();
        let rendered = message
            .iter()
            .map(|t| self.render_token(t.kind))
            .collect::<Vec<_>>()
            .join(" ");
        let full_span = message
            .iter()
            .fold(span, |acc, t| acc.merge(t.span));
        Err(PpError::new(
            ErrorCode::E1005,
            full_span,
            if rendered.is_empty() {
                "#error".to_owned()
            } else {
                format!("#error: {rendered}")
            },
        ))
    }

    /// Source-ish rendering of a token for `#error` messages.
    fn render_token(&self, kind: TokenKind) -> String {
        match kind {
            TokenKind::Ident(name) => self.interner.lookup(name).to_owned(),
            other => other.to_string().replace('`', ""),
        }
    }

    /// Directives take the whole line; anything else trailing is malformed.
    fn end_of_directive(&mut self) -> Result<(), PpError> {
        let token = self.raw_peek();
        match token.kind {
            TokenKind::Newline | TokenKind::Eof => Ok(()),
            _ => Err(PpError::new(
                ErrorCode::E1001,
                token.span,
                format!("unexpected {} after directive", token.kind),
            )),
        }
    }
}

/// Fully expand a token sequence, guarding against recursive substitution
/// with `active` (names currently being expanded are left untouched).
fn expand_list(
    macros: &FxHashMap<Name, Macro>,
    interner: &SharedInterner,
    tokens: &[Token],
    active: &mut FxHashSet<Name>,
) -> Result<Vec<Token>, PpError> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let TokenKind::Ident(name) = token.kind else {
            out.push(token);
            i += 1;
            continue;
        };
        if active.contains(&name) {
            out.push(token);
            i += 1;
            continue;
        }
        let Some(mac) = macros.get(&name) else {
            out.push(token);
            i += 1;
            continue;
        };

        match &mac.params {
            None => {
                active.insert(name);
                let expansion = expand_list(macros, interner, &mac.body, active)?;
                active.remove(&name);
                out.extend(respan(expansion, token.span));
                i += 1;
            }
            Some(params) => {
                if tokens.get(i + 1).map(|t| t.kind) != Some(TokenKind::LParen) {
                    // No argument list: plain identifier.
                    out.push(token);
                    i += 1;
                    continue;
                }
                let (mut args, next) = collect_args(tokens, i + 2, token.span)?;
                if args.is_empty() && params.len() == 1 {
                    // `F()` passes one empty argument.
                    args.push(Vec::new());
                }
                if args.len() != params.len() {
                    return Err(PpError::new(
                        ErrorCode::E1007,
                        token.span,
                        format!(
                            "macro `{}` expects {} argument(s), found {}",
                            interner.lookup(name),
                            params.len(),
                            args.len()
                        ),
                    ));
                }

                // Arguments expand before substitution.
                let mut expanded_args = Vec::with_capacity(args.len());
                for arg in &args {
                    expanded_args.push(expand_list(macros, interner, arg, active)?);
                }

                let substituted = substitute(&mac.body, params, &expanded_args);
                active.insert(name);
                let expansion = expand_list(macros, interner, &substituted, active)?;
                active.remove(&name);
                out.extend(respan(expansion, token.span));
                i = next;
            }
        }
    }
    Ok(out)
}

/// Attribute expanded tokens to the invocation site.
fn respan(tokens: Vec<Token>, span: Span) -> impl Iterator<Item = Token> {
    tokens.into_iter().map(move |t| Token::new(t.kind, span))
}

/// Split a macro argument list starting just after the `(`. Returns the
/// arguments and the index one past the closing `)`.
fn collect_args(
    tokens: &[Token],
    mut i: usize,
    call_span: Span,
) -> Result<(Vec<Vec<Token>>, usize), PpError> {
    let mut args: Vec<Vec<Token>> = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut depth = 0usize;
    let mut any = false;

    while let Some(token) = tokens.get(i) {
        match token.kind {
            TokenKind::LParen => {
                depth += 1;
                current.push(*token);
            }
            TokenKind::RParen if depth > 0 => {
                depth -= 1;
                current.push(*token);
            }
            TokenKind::RParen => {
                if any || !current.is_empty() {
                    args.push(current);
                }
                return Ok((args, i + 1));
            }
            TokenKind::Comma if depth == 0 => {
                args.push(std::mem::take(&mut current));
                any = true;
            }
            _ => current.push(*token),
        }
        i += 1;
    }

    Err(PpError::new(
        ErrorCode::E1001,
        call_span,
        "unterminated macro invocation",
    ))
}

/// Replace parameter mentions in a macro body with argument token lists.
fn substitute(body: &[Token], params: &[Name], args: &[Vec<Token>]) -> Vec<Token> {
    let mut out = Vec::with_capacity(body.len());
    for token in body {
        if let TokenKind::Ident(name) = token.kind {
            if let Some(index) = params.iter().position(|&p| p == name) {
                out.extend(args[index].iter().copied());
                continue;
            }
        }
        out.push(*token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pp(source: &str) -> Preprocessor {
        pp_with(source, &Defines::new())
    }

    fn pp_with(source: &str, defines: &Defines) -> Preprocessor {
        let interner = SharedInterner::new();
        let tokens = silica_lexer::lex(source, &interner).expect("lex failure");
        Preprocessor::new(tokens, defines, interner).expect("seed failure")
    }

    fn drain(pp: &mut Preprocessor) -> Vec<TokenKind> {
        let mut kinds = Vec::new();
        loop {
            let token = pp.consume().expect("preprocess failure");
            kinds.push(token.kind);
            if token.kind == TokenKind::Eof {
                return kinds;
            }
        }
    }

    fn drain_err(pp: &mut Preprocessor) -> PpError {
        loop {
            match pp.consume() {
                Ok(token) if token.kind == TokenKind::Eof => panic!("expected an error"),
                Ok(_) => {}
                Err(e) => return e,
            }
        }
    }

    #[test]
    fn define_substitutes() {
        let mut pp = pp("#define ONE 1\nONE + ONE");
        assert_eq!(
            drain(&mut pp),
            vec![
                TokenKind::Int(1),
                TokenKind::Plus,
                TokenKind::Int(1),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn undef_stops_substitution() {
        let mut pp = pp("#define A 1\n#undef A\nA");
        let interner = pp.interner().clone();
        let a = interner.intern("A");
        assert_eq!(drain(&mut pp), vec![TokenKind::Ident(a), TokenKind::Eof]);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut pp = pp("1 2");
        assert_eq!(pp.peek().expect("peek").kind, TokenKind::Int(1));
        assert_eq!(pp.peek().expect("peek").kind, TokenKind::Int(1));
        assert_eq!(pp.consume().expect("consume").kind, TokenKind::Int(1));
        assert_eq!(pp.peek().expect("peek").kind, TokenKind::Int(2));
    }

    #[test]
    fn external_defines_last_write_wins() {
        let mut defines = Defines::new();
        defines.define("FOO", Some("2".to_owned()));
        defines.define("FOO", Some("3".to_owned()));
        let mut pp = pp_with("FOO", &defines);
        assert_eq!(drain(&mut pp), vec![TokenKind::Int(3), TokenKind::Eof]);
    }

    #[test]
    fn source_define_overrides_external() {
        let mut defines = Defines::new();
        defines.define("FOO", Some("2".to_owned()));
        let mut pp = pp_with("#define FOO 5\nFOO", &defines);
        assert_eq!(drain(&mut pp), vec![TokenKind::Int(5), TokenKind::Eof]);
    }

    #[test]
    fn conflicting_source_redefinition_fails() {
        let mut pp = pp("#define A 1\n#define A 2\n");
        let err = drain_err(&mut pp);
        assert_eq!(err.code, ErrorCode::E1004);
    }

    #[test]
    fn identical_redefinition_is_allowed() {
        let mut pp = pp("#define A 1\n#define A 1\nA");
        assert_eq!(drain(&mut pp), vec![TokenKind::Int(1), TokenKind::Eof]);
    }

    #[test]
    fn redefinition_after_undef_is_allowed() {
        let mut pp = pp("#define A 1\n#undef A\n#define A 2\nA");
        assert_eq!(drain(&mut pp), vec![TokenKind::Int(2), TokenKind::Eof]);
    }

    #[test]
    fn self_recursion_stops() {
        let mut pp = pp("#define A A\nA");
        let interner = pp.interner().clone();
        let a = interner.intern("A");
        assert_eq!(drain(&mut pp), vec![TokenKind::Ident(a), TokenKind::Eof]);
    }

    #[test]
    fn mutual_recursion_stops() {
        let mut pp = pp("#define A B\n#define B A\nA");
        let interner = pp.interner().clone();
        let a = interner.intern("A");
        // A -> B -> A, where the inner A is blocked by the active set.
        assert_eq!(drain(&mut pp), vec![TokenKind::Ident(a), TokenKind::Eof]);
    }

    #[test]
    fn function_like_macro() {
        let mut pp = pp("#define SQUARE(x) ((x) * (x))\nSQUARE(3)");
        assert_eq!(
            drain(&mut pp),
            vec![
                TokenKind::LParen,
                TokenKind::LParen,
                TokenKind::Int(3),
                TokenKind::RParen,
                TokenKind::Star,
                TokenKind::LParen,
                TokenKind::Int(3),
                TokenKind::RParen,
                TokenKind::RParen,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn function_like_nested_parens_in_args() {
        let mut pp = pp("#define FIRST(a, b) a\nFIRST((1, 2), 3)");
        assert_eq!(
            drain(&mut pp),
            vec![
                TokenKind::LParen,
                TokenKind::Int(1),
                TokenKind::Comma,
                TokenKind::Int(2),
                TokenKind::RParen,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn function_like_without_parens_is_plain_ident() {
        let mut pp = pp("#define F(x) x\nF");
        let interner = pp.interner().clone();
        let f = interner.intern("F");
        assert_eq!(drain(&mut pp), vec![TokenKind::Ident(f), TokenKind::Eof]);
    }

    #[test]
    fn argument_count_mismatch_fails() {
        let mut pp = pp("#define ADD(a, b) a + b\nADD(1)");
        let err = drain_err(&mut pp);
        assert_eq!(err.code, ErrorCode::E1007);
    }

    #[test]
    fn ifdef_keeps_active_branch() {
        let mut pp = pp("#define YES 1\n#ifdef YES\n1\n#else\n2\n#endif\n");
        assert_eq!(drain(&mut pp), vec![TokenKind::Int(1), TokenKind::Eof]);
    }

    #[test]
    fn ifdef_undefined_takes_else() {
        let mut pp = pp("#ifdef NO\n1\n#else\n2\n#endif\n");
        assert_eq!(drain(&mut pp), vec![TokenKind::Int(2), TokenKind::Eof]);
    }

    #[test]
    fn ifndef_inverts() {
        let mut pp = pp("#ifndef NO\n1\n#endif\n");
        assert_eq!(drain(&mut pp), vec![TokenKind::Int(1), TokenKind::Eof]);
    }

    #[test]
    fn nested_conditionals() {
        let source = "#ifdef A\n#ifdef B\n1\n#endif\n2\n#else\n3\n#endif\n";
        let mut defines = Defines::new();
        defines.define("A", None);
        let mut pp = pp_with(source, &defines);
        assert_eq!(drain(&mut pp), vec![TokenKind::Int(2), TokenKind::Eof]);

        defines.define("B", None);
        let mut pp = pp_with(source, &defines);
        assert_eq!(
            drain(&mut pp),
            vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]
        );
    }

    #[test]
    fn inactive_region_ignores_defines_and_errors() {
        let mut pp = pp("#ifdef NO\n#define X 1\n#error nope\n#endif\nX");
        let interner = pp.interner().clone();
        let x = interner.intern("X");
        assert_eq!(drain(&mut pp), vec![TokenKind::Ident(x), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_conditional_fails() {
        let mut pp = pp("#ifdef A\n1\n");
        let err = drain_err(&mut pp);
        assert_eq!(err.code, ErrorCode::E1003);
    }

    #[test]
    fn stray_endif_fails() {
        let mut pp = pp("#endif\n");
        let err = drain_err(&mut pp);
        assert_eq!(err.code, ErrorCode::E1006);
    }

    #[test]
    fn duplicate_else_fails() {
        let mut pp = pp("#ifdef A\n#else\n#else\n#endif\n");
        let err = drain_err(&mut pp);
        assert_eq!(err.code, ErrorCode::E1006);
    }

    #[test]
    fn error_directive_aborts_with_message() {
        let mut pp = pp("#error unsupported target\n1");
        let err = drain_err(&mut pp);
        assert_eq!(err.code, ErrorCode::E1005);
        assert!(err.message.contains("unsupported"));
    }

    #[test]
    fn version_and_extension_are_skipped() {
        let mut pp = pp("#version 420 core\n#extension GL_ARB_fragment_shader : enable\n7");
        assert_eq!(drain(&mut pp), vec![TokenKind::Int(7), TokenKind::Eof]);
    }

    #[test]
    fn unknown_directive_fails() {
        let mut pp = pp("#include <foo>\n");
        let err = drain_err(&mut pp);
        assert_eq!(err.code, ErrorCode::E1002);
    }

    #[test]
    fn newlines_never_reach_the_parser() {
        let mut pp = pp("1\n2\n");
        assert_eq!(
            drain(&mut pp),
            vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]
        );
    }
}
