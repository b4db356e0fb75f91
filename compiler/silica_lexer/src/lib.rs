//! Lexer for the silica shading language, built on logos with string
//! interning.
//!
//! Produces a [`TokenList`] ending in [`TokenKind::Eof`]. Newlines are kept
//! as tokens because the preprocessor is line-oriented; it strips them
//! before the parser sees the stream. The first unrecognized character (or
//! malformed literal) aborts the unit with a [`LexError`].

use logos::{FilterResult, Logos};
use silica_diagnostic::{Diagnostic, ErrorCode};
use silica_ir::{Span, StringInterner, Token, TokenKind, TokenList};
use silica_types::{ScalarKind, Type};

/// Lexical failure: the offending span plus a rendered message.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LexError {
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
}

impl LexError {
    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, self.message)
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LexError {}

fn skip_block_comment(lex: &mut logos::Lexer<'_, RawToken>) -> FilterResult<(), ()> {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(rest.len());
            FilterResult::Error(())
        }
    }
}

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Horizontal whitespace
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("\n")]
    Newline,

    // Non-nested block comment; unterminated is a lex error, not trivia.
    #[token("/*", skip_block_comment)]
    BlockComment,

    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("in")]
    In,
    #[token("out")]
    Out,
    #[token("uniform")]
    Uniform,
    #[token("const")]
    Const,
    #[token("layout")]
    Layout,

    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),

    // The built-in type names, resolved directly to their types. This is
    // the exhaustive token-to-type table; there is no fallback rule.
    #[token("void", |_| Type::VOID)]
    #[token("float", |_| Type::FLOAT)]
    #[token("double", |_| Type::DOUBLE)]
    #[token("int", |_| Type::INT)]
    #[token("uint", |_| Type::UINT)]
    #[token("bool", |_| Type::BOOL)]
    #[token("vec2", |_| Type::vector(ScalarKind::Float, 2))]
    #[token("vec3", |_| Type::vector(ScalarKind::Float, 3))]
    #[token("vec4", |_| Type::vector(ScalarKind::Float, 4))]
    #[token("dvec2", |_| Type::vector(ScalarKind::Double, 2))]
    #[token("dvec3", |_| Type::vector(ScalarKind::Double, 3))]
    #[token("dvec4", |_| Type::vector(ScalarKind::Double, 4))]
    #[token("ivec2", |_| Type::vector(ScalarKind::Int, 2))]
    #[token("ivec3", |_| Type::vector(ScalarKind::Int, 3))]
    #[token("ivec4", |_| Type::vector(ScalarKind::Int, 4))]
    #[token("uvec2", |_| Type::vector(ScalarKind::Uint, 2))]
    #[token("uvec3", |_| Type::vector(ScalarKind::Uint, 3))]
    #[token("uvec4", |_| Type::vector(ScalarKind::Uint, 4))]
    #[token("bvec2", |_| Type::vector(ScalarKind::Bool, 2))]
    #[token("bvec3", |_| Type::vector(ScalarKind::Bool, 3))]
    #[token("bvec4", |_| Type::vector(ScalarKind::Bool, 4))]
    #[token("mat2", |_| Type::matrix(ScalarKind::Float, 2, 2))]
    #[token("mat2x2", |_| Type::matrix(ScalarKind::Float, 2, 2))]
    #[token("mat2x3", |_| Type::matrix(ScalarKind::Float, 2, 3))]
    #[token("mat2x4", |_| Type::matrix(ScalarKind::Float, 2, 4))]
    #[token("mat3x2", |_| Type::matrix(ScalarKind::Float, 3, 2))]
    #[token("mat3", |_| Type::matrix(ScalarKind::Float, 3, 3))]
    #[token("mat3x3", |_| Type::matrix(ScalarKind::Float, 3, 3))]
    #[token("mat3x4", |_| Type::matrix(ScalarKind::Float, 3, 4))]
    #[token("mat4x2", |_| Type::matrix(ScalarKind::Float, 4, 2))]
    #[token("mat4x3", |_| Type::matrix(ScalarKind::Float, 4, 3))]
    #[token("mat4", |_| Type::matrix(ScalarKind::Float, 4, 4))]
    #[token("mat4x4", |_| Type::matrix(ScalarKind::Float, 4, 4))]
    #[token("dmat2", |_| Type::matrix(ScalarKind::Double, 2, 2))]
    #[token("dmat2x2", |_| Type::matrix(ScalarKind::Double, 2, 2))]
    #[token("dmat2x3", |_| Type::matrix(ScalarKind::Double, 2, 3))]
    #[token("dmat2x4", |_| Type::matrix(ScalarKind::Double, 2, 4))]
    #[token("dmat3x2", |_| Type::matrix(ScalarKind::Double, 3, 2))]
    #[token("dmat3", |_| Type::matrix(ScalarKind::Double, 3, 3))]
    #[token("dmat3x3", |_| Type::matrix(ScalarKind::Double, 3, 3))]
    #[token("dmat3x4", |_| Type::matrix(ScalarKind::Double, 3, 4))]
    #[token("dmat4x2", |_| Type::matrix(ScalarKind::Double, 4, 2))]
    #[token("dmat4x3", |_| Type::matrix(ScalarKind::Double, 4, 3))]
    #[token("dmat4", |_| Type::matrix(ScalarKind::Double, 4, 4))]
    #[token("dmat4x4", |_| Type::matrix(ScalarKind::Double, 4, 4))]
    TypeName(Type),

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<<")]
    Shl,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">>")]
    Shr,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
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
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&&")]
    AmpAmp,
    #[token("&")]
    Amp,
    #[token("||")]
    PipePipe,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("#")]
    Hash,

    // Hex integer
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| {
        u64::from_str_radix(&lex.slice()[2..], 16).ok()
    })]
    HexInt(u64),

    // Hex unsigned integer (`u`/`U` suffix)
    #[regex(r"0[xX][0-9a-fA-F]+[uU]", |lex| {
        let s = lex.slice();
        u64::from_str_radix(&s[2..s.len() - 1], 16).ok()
    })]
    HexUint(u64),

    // Integer
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    Int(u64),

    // Unsigned integer (`u`/`U` suffix)
    #[regex(r"[0-9]+[uU]", |lex| {
        let s = lex.slice();
        s[..s.len() - 1].parse::<u64>().ok()
    })]
    Uint(u64),

    // Float: dotted form with optional `f`/`F`, exponent form, or
    // suffixed integer form.
    #[regex(r"([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?[fF]?", |lex| {
        parse_float(lex.slice())
    })]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fF]?", |lex| parse_float(lex.slice()))]
    #[regex(r"[0-9]+[fF]", |lex| parse_float(lex.slice()))]
    Float(f64),

    // Double: the same bodies with an `lf`/`LF` suffix.
    #[regex(r"([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?(lf|LF)", |lex| {
        parse_double(lex.slice())
    })]
    #[regex(r"[0-9]+([eE][+-]?[0-9]+)?(lf|LF)", |lex| parse_double(lex.slice()))]
    Double(f64),

    // Identifier
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

fn parse_float(slice: &str) -> Option<f64> {
    slice.trim_end_matches(['f', 'F']).parse::<f64>().ok()
}

fn parse_double(slice: &str) -> Option<f64> {
    let body = slice
        .strip_suffix("lf")
        .or_else(|| slice.strip_suffix("LF"))
        .unwrap_or(slice);
    body.parse::<f64>().ok()
}

/// Lex source code into a [`TokenList`], aborting on the first failure.
pub fn lex(source: &str, interner: &StringInterner) -> Result<TokenList, LexError> {
    let mut result = TokenList::new();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        match token_result {
            Ok(RawToken::LineComment) => {}
            Ok(raw) => {
                let kind = convert_token(raw, slice, interner);
                result.push(Token::new(kind, span));
            }
            Err(()) => return Err(classify_error(slice, span)),
        }
    }

    let eof_pos = u32::try_from(source.len())
        .unwrap_or_else(|_| panic!("source file exceeds {} bytes", u32::MAX));
    result.push(Token::new(TokenKind::Eof, Span::point(eof_pos)));

    Ok(result)
}

fn classify_error(slice: &str, span: Span) -> LexError {
    if slice.starts_with("/*") {
        LexError {
            code: ErrorCode::E0002,
            span,
            message: "unterminated block comment".to_owned(),
        }
    } else if slice.starts_with(|c: char| c.is_ascii_digit()) {
        LexError {
            code: ErrorCode::E0003,
            span,
            message: format!("invalid number literal `{slice}`"),
        }
    } else {
        LexError {
            code: ErrorCode::E0001,
            span,
            message: format!("unrecognized character `{slice}`"),
        }
    }
}

/// Convert a raw token to a [`TokenKind`], interning identifiers.
fn convert_token(raw: RawToken, slice: &str, interner: &StringInterner) -> TokenKind {
    match raw {
        // Literals
        RawToken::Int(n) | RawToken::HexInt(n) => TokenKind::Int(n),
        RawToken::Uint(n) | RawToken::HexUint(n) => TokenKind::Uint(n),
        RawToken::Float(f) => TokenKind::Float(f.to_bits()),
        RawToken::Double(f) => TokenKind::Double(f.to_bits()),
        RawToken::Bool(b) => TokenKind::Bool(b),
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),
        RawToken::TypeName(ty) => TokenKind::TypeName(ty),

        // Keywords
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::For => TokenKind::For,
        RawToken::While => TokenKind::While,
        RawToken::Return => TokenKind::Return,
        RawToken::In => TokenKind::In,
        RawToken::Out => TokenKind::Out,
        RawToken::Uniform => TokenKind::Uniform,
        RawToken::Const => TokenKind::Const,
        RawToken::Layout => TokenKind::Layout,

        // Punctuation
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Question => TokenKind::Question,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Eq => TokenKind::Eq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Shr => TokenKind::Shr,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Amp => TokenKind::Amp,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Hash => TokenKind::Hash,
        RawToken::Newline => TokenKind::Newline,

        // Trivia (filtered in the lex loop / consumed by its callback)
        RawToken::LineComment | RawToken::BlockComment => {
            unreachable!("comments are skipped")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let interner = StringInterner::new();
        lex(source, &interner)
            .expect("lex failure")
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_declaration() {
        let interner = StringInterner::new();
        let tokens = lex("float x = 1.5;", &interner).expect("lex failure");

        assert_eq!(tokens.len(), 6); // float, x, =, 1.5, ;, EOF
        assert_eq!(tokens[0].kind, TokenKind::TypeName(Type::FLOAT));
        assert!(matches!(tokens[1].kind, TokenKind::Ident(_)));
        assert_eq!(tokens[2].kind, TokenKind::Eq);
        assert_eq!(tokens[3].kind, TokenKind::Float(1.5f64.to_bits()));
        assert_eq!(tokens[4].kind, TokenKind::Semicolon);
        assert_eq!(tokens[5].kind, TokenKind::Eof);
    }

    #[test]
    fn lex_literal_suffixes() {
        assert_eq!(
            kinds("1 2u 3U 4.0 5.0f 6.5lf 7LF"),
            vec![
                TokenKind::Int(1),
                TokenKind::Uint(2),
                TokenKind::Uint(3),
                TokenKind::Float(4.0f64.to_bits()),
                TokenKind::Float(5.0f64.to_bits()),
                TokenKind::Double(6.5f64.to_bits()),
                TokenKind::Double(7.0f64.to_bits()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_hex_literals() {
        assert_eq!(
            kinds("0xFF 0x10u"),
            vec![TokenKind::Int(255), TokenKind::Uint(16), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_float_forms() {
        assert_eq!(
            kinds(".5 1. 2e3 4.5e-1f 10f"),
            vec![
                TokenKind::Float(0.5f64.to_bits()),
                TokenKind::Float(1.0f64.to_bits()),
                TokenKind::Float(2000.0f64.to_bits()),
                TokenKind::Float(0.45f64.to_bits()),
                TokenKind::Float(10.0f64.to_bits()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_type_keywords() {
        assert_eq!(
            kinds("vec3 dmat3x4 uvec2 mat2x2"),
            vec![
                TokenKind::TypeName(Type::vector(ScalarKind::Float, 3)),
                TokenKind::TypeName(Type::matrix(ScalarKind::Double, 3, 4)),
                TokenKind::TypeName(Type::vector(ScalarKind::Uint, 2)),
                TokenKind::TypeName(Type::matrix(ScalarKind::Float, 2, 2)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_operators_longest_match() {
        assert_eq!(
            kinds("<< <= < == = >= >>"),
            vec![
                TokenKind::Shl,
                TokenKind::LtEq,
                TokenKind::Lt,
                TokenKind::EqEq,
                TokenKind::Eq,
                TokenKind::GtEq,
                TokenKind::Shr,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("1 // line comment\n/* block\ncomment */ 2"),
            vec![
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Int(2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_fails() {
        let interner = StringInterner::new();
        let err = lex("int x; /* no end", &interner).expect_err("should fail");
        assert_eq!(err.code, ErrorCode::E0002);
        assert_eq!(err.span.start, 7);
    }

    #[test]
    fn unrecognized_character_fails_with_offset() {
        let interner = StringInterner::new();
        let err = lex("int x = 1 @ 2;", &interner).expect_err("should fail");
        assert_eq!(err.code, ErrorCode::E0001);
        assert_eq!(err.span.start, 10);
        assert!(err.message.contains('@'));
    }

    #[test]
    fn newlines_are_tokens() {
        let interner = StringInterner::new();
        let tokens = lex("#define A 1\nA", &interner).expect("lex failure");
        let a = interner.intern("A");
        let define = interner.intern("define");

        let expected = vec![
            TokenKind::Hash,
            TokenKind::Ident(define),
            TokenKind::Ident(a),
            TokenKind::Int(1),
            TokenKind::Newline,
            TokenKind::Ident(a),
            TokenKind::Eof,
        ];
        let actual: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(actual, expected);
    }
}
