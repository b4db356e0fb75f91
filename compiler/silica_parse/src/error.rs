//! Parse error types.

use silica_diagnostic::{Diagnostic, ErrorCode};
use silica_ir::{Span, Token};
use silica_pp::PpError;

/// Parsing failure. The first unexpected token stops the unit; there is no
/// recovery, so one `ParseError` is the whole outcome.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    /// The preprocessor failed while producing the next token.
    Preprocess(PpError),
    /// The token stream did not match the grammar.
    Syntax {
        code: ErrorCode,
        span: Span,
        message: String,
    },
}

impl ParseError {
    pub(crate) fn syntax(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        ParseError::Syntax { code, span, message: message.into() }
    }

    /// "expected X, found Y" at the found token.
    pub(crate) fn expected(what: &str, found: &Token) -> Self {
        let code = match what {
            "type specifier" => ErrorCode::E2002,
            "identifier" => ErrorCode::E2003,
            "expression" => ErrorCode::E2004,
            _ => ErrorCode::E2001,
        };
        ParseError::Syntax {
            code,
            span: found.span,
            message: format!("expected {what}, found {}", found.kind),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::Preprocess(e) => e.span,
            ParseError::Syntax { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::Preprocess(e) => e.code,
            ParseError::Syntax { code, .. } => *code,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        match self {
            ParseError::Preprocess(e) => e.into_diagnostic(),
            ParseError::Syntax { code, span, message } => Diagnostic::error(code)
                .with_message(message.clone())
                .with_label(span, message),
        }
    }
}

impl From<PpError> for ParseError {
    fn from(e: PpError) -> Self {
        ParseError::Preprocess(e)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Preprocess(e) => write!(f, "{e}"),
            ParseError::Syntax { message, .. } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ParseError {}
