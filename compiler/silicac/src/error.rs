//! The per-unit compilation error.

use silica_diagnostic::Diagnostic;
use silica_lexer::LexError;
use silica_parse::ParseError;
use silica_pp::PpError;
use silica_typeck::SemanticError;

/// Whatever stopped a compilation unit: exactly one phase error, since the
/// pipeline aborts at the first failure.
#[derive(Clone, Debug)]
pub enum CompileError {
    Lex(LexError),
    Preprocess(PpError),
    Parse(ParseError),
    Semantic(SemanticError),
}

impl CompileError {
    /// Render for reporting against the unit's source text.
    pub fn into_diagnostic(self) -> Diagnostic {
        match self {
            CompileError::Lex(e) => e.into_diagnostic(),
            CompileError::Preprocess(e) => e.into_diagnostic(),
            CompileError::Parse(e) => e.into_diagnostic(),
            CompileError::Semantic(e) => e.into_diagnostic(),
        }
    }
}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<PpError> for CompileError {
    fn from(e: PpError) -> Self {
        CompileError::Preprocess(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        // A preprocessor failure surfacing through the parser keeps its
        // own phase.
        match e {
            ParseError::Preprocess(pp) => CompileError::Preprocess(pp),
            other => CompileError::Parse(other),
        }
    }
}

impl From<SemanticError> for CompileError {
    fn from(e: SemanticError) -> Self {
        CompileError::Semantic(e)
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{e}"),
            CompileError::Preprocess(e) => write!(f, "{e}"),
            CompileError::Parse(e) => write!(f, "{e}"),
            CompileError::Semantic(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}
