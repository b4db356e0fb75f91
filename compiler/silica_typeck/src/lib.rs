//! Semantic checker for the silica shading language.
//!
//! A single pass over the parsed AST resolves identifiers through a stack
//! of lexical scopes, assigns every expression a type, validates the
//! implicit-conversion lattice, and resolves overloaded calls. The results
//! land in a [`TypeInfo`] side table keyed by node id, which the SPIR-V
//! writer consumes.

mod checker;
mod env;
mod swizzle;

pub use checker::check;
pub use swizzle::Swizzle;

use rustc_hash::FxHashMap;
use silica_diagnostic::{Diagnostic, ErrorCode};
use silica_ir::{DeclId, ExprId, Span, StmtId};
use silica_types::Type;

/// Semantic failure: code, offending span, rendered message.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SemanticError {
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
}

impl SemanticError {
    pub(crate) fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        SemanticError { code, span, message: message.into() }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, self.message)
    }
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SemanticError {}

/// What an identifier expression resolved to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VarTarget {
    /// A global declaration.
    Global(DeclId),
    /// A local declared by this statement.
    Local(StmtId),
    /// The `index`-th parameter of the enclosing function.
    Param { function: DeclId, index: u16 },
}

/// Checker output: the per-node type and resolution tables.
#[derive(Clone, Debug, Default)]
pub struct TypeInfo {
    /// Resolved type of every expression, indexed by `ExprId`.
    pub(crate) expr_types: Vec<Type>,
    /// Implicit conversions: node id → type it converts to.
    pub conversions: FxHashMap<ExprId, Type>,
    /// Identifier resolutions.
    pub idents: FxHashMap<ExprId, VarTarget>,
    /// Call resolutions: call expression → chosen function declaration.
    pub calls: FxHashMap<ExprId, DeclId>,
    /// Member accesses that resolved to vector swizzles.
    pub swizzles: FxHashMap<ExprId, Swizzle>,
}

impl TypeInfo {
    /// The type the checker assigned to `id` (before implicit conversion).
    ///
    /// # Panics
    /// Panics if `id` was never checked, which is a compiler defect.
    pub fn expr_type(&self, id: ExprId) -> Type {
        self.expr_types[id.index()]
    }

    /// The type of `id` after any implicit conversion marker.
    pub fn converted_type(&self, id: ExprId) -> Type {
        self.conversions
            .get(&id)
            .copied()
            .unwrap_or_else(|| self.expr_type(id))
    }
}
