//! Core data structures for the silica compiler:
//! - Spans for source locations
//! - Interned identifier names
//! - Tokens and `TokenList` for lexer output
//! - Arena-allocated AST nodes (declarations, statements, expressions)
//!
//! # Design
//!
//! - **Intern strings**: identifiers become `Name(u32)` with O(1) equality.
//! - **Flatten the tree**: no `Box<Expr>`; children are `ExprId(u32)` indices
//!   into a per-unit [`Ast`] arena, so ownership is strictly parent-to-child
//!   and teardown is one deallocation.
//! - Floats are stored as `u64` bits so every node type is `Eq + Hash`.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod span;
mod name;
mod interner;
mod token;
mod ast;
mod arena;

pub use span::Span;
pub use name::Name;
pub use interner::{SharedInterner, StringInterner};
pub use token::{Token, TokenKind, TokenList};
pub use ast::{
    BinaryOp, Decl, DeclId, DeclKind, Expr, ExprId, ExprKind, ExprRange, FunctionDecl,
    GlobalDecl, LayoutQualifiers, Module, Param, ParamRange, Stmt, StmtId, StmtKind, StmtRange,
    StorageQualifier, UnaryOp,
};
pub use arena::Ast;
