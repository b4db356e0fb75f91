//! AST node definitions.
//!
//! Nodes live in the [`crate::Ast`] arena and reference children through
//! `u32` index ids, keeping ownership strictly parent-to-child (a tree,
//! never a cycle). Node sequences (arguments, block statements, parameters)
//! are contiguous ranges into shared side vectors.

use crate::{Name, Span};
use silica_types::Type;
use std::fmt;

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub(crate) const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Index of an expression in the arena.
    ExprId
);
arena_id!(
    /// Index of a statement in the arena.
    StmtId
);
arena_id!(
    /// Index of a top-level declaration in the arena.
    DeclId
);

macro_rules! arena_range {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub struct $name {
            pub(crate) start: u32,
            pub(crate) len: u16,
        }

        impl $name {
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            #[inline]
            pub const fn len(self) -> usize {
                self.len as usize
            }

            #[inline]
            pub const fn is_empty(self) -> bool {
                self.len == 0
            }
        }
    };
}

arena_range!(
    /// Contiguous run of expression ids (call or constructor arguments).
    ExprRange
);
arena_range!(
    /// Contiguous run of statement ids (a block's statements).
    StmtRange
);
arena_range!(
    /// Contiguous run of function parameters.
    ParamRange
);

/// Binary operators, including assignment-free arithmetic, comparison,
/// logical and bitwise forms.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    LogicalAnd,
    LogicalOr,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    /// Source-level spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }

    /// Whether this operator yields `bool` regardless of operand type.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Prefix unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An expression node.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants. Literal float payloads are `f64` bits.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ExprKind {
    Int(u64),
    Uint(u64),
    Float(u64),
    Double(u64),
    Bool(bool),
    Ident(Name),
    Binary { op: BinaryOp, lhs: ExprId, rhs: ExprId },
    Unary { op: UnaryOp, operand: ExprId },
    Assign { target: ExprId, value: ExprId },
    Ternary { cond: ExprId, then_branch: ExprId, else_branch: ExprId },
    Comma { first: ExprId, second: ExprId },
    /// Call of a user-defined function.
    Call { callee: Name, args: ExprRange },
    /// Built-in type constructor, e.g. `vec4(pos, 1.0)` or `float(i)`.
    Construct { ty: Type, args: ExprRange },
    /// Member or swizzle access, e.g. `v.xyz`.
    Member { base: ExprId, field: Name },
    Index { base: ExprId, index: ExprId },
}

/// A statement node.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum StmtKind {
    Block { stmts: StmtRange },
    Local { ty: Type, name: Name, init: Option<ExprId> },
    If { cond: ExprId, then_branch: StmtId, else_branch: Option<StmtId> },
    While { cond: ExprId, body: StmtId },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        step: Option<ExprId>,
        body: StmtId,
    },
    Return { value: Option<ExprId> },
    Expr(ExprId),
    /// A bare `;`.
    Empty,
}

/// Storage qualifier on a global declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum StorageQualifier {
    /// No qualifier: a module-private global.
    #[default]
    None,
    In,
    Out,
    Uniform,
    Const,
}

impl StorageQualifier {
    /// Source-level spelling, empty for [`StorageQualifier::None`].
    pub fn keyword(self) -> &'static str {
        match self {
            StorageQualifier::None => "",
            StorageQualifier::In => "in",
            StorageQualifier::Out => "out",
            StorageQualifier::Uniform => "uniform",
            StorageQualifier::Const => "const",
        }
    }
}

/// `layout(...)` metadata captured on a declaration, consumed later as
/// SPIR-V decorations.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct LayoutQualifiers {
    pub location: Option<u32>,
    pub binding: Option<u32>,
    pub set: Option<u32>,
}

impl LayoutQualifiers {
    pub fn is_empty(self) -> bool {
        self.location.is_none() && self.binding.is_none() && self.set.is_none()
    }
}

/// A global variable declaration.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct GlobalDecl {
    pub ty: Type,
    pub name: Name,
    pub storage: StorageQualifier,
    pub layout: LayoutQualifiers,
    pub init: Option<ExprId>,
}

/// A function definition.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct FunctionDecl {
    pub return_type: Type,
    pub name: Name,
    pub params: ParamRange,
    /// Always a `StmtKind::Block`.
    pub body: StmtId,
}

/// One function parameter.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Param {
    pub ty: Type,
    pub name: Name,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum DeclKind {
    Global(GlobalDecl),
    Function(FunctionDecl),
}

/// A parsed translation unit: the ordered list of top-level declarations.
#[derive(Clone, Default, Debug)]
pub struct Module {
    pub decls: Vec<DeclId>,
}

// Size assertion to prevent accidental regressions
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Expr;
    crate::static_assert_size!(Expr, 24);
}
