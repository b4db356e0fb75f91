//! Built-in type registry for the silica shading language.
//!
//! GLSL's built-in numeric types form a closed set: 6 scalars, 15 vectors
//! and 18 matrices. All 39 exist as plain `Copy` values, so "the same type"
//! is value equality and there is no registration, refcounting or teardown.
//! [`BUILTINS`] enumerates the full set for exhaustive checks.

use std::fmt;

/// Scalar component kind, in stable ordinal order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum ScalarKind {
    Void = 0,
    Float = 1,
    Double = 2,
    Int = 3,
    Uint = 4,
    Bool = 5,
}

impl ScalarKind {
    /// Number of scalar kinds.
    pub const COUNT: usize = 6;

    /// All kinds in ordinal order.
    pub const ALL: [ScalarKind; Self::COUNT] = [
        ScalarKind::Void,
        ScalarKind::Float,
        ScalarKind::Double,
        ScalarKind::Int,
        ScalarKind::Uint,
        ScalarKind::Bool,
    ];

    /// GLSL name of the scalar type.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Void => "void",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::Int => "int",
            ScalarKind::Uint => "uint",
            ScalarKind::Bool => "bool",
        }
    }

    /// Whether an implicit conversion from `source` to `target` exists.
    ///
    /// The lattice is exactly: identity, int→uint, int→float, int→double,
    /// uint→float, uint→double, float→double. Nothing else.
    pub fn can_convert(target: ScalarKind, source: ScalarKind) -> bool {
        if target == source {
            return true;
        }
        match source {
            ScalarKind::Int => matches!(
                target,
                ScalarKind::Uint | ScalarKind::Float | ScalarKind::Double
            ),
            ScalarKind::Uint => matches!(target, ScalarKind::Float | ScalarKind::Double),
            ScalarKind::Float => target == ScalarKind::Double,
            _ => false,
        }
    }

    /// Whether values of this kind participate in arithmetic.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ScalarKind::Float | ScalarKind::Double | ScalarKind::Int | ScalarKind::Uint
        )
    }

    /// Whether this kind is an integer kind.
    pub fn is_integer(self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Uint)
    }

    /// Whether this kind is a floating-point kind.
    pub fn is_float(self) -> bool {
        matches!(self, ScalarKind::Float | ScalarKind::Double)
    }
}

/// A built-in shading-language type.
///
/// Identity is value equality; the 39 valid instances are enumerated in
/// [`BUILTINS`]. The constructors below are the only way silica forms types,
/// and they debug-assert the GLSL domain (no void vectors, no int matrices).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    Scalar(ScalarKind),
    Vector { scalar: ScalarKind, len: u8 },
    Matrix { scalar: ScalarKind, cols: u8, rows: u8 },
}

impl Type {
    pub const VOID: Type = Type::Scalar(ScalarKind::Void);
    pub const FLOAT: Type = Type::Scalar(ScalarKind::Float);
    pub const DOUBLE: Type = Type::Scalar(ScalarKind::Double);
    pub const INT: Type = Type::Scalar(ScalarKind::Int);
    pub const UINT: Type = Type::Scalar(ScalarKind::Uint);
    pub const BOOL: Type = Type::Scalar(ScalarKind::Bool);

    /// The scalar type of a kind.
    pub fn scalar(kind: ScalarKind) -> Type {
        Type::Scalar(kind)
    }

    /// The vector type with `len` components of `scalar`.
    pub fn vector(scalar: ScalarKind, len: u8) -> Type {
        debug_assert!(scalar != ScalarKind::Void, "no void vectors");
        debug_assert!((2..=4).contains(&len), "vector length {len} out of range");
        Type::Vector { scalar, len }
    }

    /// The matrix type with `cols` columns of `rows` components of `scalar`.
    pub fn matrix(scalar: ScalarKind, cols: u8, rows: u8) -> Type {
        debug_assert!(
            matches!(scalar, ScalarKind::Float | ScalarKind::Double),
            "matrices are float or double only"
        );
        debug_assert!((2..=4).contains(&cols), "matrix columns {cols} out of range");
        debug_assert!((2..=4).contains(&rows), "matrix rows {rows} out of range");
        Type::Matrix { scalar, cols, rows }
    }

    pub fn is_scalar(self) -> bool {
        matches!(self, Type::Scalar(_))
    }

    pub fn is_vector(self) -> bool {
        matches!(self, Type::Vector { .. })
    }

    pub fn is_matrix(self) -> bool {
        matches!(self, Type::Matrix { .. })
    }

    pub fn is_void(self) -> bool {
        self == Type::VOID
    }

    /// The component kind of this type.
    pub fn scalar_kind(self) -> ScalarKind {
        match self {
            Type::Scalar(scalar)
            | Type::Vector { scalar, .. }
            | Type::Matrix { scalar, .. } => scalar,
        }
    }

    /// The type produced by indexing, or `None` for scalars.
    ///
    /// Indexing a vector yields its scalar; indexing a matrix yields a
    /// column vector (length = rows).
    pub fn index_type(self) -> Option<Type> {
        match self {
            Type::Scalar(_) => None,
            Type::Vector { scalar, .. } => Some(Type::Scalar(scalar)),
            Type::Matrix { scalar, rows, .. } => Some(Type::vector(scalar, rows)),
        }
    }

    /// The indexable length: 0 for scalars, component count for vectors,
    /// column count for matrices.
    pub fn length(self) -> u32 {
        match self {
            Type::Scalar(_) => 0,
            Type::Vector { len, .. } => u32::from(len),
            Type::Matrix { cols, .. } => u32::from(cols),
        }
    }

    /// Total number of scalar components (1 for scalars).
    pub fn component_count(self) -> u32 {
        match self {
            Type::Scalar(_) => 1,
            Type::Vector { len, .. } => u32::from(len),
            Type::Matrix { cols, rows, .. } => u32::from(cols) * u32::from(rows),
        }
    }

    /// Matrix row count, or 0 for non-matrices.
    pub fn rows(self) -> u32 {
        match self {
            Type::Matrix { rows, .. } => u32::from(rows),
            _ => 0,
        }
    }

    /// This type's shape with a different component kind.
    ///
    /// Used when a constructor or conversion retargets the scalar kind of a
    /// vector or matrix while keeping its dimensions.
    pub fn with_scalar(self, kind: ScalarKind) -> Type {
        match self {
            Type::Scalar(_) => Type::Scalar(kind),
            Type::Vector { len, .. } => Type::Vector { scalar: kind, len },
            Type::Matrix { cols, rows, .. } => Type::Matrix { scalar: kind, cols, rows },
        }
    }

    /// Whether an implicit conversion from `source` to this type exists.
    ///
    /// Composite convertibility requires identical shape (scalar↔scalar,
    /// vector↔vector of equal length, matrix↔matrix of equal columns and
    /// rows) with the scalar lattice holding on the component kinds.
    pub fn can_convert(self, source: Type) -> bool {
        match (self, source) {
            (Type::Scalar(t), Type::Scalar(s)) => ScalarKind::can_convert(t, s),
            (
                Type::Vector { scalar: t, len: tl },
                Type::Vector { scalar: s, len: sl },
            ) => tl == sl && ScalarKind::can_convert(t, s),
            (
                Type::Matrix { scalar: t, cols: tc, rows: tr },
                Type::Matrix { scalar: s, cols: sc, rows: sr },
            ) => tc == sc && tr == sr && ScalarKind::can_convert(t, s),
            _ => false,
        }
    }

    /// The GLSL source name of this type.
    pub fn glsl_name(self) -> &'static str {
        match self {
            Type::Scalar(scalar) => scalar.name(),
            Type::Vector { scalar, len } => vector_name(scalar, len),
            Type::Matrix { scalar, cols, rows } => matrix_name(scalar, cols, rows),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

fn vector_name(scalar: ScalarKind, len: u8) -> &'static str {
    match (scalar, len) {
        (ScalarKind::Float, 2) => "vec2",
        (ScalarKind::Float, 3) => "vec3",
        (ScalarKind::Float, 4) => "vec4",
        (ScalarKind::Double, 2) => "dvec2",
        (ScalarKind::Double, 3) => "dvec3",
        (ScalarKind::Double, 4) => "dvec4",
        (ScalarKind::Int, 2) => "ivec2",
        (ScalarKind::Int, 3) => "ivec3",
        (ScalarKind::Int, 4) => "ivec4",
        (ScalarKind::Uint, 2) => "uvec2",
        (ScalarKind::Uint, 3) => "uvec3",
        (ScalarKind::Uint, 4) => "uvec4",
        (ScalarKind::Bool, 2) => "bvec2",
        (ScalarKind::Bool, 3) => "bvec3",
        (ScalarKind::Bool, 4) => "bvec4",
        _ => unreachable!("not a built-in vector type"),
    }
}

fn matrix_name(scalar: ScalarKind, cols: u8, rows: u8) -> &'static str {
    match (scalar, cols, rows) {
        (ScalarKind::Float, 2, 2) => "mat2",
        (ScalarKind::Float, 2, 3) => "mat2x3",
        (ScalarKind::Float, 2, 4) => "mat2x4",
        (ScalarKind::Float, 3, 2) => "mat3x2",
        (ScalarKind::Float, 3, 3) => "mat3",
        (ScalarKind::Float, 3, 4) => "mat3x4",
        (ScalarKind::Float, 4, 2) => "mat4x2",
        (ScalarKind::Float, 4, 3) => "mat4x3",
        (ScalarKind::Float, 4, 4) => "mat4",
        (ScalarKind::Double, 2, 2) => "dmat2",
        (ScalarKind::Double, 2, 3) => "dmat2x3",
        (ScalarKind::Double, 2, 4) => "dmat2x4",
        (ScalarKind::Double, 3, 2) => "dmat3x2",
        (ScalarKind::Double, 3, 3) => "dmat3",
        (ScalarKind::Double, 3, 4) => "dmat3x4",
        (ScalarKind::Double, 4, 2) => "dmat4x2",
        (ScalarKind::Double, 4, 3) => "dmat4x3",
        (ScalarKind::Double, 4, 4) => "dmat4",
        _ => unreachable!("not a built-in matrix type"),
    }
}

/// Every built-in type: 6 scalars, 15 vectors, 18 matrices.
pub const BUILTINS: [Type; 39] = [
    Type::Scalar(ScalarKind::Void),
    Type::Scalar(ScalarKind::Float),
    Type::Scalar(ScalarKind::Double),
    Type::Scalar(ScalarKind::Int),
    Type::Scalar(ScalarKind::Uint),
    Type::Scalar(ScalarKind::Bool),
    Type::Vector { scalar: ScalarKind::Float, len: 2 },
    Type::Vector { scalar: ScalarKind::Float, len: 3 },
    Type::Vector { scalar: ScalarKind::Float, len: 4 },
    Type::Vector { scalar: ScalarKind::Double, len: 2 },
    Type::Vector { scalar: ScalarKind::Double, len: 3 },
    Type::Vector { scalar: ScalarKind::Double, len: 4 },
    Type::Vector { scalar: ScalarKind::Int, len: 2 },
    Type::Vector { scalar: ScalarKind::Int, len: 3 },
    Type::Vector { scalar: ScalarKind::Int, len: 4 },
    Type::Vector { scalar: ScalarKind::Uint, len: 2 },
    Type::Vector { scalar: ScalarKind::Uint, len: 3 },
    Type::Vector { scalar: ScalarKind::Uint, len: 4 },
    Type::Vector { scalar: ScalarKind::Bool, len: 2 },
    Type::Vector { scalar: ScalarKind::Bool, len: 3 },
    Type::Vector { scalar: ScalarKind::Bool, len: 4 },
    Type::Matrix { scalar: ScalarKind::Float, cols: 2, rows: 2 },
    Type::Matrix { scalar: ScalarKind::Float, cols: 2, rows: 3 },
    Type::Matrix { scalar: ScalarKind::Float, cols: 2, rows: 4 },
    Type::Matrix { scalar: ScalarKind::Float, cols: 3, rows: 2 },
    Type::Matrix { scalar: ScalarKind::Float, cols: 3, rows: 3 },
    Type::Matrix { scalar: ScalarKind::Float, cols: 3, rows: 4 },
    Type::Matrix { scalar: ScalarKind::Float, cols: 4, rows: 2 },
    Type::Matrix { scalar: ScalarKind::Float, cols: 4, rows: 3 },
    Type::Matrix { scalar: ScalarKind::Float, cols: 4, rows: 4 },
    Type::Matrix { scalar: ScalarKind::Double, cols: 2, rows: 2 },
    Type::Matrix { scalar: ScalarKind::Double, cols: 2, rows: 3 },
    Type::Matrix { scalar: ScalarKind::Double, cols: 2, rows: 4 },
    Type::Matrix { scalar: ScalarKind::Double, cols: 3, rows: 2 },
    Type::Matrix { scalar: ScalarKind::Double, cols: 3, rows: 3 },
    Type::Matrix { scalar: ScalarKind::Double, cols: 3, rows: 4 },
    Type::Matrix { scalar: ScalarKind::Double, cols: 4, rows: 2 },
    Type::Matrix { scalar: ScalarKind::Double, cols: 4, rows: 3 },
    Type::Matrix { scalar: ScalarKind::Double, cols: 4, rows: 4 },
];
