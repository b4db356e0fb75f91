//! The single-pass semantic checker.

use crate::env::{Binding, Scopes};
use crate::{SemanticError, Swizzle, TypeInfo, VarTarget};
use rustc_hash::FxHashMap;
use silica_diagnostic::ErrorCode;
use silica_ir::{
    Ast, BinaryOp, DeclId, DeclKind, ExprId, ExprKind, FunctionDecl, GlobalDecl, Module, Name,
    Span, StmtId, StmtKind, StorageQualifier, StringInterner, UnaryOp,
};
use silica_types::Type;

/// Check a parsed module, producing the [`TypeInfo`] side tables.
pub fn check(
    ast: &Ast,
    module: &Module,
    interner: &StringInterner,
) -> Result<TypeInfo, SemanticError> {
    let mut checker = Checker {
        ast,
        interner,
        info: TypeInfo {
            expr_types: vec![Type::VOID; ast.expr_count()],
            ..TypeInfo::default()
        },
        scopes: Scopes::new(),
        functions: FxHashMap::default(),
        current_return: Type::VOID,
    };
    checker.collect(module)?;
    checker.check_module(module)?;
    checker.require_main()?;
    Ok(checker.info)
}

struct Checker<'a> {
    ast: &'a Ast,
    interner: &'a StringInterner,
    info: TypeInfo,
    scopes: Scopes,
    /// Overload sets by function name, in declaration order.
    functions: FxHashMap<Name, Vec<DeclId>>,
    current_return: Type,
}

impl<'a> Checker<'a> {
    fn err(
        &self,
        code: ErrorCode,
        span: Span,
        message: impl Into<String>,
    ) -> SemanticError {
        SemanticError::new(code, span, message)
    }

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    // ===== Declaration collection =====

    fn collect(&mut self, module: &Module) -> Result<(), SemanticError> {
        let ast = self.ast;
        for &decl_id in &module.decls {
            let decl = ast.decl(decl_id);
            match decl.kind {
                DeclKind::Global(global) => {
                    let binding = Binding {
                        ty: global.ty,
                        target: VarTarget::Global(decl_id),
                        storage: global.storage,
                    };
                    if !self.scopes.declare(global.name, binding) {
                        return Err(self.err(
                            ErrorCode::E3008,
                            decl.span,
                            format!("duplicate definition of `{}`", self.name(global.name)),
                        ));
                    }
                }
                DeclKind::Function(func) => {
                    let params: Vec<Type> =
                        ast.params(func.params).iter().map(|p| p.ty).collect();
                    if let Some(existing) = self.functions.get(&func.name) {
                        for &other_id in existing {
                            let DeclKind::Function(other) = ast.decl(other_id).kind else {
                                continue;
                            };
                            let other_params: Vec<Type> =
                                ast.params(other.params).iter().map(|p| p.ty).collect();
                            if params == other_params {
                                return Err(self.err(
                                    ErrorCode::E3008,
                                    decl.span,
                                    format!(
                                        "duplicate definition of `{}`",
                                        self.name(func.name)
                                    ),
                                ));
                            }
                        }
                    }
                    self.functions.entry(func.name).or_default().push(decl_id);
                }
            }
        }
        Ok(())
    }

    fn require_main(&self) -> Result<(), SemanticError> {
        let main = self.interner.intern("main");
        let found = self.functions.get(&main).is_some_and(|candidates| {
            candidates.iter().any(|&id| {
                let DeclKind::Function(func) = self.ast.decl(id).kind else {
                    return false;
                };
                func.return_type == Type::VOID && self.ast.params(func.params).is_empty()
            })
        });
        if found {
            Ok(())
        } else {
            Err(self.err(
                ErrorCode::E3009,
                Span::DUMMY,
                "missing `void main()` entry point",
            ))
        }
    }

    // ===== Declarations =====

    fn check_module(&mut self, module: &Module) -> Result<(), SemanticError> {
        for &decl_id in &module.decls {
            let decl = *self.ast.decl(decl_id);
            match decl.kind {
                DeclKind::Global(global) => self.check_global(&global, decl.span)?,
                DeclKind::Function(func) => self.check_function(decl_id, &func)?,
            }
        }
        Ok(())
    }

    fn check_global(&mut self, global: &GlobalDecl, span: Span) -> Result<(), SemanticError> {
        if global.ty.is_void() {
            return Err(self.err(
                ErrorCode::E3002,
                span,
                "variables cannot have type `void`",
            ));
        }
        let Some(init) = global.init else {
            return Ok(());
        };

        if matches!(
            global.storage,
            StorageQualifier::In | StorageQualifier::Out | StorageQualifier::Uniform
        ) {
            return Err(self.err(
                ErrorCode::E3010,
                span,
                format!(
                    "`{}` variables cannot have initializers",
                    global.storage.keyword()
                ),
            ));
        }

        if !self.is_const_scalar_expr(init) {
            return Err(self.err(
                ErrorCode::E3010,
                self.ast.expr(init).span,
                "global initializers must be constant scalar expressions",
            ));
        }

        let init_ty = self.check_expr(init)?;
        self.coerce(init, init_ty, global.ty, self.ast.expr(init).span)
    }

    /// Literal, or a negated numeric literal.
    fn is_const_scalar_expr(&self, id: ExprId) -> bool {
        match self.ast.expr(id).kind {
            ExprKind::Int(_)
            | ExprKind::Uint(_)
            | ExprKind::Float(_)
            | ExprKind::Double(_)
            | ExprKind::Bool(_) => true,
            ExprKind::Unary { op: UnaryOp::Neg, operand } => matches!(
                self.ast.expr(operand).kind,
                ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Double(_)
            ),
            _ => false,
        }
    }

    fn check_function(
        &mut self,
        decl_id: DeclId,
        func: &FunctionDecl,
    ) -> Result<(), SemanticError> {
        self.current_return = func.return_type;

        self.scopes.push();
        let ast = self.ast;
        for (index, param) in ast.params(func.params).iter().enumerate() {
            if param.ty.is_void() {
                return Err(self.err(
                    ErrorCode::E3002,
                    param.span,
                    "parameters cannot have type `void`",
                ));
            }
            let index = u16::try_from(index)
                .unwrap_or_else(|_| panic!("more than u16::MAX parameters"));
            let binding = Binding {
                ty: param.ty,
                target: VarTarget::Param { function: decl_id, index },
                storage: StorageQualifier::None,
            };
            if !self.scopes.declare(param.name, binding) {
                return Err(self.err(
                    ErrorCode::E3008,
                    param.span,
                    format!("duplicate parameter `{}`", self.name(param.name)),
                ));
            }
        }

        self.check_stmt(func.body)?;
        self.scopes.pop();
        Ok(())
    }

    // ===== Statements =====

    fn check_stmt(&mut self, id: StmtId) -> Result<(), SemanticError> {
        let stmt = *self.ast.stmt(id);
        match stmt.kind {
            StmtKind::Block { stmts } => {
                self.scopes.push();
                let ast = self.ast;
                for &inner in ast.stmt_list(stmts) {
                    self.check_stmt(inner)?;
                }
                self.scopes.pop();
                Ok(())
            }
            StmtKind::Local { ty, name, init } => {
                if ty.is_void() {
                    return Err(self.err(
                        ErrorCode::E3002,
                        stmt.span,
                        "variables cannot have type `void`",
                    ));
                }
                if let Some(init) = init {
                    let init_ty = self.check_expr(init)?;
                    self.coerce(init, init_ty, ty, self.ast.expr(init).span)?;
                }
                let binding = Binding {
                    ty,
                    target: VarTarget::Local(id),
                    storage: StorageQualifier::None,
                };
                if !self.scopes.declare(name, binding) {
                    return Err(self.err(
                        ErrorCode::E3008,
                        stmt.span,
                        format!("duplicate definition of `{}`", self.name(name)),
                    ));
                }
                Ok(())
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.check_condition(cond)?;
                self.check_stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch)?;
                }
                Ok(())
            }
            StmtKind::While { cond, body } => {
                self.check_condition(cond)?;
                self.check_stmt(body)
            }
            StmtKind::For { init, cond, step, body } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.check_stmt(init)?;
                }
                if let Some(cond) = cond {
                    self.check_condition(cond)?;
                }
                if let Some(step) = step {
                    self.check_expr(step)?;
                }
                self.check_stmt(body)?;
                self.scopes.pop();
                Ok(())
            }
            StmtKind::Return { value } => match (value, self.current_return.is_void()) {
                (None, true) => Ok(()),
                (Some(value), false) => {
                    let ty = self.check_expr(value)?;
                    self.coerce(value, ty, self.current_return, self.ast.expr(value).span)
                }
                (None, false) => Err(self.err(
                    ErrorCode::E3002,
                    stmt.span,
                    format!(
                        "missing return value in function returning `{}`",
                        self.current_return.glsl_name()
                    ),
                )),
                (Some(value), true) => Err(self.err(
                    ErrorCode::E3002,
                    self.ast.expr(value).span,
                    "cannot return a value from a `void` function",
                )),
            },
            StmtKind::Expr(expr) => self.check_expr(expr).map(|_| ()),
            StmtKind::Empty => Ok(()),
        }
    }

    fn check_condition(&mut self, cond: ExprId) -> Result<(), SemanticError> {
        let ty = self.check_expr(cond)?;
        if ty == Type::BOOL {
            Ok(())
        } else {
            Err(self.err(
                ErrorCode::E3002,
                self.ast.expr(cond).span,
                format!("condition must be `bool`, found `{}`", ty.glsl_name()),
            ))
        }
    }

    // ===== Expressions =====

    /// Insert an implicit conversion of `id` to `target`, or fail.
    fn coerce(
        &mut self,
        id: ExprId,
        from: Type,
        target: Type,
        span: Span,
    ) -> Result<(), SemanticError> {
        if from == target {
            return Ok(());
        }
        if target.can_convert(from) {
            self.info.conversions.insert(id, target);
            return Ok(());
        }
        Err(self.err(
            ErrorCode::E3002,
            span,
            format!(
                "type mismatch: expected `{}`, found `{}`",
                target.glsl_name(),
                from.glsl_name()
            ),
        ))
    }

    /// Find a common type for a binary operation's operands, inserting the
    /// conversion marker on whichever side widens.
    fn unify(
        &mut self,
        context: &str,
        lhs: ExprId,
        lt: Type,
        rhs: ExprId,
        rt: Type,
        span: Span,
    ) -> Result<Type, SemanticError> {
        if lt == rt {
            Ok(lt)
        } else if lt.can_convert(rt) {
            self.info.conversions.insert(rhs, lt);
            Ok(lt)
        } else if rt.can_convert(lt) {
            self.info.conversions.insert(lhs, rt);
            Ok(rt)
        } else {
            Err(self.err(
                ErrorCode::E3002,
                span,
                format!(
                    "type mismatch: {context} cannot combine `{}` and `{}`",
                    lt.glsl_name(),
                    rt.glsl_name()
                ),
            ))
        }
    }

    fn check_expr(&mut self, id: ExprId) -> Result<Type, SemanticError> {
        let expr = *self.ast.expr(id);
        let ty = match expr.kind {
            ExprKind::Int(_) => Type::INT,
            ExprKind::Uint(_) => Type::UINT,
            ExprKind::Float(_) => Type::FLOAT,
            ExprKind::Double(_) => Type::DOUBLE,
            ExprKind::Bool(_) => Type::BOOL,
            ExprKind::Ident(name) => {
                let Some(binding) = self.scopes.lookup(name) else {
                    return Err(self.err(
                        ErrorCode::E3001,
                        expr.span,
                        format!("unknown identifier `{}`", self.name(name)),
                    ));
                };
                self.info.idents.insert(id, binding.target);
                binding.ty
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.check_binary(op, lhs, rhs, expr.span)?
            }
            ExprKind::Unary { op, operand } => {
                let ty = self.check_expr(operand)?;
                match op {
                    UnaryOp::Neg => {
                        if !ty.scalar_kind().is_numeric() {
                            return Err(self.err(
                                ErrorCode::E3002,
                                expr.span,
                                format!("cannot negate `{}`", ty.glsl_name()),
                            ));
                        }
                        ty
                    }
                    UnaryOp::Not => {
                        if ty != Type::BOOL {
                            return Err(self.err(
                                ErrorCode::E3002,
                                expr.span,
                                format!("`!` requires `bool`, found `{}`", ty.glsl_name()),
                            ));
                        }
                        ty
                    }
                    UnaryOp::BitNot => {
                        if !(ty.is_scalar() && ty.scalar_kind().is_integer()) {
                            return Err(self.err(
                                ErrorCode::E3002,
                                expr.span,
                                format!(
                                    "`~` requires an integer scalar, found `{}`",
                                    ty.glsl_name()
                                ),
                            ));
                        }
                        ty
                    }
                }
            }
            ExprKind::Assign { target, value } => {
                let target_ty = self.check_lvalue(target)?;
                let value_ty = self.check_expr(value)?;
                self.coerce(value, value_ty, target_ty, self.ast.expr(value).span)?;
                target_ty
            }
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                self.check_condition(cond)?;
                let tt = self.check_expr(then_branch)?;
                let et = self.check_expr(else_branch)?;
                self.unify("ternary branches", then_branch, tt, else_branch, et, expr.span)?
            }
            ExprKind::Comma { first, second } => {
                self.check_expr(first)?;
                self.check_expr(second)?
            }
            ExprKind::Call { callee, args } => {
                let ast = self.ast;
                let arg_ids: Vec<ExprId> = ast.expr_list(args).to_vec();
                let mut arg_types = Vec::with_capacity(arg_ids.len());
                for &arg in &arg_ids {
                    arg_types.push(self.check_expr(arg)?);
                }
                self.resolve_call(id, callee, &arg_ids, &arg_types, expr.span)?
            }
            ExprKind::Construct { ty, args } => {
                let ast = self.ast;
                let arg_ids: Vec<ExprId> = ast.expr_list(args).to_vec();
                let mut arg_types = Vec::with_capacity(arg_ids.len());
                for &arg in &arg_ids {
                    arg_types.push(self.check_expr(arg)?);
                }
                self.check_construct(ty, &arg_types, expr.span)?
            }
            ExprKind::Member { base, field } => {
                let base_ty = self.check_expr(base)?;
                self.check_swizzle(id, base_ty, field, expr.span)?
            }
            ExprKind::Index { base, index } => {
                let base_ty = self.check_expr(base)?;
                let index_ty = self.check_expr(index)?;
                self.check_index(base_ty, index_ty, expr.span)?
            }
        };
        self.info.expr_types[id.index()] = ty;
        Ok(ty)
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        span: Span,
    ) -> Result<Type, SemanticError> {
        let lt = self.check_expr(lhs)?;
        let rt = self.check_expr(rhs)?;

        let numeric = |ty: Type| ty.scalar_kind().is_numeric();
        let int_scalar = |ty: Type| ty.is_scalar() && ty.scalar_kind().is_integer();
        let numeric_scalar = |ty: Type| ty.is_scalar() && ty.scalar_kind().is_numeric();

        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                if !numeric(lt) || !numeric(rt) {
                    return Err(self.err(
                        ErrorCode::E3002,
                        span,
                        format!(
                            "operator `{op}` requires numeric operands, found `{}` and `{}`",
                            lt.glsl_name(),
                            rt.glsl_name()
                        ),
                    ));
                }
                self.unify(&format!("operator `{op}`"), lhs, lt, rhs, rt, span)
            }
            BinaryOp::Mod | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
                if !int_scalar(lt) || !int_scalar(rt) {
                    return Err(self.err(
                        ErrorCode::E3002,
                        span,
                        format!(
                            "operator `{op}` requires integer scalars, found `{}` and `{}`",
                            lt.glsl_name(),
                            rt.glsl_name()
                        ),
                    ));
                }
                self.unify(&format!("operator `{op}`"), lhs, lt, rhs, rt, span)
            }
            BinaryOp::Shl | BinaryOp::Shr => {
                if !int_scalar(lt) || !int_scalar(rt) {
                    return Err(self.err(
                        ErrorCode::E3002,
                        span,
                        format!(
                            "operator `{op}` requires integer scalars, found `{}` and `{}`",
                            lt.glsl_name(),
                            rt.glsl_name()
                        ),
                    ));
                }
                // The shift amount keeps its own type.
                Ok(lt)
            }
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
                if lt != Type::BOOL || rt != Type::BOOL {
                    return Err(self.err(
                        ErrorCode::E3002,
                        span,
                        format!(
                            "operator `{op}` requires `bool` operands, found `{}` and `{}`",
                            lt.glsl_name(),
                            rt.glsl_name()
                        ),
                    ));
                }
                Ok(Type::BOOL)
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                if !lt.is_scalar() || !rt.is_scalar() {
                    return Err(self.err(
                        ErrorCode::E3002,
                        span,
                        "comparison of composite values is not supported",
                    ));
                }
                self.unify(&format!("operator `{op}`"), lhs, lt, rhs, rt, span)?;
                Ok(Type::BOOL)
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                if !numeric_scalar(lt) || !numeric_scalar(rt) {
                    return Err(self.err(
                        ErrorCode::E3002,
                        span,
                        format!(
                            "operator `{op}` requires numeric scalars, found `{}` and `{}`",
                            lt.glsl_name(),
                            rt.glsl_name()
                        ),
                    ));
                }
                self.unify(&format!("operator `{op}`"), lhs, lt, rhs, rt, span)?;
                Ok(Type::BOOL)
            }
        }
    }

    /// Validate an assignment target, returning its type.
    fn check_lvalue(&mut self, id: ExprId) -> Result<Type, SemanticError> {
        let expr = *self.ast.expr(id);
        let ty = match expr.kind {
            ExprKind::Ident(name) => {
                let Some(binding) = self.scopes.lookup(name) else {
                    return Err(self.err(
                        ErrorCode::E3001,
                        expr.span,
                        format!("unknown identifier `{}`", self.name(name)),
                    ));
                };
                match binding.storage {
                    StorageQualifier::Const => {
                        return Err(self.err(
                            ErrorCode::E3004,
                            expr.span,
                            format!("cannot assign to constant `{}`", self.name(name)),
                        ));
                    }
                    StorageQualifier::In => {
                        return Err(self.err(
                            ErrorCode::E3004,
                            expr.span,
                            format!("cannot assign to `in` variable `{}`", self.name(name)),
                        ));
                    }
                    StorageQualifier::Uniform => {
                        return Err(self.err(
                            ErrorCode::E3004,
                            expr.span,
                            format!("cannot assign to uniform `{}`", self.name(name)),
                        ));
                    }
                    _ => {}
                }
                self.info.idents.insert(id, binding.target);
                binding.ty
            }
            ExprKind::Member { base, field } => {
                let base_ty = self.check_lvalue(base)?;
                let result = self.check_swizzle(id, base_ty, field, expr.span)?;
                if !result.is_scalar() {
                    return Err(self.err(
                        ErrorCode::E3004,
                        expr.span,
                        "cannot assign to a multi-component swizzle",
                    ));
                }
                result
            }
            ExprKind::Index { base, index } => {
                let base_ty = self.check_lvalue(base)?;
                let index_ty = self.check_expr(index)?;
                self.check_index(base_ty, index_ty, expr.span)?
            }
            _ => {
                return Err(self.err(
                    ErrorCode::E3004,
                    expr.span,
                    "invalid assignment target",
                ));
            }
        };
        self.info.expr_types[id.index()] = ty;
        Ok(ty)
    }

    fn check_swizzle(
        &mut self,
        id: ExprId,
        base_ty: Type,
        field: Name,
        span: Span,
    ) -> Result<Type, SemanticError> {
        let field_str = self.name(field);
        if !base_ty.is_vector() {
            return Err(self.err(
                ErrorCode::E3005,
                span,
                format!("type `{}` has no member `{field_str}`", base_ty.glsl_name()),
            ));
        }
        let Some(swizzle) = Swizzle::parse(field_str, base_ty.length()) else {
            return Err(self.err(
                ErrorCode::E3005,
                span,
                format!(
                    "invalid swizzle `{field_str}` on `{}`",
                    base_ty.glsl_name()
                ),
            ));
        };
        self.info.swizzles.insert(id, swizzle);
        let scalar = base_ty.scalar_kind();
        Ok(if swizzle.len() == 1 {
            Type::scalar(scalar)
        } else {
            Type::vector(scalar, swizzle.len() as u8)
        })
    }

    fn check_index(
        &mut self,
        base_ty: Type,
        index_ty: Type,
        span: Span,
    ) -> Result<Type, SemanticError> {
        if !(index_ty.is_scalar() && index_ty.scalar_kind().is_integer()) {
            return Err(self.err(
                ErrorCode::E3002,
                span,
                format!("index must be an integer, found `{}`", index_ty.glsl_name()),
            ));
        }
        base_ty.index_type().ok_or_else(|| {
            self.err(
                ErrorCode::E3002,
                span,
                format!("cannot index a value of type `{}`", base_ty.glsl_name()),
            )
        })
    }

    fn check_construct(
        &mut self,
        ty: Type,
        arg_types: &[Type],
        span: Span,
    ) -> Result<Type, SemanticError> {
        if ty.is_void() {
            return Err(self.err(ErrorCode::E3006, span, "cannot construct `void`"));
        }
        if arg_types.is_empty() {
            return Err(self.err(
                ErrorCode::E3006,
                span,
                format!("`{}` constructor needs arguments", ty.glsl_name()),
            ));
        }

        // A single scalar argument: cast, splat, or diagonal matrix.
        if arg_types.len() == 1 && arg_types[0].is_scalar() {
            return Ok(ty);
        }

        // Otherwise the scalar/vector arguments must supply exactly the
        // target's component count.
        let mut components = 0u32;
        for &arg in arg_types {
            if arg.is_matrix() {
                return Err(self.err(
                    ErrorCode::E3006,
                    span,
                    format!(
                        "matrix arguments are not allowed in `{}` constructors",
                        ty.glsl_name()
                    ),
                ));
            }
            components += arg.component_count();
        }
        if components != ty.component_count() {
            return Err(self.err(
                ErrorCode::E3006,
                span,
                format!(
                    "`{}` constructor expects {} components, found {components}",
                    ty.glsl_name(),
                    ty.component_count()
                ),
            ));
        }
        Ok(ty)
    }

    fn resolve_call(
        &mut self,
        id: ExprId,
        callee: Name,
        arg_ids: &[ExprId],
        arg_types: &[Type],
        span: Span,
    ) -> Result<Type, SemanticError> {
        let Some(candidates) = self.functions.get(&callee).cloned() else {
            return Err(self.err(
                ErrorCode::E3001,
                span,
                format!("unknown function `{}`", self.name(callee)),
            ));
        };

        // Rank each viable candidate: 0 = exact, 1 = needs conversion.
        let mut viable: Vec<(DeclId, Vec<u8>)> = Vec::new();
        for &candidate in &candidates {
            let DeclKind::Function(func) = self.ast.decl(candidate).kind else {
                continue;
            };
            let params = self.ast.params(func.params);
            if params.len() != arg_types.len() {
                continue;
            }
            let mut ranks = Vec::with_capacity(params.len());
            let mut ok = true;
            for (param, &arg) in params.iter().zip(arg_types) {
                if param.ty == arg {
                    ranks.push(0);
                } else if param.ty.can_convert(arg) {
                    ranks.push(1);
                } else {
                    ok = false;
                    break;
                }
            }
            if ok {
                viable.push((candidate, ranks));
            }
        }

        let args_rendered = || {
            arg_types
                .iter()
                .map(|t| t.glsl_name())
                .collect::<Vec<_>>()
                .join(", ")
        };

        if viable.is_empty() {
            return Err(self.err(
                ErrorCode::E3007,
                span,
                format!(
                    "no matching overload for `{}({})`",
                    self.name(callee),
                    args_rendered()
                ),
            ));
        }

        // A candidate wins if no other candidate is strictly better: better
        // means no-worse in every argument and strictly better in one.
        let strictly_better = |a: &[u8], b: &[u8]| {
            a.iter().zip(b).all(|(x, y)| x <= y) && a.iter().zip(b).any(|(x, y)| x < y)
        };
        let minimal: Vec<&(DeclId, Vec<u8>)> = viable
            .iter()
            .filter(|(_, ranks)| {
                !viable.iter().any(|(_, other)| strictly_better(other, ranks))
            })
            .collect();

        let (chosen, ranks) = match minimal.as_slice() {
            [single] => (single.0, &single.1),
            _ => {
                return Err(self.err(
                    ErrorCode::E3003,
                    span,
                    format!(
                        "ambiguous call to `{}({})`",
                        self.name(callee),
                        args_rendered()
                    ),
                ));
            }
        };

        let DeclKind::Function(func) = self.ast.decl(chosen).kind else {
            unreachable!("overload candidates are functions");
        };
        let params = self.ast.params(func.params);
        for ((&arg_id, param), &rank) in arg_ids.iter().zip(params).zip(ranks) {
            if rank == 1 {
                self.info.conversions.insert(arg_id, param.ty);
            }
        }
        self.info.calls.insert(id, chosen);
        Ok(func.return_type)
    }
}

#[cfg(test)]
mod tests;
