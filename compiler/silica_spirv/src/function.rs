//! Function-body emission.
//!
//! Walks checked statements and expressions, maintaining one current basic
//! block at a time. Every block is closed by exactly one terminator;
//! opening a block while the previous one is still open is an internal
//! invariant violation and aborts, since it indicates a compiler defect.

use crate::instruction::Instruction;
use crate::module::GlobalSlot;
use crate::op;
use crate::writer::{Section, Writer};
use rustc_hash::FxHashMap;
use silica_ir::{
    Ast, BinaryOp, DeclId, ExprId, ExprKind, FunctionDecl, StmtId, StmtKind, UnaryOp,
};
use silica_typeck::{TypeInfo, VarTarget};
use silica_types::{ScalarKind, Type};

pub(crate) struct FunctionEmitter<'a> {
    writer: &'a mut Writer,
    ast: &'a Ast,
    info: &'a TypeInfo,
    globals: &'a FxHashMap<DeclId, GlobalSlot>,
    fn_ids: &'a FxHashMap<DeclId, u32>,
    /// Function-storage variable per local declaration.
    locals: FxHashMap<StmtId, (u32, Type)>,
    /// Function-storage shadow variable per parameter index.
    param_vars: FxHashMap<u16, (u32, Type)>,
    block_open: bool,
    current_block: u32,
}

impl<'a> FunctionEmitter<'a> {
    pub fn new(
        writer: &'a mut Writer,
        ast: &'a Ast,
        info: &'a TypeInfo,
        globals: &'a FxHashMap<DeclId, GlobalSlot>,
        fn_ids: &'a FxHashMap<DeclId, u32>,
    ) -> Self {
        FunctionEmitter {
            writer,
            ast,
            info,
            globals,
            fn_ids,
            locals: FxHashMap::default(),
            param_vars: FxHashMap::default(),
            block_open: false,
            current_block: 0,
        }
    }

    pub fn emit(mut self, decl_id: DeclId, func: &FunctionDecl) {
        let ast = self.ast;
        let params = ast.params(func.params);
        let param_types: Vec<Type> = params.iter().map(|p| p.ty).collect();

        let fn_type = self.writer.function_type_id(func.return_type, &param_types);
        let ret_type = self.writer.type_id(func.return_type);
        let fn_id = self.fn_ids[&decl_id];
        self.add(Instruction::new(
            op::OP_FUNCTION,
            [ret_type, fn_id, op::FUNCTION_CONTROL_NONE, fn_type],
        ));

        let mut param_values = Vec::with_capacity(params.len());
        for param in params {
            let type_id = self.writer.type_id(param.ty);
            let value = self.writer.next_id();
            self.add(Instruction::new(op::OP_FUNCTION_PARAMETER, [type_id, value]));
            param_values.push(value);
        }

        let entry = self.writer.next_id();
        self.begin_block(entry);

        // All Function-storage variables go at the top of the entry block:
        // shadow variables for the (assignable) parameters, then every local
        // declared anywhere in the body.
        for (index, param) in params.iter().enumerate() {
            let pointer = self.writer.pointer_id(op::STORAGE_FUNCTION, param.ty);
            let variable = self.writer.next_id();
            self.add(Instruction::new(
                op::OP_VARIABLE,
                [pointer, variable, op::STORAGE_FUNCTION],
            ));
            self.param_vars.insert(index as u16, (variable, param.ty));
        }
        self.declare_locals(func.body);

        for (index, &value) in param_values.iter().enumerate() {
            let (variable, _) = self.param_vars[&(index as u16)];
            self.add(Instruction::new(op::OP_STORE, [variable, value]));
        }

        self.emit_stmt(func.body);

        // Fallthrough at the end of the function.
        if self.block_open {
            if func.return_type.is_void() {
                self.terminate(Instruction::new(op::OP_RETURN, []));
            } else {
                let type_id = self.writer.type_id(func.return_type);
                let undef = self.writer.next_id();
                self.add(Instruction::new(op::OP_UNDEF, [type_id, undef]));
                self.terminate(Instruction::new(op::OP_RETURN_VALUE, [undef]));
            }
        }
        self.add(Instruction::new(op::OP_FUNCTION_END, []));
    }

    fn declare_locals(&mut self, id: StmtId) {
        let ast = self.ast;
        match ast.stmt(id).kind {
            StmtKind::Block { stmts } => {
                for &inner in ast.stmt_list(stmts) {
                    self.declare_locals(inner);
                }
            }
            StmtKind::Local { ty, .. } => {
                let pointer = self.writer.pointer_id(op::STORAGE_FUNCTION, ty);
                let variable = self.writer.next_id();
                self.add(Instruction::new(
                    op::OP_VARIABLE,
                    [pointer, variable, op::STORAGE_FUNCTION],
                ));
                self.locals.insert(id, (variable, ty));
            }
            StmtKind::If { then_branch, else_branch, .. } => {
                self.declare_locals(then_branch);
                if let Some(else_branch) = else_branch {
                    self.declare_locals(else_branch);
                }
            }
            StmtKind::While { body, .. } => self.declare_locals(body),
            StmtKind::For { init, body, .. } => {
                if let Some(init) = init {
                    self.declare_locals(init);
                }
                self.declare_locals(body);
            }
            _ => {}
        }
    }

    // ===== Basic blocks =====

    fn add(&mut self, instruction: Instruction) {
        self.writer.add(Section::Function, instruction);
    }

    fn begin_block(&mut self, id: u32) {
        assert!(
            !self.block_open,
            "internal invariant violation: unterminated basic block"
        );
        self.add(Instruction::new(op::OP_LABEL, [id]));
        self.block_open = true;
        self.current_block = id;
    }

    fn terminate(&mut self, instruction: Instruction) {
        assert!(
            self.block_open,
            "internal invariant violation: terminator outside a basic block"
        );
        self.add(instruction);
        self.block_open = false;
    }

    // ===== Statements =====

    fn emit_stmt(&mut self, id: StmtId) {
        // Code after a terminator in the same block is unreachable; drop it.
        if !self.block_open {
            return;
        }
        let ast = self.ast;
        match ast.stmt(id).kind {
            StmtKind::Block { stmts } => {
                for &inner in ast.stmt_list(stmts) {
                    if !self.block_open {
                        break;
                    }
                    self.emit_stmt(inner);
                }
            }
            StmtKind::Local { init, .. } => {
                if let Some(init) = init {
                    let value = self.emit_expr_converted(init);
                    let (variable, _) = self.locals[&id];
                    self.add(Instruction::new(op::OP_STORE, [variable, value]));
                }
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                let cond = self.emit_expr_converted(cond);
                let then_block = self.writer.next_id();
                let else_block = else_branch.map(|_| self.writer.next_id());
                let merge = self.writer.next_id();

                self.add(Instruction::new(
                    op::OP_SELECTION_MERGE,
                    [merge, op::SELECTION_CONTROL_NONE],
                ));
                self.terminate(Instruction::new(
                    op::OP_BRANCH_CONDITIONAL,
                    [cond, then_block, else_block.unwrap_or(merge)],
                ));

                self.begin_block(then_block);
                self.emit_stmt(then_branch);
                if self.block_open {
                    self.terminate(Instruction::new(op::OP_BRANCH, [merge]));
                }

                if let (Some(else_branch), Some(else_block)) = (else_branch, else_block) {
                    self.begin_block(else_block);
                    self.emit_stmt(else_branch);
                    if self.block_open {
                        self.terminate(Instruction::new(op::OP_BRANCH, [merge]));
                    }
                }

                self.begin_block(merge);
            }
            StmtKind::While { cond, body } => {
                self.emit_loop(Some(cond), None, body);
            }
            StmtKind::For { init, cond, step, body } => {
                if let Some(init) = init {
                    self.emit_stmt(init);
                }
                self.emit_loop(cond, step, body);
            }
            StmtKind::Return { value } => match value {
                Some(value) => {
                    let value = self.emit_expr_converted(value);
                    self.terminate(Instruction::new(op::OP_RETURN_VALUE, [value]));
                }
                None => self.terminate(Instruction::new(op::OP_RETURN, [])),
            },
            StmtKind::Expr(expr) => {
                self.emit_expr(expr);
            }
            StmtKind::Empty => {}
        }
    }

    /// Structured loop skeleton shared by `while` and `for`.
    fn emit_loop(&mut self, cond: Option<ExprId>, step: Option<ExprId>, body: StmtId) {
        let header = self.writer.next_id();
        let cond_block = self.writer.next_id();
        let body_block = self.writer.next_id();
        let continue_block = self.writer.next_id();
        let merge = self.writer.next_id();

        self.terminate(Instruction::new(op::OP_BRANCH, [header]));

        self.begin_block(header);
        self.add(Instruction::new(
            op::OP_LOOP_MERGE,
            [merge, continue_block, op::LOOP_CONTROL_NONE],
        ));
        self.terminate(Instruction::new(op::OP_BRANCH, [cond_block]));

        self.begin_block(cond_block);
        let cond = match cond {
            Some(cond) => self.emit_expr_converted(cond),
            None => self.writer.constant_id(Type::BOOL, 1),
        };
        self.terminate(Instruction::new(
            op::OP_BRANCH_CONDITIONAL,
            [cond, body_block, merge],
        ));

        self.begin_block(body_block);
        self.emit_stmt(body);
        if self.block_open {
            self.terminate(Instruction::new(op::OP_BRANCH, [continue_block]));
        }

        self.begin_block(continue_block);
        if let Some(step) = step {
            self.emit_expr(step);
        }
        self.terminate(Instruction::new(op::OP_BRANCH, [header]));

        self.begin_block(merge);
    }

    // ===== Expressions =====

    /// Emit `id` and apply its implicit-conversion marker, if any.
    fn emit_expr_converted(&mut self, id: ExprId) -> u32 {
        let value = self.emit_expr(id);
        match self.info.conversions.get(&id).copied() {
            Some(target) => {
                let from = self.info.expr_type(id);
                self.convert_value(value, from, target)
            }
            None => value,
        }
    }

    fn emit_expr(&mut self, id: ExprId) -> u32 {
        let expr = *self.ast.expr(id);
        match expr.kind {
            ExprKind::Int(v) => self.writer.constant_id(Type::INT, u64::from(v as u32)),
            ExprKind::Uint(v) => self.writer.constant_id(Type::UINT, u64::from(v as u32)),
            ExprKind::Float(bits) => {
                let narrowed = (f64::from_bits(bits) as f32).to_bits();
                self.writer.constant_id(Type::FLOAT, u64::from(narrowed))
            }
            ExprKind::Double(bits) => self.writer.constant_id(Type::DOUBLE, bits),
            ExprKind::Bool(b) => self.writer.constant_id(Type::BOOL, u64::from(b)),
            ExprKind::Ident(_) => match self.ident_target(id) {
                IdentSlot::Value(value) => value,
                IdentSlot::Pointer(pointer, ty) => self.load(ty, pointer),
            },
            ExprKind::Binary { op: bin_op, lhs, rhs } => {
                let left = self.emit_expr_converted(lhs);
                let right = self.emit_expr_converted(rhs);
                let operand_kind = self.info.converted_type(lhs).scalar_kind();
                let result_type = self.info.expr_type(id);
                let opcode = binary_opcode(bin_op, operand_kind);
                let type_id = self.writer.type_id(result_type);
                let result = self.writer.next_id();
                self.add(Instruction::new(opcode, [type_id, result, left, right]));
                result
            }
            ExprKind::Unary { op: un_op, operand } => {
                let value = self.emit_expr_converted(operand);
                let ty = self.info.converted_type(operand);
                let opcode = match un_op {
                    UnaryOp::Neg if ty.scalar_kind().is_float() => op::OP_F_NEGATE,
                    UnaryOp::Neg => op::OP_S_NEGATE,
                    UnaryOp::Not => op::OP_LOGICAL_NOT,
                    UnaryOp::BitNot => op::OP_NOT,
                };
                let type_id = self.writer.type_id(ty);
                let result = self.writer.next_id();
                self.add(Instruction::new(opcode, [type_id, result, value]));
                result
            }
            ExprKind::Assign { target, value } => {
                let value = self.emit_expr_converted(value);
                let (pointer, _) = self.lvalue_pointer(target);
                self.add(Instruction::new(op::OP_STORE, [pointer, value]));
                value
            }
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                let cond = self.emit_expr_converted(cond);
                let then_block = self.writer.next_id();
                let else_block = self.writer.next_id();
                let merge = self.writer.next_id();

                self.add(Instruction::new(
                    op::OP_SELECTION_MERGE,
                    [merge, op::SELECTION_CONTROL_NONE],
                ));
                self.terminate(Instruction::new(
                    op::OP_BRANCH_CONDITIONAL,
                    [cond, then_block, else_block],
                ));

                self.begin_block(then_block);
                let then_value = self.emit_expr_converted(then_branch);
                let then_pred = self.current_block;
                self.terminate(Instruction::new(op::OP_BRANCH, [merge]));

                self.begin_block(else_block);
                let else_value = self.emit_expr_converted(else_branch);
                let else_pred = self.current_block;
                self.terminate(Instruction::new(op::OP_BRANCH, [merge]));

                self.begin_block(merge);
                let type_id = self.writer.type_id(self.info.expr_type(id));
                let result = self.writer.next_id();
                self.add(Instruction::new(
                    op::OP_PHI,
                    [type_id, result, then_value, then_pred, else_value, else_pred],
                ));
                result
            }
            ExprKind::Comma { first, second } => {
                self.emit_expr(first);
                self.emit_expr(second)
            }
            ExprKind::Call { args, .. } => {
                let ast = self.ast;
                let arg_ids: Vec<ExprId> = ast.expr_list(args).to_vec();
                let mut arg_values = Vec::with_capacity(arg_ids.len());
                for &arg in &arg_ids {
                    arg_values.push(self.emit_expr_converted(arg));
                }
                let callee = self.info.calls[&id];
                let fn_id = self.fn_ids[&callee];
                let type_id = self.writer.type_id(self.info.expr_type(id));
                let result = self.writer.next_id();
                let mut operands = vec![type_id, result, fn_id];
                operands.extend(arg_values);
                self.add(Instruction::new(op::OP_FUNCTION_CALL, operands));
                result
            }
            ExprKind::Construct { ty, args } => self.emit_construct(ty, args),
            ExprKind::Member { base, .. } => {
                let base_value = self.emit_expr(base);
                let swizzle = self.info.swizzles[&id];
                let result_type = self.info.expr_type(id);
                let type_id = self.writer.type_id(result_type);
                let result = self.writer.next_id();
                if swizzle.len() == 1 {
                    self.add(Instruction::new(
                        op::OP_COMPOSITE_EXTRACT,
                        [type_id, result, base_value, u32::from(swizzle.components()[0])],
                    ));
                } else {
                    let mut operands = vec![type_id, result, base_value, base_value];
                    operands.extend(swizzle.components().iter().map(|&c| u32::from(c)));
                    self.add(Instruction::new(op::OP_VECTOR_SHUFFLE, operands));
                }
                result
            }
            ExprKind::Index { base, index } => self.emit_index(id, base, index),
        }
    }

    // ===== Variables and l-values =====

    fn ident_target(&mut self, id: ExprId) -> IdentSlot {
        let target = self.info.idents.get(&id).copied().unwrap_or_else(|| {
            panic!("internal invariant violation: unresolved identifier survived checking")
        });
        match target {
            VarTarget::Global(decl) => match self.globals[&decl] {
                GlobalSlot::Constant { id } => IdentSlot::Value(id),
                GlobalSlot::Variable { id, ty, .. } => IdentSlot::Pointer(id, ty),
            },
            VarTarget::Local(stmt) => {
                let (variable, ty) = self.locals[&stmt];
                IdentSlot::Pointer(variable, ty)
            }
            VarTarget::Param { index, .. } => {
                let (variable, ty) = self.param_vars[&index];
                IdentSlot::Pointer(variable, ty)
            }
        }
    }

    fn load(&mut self, ty: Type, pointer: u32) -> u32 {
        let type_id = self.writer.type_id(ty);
        let result = self.writer.next_id();
        self.add(Instruction::new(op::OP_LOAD, [type_id, result, pointer]));
        result
    }

    /// Resolve an l-value to a pointer, building an access chain when the
    /// target is a component or column of a variable.
    fn lvalue_pointer(&mut self, id: ExprId) -> (u32, Type) {
        self.try_lvalue_pointer(id).unwrap_or_else(|| {
            panic!("internal invariant violation: invalid assignment target survived checking")
        })
    }

    fn try_lvalue_pointer(&mut self, id: ExprId) -> Option<(u32, Type)> {
        let (base, storage_class, indices) = self.lvalue_chain(id)?;
        let ty = self.info.expr_type(id);
        if indices.is_empty() {
            return Some((base, ty));
        }
        let pointer_type = self.writer.pointer_id(storage_class, ty);
        let result = self.writer.next_id();
        let mut operands = vec![pointer_type, result, base];
        operands.extend(indices);
        self.add(Instruction::new(op::OP_ACCESS_CHAIN, operands));
        Some((result, ty))
    }

    /// Walk down Ident/Member/Index nodes, collecting access-chain indices.
    fn lvalue_chain(&mut self, id: ExprId) -> Option<(u32, u32, Vec<u32>)> {
        match self.ast.expr(id).kind {
            ExprKind::Ident(_) => {
                let target = self.info.idents.get(&id).copied()?;
                match target {
                    VarTarget::Global(decl) => match self.globals[&decl] {
                        GlobalSlot::Constant { .. } => None,
                        GlobalSlot::Variable { id, storage_class, .. } => {
                            Some((id, storage_class, Vec::new()))
                        }
                    },
                    VarTarget::Local(stmt) => {
                        let (variable, _) = self.locals[&stmt];
                        Some((variable, op::STORAGE_FUNCTION, Vec::new()))
                    }
                    VarTarget::Param { index, .. } => {
                        let (variable, _) = self.param_vars[&index];
                        Some((variable, op::STORAGE_FUNCTION, Vec::new()))
                    }
                }
            }
            ExprKind::Member { base, .. } => {
                let swizzle = self.info.swizzles.get(&id).copied()?;
                if swizzle.len() != 1 {
                    return None;
                }
                let (variable, storage_class, mut indices) = self.lvalue_chain(base)?;
                let component = u64::from(swizzle.components()[0]);
                indices.push(self.writer.constant_id(Type::INT, component));
                Some((variable, storage_class, indices))
            }
            ExprKind::Index { base, index } => {
                let (variable, storage_class, mut indices) = self.lvalue_chain(base)?;
                indices.push(self.emit_expr_converted(index));
                Some((variable, storage_class, indices))
            }
            _ => None,
        }
    }

    fn emit_index(&mut self, id: ExprId, base: ExprId, index: ExprId) -> u32 {
        // Indexing a variable (or a component of one) goes through an
        // access chain so dynamic indices work uniformly.
        if let Some((pointer, ty)) = self.try_lvalue_pointer(id) {
            return self.load(ty, pointer);
        }

        let base_value = self.emit_expr(base);
        let base_type = self.info.expr_type(base);
        let element = self.info.expr_type(id);
        let element_type = self.writer.type_id(element);

        if let ExprKind::Int(v) | ExprKind::Uint(v) = self.ast.expr(index).kind {
            let result = self.writer.next_id();
            self.add(Instruction::new(
                op::OP_COMPOSITE_EXTRACT,
                [element_type, result, base_value, v as u32],
            ));
            return result;
        }

        let index_value = self.emit_expr_converted(index);
        if base_type.is_vector() {
            let result = self.writer.next_id();
            self.add(Instruction::new(
                op::OP_VECTOR_EXTRACT_DYNAMIC,
                [element_type, result, base_value, index_value],
            ));
            return result;
        }

        // Dynamically indexed matrix r-value: extract every column and fold
        // a select chain over the index.
        let index_type = self.info.expr_type(index);
        let bool_type = self.writer.type_id(Type::BOOL);
        let cols = base_type.length();
        let mut result = {
            let first = self.writer.next_id();
            self.add(Instruction::new(
                op::OP_COMPOSITE_EXTRACT,
                [element_type, first, base_value, 0],
            ));
            first
        };
        for col in 1..cols {
            let column = self.writer.next_id();
            self.add(Instruction::new(
                op::OP_COMPOSITE_EXTRACT,
                [element_type, column, base_value, col],
            ));
            let expected = self.writer.constant_id(index_type, u64::from(col));
            let matches = self.writer.next_id();
            self.add(Instruction::new(
                op::OP_I_EQUAL,
                [bool_type, matches, index_value, expected],
            ));
            let selected = self.writer.next_id();
            self.add(Instruction::new(
                op::OP_SELECT,
                [element_type, selected, matches, column, result],
            ));
            result = selected;
        }
        result
    }

    // ===== Constructors and conversions =====

    fn emit_construct(&mut self, ty: Type, args: silica_ir::ExprRange) -> u32 {
        let ast = self.ast;
        let arg_ids: Vec<ExprId> = ast.expr_list(args).to_vec();
        let target_kind = ty.scalar_kind();

        // Single scalar argument: cast, splat, or diagonal matrix.
        if arg_ids.len() == 1 && self.info.expr_type(arg_ids[0]).is_scalar() {
            let arg = arg_ids[0];
            let value = self.emit_expr(arg);
            let from_kind = self.info.expr_type(arg).scalar_kind();
            let converted = self.convert_scalar_value(value, from_kind, target_kind);
            return match ty {
                Type::Scalar(_) => converted,
                Type::Vector { len, .. } => {
                    let parts = vec![converted; usize::from(len)];
                    self.composite_construct(ty, parts)
                }
                Type::Matrix { cols, rows, .. } => {
                    let zero = self.writer.constant_id(Type::scalar(target_kind), 0);
                    let column_type = Type::vector(target_kind, rows);
                    let mut columns = Vec::with_capacity(usize::from(cols));
                    for col in 0..cols {
                        let parts: Vec<u32> = (0..rows)
                            .map(|row| if row == col { converted } else { zero })
                            .collect();
                        columns.push(self.composite_construct(column_type, parts));
                    }
                    self.composite_construct(ty, columns)
                }
            };
        }

        // Component-wise: flatten every argument to scalars of the target's
        // component kind.
        let mut scalars = Vec::new();
        for &arg in &arg_ids {
            let arg_type = self.info.expr_type(arg);
            let value = self.emit_expr(arg);
            match arg_type {
                Type::Scalar(kind) => {
                    scalars.push(self.convert_scalar_value(value, kind, target_kind));
                }
                Type::Vector { scalar, len } => {
                    let component_type = self.writer.type_id(Type::scalar(scalar));
                    for component in 0..u32::from(len) {
                        let extracted = self.writer.next_id();
                        self.add(Instruction::new(
                            op::OP_COMPOSITE_EXTRACT,
                            [component_type, extracted, value, component],
                        ));
                        scalars.push(self.convert_scalar_value(extracted, scalar, target_kind));
                    }
                }
                Type::Matrix { .. } => {
                    unreachable!("matrix constructor arguments survived checking")
                }
            }
        }

        match ty {
            Type::Vector { .. } => self.composite_construct(ty, scalars),
            Type::Matrix { cols, rows, .. } => {
                let column_type = Type::vector(target_kind, rows);
                let columns: Vec<u32> = scalars
                    .chunks(usize::from(rows))
                    .map(|chunk| self.composite_construct(column_type, chunk.to_vec()))
                    .collect();
                debug_assert_eq!(columns.len(), usize::from(cols));
                self.composite_construct(ty, columns)
            }
            Type::Scalar(_) => unreachable!("multi-argument scalar constructor survived checking"),
        }
    }

    fn composite_construct(&mut self, ty: Type, parts: Vec<u32>) -> u32 {
        let type_id = self.writer.type_id(ty);
        let result = self.writer.next_id();
        let mut operands = vec![type_id, result];
        operands.extend(parts);
        self.add(Instruction::new(op::OP_COMPOSITE_CONSTRUCT, operands));
        result
    }

    /// Explicit scalar conversion (constructors): any kind to any kind.
    fn convert_scalar_value(&mut self, value: u32, from: ScalarKind, to: ScalarKind) -> u32 {
        use ScalarKind::{Bool, Double, Float, Int, Uint};
        if from == to {
            return value;
        }
        let target = Type::scalar(to);

        // bool(x) is x != 0; numeric(b) selects between one and zero.
        if from == Bool {
            let one = self.writer.constant_id(target, one_bits(to));
            let zero = self.writer.constant_id(target, 0);
            let type_id = self.writer.type_id(target);
            let result = self.writer.next_id();
            self.add(Instruction::new(op::OP_SELECT, [type_id, result, value, one, zero]));
            return result;
        }
        if to == Bool {
            let source = Type::scalar(from);
            let zero = self.writer.constant_id(source, 0);
            let opcode = if from.is_float() { op::OP_F_ORD_NOT_EQUAL } else { op::OP_I_NOT_EQUAL };
            let type_id = self.writer.type_id(target);
            let result = self.writer.next_id();
            self.add(Instruction::new(opcode, [type_id, result, value, zero]));
            return result;
        }

        let opcode = match (from, to) {
            (Int, Uint) | (Uint, Int) => op::OP_BITCAST,
            (Int, Float | Double) => op::OP_CONVERT_S_TO_F,
            (Uint, Float | Double) => op::OP_CONVERT_U_TO_F,
            (Float, Double) | (Double, Float) => op::OP_F_CONVERT,
            (Float | Double, Int) => op::OP_CONVERT_F_TO_S,
            (Float | Double, Uint) => op::OP_CONVERT_F_TO_U,
            _ => unreachable!("void conversion survived checking"),
        };
        let type_id = self.writer.type_id(target);
        let result = self.writer.next_id();
        self.add(Instruction::new(opcode, [type_id, result, value]));
        result
    }

    /// Implicit conversion along the lattice, composite shapes included.
    fn convert_value(&mut self, value: u32, from: Type, to: Type) -> u32 {
        use ScalarKind::{Double, Float, Int, Uint};
        if from == to {
            return value;
        }
        let opcode = match (from.scalar_kind(), to.scalar_kind()) {
            (Int, Uint) => op::OP_BITCAST,
            (Int, Float | Double) => op::OP_CONVERT_S_TO_F,
            (Uint, Float | Double) => op::OP_CONVERT_U_TO_F,
            (Float, Double) => op::OP_F_CONVERT,
            (from, to) => {
                panic!("internal invariant violation: implicit {from:?} -> {to:?} conversion")
            }
        };

        // Scalar and vector conversions are one instruction; matrices
        // convert column by column.
        if let Type::Matrix { scalar, cols, rows } = from {
            let to_column = Type::vector(to.scalar_kind(), rows);
            let from_column_type = self.writer.type_id(Type::vector(scalar, rows));
            let to_column_type = self.writer.type_id(to_column);
            let mut columns = Vec::with_capacity(usize::from(cols));
            for col in 0..u32::from(cols) {
                let extracted = self.writer.next_id();
                self.add(Instruction::new(
                    op::OP_COMPOSITE_EXTRACT,
                    [from_column_type, extracted, value, col],
                ));
                let converted = self.writer.next_id();
                self.add(Instruction::new(opcode, [to_column_type, converted, extracted]));
                columns.push(converted);
            }
            return self.composite_construct(to, columns);
        }

        let type_id = self.writer.type_id(to);
        let result = self.writer.next_id();
        self.add(Instruction::new(opcode, [type_id, result, value]));
        result
    }
}

enum IdentSlot {
    /// A folded constant; use the id directly.
    Value(u32),
    /// A variable; load through the pointer.
    Pointer(u32, Type),
}

/// Arithmetic/comparison opcode for an operator over a scalar kind.
fn binary_opcode(bin_op: BinaryOp, kind: ScalarKind) -> u16 {
    use ScalarKind::{Bool, Int, Uint};
    let float = kind.is_float();
    match bin_op {
        BinaryOp::Add => if float { op::OP_F_ADD } else { op::OP_I_ADD },
        BinaryOp::Sub => if float { op::OP_F_SUB } else { op::OP_I_SUB },
        BinaryOp::Mul => if float { op::OP_F_MUL } else { op::OP_I_MUL },
        BinaryOp::Div => match kind {
            Int => op::OP_S_DIV,
            Uint => op::OP_U_DIV,
            _ => op::OP_F_DIV,
        },
        BinaryOp::Mod => if kind == Uint { op::OP_U_MOD } else { op::OP_S_MOD },
        BinaryOp::Eq => match kind {
            Bool => op::OP_LOGICAL_EQUAL,
            Int | Uint => op::OP_I_EQUAL,
            _ => op::OP_F_ORD_EQUAL,
        },
        BinaryOp::NotEq => match kind {
            Bool => op::OP_LOGICAL_NOT_EQUAL,
            Int | Uint => op::OP_I_NOT_EQUAL,
            _ => op::OP_F_ORD_NOT_EQUAL,
        },
        BinaryOp::Lt => match kind {
            Int => op::OP_S_LESS_THAN,
            Uint => op::OP_U_LESS_THAN,
            _ => op::OP_F_ORD_LESS_THAN,
        },
        BinaryOp::LtEq => match kind {
            Int => op::OP_S_LESS_THAN_EQUAL,
            Uint => op::OP_U_LESS_THAN_EQUAL,
            _ => op::OP_F_ORD_LESS_THAN_EQUAL,
        },
        BinaryOp::Gt => match kind {
            Int => op::OP_S_GREATER_THAN,
            Uint => op::OP_U_GREATER_THAN,
            _ => op::OP_F_ORD_GREATER_THAN,
        },
        BinaryOp::GtEq => match kind {
            Int => op::OP_S_GREATER_THAN_EQUAL,
            Uint => op::OP_U_GREATER_THAN_EQUAL,
            _ => op::OP_F_ORD_GREATER_THAN_EQUAL,
        },
        BinaryOp::LogicalAnd => op::OP_LOGICAL_AND,
        BinaryOp::LogicalOr => op::OP_LOGICAL_OR,
        BinaryOp::BitAnd => op::OP_BITWISE_AND,
        BinaryOp::BitOr => op::OP_BITWISE_OR,
        BinaryOp::BitXor => op::OP_BITWISE_XOR,
        BinaryOp::Shl => op::OP_SHIFT_LEFT_LOGICAL,
        BinaryOp::Shr => if kind == Uint {
            op::OP_SHIFT_RIGHT_LOGICAL
        } else {
            op::OP_SHIFT_RIGHT_ARITHMETIC
        },
    }
}

/// Canonical bit pattern of "one" for a scalar kind.
fn one_bits(kind: ScalarKind) -> u64 {
    match kind {
        ScalarKind::Float => u64::from(1.0f32.to_bits()),
        ScalarKind::Double => 1.0f64.to_bits(),
        _ => 1,
    }
}
