//! Module assembly: globals, decorations, entry point, function dispatch.

use crate::function::FunctionEmitter;
use crate::instruction::{string_words, Instruction};
use crate::op;
use crate::writer::{Section, Writer};
use rustc_hash::FxHashMap;
use silica_ir::{Ast, DeclId, DeclKind, ExprId, ExprKind, Module, StorageQualifier, StringInterner, UnaryOp};
use silica_typeck::TypeInfo;
use silica_types::{ScalarKind, Type};
use tracing::debug;

/// How a global declaration is reachable from function bodies.
#[derive(Copy, Clone, Debug)]
pub(crate) enum GlobalSlot {
    /// An `OpVariable` in module scope.
    Variable { id: u32, ty: Type, storage_class: u32 },
    /// A `const` global folded to a constant id.
    Constant { id: u32 },
}

/// Emit a checked module as a SPIR-V word stream.
pub fn emit_module(
    ast: &Ast,
    module: &Module,
    info: &TypeInfo,
    interner: &StringInterner,
) -> Vec<u32> {
    let mut writer = Writer::new();
    let mut globals: FxHashMap<DeclId, GlobalSlot> = FxHashMap::default();
    let mut interface: Vec<u32> = Vec::new();

    // Globals: constants fold, variables declare with their decorations.
    for &decl_id in &module.decls {
        let decl = ast.decl(decl_id);
        let DeclKind::Global(global) = decl.kind else {
            continue;
        };

        if global.storage == StorageQualifier::Const {
            let init = global
                .init
                .unwrap_or_else(|| panic!("const global without initializer survived checking"));
            let bits = const_scalar_bits(ast, init, global.ty.scalar_kind());
            let id = writer.constant_id(global.ty, bits);
            globals.insert(decl_id, GlobalSlot::Constant { id });
            continue;
        }

        let storage_class = storage_class(global.storage);
        let pointer = writer.pointer_id(storage_class, global.ty);
        let id = writer.next_id();
        let mut operands = vec![pointer, id, storage_class];
        if let Some(init) = global.init {
            let bits = const_scalar_bits(ast, init, global.ty.scalar_kind());
            operands.push(writer.constant_id(global.ty, bits));
        }
        writer.add(Section::Declaration, Instruction::new(op::OP_VARIABLE, operands));

        let mut name_operands = vec![id];
        name_operands.extend(string_words(interner.lookup(global.name)));
        writer.add(Section::Debug, Instruction::new(op::OP_NAME, name_operands));

        if let Some(location) = global.layout.location {
            writer.add(
                Section::Annotation,
                Instruction::new(op::OP_DECORATE, [id, op::DECORATION_LOCATION, location]),
            );
        }
        if let Some(binding) = global.layout.binding {
            writer.add(
                Section::Annotation,
                Instruction::new(op::OP_DECORATE, [id, op::DECORATION_BINDING, binding]),
            );
        }
        if let Some(set) = global.layout.set {
            writer.add(
                Section::Annotation,
                Instruction::new(op::OP_DECORATE, [id, op::DECORATION_DESCRIPTOR_SET, set]),
            );
        }

        if storage_class == op::STORAGE_INPUT || storage_class == op::STORAGE_OUTPUT {
            interface.push(id);
        }
        globals.insert(decl_id, GlobalSlot::Variable { id, ty: global.ty, storage_class });
    }

    // Functions get their ids up front so calls can reference any of them.
    let main_name = interner.intern("main");
    let mut fn_ids: FxHashMap<DeclId, u32> = FxHashMap::default();
    let mut main_id = None;
    for &decl_id in &module.decls {
        let DeclKind::Function(func) = ast.decl(decl_id).kind else {
            continue;
        };
        let id = writer.next_id();
        fn_ids.insert(decl_id, id);

        let mut name_operands = vec![id];
        name_operands.extend(string_words(interner.lookup(func.name)));
        writer.add(Section::Debug, Instruction::new(op::OP_NAME, name_operands));

        if func.name == main_name
            && func.return_type == Type::VOID
            && ast.params(func.params).is_empty()
        {
            main_id = Some(id);
        }
    }

    for &decl_id in &module.decls {
        let DeclKind::Function(func) = ast.decl(decl_id).kind else {
            continue;
        };
        debug!(name = interner.lookup(func.name), "emitting function body");
        FunctionEmitter::new(&mut writer, ast, info, &globals, &fn_ids).emit(decl_id, &func);
    }

    // Entry point and execution mode for main.
    let main_id =
        main_id.unwrap_or_else(|| panic!("missing `void main()` survived checking"));
    let mut entry = vec![op::EXECUTION_MODEL_FRAGMENT, main_id];
    entry.extend(string_words("main"));
    entry.extend(&interface);
    writer.add(Section::EntryPoint, Instruction::new(op::OP_ENTRY_POINT, entry));
    writer.add(
        Section::ExecutionMode,
        Instruction::new(
            op::OP_EXECUTION_MODE,
            [main_id, op::EXECUTION_MODE_ORIGIN_UPPER_LEFT],
        ),
    );

    writer.add(
        Section::Capability,
        Instruction::new(op::OP_CAPABILITY, [op::CAPABILITY_SHADER]),
    );
    if writer.uses_float64() {
        writer.add(
            Section::Capability,
            Instruction::new(op::OP_CAPABILITY, [op::CAPABILITY_FLOAT64]),
        );
    }
    writer.add(
        Section::MemoryModel,
        Instruction::new(
            op::OP_MEMORY_MODEL,
            [op::ADDRESSING_LOGICAL, op::MEMORY_MODEL_GLSL450],
        ),
    );

    debug!(id_bound = writer.id_bound(), "serializing module");
    writer.serialize()
}

fn storage_class(storage: StorageQualifier) -> u32 {
    match storage {
        StorageQualifier::In => op::STORAGE_INPUT,
        StorageQualifier::Out => op::STORAGE_OUTPUT,
        StorageQualifier::Uniform => op::STORAGE_UNIFORM,
        StorageQualifier::None => op::STORAGE_PRIVATE,
        StorageQualifier::Const => {
            unreachable!("const globals fold to constants")
        }
    }
}

/// Fold a constant scalar initializer (a literal, possibly negated) to the
/// canonical bit encoding for `kind`.
pub(crate) fn const_scalar_bits(ast: &Ast, id: ExprId, kind: ScalarKind) -> u64 {
    enum Value {
        Int(i64),
        Uint(u64),
        Real(f64),
        Bool(bool),
    }

    fn value_of(ast: &Ast, id: ExprId) -> Value {
        match ast.expr(id).kind {
            ExprKind::Int(v) => Value::Int(v as i64),
            ExprKind::Uint(v) => Value::Uint(v),
            ExprKind::Float(bits) | ExprKind::Double(bits) => Value::Real(f64::from_bits(bits)),
            ExprKind::Bool(b) => Value::Bool(b),
            ExprKind::Unary { op: UnaryOp::Neg, operand } => match value_of(ast, operand) {
                Value::Int(v) => Value::Int(-v),
                Value::Uint(v) => Value::Int(-(v as i64)),
                Value::Real(v) => Value::Real(-v),
                Value::Bool(_) => panic!("negated bool constant survived checking"),
            },
            _ => panic!("non-constant initializer survived checking"),
        }
    }

    let value = value_of(ast, id);
    let as_real = |value: &Value| match value {
        Value::Int(v) => *v as f64,
        Value::Uint(v) => *v as f64,
        Value::Real(v) => *v,
        Value::Bool(_) => panic!("bool constant used as numeric"),
    };

    match kind {
        ScalarKind::Float => u64::from((as_real(&value) as f32).to_bits()),
        ScalarKind::Double => as_real(&value).to_bits(),
        ScalarKind::Int => {
            let v = match value {
                Value::Int(v) => v,
                Value::Uint(v) => v as i64,
                Value::Real(v) => v as i64,
                Value::Bool(_) => panic!("bool constant used as numeric"),
            };
            u64::from(v as i32 as u32)
        }
        ScalarKind::Uint => {
            let v = match value {
                Value::Int(v) => v as u64,
                Value::Uint(v) => v,
                Value::Real(v) => v as u64,
                Value::Bool(_) => panic!("bool constant used as numeric"),
            };
            v as u32 as u64
        }
        ScalarKind::Bool => match value {
            Value::Bool(b) => u64::from(b),
            _ => panic!("numeric constant used as bool"),
        },
        ScalarKind::Void => panic!("void constant"),
    }
}
