//! Whole-module emission tests driving the real front end.

use crate::{emit_module, op, words_to_bytes};
use pretty_assertions::assert_eq;
use silica_ir::SharedInterner;
use silica_pp::{Defines, Preprocessor};

fn compile(source: &str) -> Vec<u32> {
    let interner = SharedInterner::new();
    let tokens = silica_lexer::lex(source, &interner).expect("lex failure");
    let stream = Preprocessor::new(tokens, &Defines::new(), interner.clone())
        .expect("preprocessor setup");
    let (ast, module) = silica_parse::Parser::new(stream).parse().expect("parse failure");
    let info = silica_typeck::check(&ast, &module, &interner).expect("check failure");
    emit_module(&ast, &module, &info, &interner)
}

/// Decode `(opcode, operands)` pairs from the instruction stream after the
/// header.
fn instructions(words: &[u32]) -> Vec<(u16, Vec<u32>)> {
    let mut out = Vec::new();
    let mut rest = &words[5..];
    while let Some(&first) = rest.first() {
        let count = (first >> 16) as usize;
        assert!(count >= 1 && count <= rest.len(), "malformed instruction stream");
        out.push(((first & 0xFFFF) as u16, rest[1..count].to_vec()));
        rest = &rest[count..];
    }
    out
}

fn opcodes(words: &[u32]) -> Vec<u16> {
    instructions(words).into_iter().map(|(op, _)| op).collect()
}

#[test]
fn minimal_module_has_magic_and_id_bound() {
    let words = compile("void main() { float x = 1; }");
    assert_eq!(words[0], 0x0723_0203);
    assert_eq!(words[1], op::VERSION_1_0);
    assert_eq!(words[4], 0);

    // The id-bound is one past the highest id used. Every id the writer
    // allocates is some instruction's result, so scanning result ids finds
    // the maximum.
    let mut highest = 0;
    for (opcode, operands) in instructions(&words) {
        if let Some(position) = result_id_position(opcode) {
            highest = highest.max(operands[position]);
        }
    }
    assert!(highest > 0);
    assert_eq!(words[3], highest + 1);
}

/// Operand index of the result id for the opcodes these tests encounter.
fn result_id_position(opcode: u16) -> Option<usize> {
    match opcode {
        op::OP_TYPE_VOID
        | op::OP_TYPE_BOOL
        | op::OP_TYPE_INT
        | op::OP_TYPE_FLOAT
        | op::OP_TYPE_VECTOR
        | op::OP_TYPE_MATRIX
        | op::OP_TYPE_POINTER
        | op::OP_TYPE_FUNCTION
        | op::OP_LABEL => Some(0),
        op::OP_CONSTANT
        | op::OP_CONSTANT_TRUE
        | op::OP_CONSTANT_FALSE
        | op::OP_VARIABLE
        | op::OP_FUNCTION
        | op::OP_FUNCTION_PARAMETER
        | op::OP_FUNCTION_CALL
        | op::OP_LOAD
        | op::OP_ACCESS_CHAIN
        | op::OP_UNDEF
        | op::OP_PHI
        | op::OP_SELECT
        | op::OP_COMPOSITE_CONSTRUCT
        | op::OP_COMPOSITE_EXTRACT
        | op::OP_VECTOR_SHUFFLE
        | op::OP_VECTOR_EXTRACT_DYNAMIC
        | op::OP_CONVERT_S_TO_F
        | op::OP_CONVERT_U_TO_F
        | op::OP_CONVERT_F_TO_S
        | op::OP_CONVERT_F_TO_U
        | op::OP_F_CONVERT
        | op::OP_BITCAST => Some(1),
        o if (op::OP_S_NEGATE..=op::OP_S_MOD).contains(&o) => Some(1),
        o if (op::OP_LOGICAL_EQUAL..=op::OP_F_ORD_GREATER_THAN_EQUAL).contains(&o) => Some(1),
        o if (op::OP_SHIFT_RIGHT_LOGICAL..=op::OP_NOT).contains(&o) => Some(1),
        _ => None,
    }
}

#[test]
fn module_sections_appear_in_order() {
    let words = compile("void main() { float x = 1; }");
    let ops = opcodes(&words);

    let position = |needle: u16| {
        ops.iter()
            .position(|&o| o == needle)
            .unwrap_or_else(|| panic!("opcode {needle} missing"))
    };
    assert!(position(op::OP_CAPABILITY) < position(op::OP_MEMORY_MODEL));
    assert!(position(op::OP_MEMORY_MODEL) < position(op::OP_ENTRY_POINT));
    assert!(position(op::OP_ENTRY_POINT) < position(op::OP_EXECUTION_MODE));
    assert!(position(op::OP_EXECUTION_MODE) < position(op::OP_TYPE_VOID));
    assert!(position(op::OP_TYPE_VOID) < position(op::OP_FUNCTION));
    assert!(ops.contains(&op::OP_FUNCTION_END));
}

#[test]
fn entry_point_is_fragment_main() {
    let words = compile("void main() { }");
    let (_, operands) = instructions(&words)
        .into_iter()
        .find(|(o, _)| *o == op::OP_ENTRY_POINT)
        .expect("entry point emitted");
    assert_eq!(operands[0], op::EXECUTION_MODEL_FRAGMENT);
    // "main\0" follows the entry-point id.
    assert_eq!(operands[2], u32::from_le_bytes(*b"main"));
}

#[test]
fn io_variables_land_in_the_interface() {
    let words = compile(
        "layout(location = 0) in vec4 color;\n\
         layout(location = 0) out vec4 frag;\n\
         void main() { frag = color; }",
    );
    let all = instructions(&words);
    let (_, entry) = all
        .iter()
        .find(|(o, _)| *o == op::OP_ENTRY_POINT)
        .expect("entry point emitted");
    // Fragment, %main, "main\0" (2 words), then two interface ids.
    assert_eq!(entry.len(), 6);

    let decorations: Vec<&Vec<u32>> = all
        .iter()
        .filter(|(o, _)| *o == op::OP_DECORATE)
        .map(|(_, operands)| operands)
        .collect();
    assert_eq!(decorations.len(), 2);
    assert!(decorations.iter().all(|d| d[1] == op::DECORATION_LOCATION && d[2] == 0));
}

#[test]
fn uniform_gets_binding_and_set_decorations() {
    let words = compile(
        "layout(binding = 3, set = 1) uniform vec4 tint;\n\
         void main() { vec4 v = tint; }",
    );
    let all = instructions(&words);
    let decorations: Vec<&Vec<u32>> = all
        .iter()
        .filter(|(o, _)| *o == op::OP_DECORATE)
        .map(|(_, operands)| operands)
        .collect();
    assert!(decorations
        .iter()
        .any(|d| d[1] == op::DECORATION_BINDING && d[2] == 3));
    assert!(decorations
        .iter()
        .any(|d| d[1] == op::DECORATION_DESCRIPTOR_SET && d[2] == 1));
}

#[test]
fn double_types_require_float64_capability() {
    let words = compile("void main() { double x = 1.0lf; }");
    let capabilities: Vec<u32> = instructions(&words)
        .into_iter()
        .filter(|(o, _)| *o == op::OP_CAPABILITY)
        .map(|(_, operands)| operands[0])
        .collect();
    assert_eq!(capabilities, vec![op::CAPABILITY_SHADER, op::CAPABILITY_FLOAT64]);

    let words = compile("void main() { float x = 1.0; }");
    let capabilities: Vec<u32> = instructions(&words)
        .into_iter()
        .filter(|(o, _)| *o == op::OP_CAPABILITY)
        .map(|(_, operands)| operands[0])
        .collect();
    assert_eq!(capabilities, vec![op::CAPABILITY_SHADER]);
}

#[test]
fn if_emits_structured_selection() {
    let words = compile(
        "void main() { float x = 0.0; if (x < 1.0) { x = 2.0; } else { x = 3.0; } }",
    );
    let ops = opcodes(&words);
    assert!(ops.contains(&op::OP_SELECTION_MERGE));
    assert!(ops.contains(&op::OP_BRANCH_CONDITIONAL));
    assert!(ops.contains(&op::OP_F_ORD_LESS_THAN));
}

#[test]
fn while_emits_structured_loop() {
    let words = compile("void main() { int i = 0; while (i < 4) { i = i + 1; } }");
    let ops = opcodes(&words);
    assert!(ops.contains(&op::OP_LOOP_MERGE));
    assert!(ops.contains(&op::OP_S_LESS_THAN));
    assert!(ops.contains(&op::OP_I_ADD));
}

#[test]
fn for_loop_emits_structured_loop() {
    let words = compile("void main() { for (int i = 0; i < 4; i = i + 1) { } }");
    let ops = opcodes(&words);
    assert!(ops.contains(&op::OP_LOOP_MERGE));
    assert!(ops.contains(&op::OP_BRANCH_CONDITIONAL));
}

#[test]
fn every_block_has_exactly_one_terminator() {
    let words = compile(
        "void main() {\n\
           int i = 0;\n\
           while (i < 4) { if (i == 2) { i = i + 3; } i = i + 1; }\n\
           if (i > 5) { return; }\n\
         }",
    );
    // Between each OpLabel and the next, exactly one terminator must
    // appear, as the last instruction of the block.
    let terminators = [op::OP_BRANCH, op::OP_BRANCH_CONDITIONAL, op::OP_RETURN, op::OP_RETURN_VALUE];
    let all = instructions(&words);
    let mut in_block = false;
    let mut terminated = false;
    for (opcode, _) in all {
        if opcode == op::OP_LABEL {
            assert!(!in_block || terminated, "previous block missing a terminator");
            in_block = true;
            terminated = false;
        } else if terminators.contains(&opcode) {
            assert!(in_block && !terminated, "terminator outside an open block");
            terminated = true;
        } else if opcode == op::OP_FUNCTION_END {
            assert!(terminated, "function ended with an open block");
            in_block = false;
        } else if in_block && terminated {
            panic!("instruction {opcode} after a terminator");
        }
    }
}

#[test]
fn arithmetic_picks_opcode_per_scalar_kind() {
    let words = compile(
        "void main() {\n\
           int a = 1 / 2;\n\
           uint b = 1u / 2u;\n\
           float c = 1.0 / 2.0;\n\
         }",
    );
    let ops = opcodes(&words);
    assert!(ops.contains(&op::OP_S_DIV));
    assert!(ops.contains(&op::OP_U_DIV));
    assert!(ops.contains(&op::OP_F_DIV));
}

#[test]
fn implicit_conversions_become_convert_ops() {
    let words = compile("void main() { float x = 1 + 2.0; double y = x; }");
    let ops = opcodes(&words);
    assert!(ops.contains(&op::OP_CONVERT_S_TO_F));
    assert!(ops.contains(&op::OP_F_CONVERT));
}

#[test]
fn swizzles_emit_shuffles_and_extracts() {
    let words = compile(
        "void main() { vec4 v = vec4(1.0, 2.0, 3.0, 4.0); vec2 a = v.xy; float b = v.w; }",
    );
    let ops = opcodes(&words);
    assert!(ops.contains(&op::OP_VECTOR_SHUFFLE));
    assert!(ops.contains(&op::OP_COMPOSITE_EXTRACT));
    assert!(ops.contains(&op::OP_COMPOSITE_CONSTRUCT));
}

#[test]
fn user_function_calls_are_emitted() {
    let words = compile(
        "float square(float x) { return x * x; }\n\
         void main() { float y = square(3.0); }",
    );
    let ops = opcodes(&words);
    assert!(ops.contains(&op::OP_FUNCTION_CALL));
    assert_eq!(ops.iter().filter(|&&o| o == op::OP_FUNCTION).count(), 2);
    assert!(ops.contains(&op::OP_FUNCTION_PARAMETER));
}

#[test]
fn const_globals_fold_to_constants() {
    let words = compile("const float pi = 3.0;\nvoid main() { float x = pi; }");
    let all = instructions(&words);
    // No Private OpVariable for the constant; only the local x.
    let module_variables = all
        .iter()
        .filter(|(o, operands)| *o == op::OP_VARIABLE && operands[2] == op::STORAGE_PRIVATE)
        .count();
    assert_eq!(module_variables, 0);
    assert!(all
        .iter()
        .any(|(o, operands)| *o == op::OP_CONSTANT && operands[2] == 3.0f32.to_bits()));
}

#[test]
fn words_to_bytes_is_little_endian() {
    assert_eq!(
        words_to_bytes(&[0x0723_0203, 1]),
        vec![0x03, 0x02, 0x23, 0x07, 0x01, 0x00, 0x00, 0x00]
    );
}

#[test]
fn ternary_emits_phi() {
    let words = compile("void main() { float x = true ? 1.0 : 2.0; }");
    let ops = opcodes(&words);
    assert!(ops.contains(&op::OP_PHI));
    assert!(ops.contains(&op::OP_SELECTION_MERGE));
}
