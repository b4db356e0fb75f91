use crate::{check, SemanticError, TypeInfo};
use pretty_assertions::assert_eq;
use silica_diagnostic::ErrorCode;
use silica_ir::{Ast, DeclKind, ExprKind, Module, SharedInterner, StmtKind};
use silica_pp::{Defines, Preprocessor};
use silica_types::{ScalarKind, Type};

fn check_source(source: &str) -> Result<(Ast, Module, TypeInfo), SemanticError> {
    let interner = SharedInterner::new();
    let tokens = silica_lexer::lex(source, &interner).expect("lex failure");
    let stream = Preprocessor::new(tokens, &Defines::new(), interner.clone())
        .expect("preprocessor setup");
    let (ast, module) = silica_parse::Parser::new(stream).parse().expect("parse failure");
    let info = check(&ast, &module, &interner)?;
    Ok((ast, module, info))
}

fn check_ok(source: &str) -> (Ast, Module, TypeInfo) {
    check_source(source).expect("check failure")
}

fn check_err(source: &str) -> SemanticError {
    match check_source(source) {
        Ok(_) => panic!("expected a semantic error"),
        Err(e) => e,
    }
}

/// Initializer expression of the first local in the first function.
fn first_local_init(ast: &Ast, module: &Module) -> silica_ir::ExprId {
    for &decl in &module.decls {
        if let DeclKind::Function(func) = ast.decl(decl).kind {
            let StmtKind::Block { stmts } = ast.stmt(func.body).kind else {
                panic!("expected a block body");
            };
            for &stmt in ast.stmt_list(stmts) {
                if let StmtKind::Local { init: Some(init), .. } = ast.stmt(stmt).kind {
                    return init;
                }
            }
        }
    }
    panic!("no local with initializer");
}

#[test]
fn unsuffixed_int_literal_is_int() {
    let (ast, module, info) = check_ok("void main() { int x = 1; }");
    let init = first_local_init(&ast, &module);
    assert_eq!(info.expr_type(init), Type::INT);
    assert!(info.conversions.is_empty());
}

#[test]
fn int_literal_converts_to_float() {
    let (ast, module, info) = check_ok("void main() { float x = 1; }");
    let init = first_local_init(&ast, &module);
    assert_eq!(info.expr_type(init), Type::INT);
    assert_eq!(info.converted_type(init), Type::FLOAT);
}

#[test]
fn double_suffix_types_as_double() {
    let (ast, module, info) = check_ok("void main() { double x = 1.5lf; }");
    let init = first_local_init(&ast, &module);
    assert_eq!(info.expr_type(init), Type::DOUBLE);
}

#[test]
fn float_widens_to_double_but_not_backwards() {
    let (ast, module, info) = check_ok("void main() { double x = 1.0; }");
    let init = first_local_init(&ast, &module);
    assert_eq!(info.converted_type(init), Type::DOUBLE);

    let err = check_err("void main() { float x = 1.0lf; }");
    assert_eq!(err.code, ErrorCode::E3002);
    assert!(err.message.contains("`float`"));
    assert!(err.message.contains("`double`"));
}

#[test]
fn int_to_int_mismatch_names_both_types() {
    let err = check_err("void main() { int x = 1.5; }");
    assert_eq!(err.code, ErrorCode::E3002);
    assert!(err.message.contains("`int`"));
    assert!(err.message.contains("`float`"));
}

#[test]
fn binary_operands_unify_through_lattice() {
    let (ast, module, info) = check_ok("void main() { float x = 1 + 2.0; }");
    let init = first_local_init(&ast, &module);
    assert_eq!(info.expr_type(init), Type::FLOAT);
    // The `1` picked up an int→float marker.
    let ExprKind::Binary { lhs, .. } = ast.expr(init).kind else {
        panic!("expected binary init");
    };
    assert_eq!(info.converted_type(lhs), Type::FLOAT);
}

#[test]
fn comparison_yields_bool() {
    let (ast, module, info) = check_ok("void main() { bool b = 1 < 2u; }");
    let init = first_local_init(&ast, &module);
    assert_eq!(info.expr_type(init), Type::BOOL);
}

#[test]
fn unknown_identifier_is_reported() {
    let err = check_err("void main() { int x = missing; }");
    assert_eq!(err.code, ErrorCode::E3001);
    assert!(err.message.contains("missing"));
}

#[test]
fn condition_must_be_bool() {
    let err = check_err("void main() { if (1) { } }");
    assert_eq!(err.code, ErrorCode::E3002);
    assert!(err.message.contains("condition"));
}

#[test]
fn assignment_to_const_is_rejected() {
    let err = check_err("const float pi = 3.14;\nvoid main() { pi = 1.0; }");
    assert_eq!(err.code, ErrorCode::E3004);
}

#[test]
fn assignment_to_in_variable_is_rejected() {
    let err = check_err("layout(location = 0) in vec4 p;\nvoid main() { p = vec4(1.0); }");
    assert_eq!(err.code, ErrorCode::E3004);
}

#[test]
fn swizzle_types_resolve() {
    let (ast, module, info) =
        check_ok("void main() { vec4 v = vec4(1.0); vec2 half = v.xy; float x = v.x; }");
    let init = first_local_init(&ast, &module);
    assert_eq!(info.expr_type(init), Type::vector(ScalarKind::Float, 4));
}

#[test]
fn invalid_swizzle_is_reported() {
    let err = check_err("void main() { vec2 v = vec2(1.0); float x = v.z; }");
    assert_eq!(err.code, ErrorCode::E3005);
}

#[test]
fn mixed_swizzle_sets_are_rejected() {
    let err = check_err("void main() { vec4 v = vec4(1.0); vec2 m = v.xg; }");
    assert_eq!(err.code, ErrorCode::E3005);
}

#[test]
fn matrix_index_is_column_vector() {
    let (ast, module, info) =
        check_ok("void main() { mat3x4 m = mat3x4(1.0); vec4 c = m[0]; }");
    // The second local's initializer is the index expression.
    let mut inits = Vec::new();
    for &decl in &module.decls {
        if let DeclKind::Function(func) = ast.decl(decl).kind {
            let StmtKind::Block { stmts } = ast.stmt(func.body).kind else { continue };
            for &stmt in ast.stmt_list(stmts) {
                if let StmtKind::Local { init: Some(init), .. } = ast.stmt(stmt).kind {
                    inits.push(init);
                }
            }
        }
    }
    assert_eq!(info.expr_type(inits[1]), Type::vector(ScalarKind::Float, 4));
}

#[test]
fn overload_prefers_exact_match() {
    let (ast, module, info) = check_ok(
        "float f(float x) { return x; }\n\
         float f(double x) { return 1.0; }\n\
         void main() { float y = f(1.0); }",
    );
    let init = first_local_init(&ast, &module);
    let chosen = info.calls[&init];
    let DeclKind::Function(func) = ast.decl(chosen).kind else {
        panic!("expected function");
    };
    let params = ast.params(func.params);
    assert_eq!(params[0].ty, Type::FLOAT);
}

#[test]
fn overload_via_conversion_when_unique() {
    let (ast, module, info) = check_ok(
        "float f(double x) { return 1.0; }\n\
         void main() { float y = f(1.0); }",
    );
    let init = first_local_init(&ast, &module);
    assert!(info.calls.contains_key(&init));
    // The argument converts float→double.
    let ExprKind::Call { args, .. } = ast.expr(init).kind else {
        panic!("expected call");
    };
    let arg = ast.expr_list(args)[0];
    assert_eq!(info.converted_type(arg), Type::DOUBLE);
}

#[test]
fn ambiguous_overload_is_reported() {
    // int argument converts to both overloads with no ordering.
    let err = check_err(
        "float f(float x) { return x; }\n\
         float f(uint x) { return 1.0; }\n\
         void main() { float y = f(1); }",
    );
    assert_eq!(err.code, ErrorCode::E3003);
}

#[test]
fn no_matching_overload_is_reported() {
    let err = check_err(
        "float f(float x) { return x; }\n\
         void main() { float y = f(1.0lf); }",
    );
    assert_eq!(err.code, ErrorCode::E3007);
    assert!(err.message.contains("f(double)"));
}

#[test]
fn duplicate_function_signature_is_rejected() {
    let err = check_err(
        "float f(float x) { return x; }\n\
         float f(float y) { return y; }\n\
         void main() { }",
    );
    assert_eq!(err.code, ErrorCode::E3008);
}

#[test]
fn missing_main_is_reported() {
    let err = check_err("float helper(float x) { return x; }");
    assert_eq!(err.code, ErrorCode::E3009);
}

#[test]
fn return_type_must_convert() {
    let err = check_err("float f() { return 1.0lf; }\nvoid main() { }");
    assert_eq!(err.code, ErrorCode::E3002);

    // int return converts to float.
    check_ok("float f() { return 1; }\nvoid main() { }");
}

#[test]
fn void_function_cannot_return_value() {
    let err = check_err("void main() { return 1; }");
    assert_eq!(err.code, ErrorCode::E3002);
}

#[test]
fn constructor_component_counts() {
    check_ok("void main() { vec4 v = vec4(1.0, 2.0, 3.0, 4.0); }");
    check_ok("void main() { vec4 v = vec4(vec2(1.0), 2.0, 3.0); }");
    check_ok("void main() { vec3 v = vec3(1.0); }"); // splat

    let err = check_err("void main() { vec4 v = vec4(1.0, 2.0); }");
    assert_eq!(err.code, ErrorCode::E3006);
    assert!(err.message.contains("4 components"));
}

#[test]
fn scalar_constructor_is_explicit_cast() {
    // double→int narrows: never implicit, always fine as a constructor.
    check_ok("void main() { int x = int(1.5lf); }");
    let err = check_err("void main() { int x = 1.5lf; }");
    assert_eq!(err.code, ErrorCode::E3002);
}

#[test]
fn shadowing_in_inner_scope_is_allowed() {
    check_ok("void main() { int x = 1; { float x = 2.0; } }");
    let err = check_err("void main() { int x = 1; int x = 2; }");
    assert_eq!(err.code, ErrorCode::E3008);
}

#[test]
fn uniform_initializer_is_rejected() {
    let err = check_err("uniform float scale = 1.0;\nvoid main() { }");
    assert_eq!(err.code, ErrorCode::E3010);
}
