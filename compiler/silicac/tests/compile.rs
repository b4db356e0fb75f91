//! End-to-end compiles through the public `Program` facade.

use pretty_assertions::assert_eq;
use silicac::{CompileError, Defines, Program};

const SPIRV_MAGIC: u32 = 0x0723_0203;

#[test]
fn minimal_shader_compiles_and_prints() {
    let program = Program::parse("void main(){float x = 1;}", &Defines::new())
        .expect("compile failure");

    let words = program.to_spirv();
    assert_eq!(words[0], SPIRV_MAGIC);

    // Id-bound is one past the highest id; ids start at 1, so the bound is
    // positive and the module is non-trivial.
    assert!(words[3] > 1);
    assert_eq!(words[4], 0);

    let bytes = program.spirv_bytes();
    assert_eq!(bytes.len(), words.len() * 4);
    assert_eq!(&bytes[0..4], &[0x03, 0x02, 0x23, 0x07]);

    let printed = program.print();
    assert!(printed.contains("void main(void)"));
    assert!(printed.contains("float x = 1;"));
}

#[test]
fn to_spirv_is_cached() {
    let program =
        Program::parse("void main(){}", &Defines::new()).expect("compile failure");
    let first = program.to_spirv().as_ptr();
    let second = program.to_spirv().as_ptr();
    assert_eq!(first, second);
}

#[test]
fn undef_after_define_leaves_plain_identifier() {
    // With A expanded the shader is valid; after #undef the bare `A` is an
    // unknown identifier.
    let source = "#define A 1\n#undef A\nvoid main(){int x = A;}";
    let err = Program::parse(source, &Defines::new()).expect_err("should fail");
    match err {
        CompileError::Semantic(e) => assert!(e.message.contains("unknown identifier `A`")),
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

#[test]
fn external_defines_last_write_wins() {
    let mut defines = Defines::new();
    defines.define("FOO", Some("2".to_owned()));
    defines.define("FOO", Some("3".to_owned()));

    let program = Program::parse("void main(){int x = FOO;}", &defines)
        .expect("compile failure");
    assert!(program.print().contains("int x = 3;"));
}

#[test]
fn missing_initializer_yields_parse_error_and_no_output() {
    let source = "int x = ;";
    let err = Program::parse(source, &Defines::new()).expect_err("should fail");
    let CompileError::Parse(parse) = err else {
        panic!("expected a parse error");
    };
    // Located at the `;`.
    assert_eq!(parse.span().start, 8);
}

#[test]
fn batch_units_fail_independently() {
    // The CLI loop in miniature: one bad unit does not stop the rest.
    let units = [
        "void main(){float x = 1.0;}",
        "int x = ;",
        "void main(){int y = 2;}",
    ];
    let defines = Defines::new();
    let results: Vec<bool> = units
        .iter()
        .map(|source| Program::parse(source, &defines).is_ok())
        .collect();
    assert_eq!(results, vec![true, false, true]);
}

#[test]
fn pretty_print_round_trips_through_the_parser() {
    let source = "layout(location = 0) in vec4 color;\n\
                  layout(location = 0) out vec4 frag;\n\
                  uniform float scale;\n\
                  float brighten(float value)\n\
                  {\n\
                    return value * scale;\n\
                  }\n\
                  void main()\n\
                  {\n\
                    if (scale > 1.0)\n\
                      frag = color * brighten(2.0);\n\
                    else\n\
                    {\n\
                      for (int i = 0; i < 4; i = i + 1)\n\
                        frag = frag + color.wzyx;\n\
                    }\n\
                  }\n";
    let program = Program::parse(source, &Defines::new()).expect("compile failure");
    let printed = program.print();

    // Printing is stable: re-parsing the printed form prints identically.
    let reparsed = Program::parse(&printed, &Defines::new()).expect("reparse failure");
    assert_eq!(reparsed.print(), printed);

    // And the shapes survived.
    assert!(printed.contains("layout(location = 0) in vec4 color;"));
    assert!(printed.contains("float brighten(float value)"));
    assert!(printed.contains("color.wzyx"));
}

#[test]
fn preprocessor_error_keeps_its_phase() {
    let err = Program::parse("#error custom failure\nvoid main(){}", &Defines::new())
        .expect_err("should fail");
    match err {
        CompileError::Preprocess(e) => assert!(e.message.contains("custom failure")),
        other => panic!("expected a preprocessor error, got {other:?}"),
    }
}

#[test]
fn conditional_compilation_selects_code() {
    let source = "#ifdef FAST\nvoid main(){float x = 1.0;}\n#else\nvoid main(){double x = 1.0lf;}\n#endif\n";

    let plain = Program::parse(source, &Defines::new()).expect("compile failure");
    // The else branch declares a double, so the module leads with both
    // OpCapability Shader and OpCapability Float64.
    let words = plain.to_spirv();
    let op_capability = (2 << 16) | 17;
    assert_eq!(words[5], op_capability);
    assert_eq!(words[6], 1); // Shader
    assert_eq!(words[7], op_capability);
    assert_eq!(words[8], 10); // Float64

    let mut defines = Defines::new();
    defines.define("FAST", None);
    let fast = Program::parse(source, &defines).expect("compile failure");
    assert!(fast.print().contains("float x"));
}
