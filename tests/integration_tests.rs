//! Integration tests for end-to-end compilation.
//!
//! These tests run the complete pipeline from source code through
//! tokenization, parsing with inline type checking, LLVM IR generation
//! and JIT execution of the entry function.

use exprlang::{
    compile_source,
    compiler::{
        compiler::CompilerOptions,
        jit::{run_entry, Value},
    },
    errors::errors::{Error, ErrorKind},
    format_error,
};
use indoc::indoc;
use inkwell::context::Context;
use pretty_assertions::assert_eq;

fn run(source: &str) -> Value {
    let context = Context::create();
    let compiled = compile_source(
        source,
        Some("test.lang".to_string()),
        &context,
        CompilerOptions::default(),
    )
    .unwrap_or_else(|error| panic!("{}", format_error(&error, source)));

    run_entry(&compiled).unwrap()
}

fn error(source: &str) -> Error {
    let context = Context::create();
    let result = compile_source(source, Some("test.lang".to_string()), &context, CompilerOptions::default());
    let error = match result {
        Ok(_) => panic!("expected {:?} to fail", source),
        Err(error) => error,
    };
    error
}

#[test]
fn test_arithmetic() {
    assert_eq!(run("1+2*3;"), Value::Integer(7));
    assert_eq!(run("10-3-2;"), Value::Integer(5));
    assert_eq!(run("(1 + 2) * 3;"), Value::Integer(9));
    assert_eq!(run("-2+3;"), Value::Integer(-5));
    assert_eq!(run("-2-3;"), Value::Integer(1));
    assert_eq!(run("(-2)+3;"), Value::Integer(1));
}

#[test]
fn test_mixed_arithmetic_widens_to_float() {
    assert_eq!(run("1 + 2.0;"), Value::Float(3.0));
    assert_eq!(run("7 / 2.0;"), Value::Float(3.5));
    assert_eq!(run("x = 1.5; -x;"), Value::Float(-1.5));
}

#[test]
fn test_signed_division_and_modulo() {
    assert_eq!(run("x = -7; x / 2;"), Value::Integer(-3));
    assert_eq!(run("x = -7; x % 2;"), Value::Integer(-1));
    assert_eq!(run("x = 7.5; x % 2;"), Value::Float(1.5));
}

#[test]
fn test_comparisons() {
    assert_eq!(run("1 < 2;"), Value::Boolean(true));
    assert_eq!(run("x = 2.5; x >= 3;"), Value::Boolean(false));
    assert_eq!(run("x = 1; x == 1.0;"), Value::Boolean(true));
    assert_eq!(run("x = 4; x <= 4 == true;"), Value::Boolean(true));
}

#[test]
fn test_function_call() {
    assert_eq!(run("f = (x: Integer) { x + 1; }; f(4);"), Value::Integer(5));
    assert_eq!(run("k = { 7; }; k();"), Value::Integer(7));
}

#[test]
fn test_arguments_convert_to_parameter_types() {
    let source = indoc! {"
        scale = (value: Float, factor: Integer) {
            doubled = value * factor;
            doubled + 1;
        };
        scale(2, 3);
    "};

    assert_eq!(run(source), Value::Float(7.0));
}

#[test]
fn test_functions_call_functions() {
    let source = indoc! {"
        add = (a: Integer, b: Integer) { a + b; };
        twice = (n: Integer) { add(n, n); };
        twice(21);
    "};

    assert_eq!(run(source), Value::Integer(42));
}

#[test]
fn test_function_alias() {
    assert_eq!(run("f = (x: Integer) { x * 3; }; g = f; g(5);"), Value::Integer(15));
}

#[test]
fn test_if_else() {
    assert_eq!(run("if 1 < 2 { 1; } else { 2; };"), Value::Integer(1));
    assert_eq!(run("x = 0; if x { 1; } else { 2; };"), Value::Integer(2));
    assert_eq!(run("x = 3; if x > 5 { 1; } else { 2.5; };"), Value::Float(2.5));
}

#[test]
fn test_if_without_else_yields_zero() {
    assert_eq!(run("x = 0; if x { 5; };"), Value::Integer(0));
    assert_eq!(run("x = 1; if x { 5; };"), Value::Integer(5));
    assert_eq!(run("x = false; if x { true; };"), Value::Boolean(false));
}

#[test]
fn test_else_if_chain() {
    let source = indoc! {"
        classify = (x: Integer) {
            if x < 3 { 1; } else if x < 10 { 2; } else { 3; };
        };
        classify(1) * 100 + classify(5) * 10 + classify(50);
    "};

    assert_eq!(run(source), Value::Integer(123));
}

#[test]
fn test_if_inside_function() {
    let source = indoc! {"
        abs = (n: Integer) {
            if n < 0 { -n; } else { n; };
        };
        abs(-5) + abs(2);
    "};

    assert_eq!(run(source), Value::Integer(7));
}

#[test]
fn test_assignment() {
    assert_eq!(run("x = 1; (x) = 41; x + 1;"), Value::Integer(42));
    assert_eq!(run("x = 1; (x) = 2.9; x;"), Value::Integer(2));
    assert_eq!(run("x = 1.0; (x) = 2;"), Value::Float(2.0));
}

#[test]
fn test_globals_inside_functions() {
    assert_eq!(run("x = 10; f = (y: Integer) { x + y; }; f(5);"), Value::Integer(15));

    let source = indoc! {"
        counter = 0;
        bump = () { (counter) = counter + 1; };
        bump();
        bump();
        counter;
    "};
    assert_eq!(run(source), Value::Integer(2));
}

#[test]
fn test_shadowing() {
    let source = indoc! {"
        x = 1;
        f = () { x = 2.5; x * 2; };
        f() + x;
    "};

    assert_eq!(run(source), Value::Float(6.0));
}

#[test]
fn test_comments_and_whitespace() {
    let source = indoc! {"
        # the answer
        answer = 40;   # almost
        answer + 2     # no trailing semicolon
    "};

    assert_eq!(run(source), Value::Integer(42));
}

#[test]
fn test_errors_are_classified() {
    assert_eq!(error("x = $;").get_kind(), ErrorKind::Lex);
    assert_eq!(error("1 2;").get_kind(), ErrorKind::Parse);
    assert_eq!(error("y;").get_kind(), ErrorKind::Symbol);
    assert_eq!(error("x = 1; x = 2;").get_kind(), ErrorKind::Symbol);
    assert_eq!(error("x: Float = true;").get_kind(), ErrorKind::Type);
    assert_eq!(error("").get_kind(), ErrorKind::Codegen);
}

#[test]
fn test_call_errors_happen_before_codegen() {
    let source = "f = (x: Integer) { x + 1; };";

    let missing = error(&format!("{} f();", source));
    assert_eq!(missing.get_error_name(), "ArgumentCountMismatch");
    assert_eq!(missing.get_kind(), ErrorKind::Type);

    let extra = error(&format!("{} f(1, 2);", source));
    assert_eq!(extra.get_error_name(), "ArgumentCountMismatch");
}

#[test]
fn test_scopes_end_with_their_block() {
    assert_eq!(error("f = () { y = 1; y; }; y;").get_error_name(), "VariableNotDeclared");
    assert_eq!(error("if true { z = 1; }; z;").get_error_name(), "VariableNotDeclared");
}

#[test]
fn test_nested_functions_read_globals_not_enclosing_locals() {
    let source = indoc! {"
        base = 10;
        f = (a: Integer) {
            g = (b: Integer) { b + base; };
            g(a) * 2;
        };
        f(1);
    "};
    assert_eq!(run(source), Value::Integer(22));

    let captured = error("f = (a: Integer) { g = (b: Integer) { a + b; }; g(1); }; f(2);");
    assert_eq!(captured.get_error_name(), "CapturedLocal");
    assert_eq!(captured.get_kind(), ErrorKind::Symbol);
}

#[test]
fn test_format_error() {
    let source = "x = 1;\ny = $;\n";
    let rendered = format_error(&error(source), source);

    assert_eq!(
        rendered,
        "LexError: UnrecognisedToken\n-> test.lang\n  |\n2 | y = $;\n  | ----^\n"
    );
}
