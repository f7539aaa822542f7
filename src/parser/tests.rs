//! Unit tests for the parser module.
//!
//! This module contains tests for parsing language constructs including:
//! - Operator precedence and associativity
//! - Declarations and assignment
//! - Function literals and calls
//! - `if`/`else` expressions
//! - Scoping and error cases

use std::rc::Rc;

use indoc::indoc;
use pretty_assertions::assert_eq;

use super::parser::{parse, parse_program};
use crate::{
    ast::{
        ast::{Expr, ExprList},
        printer::print_expr_list,
    },
    errors::errors::{Error, ErrorKind},
    lexer::{
        lexer::{tokenize, Lexer},
        tokens::TokenKind,
    },
    type_checker::{
        symbols::{create_root, lookup},
        types::Type,
    },
};

fn parse_source(source: &str) -> Result<ExprList, Error> {
    let tokens = tokenize(source.to_string(), Some("test.lang".to_string()))?;
    parse_program(tokens, Rc::new("test.lang".to_string()))
}

fn render(source: &str) -> String {
    print_expr_list(&parse_source(source).unwrap())
}

fn error_name(source: &str) -> String {
    parse_source(source).unwrap_err().get_error_name().to_string()
}

fn error_kind(source: &str) -> ErrorKind {
    parse_source(source).unwrap_err().get_kind()
}

#[test]
fn test_precedence() {
    assert_eq!(render("1+2*3;"), "(+ 1 (* 2 3))");
    assert_eq!(render("1*2+3;"), "(+ (* 1 2) 3)");
    assert_eq!(render("1 + 2 < 3 * 4;"), "(< (+ 1 2) (* 3 4))");
}

#[test]
fn test_left_associativity() {
    assert_eq!(render("10-3-2;"), "(- (- 10 3) 2)");
    assert_eq!(render("8/4/2;"), "(/ (/ 8 4) 2)");
    assert_eq!(render("1 < 2 == true;"), "(== (< 1 2) true)");
}

#[test]
fn test_grouping() {
    assert_eq!(render("(1 + 2) * 3;"), "(* (+ 1 2) 3)");
}

#[test]
fn test_unary_negate() {
    assert_eq!(render("-2*3;"), "(- (* 2 3))");
    assert_eq!(render("-2+3;"), "(- (+ 2 3))");
    assert_eq!(render("-2-3;"), "(- (- 2 3))");
    assert_eq!(render("-2 < 3;"), "(< (- 2) 3)");
    assert_eq!(render("--1.5;"), "(- (- 1.5))");
}

#[test]
fn test_result_types() {
    let program = parse_source("1 + 2.0;").unwrap();
    assert_eq!(program.ty, Some(Type::Float));

    let program = parse_source("3 % 2 == 1;").unwrap();
    assert_eq!(program.ty, Some(Type::Boolean));
}

#[test]
fn test_last_expression_may_omit_semicolon() {
    assert_eq!(render("1 + 2"), "(+ 1 2)");
    assert_eq!(render("x = 1; x"), "(decl x:Integer 1)\nx");
}

#[test]
fn test_empty_program() {
    let program = parse_source("  # nothing here\n").unwrap();
    assert!(program.is_empty());
    assert_eq!(program.ty, None);
}

#[test]
fn test_declarations() {
    assert_eq!(
        render("x = 1 + 2; y: Float = 0.5; x * 2;"),
        "(decl x:Integer (+ 1 2))\n(decl y:Float 0.5)\n(* x 2)"
    );
}

#[test]
fn test_declaration_annotation_mismatch() {
    assert_eq!(error_name("x: Float = 1;"), "TypeMatchError");
    assert_eq!(error_kind("x: Boolean = 1.0;"), ErrorKind::Type);
}

#[test]
fn test_unknown_type_annotation() {
    assert_eq!(error_name("x: Number = 1;"), "UnknownType");
    assert_eq!(error_name("(x: String) { 1; };"), "UnknownType");
}

#[test]
fn test_assignment_through_grouping() {
    assert_eq!(render("x = 1; (x) = 2.5;"), "(decl x:Integer 1)\n(= x 2.5)");

    let program = parse_source("x = 1.0; (x) = 2;").unwrap();
    assert_eq!(program.ty, Some(Type::Float));
}

#[test]
fn test_invalid_assignment_target() {
    assert_eq!(error_name("1 = 2;"), "InvalidAssignmentTarget");
    assert_eq!(
        error_name("f = (a: Integer) { (a) = 2; };"),
        "InvalidAssignmentTarget"
    );
}

#[test]
fn test_redeclaration_in_same_scope() {
    assert_eq!(error_name("x = 1; x = 2;"), "VariableAlreadyDeclared");
    assert_eq!(error_kind("x = 1; x = 2;"), ErrorKind::Symbol);
}

#[test]
fn test_shadowing_in_nested_scope() {
    let program = parse_source("x = 1; { x = 2.5; x; };").unwrap();

    match &program.items[1] {
        Expr::Block(block) => {
            assert_eq!(block.body.ty, Some(Type::Float));
            assert_eq!(lookup(&block.scope, "x").unwrap().ty, Type::Float);
        }
        other => panic!("expected a function literal, got {:?}", other),
    }
    assert_eq!(lookup(&program.scope, "x").unwrap().ty, Type::Integer);
}

#[test]
fn test_declarations_do_not_leak_out_of_blocks() {
    assert_eq!(error_name("if true { y = 1; }; y;"), "VariableNotDeclared");
    assert_eq!(error_name("if true { 1; } else { z = 2; }; z;"), "VariableNotDeclared");
    assert_eq!(error_name("f = (x: Integer) { x; }; x;"), "VariableNotDeclared");
    assert_eq!(error_kind("{ inner = 1; inner; }; inner;"), ErrorKind::Symbol);
}

#[test]
fn test_no_self_reference_in_declaration() {
    assert_eq!(error_name("x = x;"), "VariableNotDeclared");
    assert_eq!(error_name("f = (n: Integer) { f(n); };"), "VariableNotDeclared");
}

#[test]
fn test_function_literal_forms() {
    assert_eq!(
        render("f = (x: Integer) { x + 1; }; f(4);"),
        "(decl f:Function (fn (x:Integer) {(+ x 1)}))\n(call f 4)"
    );
    assert_eq!(
        render("g = { (a: Float, b: Float) a * b; };"),
        "(decl g:Function (fn (a:Float b:Float) {(* a b)}))"
    );
    assert_eq!(render("k = { 7; };"), "(decl k:Function (fn () {7}))");
    assert_eq!(render("k = () { 7; };"), "(decl k:Function (fn () {7}))");
}

#[test]
fn test_multiline_program() {
    let source = indoc! {"
        # scale a value
        scale = (value: Float, factor: Integer) {
            doubled = value * factor;
            doubled + 1;
        };
        scale(2, 3);
    "};

    assert_eq!(
        render(source),
        "(decl scale:Function (fn (value:Float factor:Integer) {(decl doubled:Float (* value factor)) (+ doubled 1)}))\n(call scale 2 3)"
    );
    assert_eq!(parse_source(source).unwrap().ty, Some(Type::Float));
}

#[test]
fn test_call_arity_mismatch() {
    let source = "f = (x: Integer) { x + 1; };";

    assert_eq!(error_name(&format!("{} f();", source)), "ArgumentCountMismatch");
    assert_eq!(error_kind(&format!("{} f(1, 2);", source)), ErrorKind::Type);
}

#[test]
fn test_call_argument_types() {
    assert_eq!(
        error_name("f = (x: Integer) { x; }; g = { 1; }; f(g);"),
        "ArgumentTypeMatchError"
    );
}

#[test]
fn test_calling_a_non_function() {
    assert_eq!(error_name("x = 1; x(2);"), "NotAFunction");
}

#[test]
fn test_function_values_do_not_mix_with_operators() {
    assert_eq!(error_name("f = { 1; }; f + 1;"), "IncompatibleOperands");
    assert_eq!(error_kind("(x: Function) { 1; };"), ErrorKind::Type);
    assert_eq!(error_kind("f = { 1; }; h = { f; };"), ErrorKind::Type);
}

#[test]
fn test_function_aliases() {
    assert_eq!(
        render("f = (x: Integer) { x; }; g = f; g(1);"),
        "(decl f:Function (fn (x:Integer) {x}))\n(decl g:Function f)\n(call g 1)"
    );
}

#[test]
fn test_empty_bodies_are_rejected() {
    assert_eq!(error_name("{ };"), "ExpectedValue");
    assert_eq!(error_name("if true { };"), "ExpectedValue");
}

#[test]
fn test_if_else() {
    assert_eq!(render("if true { 1; } else { 2; };"), "(if:Integer true {1} {2})");
    assert_eq!(render("if true { 1; } else { 2.0; };"), "(if:Float true {1} {2.0})");
    assert_eq!(render("if 1 { true; };"), "(if:Boolean 1 {true} {})");
}

#[test]
fn test_else_if_chain() {
    assert_eq!(
        render("if false { 1; } else if true { 2; } else { 3; };"),
        "(if:Integer false {1} {(if:Integer true {2} {3})})"
    );
}

#[test]
fn test_if_branch_mismatch() {
    assert_eq!(error_name("if true { 1; } else { false; };"), "TypeMatchError");
}

#[test]
fn test_missing_semicolon() {
    let error = parse_source("1 2;").unwrap_err();

    assert_eq!(error.get_kind(), ErrorKind::Parse);
    assert_eq!(error.to_string(), "expected ';', got \"2\"");
    assert_eq!(error.get_position().0, 2);
}

#[test]
fn test_unclosed_block() {
    let error = parse_source("f = { 1; ").unwrap_err();
    assert_eq!(error.to_string(), "expected '}', got \"end of input\"");
}

#[test]
fn test_unexpected_token_in_expression() {
    let error = parse_source(";").unwrap_err();
    assert_eq!(error.to_string(), "expected expression, got \"';'\"");
}

#[test]
fn test_invalid_token_is_rejected() {
    let mut lexer = Lexer::new("x = $;".to_string(), None);
    let mut tokens = vec![];
    loop {
        let token = lexer.next_token().unwrap();
        let kind = token.kind;
        tokens.push(token);
        if kind == TokenKind::EOF {
            break;
        }
    }

    let error = parse_program(tokens, Rc::new("shell".to_string())).unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_kind(), ErrorKind::Lex);
}

#[test]
fn test_parse_into_supplied_root_scope() {
    let root = create_root();
    let tokens = tokenize("a = 1; { b = 2; b; };".to_string(), None).unwrap();
    let program = parse(tokens, Rc::new("shell".to_string()), Rc::clone(&root)).unwrap();

    assert_eq!(program.len(), 2);
    assert!(lookup(&root, "a").unwrap().is_global);
    assert!(lookup(&root, "b").is_none());
}

#[test]
fn test_block_keeps_parameter_scope() {
    let program = parse_source("(x: Integer, y: Boolean) { x; };").unwrap();

    let Expr::Block(block) = &program.items[0] else {
        panic!("expected a function literal");
    };
    let scope = block.scope.borrow();
    let params: Vec<_> = scope.symbols().iter().filter(|symbol| symbol.is_param).collect();
    assert_eq!(params.len(), 2);
    assert_eq!(block.signature.params, vec![Type::Integer, Type::Boolean]);
}

#[test]
fn test_enclosing_function_locals_are_not_visible() {
    let source = indoc! {"
        f = (a: Integer) {
            g = (b: Integer) { a + b; };
            g(1);
        };
    "};
    assert_eq!(error_name(source), "CapturedLocal");
    assert_eq!(error_kind(source), ErrorKind::Symbol);

    assert_eq!(
        error_name("f = (x: Integer) { y = x; g = { y + 1; }; y; };"),
        "CapturedLocal"
    );
    assert_eq!(
        error_name("if true { y = 1; f = { y; }; 1; };"),
        "CapturedLocal"
    );
    assert_eq!(
        error_name("f = () { y = 1; g = { (y) = 2; }; y; };"),
        "CapturedLocal"
    );
}

#[test]
fn test_nested_functions_see_globals_and_functions() {
    let source = indoc! {"
        base = 10;
        f = (a: Integer) {
            twice = (b: Integer) { b * 2; };
            g = (b: Integer) { twice(b) + base; };
            g(a) + a;
        };
        f(1);
    "};
    assert_eq!(parse_source(source).unwrap().ty, Some(Type::Integer));

    let source = "f = (a: Integer) { if a > 0 { b = a; b; } else { a; }; };";
    assert_eq!(parse_source(source).unwrap().ty, Some(Type::Function));
}
