//! Unit tests for the node constructors and the tree printer.

use crate::{
    ast::{
        ast::{BinaryOp, Expr, ExprList, UnaryOp},
        expressions::{
            bin_op, block, const_bool, const_float, const_int, fun_call, fun_param, ident,
            if_expr, unary_op, var_decl,
        },
        printer::{print_expr, print_expr_list},
    },
    errors::errors::ErrorKind,
    type_checker::{
        symbols::{create_child, create_root, lookup},
        types::{Type, TypeRegistry},
    },
    Span,
};

fn span() -> Span {
    Span::null()
}

fn int(value: i64) -> Expr {
    const_int(value, span())
}

#[test]
fn test_literal_types() {
    assert_eq!(const_int(1, span()).ty(), Type::Integer);
    assert_eq!(const_float(1.5, span()).ty(), Type::Float);
    assert_eq!(const_bool(true, span()).ty(), Type::Boolean);
}

#[test]
fn test_arithmetic_keeps_identical_types() {
    let registry = TypeRegistry::new();
    let expr = bin_op(&registry, BinaryOp::Multiply, int(2), int(3), span()).unwrap();

    assert_eq!(expr.ty(), Type::Integer);
}

#[test]
fn test_arithmetic_promotes_to_float() {
    let registry = TypeRegistry::new();
    let expr = bin_op(&registry, BinaryOp::Add, int(1), const_float(2.0, span()), span()).unwrap();

    assert_eq!(expr.ty(), Type::Float);
    match expr {
        Expr::BinOp(binop) => assert_eq!(binop.operand_type, Type::Float),
        other => panic!("expected a binary node, got {:?}", other),
    }
}

#[test]
fn test_comparison_is_boolean() {
    let registry = TypeRegistry::new();
    let expr = bin_op(&registry, BinaryOp::Less, int(1), const_float(2.0, span()), span()).unwrap();

    assert_eq!(expr.ty(), Type::Boolean);
    match expr {
        Expr::BinOp(binop) => assert_eq!(binop.operand_type, Type::Float),
        other => panic!("expected a binary node, got {:?}", other),
    }
}

#[test]
fn test_boolean_equality() {
    let registry = TypeRegistry::new();
    let expr = bin_op(
        &registry,
        BinaryOp::Equals,
        const_bool(true, span()),
        const_bool(false, span()),
        span(),
    )
    .unwrap();

    assert_eq!(expr.ty(), Type::Boolean);
}

#[test]
fn test_boolean_arithmetic_rejected() {
    let registry = TypeRegistry::new();
    let error = bin_op(&registry, BinaryOp::Add, const_bool(true, span()), int(1), span()).unwrap_err();

    assert_eq!(error.get_error_name(), "IncompatibleOperands");
    assert_eq!(error.get_kind(), ErrorKind::Type);
}

#[test]
fn test_boolean_ordering_rejected() {
    let registry = TypeRegistry::new();
    let error = bin_op(
        &registry,
        BinaryOp::Less,
        const_bool(true, span()),
        const_bool(false, span()),
        span(),
    )
    .unwrap_err();

    assert_eq!(error.get_kind(), ErrorKind::Type);
}

#[test]
fn test_declaration_binds_after_value() {
    let registry = TypeRegistry::new();
    let root = create_root();

    let decl = var_decl(&registry, &root, "x", None, int(4), span()).unwrap();
    assert_eq!(decl.ty(), Type::Integer);
    assert_eq!(lookup(&root, "x").unwrap().ty, Type::Integer);
}

#[test]
fn test_declaration_annotation_mismatch() {
    let registry = TypeRegistry::new();
    let root = create_root();

    let error = var_decl(&registry, &root, "x", Some(Type::Float), int(4), span()).unwrap_err();
    assert_eq!(error.get_error_name(), "TypeMatchError");
    assert!(lookup(&root, "x").is_none());
}

#[test]
fn test_redeclaration_rejected() {
    let registry = TypeRegistry::new();
    let root = create_root();
    var_decl(&registry, &root, "x", None, int(1), span()).unwrap();

    let error = var_decl(&registry, &root, "x", None, int(2), span()).unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::Symbol);
}

#[test]
fn test_undeclared_identifier() {
    let root = create_root();
    let error = ident(&root, "missing", span()).unwrap_err();

    assert_eq!(error.get_error_name(), "VariableNotDeclared");
    assert_eq!(error.get_kind(), ErrorKind::Symbol);
}

#[test]
fn test_assignment_targets() {
    let registry = TypeRegistry::new();
    let root = create_root();
    var_decl(&registry, &root, "x", None, const_float(1.0, span()), span()).unwrap();

    let target = ident(&root, "x", span()).unwrap();
    let assign = bin_op(&registry, BinaryOp::Assign, target, int(3), span()).unwrap();
    assert_eq!(assign.ty(), Type::Float);

    let error = bin_op(&registry, BinaryOp::Assign, int(1), int(3), span()).unwrap_err();
    assert_eq!(error.get_error_name(), "InvalidAssignmentTarget");
}

#[test]
fn test_assignment_to_parameter_rejected() {
    let registry = TypeRegistry::new();
    let root = create_root();
    let scope = create_child(&root);
    fun_param(&scope, "p", Type::Integer, span()).unwrap();

    let target = ident(&scope, "p", span()).unwrap();
    let error = bin_op(&registry, BinaryOp::Assign, target, int(3), span()).unwrap_err();
    assert_eq!(error.get_error_name(), "InvalidAssignmentTarget");
}

#[test]
fn test_negate_requires_number() {
    assert_eq!(
        unary_op(UnaryOp::Negate, const_float(1.0, span()), span()).unwrap().ty(),
        Type::Float
    );
    assert!(unary_op(UnaryOp::Negate, const_bool(true, span()), span()).is_err());
}

fn increment_function(registry: &TypeRegistry, root: &crate::type_checker::symbols::ScopeRef) {
    let scope = create_child(root);
    let param = fun_param(&scope, "x", Type::Integer, span()).unwrap();

    let mut body = ExprList::new(scope.clone());
    let x = ident(&scope, "x", span()).unwrap();
    body.push(bin_op(registry, BinaryOp::Add, x, int(1), span()).unwrap());

    let literal = block(vec![param], scope, body, span()).unwrap();
    var_decl(registry, root, "f", None, literal, span()).unwrap();
}

#[test]
fn test_function_declaration_records_signature() {
    let registry = TypeRegistry::new();
    let root = create_root();
    increment_function(&registry, &root);

    let symbol = lookup(&root, "f").unwrap();
    assert_eq!(symbol.ty, Type::Function);
    let signature = symbol.signature.unwrap();
    assert_eq!(signature.params, vec![Type::Integer]);
    assert_eq!(signature.return_type, Type::Integer);
}

#[test]
fn test_call_checks_arity() {
    let registry = TypeRegistry::new();
    let root = create_root();
    increment_function(&registry, &root);

    let call = fun_call(&registry, &root, "f", vec![int(4)], span()).unwrap();
    assert_eq!(call.ty(), Type::Integer);

    let error = fun_call(&registry, &root, "f", vec![], span()).unwrap_err();
    assert_eq!(error.get_error_name(), "ArgumentCountMismatch");

    let error = fun_call(&registry, &root, "f", vec![int(1), int(2)], span()).unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::Type);
}

#[test]
fn test_call_converts_arguments() {
    let registry = TypeRegistry::new();
    let root = create_root();
    increment_function(&registry, &root);

    assert!(fun_call(&registry, &root, "f", vec![const_float(2.5, span())], span()).is_ok());
}

#[test]
fn test_call_non_function() {
    let registry = TypeRegistry::new();
    let root = create_root();
    var_decl(&registry, &root, "x", None, int(1), span()).unwrap();

    let error = fun_call(&registry, &root, "x", vec![], span()).unwrap_err();
    assert_eq!(error.get_error_name(), "NotAFunction");
}

#[test]
fn test_function_alias_is_callable() {
    let registry = TypeRegistry::new();
    let root = create_root();
    increment_function(&registry, &root);

    let f = ident(&root, "f", span()).unwrap();
    var_decl(&registry, &root, "g", None, f, span()).unwrap();

    assert!(fun_call(&registry, &root, "g", vec![int(1)], span()).is_ok());
}

#[test]
fn test_function_parameter_type_rejected() {
    let root = create_root();
    let error = fun_param(&root, "f", Type::Function, span()).unwrap_err();

    assert_eq!(error.get_kind(), ErrorKind::Type);
}

#[test]
fn test_empty_function_body_rejected() {
    let root = create_root();
    let scope = create_child(&root);

    let error = block(vec![], scope.clone(), ExprList::new(scope), span()).unwrap_err();
    assert_eq!(error.get_error_name(), "ExpectedValue");
}

fn branch(root: &crate::type_checker::symbols::ScopeRef, value: Option<Expr>) -> ExprList {
    let mut list = ExprList::new(create_child(root));
    if let Some(value) = value {
        list.push(value);
    }
    list
}

#[test]
fn test_if_unifies_branches() {
    let registry = TypeRegistry::new();
    let root = create_root();

    let same = if_expr(
        &registry,
        const_bool(true, span()),
        branch(&root, Some(int(1))),
        branch(&root, Some(int(2))),
        span(),
    )
    .unwrap();
    assert_eq!(same.ty(), Type::Integer);

    let mixed = if_expr(
        &registry,
        const_bool(true, span()),
        branch(&root, Some(int(1))),
        branch(&root, Some(const_float(2.0, span()))),
        span(),
    )
    .unwrap();
    assert_eq!(mixed.ty(), Type::Float);
}

#[test]
fn test_if_without_else_takes_then_type() {
    let registry = TypeRegistry::new();
    let root = create_root();

    let expr = if_expr(&registry, int(1), branch(&root, Some(const_bool(false, span()))), branch(&root, None), span())
        .unwrap();
    assert_eq!(expr.ty(), Type::Boolean);
}

#[test]
fn test_if_rejects_mismatched_branches() {
    let registry = TypeRegistry::new();
    let root = create_root();

    let error = if_expr(
        &registry,
        const_bool(true, span()),
        branch(&root, Some(int(1))),
        branch(&root, Some(const_bool(true, span()))),
        span(),
    )
    .unwrap_err();
    assert_eq!(error.get_error_name(), "TypeMatchError");
}

#[test]
fn test_if_rejects_empty_then_branch() {
    let registry = TypeRegistry::new();
    let root = create_root();

    let error = if_expr(&registry, const_bool(true, span()), branch(&root, None), branch(&root, None), span())
        .unwrap_err();
    assert_eq!(error.get_error_name(), "ExpectedValue");
}

#[test]
fn test_print_nested_operators() {
    let registry = TypeRegistry::new();
    let product = bin_op(&registry, BinaryOp::Multiply, int(2), int(3), span()).unwrap();
    let sum = bin_op(&registry, BinaryOp::Add, int(1), product, span()).unwrap();

    assert_eq!(print_expr(&sum), "(+ 1 (* 2 3))");
}

#[test]
fn test_print_program() {
    let registry = TypeRegistry::new();
    let root = create_root();
    increment_function(&registry, &root);

    let mut program = ExprList::new(root.clone());
    program.push(var_decl(&registry, &root, "y", None, const_float(0.5, span()), span()).unwrap());
    program.push(fun_call(&registry, &root, "f", vec![int(4)], span()).unwrap());

    assert_eq!(print_expr_list(&program), "(decl y:Float 0.5)\n(call f 4)");
}
