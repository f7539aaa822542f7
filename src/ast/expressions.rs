//! Node constructors.
//!
//! Each constructor resolves names and checks types before the node exists,
//! so a failed check never leaves a half-built node behind.

use log::trace;

use crate::{
    errors::errors::{Error, ErrorImpl},
    type_checker::{
        symbols::{self, ScopeRef, Signature},
        types::{Type, TypeRegistry},
    },
    Span,
};

use super::ast::{
    BinOpExpr, BinaryOp, BlockExpr, ConstBoolExpr, ConstFloatExpr, ConstIntExpr, Expr, ExprList,
    FunCallExpr, FunParam, IdentExpr, IfExpr, UnaryOp, UnaryOpExpr, VarDeclExpr,
};

fn type_mismatch(expected: impl ToString, received: Type, span: &Span) -> Error {
    Error::new(
        ErrorImpl::TypeMatchError {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        span.start.clone(),
    )
}

// LITERALS

pub fn const_int(value: i64, span: Span) -> Expr {
    Expr::ConstInt(ConstIntExpr { value, span })
}

pub fn const_float(value: f64, span: Span) -> Expr {
    Expr::ConstFloat(ConstFloatExpr { value, span })
}

pub fn const_bool(value: bool, span: Span) -> Expr {
    Expr::ConstBool(ConstBoolExpr { value, span })
}

// NAMES

/// Reference to `name`, resolved through the scope chain. Values local to
/// an enclosing function cannot be read from a nested one.
pub fn ident(scope: &ScopeRef, name: &str, span: Span) -> Result<Expr, Error> {
    let Some(symbol) = symbols::lookup(scope, name) else {
        return Err(Error::new(
            ErrorImpl::VariableNotDeclared {
                variable: name.to_string(),
            },
            span.start,
        ));
    };

    if !symbol.is_visible_from(scope.borrow().function_depth()) {
        return Err(Error::new(
            ErrorImpl::CapturedLocal {
                variable: name.to_string(),
            },
            span.start,
        ));
    }

    trace!("resolved {} to #{}", name, symbol.id);
    Ok(Expr::Ident(IdentExpr { symbol, span }))
}

/// Declaration of `name` in `scope`, taking the type of the already parsed
/// `value`. The symbol is inserted only after every check passes, so the
/// value can never refer to the name being declared.
pub fn var_decl(
    registry: &TypeRegistry,
    scope: &ScopeRef,
    name: &str,
    annotation: Option<Type>,
    value: Expr,
    span: Span,
) -> Result<Expr, Error> {
    if symbols::lookup_local(scope, name).is_some() {
        return Err(Error::new(
            ErrorImpl::VariableAlreadyDeclared {
                variable: name.to_string(),
            },
            span.start,
        ));
    }

    let ty = value.ty();
    if let Some(annotation) = annotation {
        if !registry.equals(annotation, ty) {
            return Err(type_mismatch(annotation, ty, value.span()));
        }
    }

    let symbol = if ty == Type::Function {
        let Some(signature) = value.signature() else {
            return Err(Error::new(
                ErrorImpl::ExpectedValue {
                    construct: format!("declaration of `{}`", name),
                },
                span.start,
            ));
        };
        symbols::declare_function(scope, name, signature, span.start.clone())?
    } else {
        symbols::declare(scope, name, ty, false, span.start.clone())?
    };

    Ok(Expr::VarDecl(VarDeclExpr {
        symbol,
        value: Box::new(value),
        span,
    }))
}

// OPERATORS

fn describe_target(expr: &Expr) -> String {
    match expr {
        Expr::Ident(ident) if ident.symbol.is_param => {
            format!("parameter `{}`", ident.symbol.name)
        }
        Expr::Ident(ident) => format!("function `{}`", ident.symbol.name),
        Expr::ConstInt(_) | Expr::ConstFloat(_) | Expr::ConstBool(_) => "a literal".to_string(),
        Expr::FunCall(call) => format!("a call to `{}`", call.callee.name),
        _ => "an expression".to_string(),
    }
}

pub fn bin_op(
    registry: &TypeRegistry,
    op: BinaryOp,
    left: Expr,
    right: Expr,
    span: Span,
) -> Result<Expr, Error> {
    let (left_type, right_type) = (left.ty(), right.ty());

    let (operand_type, ty) = match op {
        BinaryOp::Assign => {
            let assignable = matches!(
                &left,
                Expr::Ident(ident) if !ident.symbol.is_param && ident.symbol.ty.is_primitive()
            );
            if !assignable {
                return Err(Error::new(
                    ErrorImpl::InvalidAssignmentTarget {
                        target: describe_target(&left),
                    },
                    span.start,
                ));
            }
            if !registry.can_convert(right_type, left_type) {
                return Err(type_mismatch(left_type, right_type, right.span()));
            }
            (left_type, left_type)
        }
        BinaryOp::Equals => {
            let Some(unified) = registry.unify(left_type, right_type) else {
                return Err(incompatible(op, left_type, right_type, &span));
            };
            (unified, Type::Boolean)
        }
        _ => {
            let unified = registry
                .unify(left_type, right_type)
                .filter(Type::is_numeric)
                .ok_or_else(|| incompatible(op, left_type, right_type, &span))?;

            if op.is_comparison() {
                (unified, Type::Boolean)
            } else {
                (unified, unified)
            }
        }
    };

    Ok(Expr::BinOp(BinOpExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
        operand_type,
        ty,
        span,
    }))
}

fn incompatible(op: BinaryOp, left: Type, right: Type, span: &Span) -> Error {
    Error::new(
        ErrorImpl::IncompatibleOperands {
            operator: op.symbol().to_string(),
            left: left.to_string(),
            right: right.to_string(),
        },
        span.start.clone(),
    )
}

pub fn unary_op(op: UnaryOp, operand: Expr, span: Span) -> Result<Expr, Error> {
    let ty = operand.ty();
    if !ty.is_numeric() {
        return Err(type_mismatch("Integer or Float", ty, operand.span()));
    }

    Ok(Expr::UnaryOp(UnaryOpExpr {
        op,
        operand: Box::new(operand),
        ty,
        span,
    }))
}

// FUNCTIONS

/// Call of the function bound to `name`. Arity and argument types are
/// checked against the recorded signature.
pub fn fun_call(
    registry: &TypeRegistry,
    scope: &ScopeRef,
    name: &str,
    args: Vec<Expr>,
    span: Span,
) -> Result<Expr, Error> {
    let Some(callee) = symbols::lookup(scope, name) else {
        return Err(Error::new(
            ErrorImpl::VariableNotDeclared {
                variable: name.to_string(),
            },
            span.start,
        ));
    };

    let Some(signature) = callee.signature.clone() else {
        return Err(Error::new(
            ErrorImpl::NotAFunction {
                name: name.to_string(),
                type_: callee.ty.to_string(),
            },
            span.start,
        ));
    };

    if signature.arity() != args.len() {
        return Err(Error::new(
            ErrorImpl::ArgumentCountMismatch {
                function: name.to_string(),
                expected: signature.arity(),
                received: args.len(),
            },
            span.start,
        ));
    }

    for (arg, param_type) in args.iter().zip(&signature.params) {
        if !registry.can_convert(arg.ty(), *param_type) {
            return Err(Error::new(
                ErrorImpl::ArgumentTypeMatchError {
                    expected: param_type.to_string(),
                    received: arg.ty().to_string(),
                },
                arg.span().start.clone(),
            ));
        }
    }

    Ok(Expr::FunCall(FunCallExpr {
        callee,
        args,
        param_types: signature.params,
        ty: signature.return_type,
        span,
    }))
}

/// Binds a parameter in the function's own scope.
pub fn fun_param(scope: &ScopeRef, name: &str, ty: Type, span: Span) -> Result<FunParam, Error> {
    if !ty.is_primitive() {
        return Err(type_mismatch("Integer, Float or Boolean", ty, &span));
    }

    let symbol = symbols::declare(scope, name, ty, true, span.start.clone())?;
    Ok(FunParam { symbol, span })
}

/// Function literal over an already parsed parameter list and body.
pub fn block(
    params: Vec<FunParam>,
    scope: ScopeRef,
    body: ExprList,
    span: Span,
) -> Result<Expr, Error> {
    let Some(return_type) = body.ty else {
        return Err(Error::new(
            ErrorImpl::ExpectedValue {
                construct: "function body".to_string(),
            },
            span.start,
        ));
    };

    if !return_type.is_primitive() {
        let position = body.last().map(Expr::span).unwrap_or(&span);
        return Err(type_mismatch("Integer, Float or Boolean", return_type, position));
    }

    let signature = Signature {
        return_type,
        params: params.iter().map(|param| param.symbol.ty).collect(),
    };

    Ok(Expr::Block(BlockExpr {
        params,
        scope,
        body,
        signature,
        span,
    }))
}

// CONTROL FLOW

/// `if` with both branches parsed. An empty else branch yields the zero
/// value of the then-branch type; otherwise both branches unify like
/// operands of a binary operator.
pub fn if_expr(
    registry: &TypeRegistry,
    condition: Expr,
    then_branch: ExprList,
    else_branch: ExprList,
    span: Span,
) -> Result<Expr, Error> {
    if !registry.can_convert(condition.ty(), Type::Boolean) {
        return Err(type_mismatch(Type::Boolean, condition.ty(), condition.span()));
    }

    let Some(then_type) = then_branch.ty else {
        return Err(Error::new(
            ErrorImpl::ExpectedValue {
                construct: "if branch".to_string(),
            },
            span.start,
        ));
    };

    let ty = match else_branch.ty {
        None if then_type.is_primitive() => then_type,
        None => return Err(type_mismatch("Integer, Float or Boolean", then_type, &span)),
        Some(else_type) => registry
            .unify(then_type, else_type)
            .ok_or_else(|| type_mismatch(then_type, else_type, &span))?,
    };

    Ok(Expr::If(IfExpr {
        condition: Box::new(condition),
        then_branch,
        else_branch,
        ty,
        span,
    }))
}
