use inkwell::{
    values::{BasicMetadataValueEnum, BasicValueEnum, FunctionValue, PointerValue},
    FloatPredicate, IntPredicate,
};
use log::trace;

use crate::{
    ast::ast::{BinOpExpr, BinaryOp, Expr, FunCallExpr, IdentExpr, UnaryOp, UnaryOpExpr, VarDeclExpr},
    errors::errors::{Error, ErrorImpl},
    type_checker::{symbols::Symbol, types::Type},
    Span,
};

use super::{
    block::{gen_function, gen_if},
    compiler::{BuilderResultExt, Compiler, Storage},
};

/// Generates LLVM IR for the given expression.
///
/// Function-typed expressions produce no value and yield `None`.
pub fn gen_expression<'a>(
    compiler: &mut Compiler<'a>,
    expression: &Expr,
) -> Result<Option<BasicValueEnum<'a>>, Error> {
    let value = match expression {
        Expr::ConstInt(int) => Some(
            compiler
                .context
                .i64_type()
                .const_int(int.value as u64, true)
                .into(),
        ),
        Expr::ConstFloat(float) => Some(compiler.context.f64_type().const_float(float.value).into()),
        Expr::ConstBool(boolean) => Some(
            compiler
                .context
                .bool_type()
                .const_int(boolean.value as u64, false)
                .into(),
        ),
        Expr::Ident(ident) => gen_ident(compiler, ident)?,
        Expr::VarDecl(decl) => gen_var_decl(compiler, decl)?,
        Expr::BinOp(binop) if binop.op == BinaryOp::Assign => Some(gen_assignment(compiler, binop)?),
        Expr::BinOp(binop) => Some(gen_binary(compiler, binop)?),
        Expr::UnaryOp(unary) => Some(gen_unary(compiler, unary)?),
        Expr::FunCall(call) => Some(gen_call(compiler, call)?),
        Expr::Block(block) => {
            let name = compiler.next_function_name();
            gen_function(compiler, block, &name)?;
            None
        }
        Expr::If(if_expr) => Some(gen_if(compiler, if_expr)?),
    };

    trace!("emitted {:?} node", expression.ty());
    Ok(value)
}

/// Like [`gen_expression`], for expressions that must produce a value.
pub fn gen_value<'a>(compiler: &mut Compiler<'a>, expression: &Expr) -> Result<BasicValueEnum<'a>, Error> {
    gen_expression(compiler, expression)?.ok_or_else(|| {
        Error::new(
            ErrorImpl::ExpectedValue {
                construct: format!("{} expression", expression.ty()),
            },
            expression.span().start.clone(),
        )
    })
}

/// Emits `expression` and converts its value to `to`.
pub fn gen_value_as<'a>(
    compiler: &mut Compiler<'a>,
    expression: &Expr,
    to: Type,
) -> Result<BasicValueEnum<'a>, Error> {
    let value = gen_value(compiler, expression)?;
    compiler.cast(value, expression.ty(), to, expression.span())
}

fn captured(symbol: &Symbol, span: &Span) -> Error {
    Error::new(
        ErrorImpl::CapturedLocal {
            variable: symbol.name.clone(),
        },
        span.start.clone(),
    )
}

/// Pointer to the storage of a variable readable from the current function.
fn variable_pointer<'a>(
    compiler: &Compiler<'a>,
    symbol: &Symbol,
    span: &Span,
) -> Result<Option<PointerValue<'a>>, Error> {
    match compiler.get_storage(symbol, span)? {
        Storage::Global(global) => Ok(Some(global.as_pointer_value())),
        Storage::Slot { pointer, owner } => {
            if Some(owner) != compiler.current_function() {
                return Err(captured(symbol, span));
            }
            Ok(Some(pointer))
        }
        Storage::Param { .. } | Storage::Function(_) => Ok(None),
    }
}

fn gen_ident<'a>(compiler: &mut Compiler<'a>, ident: &IdentExpr) -> Result<Option<BasicValueEnum<'a>>, Error> {
    let symbol = &ident.symbol;

    match compiler.get_storage(symbol, &ident.span)? {
        Storage::Param { value, owner } => {
            if Some(owner) != compiler.current_function() {
                return Err(captured(symbol, &ident.span));
            }
            Ok(Some(value))
        }
        Storage::Function(_) => Ok(None),
        Storage::Global(_) | Storage::Slot { .. } => {
            let Some(pointer) = variable_pointer(compiler, symbol, &ident.span)? else {
                return Ok(None);
            };
            let value = compiler
                .builder
                .build_load(pointer, &symbol.name)
                .at(&ident.span)?;
            Ok(Some(value))
        }
    }
}

/// The LLVM function a Function-typed expression denotes, emitting it
/// first when it is a literal.
pub fn function_value<'a>(
    compiler: &mut Compiler<'a>,
    expression: &Expr,
    name: &str,
) -> Result<FunctionValue<'a>, Error> {
    match expression {
        Expr::Block(block) => gen_function(compiler, block, name),
        Expr::Ident(IdentExpr { symbol, span }) => match compiler.get_storage(symbol, span)? {
            Storage::Function(function) => Ok(function),
            _ => Err(not_a_function(symbol, span)),
        },
        Expr::VarDecl(decl) => {
            gen_var_decl(compiler, decl)?;
            match compiler.get_storage(&decl.symbol, &decl.span)? {
                Storage::Function(function) => Ok(function),
                _ => Err(not_a_function(&decl.symbol, &decl.span)),
            }
        }
        other => Err(Error::new(
            ErrorImpl::NotAFunction {
                name: name.to_string(),
                type_: other.ty().to_string(),
            },
            other.span().start.clone(),
        )),
    }
}

fn not_a_function(symbol: &Symbol, span: &Span) -> Error {
    Error::new(
        ErrorImpl::NotAFunction {
            name: symbol.name.clone(),
            type_: symbol.ty.to_string(),
        },
        span.start.clone(),
    )
}

/// Function declarations emit a new LLVM function named after the
/// variable. Root scope variables become globals, all others stack slots
/// of the function being emitted.
fn gen_var_decl<'a>(compiler: &mut Compiler<'a>, decl: &VarDeclExpr) -> Result<Option<BasicValueEnum<'a>>, Error> {
    let symbol = &decl.symbol;

    if symbol.ty == Type::Function {
        let function = function_value(compiler, &decl.value, &symbol.name)?;
        compiler.set_storage(symbol, Storage::Function(function));
        return Ok(None);
    }

    let value = gen_value(compiler, &decl.value)?;

    let pointer = if symbol.is_global {
        let global = compiler.create_global(symbol.ty, &symbol.name, &decl.span)?;
        compiler.set_storage(symbol, Storage::Global(global));
        global.as_pointer_value()
    } else {
        let owner = compiler.expect_function(&decl.span)?;
        let ty = compiler.value_type(symbol.ty, &decl.span)?;
        let pointer = compiler.create_entry_alloca(owner, ty, &symbol.name, &decl.span)?;
        compiler.set_storage(symbol, Storage::Slot { pointer, owner });
        pointer
    };

    compiler.builder.build_store(pointer, value).at(&decl.span)?;
    Ok(Some(value))
}

fn gen_assignment<'a>(compiler: &mut Compiler<'a>, binop: &BinOpExpr) -> Result<BasicValueEnum<'a>, Error> {
    let Expr::Ident(target) = binop.left.as_ref() else {
        return Err(Error::new(
            ErrorImpl::InvalidAssignmentTarget {
                target: "an expression".to_string(),
            },
            binop.span.start.clone(),
        ));
    };

    let value = gen_value_as(compiler, &binop.right, binop.operand_type)?;

    let Some(pointer) = variable_pointer(compiler, &target.symbol, &target.span)? else {
        return Err(Error::new(
            ErrorImpl::InvalidAssignmentTarget {
                target: format!("`{}`", target.symbol.name),
            },
            target.span.start.clone(),
        ));
    };

    compiler.builder.build_store(pointer, value).at(&binop.span)?;
    Ok(value)
}

fn int_predicate(op: BinaryOp) -> Option<IntPredicate> {
    match op {
        BinaryOp::Equals => Some(IntPredicate::EQ),
        BinaryOp::Less => Some(IntPredicate::SLT),
        BinaryOp::LessEquals => Some(IntPredicate::SLE),
        BinaryOp::Greater => Some(IntPredicate::SGT),
        BinaryOp::GreaterEquals => Some(IntPredicate::SGE),
        _ => None,
    }
}

fn float_predicate(op: BinaryOp) -> Option<FloatPredicate> {
    match op {
        BinaryOp::Equals => Some(FloatPredicate::OEQ),
        BinaryOp::Less => Some(FloatPredicate::OLT),
        BinaryOp::LessEquals => Some(FloatPredicate::OLE),
        BinaryOp::Greater => Some(FloatPredicate::OGT),
        BinaryOp::GreaterEquals => Some(FloatPredicate::OGE),
        _ => None,
    }
}

/// Both operands are converted to the node's operand type first.
fn gen_binary<'a>(compiler: &mut Compiler<'a>, binop: &BinOpExpr) -> Result<BasicValueEnum<'a>, Error> {
    let left = gen_value_as(compiler, &binop.left, binop.operand_type)?;
    let right = gen_value_as(compiler, &binop.right, binop.operand_type)?;
    let span = &binop.span;
    let builder = &compiler.builder;

    let value: BasicValueEnum<'a> = match binop.operand_type {
        Type::Integer | Type::Boolean => {
            let (l, r) = (left.into_int_value(), right.into_int_value());
            if let Some(predicate) = int_predicate(binop.op) {
                builder.build_int_compare(predicate, l, r, "cmp").at(span)?.into()
            } else {
                match binop.op {
                    BinaryOp::Add => builder.build_int_add(l, r, "add"),
                    BinaryOp::Subtract => builder.build_int_sub(l, r, "sub"),
                    BinaryOp::Multiply => builder.build_int_mul(l, r, "mul"),
                    BinaryOp::Divide => builder.build_int_signed_div(l, r, "div"),
                    BinaryOp::Modulo => builder.build_int_signed_rem(l, r, "rem"),
                    _ => return Err(unsupported(binop)),
                }
                .at(span)?
                .into()
            }
        }
        Type::Float => {
            let (l, r) = (left.into_float_value(), right.into_float_value());
            if let Some(predicate) = float_predicate(binop.op) {
                builder.build_float_compare(predicate, l, r, "cmp").at(span)?.into()
            } else {
                match binop.op {
                    BinaryOp::Add => builder.build_float_add(l, r, "add"),
                    BinaryOp::Subtract => builder.build_float_sub(l, r, "sub"),
                    BinaryOp::Multiply => builder.build_float_mul(l, r, "mul"),
                    BinaryOp::Divide => builder.build_float_div(l, r, "div"),
                    BinaryOp::Modulo => builder.build_float_rem(l, r, "rem"),
                    _ => return Err(unsupported(binop)),
                }
                .at(span)?
                .into()
            }
        }
        Type::Function => return Err(unsupported(binop)),
    };

    Ok(value)
}

fn unsupported(binop: &BinOpExpr) -> Error {
    Error::new(
        ErrorImpl::IncompatibleOperands {
            operator: binop.op.symbol().to_string(),
            left: binop.left.ty().to_string(),
            right: binop.right.ty().to_string(),
        },
        binop.span.start.clone(),
    )
}

/// Negation is `0 - value` in the operand's type.
fn gen_unary<'a>(compiler: &mut Compiler<'a>, unary: &UnaryOpExpr) -> Result<BasicValueEnum<'a>, Error> {
    let operand = gen_value(compiler, &unary.operand)?;

    match (unary.op, unary.ty) {
        (UnaryOp::Negate, Type::Integer) => Ok(compiler
            .builder
            .build_int_sub(
                compiler.context.i64_type().const_zero(),
                operand.into_int_value(),
                "neg",
            )
            .at(&unary.span)?
            .into()),
        (UnaryOp::Negate, Type::Float) => Ok(compiler
            .builder
            .build_float_sub(
                compiler.context.f64_type().const_zero(),
                operand.into_float_value(),
                "neg",
            )
            .at(&unary.span)?
            .into()),
        (UnaryOp::Negate, ty) => Err(Error::new(
            ErrorImpl::TypeMatchError {
                expected: "Integer or Float".to_string(),
                received: ty.to_string(),
            },
            unary.span.start.clone(),
        )),
    }
}

/// Arguments are emitted left to right, each converted to its parameter
/// type.
fn gen_call<'a>(compiler: &mut Compiler<'a>, call: &FunCallExpr) -> Result<BasicValueEnum<'a>, Error> {
    let function = match compiler.get_storage(&call.callee, &call.span)? {
        Storage::Function(function) => function,
        _ => return Err(not_a_function(&call.callee, &call.span)),
    };

    let mut args: Vec<BasicMetadataValueEnum<'a>> = Vec::with_capacity(call.args.len());
    for (arg, param_type) in call.args.iter().zip(&call.param_types) {
        args.push(gen_value_as(compiler, arg, *param_type)?.into());
    }

    let call_site = compiler
        .builder
        .build_call(function, &args, "call")
        .at(&call.span)?;

    call_site.try_as_basic_value().left().ok_or_else(|| {
        Error::new(
            ErrorImpl::Backend {
                message: format!("call to `{}` produced no value", call.callee.name),
            },
            call.span.start.clone(),
        )
    })
}
