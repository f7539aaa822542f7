use inkwell::{
    types::{BasicMetadataTypeEnum, BasicType},
    values::{BasicValueEnum, FunctionValue},
};
use log::debug;

use crate::{
    ast::ast::{BlockExpr, ExprList, IfExpr},
    errors::errors::{Error, ErrorImpl},
    type_checker::types::Type,
};

use super::{
    compiler::{BuilderResultExt, Compiler, Storage},
    expr::{gen_expression, gen_value_as},
};

/// Emits every expression in order; the value of the list is the value of
/// its last element.
pub fn gen_expr_list<'a>(
    compiler: &mut Compiler<'a>,
    list: &ExprList,
) -> Result<Option<BasicValueEnum<'a>>, Error> {
    let mut value = None;
    for expr in &list.items {
        value = gen_expression(compiler, expr)?;
    }
    Ok(value)
}

/// Emits a function literal as a new LLVM function named `name`.
///
/// Parameters are bound to the function's argument values. The builder
/// returns to where it was once the body is done.
pub fn gen_function<'a>(
    compiler: &mut Compiler<'a>,
    block: &BlockExpr,
    name: &str,
) -> Result<FunctionValue<'a>, Error> {
    let return_type = compiler.value_type(block.signature.return_type, &block.span)?;

    let mut param_types: Vec<BasicMetadataTypeEnum<'a>> = vec![];
    for param in &block.params {
        param_types.push(compiler.value_type(param.symbol.ty, &param.span)?.into());
    }

    let previous_block = compiler.builder.get_insert_block();
    let function = compiler.create_function(name, return_type.fn_type(&param_types, false));
    let previous_function = compiler.swap_function(Some(function));

    for (index, param) in block.params.iter().enumerate() {
        let Some(value) = function.get_nth_param(index as u32) else {
            return Err(Error::new(
                ErrorImpl::MissingStorage {
                    variable: param.symbol.name.clone(),
                },
                param.span.start.clone(),
            ));
        };
        compiler.set_storage(&param.symbol, Storage::Param { value, owner: function });
    }

    let body = gen_expr_list(compiler, &block.body);
    let result = body.and_then(|value| {
        let value = value.ok_or_else(|| {
            Error::new(
                ErrorImpl::ExpectedValue {
                    construct: "function body".to_string(),
                },
                block.span.start.clone(),
            )
        })?;
        compiler.builder.build_return(Some(&value)).at(&block.span)
    });

    compiler.swap_function(previous_function);
    if let Some(previous_block) = previous_block {
        compiler.builder.position_at_end(previous_block);
    }

    result?;
    debug!("emitted function {} with {} parameters", name, block.params.len());
    Ok(function)
}

/// Value of a branch converted to the `if` type. An empty branch yields
/// the zero value of that type.
fn gen_branch<'a>(compiler: &mut Compiler<'a>, branch: &ExprList, ty: Type, if_expr: &IfExpr) -> Result<BasicValueEnum<'a>, Error> {
    let Some(last) = branch.last() else {
        return compiler.zero_value(ty, &if_expr.span);
    };

    let (init, _) = branch.items.split_at(branch.items.len() - 1);
    for expr in init {
        gen_expression(compiler, expr)?;
    }
    gen_value_as(compiler, last, ty)
}

/// `if` lowers to then/else/merge blocks joined by a phi.
pub fn gen_if<'a>(compiler: &mut Compiler<'a>, if_expr: &IfExpr) -> Result<BasicValueEnum<'a>, Error> {
    let span = &if_expr.span;
    let function = compiler.expect_function(span)?;
    let ty = compiler.value_type(if_expr.ty, span)?;

    let condition = gen_value_as(compiler, &if_expr.condition, Type::Boolean)?;

    let then_block = compiler.create_basic_block("then", function);
    let else_block = compiler.create_basic_block("else", function);
    let merge_block = compiler.create_basic_block("merge", function);

    compiler
        .builder
        .build_conditional_branch(condition.into_int_value(), then_block, else_block)
        .at(span)?;

    compiler.builder.position_at_end(then_block);
    let then_value = gen_branch(compiler, &if_expr.then_branch, if_expr.ty, if_expr)?;
    let then_end = compiler.builder.get_insert_block().unwrap_or(then_block);
    compiler.builder.build_unconditional_branch(merge_block).at(span)?;

    compiler.builder.position_at_end(else_block);
    let else_value = gen_branch(compiler, &if_expr.else_branch, if_expr.ty, if_expr)?;
    let else_end = compiler.builder.get_insert_block().unwrap_or(else_block);
    compiler.builder.build_unconditional_branch(merge_block).at(span)?;

    compiler.builder.position_at_end(merge_block);
    let phi = compiler.builder.build_phi(ty, "ifval").at(span)?;
    phi.add_incoming(&[(&then_value, then_end), (&else_value, else_end)]);

    Ok(phi.as_basic_value())
}
