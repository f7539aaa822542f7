use std::rc::Rc;

use crate::{
    ast::{
        ast::{Expr, ExprList, FunParam, UnaryOp},
        expressions,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    type_checker::symbols::{self, ScopeRef},
    Span,
};

use super::{
    lookups::{binary_operator, BindingPower},
    parser::{parse_expr_list, Parser},
};

/// Precedence climbing: parse a primary, then fold in every binary
/// operator binding at least as tightly as `min_bp`.
pub fn parse_expr(parser: &mut Parser, min_bp: u8) -> Result<Expr, Error> {
    let token = parser.current_token();
    let token_kind = token.kind;

    if token_kind == TokenKind::Invalid {
        return Err(Error::new(
            ErrorImpl::UnrecognisedToken {
                token: token.value.clone(),
            },
            token.span.start.clone(),
        ));
    }

    let Some(nud_fn) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                expected: "expression".to_string(),
                received: token.describe(),
            },
            token.span.start.clone(),
        ));
    };

    let mut left = nud_fn(parser)?;

    loop {
        let token_kind = parser.current_token_kind();
        let bp = parser
            .get_bp_lookup()
            .get(&token_kind)
            .copied()
            .unwrap_or(BindingPower::Default);

        if bp == BindingPower::Default || bp.level() < min_bp {
            break;
        }

        let Some(led_fn) = parser.get_led_lookup().get(&token_kind).copied() else {
            break;
        };
        left = led_fn(parser, left, bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();

    match token.kind {
        TokenKind::Integer => {
            let value = token.integer_value().ok_or_else(|| number_error(&token.value, &token.span))?;
            Ok(expressions::const_int(value, token.span))
        }
        TokenKind::Float => {
            let value = token.float_value().ok_or_else(|| number_error(&token.value, &token.span))?;
            Ok(expressions::const_float(value, token.span))
        }
        TokenKind::True => Ok(expressions::const_bool(true, token.span)),
        TokenKind::False => Ok(expressions::const_bool(false, token.span)),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                expected: "literal".to_string(),
                received: token.describe(),
            },
            token.span.start,
        )),
    }
}

fn number_error(value: &str, span: &Span) -> Error {
    Error::new(
        ErrorImpl::NumberParseError {
            token: value.to_string(),
        },
        span.start.clone(),
    )
}

/// An identifier starts a call (`f(...)`), a declaration (`x = ...` or
/// `x: Type = ...`) or a plain reference.
pub fn parse_symbol_expr(parser: &mut Parser) -> Result<Expr, Error> {
    match parser.peek_kind(1) {
        TokenKind::OpenParen => parse_call_expr(parser),
        TokenKind::Assignment | TokenKind::Colon => parse_var_decl_expr(parser),
        _ => {
            let token = parser.advance().clone();
            expressions::ident(parser.scope(), &token.value, token.span)
        }
    }
}

pub fn parse_call_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let name = parser.expect(TokenKind::Identifier)?;
    parser.expect(TokenKind::OpenParen)?;

    let mut args = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Default.level())?);

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect_error(TokenKind::Comma, Some("',' or ')'"))?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let span = parser.span_from(name.span.start.clone());
    expressions::fun_call(parser.registry(), parser.scope(), &name.value, args, span)
}

/// The value is parsed before the name is declared.
pub fn parse_var_decl_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let name = parser.expect(TokenKind::Identifier)?;

    let annotation = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        let type_name = parser.expect_error(TokenKind::Identifier, Some("type name"))?;
        Some(
            parser
                .registry()
                .resolve(&type_name.value, type_name.span.start.clone())?,
        )
    } else {
        None
    };

    parser.expect(TokenKind::Assignment)?;
    let value = parse_expr(parser, BindingPower::Default.level())?;

    let span = parser.span_from(name.span.start.clone());
    expressions::var_decl(
        parser.registry(),
        parser.scope(),
        &name.value,
        annotation,
        value,
        span,
    )
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let Some(op) = binary_operator(operator_token.kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                expected: "operator".to_string(),
                received: operator_token.describe(),
            },
            operator_token.span.start,
        ));
    };

    // Left associative: the right operand only takes tighter operators.
    let right = parse_expr(parser, bp.level() + 1)?;

    let span = Span {
        start: left.span().start.clone(),
        end: right.span().end.clone(),
    };
    expressions::bin_op(parser.registry(), op, left, right, span)
}

/// Negation takes in additive and multiplicative operators, so `-2+3` is
/// `-(2+3)`.
pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.expect(TokenKind::Dash)?;
    let operand = parse_expr(parser, BindingPower::Additive.level())?;

    let span = Span {
        start: operator_token.span.start,
        end: operand.span().end.clone(),
    };
    expressions::unary_op(UnaryOp::Negate, operand, span)
}

/// `(` opens a parameter list when followed by `name:` or by `) {`,
/// otherwise it groups an expression.
fn starts_param_list(parser: &Parser, allow_empty: bool) -> bool {
    match (parser.peek_kind(1), parser.peek_kind(2)) {
        (TokenKind::Identifier, TokenKind::Colon) => true,
        (TokenKind::CloseParen, TokenKind::OpenCurly) => true,
        (TokenKind::CloseParen, _) => allow_empty,
        _ => false,
    }
}

pub fn parse_paren_expr(parser: &mut Parser) -> Result<Expr, Error> {
    if starts_param_list(parser, false) {
        return parse_params_first_literal(parser);
    }

    parser.expect(TokenKind::OpenParen)?;
    let expr = parse_expr(parser, BindingPower::Default.level())?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// `(name: Type, ...)`, declared into the current (function) scope.
fn parse_params(parser: &mut Parser) -> Result<Vec<FunParam>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        let name = parser.expect_error(TokenKind::Identifier, Some("parameter name"))?;
        parser.expect(TokenKind::Colon)?;
        let type_name = parser.expect_error(TokenKind::Identifier, Some("type name"))?;
        let ty = parser
            .registry()
            .resolve(&type_name.value, type_name.span.start.clone())?;

        let span = parser.span_from(name.span.start.clone());
        params.push(expressions::fun_param(parser.scope(), &name.value, ty, span)?);

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect_error(TokenKind::Comma, Some("',' or ')'"))?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(params)
}

/// Runs `parse_fn` with `scope` as the current scope, restoring the
/// enclosing scope afterwards whether or not it succeeded.
fn within_scope<T>(
    parser: &mut Parser,
    scope: &ScopeRef,
    parse_fn: impl FnOnce(&mut Parser) -> Result<T, Error>,
) -> Result<T, Error> {
    let previous = parser.swap_scope(Rc::clone(scope));
    let result = parse_fn(parser);
    parser.swap_scope(previous);
    result
}

/// `{ body }` parsed into a fresh list over `scope`, braces included.
fn parse_braced_list(parser: &mut Parser, scope: &ScopeRef) -> Result<ExprList, Error> {
    parser.expect(TokenKind::OpenCurly)?;
    let mut list = ExprList::new(Rc::clone(scope));
    within_scope(parser, scope, |parser| {
        parse_expr_list(parser, &mut list, TokenKind::CloseCurly)
    })?;
    parser.expect(TokenKind::CloseCurly)?;
    Ok(list)
}

/// `{ (x: Integer) body; }`, or `{ body; }` with no parameters.
pub fn parse_function_literal(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.get_position();
    let scope = symbols::create_function_scope(parser.scope());

    parser.expect(TokenKind::OpenCurly)?;

    let body = within_scope(parser, &scope, |parser| {
        let params = if parser.current_token_kind() == TokenKind::OpenParen
            && starts_param_list(parser, true)
        {
            parse_params(parser)?
        } else {
            vec![]
        };

        let mut body = ExprList::new(Rc::clone(parser.scope()));
        parse_expr_list(parser, &mut body, TokenKind::CloseCurly)?;
        Ok((params, body))
    });
    let (params, body) = body?;

    parser.expect(TokenKind::CloseCurly)?;

    let span = parser.span_from(start);
    expressions::block(params, scope, body, span)
}

/// `(x: Integer) { body; }`
pub fn parse_params_first_literal(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.get_position();
    let scope = symbols::create_function_scope(parser.scope());

    let params = within_scope(parser, &scope, parse_params)?;
    let body = parse_braced_list(parser, &scope)?;

    let span = parser.span_from(start);
    expressions::block(params, scope, body, span)
}

/// `if cond { ... } else { ... }`; each branch gets its own scope and
/// `else if` chains nest into the else branch.
pub fn parse_if_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::If)?.span.start;
    let condition = parse_expr(parser, BindingPower::Default.level())?;

    let then_scope = symbols::create_child(parser.scope());
    let then_branch = parse_braced_list(parser, &then_scope)?;

    let else_scope = symbols::create_child(parser.scope());
    let else_branch = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();

        if parser.current_token_kind() == TokenKind::If {
            let mut list = ExprList::new(Rc::clone(&else_scope));
            let nested = within_scope(parser, &else_scope, parse_if_expr)?;
            list.push(nested);
            list
        } else {
            parse_braced_list(parser, &else_scope)?
        }
    } else {
        ExprList::new(else_scope)
    };

    let span = parser.span_from(start);
    expressions::if_expr(parser.registry(), condition, then_branch, else_branch, span)
}
