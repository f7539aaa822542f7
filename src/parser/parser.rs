//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the program entry point.
//! Expressions are parsed by precedence climbing driven by lookup tables:
//!
//! - NUD (null denotation) handlers for tokens that start an expression
//! - LED (left denotation) handlers for binary operators
//! - Binding powers for operator precedence
//!
//! Names and types are resolved while parsing: the parser owns the type
//! registry and the current scope, and every node is built through the
//! checking constructors in [`crate::ast::expressions`].

use std::{collections::HashMap, rc::Rc};

use log::trace;

use crate::{
    ast::{ast::ExprList, printer::print_expr},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    type_checker::{
        symbols::{self, ScopeRef},
        types::TypeRegistry,
    },
    Position, Span,
};

use super::{
    expr::parse_expr,
    lookups::{create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup},
};

/// The main parser structure that maintains parsing state.
///
/// This struct holds the token stream, the lookup tables for expressions,
/// the type registry and the scope new names are declared in.
pub struct Parser {
    /// The list of tokens to parse, ending with `EOF`
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    registry: TypeRegistry,
    /// Scope that declarations go into
    scope: ScopeRef,
}

impl Parser {
    /// Creates a new Parser instance declaring into `scope`.
    ///
    /// A missing trailing `EOF` token is supplied so the cursor can never
    /// run off the end of the stream.
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>, scope: ScopeRef) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(|| Position(0, Rc::clone(&file)));
            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                literal: None,
                span: Span {
                    start: end.clone(),
                    end,
                },
            });
        }

        Parser {
            tokens,
            pos: 0,
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            registry: TypeRegistry::new(),
            scope,
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Kind of the token `offset` places after the current one.
    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::EOF)
    }

    /// Advances to the next token and returns the previous token.
    ///
    /// The cursor never moves past `EOF`.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Expects a token of the specified kind, with an optional description
    /// of what was expected for the diagnostic.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        expected: Option<&str>,
    ) -> Result<Token, Error> {
        let token = self.current_token();
        if token.kind == TokenKind::Invalid {
            return Err(Error::new(
                ErrorImpl::UnrecognisedToken {
                    token: token.value.clone(),
                },
                token.span.start.clone(),
            ));
        }

        if token.kind != expected_kind {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    expected: expected.unwrap_or(expected_kind.describe()).to_string(),
                    received: token.describe(),
                },
                token.span.start.clone(),
            ));
        }

        Ok(self.advance().clone())
    }

    /// Expects a token of the specified kind with the default message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    /// Makes `scope` current, handing back the one it replaces. Callers
    /// restore the previous scope once the nested construct is parsed.
    pub fn swap_scope(&mut self, scope: ScopeRef) -> ScopeRef {
        std::mem::replace(&mut self.scope, scope)
    }

    /// Returns the current position in the source file.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        let end = if self.pos == 0 {
            start.clone()
        } else {
            self.tokens[self.pos - 1].span.end.clone()
        };
        Span { start, end }
    }
}

/// Parses expressions into `list` until `terminator` is reached, which is
/// left unconsumed.
///
/// Every expression is followed by `;`, except that at the end of the
/// program the last one may run directly into `EOF`.
pub fn parse_expr_list(
    parser: &mut Parser,
    list: &mut ExprList,
    terminator: TokenKind,
) -> Result<(), Error> {
    while parser.current_token_kind() != terminator {
        if parser.current_token_kind() == TokenKind::EOF {
            parser.expect(terminator)?;
        }

        let expr = parse_expr(parser, BindingPower::Default.level())?;
        trace!("parsed {}", print_expr(&expr));
        list.push(expr);

        if terminator == TokenKind::EOF && parser.current_token_kind() == TokenKind::EOF {
            break;
        }
        parser.expect(TokenKind::Semicolon)?;
    }

    Ok(())
}

/// Parses a whole program into an expression list bound to `root_scope`.
///
/// This is the main entry point for parsing. The first malformed or
/// ill-typed construct aborts the parse with its error.
pub fn parse(tokens: Vec<Token>, file: Rc<String>, root_scope: ScopeRef) -> Result<ExprList, Error> {
    let mut parser = Parser::new(tokens, file, Rc::clone(&root_scope));
    create_token_lookups(&mut parser);

    let mut program = ExprList::new(root_scope);
    parse_expr_list(&mut parser, &mut program, TokenKind::EOF)?;

    Ok(program)
}

/// [`parse`] into a fresh root scope.
pub fn parse_program(tokens: Vec<Token>, file: Rc<String>) -> Result<ExprList, Error> {
    parse(tokens, file, symbols::create_root())
}
