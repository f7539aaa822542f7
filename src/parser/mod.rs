//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into a typed Abstract Syntax Tree. It uses precedence climbing for
//! expressions and handles:
//!
//! - Declarations, with optional type annotations
//! - Binary and unary operators, calls, literals and grouping
//! - Function literals with parameter lists
//! - `if`/`else` expressions
//!
//! Name resolution and type checking happen as each node is built, so a
//! successful parse always yields a well typed tree.

pub mod expr;
pub mod lookups;
pub mod parser;

#[cfg(test)]
mod tests;
