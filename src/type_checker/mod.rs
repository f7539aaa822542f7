//! Type system and symbol table.
//!
//! - [`types`] holds the four built-in types, their pairwise conversion
//!   plans and the operand unification rule
//! - [`symbols`] is the scope chain used while parsing to bind names
//!
//! Both are consulted by the AST constructors so that every node is typed
//! and resolved at the moment it is built.

pub mod symbols;
pub mod types;
