//! Code generation module for the compiler.
//!
//! This module contains the LLVM-based code generator that lowers the
//! typed AST into LLVM IR. It handles:
//!
//! - Literals, variables, operators and calls
//! - Function literals as LLVM functions and `if` as a phi join
//! - Conversions between the built-in types
//! - Module verification and JIT execution of the entry function

pub mod block;
pub mod compiler;
pub mod expr;
pub mod jit;
