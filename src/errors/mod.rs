//! Error types and error handling for the compiler.
//!
//! Every stage fails fast with a single [`errors::Error`] that carries:
//!
//! - The source position where the failure was detected
//! - The specific cause ([`errors::ErrorImpl`])
//! - A classification into lex, parse, symbol, type or codegen errors
//! - A human readable suggestion for the diagnostic printer

pub mod errors;
