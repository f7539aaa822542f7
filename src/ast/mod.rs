/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The closed expression enum and its node structs
/// - expressions: Node constructors that bind names and check types inline
/// - printer: Read-only S-expression rendering of a tree
pub mod ast;
pub mod expressions;
pub mod printer;

#[cfg(test)]
mod tests;
