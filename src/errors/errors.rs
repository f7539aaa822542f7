use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// A single terminal failure of the pipeline, tagged with the source
/// position where it was detected.
#[derive(Error, Debug, Clone)]
#[error("{internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } | ErrorImpl::NumberParseError { .. } => {
                ErrorKind::Lex
            }
            ErrorImpl::UnexpectedToken { .. } => ErrorKind::Parse,
            ErrorImpl::VariableAlreadyDeclared { .. }
            | ErrorImpl::VariableNotDeclared { .. }
            | ErrorImpl::CapturedLocal { .. } => ErrorKind::Symbol,
            ErrorImpl::UnknownType { .. }
            | ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::IncompatibleOperands { .. }
            | ErrorImpl::ArgumentCountMismatch { .. }
            | ErrorImpl::ArgumentTypeMatchError { .. }
            | ErrorImpl::NotAFunction { .. }
            | ErrorImpl::InvalidAssignmentTarget { .. }
            | ErrorImpl::ExpectedValue { .. } => ErrorKind::Type,
            ErrorImpl::MissingStorage { .. }
            | ErrorImpl::InvalidEntryType { .. }
            | ErrorImpl::Backend { .. }
            | ErrorImpl::Verification { .. } => ErrorKind::Codegen,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::IncompatibleOperands { .. } => "IncompatibleOperands",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::InvalidAssignmentTarget { .. } => "InvalidAssignmentTarget",
            ErrorImpl::ExpectedValue { .. } => "ExpectedValue",
            ErrorImpl::MissingStorage { .. } => "MissingStorage",
            ErrorImpl::CapturedLocal { .. } => "CapturedLocal",
            ErrorImpl::InvalidEntryType { .. } => "InvalidEntryType",
            ErrorImpl::Backend { .. } => "BackendError",
            ErrorImpl::Verification { .. } => "VerificationError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnexpectedToken { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {}, got `{}`",
                expected, received
            )),
            ErrorImpl::VariableAlreadyDeclared { variable } => ErrorTip::Suggestion(format!(
                "`{}` is already declared in this scope, declare it in a nested block to shadow it",
                variable
            )),
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("`{}` is not declared in any enclosing scope", variable))
            }
            ErrorImpl::UnknownType { type_ } => ErrorTip::Suggestion(format!(
                "Unknown type `{}`, expected one of Integer, Float, Boolean, Function",
                type_
            )),
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::IncompatibleOperands {
                operator,
                left,
                right,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` cannot combine `{}` and `{}`",
                operator, left, right
            )),
            ErrorImpl::ArgumentCountMismatch {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` expects {} arguments, received {}",
                function, expected, received
            )),
            ErrorImpl::ArgumentTypeMatchError { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::NotAFunction { name, type_ } => ErrorTip::Suggestion(format!(
                "`{}` has type `{}` and cannot be called",
                name, type_
            )),
            ErrorImpl::InvalidAssignmentTarget { target } => ErrorTip::Suggestion(format!(
                "Only declared variables can be assigned to, found {}",
                target
            )),
            ErrorImpl::ExpectedValue { construct } => {
                ErrorTip::Suggestion(format!("{} must produce a value", construct))
            }
            ErrorImpl::MissingStorage { variable } => ErrorTip::Suggestion(format!(
                "`{}` was used before its declaration was emitted",
                variable
            )),
            ErrorImpl::CapturedLocal { variable } => ErrorTip::Suggestion(format!(
                "`{}` belongs to an enclosing function, only top-level bindings can be read from nested functions",
                variable
            )),
            ErrorImpl::InvalidEntryType { found } => ErrorTip::Suggestion(format!(
                "The last expression of the program is {}, end it with an Integer, Float or Boolean value",
                found
            )),
            ErrorImpl::Backend { .. } | ErrorImpl::Verification { .. } => ErrorTip::None,
        }
    }
}

/// The subsystem that rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Symbol,
    Type,
    Codegen,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Lex => write!(f, "LexError"),
            ErrorKind::Parse => write!(f, "ParseError"),
            ErrorKind::Symbol => write!(f, "SymbolError"),
            ErrorKind::Type => write!(f, "TypeError"),
            ErrorKind::Codegen => write!(f, "CodegenError"),
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("expected {expected}, got {received:?}")]
    UnexpectedToken { expected: String, received: String },
    #[error("variable {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMatchError { expected: String, received: String },
    #[error("operator {operator:?} cannot be applied to {left:?} and {right:?}")]
    IncompatibleOperands {
        operator: String,
        left: String,
        right: String,
    },
    #[error("{function:?} expects {expected} arguments, received {received}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("argument types do not match: expected {expected:?}, received {received:?}")]
    ArgumentTypeMatchError { expected: String, received: String },
    #[error("{name:?} of type {type_:?} is not a function")]
    NotAFunction { name: String, type_: String },
    #[error("cannot assign to {target}")]
    InvalidAssignmentTarget { target: String },
    #[error("{construct} does not produce a value")]
    ExpectedValue { construct: String },
    #[error("no storage recorded for {variable:?}")]
    MissingStorage { variable: String },
    #[error("{variable:?} is local to an enclosing function")]
    CapturedLocal { variable: String },
    #[error("program cannot return {found}")]
    InvalidEntryType { found: String },
    #[error("backend error: {message}")]
    Backend { message: String },
    #[error("module verification failed: {message}")]
    Verification { message: String },
}
