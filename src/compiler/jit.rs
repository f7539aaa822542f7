//! In-process execution of a compiled module.

use std::fmt::Display;

use inkwell::{
    targets::{InitializationConfig, Target},
    OptimizationLevel,
};
use log::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    type_checker::types::Type,
    Position,
};

use super::compiler::Compiled;

/// Result of running the entry function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{:?}", value),
            Value::Boolean(value) => write!(f, "{}", value),
        }
    }
}

fn backend_error(message: impl ToString) -> Error {
    Error::new(
        ErrorImpl::Backend {
            message: message.to_string(),
        },
        Position::null(),
    )
}

type EntryFn<T> = unsafe extern "C" fn() -> T;

/// JIT compiles the module and calls its entry function.
///
/// A module can be handed to one execution engine only, so each
/// [`Compiled`] can be run once.
pub fn run_entry(compiled: &Compiled) -> Result<Value, Error> {
    Target::initialize_native(&InitializationConfig::default()).map_err(backend_error)?;

    let engine = compiled
        .module
        .create_jit_execution_engine(OptimizationLevel::None)
        .map_err(|message| backend_error(message.to_string()))?;

    let name = compiled.entry_name.as_str();
    debug!("running {} returning {}", name, compiled.return_type);

    // SAFETY: the entry function takes no arguments and its LLVM return
    // type is the one matched here: i64, double or zeroext i1.
    unsafe {
        match compiled.return_type {
            Type::Integer => {
                let function = engine
                    .get_function::<EntryFn<i64>>(name)
                    .map_err(|error| backend_error(format!("{:?}", error)))?;
                Ok(Value::Integer(function.call()))
            }
            Type::Float => {
                let function = engine
                    .get_function::<EntryFn<f64>>(name)
                    .map_err(|error| backend_error(format!("{:?}", error)))?;
                Ok(Value::Float(function.call()))
            }
            Type::Boolean => {
                let function = engine
                    .get_function::<EntryFn<bool>>(name)
                    .map_err(|error| backend_error(format!("{:?}", error)))?;
                Ok(Value::Boolean(function.call()))
            }
            Type::Function => Err(Error::new(
                ErrorImpl::InvalidEntryType {
                    found: Type::Function.to_string(),
                },
                Position::null(),
            )),
        }
    }
}
