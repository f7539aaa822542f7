//! Main compiler module.
//!
//! This module contains the core Compiler structure and the entry point
//! that lowers a typed program to an LLVM module. It manages the LLVM
//! context, module and builder, type conversion, and the storage table
//! binding every symbol to its backend location.

use std::collections::HashMap;

use inkwell::{
    attributes::{Attribute, AttributeLoc},
    basic_block::BasicBlock,
    builder::{Builder, BuilderError},
    context::Context,
    module::{Linkage, Module},
    types::{BasicType, BasicTypeEnum, FunctionType},
    values::{BasicValueEnum, FunctionValue, GlobalValue, PointerValue},
    AddressSpace, IntPredicate,
};
use log::debug;

use crate::{
    ast::ast::ExprList,
    errors::errors::{Error, ErrorImpl},
    type_checker::{
        symbols::{Symbol, SymbolId},
        types::{Conversion, Type, TypeRegistry},
    },
    Position, Span,
};

use super::block::gen_expr_list;

/// Settings for one compilation.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Name of the LLVM module
    pub module_name: String,
    /// Name of the function the program body is emitted into
    pub entry_name: String,
    /// Run the LLVM verifier on the finished module
    pub verify: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            module_name: String::from("exprlang"),
            entry_name: String::from("main"),
            verify: true,
        }
    }
}

/// Where the value of a symbol lives in the generated code.
#[derive(Debug, Clone, Copy)]
pub enum Storage<'a> {
    /// Root scope variable, a zero initialised module global
    Global(GlobalValue<'a>),
    /// Stack slot in the entry block of `owner`
    Slot {
        pointer: PointerValue<'a>,
        owner: FunctionValue<'a>,
    },
    /// Parameter value of `owner`
    Param {
        value: BasicValueEnum<'a>,
        owner: FunctionValue<'a>,
    },
    Function(FunctionValue<'a>),
}

/// A verified module together with its entry function.
pub struct Compiled<'a> {
    pub module: Module<'a>,
    pub entry_name: String,
    /// Type of the value the entry function returns
    pub return_type: Type,
}

impl<'a> Compiled<'a> {
    /// Textual LLVM IR of the module.
    pub fn print_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }
}

/// Maps inkwell builder failures to a codegen error at a node.
pub trait BuilderResultExt<T> {
    fn at(self, span: &Span) -> Result<T, Error>;
}

impl<T> BuilderResultExt<T> for Result<T, BuilderError> {
    fn at(self, span: &Span) -> Result<T, Error> {
        self.map_err(|error| {
            Error::new(
                ErrorImpl::Backend {
                    message: error.to_string(),
                },
                span.start.clone(),
            )
        })
    }
}

fn no_value_representation(ty: Type, span: &Span) -> Error {
    Error::new(
        ErrorImpl::Backend {
            message: format!("{} has no value representation", ty),
        },
        span.start.clone(),
    )
}

/// The main compiler structure that holds the state of code generation.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the LLVM context
pub struct Compiler<'a> {
    /// Reference to the LLVM context
    pub context: &'a Context,
    /// The LLVM module being built
    pub module: Module<'a>,
    /// The LLVM IR builder
    pub builder: Builder<'a>,
    pub registry: TypeRegistry,
    pub options: CompilerOptions,

    /// Backend location of every symbol emitted so far
    storage: HashMap<SymbolId, Storage<'a>>,
    /// Suffix for the next anonymous function name
    function_counter: usize,
    /// The function instructions are currently emitted into
    current_function: Option<FunctionValue<'a>>,
}

impl<'a> Compiler<'a> {
    pub fn new(context: &'a Context, options: CompilerOptions) -> Self {
        Compiler {
            module: context.create_module(&options.module_name),
            builder: context.create_builder(),
            context,
            registry: TypeRegistry::new(),
            options,
            storage: HashMap::new(),
            function_counter: 0,
            current_function: None,
        }
    }

    /// Converts a language type to its LLVM representation.
    ///
    /// Function has none; functions are LLVM functions, not values.
    pub fn convert_type(&self, ty: Type) -> Option<BasicTypeEnum<'a>> {
        match ty {
            Type::Integer => Some(self.context.i64_type().into()),
            Type::Float => Some(self.context.f64_type().into()),
            Type::Boolean => Some(self.context.bool_type().into()),
            Type::Function => None,
        }
    }

    /// Like [`Compiler::convert_type`], failing for Function at `span`.
    pub fn value_type(&self, ty: Type, span: &Span) -> Result<BasicTypeEnum<'a>, Error> {
        self.convert_type(ty)
            .ok_or_else(|| no_value_representation(ty, span))
    }

    /// `0`, `0.0` or `false`.
    pub fn zero_value(&self, ty: Type, span: &Span) -> Result<BasicValueEnum<'a>, Error> {
        match ty {
            Type::Integer => Ok(self.context.i64_type().const_zero().into()),
            Type::Float => Ok(self.context.f64_type().const_zero().into()),
            Type::Boolean => Ok(self.context.bool_type().const_zero().into()),
            Type::Function => Err(no_value_representation(ty, span)),
        }
    }

    /// Emits the conversion of `value` from `from` to `to`.
    pub fn cast(
        &self,
        value: BasicValueEnum<'a>,
        from: Type,
        to: Type,
        span: &Span,
    ) -> Result<BasicValueEnum<'a>, Error> {
        let Some(conversion) = self.registry.conversion(from, to) else {
            return Err(Error::new(
                ErrorImpl::TypeMatchError {
                    expected: to.to_string(),
                    received: from.to_string(),
                },
                span.start.clone(),
            ));
        };

        let i64_type = self.context.i64_type();
        let f64_type = self.context.f64_type();

        let converted: BasicValueEnum<'a> = match conversion {
            Conversion::Identity => value,
            Conversion::IntToFloat => self
                .builder
                .build_signed_int_to_float(value.into_int_value(), f64_type, "itof")
                .at(span)?
                .into(),
            Conversion::FloatToInt => self
                .builder
                .build_float_to_signed_int(value.into_float_value(), i64_type, "ftoi")
                .at(span)?
                .into(),
            Conversion::BoolToInt => self
                .builder
                .build_int_z_extend(value.into_int_value(), i64_type, "btoi")
                .at(span)?
                .into(),
            Conversion::IntToBool => self
                .builder
                .build_int_compare(
                    IntPredicate::NE,
                    value.into_int_value(),
                    i64_type.const_zero(),
                    "itob",
                )
                .at(span)?
                .into(),
            Conversion::BoolToFloat => {
                let int = self
                    .builder
                    .build_int_z_extend(value.into_int_value(), i64_type, "btoi")
                    .at(span)?;
                self.builder
                    .build_signed_int_to_float(int, f64_type, "itof")
                    .at(span)?
                    .into()
            }
            Conversion::FloatToBool => {
                let int = self
                    .builder
                    .build_float_to_signed_int(value.into_float_value(), i64_type, "ftoi")
                    .at(span)?;
                self.builder
                    .build_int_compare(IntPredicate::NE, int, i64_type.const_zero(), "itob")
                    .at(span)?
                    .into()
            }
        };

        Ok(converted)
    }

    pub fn set_storage(&mut self, symbol: &Symbol, storage: Storage<'a>) {
        self.storage.insert(symbol.id, storage);
    }

    pub fn get_storage(&self, symbol: &Symbol, span: &Span) -> Result<Storage<'a>, Error> {
        self.storage.get(&symbol.id).copied().ok_or_else(|| {
            Error::new(
                ErrorImpl::MissingStorage {
                    variable: symbol.name.clone(),
                },
                span.start.clone(),
            )
        })
    }

    pub fn current_function(&self) -> Option<FunctionValue<'a>> {
        self.current_function
    }

    /// Makes `function` current, handing back the previous one.
    pub fn swap_function(&mut self, function: Option<FunctionValue<'a>>) -> Option<FunctionValue<'a>> {
        std::mem::replace(&mut self.current_function, function)
    }

    /// The function the builder is in, as an error when there is none.
    pub fn expect_function(&self, span: &Span) -> Result<FunctionValue<'a>, Error> {
        self.current_function.ok_or_else(|| {
            Error::new(
                ErrorImpl::Backend {
                    message: "no function is being emitted".to_string(),
                },
                span.start.clone(),
            )
        })
    }

    /// Name for the next function literal not bound by a declaration.
    pub fn next_function_name(&mut self) -> String {
        let name = format!("function{}", self.function_counter);
        self.function_counter += 1;
        name
    }

    /// Creates a new function with an entry block and positions the
    /// builder at its end.
    pub fn create_function(&self, name: &str, function_type: FunctionType<'a>) -> FunctionValue<'a> {
        let function = self
            .module
            .add_function(name, function_type, Some(Linkage::External));

        let entry = self.create_basic_block("entry", function);
        self.builder.position_at_end(entry);

        function.add_attribute(
            AttributeLoc::Function,
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("nounwind"), 0),
        );

        debug!("created function {}", name);
        function
    }

    /// Creates a new basic block in the given function.
    pub fn create_basic_block(&self, name: &str, function: FunctionValue<'a>) -> BasicBlock<'a> {
        self.context.append_basic_block(function, name)
    }

    /// Allocates a stack slot at the top of `function`'s entry block.
    pub fn create_entry_alloca(
        &self,
        function: FunctionValue<'a>,
        ty: BasicTypeEnum<'a>,
        name: &str,
        span: &Span,
    ) -> Result<PointerValue<'a>, Error> {
        let builder = self.context.create_builder();
        let Some(entry) = function.get_first_basic_block() else {
            return Err(Error::new(
                ErrorImpl::Backend {
                    message: format!("function {:?} has no entry block", function.get_name()),
                },
                span.start.clone(),
            ));
        };

        match entry.get_first_instruction() {
            Some(instruction) => builder.position_before(&instruction),
            None => builder.position_at_end(entry),
        }

        builder.build_alloca(ty, name).at(span)
    }

    /// A zero initialised module global for a root scope variable.
    pub fn create_global(&self, ty: Type, name: &str, span: &Span) -> Result<GlobalValue<'a>, Error> {
        let global = self
            .module
            .add_global(self.value_type(ty, span)?, Some(AddressSpace::default()), name);
        global.set_initializer(&self.zero_value(ty, span)?);

        debug!("created global {}", name);
        Ok(global)
    }
}

/// Lowers a parsed program to an LLVM module.
///
/// The program body becomes the entry function named by
/// `options.entry_name`, returning the value of the last expression. The
/// module is verified unless `options.verify` is off.
pub fn compile<'a>(
    program: &ExprList,
    context: &'a Context,
    options: CompilerOptions,
) -> Result<Compiled<'a>, Error> {
    let start = program
        .items
        .first()
        .map(|expr| expr.span().clone())
        .unwrap_or_else(Span::null);

    let return_type = match program.ty {
        Some(ty) if ty.is_primitive() => ty,
        found => {
            return Err(Error::new(
                ErrorImpl::InvalidEntryType {
                    found: found.map_or("empty".to_string(), |ty| ty.to_string()),
                },
                program
                    .last()
                    .map(|expr| expr.span().start.clone())
                    .unwrap_or_else(Position::null),
            ));
        }
    };

    let mut compiler = Compiler::new(context, options);
    let entry_name = compiler.options.entry_name.clone();

    let llvm_return_type = compiler.value_type(return_type, &start)?;
    let entry = compiler.create_function(&entry_name, llvm_return_type.fn_type(&[], false));
    if return_type == Type::Boolean {
        entry.add_attribute(
            AttributeLoc::Return,
            context.create_enum_attribute(Attribute::get_named_enum_kind_id("zeroext"), 0),
        );
    }
    compiler.swap_function(Some(entry));

    let value = gen_expr_list(&mut compiler, program)?.ok_or_else(|| {
        Error::new(
            ErrorImpl::InvalidEntryType {
                found: Type::Function.to_string(),
            },
            start.start.clone(),
        )
    })?;
    compiler.builder.build_return(Some(&value)).at(&start)?;

    if compiler.options.verify {
        compiler.module.verify().map_err(|message| {
            Error::new(
                ErrorImpl::Verification {
                    message: message.to_string(),
                },
                start.start.clone(),
            )
        })?;
    }

    debug!("compiled module {}", compiler.options.module_name);

    Ok(Compiled {
        module: compiler.module,
        entry_name,
        return_type,
    })
}
