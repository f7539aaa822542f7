//! `exprc`, the command line driver.
//!
//! Reads a program from a file or standard input, compiles it and runs the
//! entry function, printing its value.

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use exprlang::{
    ast::printer::print_expr_list,
    compiler::{
        compiler::{compile, CompilerOptions},
        jit::run_entry,
    },
    display_error,
    errors::errors::Error,
    parse_source,
};
use inkwell::context::Context;
use log::info;

#[derive(Parser)]
#[command(name = "exprc")]
#[command(about = "Compile and run an expression language program", long_about = None)]
struct Cli {
    /// Source file, standard input when omitted
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print the typed tree as S-expressions
    #[arg(long)]
    emit_ast: bool,

    /// Print the generated LLVM IR
    #[arg(long)]
    emit_ir: bool,

    /// Compile only, do not run the entry function
    #[arg(long)]
    no_run: bool,

    /// Skip the LLVM module verifier
    #[arg(long)]
    no_verify: bool,

    /// Name of the LLVM module
    #[arg(long, default_value = "exprlang")]
    module_name: String,

    /// Name of the generated entry function
    #[arg(long, default_value = "main")]
    entry: String,
}

fn read_source(input: &Option<PathBuf>) -> io::Result<(String, Option<String>)> {
    match input {
        Some(path) => {
            let source = fs::read_to_string(path)?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string());
            Ok((source, file_name))
        }
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok((source, None))
        }
    }
}

fn run(cli: &Cli, source: &str, file_name: Option<String>) -> Result<(), Error> {
    let start = Instant::now();
    let program = parse_source(source, file_name)?;
    info!("Parsed in {:?}", start.elapsed());

    if cli.emit_ast {
        println!("{}", print_expr_list(&program));
    }

    let options = CompilerOptions {
        module_name: cli.module_name.clone(),
        entry_name: cli.entry.clone(),
        verify: !cli.no_verify,
    };

    let context = Context::create();
    let compile_start = Instant::now();
    let compiled = compile(&program, &context, options)?;
    info!("Compiled in {:?}", compile_start.elapsed());

    if cli.emit_ir {
        print!("{}", compiled.print_ir());
    }

    if !cli.no_run {
        let value = run_entry(&compiled)?;
        println!("{}", value);
    }

    info!("Total time: {:?}", start.elapsed());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let (source, file_name) = match read_source(&cli.input) {
        Ok(input) => input,
        Err(error) => {
            eprintln!("Failed to read input: {}", error);
            return ExitCode::from(2);
        }
    };

    match run(&cli, &source, file_name) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            display_error(&error, &source);
            ExitCode::FAILURE
        }
    }
}
