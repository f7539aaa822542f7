#![allow(clippy::module_inception)]

use std::rc::Rc;

use inkwell::context::Context;

use crate::{
    ast::ast::ExprList,
    compiler::compiler::{compile, Compiled, CompilerOptions},
    errors::errors::{Error, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse_program,
};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

/// Byte offset into a source, with the name of the file it came from.
#[derive(Debug, Clone)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }
}

/// Tokenizes and parses `source` into a typed program.
///
/// `file` names the source in positions; `shell` is used when absent.
pub fn parse_source(source: &str, file: Option<String>) -> Result<ExprList, Error> {
    let file_name = Rc::new(file.clone().unwrap_or_else(|| String::from("shell")));
    let tokens = tokenize(source.to_string(), file)?;
    parse_program(tokens, file_name)
}

/// The whole pipeline: source text to a verified LLVM module.
pub fn compile_source<'a>(
    source: &str,
    file: Option<String>,
    context: &'a Context,
    options: CompilerOptions,
) -> Result<Compiled<'a>, Error> {
    let program = parse_source(source, file)?;
    compile(&program, context, options)
}

/// Line number (1-based), line text and offset within the line of the
/// byte `position` in `content`. The end of input maps to the end of the
/// last line.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > content.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;
    let mut last_line = (1, String::new(), 0);

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            let line_pos = pos - start;
            return Some((line_number, line.to_string(), line_pos));
        }

        last_line = (line_number, line.to_string(), line.trim_end_matches('\n').len());
        start = end;
        line_number += 1;
    }

    Some(last_line)
}

/// Renders a diagnostic for `error` against the source it came from.
///
/// ```text
/// TypeError: TypeMatchError (Expected type `Float`, received `Integer`)
/// -> final.lang
///    |
/// 20 | a: Float = 1;
///    | -----------^
/// ```
pub fn format_error(error: &Error, source: &str) -> String {
    let position = error.get_position();

    let mut output = if let ErrorTip::None = error.get_tip() {
        format!("{}: {}\n", error.get_kind(), error.get_error_name())
    } else {
        format!(
            "{}: {} ({})\n",
            error.get_kind(),
            error.get_error_name(),
            error.get_tip()
        )
    };
    output.push_str(&format!("-> {}\n", position.1));

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        output.push_str(&format!("   {}\n", error));
        return output;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    output.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    output.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    output.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    output
}

/// Prints [`format_error`] to standard error.
pub fn display_error(error: &Error, source: &str) {
    eprint!("{}", format_error(error, source));
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let trimmed = string.trim_start();
    (String::from(trimmed), string.len() - trimmed.len())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::errors::errors::{Error, ErrorImpl};
    use crate::Position;

    const SOURCE: &str = "Hello, world!\n\nfoo\n    Testing { }\n";

    #[test]
    fn test_get_line_at_position() {
        let (line_number, line, line_pos) = super::get_line_at_position(SOURCE, 10).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = super::get_line_at_position(SOURCE, 31).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "    Testing { }\n");
        assert_eq!(line_pos, 12);
    }

    #[test]
    fn test_get_line_at_end_of_input() {
        let (line_number, line, line_pos) = super::get_line_at_position("x = 1 +", 7).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "x = 1 +");
        assert_eq!(line_pos, 7);

        assert!(super::get_line_at_position("x", 5).is_none());
    }

    #[test]
    fn test_format_error() {
        let error = Error::new(
            ErrorImpl::UnrecognisedToken {
                token: "@".to_string(),
            },
            Position(13, Rc::new("test.lang".to_string())),
        );

        let rendered = super::format_error(&error, "x = 1;\n  y = @;\n");
        assert_eq!(
            rendered,
            "LexError: UnrecognisedToken\n-> test.lang\n  |\n2 | y = @;\n  | ----^\n"
        );
    }
}
