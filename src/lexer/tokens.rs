use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Invalid,

    Integer,
    Float,
    Identifier,

    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Semicolon,
    Colon,
    Comma,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    True,
    False,
    If,
    Else,
}

impl TokenKind {
    /// How the token is spelled in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::EOF => "end of input",
            TokenKind::Invalid => "invalid token",
            TokenKind::Integer => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::Identifier => "identifier",
            TokenKind::OpenCurly => "'{'",
            TokenKind::CloseCurly => "'}'",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::Assignment => "'='",
            TokenKind::Equals => "'=='",
            TokenKind::Less => "'<'",
            TokenKind::LessEquals => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEquals => "'>='",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Plus => "'+'",
            TokenKind::Dash => "'-'",
            TokenKind::Slash => "'/'",
            TokenKind::Star => "'*'",
            TokenKind::Percent => "'%'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Decoded payload of a numeric literal token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token, or the name for identifiers.
    pub value: String,
    pub literal: Option<Literal>,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }

    pub fn integer_value(&self) -> Option<i64> {
        match self.literal {
            Some(Literal::Integer(value)) => Some(value),
            _ => None,
        }
    }

    pub fn float_value(&self) -> Option<f64> {
        match self.literal {
            Some(Literal::Float(value)) => Some(value),
            _ => None,
        }
    }

    /// Text used when this token shows up as the "got" half of a diagnostic.
    pub fn describe(&self) -> String {
        if self.is_one_of_many(&[
            TokenKind::Identifier,
            TokenKind::Integer,
            TokenKind::Float,
            TokenKind::Invalid,
        ]) {
            self.value.clone()
        } else {
            self.kind.describe().to_string()
        }
    }
}
