use std::{collections::HashMap, fmt::Display};

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

/// Built-in types of the language.
///
/// Types are plain values compared by name identity; the registry only
/// hands out these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    Float,
    Boolean,
    Function,
}

impl Type {
    pub fn name(&self) -> &'static str {
        match self {
            Type::Integer => "Integer",
            Type::Float => "Float",
            Type::Boolean => "Boolean",
            Type::Function => "Function",
        }
    }

    /// Primitive types have a backend value representation.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Type::Function)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Float)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a value of one type becomes a value of another.
///
/// The code generator turns each plan into backend instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Identity,
    IntToFloat,
    FloatToInt,
    BoolToInt,
    IntToBool,
    /// Goes through Integer.
    BoolToFloat,
    /// Goes through Integer.
    FloatToBool,
}

#[derive(Debug)]
pub struct TypeRegistry {
    types: HashMap<&'static str, Type>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut types = HashMap::new();
        for ty in [Type::Integer, Type::Float, Type::Boolean, Type::Function] {
            types.insert(ty.name(), ty);
        }

        TypeRegistry { types }
    }

    pub fn get(&self, name: &str) -> Option<Type> {
        self.types.get(name).copied()
    }

    /// Looks up a type annotation, failing with `UnknownType`.
    pub fn resolve(&self, name: &str, position: Position) -> Result<Type, Error> {
        self.get(name).ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownType {
                    type_: name.to_string(),
                },
                position,
            )
        })
    }

    pub fn equals(&self, a: Type, b: Type) -> bool {
        a.name() == b.name()
    }

    /// The conversion plan from `from` to `to`, or `None` when the pair is
    /// not convertible. Function never converts, not even to itself.
    pub fn conversion(&self, from: Type, to: Type) -> Option<Conversion> {
        match (from, to) {
            (Type::Function, _) | (_, Type::Function) => None,
            (from, to) if self.equals(from, to) => Some(Conversion::Identity),
            (Type::Integer, Type::Float) => Some(Conversion::IntToFloat),
            (Type::Float, Type::Integer) => Some(Conversion::FloatToInt),
            (Type::Boolean, Type::Integer) => Some(Conversion::BoolToInt),
            (Type::Integer, Type::Boolean) => Some(Conversion::IntToBool),
            (Type::Boolean, Type::Float) => Some(Conversion::BoolToFloat),
            (Type::Float, Type::Boolean) => Some(Conversion::FloatToBool),
            _ => None,
        }
    }

    pub fn can_convert(&self, from: Type, to: Type) -> bool {
        self.conversion(from, to).is_some()
    }

    /// Result type of combining two operands: identical types stay as they
    /// are, an Integer/Float mix becomes Float. Everything else is `None`.
    pub fn unify(&self, left: Type, right: Type) -> Option<Type> {
        match (left, right) {
            (Type::Function, _) | (_, Type::Function) => None,
            (left, right) if self.equals(left, right) => Some(left),
            (Type::Integer, Type::Float) | (Type::Float, Type::Integer) => Some(Type::Float),
            _ => None,
        }
    }
}
