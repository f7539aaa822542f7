use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use log::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::types::Type;

/// Unique per compilation; the code generator keys storage by it.
pub type SymbolId = usize;

pub type ScopeRef = Rc<RefCell<Scope>>;

/// Parameter types and return type of a callable symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub return_type: Type,
    pub params: Vec<Type>,
}

impl Signature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub ty: Type,
    /// Set only when the bound value is a function.
    pub signature: Option<Signature>,
    pub is_param: bool,
    /// Declared in the root scope.
    pub is_global: bool,
    /// Depth of the function scope the symbol is local to, 0 for the
    /// program body.
    pub function_depth: usize,
}

impl Symbol {
    /// Whether code in a function at `function_depth` can read the symbol.
    /// Globals and functions are visible everywhere; other values only
    /// inside the function that declares them.
    pub fn is_visible_from(&self, function_depth: usize) -> bool {
        self.is_global || !self.ty.is_primitive() || self.function_depth == function_depth
    }
}

/// A lexical region. The parent link is weak and used for lookup only;
/// the owning AST node keeps each scope alive.
#[derive(Debug)]
pub struct Scope {
    symbols: Vec<Symbol>,
    parent: Option<Weak<RefCell<Scope>>>,
    depth: usize,
    /// Depth of the innermost enclosing function scope
    function_depth: usize,
    next_id: Rc<Cell<SymbolId>>,
}

impl Scope {
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn function_depth(&self) -> usize {
        self.function_depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent(&self) -> Option<ScopeRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| symbol.name == name)
    }
}

pub fn create_root() -> ScopeRef {
    Rc::new(RefCell::new(Scope {
        symbols: vec![],
        parent: None,
        depth: 0,
        function_depth: 0,
        next_id: Rc::new(Cell::new(0)),
    }))
}

fn nested(parent: &ScopeRef, is_function: bool) -> ScopeRef {
    let borrowed = parent.borrow();
    let depth = borrowed.depth + 1;
    debug!("entering scope at depth {} (function: {})", depth, is_function);

    Rc::new(RefCell::new(Scope {
        symbols: vec![],
        parent: Some(Rc::downgrade(parent)),
        depth,
        function_depth: if is_function { depth } else { borrowed.function_depth },
        next_id: Rc::clone(&borrowed.next_id),
    }))
}

/// Block scope inside the current function, such as an `if` branch.
pub fn create_child(parent: &ScopeRef) -> ScopeRef {
    nested(parent, false)
}

/// Scope of a function literal's parameters and body.
pub fn create_function_scope(parent: &ScopeRef) -> ScopeRef {
    nested(parent, true)
}

fn insert(
    scope: &ScopeRef,
    name: &str,
    ty: Type,
    signature: Option<Signature>,
    is_param: bool,
    position: Position,
) -> Result<Symbol, Error> {
    let mut scope = scope.borrow_mut();

    if scope.find(name).is_some() {
        return Err(Error::new(
            ErrorImpl::VariableAlreadyDeclared {
                variable: name.to_string(),
            },
            position,
        ));
    }

    let id = scope.next_id.get();
    scope.next_id.set(id + 1);

    let symbol = Symbol {
        id,
        name: name.to_string(),
        ty,
        signature,
        is_param,
        is_global: scope.is_root(),
        function_depth: scope.function_depth,
    };

    debug!(
        "declared {} #{} : {} at depth {}",
        symbol.name, symbol.id, symbol.ty, scope.depth
    );
    scope.symbols.push(symbol.clone());

    Ok(symbol)
}

/// Declares a value symbol, failing if `name` already exists in this very
/// scope. Outer declarations are shadowed, not rejected.
pub fn declare(
    scope: &ScopeRef,
    name: &str,
    ty: Type,
    is_param: bool,
    position: Position,
) -> Result<Symbol, Error> {
    insert(scope, name, ty, None, is_param, position)
}

/// Declares a Function symbol carrying its signature.
pub fn declare_function(
    scope: &ScopeRef,
    name: &str,
    signature: Signature,
    position: Position,
) -> Result<Symbol, Error> {
    insert(scope, name, Type::Function, Some(signature), false, position)
}

/// Innermost binding of `name`, walking parent scopes.
pub fn lookup(scope: &ScopeRef, name: &str) -> Option<Symbol> {
    let mut current = Some(Rc::clone(scope));

    while let Some(scope) = current {
        let borrowed = scope.borrow();
        if let Some(symbol) = borrowed.find(name) {
            return Some(symbol.clone());
        }
        current = borrowed.parent();
    }

    None
}

pub fn lookup_local(scope: &ScopeRef, name: &str) -> Option<Symbol> {
    scope.borrow().find(name).cloned()
}
