use std::fmt::Display;

use crate::{
    type_checker::{
        symbols::{ScopeRef, Signature, Symbol},
        types::Type,
    },
    Span,
};

/// Binary operators, including assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Assign => "=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equals => "==",
            BinaryOp::Less => "<",
            BinaryOp::LessEquals => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEquals => ">=",
        }
    }

    /// Operators that produce a Boolean.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equals
                | BinaryOp::Less
                | BinaryOp::LessEquals
                | BinaryOp::Greater
                | BinaryOp::GreaterEquals
        )
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Negate => write!(f, "-"),
        }
    }
}

/// Expression
///
/// The closed set of node kinds. Nodes are only built through the
/// constructors in [`super::expressions`], so every node in a tree is
/// resolved and well typed.
#[derive(Debug)]
pub enum Expr {
    ConstInt(ConstIntExpr),
    ConstFloat(ConstFloatExpr),
    ConstBool(ConstBoolExpr),
    Ident(IdentExpr),
    VarDecl(VarDeclExpr),
    BinOp(BinOpExpr),
    UnaryOp(UnaryOpExpr),
    FunCall(FunCallExpr),
    Block(BlockExpr),
    If(IfExpr),
}

impl Expr {
    pub fn ty(&self) -> Type {
        match self {
            Expr::ConstInt(_) => Type::Integer,
            Expr::ConstFloat(_) => Type::Float,
            Expr::ConstBool(_) => Type::Boolean,
            Expr::Ident(ident) => ident.symbol.ty,
            Expr::VarDecl(decl) => decl.symbol.ty,
            Expr::BinOp(binop) => binop.ty,
            Expr::UnaryOp(unary) => unary.ty,
            Expr::FunCall(call) => call.ty,
            Expr::Block(_) => Type::Function,
            Expr::If(if_expr) => if_expr.ty,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Expr::ConstInt(expr) => &expr.span,
            Expr::ConstFloat(expr) => &expr.span,
            Expr::ConstBool(expr) => &expr.span,
            Expr::Ident(expr) => &expr.span,
            Expr::VarDecl(expr) => &expr.span,
            Expr::BinOp(expr) => &expr.span,
            Expr::UnaryOp(expr) => &expr.span,
            Expr::FunCall(expr) => &expr.span,
            Expr::Block(expr) => &expr.span,
            Expr::If(expr) => &expr.span,
        }
    }

    /// Signature of a Function-typed expression: a literal, or a name bound
    /// to one.
    pub fn signature(&self) -> Option<Signature> {
        match self {
            Expr::Block(block) => Some(block.signature.clone()),
            Expr::Ident(ident) => ident.symbol.signature.clone(),
            Expr::VarDecl(decl) => decl.symbol.signature.clone(),
            _ => None,
        }
    }
}

/// Integer literal.
#[derive(Debug, Clone)]
pub struct ConstIntExpr {
    pub value: i64,
    pub span: Span,
}

/// Float literal.
#[derive(Debug, Clone)]
pub struct ConstFloatExpr {
    pub value: f64,
    pub span: Span,
}

/// `true` or `false`.
#[derive(Debug, Clone)]
pub struct ConstBoolExpr {
    pub value: bool,
    pub span: Span,
}

/// Identifier Expression
/// A reference to a declared name, bound to its symbol at parse time.
#[derive(Debug, Clone)]
pub struct IdentExpr {
    pub symbol: Symbol,
    pub span: Span,
}

/// Variable Declaration
/// Binds `symbol` to the value of `value`. The symbol's type is the value's
/// type.
#[derive(Debug)]
pub struct VarDeclExpr {
    pub symbol: Symbol,
    pub value: Box<Expr>,
    pub span: Span,
}

/// Binary Expression
///
/// `operand_type` is the type both operands are converted to before the
/// operation; `ty` is the result. They differ only for comparisons.
#[derive(Debug)]
pub struct BinOpExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub operand_type: Type,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug)]
pub struct UnaryOpExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub ty: Type,
    pub span: Span,
}

/// Function Call
/// `ty` is the callee's return type; `param_types` are what each argument
/// is converted to.
#[derive(Debug)]
pub struct FunCallExpr {
    pub callee: Symbol,
    pub args: Vec<Expr>,
    pub param_types: Vec<Type>,
    pub ty: Type,
    pub span: Span,
}

/// A function parameter, already bound in the function's scope.
#[derive(Debug, Clone)]
pub struct FunParam {
    pub symbol: Symbol,
    pub span: Span,
}

/// Function Literal
/// Owns the scope its parameters and body were bound in.
#[derive(Debug)]
pub struct BlockExpr {
    pub params: Vec<FunParam>,
    pub scope: ScopeRef,
    pub body: ExprList,
    pub signature: Signature,
    pub span: Span,
}

/// If Expression
/// Each branch owns its own scope. A missing `else` is an empty list.
#[derive(Debug)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_branch: ExprList,
    pub else_branch: ExprList,
    pub ty: Type,
    pub span: Span,
}

/// An ordered sequence of expressions evaluated in `scope`. Its type is the
/// type of the last element; an empty list has none.
#[derive(Debug)]
pub struct ExprList {
    pub scope: ScopeRef,
    pub items: Vec<Expr>,
    pub ty: Option<Type>,
}

impl ExprList {
    pub fn new(scope: ScopeRef) -> Self {
        ExprList {
            scope,
            items: vec![],
            ty: None,
        }
    }

    pub fn push(&mut self, expr: Expr) {
        self.ty = Some(expr.ty());
        self.items.push(expr);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn last(&self) -> Option<&Expr> {
        self.items.last()
    }
}
