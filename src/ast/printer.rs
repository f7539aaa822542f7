//! Read-only S-expression rendering of a tree.
//!
//! Only resolved types and literal values are used, nothing is mutated.

use super::ast::{Expr, ExprList};

/// Renders every top-level expression on its own line.
pub fn print_expr_list(list: &ExprList) -> String {
    list.items
        .iter()
        .map(print_expr)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::ConstInt(int) => int.value.to_string(),
        Expr::ConstFloat(float) => format!("{:?}", float.value),
        Expr::ConstBool(boolean) => boolean.value.to_string(),
        Expr::Ident(ident) => ident.symbol.name.clone(),
        Expr::VarDecl(decl) => format!(
            "(decl {}:{} {})",
            decl.symbol.name,
            decl.symbol.ty,
            print_expr(&decl.value)
        ),
        Expr::BinOp(binop) => format!(
            "({} {} {})",
            binop.op,
            print_expr(&binop.left),
            print_expr(&binop.right)
        ),
        Expr::UnaryOp(unary) => format!("({} {})", unary.op, print_expr(&unary.operand)),
        Expr::FunCall(call) => {
            let mut parts = vec!["call".to_string(), call.callee.name.clone()];
            parts.extend(call.args.iter().map(print_expr));
            format!("({})", parts.join(" "))
        }
        Expr::Block(block) => {
            let params = block
                .params
                .iter()
                .map(|param| format!("{}:{}", param.symbol.name, param.symbol.ty))
                .collect::<Vec<_>>()
                .join(" ");
            format!("(fn ({}) {})", params, print_branch(&block.body))
        }
        Expr::If(if_expr) => format!(
            "(if:{} {} {} {})",
            if_expr.ty,
            print_expr(&if_expr.condition),
            print_branch(&if_expr.then_branch),
            print_branch(&if_expr.else_branch)
        ),
    }
}

fn print_branch(list: &ExprList) -> String {
    let items = list.items.iter().map(print_expr).collect::<Vec<_>>();
    format!("{{{}}}", items.join(" "))
}
