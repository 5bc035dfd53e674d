//! The StatForge expression tree.

use std::sync::Arc;

use statforge_common::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    /// Arithmetic operators are the only ones the constant folder touches;
    /// comparisons and logical operators are left for the evaluator so that
    /// their NaN-aware truthiness semantics stay in one place.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Pow
        )
    }
}

/// A node in the expression tree. Immutable once parsed; shared via `Arc`
/// once installed on a `Formula` cell so evaluation never re-walks or
/// re-parses the source.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Literal {
        value: f64,
        span: Span,
    },
    Ref {
        name: String,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        expr: Arc<ExprNode>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Arc<ExprNode>,
        rhs: Arc<ExprNode>,
        span: Span,
    },
    Ternary {
        cond: Arc<ExprNode>,
        then_branch: Arc<ExprNode>,
        else_branch: Arc<ExprNode>,
        span: Span,
    },
    Call {
        name: String,
        args: Vec<Arc<ExprNode>>,
        span: Span,
    },
}

impl ExprNode {
    pub fn span(&self) -> Span {
        match self {
            ExprNode::Literal { span, .. }
            | ExprNode::Ref { span, .. }
            | ExprNode::Unary { span, .. }
            | ExprNode::Binary { span, .. }
            | ExprNode::Ternary { span, .. }
            | ExprNode::Call { span, .. } => *span,
        }
    }
}

fn unary_sexpr(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Plus => "+",
        UnaryOp::Neg => "-",
        UnaryOp::Not => "!",
    }
}

fn binary_sexpr(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Pow => "^",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

/// Renders a tree as a parenthesized prefix (s-expression) form, e.g.
/// `(+ <a> 3)`. Pure; used by debugging tools and the round-trip test.
pub fn dump_sexpr(node: &ExprNode) -> String {
    match node {
        ExprNode::Literal { value, .. } => format!("{value}"),
        ExprNode::Ref { name, .. } => format!("<{name}>"),
        ExprNode::Unary { op, expr, .. } => format!("({} {})", unary_sexpr(*op), dump_sexpr(expr)),
        ExprNode::Binary { op, lhs, rhs, .. } => {
            format!("({} {} {})", binary_sexpr(*op), dump_sexpr(lhs), dump_sexpr(rhs))
        }
        ExprNode::Ternary {
            cond,
            then_branch,
            else_branch,
            ..
        } => format!(
            "(?: {} {} {})",
            dump_sexpr(cond),
            dump_sexpr(then_branch),
            dump_sexpr(else_branch)
        ),
        ExprNode::Call { name, args, .. } => {
            let rendered_args: Vec<String> = args.iter().map(|a| dump_sexpr(a)).collect();
            if rendered_args.is_empty() {
                format!("({name})")
            } else {
                format!("({name} {})", rendered_args.join(" "))
            }
        }
    }
}
