//! Tree-walking evaluator and dependency extractor for the expression DSL.

use smallvec::SmallVec;
use statforge_common::{ErrorKind, SfError, SfResult};

use crate::ast::{BinaryOp, ExprNode, UnaryOp};

/// Most formulas reference a handful of cells; inline storage for 4
/// avoids a heap allocation for the common case.
pub type DependencyList = SmallVec<[String; 4]>;

/// `x ≠ 0 ∧ ¬isNaN(x)`. Used by `!`, `&&`, `||`, and ternary branch
/// selection. Comparison operators produce numbers that already satisfy
/// this directly (1.0 or 0.0) so they don't need to call it themselves.
pub fn truthy(x: f64) -> bool {
    x != 0.0 && !x.is_nan()
}

fn bool_to_f64(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Evaluates `node`, resolving cell references through `lookup`.
///
/// `lookup` is supplied by the caller at every call; there is no
/// representable "absent lookup" state in this signature, so the missing
/// case the original's evaluator guarded against at runtime is instead
/// ruled out by the type system.
pub fn evaluate(node: &ExprNode, lookup: &mut dyn FnMut(&str) -> SfResult<f64>) -> SfResult<f64> {
    match node {
        ExprNode::Literal { value, .. } => Ok(*value),
        ExprNode::Ref { name, .. } => lookup(name),
        ExprNode::Unary { op, expr, .. } => {
            let value = evaluate(expr, lookup)?;
            Ok(match op {
                UnaryOp::Plus => value,
                UnaryOp::Neg => -value,
                UnaryOp::Not => bool_to_f64(!truthy(value)),
            })
        }
        ExprNode::Binary { op, lhs, rhs, .. } => {
            // Not short-circuit: both sides are always evaluated, matching
            // the DSL's numeric (not boolean-short-circuiting) && / ||.
            let lhs = evaluate(lhs, lookup)?;
            let rhs = evaluate(rhs, lookup)?;
            Ok(match op {
                BinaryOp::Add => lhs + rhs,
                BinaryOp::Sub => lhs - rhs,
                BinaryOp::Mul => lhs * rhs,
                BinaryOp::Div => lhs / rhs,
                BinaryOp::Pow => lhs.powf(rhs),
                BinaryOp::Lt => bool_to_f64(lhs < rhs),
                BinaryOp::Le => bool_to_f64(lhs <= rhs),
                BinaryOp::Gt => bool_to_f64(lhs > rhs),
                BinaryOp::Ge => bool_to_f64(lhs >= rhs),
                BinaryOp::Eq => bool_to_f64(lhs == rhs),
                BinaryOp::Ne => bool_to_f64(lhs != rhs),
                BinaryOp::And => bool_to_f64(truthy(lhs) && truthy(rhs)),
                BinaryOp::Or => bool_to_f64(truthy(lhs) || truthy(rhs)),
            })
        }
        ExprNode::Ternary {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            let cond = evaluate(cond, lookup)?;
            if truthy(cond) {
                evaluate(then_branch, lookup)
            } else {
                evaluate(else_branch, lookup)
            }
        }
        ExprNode::Call { name, args, span } => call_builtin(name, args, lookup, *span),
    }
}

fn call_builtin(
    name: &str,
    args: &[std::sync::Arc<ExprNode>],
    lookup: &mut dyn FnMut(&str) -> SfResult<f64>,
    span: statforge_common::Span,
) -> SfResult<f64> {
    match name {
        "root" => {
            if args.len() != 2 {
                return Err(SfError::new(ErrorKind::InvalidDsl)
                    .with_message(format!("root() takes 2 arguments, got {}", args.len()))
                    .with_span(span));
            }
            let n = evaluate(&args[0], lookup)?;
            let x = evaluate(&args[1], lookup)?;
            Ok(x.powf(1.0 / n))
        }
        other => Err(SfError::new(ErrorKind::InvalidDsl)
            .with_message(format!("unknown function \"{other}\""))
            .with_span(span)),
    }
}

/// Returns the distinct cell names referenced anywhere in `node`,
/// preserving first-appearance order. Order affects only determinism of
/// error reporting and evaluation tie-breaking, never correctness.
pub fn extract_dependencies(node: &ExprNode) -> DependencyList {
    let mut seen = std::collections::HashSet::new();
    let mut ordered = DependencyList::new();
    collect_refs(node, &mut seen, &mut ordered);
    ordered
}

fn collect_refs(node: &ExprNode, seen: &mut std::collections::HashSet<String>, ordered: &mut DependencyList) {
    match node {
        ExprNode::Literal { .. } => {}
        ExprNode::Ref { name, .. } => {
            if seen.insert(name.clone()) {
                ordered.push(name.clone());
            }
        }
        ExprNode::Unary { expr, .. } => collect_refs(expr, seen, ordered),
        ExprNode::Binary { lhs, rhs, .. } => {
            collect_refs(lhs, seen, ordered);
            collect_refs(rhs, seen, ordered);
        }
        ExprNode::Ternary {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            collect_refs(cond, seen, ordered);
            collect_refs(then_branch, seen, ordered);
            collect_refs(else_branch, seen, ordered);
        }
        ExprNode::Call { args, .. } => {
            for a in args {
                collect_refs(a, seen, ordered);
            }
        }
    }
}
