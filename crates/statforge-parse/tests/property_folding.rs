//! Property 8 (constant-folding correctness): for pure arithmetic
//! subexpressions with no cell references, folded and unfolded trees
//! evaluate to the same value, or the fold itself rejects a literal
//! division by zero that the unfolded tree would otherwise silently turn
//! into infinity/NaN at evaluation time.

use std::collections::HashMap;

use proptest::prelude::*;

use statforge_common::SfResult;
use statforge_parse::{evaluate, parse};

fn eval_source(source: &str, fold: bool) -> SfResult<f64> {
    let tree = parse(source, fold)?;
    let mut lookup = |_: &str| -> SfResult<f64> {
        unreachable!("generated sources never reference a cell")
    };
    evaluate(&tree, &mut lookup)
}

/// Builds a source string for a small arithmetic expression tree from a
/// flat list of literals and operators, always fully parenthesized so
/// operator precedence never matters to what's being exercised here
/// (folding equivalence, not the parser's precedence table).
fn build_source(leaves: &[i32], ops: &[u8]) -> String {
    let mut expr = leaves[0].to_string();
    for (op_code, leaf) in ops.iter().zip(&leaves[1..]) {
        let op = match op_code % 4 {
            0 => "+",
            1 => "-",
            2 => "*",
            _ => "+", // skip '/' here; division-by-zero is covered separately below
        };
        expr = format!("({expr} {op} {leaf})");
    }
    expr
}

proptest! {
    #[test]
    fn folded_and_unfolded_arithmetic_agree(
        leaves in prop::collection::vec(-20i32..20, 2..6),
        ops in prop::collection::vec(0u8..4, 1..5),
    ) {
        let source = build_source(&leaves, &ops);
        let unfolded = eval_source(&source, false).unwrap();
        let folded = eval_source(&source, true).unwrap();
        prop_assert_eq!(unfolded, folded);
    }

    #[test]
    fn folded_unary_chains_agree_with_unfolded(
        value in -50i32..50,
        negations in 0usize..6,
    ) {
        let mut source = value.to_string();
        for _ in 0..negations {
            source = format!("-({source})");
        }
        let unfolded = eval_source(&source, false).unwrap();
        let folded = eval_source(&source, true).unwrap();
        prop_assert_eq!(unfolded, folded);
    }
}

#[test]
fn folding_a_literal_division_by_zero_is_rejected() {
    assert!(parse("1 / 0", true).is_err());
    // unfolded, the same expression is accepted by the parser and only
    // produces infinity at evaluation time.
    let tree = parse("1 / 0", false).unwrap();
    let mut lookup = |_: &str| -> SfResult<f64> { unreachable!() };
    assert_eq!(evaluate(&tree, &mut lookup).unwrap(), f64::INFINITY);
}
