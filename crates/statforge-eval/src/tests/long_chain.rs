//! S8: a long chain of formulas, each depending on its predecessor,
//! evaluates under the default (iterative) strategy without exhausting
//! the native call stack.
use crate::Kernel;

#[test]
fn hundred_thousand_link_chain_evaluates_without_stack_overflow() {
    let mut k = Kernel::new();
    k.create_value_cell("seed", 0.0).unwrap();

    let mut prev = "seed".to_string();
    for i in 0..100_000 {
        let id = format!("f{i}");
        k.create_formula_cell(&id, &format!("<{prev}> + 1")).unwrap();
        prev = id;
    }

    // Pull the tail cell directly rather than calling `evaluate()` first,
    // so the iterative executor's explicit-stack DFS walks the full
    // 100,000-deep dependency chain in one traversal.
    assert_eq!(k.get_cell_value(&prev).unwrap(), 100_000.0);
}
