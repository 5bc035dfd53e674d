//! `reset` tears a kernel back down to empty while preserving the
//! evaluation strategy it was configured with.
use crate::{EvaluationStrategy, Kernel};

#[test]
fn reset_clears_cells_but_keeps_the_configured_strategy() {
    let mut k = Kernel::with_strategy(EvaluationStrategy::Recursive);
    k.create_value_cell("a", 1.0).unwrap();
    k.create_formula_cell("b", "<a> + 1").unwrap();
    assert!(k.contains("a"));

    k.reset();

    assert!(!k.contains("a"));
    assert!(!k.contains("b"));
    assert_eq!(k.evaluation_strategy(), EvaluationStrategy::Recursive);

    // the kernel is fully usable again after reset
    k.create_value_cell("a", 5.0).unwrap();
    assert_eq!(k.get_cell_value("a").unwrap(), 5.0);
}
