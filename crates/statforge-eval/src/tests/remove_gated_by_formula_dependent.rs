//! S5: removing a cell that a `Formula` depends on is refused, since the
//! formula's tree bakes the name in; removing the formula first clears
//! the way.
use crate::Kernel;
use statforge_common::ErrorKind;

#[test]
fn formula_dependent_blocks_removal_until_it_is_removed_itself() {
    let mut k = Kernel::new();
    k.create_value_cell("a", 1.0).unwrap();
    k.create_formula_cell("f", "<a>").unwrap();

    let err = k.remove_cell("a").unwrap_err();
    assert_eq!(err.kind, ErrorKind::DependentFormulaCell);
    assert!(k.contains("a"));
    assert!(k.contains("f"));

    k.remove_cell("f").unwrap();
    k.remove_cell("a").unwrap();
    assert!(!k.contains("a"));
}
