//! S4: a formula that references itself is rejected at creation, and the
//! never-installed cell is unreachable afterward.
use crate::Kernel;
use statforge_common::ErrorKind;

#[test]
fn self_referencing_formula_is_rejected_and_never_installed() {
    let mut k = Kernel::new();
    let err = k.create_formula_cell("q", "<q>").unwrap_err();
    assert_eq!(err.kind, ErrorKind::SelfReference);
    assert!(!k.contains("q"));

    let err = k.get_cell_value("q").unwrap_err();
    assert_eq!(err.kind, ErrorKind::CellNotFound);
}
