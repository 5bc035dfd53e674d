//! S1: basic formula cell reads its dependencies and recomputes on
//! dependency change.
use crate::Kernel;

#[test]
fn formula_reads_dependencies_and_recomputes_on_change() {
    let mut k = Kernel::new();
    k.create_value_cell("a", 1.0).unwrap();
    k.create_value_cell("b", 2.0).unwrap();
    k.create_formula_cell("c", "<a> + <b>").unwrap();

    k.evaluate().unwrap();
    assert_eq!(k.get_cell_value("c").unwrap(), 3.0);

    k.set_cell_value("a", 10.0).unwrap();
    assert_eq!(k.get_cell_value("c").unwrap(), 12.0);
}
