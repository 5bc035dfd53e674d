//! Two-phase "reserve placeholder -> configure -> commit-or-rollback"
//! orchestration for creating and editing cells.
//!
//! `Compiler` is a stateless marker: every operation is a free function
//! taking `&mut Graph` explicitly. The source's `Compiler(Graph&)`
//! constructor-injection pattern does not translate directly into Rust,
//! since the owning `Kernel` needs to hold `Graph` by value while handing
//! out `&mut` borrows to orchestration logic one call at a time; a
//! zero-sized marker with associated functions is the idiomatic
//! equivalent and preserves identical operation semantics.

use std::sync::Arc;

use statforge_common::{ErrorKind, SfError, SfResult};
use statforge_parse::{evaluator::extract_dependencies, parser, ExprNode};

use crate::cell::{Cell, CellKind};
use crate::graph::Graph;

pub struct Compiler;

impl Compiler {
    pub fn add_value_cell(graph: &mut Graph, id: &str, value: f64) -> SfResult<()> {
        graph.add_cell(id, Cell::new_value(value))
    }

    pub fn add_formula_cell(graph: &mut Graph, id: &str, source: &str) -> SfResult<()> {
        let placeholder = Cell::new_formula(Arc::new(ExprNode::Literal {
            value: 0.0,
            span: Default::default(),
        }));
        graph.add_cell(id, placeholder)?;

        match Self::install_formula(graph, id, source, true) {
            Ok(()) => Ok(()),
            Err(err) => {
                let _ = graph.remove_cell(id);
                Err(err)
            }
        }
    }

    pub fn add_aggregator_cell(graph: &mut Graph, id: &str, deps: &[String]) -> SfResult<()> {
        graph.add_cell(id, Cell::new_aggregator())?;
        match graph.set_cell_dependencies(id, deps, true) {
            Ok(()) => Ok(()),
            Err(err) => {
                let _ = graph.remove_cell(id);
                Err(err)
            }
        }
    }

    /// Replaces a `Formula` cell's source. Rejects non-formula cells.
    pub fn set_cell_formula(graph: &mut Graph, id: &str, source: &str) -> SfResult<()> {
        {
            let cell = graph.cell(id)?;
            if !cell.is_formula() {
                return Err(SfError::new(ErrorKind::CellTypeMismatch)
                    .with_message(format!("cell \"{id}\" is not a formula cell")));
            }
        }
        Self::install_formula(graph, id, source, false)
    }

    /// Replaces an `Aggregator` cell's dependency list. Rejects non-aggregator cells.
    pub fn set_agg_cell_dependencies(graph: &mut Graph, id: &str, deps: &[String]) -> SfResult<()> {
        {
            let cell = graph.cell(id)?;
            if !cell.is_aggregator() {
                return Err(SfError::new(ErrorKind::CellTypeMismatch)
                    .with_message(format!("cell \"{id}\" is not an aggregator cell")));
            }
        }
        graph.set_cell_dependencies(id, deps, false)
    }

    /// Parses `source`, extracts its dependencies, wires them into the
    /// graph, and on success installs the new tree. `skip_cycle_check` is
    /// only passed `true` by `add_formula_cell`, whose target cell was
    /// just created and so cannot yet be any other cell's dependency;
    /// `set_cell_formula` edits a cell that may already be reachable from
    /// elsewhere and always checks. DSL parse errors are prefixed with
    /// the owning cell's id, matching the compiler's cell-id-prefixed
    /// diagnostic convention.
    fn install_formula(graph: &mut Graph, id: &str, source: &str, skip_cycle_check: bool) -> SfResult<()> {
        let tree = parser::parse(source, true).map_err(|e| e.prefixed_with_cell(id))?;
        let deps = extract_dependencies(&tree);
        graph.set_cell_dependencies(id, &deps, skip_cycle_check)?;

        let cell = graph.cell_mut(id)?;
        cell.kind = CellKind::Formula { tree };
        cell.dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn add_formula_cell_rolls_back_placeholder_on_parse_error() {
        let mut g = Graph::new();
        let err = Compiler::add_formula_cell(&mut g, "f", "1 +").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidDsl);
        assert!(!g.contains("f"));
    }

    #[test]
    fn add_formula_cell_installs_tree_and_dependencies() {
        let mut g = Graph::new();
        Compiler::add_value_cell(&mut g, "a", 1.0).unwrap();
        Compiler::add_value_cell(&mut g, "b", 2.0).unwrap();
        Compiler::add_formula_cell(&mut g, "c", "<a> + <b>").unwrap();
        assert_eq!(g.dependencies("c"), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn add_aggregator_cell_rolls_back_on_missing_dependency() {
        let mut g = Graph::new();
        let err = Compiler::add_aggregator_cell(&mut g, "s", &["missing".to_string()]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DependencyDoesntExist);
        assert!(!g.contains("s"));
    }

    #[test]
    fn set_cell_formula_rejects_non_formula_cell() {
        let mut g = Graph::new();
        Compiler::add_value_cell(&mut g, "v", 1.0).unwrap();
        let err = Compiler::set_cell_formula(&mut g, "v", "1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CellTypeMismatch);
    }

    #[test]
    fn self_reference_on_fresh_formula_cell_is_rejected_and_cleaned_up() {
        let mut g = Graph::new();
        let err = Compiler::add_formula_cell(&mut g, "q", "<q>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SelfReference);
        assert!(!g.contains("q"));
    }

    #[test]
    fn cell_id_is_prefixed_onto_dsl_errors() {
        let mut g = Graph::new();
        let err = Compiler::add_formula_cell(&mut g, "broken", "1 +").unwrap_err();
        assert!(err.message.unwrap().starts_with("Cell \"broken\""));
    }
}
