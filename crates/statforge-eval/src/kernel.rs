//! `Kernel`: the single-entry-point facade wiring `Graph`, `Compiler`, and
//! `Executor` together. Not reentrant; not safe to share across threads
//! without external synchronization — see the crate's concurrency notes.

use statforge_common::{validate_cell_id, SfResult};

use crate::compiler::Compiler;
use crate::executor::{EvaluationStrategy, Executor};
use crate::graph::Graph;

pub struct Kernel {
    graph: Graph,
    executor: Executor,
}

impl Kernel {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            executor: Executor::new(),
        }
    }

    pub fn with_strategy(strategy: EvaluationStrategy) -> Self {
        Self {
            graph: Graph::new(),
            executor: Executor::with_strategy(strategy),
        }
    }

    pub fn set_evaluation_strategy(&mut self, strategy: EvaluationStrategy) {
        self.executor.set_strategy(strategy);
    }

    pub fn evaluation_strategy(&self) -> EvaluationStrategy {
        self.executor.strategy()
    }

    pub fn create_value_cell(&mut self, id: &str, value: f64) -> SfResult<()> {
        validate_cell_id(id)?;
        Compiler::add_value_cell(&mut self.graph, id, value)
    }

    pub fn create_formula_cell(&mut self, id: &str, source: &str) -> SfResult<()> {
        validate_cell_id(id)?;
        Compiler::add_formula_cell(&mut self.graph, id, source)?;
        self.executor.mark_as_dirty_leaf(id);
        Ok(())
    }

    pub fn create_aggregator_cell(&mut self, id: &str, deps: &[String]) -> SfResult<()> {
        validate_cell_id(id)?;
        Compiler::add_aggregator_cell(&mut self.graph, id, deps)?;
        self.executor.mark_as_dirty_leaf(id);
        Ok(())
    }

    pub fn remove_cell(&mut self, id: &str) -> SfResult<()> {
        let pruned_aggregators = self.graph.remove_cell(id)?;
        self.executor.remove(id);
        for aggregator_id in pruned_aggregators {
            self.executor.mark_dirty(&mut self.graph, &aggregator_id);
        }
        Ok(())
    }

    pub fn set_cell_value(&mut self, id: &str, value: f64) -> SfResult<()> {
        {
            let cell = self.graph.cell_mut(id)?;
            cell.value = value;
        }
        self.executor.mark_dirty(&mut self.graph, id);
        Ok(())
    }

    pub fn set_cell_formula(&mut self, id: &str, source: &str) -> SfResult<()> {
        Compiler::set_cell_formula(&mut self.graph, id, source)?;
        self.executor.mark_dirty(&mut self.graph, id);
        Ok(())
    }

    pub fn set_cell_dependencies(&mut self, id: &str, deps: &[String]) -> SfResult<()> {
        Compiler::set_agg_cell_dependencies(&mut self.graph, id, deps)?;
        self.executor.mark_dirty(&mut self.graph, id);
        Ok(())
    }

    pub fn get_cell_value(&mut self, id: &str) -> SfResult<f64> {
        self.executor.get_cell_value(&mut self.graph, id)
    }

    pub fn evaluate(&mut self) -> SfResult<()> {
        self.executor.evaluate(&mut self.graph)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.graph.contains(id)
    }

    pub fn reset(&mut self) {
        *self = Kernel::with_strategy(self.executor.strategy());
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}
