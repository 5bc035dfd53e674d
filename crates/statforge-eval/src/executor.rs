//! Dirty-propagation scheduler and on-demand (pull-based) evaluation.
//!
//! Like `Compiler`, `Executor` does not own the `Graph` it operates on —
//! it owns only its own scheduling state (the dirty-leaf list and the
//! chosen evaluation strategy) and takes `&Graph`/`&mut Graph` explicitly
//! per call.

use std::collections::HashMap;

use statforge_common::{ErrorKind, SfError, SfResult};
use statforge_parse::evaluator;

use crate::cell::CellKind;
use crate::graph::Graph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationStrategy {
    #[default]
    Iterative,
    Recursive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    Visiting,
    Visited,
}

pub struct Executor {
    dirty_leaves: Vec<String>,
    strategy: EvaluationStrategy,
}

impl Executor {
    pub fn new() -> Self {
        Self {
            dirty_leaves: Vec::new(),
            strategy: EvaluationStrategy::Iterative,
        }
    }

    pub fn with_strategy(strategy: EvaluationStrategy) -> Self {
        Self {
            dirty_leaves: Vec::new(),
            strategy,
        }
    }

    pub fn set_strategy(&mut self, strategy: EvaluationStrategy) {
        self.strategy = strategy;
    }

    pub fn strategy(&self) -> EvaluationStrategy {
        self.strategy
    }

    /// BFS over `dependents` starting at `id`, marking every reached
    /// non-`Value` cell dirty. A `Value` cell's own value is authoritative
    /// and is never marked dirty, but traversal continues through it to
    /// its dependents. A visited-set bounds each call to the reachable
    /// subgraph; marking is idempotent, so revisiting an already-dirty
    /// cell from a later call is harmless. A reached non-`Value` cell with
    /// no dependents (a graph sink) is recorded as a dirty leaf.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, graph)))]
    pub fn mark_dirty(&mut self, graph: &mut Graph, id: &str) {
        let mut stack = vec![id.to_string()];
        let mut visited = std::collections::HashSet::new();

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }

            let is_value = graph.cell(&current).map(|c| c.is_value()).unwrap_or(true);

            if !is_value {
                if let Ok(cell) = graph.cell_mut(&current) {
                    cell.dirty = true;
                }
            }

            let dependents = graph.dependents(&current).to_vec();
            if dependents.is_empty() && !is_value {
                self.mark_as_dirty_leaf(&current);
            }
            stack.extend(dependents);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(visited = visited.len(), "mark_dirty traversal complete");
    }

    pub fn mark_as_dirty_leaf(&mut self, id: &str) {
        self.dirty_leaves.push(id.to_string());
    }

    pub fn remove(&mut self, id: &str) {
        self.dirty_leaves.retain(|leaf| leaf != id);
    }

    pub fn dirty_leaves(&self) -> &[String] {
        &self.dirty_leaves
    }

    /// Reads `id`'s current value, evaluating it first if dirty.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, graph)))]
    pub fn get_cell_value(&mut self, graph: &mut Graph, id: &str) -> SfResult<f64> {
        if !graph.contains(id) {
            return Err(SfError::new(ErrorKind::CellNotFound)
                .with_message(format!("cell \"{id}\" not found")));
        }
        self.evaluate_cell(graph, id)?;
        Ok(graph.cell(id)?.value)
    }

    /// Evaluates every recorded dirty leaf, then clears the dirty-leaf list.
    pub fn evaluate(&mut self, graph: &mut Graph) -> SfResult<()> {
        let leaves = std::mem::take(&mut self.dirty_leaves);
        for leaf in &leaves {
            if graph.contains(leaf) {
                self.evaluate_cell(graph, leaf)?;
            }
        }
        Ok(())
    }

    fn evaluate_cell(&mut self, graph: &mut Graph, id: &str) -> SfResult<()> {
        match self.strategy {
            EvaluationStrategy::Recursive => self.evaluate_recursive(graph, id),
            EvaluationStrategy::Iterative => self.evaluate_iterative(graph, id),
        }
    }

    fn evaluate_recursive(&mut self, graph: &mut Graph, id: &str) -> SfResult<()> {
        let dirty = graph.cell(id)?.dirty;
        if !dirty {
            return Ok(());
        }

        let deps = graph.dependencies(id).to_vec();
        for dep in &deps {
            self.evaluate_recursive(graph, dep)?;
        }

        let value = compute_cell_value(graph, id)?;
        let cell = graph.cell_mut(id)?;
        cell.value = value;
        cell.dirty = false;
        Ok(())
    }

    /// Explicit-stack DFS with a tri-state visit map, so deep dependency
    /// chains don't exhaust the native call stack.
    fn evaluate_iterative(&mut self, graph: &mut Graph, id: &str) -> SfResult<()> {
        let mut state: HashMap<String, VisitState> = HashMap::new();
        let mut stack = vec![id.to_string()];

        while let Some(current) = stack.pop() {
            match state.get(&current).copied().unwrap_or(VisitState::Unvisited) {
                VisitState::Unvisited => {
                    if !graph.cell(&current)?.dirty {
                        state.insert(current, VisitState::Visited);
                        continue;
                    }
                    state.insert(current.clone(), VisitState::Visiting);
                    stack.push(current.clone());
                    for dep in graph.dependencies(&current).to_vec() {
                        if !matches!(state.get(&dep), Some(VisitState::Visited)) {
                            stack.push(dep);
                        }
                    }
                }
                VisitState::Visiting => {
                    let value = compute_cell_value(graph, &current)?;
                    let cell = graph.cell_mut(&current)?;
                    cell.value = value;
                    cell.dirty = false;
                    state.insert(current, VisitState::Visited);
                }
                VisitState::Visited => {}
            }
        }
        Ok(())
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_cell_value(graph: &Graph, id: &str) -> SfResult<f64> {
    let cell = graph.cell(id)?;
    match &cell.kind {
        CellKind::Value => Ok(cell.value),
        CellKind::Aggregator => {
            let mut sum = 0.0;
            for dep in graph.dependencies(id) {
                sum += graph.cell(dep)?.value;
            }
            Ok(sum)
        }
        CellKind::Formula { tree } => {
            let tree = tree.clone();
            let mut lookup = |name: &str| -> SfResult<f64> { Ok(graph.cell(name)?.value) };
            evaluator::evaluate(&tree, &mut lookup)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;

    fn basic_chain() -> (Graph, Executor) {
        let mut g = Graph::new();
        Compiler::add_value_cell(&mut g, "a", 1.0).unwrap();
        Compiler::add_value_cell(&mut g, "b", 2.0).unwrap();
        Compiler::add_formula_cell(&mut g, "c", "<a> + <b>").unwrap();
        (g, Executor::new())
    }

    #[test]
    fn get_cell_value_evaluates_dirty_formula() {
        let (mut g, mut exec) = basic_chain();
        assert_eq!(exec.get_cell_value(&mut g, "c").unwrap(), 3.0);
    }

    #[test]
    fn mark_dirty_propagates_and_get_cell_value_recomputes() {
        let (mut g, mut exec) = basic_chain();
        assert_eq!(exec.get_cell_value(&mut g, "c").unwrap(), 3.0);
        g.cell_mut("a").unwrap().value = 10.0;
        exec.mark_dirty(&mut g, "a");
        assert_eq!(exec.get_cell_value(&mut g, "c").unwrap(), 12.0);
    }

    #[test]
    fn recursive_and_iterative_strategies_agree() {
        let mut g = Graph::new();
        Compiler::add_value_cell(&mut g, "a", 2.0).unwrap();
        let mut prev = "a".to_string();
        for i in 0..50 {
            let id = format!("f{i}");
            Compiler::add_formula_cell(&mut g, &id, &format!("<{prev}> + 1")).unwrap();
            prev = id;
        }

        let mut g_iter = g.clone();
        let mut exec_iter = Executor::with_strategy(EvaluationStrategy::Iterative);
        let iter_result = exec_iter.get_cell_value(&mut g_iter, &prev).unwrap();

        let mut exec_rec = Executor::with_strategy(EvaluationStrategy::Recursive);
        let rec_result = exec_rec.get_cell_value(&mut g, &prev).unwrap();

        assert_eq!(iter_result, rec_result);
        assert_eq!(iter_result, 52.0);
    }

    #[test]
    fn long_chain_does_not_overflow_the_stack_under_iterative_strategy() {
        let mut g = Graph::new();
        Compiler::add_value_cell(&mut g, "seed", 0.0).unwrap();
        let mut prev = "seed".to_string();
        for i in 0..20_000 {
            let id = format!("f{i}");
            Compiler::add_formula_cell(&mut g, &id, &format!("<{prev}> + 1")).unwrap();
            prev = id;
        }
        let mut exec = Executor::new();
        assert_eq!(exec.get_cell_value(&mut g, &prev).unwrap(), 20_000.0);
    }
}
