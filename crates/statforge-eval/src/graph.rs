//! The cell dependency graph: storage, adjacency, and structural-edit
//! validation. Owns no evaluation logic — that's `Compiler` and
//! `Executor`, which take `&mut Graph` explicitly per call rather than
//! holding a reference to it, since Rust forbids a struct from owning a
//! `Graph` while a sibling struct holds `&mut Graph` to the same value.

use rustc_hash::FxHashMap;

use statforge_common::{ErrorKind, SfError, SfResult};

use crate::cell::Cell;

static EMPTY_DEPS: Vec<String> = Vec::new();

#[derive(Clone)]
pub struct Graph {
    cells: FxHashMap<String, Cell>,
    dependencies: FxHashMap<String, Vec<String>>,
    dependents: FxHashMap<String, Vec<String>>,

    // Scratch containers reused across `has_path` calls to amortize
    // allocation, translating the source's static-scratch technique into
    // owned fields (no process-global mutable state, so independent
    // kernels on separate threads never contend on them).
    scratch_visited: std::collections::HashSet<String>,
    scratch_stack: Vec<String>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            cells: FxHashMap::default(),
            dependencies: FxHashMap::default(),
            dependents: FxHashMap::default(),
            scratch_visited: std::collections::HashSet::new(),
            scratch_stack: Vec::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cells.contains_key(id)
    }

    pub fn cell(&self, id: &str) -> SfResult<&Cell> {
        self.cells
            .get(id)
            .ok_or_else(|| cell_not_found(id))
    }

    pub fn cell_mut(&mut self, id: &str) -> SfResult<&mut Cell> {
        self.cells
            .get_mut(id)
            .ok_or_else(|| cell_not_found(id))
    }

    pub fn dependencies(&self, id: &str) -> &[String] {
        self.dependencies.get(id).map(|v| v.as_slice()).unwrap_or(&EMPTY_DEPS)
    }

    pub fn dependents(&self, id: &str) -> &[String] {
        self.dependents.get(id).map(|v| v.as_slice()).unwrap_or(&EMPTY_DEPS)
    }

    /// Inserts a brand-new cell with no dependencies. Fails if `id` is
    /// already present. `Graph` is a generic string-keyed map and does not
    /// itself enforce the cell-id identifier grammar — that validation
    /// happens once, at the `Kernel` facade's creation entry points,
    /// before a call ever reaches here.
    pub fn add_cell(&mut self, id: &str, cell: Cell) -> SfResult<()> {
        if self.cells.contains_key(id) {
            return Err(SfError::new(ErrorKind::CellAlreadyExists)
                .with_message(format!("cell \"{id}\" already exists")));
        }
        self.cells.insert(id.to_string(), cell);
        self.dependencies.insert(id.to_string(), Vec::new());
        self.dependents.insert(id.to_string(), Vec::new());
        Ok(())
    }

    /// Atomically replaces `id`'s forward edges with `new_deps`, updating
    /// reverse adjacency symmetrically. Either the whole edit is applied
    /// or, on error, the graph is left exactly as it was.
    ///
    /// `skip_cycle_check` is only safe to pass `true` for a cell that was
    /// just freshly created and therefore cannot yet be any other cell's
    /// dependency.
    pub fn set_cell_dependencies(
        &mut self,
        id: &str,
        new_deps: &[String],
        skip_cycle_check: bool,
    ) -> SfResult<()> {
        if !self.cells.contains_key(id) {
            return Err(cell_not_found(id));
        }

        let mut deduped = Vec::with_capacity(new_deps.len());
        let mut seen = std::collections::HashSet::with_capacity(new_deps.len());
        for dep in new_deps {
            if seen.insert(dep.clone()) {
                deduped.push(dep.clone());
            }
        }

        for dep in &deduped {
            if !self.cells.contains_key(dep) {
                return Err(SfError::new(ErrorKind::DependencyDoesntExist)
                    .with_message(format!("cell \"{dep}\" does not exist")));
            }
            if dep == id {
                return Err(SfError::new(ErrorKind::SelfReference)
                    .with_message(format!("cell \"{id}\" cannot depend on itself")));
            }
            if !skip_cycle_check && self.has_path(dep, id) {
                return Err(SfError::new(ErrorKind::DependencyLoop).with_message(format!(
                    "adding dependency \"{dep}\" to \"{id}\" would create a cycle"
                )));
            }
        }

        let old_deps = self
            .dependencies
            .get(id)
            .cloned()
            .unwrap_or_default();
        let old_set: std::collections::HashSet<&String> = old_deps.iter().collect();
        let new_set: std::collections::HashSet<&String> = deduped.iter().collect();

        for removed in old_set.difference(&new_set) {
            if let Some(list) = self.dependents.get_mut(removed.as_str()) {
                list.retain(|d| d != id);
            }
        }
        for added in new_set.difference(&old_set) {
            self.dependents
                .entry((*added).clone())
                .or_default()
                .push(id.to_string());
        }

        self.dependencies.insert(id.to_string(), deduped);
        Ok(())
    }

    /// Depth-first search over forward edges starting at `from`, looking
    /// for `target`. Reuses `scratch_visited`/`scratch_stack` across
    /// calls.
    fn has_path(&mut self, from: &str, target: &str) -> bool {
        self.scratch_visited.clear();
        self.scratch_stack.clear();
        self.scratch_stack.push(from.to_string());

        while let Some(current) = self.scratch_stack.pop() {
            if current == target {
                return true;
            }
            if !self.scratch_visited.insert(current.clone()) {
                continue;
            }
            if let Some(deps) = self.dependencies.get(&current) {
                for dep in deps {
                    if !self.scratch_visited.contains(dep) {
                        self.scratch_stack.push(dep.clone());
                    }
                }
            }
        }
        false
    }

    /// Removes `id`. Refused if any dependent is a `Formula` cell, since a
    /// formula bakes cell names into its tree and would silently start
    /// failing lookups. `Aggregator` dependents are allowed: their
    /// dependency lists are pruned here, and the pruned ids are returned
    /// so the caller (the `Kernel` facade) can mark them dirty.
    pub fn remove_cell(&mut self, id: &str) -> SfResult<Vec<String>> {
        if !self.cells.contains_key(id) {
            return Err(cell_not_found(id));
        }

        let dependents = self.dependents.get(id).cloned().unwrap_or_default();
        for dependent in &dependents {
            if let Some(cell) = self.cells.get(dependent) {
                if cell.is_formula() {
                    return Err(SfError::new(ErrorKind::DependentFormulaCell).with_message(
                        format!("cell \"{dependent}\" is a formula depending on \"{id}\""),
                    ));
                }
            }
        }

        let mut pruned_aggregators = Vec::new();
        for dependent in &dependents {
            if let Some(list) = self.dependencies.get_mut(dependent) {
                list.retain(|d| d != id);
            }
            pruned_aggregators.push(dependent.clone());
        }

        let deps = self.dependencies.get(id).cloned().unwrap_or_default();
        for dep in &deps {
            if let Some(list) = self.dependents.get_mut(dep) {
                list.retain(|d| d != id);
            }
        }

        self.cells.remove(id);
        self.dependencies.remove(id);
        self.dependents.remove(id);

        Ok(pruned_aggregators)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.dependencies.clear();
        self.dependents.clear();
    }

    pub fn cell_ids(&self) -> impl Iterator<Item = &String> {
        self.cells.keys()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_not_found(id: &str) -> SfError {
    SfError::new(ErrorKind::CellNotFound).with_message(format!("cell \"{id}\" not found"))
}
