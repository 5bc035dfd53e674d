//! Cell storage types.

use std::sync::Arc;

use statforge_parse::ExprNode;

/// What kind of cell this is, and the state specific to that kind.
#[derive(Debug, Clone)]
pub enum CellKind {
    /// A leaf input with no dependencies. Never dirty after `set_value`.
    Value,
    /// A DSL expression. Carries its parsed (and, by default,
    /// constant-folded) tree so evaluation never re-parses source.
    Formula { tree: Arc<ExprNode> },
    /// The sum of its (explicitly supplied, editable) dependencies.
    Aggregator,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub kind: CellKind,
    pub value: f64,
    pub dirty: bool,
}

impl Cell {
    pub fn new_value(value: f64) -> Self {
        Self {
            kind: CellKind::Value,
            value,
            dirty: false,
        }
    }

    pub fn new_formula(tree: Arc<ExprNode>) -> Self {
        Self {
            kind: CellKind::Formula { tree },
            value: 0.0,
            dirty: true,
        }
    }

    pub fn new_aggregator() -> Self {
        Self {
            kind: CellKind::Aggregator,
            value: 0.0,
            dirty: true,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, CellKind::Value)
    }

    pub fn is_formula(&self) -> bool {
        matches!(self.kind, CellKind::Formula { .. })
    }

    pub fn is_aggregator(&self) -> bool {
        matches!(self.kind, CellKind::Aggregator)
    }
}
