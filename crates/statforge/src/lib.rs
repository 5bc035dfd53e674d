//! Meta crate re-exporting the StatForge kernel layers with sensible
//! defaults. Downstream users can depend on this crate and opt into
//! specific layers via feature flags, or depend on the underlying crates
//! directly when deeper integration is required.

#[cfg(feature = "common")]
pub use statforge_common as common;

#[cfg(feature = "parse")]
pub use statforge_parse as parse;

#[cfg(feature = "eval")]
pub use statforge_eval as eval;

#[cfg(feature = "common")]
pub use statforge_common::{CellId, ErrorKind, SfError, SfResult, Span};

#[cfg(feature = "eval")]
pub use statforge_eval::{Cell, CellKind, EvaluationStrategy, Executor, Graph, Kernel};
