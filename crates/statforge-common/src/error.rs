//! Stable error model for the StatForge kernel.
//!
//! - **`ErrorKind`** : the canonical, ABI-stable numeric error codes
//! - **`Span`**      : source position a tokenizer/parser error can point at
//! - **`SfError`**   : one struct gluing kind, message, and an optional span
//!
//! New error kinds get a new discriminant in `ErrorKind`; existing callers
//! keep compiling because `SfError` itself never changes shape.

use std::{error::Error, fmt};

/// Stable numeric error codes. Values match the StatForge C ABI contract;
/// do not renumber existing variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidDsl = 100,
    CellAlreadyExists = 101,
    SelfReference = 102,
    DependencyLoop = 103,
    DependencyDoesntExist = 104,
    DependentFormulaCell = 105,
    CellNotFound = 106,
    CellTypeMismatch = 107,
    EvalDivByZero = 200,
    EvalOverflow = 201,
    EvalNaN = 202,
    InternalInvalidEngineState = 1000,
}

impl ErrorKind {
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidDsl => "InvalidDsl",
            Self::CellAlreadyExists => "CellAlreadyExists",
            Self::SelfReference => "SelfReference",
            Self::DependencyLoop => "DependencyLoop",
            Self::DependencyDoesntExist => "DependencyDoesntExist",
            Self::DependentFormulaCell => "DependentFormulaCell",
            Self::CellNotFound => "CellNotFound",
            Self::CellTypeMismatch => "CellTypeMismatch",
            Self::EvalDivByZero => "EvalDivByZero",
            Self::EvalOverflow => "EvalOverflow",
            Self::EvalNaN => "EvalNaN",
            Self::InternalInvalidEngineState => "InternalInvalidEngineState",
        })
    }
}

/// A position in DSL source text. 1-based line, 0-based column, matching
/// the tokenizer's scan order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The single error type every fallible StatForge operation returns.
///
/// Combines a mandatory [`ErrorKind`], an optional human message, and an
/// optional source [`Span`]. Build one with [`SfError::new`] and chain the
/// `with_*` methods to attach detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SfError {
    pub kind: ErrorKind,
    pub message: Option<String>,
    pub span: Option<Span>,
}

impl From<ErrorKind> for SfError {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            span: None,
        }
    }
}

impl SfError {
    pub fn new(kind: ErrorKind) -> Self {
        kind.into()
    }

    pub fn with_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Prefix the message with the owning cell id, matching the compiler's
    /// convention of naming the cell a DSL error occurred in.
    pub fn prefixed_with_cell(mut self, cell_id: &str) -> Self {
        self.message = Some(match self.message.take() {
            Some(msg) => format!("Cell \"{cell_id}\": {msg}"),
            None => format!("Cell \"{cell_id}\""),
        });
        self
    }
}

impl fmt::Display for SfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        if let Some(span) = self.span {
            write!(f, " ({span})")?;
        }
        Ok(())
    }
}

impl Error for SfError {}

impl PartialEq<ErrorKind> for SfError {
    fn eq(&self, other: &ErrorKind) -> bool {
        self.kind == *other
    }
}

/// Convenience alias used throughout the workspace.
pub type SfResult<T> = Result<T, SfError>;
