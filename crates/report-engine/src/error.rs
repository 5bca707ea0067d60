//! Report generation errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// A report input could not be represented as a template value.
    #[error("invalid report input: {0}")]
    InvalidInput(String),

    /// The template failed to compile; one message per diagnostic.
    #[error("report compilation failed: {}", .0.join("; "))]
    Compile(Vec<String>),

    /// Compilation exceeded the time budget.
    #[error("report compilation timed out after {0}ms")]
    Timeout(u64),

    /// The blocking compile task panicked or was cancelled.
    #[error("report compilation task failed: {0}")]
    Task(String),

    /// The compiled document could not be serialized to PDF.
    #[error("PDF export failed: {0}")]
    Export(String),
}
