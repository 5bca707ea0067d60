//! PDF report generation for contract reviews
//!
//! Renders one analysis result into a paginated PDF: title banner,
//! summary, next steps, red flags, then one block per clause with its
//! risk badge and any accepted rewrite. Compilation is fully in-memory
//! with embedded fonts.

pub mod compile;
pub mod error;
pub mod inputs;
pub mod world;

pub use compile::{render_report, render_report_sync, DEFAULT_TIMEOUT_MS};
pub use error::ReportError;
