//! Client for the hosted contract-analysis model
//!
//! Three operations, all delegated to an external chat-completions API:
//!
//! - `analyze` — schema-constrained structured risk analysis
//! - `rewrite_clause` — free-form safer rewrite of a single clause
//! - chat — a stateful session seeded with the document text
//!
//! The model's output is treated as untrusted input and validated at
//! the boundary; malformed responses fail closed.

pub mod chat;
pub mod client;
pub mod error;
pub mod prompts;
pub mod schema;

pub use chat::{ChatSession, Turn, TurnRole};
pub use client::{CounselClient, CounselConfig, API_BASE_ENV, API_KEY_ENV};
pub use error::CounselError;
pub use prompts::{MAX_ANALYSIS_CHARS, REWRITE_FALLBACK};
