//! Shared types for the ClauseLens contract review pipeline
//!
//! This crate defines the data model that flows between the extraction
//! engine, the analysis client, the report engine, and the server:
//!
//! - Documents and their detected kinds
//! - Structured analysis results (clauses, risk levels, red flags)
//! - Chat transcripts and messages
//! - Pure view state (clause browser, active tab)
//!
//! Everything here is owned by the current review session; nothing
//! persists across a reset or a new upload.

pub mod analysis;
pub mod chat;
pub mod document;
pub mod view;

pub use analysis::{AnalysisResult, Clause, ContractDomain, HeatSegment, RiskLevel};
pub use chat::{ChatMessage, ChatRole, ChatTranscript, APOLOGY, GREETING};
pub use document::{Document, DocumentKind};
pub use view::{ActiveTab, ClauseBrowser};
