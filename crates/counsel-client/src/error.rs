//! Error types for AI-backed operations
//!
//! Every AI-dependent call requires the API key; its absence is a hard
//! precondition failure, not something to work around. No call is
//! retried automatically.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CounselError {
    #[error("No API key configured. Set {0} before using AI features.")]
    MissingApiKey(&'static str),

    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Rewrite failed: {0}")]
    Rewrite(String),
}
