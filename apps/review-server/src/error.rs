//! Error types for the review server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use counsel_client::CounselError;
use extract_engine::{ExtractError, MIN_TEXT_CHARS};
use report_engine::ReportError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("A document is already being loaded")]
    Busy,

    #[error("The session changed while the request was running")]
    Superseded,

    #[error("No document is loaded. Upload or paste a contract first.")]
    NoSession,

    #[error("Nothing to export: no analysis is available")]
    NothingToExport,

    #[error("Pasted text is too short to analyze: {chars} characters (minimum {MIN_TEXT_CHARS})")]
    TextTooShort { chars: usize },

    #[error("No clause with id {0} in the current analysis")]
    UnknownClause(u32),

    #[error("Clause {0} already has a rewrite")]
    RewriteExists(u32),

    #[error("A rewrite for clause {0} is already in progress")]
    RewriteInFlight(u32),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Counsel(#[from] CounselError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match &self {
            ServerError::Busy => (StatusCode::CONFLICT, "LOAD_IN_PROGRESS"),
            ServerError::Superseded => (StatusCode::CONFLICT, "SUPERSEDED"),
            ServerError::NoSession => (StatusCode::CONFLICT, "NO_SESSION"),
            ServerError::NothingToExport => (StatusCode::NOT_FOUND, "NOTHING_TO_EXPORT"),
            ServerError::TextTooShort { .. } => (StatusCode::BAD_REQUEST, "TEXT_TOO_SHORT"),
            ServerError::UnknownClause(_) => (StatusCode::NOT_FOUND, "UNKNOWN_CLAUSE"),
            ServerError::RewriteExists(_) => (StatusCode::CONFLICT, "REWRITE_EXISTS"),
            ServerError::RewriteInFlight(_) => (StatusCode::CONFLICT, "REWRITE_IN_FLIGHT"),
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ServerError::Extract(err) => match err {
                ExtractError::UnsupportedType(_) => {
                    (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_TYPE")
                }
                ExtractError::ScannedDocument => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "SCANNED_DOCUMENT")
                }
                ExtractError::Read(_) => (StatusCode::BAD_REQUEST, "READ_ERROR"),
                ExtractError::Ocr(_) => (StatusCode::UNPROCESSABLE_ENTITY, "OCR_FAILED"),
            },
            ServerError::Counsel(err) => match err {
                CounselError::MissingApiKey(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "MISSING_API_KEY")
                }
                CounselError::Http(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNREACHABLE"),
                CounselError::Analysis(_) => (StatusCode::BAD_GATEWAY, "ANALYSIS_FAILED"),
                CounselError::Rewrite(_) => (StatusCode::BAD_GATEWAY, "REWRITE_FAILED"),
            },
            ServerError::Report(err) => match err {
                ReportError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, "EXPORT_TIMEOUT"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED"),
            },
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
