//! API handlers for the review server
//!
//! The upload and paste paths share one load pipeline: claim the load
//! slot, extract, analyze, then install the new session under the same
//! generation that claimed the slot. Chat and rewrite calls snapshot
//! what they need under the lock, await the API with the lock released,
//! and verify the generation before applying the result.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use counsel_client::{ChatSession, CounselError};
use extract_engine::MIN_TEXT_CHARS;
use review_types::{
    ActiveTab, AnalysisResult, ChatMessage, Document, DocumentKind, HeatSegment,
};

use crate::error::ServerError;
use crate::session::{ReviewSession, ShellState};
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "review-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Upload request body
#[derive(Deserialize)]
pub struct UploadRequest {
    /// Original file name; the extension selects the extraction backend
    pub filename: String,
    /// File content, base64-encoded
    pub data_base64: String,
}

/// Paste request body
#[derive(Deserialize)]
pub struct PasteRequest {
    pub text: String,
}

/// Document metadata echoed back to the client
#[derive(Serialize)]
pub struct DocumentInfo {
    pub name: String,
    pub kind: DocumentKind,
    pub chars: usize,
    pub loaded_at: DateTime<Utc>,
}

impl From<&Document> for DocumentInfo {
    fn from(doc: &Document) -> Self {
        Self {
            name: doc.name.clone(),
            kind: doc.kind,
            chars: doc.text.chars().count(),
            loaded_at: doc.loaded_at,
        }
    }
}

/// Response for a successful document load
#[derive(Serialize)]
pub struct LoadResponse {
    pub success: bool,
    pub document: DocumentInfo,
    pub analysis: AnalysisResult,
}

/// True when pasted text is below the analyzable minimum.
pub fn paste_too_short(text: &str) -> bool {
    text.trim().chars().count() < MIN_TEXT_CHARS
}

/// Handler: POST /api/documents
pub async fn handle_upload(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<LoadResponse>, ServerError> {
    let data = base64::engine::general_purpose::STANDARD
        .decode(&req.data_base64)
        .map_err(|e| ServerError::InvalidRequest(format!("invalid base64 payload: {e}")))?;

    info!(filename = %req.filename, bytes = data.len(), "document upload");

    let generation = begin_load(&state).await?;
    let outcome = async {
        let document = extract_document(&state, &req.filename, data).await?;
        let analysis = state.counsel.analyze(&document.text).await?;
        Ok::<_, ServerError>((document, analysis))
    }
    .await;

    settle_load(&state, generation, outcome).await
}

/// Handler: POST /api/paste
pub async fn handle_paste(
    State(state): State<AppState>,
    Json(req): Json<PasteRequest>,
) -> Result<Json<LoadResponse>, ServerError> {
    // Local precondition, checked before any AI call is issued
    if paste_too_short(&req.text) {
        return Err(ServerError::TextTooShort {
            chars: req.text.trim().chars().count(),
        });
    }

    let generation = begin_load(&state).await?;
    let outcome = async {
        let document = Document::new("Pasted text", req.text, DocumentKind::Plain);
        let analysis = state.counsel.analyze(&document.text).await?;
        Ok::<_, ServerError>((document, analysis))
    }
    .await;

    settle_load(&state, generation, outcome).await
}

async fn begin_load(state: &AppState) -> Result<u64, ServerError> {
    let mut shell = state.shell.write().await;
    shell.begin_load().ok_or(ServerError::Busy)
}

/// Run extraction on a blocking thread; the OCR backend holds mutable
/// inference state, hence the mutex.
async fn extract_document(
    state: &AppState,
    filename: &str,
    data: Vec<u8>,
) -> Result<Document, ServerError> {
    let extractor = state.extractor.clone();
    let filename = filename.to_string();

    let document = tokio::task::spawn_blocking(move || {
        let mut guard = extractor
            .lock()
            .map_err(|_| ServerError::Internal("extraction backend poisoned".to_string()))?;
        guard.extract(&filename, &data).map_err(ServerError::from)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("extraction task failed: {e}")))??;

    Ok(document)
}

async fn settle_load(
    state: &AppState,
    generation: u64,
    outcome: Result<(Document, AnalysisResult), ServerError>,
) -> Result<Json<LoadResponse>, ServerError> {
    let mut shell = state.shell.write().await;
    match outcome {
        Ok((document, analysis)) => {
            let document_info = DocumentInfo::from(&document);
            let analysis_copy = analysis.clone();
            let session = ReviewSession::new(document, analysis);
            if shell.complete_load(generation, session) {
                Ok(Json(LoadResponse {
                    success: true,
                    document: document_info,
                    analysis: analysis_copy,
                }))
            } else {
                Err(ServerError::Superseded)
            }
        }
        Err(err) => {
            shell.fail_load(generation);
            Err(err)
        }
    }
}

/// Rewrite response
#[derive(Serialize)]
pub struct RewriteResponse {
    pub success: bool,
    pub clause_id: u32,
    pub rewrite: String,
}

/// Handler: POST /api/clauses/{id}/rewrite
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Path(clause_id): Path<u32>,
) -> Result<Json<RewriteResponse>, ServerError> {
    let (clause_text, domain, generation) = {
        let mut shell = state.shell.write().await;
        let generation = shell.generation();
        let session = shell.session_mut().ok_or(ServerError::NoSession)?;

        let clause = session
            .analysis
            .clause(clause_id)
            .ok_or(ServerError::UnknownClause(clause_id))?;
        let clause_text = clause.text.clone();
        let domain = session.analysis.domain;

        if session.rewrites.contains_key(&clause_id) {
            return Err(ServerError::RewriteExists(clause_id));
        }
        if !session.rewrites_in_flight.insert(clause_id) {
            return Err(ServerError::RewriteInFlight(clause_id));
        }
        (clause_text, domain, generation)
    };

    let result = state.counsel.rewrite_clause(&clause_text, domain).await;

    let mut shell = state.shell.write().await;
    let rewrite = settle_rewrite(&mut shell, generation, clause_id, result)?;

    Ok(Json(RewriteResponse {
        success: true,
        clause_id,
        rewrite,
    }))
}

/// Apply a finished rewrite call to the current session. The in-flight
/// marker is cleared unconditionally: after a failed load the original
/// session survives under a newer generation, and its clause must
/// become eligible again even though the result itself is stale.
pub(crate) fn settle_rewrite(
    shell: &mut ShellState,
    generation: u64,
    clause_id: u32,
    result: Result<String, CounselError>,
) -> Result<String, ServerError> {
    if let Some(session) = shell.session_mut() {
        session.rewrites_in_flight.remove(&clause_id);
    }
    if shell.generation() != generation {
        return Err(ServerError::Superseded);
    }
    let session = shell.session_mut().ok_or(ServerError::NoSession)?;

    // On failure nothing is stored; the clause is eligible again
    let rewrite = result?;
    session.rewrites.insert(clause_id, rewrite.clone());
    Ok(rewrite)
}

/// Toggle response
#[derive(Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub expanded: Option<u32>,
}

/// Handler: POST /api/clauses/{id}/toggle
pub async fn handle_toggle(
    State(state): State<AppState>,
    Path(clause_id): Path<u32>,
) -> Result<Json<ToggleResponse>, ServerError> {
    let mut shell = state.shell.write().await;
    let session = shell.session_mut().ok_or(ServerError::NoSession)?;

    if session.analysis.clause(clause_id).is_none() {
        return Err(ServerError::UnknownClause(clause_id));
    }
    session.browser.toggle(clause_id);

    Ok(Json(ToggleResponse {
        success: true,
        expanded: session.browser.expanded(),
    }))
}

/// Chat request body
#[derive(Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Chat response: the full transcript in append order
#[derive(Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub messages: Vec<ChatMessage>,
    pub typing: bool,
}

/// Handler: POST /api/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    let (chat, generation): (ChatSession, u64) = {
        let mut shell = state.shell.write().await;
        let generation = shell.generation();
        let session = shell.session_mut().ok_or(ServerError::NoSession)?;

        session.transcript.push_user(&req.text);
        session.chat.push_user(&req.text);
        (session.chat.clone(), generation)
    };

    let reply = state.counsel.reply(&chat).await;

    let mut shell = state.shell.write().await;
    let (messages, typing) = settle_chat(&mut shell, generation, reply)?;

    Ok(Json(ChatResponse {
        success: true,
        messages,
        typing,
    }))
}

/// Apply a finished chat call to the current session. When the result
/// is stale but the session survived with the user's turn still
/// pending, that turn is settled with the apology so the transcript
/// never dangles.
pub(crate) fn settle_chat(
    shell: &mut ShellState,
    generation: u64,
    reply: Result<String, CounselError>,
) -> Result<(Vec<ChatMessage>, bool), ServerError> {
    if shell.generation() != generation {
        if let Some(session) = shell.session_mut() {
            if session.transcript.typing {
                session.transcript.push_apology();
            }
        }
        return Err(ServerError::Superseded);
    }
    let session = shell.session_mut().ok_or(ServerError::NoSession)?;

    match reply {
        Ok(answer) => {
            session.chat.push_assistant(answer.clone());
            session.transcript.push_assistant(answer);
        }
        Err(err) => {
            // Failed turns keep the user's message and apologize instead
            warn!(error = %err, "chat turn failed");
            session.transcript.push_apology();
        }
    }

    Ok((
        session.transcript.messages().to_vec(),
        session.transcript.typing,
    ))
}

/// Tab selection request
#[derive(Deserialize)]
pub struct TabRequest {
    pub tab: ActiveTab,
}

/// Handler: POST /api/tab
pub async fn handle_tab(
    State(state): State<AppState>,
    Json(req): Json<TabRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let mut shell = state.shell.write().await;
    if shell.session().is_none() {
        return Err(ServerError::NoSession);
    }
    shell.set_active_tab(req.tab);
    Ok(Json(serde_json::json!({ "success": true, "active_tab": req.tab })))
}

/// Full session snapshot for a client renderer
#[derive(Serialize)]
pub struct SessionSnapshot {
    pub success: bool,
    pub document: DocumentInfo,
    pub analysis: AnalysisResult,
    pub heat_strip: Vec<HeatSegment>,
    pub rewrites: HashMap<u32, String>,
    pub expanded_clause: Option<u32>,
    pub active_tab: ActiveTab,
    pub messages: Vec<ChatMessage>,
    pub typing: bool,
}

/// Handler: GET /api/report
pub async fn handle_report(
    State(state): State<AppState>,
) -> Result<Json<SessionSnapshot>, ServerError> {
    let shell = state.shell.read().await;
    let session = shell.session().ok_or(ServerError::NoSession)?;

    Ok(Json(SessionSnapshot {
        success: true,
        document: DocumentInfo::from(&session.document),
        analysis: session.analysis.clone(),
        heat_strip: session.analysis.heat_strip(),
        rewrites: session.rewrites.clone(),
        expanded_clause: session.browser.expanded(),
        active_tab: shell.active_tab(),
        messages: session.transcript.messages().to_vec(),
        typing: session.transcript.typing,
    }))
}

/// Handler: GET /api/export
pub async fn handle_export(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
    let (name, analysis, rewrites) = {
        let shell = state.shell.read().await;
        let session = shell.session().ok_or(ServerError::NothingToExport)?;
        (
            session.document.name.clone(),
            session.analysis.clone(),
            session.rewrites.clone(),
        )
    };

    let pdf =
        report_engine::render_report(name, analysis, rewrites, state.export_timeout_ms).await?;

    info!(bytes = pdf.len(), "report exported");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"contract-review-report.pdf\"",
            ),
        ],
        pdf,
    ))
}

/// Handler: POST /api/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut shell = state.shell.write().await;
    shell.reset();
    info!("session reset");
    Json(serde_json::json!({ "success": true }))
}
