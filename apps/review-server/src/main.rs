//! ClauseLens review server
//!
//! An HTTP service that reviews contracts for laypeople:
//!
//! - Document loading: upload (.txt/.md/.pdf/images) or paste, with
//!   local text extraction and OCR for scans
//! - Structured risk analysis via a hosted AI model
//! - Clause browsing, per-clause rewrites, and a chat assistant
//! - Paginated PDF report export
//!
//! The server owns exactly one review session; a new load or a reset
//! replaces it wholesale. Nothing persists across a restart.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use counsel_client::{CounselClient, CounselConfig};
use extract_engine::{Extractor, OcrEngine, TrocrEngine};
use tokio::sync::RwLock;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod session;

use api::{
    handle_chat, handle_export, handle_health, handle_paste, handle_report, handle_reset,
    handle_rewrite, handle_tab, handle_toggle, handle_upload,
};
use session::ShellState;

/// Command-line arguments for the review server
#[derive(Parser, Debug)]
#[command(name = "review-server")]
#[command(about = "ClauseLens contract review server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// AI model used for analysis, rewrites, and chat
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Directory with the OCR model files
    #[arg(long, default_value = "models")]
    ocr_models: PathBuf,

    /// Report export timeout in milliseconds
    #[arg(long, default_value = "15000")]
    export_timeout_ms: u64,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The single review session and its load/reset bookkeeping
    pub shell: Arc<RwLock<ShellState>>,
    /// Client for the hosted analysis model
    pub counsel: Arc<CounselClient>,
    /// Extraction front end; the OCR backend holds inference state
    pub extractor: Arc<std::sync::Mutex<Extractor>>,
    /// Report export timeout in milliseconds
    pub export_timeout_ms: u64,
}

/// OCR stand-in used when no model files are installed. Image uploads
/// fail with a pointer at the missing files; everything else works.
struct UnavailableOcr;

impl OcrEngine for UnavailableOcr {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn recognize(&mut self, _image_data: &[u8]) -> anyhow::Result<String> {
        anyhow::bail!(
            "no OCR model installed; place trocr_encoder.onnx, trocr_decoder.onnx \
             and tokenizer.json in the model directory"
        )
    }
}

/// Build the API router around shared state.
fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Document loading
        .route("/api/documents", post(handle_upload))
        .route("/api/paste", post(handle_paste))
        // Clause browser
        .route("/api/clauses/:id/rewrite", post(handle_rewrite))
        .route("/api/clauses/:id/toggle", post(handle_toggle))
        // Chat assistant
        .route("/api/chat", post(handle_chat))
        // Session views
        .route("/api/tab", post(handle_tab))
        .route("/api/report", get(handle_report))
        .route("/api/export", get(handle_export))
        .route("/api/reset", post(handle_reset))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting review server on {}:{}", args.host, args.port);

    let counsel_config = CounselConfig::from_env(&args.model);
    if counsel_config.api_key.is_none() {
        warn!(
            "{} is not set; analysis, rewrites, and chat will be unavailable",
            counsel_client::API_KEY_ENV
        );
    }
    let counsel = Arc::new(CounselClient::new(counsel_config));

    let ocr: Box<dyn OcrEngine> = match TrocrEngine::load(&args.ocr_models) {
        Ok(engine) => {
            info!(dir = %args.ocr_models.display(), "OCR engine ready");
            Box::new(engine)
        }
        Err(err) => {
            warn!(error = %err, "OCR unavailable; image uploads will be rejected");
            Box::new(UnavailableOcr)
        }
    };

    let state = AppState {
        shell: Arc::new(RwLock::new(ShellState::new())),
        counsel,
        extractor: Arc::new(std::sync::Mutex::new(Extractor::new(ocr))),
        export_timeout_ms: args.export_timeout_ms,
    };

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Export timeout: {}ms", args.export_timeout_ms);

    axum::serve(listener, app).await?;

    Ok(())
}
