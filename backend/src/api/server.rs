//! HTTP server for the Excel-Split API.
//!
//! # API Endpoints
//!
//! | Method | Path                  | Description                               |
//! |--------|-----------------------|-------------------------------------------|
//! | GET    | `/health`             | Health check                              |
//! | POST   | `/api/process-excel`  | Upload a spreadsheet, download it split   |
//! | POST   | `/api/auth/register`  | Create an account                         |
//! | POST   | `/api/auth/login`     | Open a session                            |
//! | POST   | `/api/auth/logout`    | Close the session                         |
//! | GET    | `/api/auth/me`        | Current account                           |
//! | GET    | `/api/logs`           | SSE stream for real-time logs             |

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::{header, Method, StatusCode},
    middleware,
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Extension, Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::accounts::{self, require_session};
use super::logs::{log_info, log_success, LOG_BROADCASTER};
use super::types::{UserProfile, OUTPUT_FILE_NAME};
use crate::auth::Accounts;
use crate::config::ServerConfig;
use crate::error::{ProcessError, ServerError, ServerResult};
use crate::parser::XLSX_CONTENT_TYPE;
use crate::transform::pipeline::process_bytes;

/// Shared state of all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub accounts: Arc<Accounts>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let accounts = Accounts::new(config.session_lifetime);
        Self {
            config: Arc::new(config),
            accounts: Arc::new(accounts),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let protected = Router::new()
        .route("/api/process-excel", post(process_excel))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/auth/register", post(accounts::register))
        .route("/api/auth/login", post(accounts::login))
        .route("/api/auth/logout", post(accounts::logout))
        .route("/api/auth/me", get(accounts::me))
        .route("/api/logs", get(sse_logs))
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.socket_addr();

    println!("🚀 Excel-Split server running on http://{}", addr);
    println!("   POST /api/process-excel - Upload spreadsheet");
    println!("   POST /api/auth/register - Create account");
    println!("   POST /api/auth/login    - Log in");
    println!("   GET  /api/logs          - SSE log stream");
    println!("   GET  /health            - Health check");
    println!();
    println!(
        "🔒 Authentication {}",
        if config.require_auth { "required" } else { "disabled" }
    );
    println!("✂️  Splitting column \"{}\"", config.target_column);

    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "excel-split",
        "version": env!("CARGO_PKG_VERSION"),
        "authRequired": state.config.require_auth,
        "endpoints": {
            "process": "POST /api/process-excel",
            "register": "POST /api/auth/register",
            "login": "POST /api/auth/login",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let live = BroadcastStream::new(LOG_BROADCASTER.subscribe()).filter_map(|result| result.ok());
    let backlog = futures::stream::iter(LOG_BROADCASTER.recent());

    let stream = backlog.chain(live).filter_map(|entry| {
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: split the target column and return the workbook
async fn process_excel(
    State(state): State<AppState>,
    user: Option<Extension<UserProfile>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<Response> {
    let mut multipart = multipart.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            file_name = field.file_name().map(str::to_string);
            file_data = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
        }
    }

    let bytes = file_data.ok_or(ProcessError::MissingFile)?;

    println!("\n{}", "=".repeat(70));
    println!(
        "📄 NEW UPLOAD: {} ({} bytes){}",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len(),
        user.map(|Extension(u)| format!(" by {}", u.cu_id)).unwrap_or_default()
    );
    println!("{}\n", "=".repeat(70));

    let options = state.config.process_options();
    let output = tokio::task::spawn_blocking(move || process_bytes(&bytes, &options))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

    let report = output.summary.report;
    log_info(format!(
        "📊 {} rows: {} split, {} non-string, {} unmatched",
        report.data_rows(),
        report.split,
        report.non_string,
        report.unmatched
    ));
    log_success(format!("Sending {}", OUTPUT_FILE_NAME));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", OUTPUT_FILE_NAME),
            ),
        ],
        output.bytes,
    )
        .into_response())
}

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(format!("Upload too large: {}", e.body_text()))
    } else {
        ServerError::BadRequest(format!("Multipart error: {}", e.body_text()))
    }
}
