//! HTTP API server shell around the orchestrator.
//!
//! A thin collaborator: it feeds raw bytes and requests into the
//! orchestrator and serializes structured results back out. Pipeline work
//! happens on the runtime's worker threads, so status polls for other jobs
//! are never starved by a long-running stage.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::NotatError;
use crate::export::{ExportFormat, ExportSelection};
use crate::orchestrator::Orchestrator;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let state = Arc::new(AppState { orchestrator });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/upload", post(upload))
        .route("/api/process", post(process))
        .route("/api/process/status/{job_id}", get(status))
        .route("/api/export", post(export))
        .route("/api/export/download/{job_id}/{format}", get(download))
        // Lecture recordings run large; the default 2 MB body limit is far
        // too small for media uploads.
        .layer(DefaultBodyLimit::max(500 * 1024 * 1024))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Notat API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Upload", "POST /api/upload");
    Output::kv("Process", "POST /api/process");
    Output::kv("Status", "GET  /api/process/status/:job_id");
    Output::kv("Export", "POST /api/export");
    Output::kv("Download", "GET  /api/export/download/:job_id/:format");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    job_id: Uuid,
    filename: String,
    file_size: usize,
}

#[derive(Deserialize)]
struct ProcessRequest {
    job_id: Uuid,
}

#[derive(Deserialize)]
struct ExportRequest {
    job_id: Uuid,
    #[serde(default = "default_format")]
    format: String,
    title: Option<String>,
}

fn default_format() -> String {
    "markdown".to_string()
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map a library error onto an HTTP status.
fn error_response(e: NotatError) -> axum::response::Response {
    let status = match &e {
        NotatError::NotFound(_) => StatusCode::NOT_FOUND,
        NotatError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => {
            return error_response(NotatError::Validation(
                "Multipart upload contains no file field".into(),
            ))
        }
        Err(e) => return error_response(NotatError::Validation(format!("Bad upload: {e}"))),
    };

    let filename = field.file_name().unwrap_or("upload").to_string();
    let bytes = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return error_response(NotatError::Validation(format!("Bad upload: {e}"))),
    };

    match state.orchestrator.create_job(&filename, &bytes).await {
        Ok(job_id) => Json(UploadResponse {
            success: true,
            job_id,
            filename,
            file_size: bytes.len(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn process(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> axum::response::Response {
    match state.orchestrator.run_pipeline(req.job_id).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}

async fn status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> axum::response::Response {
    match state.orchestrator.status(job_id) {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}

async fn export(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportRequest>,
) -> axum::response::Response {
    let selection: ExportSelection = match req.format.parse() {
        Ok(selection) => selection,
        Err(e) => return error_response(NotatError::Validation(e)),
    };

    match state
        .orchestrator
        .export_job(req.job_id, selection, req.title.as_deref())
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}

async fn download(
    State(state): State<Arc<AppState>>,
    Path((job_id, format)): Path<(Uuid, String)>,
) -> axum::response::Response {
    let format: ExportFormat = match format.parse() {
        Ok(format) => format,
        Err(e) => return error_response(NotatError::Validation(e)),
    };

    match state.orchestrator.artifact(job_id, format) {
        Ok((bytes, content_type)) => {
            let disposition = format!(
                "attachment; filename=\"{}.{}\"",
                job_id,
                format.extension()
            );
            (
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}
