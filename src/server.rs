//! HTTP API over the ingestion and question-answering pipelines.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/chat` | `{question}` → `{answer}` |
//! | `POST` | `/upload` | Multipart `file` field (CSV/JSON) → ingestion report |
//! | `GET`  | `/collections` | Stored collection summaries |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "question must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `unsupported_file` (415), `internal` (500).
//! A failed answer generation is not an HTTP error: it arrives as the
//! `answer` string.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tabrag_core::embedding::Embedder;
use tabrag_core::generation::AnswerGenerator;
use tabrag_core::InputError;
use tower_http::cors::{Any, CorsLayer};

use crate::chat::answer_question;
use crate::config::Config;
use crate::embedding::create_embedder;
use crate::generation::create_generator;
use crate::ingest::{ingest_file, IngestError};
use crate::reader::is_supported;
use crate::store::{CollectionSummary, FileStore};

const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn AnswerGenerator>,
    store: FileStore,
}

impl AppState {
    pub fn new(
        config: Config,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        let store = FileStore::new(&config.store.dir);
        Self {
            config: Arc::new(config),
            embedder,
            generator,
            store,
        }
    }

    /// State with clients built from the configured providers.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::from(create_embedder(&config.embedding)?);
        let generator: Arc<dyn AnswerGenerator> =
            Arc::from(create_generator(&config.generation)?);
        Ok(Self::new(config.clone(), embedder, generator))
    }
}

/// Build the router without binding a socket.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/chat", post(handle_chat))
        .route("/upload", post(handle_upload))
        .route("/collections", get(handle_collections))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `[server].bind` until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "server listening");
    println!("tabrag server listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn unsupported_file(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
        code: "unsupported_file",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Input(e @ InputError::UnsupportedFileType { .. }) => {
                unsupported_file(e.to_string())
            }
            IngestError::Input(e) => bad_request(e.to_string()),
            other => internal(other.to_string()),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /chat ============

#[derive(Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.question.trim().is_empty() {
        return Err(bad_request("question must not be empty"));
    }

    let outcome = answer_question(
        &req.question,
        state.embedder.as_ref(),
        state.generator.as_ref(),
        &state.store,
        state.config.retrieval.top_k,
    )
    .await
    .map_err(|e| internal(e.to_string()))?;

    Ok(Json(ChatResponse {
        answer: outcome.answer,
    }))
}

// ============ POST /upload ============

#[derive(Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub rows_count: usize,
    pub embedded_rows: usize,
    pub failed_rows: usize,
    pub embed_file: String,
}

/// Strip any directory components a client put in the file name.
fn safe_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .and_then(safe_file_name)
            .ok_or_else(|| bad_request("file field must carry a file name"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("failed to read upload: {}", e)))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let (file_name, bytes) = upload.ok_or_else(|| bad_request("missing 'file' field"))?;

    if !is_supported(&file_name) {
        return Err(unsupported_file(format!(
            "{}: only .csv and .json files are supported",
            file_name
        )));
    }

    let upload_dir = state.config.store.upload_dir();
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .map_err(|e| internal(format!("failed to create upload dir: {}", e)))?;
    let saved = upload_dir.join(&file_name);
    tokio::fs::write(&saved, &bytes)
        .await
        .map_err(|e| internal(format!("failed to save upload: {}", e)))?;

    let report = ingest_file(
        Path::new(&saved),
        state.embedder.as_ref(),
        &state.store,
        state.config.embedding.max_retries,
    )
    .await?;

    Ok(Json(UploadResponse {
        filename: file_name,
        rows_count: report.total_rows,
        embedded_rows: report.embedded_rows,
        failed_rows: report.failed_rows,
        embed_file: report.collection_path.unwrap_or(report.collection),
    }))
}

// ============ GET /collections ============

#[derive(Serialize)]
struct CollectionsResponse {
    collections: Vec<CollectionSummary>,
}

async fn handle_collections(
    State(state): State<AppState>,
) -> Result<Json<CollectionsResponse>, AppError> {
    let store = state.store.clone();
    let collections = tokio::task::spawn_blocking(move || store.list_collections())
        .await
        .map_err(|e| internal(e.to_string()))?
        .map_err(|e| internal(e.to_string()))?;
    Ok(Json(CollectionsResponse { collections }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("data.csv").as_deref(), Some("data.csv"));
        assert_eq!(
            safe_file_name("../../etc/passwd.csv").as_deref(),
            Some("passwd.csv")
        );
        assert_eq!(
            safe_file_name("C:\\Users\\me\\rows.json").as_deref(),
            Some("rows.json")
        );
        assert_eq!(safe_file_name("dir/"), None);
        assert_eq!(safe_file_name(".."), None);
    }
}
