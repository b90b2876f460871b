//! HTTP API tests: the real router on a free port, mock model clients.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tabrag::chat::NO_DATA_MESSAGE;
use tabrag::config::Config;
use tabrag::server::{router, AppState, ChatResponse, UploadResponse};
use tabrag_core::embedding::Embedder;
use tabrag_core::generation::AnswerGenerator;
use tabrag_core::EmbeddingError;
use tempfile::TempDir;

// ─── Mocks ──────────────────────────────────────────────────────────

/// Two-dimensional embedding: [mentions paris, mentions tokyo].
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let paris = if text.contains("paris") { 1.0 } else { 0.0 };
        let tokyo = if text.contains("tokyo") { 1.0 } else { 0.0 };
        if paris == 0.0 && tokyo == 0.0 {
            return Err(EmbeddingError::MissingVector);
        }
        Ok(vec![paris, tokyo])
    }
}

/// Answers with the first line of context.
struct FirstLineGenerator;

#[async_trait]
impl AnswerGenerator for FirstLineGenerator {
    fn model_name(&self) -> &str {
        "first-line"
    }

    async fn generate_answer(&self, _question: &str, context: &str) -> String {
        context.lines().next().unwrap_or_default().to_string()
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

async fn start_server(tmp: &TempDir) -> String {
    let mut config = Config::minimal(tmp.path().join("embeddings"));
    config.store.upload_dir = Some(tmp.path().join("upload"));
    config.retrieval.top_k = 1;

    let state = AppState::new(config, Arc::new(KeywordEmbedder), Arc::new(FirstLineGenerator));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn upload(base: &str, file_name: &str, content: &str) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(content.as_bytes().to_vec())
        .file_name(file_name.to_string());
    let form = reqwest::multipart::Form::new().part("file", part);
    reqwest::Client::new()
        .post(format!("{}/upload", base))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

async fn chat(base: &str, question: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&serde_json::json!({ "question": question }))
        .send()
        .await
        .unwrap()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&tmp).await;

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_upload_then_chat() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&tmp).await;

    let resp = upload(&base, "cities.csv", "id,city\n1,Paris\n2,Tokyo\n3,Lima\n").await;
    assert_eq!(resp.status(), 200);
    let report: UploadResponse = resp.json().await.unwrap();
    assert_eq!(report.filename, "cities.csv");
    assert_eq!(report.rows_count, 3);
    assert_eq!(report.embedded_rows, 2);
    assert_eq!(report.failed_rows, 1);
    assert!(report.embed_file.ends_with("_embeddings.json"));
    assert!(tmp.path().join("upload").join("cities.csv").exists());

    let resp = chat(&base, "Tell me about Tokyo!").await;
    assert_eq!(resp.status(), 200);
    let answer: ChatResponse = resp.json().await.unwrap();
    assert_eq!(answer.answer, "id: 2, city: Tokyo");
}

#[tokio::test]
async fn test_chat_without_data() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&tmp).await;

    let resp = chat(&base, "paris?").await;
    assert_eq!(resp.status(), 200);
    let answer: ChatResponse = resp.json().await.unwrap();
    assert_eq!(answer.answer, NO_DATA_MESSAGE);
}

#[tokio::test]
async fn test_chat_empty_question_rejected() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&tmp).await;

    let resp = chat(&base, "   ").await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_upload_unsupported_type() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&tmp).await;

    let resp = upload(&base, "notes.txt", "hello").await;
    assert_eq!(resp.status(), 415);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "unsupported_file");
    assert!(!tmp.path().join("embeddings").exists());
}

#[tokio::test]
async fn test_upload_malformed_json() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&tmp).await;

    let resp = upload(&base, "rows.json", "[{\"a\": [1, 2]}]").await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_upload_missing_file_field() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&tmp).await;

    let form = reqwest::multipart::Form::new().text("other", "value");
    let resp = reqwest::Client::new()
        .post(format!("{}/upload", base))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_collections_listing() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(&tmp).await;

    upload(&base, "cities.json", r#"[{"city":"Paris"},{"city":"Tokyo"}]"#).await;

    let resp = reqwest::get(format!("{}/collections", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let collections = body["collections"].as_array().unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0]["source_file"], "cities.json");
    assert_eq!(collections[0]["total_rows"], 2);
    assert_eq!(collections[0]["scorable_rows"], 2);
}
