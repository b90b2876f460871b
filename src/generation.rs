//! Answer generation clients.
//!
//! - **[`DisabledGenerator`]**: returns a fixed error string.
//! - **[`OllamaGenerator`]**: calls `POST /api/generate` with `stream: false`.
//!
//! Neither ever returns an error value: every failure is rendered as an
//! `"LLM Error: ..."` string that can be shown to the user verbatim.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tabrag_core::generation::AnswerGenerator;

use crate::config::GenerationConfig;

/// Returned when the model responds without a `response` field.
pub const NO_COMPLETION_MESSAGE: &str = "Could not generate answer.";

/// Build the grounded prompt sent to the generation model.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "Based on the following data, answer the question concisely and accurately.\n\n\
         Data:\n{}\n\n\
         Question: {}\n\n\
         Answer:",
        context, question
    )
}

fn failure(detail: impl std::fmt::Display) -> String {
    format!("LLM Error: {}", detail)
}

pub struct DisabledGenerator;

#[async_trait]
impl AnswerGenerator for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate_answer(&self, _question: &str, _context: &str) -> String {
        failure("answer generation is disabled")
    }
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Generator backed by Ollama's non-streaming completion endpoint.
pub struct OllamaGenerator {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("generation.model required for Ollama provider"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/api/generate", config.base_url().trim_end_matches('/')),
            model,
        })
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self.client.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Ollama API error {}: {}", status, body_text);
        }

        let parsed: OllamaGenerateResponse = response.json().await?;
        Ok(parsed
            .response
            .unwrap_or_else(|| NO_COMPLETION_MESSAGE.to_string()))
    }
}

#[async_trait]
impl AnswerGenerator for OllamaGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_answer(&self, question: &str, context: &str) -> String {
        let prompt = build_prompt(question, context);
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "requesting answer");

        match self.request(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "answer generation failed");
                failure(e)
            }
        }
    }
}

/// Create the [`AnswerGenerator`] named by `generation.provider`.
pub fn create_generator(config: &GenerationConfig) -> Result<Box<dyn AnswerGenerator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledGenerator)),
        "ollama" => Ok(Box::new(OllamaGenerator::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let p = build_prompt("Where is Paris?", "id: 1, city: Paris");
        assert_eq!(
            p,
            "Based on the following data, answer the question concisely and accurately.\n\n\
             Data:\nid: 1, city: Paris\n\nQuestion: Where is Paris?\n\nAnswer:"
        );
    }

    #[tokio::test]
    async fn test_disabled_returns_string() {
        let answer = DisabledGenerator.generate_answer("q", "c").await;
        assert!(answer.starts_with("LLM Error:"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_string() {
        let cfg = GenerationConfig {
            provider: "ollama".into(),
            model: Some("llama3.2".into()),
            url: Some("http://127.0.0.1:9".into()),
            timeout_secs: 2,
        };
        let g = OllamaGenerator::new(&cfg).unwrap();
        let answer = g.generate_answer("q", "c").await;
        assert!(answer.starts_with("LLM Error:"), "got {}", answer);
    }
}
