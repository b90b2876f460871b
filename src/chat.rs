//! Question answering: question → normalize → embed → rank → assemble → answer.
//!
//! Always produces an answer string. Failures that leave nothing to ground
//! on (query embedding failed, no scorable rows) short-circuit with a fixed
//! message instead of calling the generation model.

use anyhow::Result;
use serde::Serialize;
use tabrag_core::embedding::Embedder;
use tabrag_core::generation::AnswerGenerator;
use tabrag_core::search::search_store;
use tabrag_core::store::CollectionStore;
use tabrag_core::{assemble, normalize, Match};

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::generation::create_generator;
use crate::store::FileStore;

pub const EMBED_FAILED_MESSAGE: &str = "Failed to generate embedding for your question.";
pub const NO_DATA_MESSAGE: &str = "No data found. Please upload a CSV file first.";

/// Answer plus the rows it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub answer: String,
    pub matches: Vec<Match>,
}

impl ChatOutcome {
    fn short_circuit(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            matches: Vec::new(),
        }
    }
}

/// Rank stored rows against `question` without generating an answer.
///
/// Returns `Ok(None)` when the question could not be embedded. A store
/// that cannot be enumerated is logged and treated as holding no rows.
pub async fn retrieve<S>(
    question: &str,
    embedder: &dyn Embedder,
    store: &S,
    top_k: usize,
) -> Result<Option<Vec<Match>>>
where
    S: CollectionStore + Clone + 'static,
{
    let cleaned = normalize(question);
    let query = match embedder.embed(&cleaned).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "could not embed question");
            return Ok(None);
        }
    };

    let store = store.clone();
    let matches =
        match tokio::task::spawn_blocking(move || search_store(&store, &query, top_k)).await? {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate collections");
                Vec::new()
            }
        };
    tracing::info!(matches = matches.len(), "retrieval complete");

    Ok(Some(matches))
}

/// Answer `question` grounded on the `top_k` most similar stored rows.
///
/// Only a panicked store task surfaces as `Err`; everything else is folded
/// into the returned answer.
pub async fn answer_question<S>(
    question: &str,
    embedder: &dyn Embedder,
    generator: &dyn AnswerGenerator,
    store: &S,
    top_k: usize,
) -> Result<ChatOutcome>
where
    S: CollectionStore + Clone + 'static,
{
    let matches = match retrieve(question, embedder, store, top_k).await? {
        Some(m) => m,
        None => return Ok(ChatOutcome::short_circuit(EMBED_FAILED_MESSAGE)),
    };

    if matches.is_empty() {
        return Ok(ChatOutcome::short_circuit(NO_DATA_MESSAGE));
    }

    let context = assemble(&matches);
    let answer = generator.generate_answer(question, &context).await;

    Ok(ChatOutcome { answer, matches })
}

/// CLI entry point for `tabrag ask <QUESTION>`.
pub async fn run_ask(config: &Config, question: &str, limit: Option<usize>) -> Result<()> {
    let embedder = create_embedder(&config.embedding)?;
    let generator = create_generator(&config.generation)?;
    let store = FileStore::new(&config.store.dir);
    let top_k = limit.unwrap_or(config.retrieval.top_k);

    let outcome = answer_question(
        question,
        embedder.as_ref(),
        generator.as_ref(),
        &store,
        top_k,
    )
    .await?;

    println!("{}", outcome.answer);
    Ok(())
}

/// CLI entry point for `tabrag search <QUESTION>`.
pub async fn run_search(config: &Config, question: &str, limit: Option<usize>) -> Result<()> {
    let embedder = create_embedder(&config.embedding)?;
    let store = FileStore::new(&config.store.dir);
    let top_k = limit.unwrap_or(config.retrieval.top_k);

    let matches = match retrieve(question, embedder.as_ref(), &store, top_k).await? {
        Some(m) => m,
        None => {
            println!("{}", EMBED_FAILED_MESSAGE);
            return Ok(());
        }
    };

    if matches.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, m) in matches.iter().enumerate() {
        println!(
            "{}. [{:.4}] {}",
            i + 1,
            m.score,
            tabrag_core::render_row(&m.row_data)
        );
        println!("    source: {}", m.source_file);
    }

    Ok(())
}
