//! Answer generation client trait.

use async_trait::async_trait;

/// Answers a question using retrieved grounding context.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    /// Generate an answer for `question` grounded on `context`.
    ///
    /// Infallible by contract: remote failures come back as a
    /// user-presentable string describing the error.
    async fn generate_answer(&self, question: &str, context: &str) -> String;
}
