//! Answer generation on top of any [`ModelClient`].

use std::sync::Arc;

use crate::llm::client::{LlmError, ModelClient};

/// Sends prompts to a model client and returns the first candidate's text.
///
/// Failures stay in the `Err` arm; callers decide how to show them
/// (see [`LlmError::user_message`]).
#[derive(Clone)]
pub struct AnswerGenerator {
    client: Arc<dyn ModelClient>,
}

impl AnswerGenerator {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Generate an answer for `prompt`.
    ///
    /// # Errors
    ///
    /// [`LlmError::NoCandidates`] when the model produced nothing, or any
    /// transport / service / parse error from the client.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.client.generate_content(prompt).await?;
        let text = response.first_text()?;
        log::debug!("llm: answer has {} chars", text.chars().count());
        Ok(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::GenerateContentResponse;
    use async_trait::async_trait;

    /// Returns a fixed response.
    struct FixedClient(GenerateContentResponse);

    #[async_trait]
    impl ModelClient for FixedClient {
        async fn generate_content(
            &self,
            _prompt: &str,
        ) -> Result<GenerateContentResponse, LlmError> {
            Ok(self.0.clone())
        }
    }

    /// Always fails with a transport error.
    struct FailingClient;

    #[async_trait]
    impl ModelClient for FailingClient {
        async fn generate_content(
            &self,
            _prompt: &str,
        ) -> Result<GenerateContentResponse, LlmError> {
            Err(LlmError::Request("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn returns_first_candidate_text() {
        let generator = AnswerGenerator::new(Arc::new(FixedClient(
            GenerateContentResponse::from_text("Pakistan is in South Asia."),
        )));
        let answer = generator.generate("prompt").await.unwrap();
        assert_eq!(answer, "Pakistan is in South Asia.");
    }

    #[tokio::test]
    async fn no_candidates_reads_no_answer_generated() {
        let generator =
            AnswerGenerator::new(Arc::new(FixedClient(GenerateContentResponse::default())));
        let err = generator.generate("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::NoCandidates));
        assert_eq!(err.user_message(), "No answer generated.");
    }

    #[tokio::test]
    async fn client_failure_reads_as_error() {
        let generator = AnswerGenerator::new(Arc::new(FailingClient));
        let err = generator.generate("prompt").await.unwrap_err();
        let message = err.user_message();
        assert!(message.starts_with("Error:"), "{message}");
        assert!(message.contains("connection refused"));
    }
}
