//! OpenAI implementation of the ChatModel trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use matching::ai::OpenAiChat;
//!
//! let chat = OpenAiChat::from_env()?.with_model("gpt-4o-mini");
//! let selector = ChatSelector::new(Arc::new(chat), "", config.selection.clone());
//! ```

use std::time::Duration;

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};
use tracing::{debug, warn};

use crate::error::{ChatError, MatchError, Result};
use crate::traits::chat::{ChatModel, ChatPrompt};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Chat backend over the OpenAI chat completions endpoint.
///
/// Transient failures (network errors, 429, 5xx) are retried with
/// exponential backoff before being reported.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: OpenAIClient,
    model: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiChat {
    pub fn new(client: OpenAIClient) -> Self {
        Self {
            client,
            model: "gpt-3.5-turbo".to_string(),
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let client = OpenAIClient::from_env().map_err(|e| MatchError::Config(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Set the chat model (default: gpt-3.5-turbo).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Retries after the first attempt for transient failures (default: 2).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before the first retry; doubled on each further one.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Exponential backoff for retry `attempt` (0-based), capped.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_delay
            .checked_mul(2u32.saturating_pow(attempt))
            .map_or(MAX_RETRY_DELAY, |d| d.min(MAX_RETRY_DELAY))
    }

    fn request(&self, prompt: &ChatPrompt) -> ChatRequest {
        let mut request = ChatRequest::new(&self.model)
            .message(Message::system(&prompt.system))
            .message(Message::user(&prompt.user))
            .temperature(prompt.temperature)
            .max_tokens(prompt.max_tokens);
        if let Some(penalty) = prompt.presence_penalty {
            request = request.presence_penalty(penalty);
        }
        request
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, prompt: &ChatPrompt) -> std::result::Result<String, ChatError> {
        let mut attempt = 0;
        loop {
            match self.client.chat_completion(self.request(prompt)).await {
                Ok(response) => {
                    debug!(
                        model = %self.model,
                        finish_reason = ?response.finish_reason,
                        tokens = response.usage.as_ref().map(|u| u.total_tokens),
                        "Chat completion received"
                    );
                    return Ok(response.content);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff_delay(attempt);
                    warn!(error = %e, attempt = attempt + 1, ?delay, "Transient chat failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(ChatError::Backend(Box::new(e))),
            }
        }
    }
}
