//! Chat trait for LLM completions.
//!
//! The pipeline needs exactly one LLM capability: send a system message and a
//! user prompt with sampling parameters, get text back. Prompt assembly and
//! reply parsing stay in the pipeline; implementations only move text.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChatError;
use crate::types::config::SamplingConfig;

/// One chat request: a system message, a user message and sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub presence_penalty: Option<f32>,
    pub max_tokens: u32,
}

impl ChatPrompt {
    /// Build a prompt with the given sampling settings.
    pub fn new(system: impl Into<String>, user: impl Into<String>, sampling: &SamplingConfig) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: sampling.temperature,
            presence_penalty: sampling.presence_penalty,
            max_tokens: sampling.max_tokens,
        }
    }
}

/// LLM completion backend.
///
/// Implementations wrap a specific provider and return the raw reply text.
/// No schema is enforced on the reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ChatError>;
}

#[async_trait]
impl<T: ChatModel + ?Sized> ChatModel for Arc<T> {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ChatError> {
        (**self).complete(prompt).await
    }
}

/// Chat backend for offline runs: every call fails with
/// [`ChatError::Unavailable`], so suggestions degrade to an empty list.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineChat;

#[async_trait]
impl ChatModel for OfflineChat {
    async fn complete(&self, _prompt: &ChatPrompt) -> Result<String, ChatError> {
        Err(ChatError::Unavailable("running offline".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::MatchConfig;

    #[test]
    fn test_prompt_takes_sampling() {
        let config = MatchConfig::default();
        let prompt = ChatPrompt::new("", "hello", &config.suggestion);

        assert_eq!(prompt.temperature, 0.7);
        assert_eq!(prompt.presence_penalty, Some(0.7));
        assert_eq!(prompt.max_tokens, 50);
    }

    #[tokio::test]
    async fn test_offline_chat_is_unavailable() {
        let prompt = ChatPrompt::new("", "hello", &MatchConfig::default().selection);
        let result = OfflineChat.complete(&prompt).await;

        assert!(matches!(result, Err(ChatError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_arc_forwards() {
        let chat: Arc<dyn ChatModel> = Arc::new(OfflineChat);
        let prompt = ChatPrompt::new("", "hello", &MatchConfig::default().selection);

        assert!(chat.complete(&prompt).await.is_err());
    }
}
