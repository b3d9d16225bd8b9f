//! Final choice of one dataset among the search results.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChatError;
use crate::pipeline::prompts::format_select_prompt;
use crate::traits::chat::{ChatModel, ChatPrompt};
use crate::types::candidate::Candidate;
use crate::types::config::SamplingConfig;
use crate::types::flow::SelectedLabel;

/// Picks the label that represents a flow.
///
/// Receives the normalized activity name and every candidate gathered for it
/// (possibly none). The returned label is accepted verbatim; validation happens
/// when it is parsed.
#[async_trait]
pub trait LabelSelector: Send + Sync {
    async fn select(
        &self,
        activity: &str,
        candidates: &[Candidate],
    ) -> Result<SelectedLabel, ChatError>;
}

#[async_trait]
impl<T: LabelSelector + ?Sized> LabelSelector for Arc<T> {
    async fn select(
        &self,
        activity: &str,
        candidates: &[Candidate],
    ) -> Result<SelectedLabel, ChatError> {
        (**self).select(activity, candidates).await
    }
}

/// Selector that asks the LLM to apply the disambiguation rules.
pub struct ChatSelector<C> {
    chat: C,
    system_message: String,
    sampling: SamplingConfig,
}

impl<C: ChatModel> ChatSelector<C> {
    pub fn new(chat: C, system_message: impl Into<String>, sampling: SamplingConfig) -> Self {
        Self {
            chat,
            system_message: system_message.into(),
            sampling,
        }
    }
}

#[async_trait]
impl<C: ChatModel> LabelSelector for ChatSelector<C> {
    async fn select(
        &self,
        activity: &str,
        candidates: &[Candidate],
    ) -> Result<SelectedLabel, ChatError> {
        let prompt = ChatPrompt::new(
            self.system_message.clone(),
            format_select_prompt(activity, candidates),
            &self.sampling,
        );
        let reply = self.chat.complete(&prompt).await?;
        Ok(SelectedLabel::new(reply))
    }
}
