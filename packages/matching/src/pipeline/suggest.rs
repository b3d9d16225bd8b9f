//! Alternative search terms from the LLM.
//!
//! Used when the activity name itself finds nothing. A failed request is not
//! an error for the row: [`suggest_alternatives`] logs it and returns an empty
//! list, which callers read as "no alternatives available".

use tracing::{debug, warn};

use crate::error::SuggestionError;
use crate::pipeline::prompts::format_suggest_prompt;
use crate::traits::chat::{ChatModel, ChatPrompt};
use crate::types::config::SamplingConfig;

/// Split a comma-separated reply into trimmed terms.
///
/// Keeps every piece the split produces, empty ones included (a trailing
/// comma, `"a,,b"`); the search step skips those. A blank reply yields no
/// terms.
pub fn split_suggestions(reply: &str) -> Vec<String> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Vec::new();
    }
    reply.split(',').map(|s| s.trim().to_string()).collect()
}

/// Ask the model for alternative terms, surfacing backend failures.
pub async fn request_alternatives<C: ChatModel + ?Sized>(
    chat: &C,
    sampling: &SamplingConfig,
    activity: &str,
    hints: Option<&str>,
) -> Result<Vec<String>, SuggestionError> {
    let prompt = ChatPrompt::new("", format_suggest_prompt(activity, hints), sampling);

    let reply = chat
        .complete(&prompt)
        .await
        .map_err(|source| SuggestionError {
            activity: activity.to_string(),
            source,
        })?;

    let terms = split_suggestions(&reply);
    debug!(activity, ?terms, "Alternative search terms suggested");
    Ok(terms)
}

/// Ask the model for alternative terms; a failure yields an empty list.
pub async fn suggest_alternatives<C: ChatModel + ?Sized>(
    chat: &C,
    sampling: &SamplingConfig,
    activity: &str,
    hints: Option<&str>,
) -> Vec<String> {
    match request_alternatives(chat, sampling, activity, hints).await {
        Ok(terms) => terms,
        Err(e) => {
            warn!(error = %e, "No alternative search terms available");
            Vec::new()
        }
    }
}
