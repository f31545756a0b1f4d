//! Advisor provider trait

use crate::types::{ChatMessage, ChatResponse, Role};

/// Result type for advisor operations
pub type AdvisorResult<T> = Result<T, AdvisorError>;

/// Advisor error types
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Augment a conversation so the model answers with JSON matching `schema`.
///
/// If the last message is a user message, the instruction block is appended to
/// its content and the message count is unchanged; otherwise exactly one new
/// user message is appended. Callers rely on this growing the conversation by
/// at most one message.
pub fn augment_for_schema(messages: &[ChatMessage], schema: &serde_json::Value) -> Vec<ChatMessage> {
    let instruction = format!(
        "\n\nYou MUST respond with valid JSON conforming to this schema:\n```json\n{}\n```\nRespond ONLY with the JSON object, no other text.",
        serde_json::to_string_pretty(schema).unwrap_or_default()
    );

    let mut augmented = messages.to_vec();
    match augmented.last_mut() {
        Some(last) if last.role == Role::User => last.content.push_str(&instruction),
        _ => augmented.push(ChatMessage::user(instruction)),
    }
    augmented
}

/// Advisor provider trait
#[async_trait::async_trait]
pub trait AdvisorProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Send a chat completion request and return the whole response.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> AdvisorResult<ChatResponse>;

    /// Request structured JSON output conforming to a schema.
    ///
    /// The default implementation uses [`augment_for_schema`]. Providers with
    /// native structured output may override, but must keep the same message-
    /// count contract.
    async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        schema: &serde_json::Value,
        temperature: f32,
        max_tokens: u32,
    ) -> AdvisorResult<ChatResponse> {
        let augmented = augment_for_schema(messages, schema);
        self.complete(&augmented, temperature, max_tokens).await
    }
}
