//! Anthropic Messages API provider

use crate::provider::{AdvisorError, AdvisorProvider, AdvisorResult};
use crate::types::{ChatMessage, ChatResponse, Role, Usage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait::async_trait]
impl AdvisorProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> AdvisorResult<ChatResponse> {
        // The Messages API takes the system prompt as a top-level field, not
        // as a conversation message.
        let mut system = String::new();
        let mut api_messages = Vec::new();
        for m in messages {
            if m.role == Role::System {
                system.push_str(&m.content);
                system.push('\n');
            } else {
                api_messages.push(ApiMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                });
            }
        }
        let system = system.trim();

        let body = ApiRequest {
            model: &self.model,
            max_tokens,
            temperature,
            messages: api_messages,
            system: (!system.is_empty()).then_some(system),
        };

        debug!("Anthropic request: model={}", self.model);

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Anthropic error {}: {}", status, error_text);

            return Err(match status.as_u16() {
                401 => AdvisorError::AuthFailed(error_text),
                429 => AdvisorError::RateLimited {
                    retry_after_ms: 60000,
                },
                _ => AdvisorError::RequestFailed(format!("{}: {}", status, error_text)),
            });
        }

        let parsed: ApiResponse = response.json().await?;
        let content = parsed
            .content
            .into_iter()
            .find_map(|b| match b {
                ApiContentBlock::Text { text } => Some(text),
            })
            .unwrap_or_default();

        Ok(ChatResponse {
            content,
            model: parsed.model,
            usage: Usage {
                input_tokens: parsed.usage.input_tokens,
                output_tokens: parsed.usage.output_tokens,
            },
        })
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ApiContentBlock>,
    model: String,
    #[serde(default)]
    usage: ApiUsage,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ApiContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Deserialize, Default)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}
