//! OpenAI chat completions adapter with a fixed model catalog.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ProviderError;
use crate::llm_client::{send_json, Completion, CompletionRequest, LlmProvider, ParsePolicy};
use crate::models::UsageCounters;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const PROVIDER: &str = "OpenAI";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenUsage {
    #[serde(default)]
    total_tokens: u64,
}

/// One request's OpenAI adapter. The model name is sent verbatim.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl OpenAiProvider {
    pub fn new(client: Client, base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_secs,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn parse_policy(&self) -> ParsePolicy {
        ParsePolicy::Abort
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError> {
        let body = ChatRequest {
            model: request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            // Strict JSON-object mode keeps stage-1 parsing deterministic.
            response_format: request.json.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let http = self
            .client
            .post(format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH))
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: ChatResponse = send_json(PROVIDER, http, self.timeout_secs).await?;

        // An empty reply still costs tokens; the caller decides what empty means.
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        let tokens = response.usage.map(|u| u.total_tokens).unwrap_or(0);
        debug!(
            "OpenAI call succeeded: model={}, total_tokens={}",
            request.model, tokens
        );

        let input = format!("{}{}", request.system, request.prompt);
        Ok(Completion {
            usage: UsageCounters::for_exchange(&input, &text, tokens),
            text,
        })
    }
}
