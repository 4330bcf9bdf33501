/// LLM Client: the provider seam for the generation pipeline.
///
/// ARCHITECTURAL RULE: the pipeline talks to backends only through `LlmProvider`
/// and only ever sees `ProviderError`. Backend-specific status codes, payloads
/// and transport errors are classified here and never leak upward.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};

use crate::errors::ProviderError;
use crate::models::UsageCounters;

pub mod gemini;
pub mod models;
pub mod openai;
pub mod prompts;
pub mod retry;

pub use gemini::GeminiProvider;
pub use models::{pick_model, GeminiModelCatalog, ModelResolver, StaticModelResolver};
pub use openai::OpenAiProvider;
pub use retry::RetryPolicy;

/// One stage's call: system instruction, user content, model, and whether the
/// caller needs a JSON object back.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub model: &'a str,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: UsageCounters,
}

/// What the pipeline does when a structured (JSON) response cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Fail the stage.
    Abort,
    /// Continue with placeholder values.
    Placeholders,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    fn parse_policy(&self) -> ParsePolicy;

    /// One round trip. An empty reply is `Ok` with empty `text` so its usage
    /// is still counted; the pipeline turns it into `EmptyResponse`.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Error classification shared by the HTTP adapters
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<String>,
}

/// Maps a non-success HTTP status and body into the provider vocabulary.
///
/// OpenAI and Gemini both wrap errors as `{"error": {"message": ...}}`.
pub(crate) fn classify_status(
    provider: &str,
    status: StatusCode,
    body: &str,
    timeout_secs: u64,
) -> ProviderError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    let code = parsed
        .as_ref()
        .and_then(|e| e.error.code.as_ref())
        .map(|c| c.to_string())
        .unwrap_or_default();
    let detail = format!(
        "{message} {code} {}",
        parsed
            .as_ref()
            .and_then(|e| e.error.status.clone())
            .unwrap_or_default()
    )
    .to_ascii_lowercase();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthError,
        StatusCode::BAD_REQUEST
            if detail.contains("api_key_invalid") || detail.contains("api key not valid") =>
        {
            ProviderError::AuthError
        }
        StatusCode::TOO_MANY_REQUESTS if detail.contains("quota") => ProviderError::QuotaExceeded,
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::Timeout(Duration::from_secs(timeout_secs))
        }
        _ => ProviderError::Unclassified(format!(
            "{provider} API error (status {}): {message}",
            status.as_u16()
        )),
    }
}

pub(crate) fn classify_transport(
    provider: &str,
    err: reqwest::Error,
    timeout_secs: u64,
) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(Duration::from_secs(timeout_secs))
    } else if err.is_connect() {
        ProviderError::Connection(format!("{provider}: {}", err.without_url()))
    } else {
        ProviderError::Unclassified(format!("{provider} request failed: {}", err.without_url()))
    }
}

/// Sends a prepared request and decodes the JSON body, classifying every failure.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: reqwest::RequestBuilder,
    timeout_secs: u64,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| classify_transport(provider, e, timeout_secs))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_status(provider, status, &body, timeout_secs));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| classify_transport(provider, e, timeout_secs))
}

// ────────────────────────────────────────────────────────────────────────────
// Structured-output recovery
// ────────────────────────────────────────────────────────────────────────────

/// Parses a model reply as JSON, tolerating code fences and surrounding prose.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let stripped = strip_json_fences(text);
    match serde_json::from_str(stripped) {
        Ok(value) => Ok(value),
        Err(e) => match extract_json_object(stripped) {
            Some(object) => serde_json::from_str(object),
            None => Err(e),
        },
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the first balanced `{ ... }` block, ignoring braces inside strings.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
