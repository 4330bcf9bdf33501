//! Gemini `generateContent` adapter with a dynamically discovered catalog.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::ProviderError;
use crate::llm_client::models::{GeminiModelCatalog, ModelResolver};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{send_json, Completion, CompletionRequest, LlmProvider, ParsePolicy};
use crate::models::UsageCounters;

const PROVIDER: &str = "Gemini";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u64,
}

/// One request's Gemini adapter.
///
/// The requested model is resolved against the live catalog on first use and
/// the result is kept for the rest of this adapter's life (one request).
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
    resolver: Arc<dyn ModelResolver>,
    resolved: Mutex<Option<(String, String)>>,
}

impl GeminiProvider {
    pub fn new(client: Client, base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        let catalog = GeminiModelCatalog::new(client.clone(), base_url, api_key, timeout_secs);
        Self::with_resolver(client, base_url, api_key, timeout_secs, Arc::new(catalog))
    }

    pub fn with_resolver(
        client: Client,
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        resolver: Arc<dyn ModelResolver>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_secs,
            resolver,
            resolved: Mutex::new(None),
        }
    }

    async fn model_for(&self, requested: &str) -> Result<String, ProviderError> {
        let mut cached = self.resolved.lock().await;
        if let Some((asked, model)) = cached.as_ref() {
            if asked == requested {
                return Ok(model.clone());
            }
        }

        let model = self.resolver.resolve(requested).await?;
        info!("Using Gemini model '{}'", model);
        *cached = Some((requested.to_string(), model.clone()));
        Ok(model)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn parse_policy(&self) -> ParsePolicy {
        ParsePolicy::Placeholders
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError> {
        let model = self.model_for(request.model).await?;

        // No native structured mode here: JSON is asked for in plain words.
        let prompt = if request.json {
            format!("{}\n\n{}", request.prompt, JSON_ONLY_INSTRUCTION)
        } else {
            request.prompt.to_string()
        };

        let body = json!({
            "systemInstruction": { "parts": [{ "text": request.system }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let http = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body);

        let response: GenerateResponse = send_json(PROVIDER, http, self.timeout_secs).await?;

        // Blocked or empty candidates come back as empty text with their usage.
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let tokens = response
            .usage_metadata
            .map(|u| u.total_token_count)
            .unwrap_or(0);
        debug!("Gemini call succeeded: model={}, total_tokens={}", model, tokens);

        let input = format!("{}{}", request.system, prompt);
        Ok(Completion {
            usage: UsageCounters::for_exchange(&input, &text, tokens),
            text,
        })
    }
}
