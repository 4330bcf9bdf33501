//! Model resolution: picks a concrete, available model for a requested name.
//!
//! Gemini's catalog changes over time, so the adapter never assumes a model
//! exists: it lists what the key can use and resolves against that list.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::ProviderError;
use crate::llm_client::send_json;

/// Fallback order: fast/cheap first, then higher reasoning, then legacy.
pub const GEMINI_MODEL_PREFERENCE: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-flash-latest",
    "gemini-2.0-flash-lite",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-pro",
];

const GENERATE_CONTENT: &str = "generateContent";
const PAGE_SIZE: u32 = 50;
const MAX_PAGES: usize = 10;

#[async_trait]
pub trait ModelResolver: Send + Sync {
    async fn resolve(&self, requested: &str) -> Result<String, ProviderError>;
}

/// Resolves every request to the requested name, or to a fixed model if the
/// request is blank. Used where the catalog is known up front.
#[derive(Debug, Clone)]
pub struct StaticModelResolver {
    fallback: String,
}

impl StaticModelResolver {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }
}

#[async_trait]
impl ModelResolver for StaticModelResolver {
    async fn resolve(&self, requested: &str) -> Result<String, ProviderError> {
        let requested = requested.trim();
        if requested.is_empty() {
            Ok(self.fallback.clone())
        } else {
            Ok(requested.to_string())
        }
    }
}

/// Picks a model from `available`: the requested name first, then each entry of
/// the preference list, each tried as an exact match and then as a substring.
/// Falls back to the first available model.
pub fn pick_model(requested: &str, available: &[String]) -> Option<String> {
    let requested = requested.trim().trim_start_matches("models/");
    let candidates = std::iter::once(requested)
        .filter(|r| !r.is_empty())
        .chain(GEMINI_MODEL_PREFERENCE.iter().copied());

    for candidate in candidates {
        if let Some(found) = available
            .iter()
            .find(|m| m.as_str() == candidate)
            .or_else(|| available.iter().find(|m| m.contains(candidate)))
        {
            return Some(found.clone());
        }
    }

    available.first().cloned()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<GeminiModel>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// Live Gemini catalog, scoped to one request's API key.
pub struct GeminiModelCatalog {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl GeminiModelCatalog {
    pub fn new(client: Client, base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_secs,
        }
    }

    /// Model ids (without the `models/` prefix) that support content generation.
    pub async fn list_generative_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let request = self
                .client
                .get(&url)
                .header("x-goog-api-key", &self.api_key)
                .query(&query);
            let page: ListModelsResponse = send_json("Gemini", request, self.timeout_secs).await?;

            models.extend(
                page.models
                    .into_iter()
                    .filter(|m| {
                        m.supported_generation_methods
                            .iter()
                            .any(|method| method == GENERATE_CONTENT)
                    })
                    .map(|m| {
                        m.name
                            .strip_prefix("models/")
                            .unwrap_or(&m.name)
                            .to_string()
                    }),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Gemini catalog lists {} generative models", models.len());
        Ok(models)
    }
}

#[async_trait]
impl ModelResolver for GeminiModelCatalog {
    async fn resolve(&self, requested: &str) -> Result<String, ProviderError> {
        let available = self.list_generative_models().await?;
        let resolved = pick_model(requested, &available).ok_or_else(|| {
            ProviderError::Unclassified(
                "no Gemini model supporting content generation is available for this API key"
                    .to_string(),
            )
        })?;

        if resolved != requested.trim() {
            info!("Requested Gemini model '{}' resolved to '{}'", requested, resolved);
        }
        Ok(resolved)
    }
}
