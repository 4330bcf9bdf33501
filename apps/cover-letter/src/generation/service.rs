//! Public entry points. Each one returns a `ResultEnvelope` for every expected
//! failure; nothing here returns `Err` or lets a panic escape.

use std::sync::Arc;

use reqwest::Client;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::GenerationError;
use crate::extractor::{extract_text, ExtractError};
use crate::generation::envelope::ResultEnvelope;
use crate::generation::generator::Orchestrator;
use crate::llm_client::{GeminiProvider, LlmProvider, OpenAiProvider};
use crate::models::{GenerationRequest, ProviderKind, ResumeDocument, UsageCounters};
use crate::validation::{validate_api_key, validate_email, validate_job_description};

/// Checks a request before any network call is made.
pub fn validate_request(request: &GenerationRequest) -> Result<(), GenerationError> {
    if request.resume_text.trim().is_empty() {
        return Err(GenerationError::Validation(
            "Resume text is empty. Upload a resume with selectable text.".to_string(),
        ));
    }

    let verdicts = [
        validate_job_description(&request.job_description),
        validate_api_key(&request.credential, request.provider),
    ];
    for verdict in verdicts {
        if !verdict.valid {
            return Err(GenerationError::Validation(verdict.error.unwrap_or_default()));
        }
    }

    if !request.sender.email.trim().is_empty() {
        let verdict = validate_email(&request.sender.email);
        if !verdict.valid {
            return Err(GenerationError::Validation(verdict.error.unwrap_or_default()));
        }
    }

    Ok(())
}

/// Builds the request-scoped adapter for `provider` with this request's credential.
pub fn build_provider(
    config: &Config,
    provider: ProviderKind,
    credential: &str,
) -> Result<Arc<dyn LlmProvider>, GenerationError> {
    let client = Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| GenerationError::Unclassified(format!("failed to build HTTP client: {e}")))?;
    let timeout_secs = config.request_timeout.as_secs();
    let credential = credential.trim();

    Ok(match provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
            client,
            &config.openai_base_url,
            credential,
            timeout_secs,
        )),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            client,
            &config.gemini_base_url,
            credential,
            timeout_secs,
        )),
    })
}

/// Generates a cover letter from already-extracted resume text.
pub async fn generate_cover_letter(config: &Config, request: GenerationRequest) -> ResultEnvelope {
    if let Err(e) = validate_request(&request) {
        return rejected(&e);
    }

    match build_provider(config, request.provider, &request.credential) {
        Ok(provider) => generate_with_provider(config, provider, request).await,
        Err(e) => rejected(&e),
    }
}

/// Extracts the resume text from `document`, then generates.
///
/// Extraction failures are reported as validation failures: no network call
/// is made for a document that cannot be read.
pub async fn generate_from_document(
    config: &Config,
    document: &ResumeDocument,
    mut request: GenerationRequest,
) -> ResultEnvelope {
    let document = document.clone();
    match extract_on_blocking_pool(move || extract_text(&document)).await {
        Ok(text) => {
            request.resume_text = text;
            generate_cover_letter(config, request).await
        }
        Err(e) => rejected(&e),
    }
}

/// Runs PDF parsing on the blocking pool. A parser panic comes back as
/// `Unclassified`.
async fn extract_on_blocking_pool<F>(extract: F) -> Result<String, GenerationError>
where
    F: FnOnce() -> Result<String, ExtractError> + Send + 'static,
{
    match tokio::task::spawn_blocking(extract).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(GenerationError::Validation(e.to_string())),
        Err(join_error) => {
            error!("Resume extraction aborted: {join_error}");
            Err(GenerationError::Unclassified(
                "the resume could not be processed, please try again".to_string(),
            ))
        }
    }
}

/// Validates, then runs the pipeline against a caller-supplied provider.
///
/// The pipeline runs on its own task so that a panic anywhere inside it is
/// reported as an `Unclassified` failure instead of unwinding into the caller.
pub async fn generate_with_provider(
    config: &Config,
    provider: Arc<dyn LlmProvider>,
    request: GenerationRequest,
) -> ResultEnvelope {
    if let Err(e) = validate_request(&request) {
        return rejected(&e);
    }

    let orchestrator = Orchestrator::from_config(config);
    let task = tokio::spawn(async move { orchestrator.run(provider.as_ref(), &request).await });

    match task.await {
        Ok(envelope) => envelope,
        Err(join_error) => {
            error!("Generation task aborted: {join_error}");
            rejected(&GenerationError::Unclassified(
                "the generation pipeline stopped unexpectedly, please try again".to_string(),
            ))
        }
    }
}

fn rejected(error: &GenerationError) -> ResultEnvelope {
    info!("Generation rejected: {error}");
    ResultEnvelope::failure(Uuid::new_v4(), error, UsageCounters::default())
}
