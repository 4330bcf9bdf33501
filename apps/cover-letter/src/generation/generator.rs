//! Cover Letter Generation: orchestrates the three-stage pipeline.
//!
//! Flow: extract (JD → skills + hiring context) → match (skills + resume →
//!       experience narrative) → draft (header + narrative + JD → letter).
//!
//! Stages run strictly in order; the first failure stops the pipeline and is
//! reported in the envelope together with the usage spent so far.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{GenerationError, ProviderError, Stage, StageFailure};
use crate::generation::envelope::ResultEnvelope;
use crate::generation::prompts::{
    drafting_prompt, drafting_system, extraction_prompt, extraction_system, letter_header,
    matching_prompt, matching_system,
};
use crate::llm_client::{
    parse_json_reply, CompletionRequest, LlmProvider, ParsePolicy, RetryPolicy,
};
use crate::models::{GenerationRequest, HiringContext, UsageCounters};

// ────────────────────────────────────────────────────────────────────────────
// Stage 1 output
// ────────────────────────────────────────────────────────────────────────────

/// What stage 1 extracts from the job description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobInsights {
    /// Comma-separated skills. Empty when the model found none.
    pub skills: String,
    pub hiring: HiringContext,
}

/// Raw stage-1 payload. Fields are loose `Value`s because models return
/// strings, arrays or nulls interchangeably.
#[derive(Debug, Deserialize)]
struct RawInsights {
    #[serde(default)]
    skills: Option<Value>,
    #[serde(default)]
    company: Option<Value>,
    #[serde(default)]
    manager: Option<Value>,
    #[serde(default)]
    address: Option<Value>,
}

/// Parses the stage-1 reply. Missing, null or blank fields take their placeholders.
pub fn parse_job_insights(reply: &str) -> Result<JobInsights, serde_json::Error> {
    let value: Value = parse_json_reply(reply)?;
    if !value.is_object() {
        return Err(<serde_json::Error as serde::de::Error>::custom(
            "expected a JSON object",
        ));
    }
    let raw: RawInsights = serde_json::from_value(value)?;
    let defaults = HiringContext::default();

    Ok(JobInsights {
        skills: raw.skills.as_ref().and_then(field_text).unwrap_or_default(),
        hiring: HiringContext {
            company: raw
                .company
                .as_ref()
                .and_then(field_text)
                .unwrap_or(defaults.company),
            manager: raw
                .manager
                .as_ref()
                .and_then(field_text)
                .unwrap_or(defaults.manager),
            address: raw
                .address
                .as_ref()
                .and_then(field_text)
                .unwrap_or(defaults.address),
        },
    })
}

fn field_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(field_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };
    (!text.is_empty()).then_some(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

/// Stateless driver for the pipeline. One instance can serve any number of
/// independent requests concurrently; each call gets its own provider.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    stage_timeout: Duration,
    retry: RetryPolicy,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Orchestrator {
    pub fn new(stage_timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            stage_timeout,
            retry,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.request_timeout,
            RetryPolicy::with_attempts(config.retry_attempts),
        )
    }

    /// Runs all three stages and always returns an envelope.
    pub async fn run(
        &self,
        provider: &dyn LlmProvider,
        request: &GenerationRequest,
    ) -> ResultEnvelope {
        let request_id = Uuid::new_v4();
        let mut usage = UsageCounters::default();

        info!(
            "[{}] Generating cover letter with {} ({})",
            request_id,
            provider.name(),
            request.model_or_default()
        );

        match self.run_attempts(request_id, provider, request, &mut usage).await {
            Ok((letter, hiring)) => {
                info!(
                    "[{}] Cover letter generated: {} chars, {} tokens",
                    request_id,
                    letter.chars().count(),
                    usage.total_tokens
                );
                ResultEnvelope::success(request_id, letter, usage, hiring)
            }
            Err(e) => {
                warn!("[{}] Generation failed: {}", request_id, e);
                ResultEnvelope::failure(request_id, &e, usage)
            }
        }
    }

    /// Runs the stages, restarting the whole request from stage 1 after a
    /// transient provider failure while the retry policy allows. Usage of
    /// every attempt is kept.
    async fn run_attempts(
        &self,
        request_id: Uuid,
        provider: &dyn LlmProvider,
        request: &GenerationRequest,
        usage: &mut UsageCounters,
    ) -> Result<(String, HiringContext), GenerationError> {
        let mut attempt = 1;
        loop {
            let err = match self.run_stages(provider, request, usage).await {
                Ok(done) => return Ok(done),
                Err(e) => e,
            };
            let delay = err
                .provider_error()
                .and_then(|cause| self.retry.retry_after(attempt, cause));
            let Some(delay) = delay else {
                return Err(err);
            };

            warn!(
                "[{}] Attempt {}/{} failed ({}), retrying request after {}ms...",
                request_id,
                attempt,
                self.retry.max_attempts,
                err,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn run_stages(
        &self,
        provider: &dyn LlmProvider,
        request: &GenerationRequest,
        usage: &mut UsageCounters,
    ) -> Result<(String, HiringContext), GenerationError> {
        if request.resume_text.trim().is_empty() {
            return Err(GenerationError::Validation(
                "resume text is empty".to_string(),
            ));
        }
        if request.job_description.trim().is_empty() {
            return Err(GenerationError::Validation(
                "job description is empty".to_string(),
            ));
        }

        let model = request.model_or_default();

        // Stage 1: skills + hiring context
        let insights = self
            .extract(provider, model, &request.job_description, usage)
            .await?;
        info!(
            "Extraction done: company={:?}, manager={:?}",
            insights.hiring.company, insights.hiring.manager
        );

        // Stage 2: match resume experience to skills
        let matched = self
            .call_stage(
                provider,
                Stage::Matching,
                CompletionRequest {
                    system: &matching_system(),
                    prompt: &matching_prompt(&insights.skills, &request.resume_text),
                    model,
                    json: false,
                },
                usage,
            )
            .await?;

        // Stage 3: draft the letter under the fixed header
        let header = letter_header(&request.sender, &request.date, &insights.hiring);
        let letter = self
            .call_stage(
                provider,
                Stage::Drafting,
                CompletionRequest {
                    system: &drafting_system(&header),
                    prompt: &drafting_prompt(&matched, &request.job_description),
                    model,
                    json: false,
                },
                usage,
            )
            .await?;

        Ok((letter, insights.hiring))
    }

    async fn extract(
        &self,
        provider: &dyn LlmProvider,
        model: &str,
        job_description: &str,
        usage: &mut UsageCounters,
    ) -> Result<JobInsights, GenerationError> {
        let reply = self
            .call_stage(
                provider,
                Stage::Extraction,
                CompletionRequest {
                    system: &extraction_system(),
                    prompt: &extraction_prompt(job_description),
                    model,
                    json: true,
                },
                usage,
            )
            .await?;

        match parse_job_insights(&reply) {
            Ok(insights) => Ok(insights),
            Err(e) => match provider.parse_policy() {
                ParsePolicy::Abort => Err(GenerationError::at(
                    Stage::Extraction,
                    StageFailure::MalformedResponse(e.to_string()),
                )),
                ParsePolicy::Placeholders => {
                    warn!(
                        "{} extraction reply was not valid JSON ({e}), using placeholders",
                        provider.name()
                    );
                    Ok(JobInsights::default())
                }
            },
        }
    }

    /// One bounded provider round trip. Usage is added for every call that
    /// returned, including one whose text is empty.
    async fn call_stage(
        &self,
        provider: &dyn LlmProvider,
        stage: Stage,
        request: CompletionRequest<'_>,
        usage: &mut UsageCounters,
    ) -> Result<String, GenerationError> {
        let completion = tokio::time::timeout(self.stage_timeout, provider.complete(request))
            .await
            .unwrap_or(Err(ProviderError::Timeout(self.stage_timeout)))
            .map_err(|e| GenerationError::at(stage, e))?;

        *usage = usage.combine(completion.usage);

        if completion.text.trim().is_empty() {
            return Err(GenerationError::at(stage, ProviderError::EmptyResponse));
        }
        Ok(completion.text)
    }
}
