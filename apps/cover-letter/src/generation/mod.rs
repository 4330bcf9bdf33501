// Cover letter generation: the three-stage pipeline, its prompts, the result
// envelope and the public entry points. All LLM calls go through llm_client.

pub mod envelope;
pub mod generator;
pub mod prompts;
pub mod service;

pub use envelope::ResultEnvelope;
pub use generator::{parse_job_insights, JobInsights, Orchestrator};
pub use service::{
    build_provider, generate_cover_letter, generate_from_document, generate_with_provider,
    validate_request,
};
