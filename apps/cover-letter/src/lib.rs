//! Tailored cover letters from a resume and a job posting.
//!
//! The core is a three-stage LLM pipeline (extract → match → draft) behind a
//! provider seam, plus the input validation and resume text extraction that
//! feed it. Every public entry point answers with a [`ResultEnvelope`].

pub mod config;
pub mod errors;
pub mod export;
pub mod extractor;
pub mod generation;
pub mod llm_client;
pub mod models;
pub mod telemetry;
pub mod validation;

pub use config::Config;
pub use errors::{GenerationError, ProviderError, Stage, StageFailure};
pub use export::{render_exports, DocumentRenderer, ExportFormat, ExportRecord};
pub use extractor::{extract_resume_text, ExtractError, ExtractionOutcome};
pub use generation::{
    generate_cover_letter, generate_from_document, generate_with_provider, Orchestrator,
    ResultEnvelope,
};
pub use llm_client::{Completion, CompletionRequest, LlmProvider, ParsePolicy};
pub use models::{
    format_letter_date, GenerationRequest, HiringContext, ProviderKind, ResumeDocument,
    SenderProfile, SessionUsage, UsageCounters,
};
