use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// The fixed vocabulary every provider adapter maps its failures into.
///
/// The pipeline never inspects backend-specific error types; anything an adapter
/// cannot classify lands in `Unclassified` with the provider's own message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("authentication failed: the API key was rejected")]
    AuthError,

    #[error("rate limited by the provider, wait a moment and try again")]
    RateLimited,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("quota exceeded, check the account's plan and billing limits")]
    QuotaExceeded,

    #[error("the model returned an empty response")]
    EmptyResponse,

    #[error("could not reach the provider: {0}")]
    Connection(String),

    #[error("{0}")]
    Unclassified(String),
}

impl ProviderError {
    /// Only timeouts and connection failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Timeout(_) | ProviderError::Connection(_))
    }
}

/// One of the three sequential LLM round trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Matching,
    Drafting,
}

impl Stage {
    pub fn number(self) -> u8 {
        match self {
            Stage::Extraction => 1,
            Stage::Matching => 2,
            Stage::Drafting => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Extraction => "Extraction",
            Stage::Matching => "Matching",
            Stage::Drafting => "Drafting",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} ({})", self.number(), self.label())
    }
}

/// Why a stage failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("could not parse the model's JSON response: {0}")]
    MalformedResponse(String),
}

/// Stage-qualified generation error. Its `Display` is the single sentence
/// surfaced to users inside a failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{stage}: {failure}")]
    Stage { stage: Stage, failure: StageFailure },

    #[error("Unexpected failure: {0}")]
    Unclassified(String),
}

impl GenerationError {
    pub fn at(stage: Stage, failure: impl Into<StageFailure>) -> Self {
        GenerationError::Stage {
            stage,
            failure: failure.into(),
        }
    }

    /// The provider failure behind a stage error, if that is what failed.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            GenerationError::Stage {
                failure: StageFailure::Provider(e),
                ..
            } => Some(e),
            _ => None,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            GenerationError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
