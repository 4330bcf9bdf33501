use serde::Serialize;
use uuid::Uuid;

use crate::errors::{GenerationError, Stage};
use crate::models::{HiringContext, UsageCounters};

/// The only thing a generation call returns.
///
/// `ok == false` implies `text == None` and a non-empty, stage-prefixed `error`.
/// Usage is always present, including whatever was spent before a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub request_id: Uuid,
    pub ok: bool,
    pub text: Option<String>,
    pub usage: UsageCounters,
    pub error: Option<String>,
    /// Stage that failed, when the failure happened inside the pipeline.
    pub stage: Option<Stage>,
    pub hiring_context: Option<HiringContext>,
}

impl ResultEnvelope {
    pub fn success(
        request_id: Uuid,
        text: String,
        usage: UsageCounters,
        hiring_context: HiringContext,
    ) -> Self {
        Self {
            request_id,
            ok: true,
            text: Some(text),
            usage,
            error: None,
            stage: None,
            hiring_context: Some(hiring_context),
        }
    }

    pub fn failure(request_id: Uuid, error: &GenerationError, usage: UsageCounters) -> Self {
        Self {
            request_id,
            ok: false,
            text: None,
            usage,
            error: Some(error.to_string()),
            stage: error.stage(),
            hiring_context: None,
        }
    }
}
