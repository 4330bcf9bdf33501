use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::provider::ProviderKind;

/// Sender contact details printed in the letter header. Empty means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    #[serde(default, alias = "full_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, alias = "link")]
    pub linkedin: String,
    #[serde(default)]
    pub address: String,
}

/// Everything one generation needs. Created per call and dropped with its envelope.
#[derive(Clone, Deserialize)]
pub struct GenerationRequest {
    pub resume_text: String,
    pub job_description: String,
    #[serde(default)]
    pub sender: SenderProfile,
    /// Pre-formatted, e.g. "March 04, 2025". See [`format_letter_date`].
    pub date: String,
    pub provider: ProviderKind,
    /// Empty selects the provider's default model.
    #[serde(default)]
    pub model: String,
    /// Resolved plaintext API key. Never logged, never stored.
    pub credential: String,
}

impl GenerationRequest {
    pub fn model_or_default(&self) -> &str {
        let model = self.model.trim();
        if model.is_empty() {
            self.provider.default_model()
        } else {
            model
        }
    }
}

impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("resume_chars", &self.resume_text.chars().count())
            .field("job_description_chars", &self.job_description.chars().count())
            .field("sender", &self.sender.name)
            .field("date", &self.date)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Formats a letter date the way it appears in the header: "Month DD, YYYY".
pub fn format_letter_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}
