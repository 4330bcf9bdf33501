use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_COMPANY: &str = "Company";
pub const PLACEHOLDER_MANAGER: &str = "Hiring Manager";
pub const PLACEHOLDER_ADDRESS: &str = "Headquarters";

/// Recipient block extracted from the job description in stage 1.
///
/// Any field the model could not determine holds its placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringContext {
    pub company: String,
    pub manager: String,
    pub address: String,
}

impl Default for HiringContext {
    fn default() -> Self {
        Self {
            company: PLACEHOLDER_COMPANY.to_string(),
            manager: PLACEHOLDER_MANAGER.to_string(),
            address: PLACEHOLDER_ADDRESS.to_string(),
        }
    }
}
