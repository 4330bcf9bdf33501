//! Input validation: pure checks that run before any network call.
//!
//! Every validator returns a structured verdict and never fails; callers decide
//! what to do with an invalid verdict.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::{ProviderKind, ResumeDocument};

pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;
pub const DOCUMENT_EXTENSION: &str = "pdf";
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 5000;

pub const OPENAI_KEY_PREFIX: &str = "sk-";
pub const OPENAI_KEY_MIN_LEN: usize = 20;
pub const GEMINI_KEY_MIN_LEN: usize = 30;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

static GEMINI_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid key charset regex"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }
}

/// Verdict for an uploaded resume document, with the measured size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentValidation {
    pub valid: bool,
    pub error: Option<String>,
    pub size_mb: f64,
}

/// Checks presence, size (≤ 10 MB) and the `.pdf` extension.
pub fn validate_resume_document(document: Option<&ResumeDocument>) -> DocumentValidation {
    let Some(document) = document else {
        return DocumentValidation {
            valid: false,
            error: Some("No resume uploaded. Please upload a PDF.".to_string()),
            size_mb: 0.0,
        };
    };

    let size_mb = document.size_bytes() as f64 / (1024.0 * 1024.0);

    let error = if document.size_bytes() > MAX_DOCUMENT_BYTES {
        Some(format!(
            "Resume is too large ({size_mb:.1} MB). The maximum size is {} MB.",
            MAX_DOCUMENT_BYTES / (1024 * 1024)
        ))
    } else if !has_extension(&document.filename, DOCUMENT_EXTENSION) {
        Some(format!(
            "'{}' is not a PDF. Please upload a .pdf file.",
            document.filename
        ))
    } else {
        None
    };

    DocumentValidation {
        valid: error.is_none(),
        error,
        size_mb,
    }
}

fn has_extension(filename: &str, extension: &str) -> bool {
    std::path::Path::new(filename.trim())
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Job description must be non-empty and between 50 and 5000 characters (trimmed).
pub fn validate_job_description(text: &str) -> ValidationResult {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ValidationResult::fail("Job description cannot be empty.");
    }

    let len = trimmed.chars().count();
    if len < MIN_JOB_DESCRIPTION_CHARS {
        return ValidationResult::fail(format!(
            "Job description is too short ({len} characters). Provide at least {MIN_JOB_DESCRIPTION_CHARS} characters."
        ));
    }
    if len > MAX_JOB_DESCRIPTION_CHARS {
        return ValidationResult::fail(format!(
            "Job description is too long ({len} characters). Keep it under {MAX_JOB_DESCRIPTION_CHARS} characters."
        ));
    }

    ValidationResult::ok()
}

/// Shape check for a provider API key. Does not contact the provider.
pub fn validate_api_key(key: &str, provider: ProviderKind) -> ValidationResult {
    let key = key.trim();
    if key.is_empty() {
        return ValidationResult::fail("API key cannot be empty.");
    }

    match provider {
        ProviderKind::OpenAi => {
            if !key.starts_with(OPENAI_KEY_PREFIX) {
                return ValidationResult::fail(format!(
                    "OpenAI API keys start with '{OPENAI_KEY_PREFIX}'."
                ));
            }
            if key.len() < OPENAI_KEY_MIN_LEN {
                return ValidationResult::fail("OpenAI API key is too short.");
            }
        }
        ProviderKind::Gemini => {
            if key.len() < GEMINI_KEY_MIN_LEN {
                return ValidationResult::fail("Gemini API key is too short.");
            }
            if !GEMINI_KEY_RE.is_match(key) {
                return ValidationResult::fail(
                    "Gemini API key contains invalid characters. Only letters, digits, '-' and '_' are allowed.",
                );
            }
        }
    }

    ValidationResult::ok()
}

pub fn validate_email(email: &str) -> ValidationResult {
    let email = email.trim();
    if email.is_empty() {
        return ValidationResult::fail("Email cannot be empty.");
    }
    if !EMAIL_RE.is_match(email) {
        return ValidationResult::fail(format!("'{email}' is not a valid email address."));
    }
    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(n: usize) -> String {
        "a".repeat(n)
    }

    #[test]
    fn test_job_description_bounds_are_inclusive() {
        assert!(validate_job_description(&chars(50)).valid);
        assert!(validate_job_description(&chars(5000)).valid);
        assert!(validate_job_description(&chars(200)).valid);
    }

    #[test]
    fn test_job_description_too_short_and_too_long_have_distinct_messages() {
        let short = validate_job_description(&chars(49));
        let long = validate_job_description(&chars(5001));
        assert!(!short.valid);
        assert!(!long.valid);
        assert!(short.error.as_deref().unwrap().contains("too short"));
        assert!(long.error.as_deref().unwrap().contains("too long"));
    }

    #[test]
    fn test_job_description_lengths_across_range() {
        for len in [1, 10, 49, 5001, 6000, 10_000] {
            assert!(!validate_job_description(&chars(len)).valid, "len {len}");
        }
        for len in [50, 51, 1000, 4999, 5000] {
            assert!(validate_job_description(&chars(len)).valid, "len {len}");
        }
    }

    #[test]
    fn test_whitespace_only_job_description_is_empty() {
        let result = validate_job_description("   \n\t  ");
        assert!(!result.valid);
        assert_eq!(
            result.error.as_deref(),
            Some("Job description cannot be empty.")
        );
    }

    #[test]
    fn test_openai_key_requires_prefix() {
        for key in ["pk-12345678901234567890", "12345678901234567890abc", "SK-12345678901234567890"] {
            assert!(!validate_api_key(key, ProviderKind::OpenAi).valid, "{key}");
        }
        assert!(validate_api_key("sk-proj-abcdefghijklmnopqrstu", ProviderKind::OpenAi).valid);
    }

    #[test]
    fn test_openai_key_requires_min_length() {
        let result = validate_api_key("sk-short", ProviderKind::OpenAi);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("too short"));
    }

    #[test]
    fn test_gemini_key_charset() {
        let good = "AIzaSyA-bcdefghijklmnop_qrstuvwxyz12";
        assert!(validate_api_key(good, ProviderKind::Gemini).valid);
        for bad in [
            "AIzaSyA-bcdefghijklmnop qrstuvwxyz12",
            "AIzaSyA-bcdefghijklmnop.qrstuvwxyz12",
            "AIzaSyA-bcdefghijklmnop/qrstuvwxyz12",
        ] {
            let result = validate_api_key(bad, ProviderKind::Gemini);
            assert!(!result.valid, "{bad}");
            assert!(result.error.unwrap().contains("invalid characters"));
        }
    }

    #[test]
    fn test_empty_key_is_invalid_for_both_providers() {
        assert!(!validate_api_key("", ProviderKind::OpenAi).valid);
        assert!(!validate_api_key("   ", ProviderKind::Gemini).valid);
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("jane.doe+jobs@example.co.uk").valid);
        assert!(validate_email("  jane@example.com ").valid);
        assert!(!validate_email("").valid);
        assert!(!validate_email("jane@example").valid);
        assert!(!validate_email("jane.example.com").valid);
        assert!(!validate_email("jane@@example.com").valid);
    }

    #[test]
    fn test_document_validation() {
        assert!(!validate_resume_document(None).valid);

        let pdf = ResumeDocument::new("resume.PDF", vec![0u8; 1024]);
        let verdict = validate_resume_document(Some(&pdf));
        assert!(verdict.valid);
        assert!(verdict.size_mb > 0.0);

        let docx = ResumeDocument::new("resume.docx", vec![0u8; 1024]);
        assert!(!validate_resume_document(Some(&docx)).valid);

        let huge = ResumeDocument::new("resume.pdf", vec![0u8; MAX_DOCUMENT_BYTES + 1]);
        let verdict = validate_resume_document(Some(&huge));
        assert!(!verdict.valid);
        assert!(verdict.error.unwrap().contains("too large"));
    }
}
