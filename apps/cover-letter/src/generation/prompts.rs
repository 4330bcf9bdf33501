// Prompt templates for the three generation stages.
// Cross-cutting fragments come from llm_client::prompts.

use crate::llm_client::prompts::untrusted;
use crate::models::{HiringContext, SenderProfile};

/// Stage 1 system prompt. Replace `{untrusted}`.
const EXTRACTION_SYSTEM_TEMPLATE: &str = r#"You are an expert recruiter. Extract the following from the Job Description:
1. Top technical and soft skills (comma-separated).
2. Company Name.
3. Hiring Manager Name (use 'Hiring Manager' if not found).
4. Company Address (use 'Headquarters' if not found).

Return as JSON: {"skills": "...", "company": "...", "manager": "...", "address": "..."}

{untrusted}"#;

/// Stage 1 user prompt. Replace `{job_description}`.
const EXTRACTION_PROMPT_TEMPLATE: &str = "Job Description:\n{job_description}";

/// Stage 2 system prompt. Replace `{untrusted}`.
const MATCHING_SYSTEM_TEMPLATE: &str = "You are a career coach. Identify the candidate's \
    experiences from their CV that best match the provided list of required skills. \
    Highlight specific achievements.\n\n{untrusted}";

/// Stage 2 user prompt. Replace `{skills}`, `{resume}`.
const MATCHING_PROMPT_TEMPLATE: &str = "Skills Required: {skills}\n\nCandidate CV:\n{resume}";

/// Stage 3 system prompt. Replace `{header}`, `{untrusted}`.
const DRAFTING_SYSTEM_TEMPLATE: &str = r#"You are a professional copywriter. Write a compelling, tailored cover letter.

STRICT FORMATTING RULES:
The output must start with this EXACT header block, reproduced character for character:

{header}

[Rest of the letter based on matched experiences and job description]

Write the body in plain text paragraphs. Do not use Markdown emphasis, headings or bullet markers.

{untrusted}"#;

/// Stage 3 user prompt. Replace `{matched}`, `{job_description}`.
const DRAFTING_PROMPT_TEMPLATE: &str =
    "Matched Experiences:\n{matched}\n\nJob Description:\n{job_description}";

const SKILLS_NOT_IDENTIFIED: &str = "Not identified; infer them from the candidate's strongest experience";

pub fn extraction_system() -> String {
    EXTRACTION_SYSTEM_TEMPLATE.replace("{untrusted}", &untrusted("job description"))
}

pub fn extraction_prompt(job_description: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE.replace("{job_description}", job_description)
}

pub fn matching_system() -> String {
    MATCHING_SYSTEM_TEMPLATE.replace("{untrusted}", &untrusted("candidate CV"))
}

pub fn matching_prompt(skills: &str, resume: &str) -> String {
    let skills = if skills.trim().is_empty() {
        SKILLS_NOT_IDENTIFIED
    } else {
        skills
    };
    MATCHING_PROMPT_TEMPLATE
        .replace("{skills}", skills)
        .replace("{resume}", resume)
}

pub fn drafting_system(header: &str) -> String {
    DRAFTING_SYSTEM_TEMPLATE
        .replace("{header}", header)
        .replace(
            "{untrusted}",
            &untrusted("matched-experience summary and job description"),
        )
}

pub fn drafting_prompt(matched: &str, job_description: &str) -> String {
    DRAFTING_PROMPT_TEMPLATE
        .replace("{matched}", matched)
        .replace("{job_description}", job_description)
}

/// The exact opening block every letter must start with.
///
/// Blank sender fields are left out rather than printed as empty lines.
pub fn letter_header(sender: &SenderProfile, date: &str, hiring: &HiringContext) -> String {
    let contact = [&sender.address, &sender.email, &sender.phone]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");

    let sender_block = [sender.name.trim(), contact.as_str(), sender.linkedin.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let recipient_block = format!("{}\n{}\n{}", hiring.manager, hiring.company, hiring.address);
    let salutation = format!("Dear {},", hiring.manager);

    [sender_block.as_str(), date.trim(), recipient_block.as_str(), salutation.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
