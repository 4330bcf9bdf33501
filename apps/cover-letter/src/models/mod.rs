// Request-scoped data carried through one generation: inputs, the extracted
// hiring context, usage counters and the credential shapes handed in by the vault.

pub mod credential;
pub mod document;
pub mod hiring;
pub mod provider;
pub mod request;
pub mod usage;

pub use credential::{mask_key, StoredCredential, StoredCredentials};
pub use document::ResumeDocument;
pub use hiring::HiringContext;
pub use provider::{ModelOption, ProviderKind, UnknownProvider};
pub use request::{format_letter_date, GenerationRequest, SenderProfile};
pub use usage::{SessionUsage, UsageCounters};
