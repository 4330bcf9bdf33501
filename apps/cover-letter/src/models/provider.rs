use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The LLM backends the pipeline can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Fixed catalog; model name used verbatim, native JSON mode.
    OpenAi,
    /// Dynamic catalog; model resolved against the live model list.
    Gemini,
}

/// A model offered to the user for a provider, with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    pub id: &'static str,
    pub label: &'static str,
}

const OPENAI_MODELS: &[ModelOption] = &[
    ModelOption {
        id: "gpt-4o",
        label: "GPT-4o (Best)",
    },
    ModelOption {
        id: "gpt-3.5-turbo",
        label: "GPT-3.5 Turbo",
    },
];

const GEMINI_MODELS: &[ModelOption] = &[
    ModelOption {
        id: "gemini-1.5-flash",
        label: "Gemini 1.5 Flash (Standard)",
    },
    ModelOption {
        id: "gemini-1.5-pro",
        label: "Gemini 1.5 Pro (High Reasoning)",
    },
    ModelOption {
        id: "gemini-pro",
        label: "Gemini 1.0 Pro (Legacy/Stable)",
    },
];

impl ProviderKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Google Gemini",
        }
    }

    pub fn default_model(self) -> &'static str {
        self.model_options()[0].id
    }

    pub fn model_options(self) -> &'static [ModelOption] {
        match self {
            ProviderKind::OpenAi => OPENAI_MODELS,
            ProviderKind::Gemini => GEMINI_MODELS,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider '{0}', expected OpenAI or Gemini")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "open ai" => Ok(ProviderKind::OpenAi),
            "gemini" | "google gemini" | "google" => Ok(ProviderKind::Gemini),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}
