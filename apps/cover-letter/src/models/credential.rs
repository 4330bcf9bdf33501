use serde::{Deserialize, Serialize};

use crate::models::provider::ProviderKind;

/// A credential entry as the vault stores it. Older vaults hold bare strings,
/// newer ones named objects; both normalize to a plain key via [`secret`].
///
/// [`secret`]: StoredCredential::secret
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredCredential {
    Named { name: String, key: String },
    Legacy(String),
}

impl StoredCredential {
    pub fn secret(&self) -> &str {
        match self {
            StoredCredential::Named { key, .. } => key,
            StoredCredential::Legacy(key) => key,
        }
    }

    /// Display label that never reveals more than the last four characters.
    pub fn label(&self) -> String {
        match self {
            StoredCredential::Named { name, key } => {
                let name = if name.trim().is_empty() { "Key" } else { name.as_str() };
                format!("{name} (...{})", last_chars(key, 4))
            }
            StoredCredential::Legacy(key) => {
                let tail = if key.chars().count() > 4 {
                    last_chars(key, 4)
                } else {
                    String::new()
                };
                format!("Legacy (...{tail})")
            }
        }
    }
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// The vault's per-provider key lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default)]
    pub openai_keys: Vec<StoredCredential>,
    #[serde(default)]
    pub gemini_keys: Vec<StoredCredential>,
}

impl StoredCredentials {
    pub fn for_provider(&self, provider: ProviderKind) -> &[StoredCredential] {
        match provider {
            ProviderKind::OpenAi => &self.openai_keys,
            ProviderKind::Gemini => &self.gemini_keys,
        }
    }
}

/// Masks a key for display.
pub fn mask_key(key: &str) -> String {
    if key.chars().count() < 8 {
        format!("****{}", last_chars(key, 2))
    } else {
        format!("Saved Key (Ends in ...{})", last_chars(key, 4))
    }
}

fn last_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(n)).collect()
}
