//! Persisted provider selection and API keys.
//!
//! The file mirrors the extension's key/value store:
//! `selectedProvider`, `openaiKey`, `geminiKey`, `anthropicKey`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use enhancer_types::{EnhancerError, ProviderId, Result};

pub const DEFAULT_SETTINGS_PATH: &str = ".prompt-enhancer/settings.json";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_provider")]
    pub selected_provider: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_key: Option<String>,
}

fn default_provider() -> ProviderId {
    ProviderId::OpenAi
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_provider: default_provider(),
            openai_key: None,
            gemini_key: None,
            anthropic_key: None,
        }
    }
}

impl Settings {
    fn slot(&self, provider: ProviderId) -> &Option<String> {
        match provider {
            ProviderId::OpenAi => &self.openai_key,
            ProviderId::Gemini => &self.gemini_key,
            ProviderId::Anthropic => &self.anthropic_key,
        }
    }

    fn slot_mut(&mut self, provider: ProviderId) -> &mut Option<String> {
        match provider {
            ProviderId::OpenAi => &mut self.openai_key,
            ProviderId::Gemini => &mut self.gemini_key,
            ProviderId::Anthropic => &mut self.anthropic_key,
        }
    }

    /// Stored key for `provider`, ignoring empty strings.
    pub fn key_for(&self, provider: ProviderId) -> Option<&str> {
        self.slot(provider).as_deref().filter(|k| !k.is_empty())
    }

    /// Store a key, trimmed. A blank key clears the slot.
    pub fn set_key(&mut self, provider: ProviderId, key: &str) {
        let key = key.trim();
        *self.slot_mut(provider) = (!key.is_empty()).then(|| key.to_string());
    }

    pub fn clear_key(&mut self, provider: ProviderId) {
        *self.slot_mut(provider) = None;
    }

    /// Stored key, else the provider's environment variables.
    pub fn resolve_key(&self, provider: ProviderId) -> Option<String> {
        self.resolve_key_with(provider, |name| std::env::var(name).ok())
    }

    pub fn resolve_key_with(
        &self,
        provider: ProviderId,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        if let Some(key) = self.key_for(provider) {
            return Some(key.to_string());
        }
        env_vars(provider)
            .iter()
            .filter_map(|name| env(*name))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }
}

/// Environment variables consulted when no key is stored, in order.
pub fn env_vars(provider: ProviderId) -> &'static [&'static str] {
    match provider {
        ProviderId::OpenAi => &["OPENAI_API_KEY"],
        ProviderId::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        ProviderId::Anthropic => &["ANTHROPIC_API_KEY"],
    }
}

/// `sk-abc...wxyz` style masking: keep four characters at each end.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}

// ---------------------------------------------------------------------------
// SettingsStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields default settings.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No settings file, using defaults");
            return Ok(Settings::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| {
            EnhancerError::Settings(format!("{}: {e}", self.path.display()))
        })
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Load, apply `f`, save.
    pub fn update(&self, f: impl FnOnce(&mut Settings)) -> Result<Settings> {
        let mut settings = self.load()?;
        f(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
