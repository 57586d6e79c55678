//! Shared types and errors for the prompt enhancer.
//!
//! This crate provides the foundational types used across the other enhancer crates:
//! - `ProviderId` — the supported LLM vendors
//! - `EnhancerError` — unified error taxonomy
//! - `EnhancementResult` — the terminal outcome of one enhancement

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// ProviderId
// ---------------------------------------------------------------------------

/// A third-party LLM vendor reachable over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Gemini,
    Anthropic,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::OpenAi, ProviderId::Gemini, ProviderId::Anthropic];

    /// Wire name used in messages and settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "gemini",
            ProviderId::Anthropic => "anthropic",
        }
    }

    /// Human-facing name for status output.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "OpenAI",
            ProviderId::Gemini => "Google Gemini",
            ProviderId::Anthropic => "Anthropic Claude",
        }
    }

    /// Short label that prefixes vendor API errors.
    pub fn api_label(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "OpenAI",
            ProviderId::Gemini => "Gemini",
            ProviderId::Anthropic => "Anthropic",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = EnhancerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "openai" => Ok(ProviderId::OpenAi),
            "gemini" => Ok(ProviderId::Gemini),
            "anthropic" => Ok(ProviderId::Anthropic),
            other => Err(EnhancerError::UnsupportedProvider(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// EnhancerError
// ---------------------------------------------------------------------------

/// Unified error type for all enhancer subsystems.
#[derive(Debug, thiserror::Error)]
pub enum EnhancerError {
    // === Orchestration ===
    #[error("API key not found for {provider}. Please set it in the settings.")]
    MissingCredential { provider: String },

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    // === Vendor ===
    #[error("{} API error: {message}", .provider.api_label())]
    VendorHttpError {
        provider: ProviderId,
        status: u16,
        message: String,
    },

    #[error("{} returned a malformed response: {detail}", .provider.api_label())]
    MalformedResponse { provider: ProviderId, detail: String },

    #[error("{} request failed: {message}", .provider.api_label())]
    NetworkFailure { provider: ProviderId, message: String },

    // === Settings ===
    #[error("Settings error: {0}")]
    Settings(String),

    // === Generic ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnhancerError {
    /// The vendor this error belongs to, when one was resolved.
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            EnhancerError::VendorHttpError { provider, .. }
            | EnhancerError::MalformedResponse { provider, .. }
            | EnhancerError::NetworkFailure { provider, .. } => Some(*provider),
            _ => None,
        }
    }

    /// HTTP status reported by the vendor, if the call got that far.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            EnhancerError::VendorHttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A convenience alias for `Result<T, EnhancerError>`.
pub type Result<T> = std::result::Result<T, EnhancerError>;

// ---------------------------------------------------------------------------
// EnhancementResult
// ---------------------------------------------------------------------------

/// Terminal outcome of one enhancement: either rewritten text or a
/// human-readable failure message, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnhancementResult {
    Success { text: String },
    Failure { message: String },
}

impl EnhancementResult {
    pub fn is_success(&self) -> bool {
        matches!(self, EnhancementResult::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            EnhancementResult::Success { text } => Some(text),
            EnhancementResult::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            EnhancementResult::Success { .. } => None,
            EnhancementResult::Failure { message } => Some(message),
        }
    }
}

impl From<Result<String>> for EnhancementResult {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => EnhancementResult::Success { text },
            Err(e) => EnhancementResult::Failure {
                message: e.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
