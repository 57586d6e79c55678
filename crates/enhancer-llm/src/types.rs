use serde::Deserialize;

use crate::budget::TokenBudget;

/// Fallback when a vendor error body has no readable message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Sampling temperature sent to every vendor.
pub const TEMPERATURE: f64 = 0.7;

// ---------------------------------------------------------------------------
// BodyParams
// ---------------------------------------------------------------------------

/// Everything a vendor body builder needs.
#[derive(Debug, Clone, Copy)]
pub struct BodyParams<'a> {
    pub model: &'a str,
    pub instruction: &'a str,
    pub text: &'a str,
    pub budget: TokenBudget,
    pub temperature: f64,
}

// ---------------------------------------------------------------------------
// ExtractError
// ---------------------------------------------------------------------------

/// Why a success body could not be turned into text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field `{0}`")]
    MissingField(&'static str),
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

// All three vendors report failures as `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Pull `error.message` out of a failure body, or [`UNKNOWN_ERROR`].
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
