use serde::Deserialize;
use serde_json::json;

use crate::types::{BodyParams, ExtractError};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Request translation (instruction + text → Messages JSON)
// ---------------------------------------------------------------------------

// The Messages API takes a top-level `system` string. Temperature is left at
// the vendor default here; only max_tokens is sent.
pub(crate) fn build_body(params: &BodyParams<'_>) -> serde_json::Value {
    json!({
        "model": params.model,
        "max_tokens": params.budget.get(),
        "system": params.instruction,
        "messages": [
            { "role": "user", "content": params.text }
        ]
    })
}

// ---------------------------------------------------------------------------
// Response translation (`content[0].text`)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

pub(crate) fn extract_text(body: &str) -> Result<String, ExtractError> {
    let response: MessagesResponse = serde_json::from_str(body)?;
    response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or(ExtractError::MissingField("content[0].text"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
