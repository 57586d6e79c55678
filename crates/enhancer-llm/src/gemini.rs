use serde::Deserialize;
use serde_json::json;

use crate::types::{BodyParams, ExtractError};

/// Gemini's `generateContent` has no system role in this request shape, so
/// the instruction is prepended to the user text with this separator.
pub const PROMPT_SEPARATOR: &str = "\n\nOriginal prompt: ";

// ---------------------------------------------------------------------------
// Request translation (instruction + text → generateContent JSON)
// ---------------------------------------------------------------------------

pub(crate) fn build_body(params: &BodyParams<'_>) -> serde_json::Value {
    json!({
        "contents": [{
            "parts": [{
                "text": format!("{}{}{}", params.instruction, PROMPT_SEPARATOR, params.text)
            }]
        }],
        "generationConfig": {
            "temperature": params.temperature,
            "maxOutputTokens": params.budget.get()
        }
    })
}

// ---------------------------------------------------------------------------
// Response translation (`candidates[0].content.parts[0].text`)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

pub(crate) fn extract_text(body: &str) -> Result<String, ExtractError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(ExtractError::MissingField("candidates[0].content.parts[0].text"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::TokenBudget;
    use crate::types::TEMPERATURE;

    #[test]
    fn build_body_concatenates_instruction_and_text() {
        let params = BodyParams {
            model: "gemini-2.5-flash",
            instruction: "Rewrite it.",
            text: "plan a trip",
            budget: TokenBudget::for_input(&"a".repeat(4000)),
            temperature: TEMPERATURE,
        };

        let body = build_body(&params);
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [{ "text": "Rewrite it.\n\nOriginal prompt: plan a trip" }]
                }],
                "generationConfig": {
                    "temperature": 0.7,
                    "maxOutputTokens": 3000
                }
            })
        );
        // The model travels in the URL, not the body.
        assert!(body.get("model").is_none());
    }

    #[test]
    fn extract_text_reads_first_part_of_first_candidate() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "one"}, {"text": "two"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 3}
        }"#;
        assert_eq!(extract_text(body).unwrap(), "one");
    }

    #[test]
    fn extract_text_reports_blocked_candidate() {
        // Safety-blocked candidates come back without content.
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let err = extract_text(body).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingField("candidates[0].content.parts[0].text")
        ));
        assert!(extract_text(r#"{"promptFeedback": {}}"#).is_err());
    }
}
