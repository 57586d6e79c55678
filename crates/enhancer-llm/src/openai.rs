use serde::Deserialize;
use serde_json::json;

use crate::types::{BodyParams, ExtractError};

// ---------------------------------------------------------------------------
// Request translation (instruction + text → Chat Completions JSON)
// ---------------------------------------------------------------------------

pub(crate) fn build_body(params: &BodyParams<'_>) -> serde_json::Value {
    json!({
        "model": params.model,
        "messages": [
            { "role": "system", "content": params.instruction },
            { "role": "user", "content": params.text }
        ],
        "temperature": params.temperature,
        "max_tokens": params.budget.get()
    })
}

// ---------------------------------------------------------------------------
// Response translation (`choices[0].message.content`)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub(crate) fn extract_text(body: &str) -> Result<String, ExtractError> {
    let completion: ChatCompletion = serde_json::from_str(body)?;
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(ExtractError::MissingField("choices[0].message.content"))
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
    fn build_body_puts_instruction_in_system_role() {
        let params = BodyParams {
            model: "gpt-4o-mini",
            instruction: "Rewrite it.",
            text: "make a todo app",
            budget: TokenBudget::for_input("make a todo app"),
            temperature: TEMPERATURE,
        };

        let body = build_body(&params);
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    { "role": "system", "content": "Rewrite it." },
                    { "role": "user", "content": "make a todo app" }
                ],
                "temperature": 0.7,
                "max_tokens": 1500
            })
        );
    }

    #[test]
    fn extract_text_reads_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ]
        }"#;
        assert_eq!(extract_text(body).unwrap(), "first");
    }

    #[test]
    fn extract_text_reports_missing_content() {
        let err = extract_text(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, ExtractError::MissingField("choices[0].message.content")));

        let err = extract_text(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap_err();
        assert!(matches!(err, ExtractError::MissingField(_)));
    }

    #[test]
    fn extract_text_rejects_invalid_json() {
        let err = extract_text("not json").unwrap_err();
        assert!(matches!(err, ExtractError::Json(_)));
    }
}
