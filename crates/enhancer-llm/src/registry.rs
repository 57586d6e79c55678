//! Static lookup from [`ProviderId`] to everything needed to call that vendor.

use enhancer_types::{ProviderId, Result};

use crate::budget::TokenBudget;
use crate::transport::HttpRequest;
use crate::types::{BodyParams, ExtractError, TEMPERATURE};
use crate::{anthropic, gemini, openai};

// ---------------------------------------------------------------------------
// AuthScheme
// ---------------------------------------------------------------------------

/// Where the credential goes on the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// A vendor-specific header carrying the raw key.
    Header(&'static str),
    /// A URL query parameter carrying the raw key.
    QueryParam(&'static str),
}

// ---------------------------------------------------------------------------
// ProviderSpec
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ProviderSpec {
    pub id: ProviderId,
    pub base_url: &'static str,
    pub path: &'static str,
    pub model: &'static str,
    pub auth: AuthScheme,
    pub extra_headers: &'static [(&'static str, &'static str)],
    pub build_body: fn(&BodyParams<'_>) -> serde_json::Value,
    pub extract_text: fn(&str) -> std::result::Result<String, ExtractError>,
}

impl ProviderSpec {
    /// Full endpoint URL, optionally against a different base (proxies, tests).
    pub fn endpoint(&self, base_url: Option<&str>) -> String {
        let base = base_url.unwrap_or(self.base_url).trim_end_matches('/');
        format!("{}{}", base, self.path)
    }

    pub fn build_request(
        &self,
        base_url: Option<&str>,
        instruction: &str,
        text: &str,
        credential: &str,
        budget: TokenBudget,
    ) -> HttpRequest {
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        let mut query = Vec::new();

        match self.auth {
            AuthScheme::Bearer => {
                headers.push(("authorization".to_string(), format!("Bearer {credential}")));
            }
            AuthScheme::Header(name) => headers.push((name.to_string(), credential.to_string())),
            AuthScheme::QueryParam(name) => query.push((name.to_string(), credential.to_string())),
        }

        for (name, value) in self.extra_headers {
            headers.push((name.to_string(), value.to_string()));
        }

        let body = (self.build_body)(&BodyParams {
            model: self.model,
            instruction,
            text,
            budget,
            temperature: TEMPERATURE,
        });

        HttpRequest {
            url: self.endpoint(base_url),
            headers,
            query,
            body,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

static OPENAI: ProviderSpec = ProviderSpec {
    id: ProviderId::OpenAi,
    base_url: "https://api.openai.com",
    path: "/v1/chat/completions",
    model: "gpt-4o-mini",
    auth: AuthScheme::Bearer,
    extra_headers: &[],
    build_body: openai::build_body,
    extract_text: openai::extract_text,
};

static GEMINI: ProviderSpec = ProviderSpec {
    id: ProviderId::Gemini,
    base_url: "https://generativelanguage.googleapis.com",
    path: "/v1beta/models/gemini-2.5-flash:generateContent",
    model: "gemini-2.5-flash",
    auth: AuthScheme::QueryParam("key"),
    extra_headers: &[],
    build_body: gemini::build_body,
    extract_text: gemini::extract_text,
};

static ANTHROPIC: ProviderSpec = ProviderSpec {
    id: ProviderId::Anthropic,
    base_url: "https://api.anthropic.com",
    path: "/v1/messages",
    model: "claude-3-haiku-20240307",
    auth: AuthScheme::Header("x-api-key"),
    extra_headers: &[("anthropic-version", anthropic::ANTHROPIC_VERSION)],
    build_body: anthropic::build_body,
    extract_text: anthropic::extract_text,
};

pub fn spec_for(id: ProviderId) -> &'static ProviderSpec {
    match id {
        ProviderId::OpenAi => &OPENAI,
        ProviderId::Gemini => &GEMINI,
        ProviderId::Anthropic => &ANTHROPIC,
    }
}

/// Resolve a wire name (`"openai"`, `"gemini"`, `"anthropic"`).
pub fn lookup(name: &str) -> Result<&'static ProviderSpec> {
    let id: ProviderId = name.parse()?;
    Ok(spec_for(id))
}

pub fn all() -> [&'static ProviderSpec; 3] {
    [&OPENAI, &GEMINI, &ANTHROPIC]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use enhancer_types::EnhancerError;
    use serde_json::json;

    fn budget() -> TokenBudget {
        TokenBudget::for_input("x")
    }

    #[test]
    fn lookup_known_providers() {
        assert_eq!(lookup("openai").unwrap().id, ProviderId::OpenAi);
        assert_eq!(lookup("gemini").unwrap().id, ProviderId::Gemini);
        assert_eq!(lookup("anthropic").unwrap().id, ProviderId::Anthropic);
    }

    #[test]
    fn lookup_unknown_provider_fails() {
        let err = lookup("mistral").unwrap_err();
        assert!(matches!(err, EnhancerError::UnsupportedProvider(ref p) if p == "mistral"));
    }

    #[test]
    fn every_id_has_a_matching_spec() {
        for spec in all() {
            assert_eq!(spec_for(spec.id).id, spec.id);
        }
    }

    #[test]
    fn openai_request_shape() {
        let req = spec_for(ProviderId::OpenAi).build_request(None, "INS", "text", "sk-1", budget());
        assert_eq!(req.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(req.header("authorization"), Some("Bearer sk-1"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert!(req.query.is_empty());
        assert_eq!(req.body["model"], "gpt-4o-mini");
        assert_eq!(req.body["messages"][0], json!({"role": "system", "content": "INS"}));
        assert_eq!(req.body["messages"][1], json!({"role": "user", "content": "text"}));
        assert_eq!(req.body["max_tokens"], 1500);
    }

    #[test]
    fn gemini_request_shape() {
        let req = spec_for(ProviderId::Gemini).build_request(None, "INS", "text", "g-key", budget());
        assert_eq!(
            req.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(req.query_param("key"), Some("g-key"));
        assert_eq!(req.header("authorization"), None);
        assert_eq!(
            req.body["contents"][0]["parts"][0]["text"],
            "INS\n\nOriginal prompt: text"
        );
        assert_eq!(req.body["generationConfig"]["maxOutputTokens"], 1500);
        assert!(req.url.contains(GEMINI.model));
    }

    #[test]
    fn anthropic_request_shape() {
        let req =
            spec_for(ProviderId::Anthropic).build_request(None, "INS", "text", "ak-1", budget());
        assert_eq!(req.url, "https://api.anthropic.com/v1/messages");
        assert_eq!(req.header("x-api-key"), Some("ak-1"));
        assert_eq!(req.header("anthropic-version"), Some("2023-06-01"));
        assert_eq!(req.header("authorization"), None);
        assert_eq!(req.body["system"], "INS");
        assert_eq!(req.body["max_tokens"], 1500);
    }

    #[test]
    fn base_url_override_keeps_path() {
        let spec = spec_for(ProviderId::Anthropic);
        assert_eq!(
            spec.endpoint(Some("http://127.0.0.1:8080/")),
            "http://127.0.0.1:8080/v1/messages"
        );
        assert_eq!(spec.endpoint(None), "https://api.anthropic.com/v1/messages");
    }
}
