use std::collections::HashMap;

use enhancer_types::{EnhancementResult, EnhancerError, ProviderId, Result};

use crate::budget::TokenBudget;
use crate::instruction::INSTRUCTION;
use crate::registry;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::extract_error_message;

// ---------------------------------------------------------------------------
// EnhancementRequest
// ---------------------------------------------------------------------------

/// One enhancement: built fresh per invocation and consumed by it.
#[derive(Clone)]
pub struct EnhancementRequest {
    pub raw_text: String,
    pub provider: String,
    pub credential: Option<String>,
}

impl std::fmt::Debug for EnhancementRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancementRequest")
            .field("raw_text", &self.raw_text)
            .field("provider", &self.provider)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Enhancer
// ---------------------------------------------------------------------------

/// Routes an enhancement to its vendor and normalizes the outcome.
///
/// Every call is independent: one outbound request, local state only, no
/// retries. Share an `Enhancer` between tasks with `Arc`.
pub struct Enhancer<T = ReqwestTransport> {
    transport: T,
    base_urls: HashMap<ProviderId, String>,
}

impl Enhancer<ReqwestTransport> {
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }
}

impl Default for Enhancer<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HttpTransport> Enhancer<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            base_urls: HashMap::new(),
        }
    }

    /// Send requests for `provider` to `url` instead of the vendor's host.
    pub fn with_base_url(mut self, provider: ProviderId, url: impl Into<String>) -> Self {
        self.base_urls.insert(provider, url.into());
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Rewrite `raw_text` with `provider`. Never fails: every error becomes
    /// [`EnhancementResult::Failure`].
    pub async fn enhance(
        &self,
        raw_text: &str,
        provider: &str,
        credential: Option<&str>,
    ) -> EnhancementResult {
        let result = self.try_enhance(raw_text, provider, credential).await;
        if let Err(ref e) = result {
            tracing::warn!(provider, status = ?e.http_status(), error = %e, "Enhancement failed");
        }
        result.into()
    }

    pub async fn enhance_request(&self, request: &EnhancementRequest) -> EnhancementResult {
        self.enhance(
            &request.raw_text,
            &request.provider,
            request.credential.as_deref(),
        )
        .await
    }

    /// Same as [`enhance`](Self::enhance) but keeps the typed error.
    pub async fn try_enhance(
        &self,
        raw_text: &str,
        provider: &str,
        credential: Option<&str>,
    ) -> Result<String> {
        let credential = match credential {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(EnhancerError::MissingCredential {
                    provider: provider.to_string(),
                })
            }
        };

        let spec = registry::lookup(provider)?;
        let budget = TokenBudget::for_input(raw_text);
        let request = spec.build_request(
            self.base_urls.get(&spec.id).map(String::as_str),
            INSTRUCTION,
            raw_text,
            credential,
            budget,
        );

        tracing::info!(
            provider = %spec.id,
            model = spec.model,
            max_tokens = budget.get(),
            input_chars = raw_text.chars().count(),
            "Enhancement request"
        );

        let response = self.transport.post_json(&request).await.map_err(|e| {
            EnhancerError::NetworkFailure {
                provider: spec.id,
                message: e.to_string(),
            }
        })?;

        if !response.is_success() {
            return Err(EnhancerError::VendorHttpError {
                provider: spec.id,
                status: response.status,
                message: extract_error_message(&response.body),
            });
        }

        let text = (spec.extract_text)(&response.body).map_err(|e| {
            EnhancerError::MalformedResponse {
                provider: spec.id,
                detail: e.to_string(),
            }
        })?;

        let text = text.trim().to_string();
        tracing::debug!(provider = %spec.id, output_chars = text.chars().count(), "Enhancement response");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
