//! Message gateway speaking the extension's `{action, ...}` protocol.
//!
//! Messages arrive one JSON object per line. Each `enhance-text` runs on its
//! own task and its response is written as soon as it completes, so callers
//! that send several requests should tag them with `requestId`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::Instrument;

use enhancer_types::{EnhancementResult, EnhancerError, Result};

use crate::enhancer::Enhancer;
use crate::transport::HttpTransport;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum GatewayMessage {
    EnhanceText {
        text: String,
        provider: String,
        #[serde(rename = "apiKey", default)]
        api_key: Option<String>,
    },
    EnhancePrompt,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayEnvelope {
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub message: GatewayMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    #[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub success: bool,
    #[serde(rename = "enhancedText", default, skip_serializing_if = "Option::is_none")]
    pub enhanced_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GatewayResponse {
    pub fn from_result(request_id: Option<String>, result: EnhancementResult) -> Self {
        match result {
            EnhancementResult::Success { text } => Self {
                request_id,
                success: true,
                enhanced_text: Some(text),
                error: None,
            },
            EnhancementResult::Failure { message } => Self {
                request_id,
                success: false,
                enhanced_text: None,
                error: Some(message),
            },
        }
    }

    fn invalid(request_id: Option<String>, detail: impl std::fmt::Display) -> Self {
        Self {
            request_id,
            success: false,
            enhanced_text: None,
            error: Some(format!("Invalid message: {detail}")),
        }
    }
}

/// Just the correlation id, read from lines that fail to parse as a message.
#[derive(Deserialize)]
struct RequestTag {
    #[serde(rename = "requestId", default)]
    request_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

pub type PromptFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Callback for `enhance-prompt`, which has no response of its own.
/// `serve` waits for the returned future before it exits.
pub type PromptTrigger = Arc<dyn Fn() -> PromptFuture + Send + Sync>;

pub struct Gateway<T: HttpTransport> {
    enhancer: Arc<Enhancer<T>>,
    on_enhance_prompt: Option<PromptTrigger>,
}

impl<T: HttpTransport + 'static> Gateway<T> {
    pub fn new(enhancer: Arc<Enhancer<T>>) -> Self {
        Self {
            enhancer,
            on_enhance_prompt: None,
        }
    }

    pub fn on_enhance_prompt<F, Fut>(mut self, trigger: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_enhance_prompt = Some(Arc::new(move || Box::pin(trigger()) as PromptFuture));
        self
    }

    /// Route one message. `None` means the message has no response.
    pub async fn handle(&self, envelope: GatewayEnvelope) -> Option<GatewayResponse> {
        match envelope.message {
            GatewayMessage::EnhanceText {
                text,
                provider,
                api_key,
            } => {
                let span_id = envelope
                    .request_id
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                let result = self
                    .enhancer
                    .enhance(&text, &provider, api_key.as_deref())
                    .instrument(tracing::info_span!("enhance_text", request_id = %span_id))
                    .await;
                Some(GatewayResponse::from_result(envelope.request_id, result))
            }
            GatewayMessage::EnhancePrompt => {
                match &self.on_enhance_prompt {
                    Some(trigger) => trigger().await,
                    None => tracing::debug!("No field host attached, ignoring enhance-prompt"),
                }
                None
            }
        }
    }

    pub async fn handle_line(&self, line: &str) -> Option<GatewayResponse> {
        match serde_json::from_str::<GatewayEnvelope>(line) {
            Ok(envelope) => self.handle(envelope).await,
            Err(e) => {
                let request_id = serde_json::from_str::<RequestTag>(line)
                    .ok()
                    .and_then(|tag| tag.request_id);
                tracing::warn!(error = %e, ?request_id, "Rejected gateway message");
                Some(GatewayResponse::invalid(request_id, e))
            }
        }
    }

    /// Read messages until EOF, then wait for in-flight requests and
    /// `enhance-prompt` work to finish.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<GatewayResponse>();

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(response) = rx.recv().await {
                let mut line = serde_json::to_string(&response)?;
                line.push('\n');
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
            }
            Ok::<(), EnhancerError>(())
        });

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let gateway = Arc::clone(&self);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = gateway.handle_line(&line).await {
                    // Only fails once the writer has gone away.
                    let _ = tx.send(response);
                }
            });
        }
        drop(tx);

        writer_task
            .await
            .map_err(|e| EnhancerError::Io(std::io::Error::other(e)))?
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpRequest, HttpResponse, TransportError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the user text back as an OpenAI completion.
    struct EchoTransport;

    #[async_trait]
    impl HttpTransport for EchoTransport {
        async fn post_json(
            &self,
            request: &HttpRequest,
        ) -> std::result::Result<HttpResponse, TransportError> {
            let text = request.body["messages"][1]["content"]
                .as_str()
                .unwrap_or_default()
                .to_uppercase();
            Ok(HttpResponse {
                status: 200,
                body: serde_json::json!({"choices": [{"message": {"content": text}}]}).to_string(),
            })
        }
    }

    fn gateway() -> Gateway<EchoTransport> {
        Gateway::new(Arc::new(Enhancer::with_transport(EchoTransport)))
    }

    #[test]
    fn parses_enhance_text_message() {
        let envelope: GatewayEnvelope = serde_json::from_str(
            r#"{"action":"enhance-text","text":"hi","provider":"openai","apiKey":"k"}"#,
        )
        .unwrap();
        assert_eq!(envelope.request_id, None);
        assert_eq!(
            envelope.message,
            GatewayMessage::EnhanceText {
                text: "hi".into(),
                provider: "openai".into(),
                api_key: Some("k".into()),
            }
        );
    }

    #[test]
    fn parses_enhance_prompt_with_request_id() {
        let envelope: GatewayEnvelope =
            serde_json::from_str(r#"{"action":"enhance-prompt","requestId":"7"}"#).unwrap();
        assert_eq!(envelope.request_id.as_deref(), Some("7"));
        assert_eq!(envelope.message, GatewayMessage::EnhancePrompt);
    }

    #[test]
    fn response_serialization_matches_protocol() {
        let ok = GatewayResponse::from_result(
            None,
            EnhancementResult::Success { text: "better".into() },
        );
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"success": true, "enhancedText": "better"})
        );

        let failed = GatewayResponse::from_result(
            Some("r1".into()),
            EnhancementResult::Failure { message: "nope".into() },
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"requestId": "r1", "success": false, "error": "nope"})
        );
    }

    #[tokio::test]
    async fn enhance_text_round_trip() {
        let response = gateway()
            .handle_line(r#"{"action":"enhance-text","text":"hi","provider":"openai","apiKey":"k"}"#)
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.enhanced_text.as_deref(), Some("HI"));
    }

    #[tokio::test]
    async fn missing_api_key_is_reported() {
        let response = gateway()
            .handle_line(r#"{"action":"enhance-text","text":"hi","provider":"gemini"}"#)
            .await
            .unwrap();
        assert!(!response.success);
        assert!(response.error.unwrap().contains("gemini"));
    }

    #[tokio::test]
    async fn invalid_lines_get_an_error_response() {
        let gw = gateway();
        let response = gw.handle_line("not json").await.unwrap();
        assert!(!response.success);
        assert!(response.error.unwrap().starts_with("Invalid message:"));

        let response = gw.handle_line(r#"{"action":"reload"}"#).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.request_id, None);
    }

    #[tokio::test]
    async fn invalid_lines_echo_request_id() {
        let response = gateway()
            .handle_line(r#"{"action":"reload","requestId":"r9"}"#)
            .await
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.request_id.as_deref(), Some("r9"));
        assert!(response.error.unwrap().starts_with("Invalid message:"));
    }

    #[tokio::test]
    async fn enhance_prompt_fires_trigger_without_response() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let gw = gateway().on_enhance_prompt(move || {
            counter.fetch_add(1, Ordering::Relaxed);
            async {}
        });

        let response = gw.handle_line(r#"{"action":"enhance-prompt"}"#).await;
        assert!(response.is_none());
        assert_eq!(fired.load(Ordering::Relaxed), 1);

        // Without a trigger the message is still accepted silently.
        assert!(gateway().handle_line(r#"{"action":"enhance-prompt"}"#).await.is_none());
    }

    #[tokio::test]
    async fn serve_waits_for_enhance_prompt_work() {
        let done = Arc::new(AtomicUsize::new(0));
        let counter = done.clone();
        let gw = gateway().on_enhance_prompt(move || {
            let counter = counter.clone();
            async move {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });
        let (_client, server) = tokio::io::duplex(1024);

        Arc::new(gw)
            .serve(&b"{\"action\":\"enhance-prompt\"}\n"[..], server)
            .await
            .unwrap();

        assert_eq!(done.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn serve_answers_every_request_before_returning() {
        let input = concat!(
            r#"{"action":"enhance-text","requestId":"a","text":"one","provider":"openai","apiKey":"k"}"#,
            "\n\n",
            r#"{"action":"enhance-prompt"}"#,
            "\n",
            r#"{"action":"enhance-text","requestId":"b","text":"two","provider":"nope","apiKey":"k"}"#,
            "\n",
        );
        let (client, server) = tokio::io::duplex(64 * 1024);

        Arc::new(gateway())
            .serve(input.as_bytes(), server)
            .await
            .unwrap();

        let mut lines = tokio::io::BufReader::new(client).lines();
        let mut responses = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            responses.push(serde_json::from_str::<GatewayResponse>(&line).unwrap());
        }
        responses.sort_by(|x, y| x.request_id.cmp(&y.request_id));

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].request_id.as_deref(), Some("a"));
        assert_eq!(responses[0].enhanced_text.as_deref(), Some("ONE"));
        assert_eq!(responses[1].request_id.as_deref(), Some("b"));
        assert!(responses[1].error.as_deref().unwrap().contains("Unsupported provider"));
    }
}
