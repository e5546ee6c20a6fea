// Gemini API client using reqwest and reqwest-eventsource.
//
// `generate` posts a single `generateContent` request and returns the text of
// the first candidate. `stream` calls `streamGenerateContent?alt=sse` and
// forwards each text fragment over an mpsc channel as it arrives.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use vitali_core::config::Config;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

// ---------------------------------------------------------------------------
// Request type and generator trait
// ---------------------------------------------------------------------------

/// A single-turn text generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// When set, the response is requested as `application/json` constrained
    /// by this schema.
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        GenerationRequest {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    pub fn json_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// Backend capable of producing text for a prompt.
///
/// `stream` sends each fragment over `tokens` and returns the concatenated
/// text. If the receiver is dropped the stream is abandoned and whatever was
/// received so far is returned.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> anyhow::Result<String>;

    async fn stream(
        &self,
        request: GenerationRequest,
        tokens: mpsc::Sender<String>,
    ) -> anyhow::Result<String>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Low-level Gemini REST client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client for `model` with a per-request timeout.
    pub fn new(api_key: String, model: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            api_key,
            model,
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method)
    }

    fn post(&self, url: String, request: &GenerationRequest) -> reqwest::RequestBuilder {
        self.http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body(request))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> anyhow::Result<String> {
        if self.api_key.is_empty() {
            bail!("API key not configured");
        }

        let response = self
            .post(self.endpoint("generateContent"), &request)
            .send()
            .await
            .map_err(|e| anyhow!("Network error: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read response body")?;

        if !status.is_success() {
            let detail = parse_api_error(&body).unwrap_or_else(|| body.chars().take(200).collect());
            bail!("API returned status {status}: {detail}");
        }

        let value: Value = serde_json::from_str(&body).context("response was not valid JSON")?;
        parse_response_text(&value).ok_or_else(|| match parse_block_reason(&value) {
            Some(reason) => anyhow!("prompt blocked: {reason}"),
            None => anyhow!("response contained no candidates"),
        })
    }

    async fn stream(
        &self,
        request: GenerationRequest,
        tokens: mpsc::Sender<String>,
    ) -> anyhow::Result<String> {
        if self.api_key.is_empty() {
            bail!("API key not configured");
        }

        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let mut es = self
            .post(url, &request)
            .eventsource()
            .map_err(|e| anyhow!("Failed to create event source: {e}"))?;

        let mut full_text = String::new();

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                }
                Ok(Event::Message(msg)) => {
                    let Some(chunk) = parse_stream_chunk(&msg.data) else {
                        warn!("ignoring unparseable stream chunk");
                        continue;
                    };
                    if !chunk.text.is_empty() {
                        full_text.push_str(&chunk.text);
                        if tokens.send(chunk.text).await.is_err() {
                            // Receiver dropped, nobody is listening.
                            es.close();
                            return Ok(full_text);
                        }
                    }
                    if chunk.finished {
                        debug!("stream finished");
                        es.close();
                        return Ok(full_text);
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    debug!("stream ended by server");
                    es.close();
                    return Ok(full_text);
                }
                Err(err) => {
                    warn!(?err, "SSE stream error");
                    es.close();
                    bail!(extract_error_message(&err));
                }
            }
        }

        Ok(full_text)
    }
}

// ---------------------------------------------------------------------------
// LlmClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that can be either an active generator or disabled.
#[derive(Clone)]
pub enum LlmClient {
    /// A backend is configured and ready.
    Active(Arc<dyn TextGenerator>),
    /// LLM functionality is disabled (no API key configured).
    Disabled,
}

impl LlmClient {
    /// Build an `LlmClient` from the application config.
    ///
    /// Returns `Active` if an API key is present in credentials, otherwise
    /// returns `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        let key = match &config.credentials.gemini_api_key {
            Some(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => return LlmClient::Disabled,
        };

        let timeout = Duration::from_secs(config.llm.request_timeout_secs);
        match GeminiClient::new(key, config.llm.model.clone(), timeout) {
            Ok(client) => {
                let client = match &config.llm.base_url {
                    Some(url) => client.with_base_url(url.clone()),
                    None => client,
                };
                LlmClient::Active(Arc::new(client))
            }
            Err(e) => {
                warn!("LLM disabled: {e:#}");
                LlmClient::Disabled
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LlmClient::Active(_))
    }

    pub async fn generate(&self, request: GenerationRequest) -> anyhow::Result<String> {
        match self {
            LlmClient::Active(generator) => generator.generate(request).await,
            LlmClient::Disabled => bail!("LLM not configured"),
        }
    }

    pub async fn stream(
        &self,
        request: GenerationRequest,
        tokens: mpsc::Sender<String>,
    ) -> anyhow::Result<String> {
        match self {
            LlmClient::Active(generator) => generator.stream(request, tokens).await,
            LlmClient::Disabled => bail!("LLM not configured"),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

/// Build the `generateContent` request body.
pub(crate) fn request_body(request: &GenerationRequest) -> Value {
    let mut generation_config = serde_json::Map::new();
    if let Some(t) = request.temperature {
        generation_config.insert("temperature".into(), json!(t));
    }
    if let Some(max) = request.max_output_tokens {
        generation_config.insert("maxOutputTokens".into(), json!(max));
    }
    if let Some(schema) = &request.response_schema {
        generation_config.insert("responseMimeType".into(), json!("application/json"));
        generation_config.insert("responseSchema".into(), schema.clone());
    }

    let mut body = json!({
        "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }]
    });
    if !generation_config.is_empty() {
        body["generationConfig"] = Value::Object(generation_config);
    }
    body
}

/// Concatenate the text parts of the first candidate.
///
/// Expected shape: `{ "candidates": [ { "content": { "parts": [ { "text": "..." } ] } } ] }`.
/// Returns `None` when there is no candidate at all; a candidate without
/// text parts yields an empty string.
pub(crate) fn parse_response_text(v: &Value) -> Option<String> {
    let candidate = v.get("candidates")?.as_array()?.first()?;
    let text = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default();
    Some(text)
}

fn parse_block_reason(v: &Value) -> Option<String> {
    v.get("promptFeedback")?
        .get("blockReason")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract `error.message` from an API error body.
pub(crate) fn parse_api_error(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    v.get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

/// One decoded SSE chunk of a streamed response.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StreamChunk {
    pub text: String,
    /// The candidate reported a `finishReason`.
    pub finished: bool,
}

pub(crate) fn parse_stream_chunk(data: &str) -> Option<StreamChunk> {
    let v: Value = serde_json::from_str(data).ok()?;
    let text = parse_response_text(&v).unwrap_or_default();
    let finished = v
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("finishReason"))
        .and_then(Value::as_str)
        .is_some();
    Some(StreamChunk { text, finished })
}

/// Extract a human-readable error message from an SSE error.
fn extract_error_message(err: &reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            format!("API returned status {status}")
        }
        reqwest_eventsource::Error::Transport(e) => {
            format!("Network error: {e}")
        }
        other => format!("Stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // -- request body --

    #[test]
    fn body_without_options_has_only_contents() {
        let body = request_body(&GenerationRequest::new("hello"));
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn body_with_schema_requests_json() {
        let req = GenerationRequest::new("recipes")
            .temperature(0.5)
            .max_output_tokens(256)
            .json_schema(json!({ "type": "ARRAY" }));
        let body = request_body(&req);
        let cfg = &body["generationConfig"];
        assert_eq!(cfg["responseMimeType"], "application/json");
        assert_eq!(cfg["responseSchema"]["type"], "ARRAY");
        assert_eq!(cfg["maxOutputTokens"], 256);
        assert!((cfg["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }

    // -- response parsing --

    #[test]
    fn parse_text_joins_parts() {
        let v = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Keep " }, { "text": "going" }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(parse_response_text(&v), Some("Keep going".to_string()));
    }

    #[test]
    fn parse_text_candidate_without_parts_is_empty() {
        let v = json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] });
        assert_eq!(parse_response_text(&v), Some(String::new()));
    }

    #[test]
    fn parse_text_without_candidates_is_none() {
        let v = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(parse_response_text(&v), None);
        assert_eq!(parse_block_reason(&v), Some("SAFETY".to_string()));
    }

    #[test]
    fn parse_api_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(parse_api_error(body), Some("API key not valid.".to_string()));
        assert_eq!(parse_api_error("<html>"), None);
    }

    #[test]
    fn parse_stream_chunk_detects_finish() {
        let mid = r#"{"candidates":[{"content":{"parts":[{"text":"Small"}]}}]}"#;
        let last = r#"{"candidates":[{"content":{"parts":[{"text":" steps."}]},"finishReason":"STOP"}]}"#;
        assert_eq!(
            parse_stream_chunk(mid),
            Some(StreamChunk { text: "Small".into(), finished: false })
        );
        assert_eq!(
            parse_stream_chunk(last),
            Some(StreamChunk { text: " steps.".into(), finished: true })
        );
        assert_eq!(parse_stream_chunk("{broken"), None);
    }

    // -- LlmClient::Disabled path --

    #[tokio::test]
    async fn disabled_client_fails_fast() {
        let client = LlmClient::Disabled;
        let err = client.generate(GenerationRequest::new("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "LLM not configured");

        let (tx, mut rx) = mpsc::channel(8);
        let err = client.stream(GenerationRequest::new("x"), tx).await.unwrap_err();
        assert_eq!(err.to_string(), "LLM not configured");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn empty_api_key_is_an_error() {
        let client =
            GeminiClient::new(String::new(), "model".into(), Duration::from_secs(5)).unwrap();
        let err = client.generate(GenerationRequest::new("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "API key not configured");
    }

    // -- LlmClient::from_config --

    fn test_config(api_key: Option<&str>) -> Config {
        use vitali_core::config::*;
        Config {
            llm: LlmConfig {
                model: "gemini-3-flash-preview".into(),
                max_output_tokens: 1024,
                recipe_temperature: 0.8,
                workout_temperature: 0.8,
                motivation_temperature: 1.0,
                request_timeout_secs: 30,
                base_url: None,
            },
            notifications: NotificationConfig::default(),
            credentials: CredentialsConfig {
                gemini_api_key: api_key.map(String::from),
            },
            db_path: ":memory:".into(),
        }
    }

    #[test]
    fn from_config_with_api_key_returns_active() {
        assert!(LlmClient::from_config(&test_config(Some("key"))).is_active());
    }

    #[test]
    fn from_config_without_api_key_returns_disabled() {
        assert!(matches!(LlmClient::from_config(&test_config(None)), LlmClient::Disabled));
        assert!(matches!(LlmClient::from_config(&test_config(Some("  "))), LlmClient::Disabled));
    }

    // -- Integration-style tests with mock TCP server --

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        (format!("http://{addr}"), handle)
    }

    fn json_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn mock_client(base: &str) -> GeminiClient {
        GeminiClient::new("test-key".into(), "test-model".into(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(base)
    }

    #[tokio::test]
    async fn mock_server_generate_returns_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"[]"}],"role":"model"},"finishReason":"STOP"}]}"#;
        let (base, server) = serve_once(json_response("200 OK", body)).await;

        let text = mock_client(&base)
            .generate(GenerationRequest::new("recipes please"))
            .await
            .unwrap();
        assert_eq!(text, "[]");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/test-model:generateContent"));
        assert!(request.to_lowercase().contains("x-goog-api-key: test-key"));
    }

    #[tokio::test]
    async fn mock_server_generate_error_status() {
        let body = r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#;
        let (base, server) = serve_once(json_response("403 Forbidden", body)).await;

        let err = mock_client(&base)
            .generate(GenerationRequest::new("x"))
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("403"), "unexpected error: {msg}");
        assert!(msg.contains("Permission denied"), "unexpected error: {msg}");

        let _ = server.await;
    }

    #[tokio::test]
    async fn mock_sse_server_full_flow() {
        let response = concat!(
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: text/event-stream\r\n",
            "Cache-Control: no-cache\r\n",
            "\r\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Discipline\"}],\"role\":\"model\"}}]}\r\n",
            "\r\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\" wins.\"}],\"role\":\"model\"},\"finishReason\":\"STOP\"}]}\r\n",
            "\r\n",
        );
        let (base, server) = serve_once(response.to_string()).await;

        let (tx, mut rx) = mpsc::channel(32);
        let full = mock_client(&base)
            .stream(GenerationRequest::new("motivate me"), tx)
            .await
            .unwrap();
        assert_eq!(full, "Discipline wins.");

        let mut tokens = Vec::new();
        while let Some(t) = rx.recv().await {
            tokens.push(t);
        }
        assert_eq!(tokens, vec!["Discipline".to_string(), " wins.".to_string()]);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/test-model:streamGenerateContent?alt=sse"));
    }

    #[tokio::test]
    async fn mock_sse_server_error_status() {
        let body = r#"{"error":{"message":"Invalid API key"}}"#;
        let (base, server) = serve_once(json_response("401 Unauthorized", body)).await;

        let (tx, _rx) = mpsc::channel(8);
        let err = mock_client(&base)
            .stream(GenerationRequest::new("x"), tx)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("401"), "Error message should mention status code: {msg}");

        let _ = server.await;
    }
}
