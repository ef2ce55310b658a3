use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ChatClient;
use crate::domain::DomainError;

/// Default target: Ollama running locally on its standard port.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const CHAT_PATH: &str = "/api/chat";
const DEFAULT_MODEL: &str = "llama3.2:1b";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 2000;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// HTTP client for a locally hosted Ollama chat endpoint.
///
/// Temperature (0.3) and the output cap (2000 tokens) are fixed for every
/// call. Configure the target with:
///
/// ```text
/// OLLAMA_BASE_URL=http://localhost:11434
/// OLLAMA_MODEL=llama3.2:1b
/// ```
///
/// Before each request the client sends a `HEAD /` probe with a 2-second
/// timeout so an unreachable server fails immediately. The generation request
/// itself has no client-side timeout.
pub struct OllamaClient {
    client: reqwest::Client,
    probe_client: reqwest::Client,
    model: String,
    /// Full endpoint URL (base + CHAT_PATH).
    url: String,
    /// Base URL used for the probe (e.g. `http://localhost:11434/`).
    base_url: String,
}

impl OllamaClient {
    pub fn new(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        let trimmed = base.trim_end_matches('/');
        Self {
            client: reqwest::Client::new(),
            probe_client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(2))
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap_or_default(),
            model: model.into(),
            url: format!("{trimmed}{CHAT_PATH}"),
            base_url: format!("{trimmed}/"),
        }
    }

    /// | Variable          | Default                  |
    /// |-------------------|--------------------------|
    /// | `OLLAMA_BASE_URL` | `http://localhost:11434` |
    /// | `OLLAMA_MODEL`    | `llama3.2:1b`            |
    pub fn from_env() -> Self {
        let base =
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(model, base)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn request<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: TEMPERATURE,
                num_predict: MAX_TOKENS,
            },
        }
    }

    fn parse_response(body: &str) -> Result<String, DomainError> {
        let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
            DomainError::transport(format!("OllamaClient: failed to parse response: {e}"))
        })?;
        response
            .message
            .map(|m| m.content)
            .ok_or_else(|| DomainError::transport("OllamaClient: response has no message"))
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError> {
        // Any HTTP response, even an error status, means the server is up.
        if let Err(e) = self.probe_client.head(&self.base_url).send().await {
            if e.is_connect() || e.is_timeout() {
                return Err(DomainError::transport(format!(
                    "OllamaClient: server not reachable at {}: {e}",
                    self.base_url()
                )));
            }
        }

        debug!("OllamaClient: POST {} ({} prompt chars)", self.url, user.len());
        let response = self
            .client
            .post(&self.url)
            .json(&self.request(system, user))
            .send()
            .await
            .map_err(|e| DomainError::transport(format!("OllamaClient: request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            DomainError::transport(format!("OllamaClient: failed to read response: {e}"))
        })?;

        if !status.is_success() {
            warn!("OllamaClient: API returned {status}: {body}");
            return Err(DomainError::transport(format!(
                "OllamaClient: API returned {status}"
            )));
        }

        Self::parse_response(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
