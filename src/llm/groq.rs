//! Groq chat completions client

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::streaming::token_stream;
use super::Generator;
use super::StreamingResponse;
use crate::config::LlmConfig;
use crate::errors::ExplorerError;
use crate::errors::Result;
use crate::retry::with_backoff;
use crate::retry::RetryPolicy;

const SERVICE: &str = "Groq";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for Groq's OpenAI-compatible API
///
/// Without an API key the client still constructs, but every call fails with
/// [`ExplorerError::LlmUnavailable`].
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl GroqClient {
    /// Create a new Groq client
    ///
    /// # Errors
    /// - HTTP client build errors
    pub fn new(config: &LlmConfig, retry: RetryPolicy) -> Result<Self> {
        let api_key = Some(config.api_key.trim().to_string()).filter(|k| !k.is_empty());
        if api_key.is_some() {
            info!("Groq client initialized with model: {}", config.model);
        } else {
            warn!("GROQ_API_KEY not set; generation is unavailable");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ExplorerError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ExplorerError::LlmUnavailable("GROQ_API_KEY not configured".to_string()))
    }

    fn request<'a>(&'a self, prompt: &'a str, stream: bool) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream,
        }
    }

    async fn send(&self, prompt: &str, stream: bool) -> Result<reqwest::Response> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request(prompt, stream))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ExplorerError::Upstream {
            service: SERVICE,
            status: status.as_u16(),
            message: error_text,
        })
    }

    async fn complete_once(&self, prompt: &str) -> Result<String> {
        let response = self.send(prompt, false).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExplorerError::Llm(format!("Failed to parse completion: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ExplorerError::Llm("Completion contained no content".to_string()))
    }
}

#[async_trait]
impl Generator for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.api_key()?;
        let answer = with_backoff(&self.retry, "Groq completion", || self.complete_once(prompt))
            .await
            .map_err(|e| {
                error!("Groq API call failed: {}", e);
                e
            })?;
        debug!("Generated response: {} chars", answer.chars().count());
        Ok(answer)
    }

    async fn stream(&self, prompt: &str) -> Result<StreamingResponse> {
        self.api_key()?;
        let response =
            with_backoff(&self.retry, "Groq stream", || self.send(prompt, true)).await?;
        let bytes = response.bytes_stream().boxed();
        Ok(StreamingResponse::new(token_stream(bytes)))
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn client_without_key() -> GroqClient {
        GroqClient::new(&AppConfig::default().llm, RetryPolicy::none()).unwrap()
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        assert!(!client_without_key().is_available());
    }

    #[tokio::test]
    async fn test_generate_without_key_fails_fast() {
        let client = client_without_key();
        assert!(matches!(
            client.generate("hi").await,
            Err(ExplorerError::LlmUnavailable(_))
        ));
        assert!(matches!(
            client.stream("hi").await,
            Err(ExplorerError::LlmUnavailable(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let mut config = AppConfig::default().llm;
        config.api_key = "gsk-test".to_string();
        let client = GroqClient::new(&config, RetryPolicy::none()).unwrap();
        let body = serde_json::to_value(client.request("Question?", true)).unwrap();
        assert_eq!(body["model"], "mixtral-8x7b-32768");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Question?");
        assert_eq!(body["max_tokens"], 2048);
        assert_eq!(body["stream"], true);
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_groq_generate() {
        let mut config = AppConfig::default().llm;
        config.api_key = std::env::var("GROQ_API_KEY").unwrap_or_default();
        let client = GroqClient::new(&config, RetryPolicy::default()).unwrap();
        let answer = client.generate("Say hello.").await.unwrap();
        assert!(!answer.is_empty());
    }
}
