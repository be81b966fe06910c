use crate::traits::{LlmClient, LlmContent, LlmResponse};
use crate::with_trailing_slash;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use sift_common::{Result, SiftError};
use sift_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::time::Duration;

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1/";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The Messages API requires `max_tokens`; used when the caller passes `None`.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic Messages API client.
pub struct AnthropicClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: LlmContent,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl AnthropicClient {
    /// Create a client against the public API.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(api_key, model, ANTHROPIC_API_BASE, None)
    }

    /// Create a client against a custom endpoint (gateways, tests).
    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut client = HttpClient::new(&with_trailing_slash(base_url))
            .map_err(|e| SiftError::Llm(format!("HttpClient init failed: {e}")))?;
        if let Some(timeout) = timeout {
            client = client.with_timeout(timeout);
        }

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    fn headers(&self) -> Result<RequestOpts<'static>> {
        let key = HeaderValue::from_str(self.api_key.trim())
            .map_err(|e| SiftError::Llm(format!("invalid API key header: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        Ok(RequestOpts {
            auth: Some(Auth::Header {
                name: HeaderName::from_static("x-api-key"),
                value: key,
            }),
            headers: Some(headers),
            ..Default::default()
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let req = MessagesRequest {
            model: &self.model,
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            system: system_prompt,
            temperature,
        };

        tracing::debug!(
            model = %self.model,
            max_tokens = req.max_tokens,
            prompt_len = prompt.len(),
            "anthropic.generate.start"
        );

        let resp: MessagesResponse = self
            .client
            .post_json_opts("messages", &req, self.headers()?)
            .await
            .map_err(http_to_sift)?;

        let tokens_used = resp.usage.map(|u| u.input_tokens + u.output_tokens);
        tracing::debug!(
            model = %resp.model,
            ?tokens_used,
            stop_reason = ?resp.stop_reason,
            "anthropic.generate.done"
        );

        Ok(LlmResponse {
            content: resp.content,
            model: Some(resp.model),
            tokens_used,
            stop_reason: resp.stop_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        match self.generate("Respond with just 'OK'", None, Some(5), Some(0.0)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Anthropic health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

fn http_to_sift(e: HttpError) -> SiftError {
    SiftError::Llm(format!("{e}"))
}
