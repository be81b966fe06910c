use crate::traits::{LlmClient, LlmContent, LlmResponse};
use crate::with_trailing_slash;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sift_common::{Result, SiftError};
use sift_http::{HttpClient, HttpError};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
pub struct ResponsesApiRequest {
    model: String,
    input: String,
    instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsesApiResponse {
    pub id: String,
    pub status: String,
    pub model: String,
    #[serde(default)]
    pub output: Vec<ResponseMessage>,
    #[serde(default)]
    pub usage: Option<ResponseUsage>,
}

/// One element in the `output` array
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<ResponseContent>,
}

/// One part of the message `content`
#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ResponseUsage {
    #[serde(default)]
    pub total_tokens: u32,
}

impl OpenAiClient {
    /// Create a new client for the given API key and model.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(api_key, model, OPENAI_API_BASE, None)
    }

    /// Create a client against an OpenAI-compatible endpoint or gateway.
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
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let instructions = system_prompt
            .unwrap_or("You are a careful research assistant.")
            .to_string();

        let req = ResponsesApiRequest {
            model: self.model.clone(),
            input: prompt.to_string(),
            instructions,
            max_output_tokens: max_tokens,
            temperature,
        };

        let resp: ResponsesApiResponse = self
            .client
            .post_json("responses", Some(&self.api_key), &req)
            .await
            .map_err(http_to_sift)?;

        tracing::debug!(id = %resp.id, status = %resp.status, "openai.generate.done");

        // The Responses API has no bare-string form; flatten the first
        // `output_text` part into a plain string. No text part at all maps to
        // an empty block list so callers see "no text" rather than "".
        let content = resp
            .output
            .iter()
            .flat_map(|msg| &msg.content)
            .find(|c| c.kind == "output_text")
            .map(|c| LlmContent::PlainText(c.text.clone()))
            .unwrap_or(LlmContent::Blocks(Vec::new()));

        Ok(LlmResponse {
            content,
            model: Some(resp.model),
            tokens_used: resp.usage.map(|u| u.total_tokens),
            stop_reason: Some(resp.status),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        match self
            .generate("Respond with just 'OK'", None, Some(16), Some(0.1))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("OpenAi health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

fn http_to_sift(e: HttpError) -> SiftError {
    SiftError::Llm(format!("{e}"))
}
