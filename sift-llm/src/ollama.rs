use crate::traits::{LlmClient, LlmContent, LlmResponse};
use crate::with_trailing_slash;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sift_common::{Result, SiftError};
use sift_http::{HttpClient, HttpError, RequestOpts};
use std::time::Duration;

const UNREACHABLE_HINT: &str =
    "no Ollama server answered; start one with `ollama serve` (https://github.com/ollama/ollama)";

/// Pulling a model downloads gigabytes; the generate timeout is far too short.
const PULL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Client for a local Ollama server (`/api/tags`, `/api/pull`, `/api/generate`).
///
/// Needs no API key. Construction checks that the server answers and pulls
/// the model when it is not installed yet.
pub struct OllamaClient {
    client: HttpClient,
    model: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<InstalledModel>,
}

#[derive(Debug, Deserialize)]
struct InstalledModel {
    name: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    options: GenerateOptions,
}

#[derive(Debug, Default, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaClient {
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        Self::with_timeout(&base_url, model, None).await
    }

    pub async fn with_timeout(
        base_url: &str,
        model: String,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut client = HttpClient::new(&with_trailing_slash(base_url))
            .map_err(|e| SiftError::Llm(format!("HttpClient init failed: {e}")))?;
        if let Some(timeout) = timeout {
            client = client.with_timeout(timeout);
        }

        let this = Self { client, model };
        let installed = this.installed_models().await?;
        if installed.iter().any(|name| same_model(name, &this.model)) {
            tracing::debug!(model = %this.model, "ollama.model.present");
        } else {
            this.pull().await?;
        }
        Ok(this)
    }

    async fn installed_models(&self) -> Result<Vec<String>> {
        let tags: TagsResponse = self
            .client
            .get_json("api/tags", RequestOpts::default())
            .await
            .map_err(|e| match e {
                HttpError::Network(_) | HttpError::Timeout(_) => {
                    SiftError::Llm(format!("{UNREACHABLE_HINT} ({e})"))
                }
                other => SiftError::Llm(format!("listing Ollama models failed: {other}")),
            })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn pull(&self) -> Result<()> {
        tracing::info!(model = %self.model, "ollama.model.pull.start");
        let req = PullRequest {
            model: &self.model,
            stream: false,
        };
        let opts = RequestOpts {
            timeout: Some(PULL_TIMEOUT),
            ..Default::default()
        };
        let resp: PullResponse = self
            .client
            .post_json_opts("api/pull", &req, opts)
            .await
            .map_err(|e| SiftError::Llm(format!("pulling {} failed: {e}", self.model)))?;
        tracing::info!(model = %self.model, status = %resp.status, "ollama.model.pull.done");
        Ok(())
    }
}

/// Ollama lists untagged models with an explicit `:latest`.
fn same_model(installed: &str, wanted: &str) -> bool {
    installed == wanted
        || (!wanted.contains(':') && installed.strip_suffix(":latest") == Some(wanted))
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let req = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            system: system_prompt,
            options: GenerateOptions {
                num_predict: max_tokens,
                temperature,
            },
        };

        let resp: GenerateResponse = self
            .client
            .post_json_opts("api/generate", &req, RequestOpts::default())
            .await
            .map_err(|e| SiftError::Llm(format!("{e}")))?;

        let tokens_used = match (resp.prompt_eval_count, resp.eval_count) {
            (None, None) => None,
            (p, e) => Some(p.unwrap_or(0) + e.unwrap_or(0)),
        };
        tracing::debug!(
            model = %self.model,
            ?tokens_used,
            done_reason = ?resp.done_reason,
            "ollama.generate.done"
        );

        // An empty `response` is what a zero-token completion looks like.
        let content = match resp.response {
            Some(text) if !text.is_empty() => LlmContent::PlainText(text),
            _ => LlmContent::Blocks(Vec::new()),
        };

        Ok(LlmResponse {
            content,
            model: resp.model.or_else(|| Some(self.model.clone())),
            tokens_used,
            stop_reason: resp.done_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        match self.installed_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(error = %e, "ollama.health_check.failed");
                Ok(false)
            }
        }
    }
}
