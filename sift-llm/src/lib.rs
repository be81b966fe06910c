//! Provider‑agnostic LLM integration for Sift.
//!
//! This crate exposes a common [`traits::LlmClient`] interface, the
//! [`traits::LlmContent`] union every provider answer is normalised into, and
//! concrete clients for Anthropic, OpenAI, and Ollama. [`ensure_llm_ready`]
//! builds a client from a [`sift_common::LlmConfig`].
//!
//! # Examples
//! ```no_run
//! use sift_common::{LlmConfig, Result};
//! use sift_llm::ensure_llm_ready;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let cfg = LlmConfig::Anthropic {
//!     api_key: "sk-ant-...".into(),
//!     model: sift_llm::DEFAULT_ANTHROPIC_MODEL.into(),
//!     base_url: None,
//!     timeout_secs: None,
//! };
//! let client = ensure_llm_ready(&cfg).await?;
//! assert!(!client.model_name().is_empty());
//! # Ok(())
//! # }
//! ```
pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod traits;

use sift_common::{LlmConfig, SiftError};
use std::sync::Arc;
use std::time::Duration;
use traits::LlmClient;

pub use sift_common::{DEFAULT_ANTHROPIC_MODEL, DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_MODEL};

/// Build an LLM client for the configured provider, verifying local
/// prerequisites (e.g. pulling an Ollama model) where the provider has them.
pub async fn ensure_llm_ready(
    config: &LlmConfig,
) -> sift_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    tracing::info!(provider = config.provider_name(), "llm.client.init");
    match config {
        #[cfg(feature = "anthropic")]
        LlmConfig::Anthropic {
            api_key,
            model,
            base_url,
            timeout_secs,
        } => {
            let client = anthropic::AnthropicClient::with_base_url(
                api_key.clone(),
                model.clone(),
                base_url.as_deref().unwrap_or(anthropic::ANTHROPIC_API_BASE),
                timeout_secs.map(Duration::from_secs),
            )?;
            Ok(Arc::new(client))
        }
        #[cfg(feature = "openai")]
        LlmConfig::OpenAi {
            api_key,
            model,
            base_url,
            timeout_secs,
        } => {
            let client = openai::OpenAiClient::with_base_url(
                api_key.clone(),
                model.clone(),
                base_url.as_deref().unwrap_or(openai::OPENAI_API_BASE),
                timeout_secs.map(Duration::from_secs),
            )?;
            Ok(Arc::new(client))
        }
        #[cfg(feature = "ollama")]
        LlmConfig::Ollama { base_url, model } => {
            let client = ollama::OllamaClient::new(base_url.clone(), model.clone()).await?;
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(SiftError::Config("No LLM configured".to_string())),
        #[allow(unreachable_patterns)]
        _ => Err(SiftError::Config("LLM provider not enabled".to_string())),
    }
}

pub(crate) fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}
