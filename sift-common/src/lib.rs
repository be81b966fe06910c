//! Common types and utilities shared across Sift crates.
//!
//! This crate defines the provider configuration, observability helpers, and
//! shared error types used throughout the Sift workspace. It stays
//! dependency‑light so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`LlmConfig`]: Provider‑agnostic LLM configuration
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`SiftError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use sift_common::{LlmConfig, SiftError};
//!
//! let cfg = LlmConfig::None;
//! assert!(cfg.provider_name() == "none");
//!
//! let err = SiftError::Credentials("GOOGLE_API_KEY".into());
//! assert!(err.to_string().contains("GOOGLE_API_KEY"));
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Default model per provider when configuration leaves it unset.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Configuration for the LLM provider used by the pipeline.
///
/// Feature flags control which variants are compiled in.
/// See the `sift-llm` crate for concrete client implementations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum LlmConfig {
    #[cfg(feature = "anthropic")]
    Anthropic {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timeout_secs: Option<u64>,
    },
    #[cfg(feature = "openai")]
    OpenAi {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timeout_secs: Option<u64>,
    },
    #[cfg(feature = "ollama")]
    Ollama { base_url: String, model: String },
    #[default]
    None,
}

impl LlmConfig {
    /// Short provider label used in logs and error messages.
    pub fn provider_name(&self) -> &'static str {
        match self {
            #[cfg(feature = "anthropic")]
            Self::Anthropic { .. } => "anthropic",
            #[cfg(feature = "openai")]
            Self::OpenAi { .. } => "openai",
            #[cfg(feature = "ollama")]
            Self::Ollama { .. } => "ollama",
            Self::None => "none",
        }
    }
}

/// Error types used across the Sift system.
#[derive(thiserror::Error, Debug)]
pub enum SiftError {
    /// The LLM provider failed to produce a response.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The search provider rejected or failed a query.
    #[error("Search error: {0}")]
    Search(String),

    /// A required secret could not be resolved.
    #[error("Missing credential: {0}")]
    Credentials(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`SiftError`].
pub type Result<T> = std::result::Result<T, SiftError>;
