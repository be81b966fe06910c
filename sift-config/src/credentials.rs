//! Where the search and LLM secrets come from.
//!
//! Every source resolves to the same [`Secrets`] and fails with
//! [`SiftError::Credentials`] naming the first missing value, before any
//! network call is made.

use sift_common::{Result, SiftError};

use crate::{Provider, SiftConfig};

pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const GOOGLE_CSE_ID_VAR: &str = "GOOGLE_CSE_ID";

#[derive(Clone, PartialEq, Eq)]
pub struct Secrets {
    pub search_api_key: String,
    pub search_engine_id: String,
    /// `None` only for providers that run without a key.
    pub llm_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("search_api_key", &"<redacted>")
            .field("search_engine_id", &self.search_engine_id)
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub trait CredentialProvider: Send + Sync {
    fn required_secrets(&self) -> Result<Secrets>;

    /// Short label for logs.
    fn source_name(&self) -> &'static str;
}

fn require(name: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(SiftError::Credentials(name.to_string())),
    }
}

fn resolve(
    search_api_key: (&str, Option<String>),
    search_engine_id: (&str, Option<String>),
    llm_api_key: Option<(&str, Option<String>)>,
) -> Result<Secrets> {
    let secrets = Secrets {
        search_api_key: require(search_api_key.0, search_api_key.1)?,
        search_engine_id: require(search_engine_id.0, search_engine_id.1)?,
        llm_api_key: llm_api_key
            .map(|(name, value)| require(name, value))
            .transpose()?,
    };
    Ok(secrets)
}

/// Reads `GOOGLE_API_KEY`, `GOOGLE_CSE_ID` and the provider's key variable.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    llm_key_var: Option<&'static str>,
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self::for_provider(Provider::Anthropic)
    }

    pub fn for_provider(provider: Provider) -> Self {
        Self {
            llm_key_var: provider.api_key_var(),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvCredentials {
    fn required_secrets(&self) -> Result<Secrets> {
        let var = |name: &str| std::env::var(name).ok();
        resolve(
            (GOOGLE_API_KEY_VAR, var(GOOGLE_API_KEY_VAR)),
            (GOOGLE_CSE_ID_VAR, var(GOOGLE_CSE_ID_VAR)),
            self.llm_key_var.map(|name| (name, var(name))),
        )
    }

    fn source_name(&self) -> &'static str {
        "env"
    }
}

/// Reads the secrets out of a loaded `sift.yaml`, after `${VAR}` expansion.
#[derive(Debug, Clone)]
pub struct ConfigCredentials {
    search_api_key: Option<String>,
    search_engine_id: Option<String>,
    llm_api_key: Option<String>,
    needs_llm_key: bool,
}

impl ConfigCredentials {
    pub fn from_config(config: &SiftConfig) -> Self {
        Self {
            search_api_key: config.search.api_key.clone(),
            search_engine_id: config.search.engine_id.clone(),
            llm_api_key: config.llm.api_key.clone(),
            needs_llm_key: config.llm.provider.needs_api_key(),
        }
    }
}

impl CredentialProvider for ConfigCredentials {
    fn required_secrets(&self) -> Result<Secrets> {
        resolve(
            ("search.api_key", self.search_api_key.clone()),
            ("search.engine_id", self.search_engine_id.clone()),
            self.needs_llm_key
                .then(|| ("llm.api_key", self.llm_api_key.clone())),
        )
    }

    fn source_name(&self) -> &'static str {
        "config"
    }
}

/// Fixed values, for demos and tests.
#[derive(Debug, Clone)]
pub struct StaticCredentials(Secrets);

impl StaticCredentials {
    pub fn new(secrets: Secrets) -> Self {
        Self(secrets)
    }
}

impl CredentialProvider for StaticCredentials {
    fn required_secrets(&self) -> Result<Secrets> {
        let Secrets {
            search_api_key,
            search_engine_id,
            llm_api_key,
        } = self.0.clone();
        resolve(
            ("search_api_key", Some(search_api_key)),
            ("search_engine_id", Some(search_engine_id)),
            llm_api_key.map(|key| ("llm_api_key", Some(key))),
        )
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}
