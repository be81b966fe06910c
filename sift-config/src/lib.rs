//! Loader for `sift.yaml` with environment overlays, plus credential sources.
//!
//! Precedence, lowest first: field defaults, the YAML file (optional), inline
//! YAML snippets, then `SIFT__SECTION__FIELD` environment variables. After
//! merging, every string value goes through `${VAR}` expansion, so secrets can
//! live in the process environment while the file only names them.
//!
//! ```yaml
//! llm:
//!   provider: anthropic        # anthropic | openai | ollama
//!   model: claude-3-sonnet-20240229
//!   api_key: "${ANTHROPIC_API_KEY}"
//!   timeout_secs: 120
//! search:
//!   api_key: "${GOOGLE_API_KEY}"
//!   engine_id: "${GOOGLE_CSE_ID}"
//!   results_per_query: 3
//! scrape:
//!   timeout_secs: 5
//!   max_chars: 1000
//! logging:
//!   format: text
//!   filter: info
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use sift_common::{
    DEFAULT_ANTHROPIC_MODEL, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_MODEL,
    LlmConfig,
};
use std::path::{Path, PathBuf};

pub mod credentials;

pub use credentials::{
    ConfigCredentials, CredentialProvider, EnvCredentials, Secrets, StaticCredentials,
};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const CONFIG_FILE_NAME: &str = "sift.yaml";
const ENV_PREFIX: &str = "SIFT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    pub llm: LlmSection,
    pub search: SearchSection,
    pub scrape: ScrapeSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
            Self::Ollama => DEFAULT_OLLAMA_MODEL,
        }
    }

    /// Local providers run without an API key.
    pub fn needs_api_key(self) -> bool {
        !matches!(self, Self::Ollama)
    }

    /// Environment variable conventionally holding this provider's key.
    pub fn api_key_var(self) -> Option<&'static str> {
        match self {
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub provider: Provider,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            api_key: None,
            endpoint: None,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
    pub results_per_query: u32,
    pub endpoint: String,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            results_per_query: 3,
            endpoint: "https://www.googleapis.com/customsearch/v1".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeSection {
    pub timeout_secs: u64,
    pub max_chars: usize,
}

impl Default for ScrapeSection {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_chars: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub format: String,
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            format: "text".into(),
            filter: "info".into(),
        }
    }
}

impl SiftConfig {
    /// Provider configuration for `sift_llm::ensure_llm_ready`.
    pub fn llm_config(&self, secrets: &Secrets) -> LlmConfig {
        let model = self
            .llm
            .model
            .clone()
            .unwrap_or_else(|| self.llm.provider.default_model().to_string());
        let api_key = secrets.llm_api_key.clone().unwrap_or_default();
        match self.llm.provider {
            Provider::Anthropic => LlmConfig::Anthropic {
                api_key,
                model,
                base_url: self.llm.endpoint.clone(),
                timeout_secs: Some(self.llm.timeout_secs),
            },
            Provider::OpenAi => LlmConfig::OpenAi {
                api_key,
                model,
                base_url: self.llm.endpoint.clone(),
                timeout_secs: Some(self.llm.timeout_secs),
            },
            Provider::Ollama => LlmConfig::Ollama {
                base_url: self
                    .llm
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
                model,
            },
        }
    }
}

/// First existing of `./sift.yaml` and `<config dir>/sift/sift.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("sift").join(CONFIG_FILE_NAME))
        .filter(|p| p.is_file())
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct SiftConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SiftConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SiftConfigLoader {
    /// ```
    /// use sift_config::{Provider, SiftConfigLoader};
    ///
    /// let config = SiftConfigLoader::new().load().expect("defaults");
    /// assert_eq!(config.llm.provider, Provider::Anthropic);
    /// assert_eq!(config.search.results_per_query, 3);
    /// assert_eq!(config.scrape.max_chars, 1000);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use sift_config::{Provider, SiftConfigLoader};
    ///
    /// let cfg = SiftConfigLoader::new()
    ///     .with_yaml_str("llm:\n  provider: ollama\n  model: qwen2.5:7b\n")
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.llm.provider, Provider::Ollama);
    /// assert_eq!(cfg.llm.model.as_deref(), Some("qwen2.5:7b"));
    /// assert_eq!(cfg.llm.timeout_secs, 120);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge sources, overlay `SIFT__` environment variables, expand `${VAR}`
    /// placeholders and deserialize.
    pub fn load(self) -> Result<SiftConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SiftConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        tracing::debug!(
            provider = ?typed.llm.provider,
            results_per_query = typed.search.results_per_query,
            "config.loaded"
        );
        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_nested_sections() {
        temp_env::with_vars(
            [("G_KEY", Some("g-123")), ("G_CX", Some("cx-456"))],
            || {
                let mut v = json!({
                    "search": { "api_key": "${G_KEY}", "engine_id": "$G_CX", "results_per_query": 3 },
                    "tags": ["${G_KEY}", true, null]
                });
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!({
                        "search": { "api_key": "g-123", "engine_id": "cx-456", "results_per_query": 3 },
                        "tags": ["g-123", true, null]
                    })
                );
            },
        );
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST_SIFT}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST_SIFT}"));
    }

    #[test]
    fn llm_config_fills_provider_defaults() {
        let secrets = Secrets {
            search_api_key: "g".into(),
            search_engine_id: "cx".into(),
            llm_api_key: Some("sk".into()),
        };

        let cfg = SiftConfig::default();
        match cfg.llm_config(&secrets) {
            LlmConfig::Anthropic {
                api_key,
                model,
                base_url,
                timeout_secs,
            } => {
                assert_eq!(api_key, "sk");
                assert_eq!(model, DEFAULT_ANTHROPIC_MODEL);
                assert_eq!(base_url, None);
                assert_eq!(timeout_secs, Some(120));
            }
            other => panic!("expected anthropic, got {other:?}"),
        }

        let mut cfg = SiftConfig::default();
        cfg.llm.provider = Provider::Ollama;
        assert_eq!(
            cfg.llm_config(&secrets),
            LlmConfig::Ollama {
                base_url: DEFAULT_OLLAMA_BASE_URL.into(),
                model: DEFAULT_OLLAMA_MODEL.into(),
            }
        );
    }
}
