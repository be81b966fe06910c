//! Config, credentials and pipeline assembly shared by both subcommands.
use anyhow::{Context, Result};
use clap::ValueEnum;
use sift_config::{
    ConfigCredentials, CredentialProvider, EnvCredentials, SiftConfig, SiftConfigLoader,
    default_config_path,
};
use sift_pipeline::{Pipeline, PipelineError};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CredentialSource {
    /// GOOGLE_API_KEY, GOOGLE_CSE_ID and the provider's key variable.
    Env,
    /// `search.api_key`, `search.engine_id`, `llm.api_key` from sift.yaml.
    Config,
}

/// An explicit path must exist; otherwise the first default location found
/// is used, and no file at all means defaults plus environment.
pub fn load_config(explicit: Option<&Path>) -> Result<SiftConfig> {
    let loader = SiftConfigLoader::new();
    let loader = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "config.file");
            loader.with_file(path)
        }
        None => loader,
    };
    loader.load().context("failed to load configuration")
}

pub fn credentials(source: CredentialSource, config: &SiftConfig) -> Box<dyn CredentialProvider> {
    match source {
        CredentialSource::Env => Box::new(EnvCredentials::for_provider(config.llm.provider)),
        CredentialSource::Config => Box::new(ConfigCredentials::from_config(config)),
    }
}

pub async fn build_pipeline(
    config: &SiftConfig,
    credentials: &dyn CredentialProvider,
) -> Result<Pipeline, PipelineError> {
    Pipeline::from_config(config, credentials).await
}
