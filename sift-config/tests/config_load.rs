use sift_config::{ConfigCredentials, CredentialProvider, Provider, SiftConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_expand_from_env_and_env_overrides_win() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
llm:
  provider: anthropic
  model: "claude-3-haiku-20240307"
  api_key: "${TEST_ANTHROPIC_KEY}"
search:
  api_key: "${TEST_GOOGLE_KEY}"
  engine_id: "cse-from-file"
scrape:
  timeout_secs: 5
  max_chars: 400
  "#;
    let p = write_yaml(&tmp, "sift.yaml", file_yaml);

    temp_env::with_vars(
        [
            ("TEST_ANTHROPIC_KEY", Some("sk-ant-env")),
            ("TEST_GOOGLE_KEY", Some("g-env")),
            ("SIFT__SCRAPE__TIMEOUT_SECS", Some("9")),
            ("SIFT__SEARCH__ENGINE_ID", Some("cse-from-env")),
        ],
        || {
            let config = SiftConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(config.llm.provider, Provider::Anthropic);
            assert_eq!(config.llm.model.as_deref(), Some("claude-3-haiku-20240307"));
            assert_eq!(config.scrape.max_chars, 400);
            assert_eq!(config.scrape.timeout_secs, 9);
            assert_eq!(config.search.results_per_query, 3);

            let secrets = ConfigCredentials::from_config(&config)
                .required_secrets()
                .expect("secrets");
            assert_eq!(secrets.search_api_key, "g-env");
            assert_eq!(secrets.search_engine_id, "cse-from-env");
            assert_eq!(secrets.llm_api_key.as_deref(), Some("sk-ant-env"));
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = SiftConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");

    assert_eq!(config.llm.timeout_secs, 120);
    assert_eq!(config.scrape.timeout_secs, 5);
    assert_eq!(config.logging.filter, "info");
    assert!(config.search.api_key.is_none());
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = SiftConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn unknown_provider_is_rejected() {
    let result = SiftConfigLoader::new()
        .with_yaml_str("llm:\n  provider: bard\n")
        .load();
    assert!(result.is_err());
}
