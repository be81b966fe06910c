mod common;

use serde_json::json;
use sift_common::SiftError;
use sift_llm::ollama::OllamaClient;
use sift_llm::traits::{LlmClient, LlmContent};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "llama3.2:3b";

async fn mount_tags(server: &MockServer, names: &[&str]) {
    let models: Vec<_> = names.iter().map(|n| json!({"name": n, "size": 1})).collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": models })))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> OllamaClient {
    OllamaClient::new(server.uri(), MODEL.to_string())
        .await
        .expect("client")
}

#[tokio::test]
async fn installed_model_is_not_pulled() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_tags(&server, &["mistral:latest", MODEL]).await;
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(0)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    assert_eq!(client.model_name(), MODEL);
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
async fn missing_model_is_pulled_once() {
    let server = MockServer::start().await;
    mount_tags(&server, &["mistral:latest"]).await;
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .and(body_partial_json(json!({"model": MODEL, "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    connect(&server).await;
}

#[tokio::test]
async fn generate_sends_prompt_and_budget_and_reads_done_reason() {
    let server = MockServer::start().await;
    mount_tags(&server, &[MODEL]).await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": MODEL,
            "prompt": "What is Rust?",
            "stream": false,
            "system": "Be brief.",
            "options": {"num_predict": 100}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": MODEL,
            "response": "A systems language.",
            "done": true,
            "done_reason": "stop",
            "prompt_eval_count": 12,
            "eval_count": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = connect(&server)
        .await
        .generate("What is Rust?", Some("Be brief."), Some(100), None)
        .await
        .expect("generate");

    assert_eq!(resp.text(), Some("A systems language."));
    assert_eq!(resp.stop_reason.as_deref(), Some("stop"));
    assert_eq!(resp.tokens_used, Some(17));
}

#[tokio::test]
async fn missing_response_field_means_no_text() {
    let server = MockServer::start().await;
    mount_tags(&server, &[MODEL]).await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": MODEL,
            "done": true,
            "done_reason": "length"
        })))
        .mount(&server)
        .await;

    let resp = connect(&server)
        .await
        .generate("hi", None, Some(4000), None)
        .await
        .expect("generate");

    assert_eq!(resp.content, LlmContent::Blocks(Vec::new()));
    assert_eq!(resp.text(), None);
    assert_eq!(resp.stop_reason.as_deref(), Some("length"));
    assert_eq!(resp.tokens_used, None);
}

#[tokio::test]
async fn server_error_on_generate_is_an_llm_error() {
    let server = MockServer::start().await;
    mount_tags(&server, &[MODEL]).await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "model failed to load"})),
        )
        .mount(&server)
        .await;

    let err = connect(&server)
        .await
        .generate("hi", None, None, None)
        .await
        .unwrap_err();

    assert!(matches!(&err, SiftError::Llm(msg) if msg.contains("model failed to load")), "got {err}");
}

#[tokio::test]
async fn no_server_points_at_ollama_serve() {
    let err = OllamaClient::new("http://127.0.0.1:9".to_string(), MODEL.to_string())
        .await
        .err()
        .expect("nothing listens on the discard port");

    assert!(matches!(&err, SiftError::Llm(msg) if msg.contains("ollama serve")), "got {err}");
}
