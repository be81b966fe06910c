mod common;

use serde_json::json;
use sift_llm::openai::OpenAiClient;
use sift_llm::traits::LlmClient;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn flattens_first_output_text_part() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_1",
            "status": "completed",
            "model": "gpt-4o-mini",
            "output": [
                {"type": "reasoning", "content": []},
                {"type": "message", "content": [{"type": "output_text", "text": "hello"}]}
            ],
            "usage": {"total_tokens": 12}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::with_base_url(
        "sk-test".to_string(),
        "gpt-4o-mini".to_string(),
        &format!("{}/v1/", server.uri()),
        None,
    )
    .expect("client");

    let resp = client.generate("hi", None, Some(16), None).await.expect("generate");
    assert_eq!(resp.text(), Some("hello"));
    assert_eq!(resp.tokens_used, Some(12));
}

#[tokio::test]
async fn missing_output_text_means_no_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_2",
            "status": "incomplete",
            "model": "gpt-4o-mini",
            "output": []
        })))
        .mount(&server)
        .await;

    let client = OpenAiClient::with_base_url(
        "sk-test".to_string(),
        "gpt-4o-mini".to_string(),
        &format!("{}/v1", server.uri()),
        None,
    )
    .expect("client");

    let resp = client.generate("hi", None, None, None).await.expect("generate");
    assert_eq!(resp.text(), None);
}
