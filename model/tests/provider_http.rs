use model::{
    ChatMessage, ChatRequest, FinishReason, GeminiProvider, ModelError, ModelProvider,
    OpenAiProvider, ProviderConfig,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEMINI_PATH: &str = "/models/gemini-1.5-flash:generateContent";

fn gemini(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(ProviderConfig::gemini("test-key").with_base_url(server.uri()))
        .expect("provider creation")
}

fn openai(server: &MockServer) -> OpenAiProvider {
    OpenAiProvider::new(ProviderConfig::openai("sk-test").with_base_url(server.uri()))
        .expect("provider creation")
}

fn prompt() -> ChatRequest {
    ChatRequest::new("gemini-1.5-flash", vec![ChatMessage::user("Write pytest tests")])
}

#[tokio::test]
async fn test_gemini_generate_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Write pytest tests" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "def test_add():\n    assert add(1, 2) == 3" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 5, "candidatesTokenCount": 9, "totalTokenCount": 14 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = gemini(&server).chat(prompt()).await.expect("chat failed");

    assert_eq!(
        response.text(),
        Some("def test_add():\n    assert add(1, 2) == 3")
    );
    assert_eq!(response.choices[0].finish_reason, Some(FinishReason::Stop));
    assert_eq!(response.usage.expect("usage").total_tokens, 14);
}

#[tokio::test]
async fn test_gemini_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "Quota exceeded for metric generate_content_requests",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .mount(&server)
        .await;

    let err = gemini(&server).chat(prompt()).await.unwrap_err();
    match &err {
        ModelError::RateLimit { message } => {
            assert_eq!(message, "Quota exceeded for metric generate_content_requests")
        }
        other => panic!("expected rate limit, got {other}"),
    }
    assert_eq!(
        err.to_string(),
        "Rate limit exceeded: Quota exceeded for metric generate_content_requests"
    );
}

#[tokio::test]
async fn test_gemini_bad_request_keeps_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let err = gemini(&server).chat(prompt()).await.unwrap_err();
    assert!(err.to_string().contains("API key not valid"), "got {err}");
}

#[tokio::test]
async fn test_gemini_empty_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let response = gemini(&server).chat(prompt()).await.expect("chat failed");
    assert!(response.choices.is_empty());
    assert_eq!(response.text(), None);
}

#[tokio::test]
async fn test_gemini_transport_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "candidates": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(
        ProviderConfig::gemini("test-key")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(100)),
    )
    .expect("provider creation");

    let err = provider.chat(prompt()).await.unwrap_err();
    assert!(
        matches!(err, ModelError::ServiceUnavailable { .. }),
        "got {err}"
    );
}

#[tokio::test]
async fn test_openai_chat_completions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "it('adds', () => {});" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 3, "completion_tokens": 7, "total_tokens": 10 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new("gpt-4o-mini", vec![ChatMessage::user("Write jest tests")]);
    let response = openai(&server).chat(request).await.expect("chat failed");

    assert_eq!(response.text(), Some("it('adds', () => {});"));
    assert_eq!(response.usage.expect("usage").completion_tokens, 7);
}

#[tokio::test]
async fn test_openai_authentication_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .mount(&server)
        .await;

    let request = ChatRequest::new("gpt-4o-mini", vec![ChatMessage::user("hi")]);
    let err = openai(&server).chat(request).await.unwrap_err();
    assert!(matches!(err, ModelError::Authentication { .. }), "got {err}");
    assert_eq!(err.to_string(), "Authentication failed: Incorrect API key provided");
}
