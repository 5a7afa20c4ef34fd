use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model not found: {model}: {message}")]
    ModelNotFound { model: String, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// A hosted text-generation service.
///
/// Implementations hold no per-call state, so a single instance can be shared
/// behind an `Arc` by every request handler.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> ModelResult<ChatResponse>;

    fn provider_name(&self) -> &'static str;
}

/// Maps a transport failure, naming the service in the message.
pub(crate) fn transport_error(err: reqwest::Error, service: &str) -> ModelError {
    if err.is_timeout() {
        ModelError::ServiceUnavailable {
            message: "Request timeout".to_string(),
        }
    } else if err.is_connect() {
        ModelError::ServiceUnavailable {
            message: format!("Cannot connect to {} service", service),
        }
    } else {
        ModelError::Network(err)
    }
}

/// Maps a non-success HTTP status from a provider API.
///
/// Every variant carries the provider's own explanation, taken from the
/// `error.message` field of a JSON body when there is one.
pub(crate) fn status_error(status: StatusCode, body: &str, model: &str, service: &str) -> ModelError {
    let detail = error_detail(body);
    let message = detail
        .clone()
        .unwrap_or_else(|| format!("{} API returned {}", service, status));

    match status.as_u16() {
        401 | 403 => ModelError::Authentication { message },
        404 => ModelError::ModelNotFound {
            model: model.to_string(),
            message,
        },
        429 => ModelError::RateLimit { message },
        503 => ModelError::ServiceUnavailable { message },
        _ => ModelError::Unknown {
            message: match detail {
                Some(detail) => format!("{} API returned {}: {}", service, status, detail),
                None => message,
            },
        },
    }
}

/// Extracts the explanation from an error body.
///
/// Gemini and OpenAI both wrap it as `{"error": {"message": ...}}`; any other
/// non-blank body is used as is.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let structured = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty());

    Some(structured.unwrap_or_else(|| body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatMessage, Choice, FinishReason, MessageRole};

    struct MockProvider;

    #[async_trait]
    impl ModelProvider for MockProvider {
        async fn chat(&self, _request: ChatRequest) -> ModelResult<ChatResponse> {
            Ok(ChatResponse {
                choices: vec![Choice {
                    message: ChatMessage {
                        role: MessageRole::Assistant,
                        content: Some("Mock response".to_string()),
                    },
                    finish_reason: Some(FinishReason::Stop),
                }],
                usage: None,
            })
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockProvider;

        let request = ChatRequest::new("mock-model", vec![ChatMessage::user("Hello")]);

        let response = provider.chat(request).await.unwrap();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.role, MessageRole::Assistant);
        assert_eq!(response.text(), Some("Mock response"));
        assert_eq!(provider.provider_name(), "mock");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "", "m", "Gemini"),
            ModelError::Authentication { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "", "m", "Gemini"),
            ModelError::Authentication { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "", "m", "Gemini"),
            ModelError::RateLimit { .. }
        ));
        match status_error(StatusCode::NOT_FOUND, "", "gemini-x", "Gemini") {
            ModelError::ModelNotFound { model, .. } => assert_eq!(model, "gemini-x"),
            other => panic!("unexpected error: {other}"),
        }

        let err = status_error(StatusCode::BAD_REQUEST, "API key not valid", "m", "Gemini");
        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("API key not valid"));
    }

    #[test]
    fn test_status_error_keeps_provider_message() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded for metric generate_content_requests", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, body, "m", "Gemini");
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded: Quota exceeded for metric generate_content_requests"
        );

        let err = status_error(StatusCode::SERVICE_UNAVAILABLE, "  overloaded\n", "m", "OpenAI");
        assert_eq!(err.to_string(), "Service unavailable: overloaded");

        let err = status_error(StatusCode::UNAUTHORIZED, "", "m", "OpenAI");
        assert_eq!(
            err.to_string(),
            "Authentication failed: OpenAI API returned 401 Unauthorized"
        );

        let err = status_error(StatusCode::NOT_FOUND, r#"{"error": {"message": ""}}"#, "gpt-x", "OpenAI");
        assert!(err.to_string().starts_with("Model not found: gpt-x: "));
    }
}
