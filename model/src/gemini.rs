use crate::config::ProviderConfig;
use crate::provider::{status_error, transport_error, ModelError, ModelProvider, ModelResult};
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, Choice, FinishReason, MessageRole, Usage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const SERVICE: &str = "Gemini";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiApiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Client for the Google Generative Language `generateContent` API.
pub struct GeminiProvider {
    http_client: reqwest::Client,
    config: ProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> ModelResult<Self> {
        config
            .validate()
            .map_err(|msg| ModelError::InvalidConfig { message: msg })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::Unknown {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn text_part(text: Option<&String>) -> GeminiPart {
        GeminiPart {
            text: Some(text.cloned().unwrap_or_default()),
        }
    }

    fn build_request_body(&self, request: &ChatRequest) -> GeminiApiRequest {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for msg in &request.messages {
            match msg.role {
                MessageRole::System => system_parts.push(Self::text_part(msg.content.as_ref())),
                MessageRole::User => contents.push(GeminiContent {
                    role: Some("user".to_string()),
                    parts: vec![Self::text_part(msg.content.as_ref())],
                }),
                MessageRole::Assistant => contents.push(GeminiContent {
                    role: Some("model".to_string()),
                    parts: vec![Self::text_part(msg.content.as_ref())],
                }),
            }
        }

        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: system_parts,
            })
        };

        GeminiApiRequest {
            contents,
            system_instruction,
            generation_config: GeminiGenerationConfig {
                temperature: request
                    .temperature
                    .unwrap_or(self.config.default_temperature),
                max_output_tokens: request.max_tokens.or(self.config.default_max_tokens),
            },
        }
    }

    fn convert_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
        reason.map(|r| match r {
            "MAX_TOKENS" => FinishReason::Length,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => {
                FinishReason::ContentFilter
            }
            _ => FinishReason::Stop,
        })
    }

    fn parse_response(response: GeminiApiResponse) -> ChatResponse {
        let choices = response
            .candidates
            .into_iter()
            .map(|candidate| {
                let text: String = candidate
                    .content
                    .map(|content| {
                        content
                            .parts
                            .into_iter()
                            .filter_map(|part| part.text)
                            .collect()
                    })
                    .unwrap_or_default();

                Choice {
                    message: ChatMessage {
                        role: MessageRole::Assistant,
                        content: if text.is_empty() { None } else { Some(text) },
                    },
                    finish_reason: Self::convert_finish_reason(candidate.finish_reason.as_deref()),
                }
            })
            .collect();

        let usage = response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        ChatResponse { choices, usage }
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn chat(&self, request: ChatRequest) -> ModelResult<ChatResponse> {
        debug!("Starting Gemini request with model: {}", request.model);

        let body = self.build_request_body(&request);
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint(),
            request.model
        );

        let http_response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, SERVICE))?;

        let status = http_response.status();
        if !status.is_success() {
            let error_text = http_response.text().await.unwrap_or_default();
            return Err(status_error(status, &error_text, &request.model, SERVICE));
        }

        let api_response: GeminiApiResponse = http_response
            .json()
            .await
            .map_err(|e| transport_error(e, SERVICE))?;

        let chat_response = Self::parse_response(api_response);

        info!(
            "Gemini request completed with {} candidate(s)",
            chat_response.choices.len()
        );

        Ok(chat_response)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
