use crate::analyzer::CodeAnalysis;
use crate::prompt::GenerationPrompt;
use crate::types::{Framework, Language};
use model::{ChatMessage, ChatRequest, ModelError, ModelProvider};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("AI generation failed: {0}")]
    Provider(#[from] ModelError),

    #[error("AI generation failed: no response within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("AI generation failed: provider returned no usable text")]
    EmptyResponse,

    #[error("AI generation failed: generation task aborted: {message}")]
    Aborted { message: String },
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Settings for the generation call.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GeneratorConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Turns an analysis into generated test code with one provider call.
#[derive(Clone)]
pub struct TestGenerator {
    provider: Arc<dyn ModelProvider>,
    config: GeneratorConfig,
}

impl TestGenerator {
    pub fn new(provider: Arc<dyn ModelProvider>, config: GeneratorConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates tests for `code`.
    ///
    /// The provider call runs as its own runtime task; a call that is still
    /// pending when the timeout expires is reported as
    /// [`GenerationError::Timeout`].
    pub async fn generate(
        &self,
        code: &str,
        language: Language,
        framework: Framework,
        analysis: &CodeAnalysis,
        include_edge_cases: bool,
    ) -> GenerationResult<String> {
        let prompt =
            GenerationPrompt::build(code, language, framework, analysis, include_edge_cases);
        let request = self.chat_request(prompt);

        debug!(
            "Dispatching generation to {} (model: {})",
            self.provider.provider_name(),
            self.config.model
        );

        let provider = Arc::clone(&self.provider);
        let task = tokio::spawn(async move { provider.chat(request).await });

        let response = match tokio::time::timeout(self.config.timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => {
                return Err(GenerationError::Aborted {
                    message: join_error.to_string(),
                })
            }
            Err(_) => {
                warn!(
                    "Generation timed out after {:?} (model: {})",
                    self.config.timeout, self.config.model
                );
                return Err(GenerationError::Timeout(self.config.timeout));
            }
        };

        response
            .text()
            .map(|text| text.trim().to_string())
            .ok_or(GenerationError::EmptyResponse)
    }

    fn chat_request(&self, prompt: String) -> ChatRequest {
        let mut request = ChatRequest::new(self.config.model.clone(), vec![ChatMessage::user(prompt)]);
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }
}
