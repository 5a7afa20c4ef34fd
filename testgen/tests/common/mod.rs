#![allow(dead_code)]

use async_trait::async_trait;
use model::{
    ChatMessage, ChatRequest, ChatResponse, Choice, FinishReason, MessageRole, ModelError,
    ModelProvider, ModelResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use testgen::{CodeAnalyzer, GeneratorConfig, TestGenerator, TestService};

enum Reply {
    Text(String),
    Empty,
    Fail(fn() -> ModelError),
}

/// Provider double that counts calls and answers from a script.
pub struct ScriptedProvider {
    reply: Reply,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn with_reply(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::with_reply(Reply::Text(text.to_string()))
    }

    pub fn empty() -> Arc<Self> {
        Self::with_reply(Reply::Empty)
    }

    pub fn failing(err: fn() -> ModelError) -> Arc<Self> {
        Self::with_reply(Reply::Fail(err))
    }

    pub fn slow(text: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Text(text.to_string()),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn chat(&self, request: ChatRequest) -> ModelResult<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(prompt) = request.messages.last().and_then(|m| m.content.clone()) {
            self.prompts.lock().unwrap().push(prompt);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let content = match &self.reply {
            Reply::Text(text) => Some(text.clone()),
            Reply::Empty => None,
            Reply::Fail(make_err) => return Err(make_err()),
        };

        Ok(ChatResponse {
            choices: vec![Choice {
                message: ChatMessage {
                    role: MessageRole::Assistant,
                    content,
                },
                finish_reason: Some(FinishReason::Stop),
            }],
            usage: None,
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

pub fn service_with(provider: Arc<ScriptedProvider>) -> TestService {
    service_with_config(provider, GeneratorConfig::new("test-model"))
}

pub fn service_with_config(provider: Arc<ScriptedProvider>, config: GeneratorConfig) -> TestService {
    TestService::new(CodeAnalyzer::new(), TestGenerator::new(provider, config))
}
