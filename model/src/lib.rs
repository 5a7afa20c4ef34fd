pub mod config;
pub mod provider;
pub mod types;

#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "openai")]
pub mod openai;

pub use config::ProviderConfig;
pub use provider::{ModelError, ModelProvider, ModelResult};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Choice, FinishReason, MessageRole, Usage};

#[cfg(feature = "gemini")]
pub use gemini::GeminiProvider;
#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;

pub mod prelude {
    pub use crate::config::*;
    pub use crate::provider::*;
    pub use crate::types::*;

    #[cfg(feature = "gemini")]
    pub use crate::gemini::*;
    #[cfg(feature = "openai")]
    pub use crate::openai::*;
}
