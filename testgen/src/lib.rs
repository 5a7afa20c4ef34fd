pub mod analyzer;
pub mod config;
pub mod generator;
pub mod metrics;
pub mod prompt;
pub mod server;
pub mod service;
pub mod types;

pub use analyzer::{AnalysisError, AnalysisResult, CodeAnalysis, CodeAnalyzer, FunctionInfo};
pub use config::{AppConfig, ConfigError, ConfigResult, ProviderKind};
pub use generator::{
    GenerationError, GenerationResult, GeneratorConfig, TestGenerator, DEFAULT_GENERATION_TIMEOUT,
};
pub use prompt::GenerationPrompt;
pub use server::{router, ApiError, AppState, HealthStatus};
pub use service::{ServiceError, ServiceResult, TestService};
pub use types::{Framework, Language, TestRequest, TestResponse};
