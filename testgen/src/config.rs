use crate::generator::GeneratorConfig;
use clap::ValueEnum;
use model::{GeminiProvider, ModelError, ModelProvider, OpenAiProvider, ProviderConfig};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Please add your {var} to the environment or a .env file")]
    MissingCredential { var: &'static str },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Provider setup failed: {0}")]
    Provider(#[from] ModelError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    #[default]
    Gemini,
    #[value(name = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// Environment variable holding the provider's API key.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn base_config(&self, api_key: String) -> ProviderConfig {
        match self {
            ProviderKind::Gemini => ProviderConfig::gemini(api_key),
            ProviderKind::OpenAi => ProviderConfig::openai(api_key),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => f.write_str("gemini"),
            ProviderKind::OpenAi => f.write_str("openai"),
        }
    }
}

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub provider_config: ProviderConfig,
}

impl AppConfig {
    /// Resolves the configuration, reading the credential through `lookup`.
    ///
    /// A missing or blank credential fails here so the process never starts
    /// serving without one.
    pub fn resolve<F>(
        addr: SocketAddr,
        provider: ProviderKind,
        model: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
        lookup: F,
    ) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = provider.credential_var();
        let api_key = lookup(var)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingCredential { var })?;

        let mut provider_config = provider.base_config(api_key).with_timeout(timeout);
        if let Some(model) = &model {
            provider_config = provider_config.with_model(model.clone());
        }
        if let Some(base_url) = &base_url {
            provider_config = provider_config.with_base_url(base_url.clone());
        }

        provider_config
            .validate()
            .map_err(|message| ConfigError::Invalid { message })?;

        Ok(Self {
            addr,
            provider,
            model,
            base_url,
            timeout,
            provider_config,
        })
    }

    /// Same as [`AppConfig::resolve`], reading the process environment.
    pub fn from_env(
        addr: SocketAddr,
        provider: ProviderKind,
        model: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> ConfigResult<Self> {
        Self::resolve(addr, provider, model, base_url, timeout, |var| {
            std::env::var(var).ok()
        })
    }

    pub fn build_provider(&self) -> ConfigResult<Arc<dyn ModelProvider>> {
        let provider: Arc<dyn ModelProvider> = match self.provider {
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(self.provider_config.clone())?),
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(self.provider_config.clone())?),
        };
        Ok(provider)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new(self.provider_config.model.clone()).with_timeout(self.timeout)
    }
}
