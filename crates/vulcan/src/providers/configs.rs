use anyhow::{anyhow, Context, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

use super::factory::ProviderType;

pub const OPENAI_MODEL: &str = "ai/qwen2.5:latest";
pub const DMR_ENGINE_PATH: &str = "/engines/llama.cpp/v1";
pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "qwen2.5:0.5b";

/// Unified enum to wrap the different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Ollama(OllamaProviderConfig),
}

impl ProviderConfig {
    /// Load the configuration for `provider_type` from environment variables
    pub fn from_env(provider_type: ProviderType) -> Result<Self> {
        Self::from_env_with_host(provider_type, None)
    }

    /// Like [`ProviderConfig::from_env`], but an explicit `host` replaces the endpoint variables
    pub fn from_env_with_host(provider_type: ProviderType, host: Option<String>) -> Result<Self> {
        match provider_type {
            ProviderType::OpenAi => Ok(ProviderConfig::OpenAi(
                OpenAiProviderConfig::from_env_with_host(host)?,
            )),
            ProviderType::Ollama => {
                let mut config = OllamaProviderConfig::from_env()?;
                if let Some(host) = host {
                    config.host = host;
                }
                Ok(ProviderConfig::Ollama(config))
            }
        }
    }

    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderConfig::OpenAi(_) => ProviderType::OpenAi,
            ProviderConfig::Ollama(_) => ProviderType::Ollama,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::OpenAi(config) => &config.model,
            ProviderConfig::Ollama(config) => &config.model,
        }
    }
}

/// An OpenAI-compatible chat completions endpoint, e.g. Docker Model Runner's llama.cpp engine.
/// `host` is the API base; requests go to `{host}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

/// A native Ollama server; requests go to `{host}/api/chat`.
#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

pub trait EnvConfig: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self>;

    /// Get an environment variable, treating empty values as unset
    fn get_env(key: &str, required: bool, default: Option<String>) -> Result<Option<String>> {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
            Ok(_) | Err(env::VarError::NotPresent) if !required => Ok(default),
            Ok(_) | Err(env::VarError::NotPresent) => Err(anyhow!(
                "Environment variable '{}' is required but not set.",
                key
            )),
            Err(e) => Err(e).with_context(|| format!("Failed to read '{}'", key)),
        }
    }

    fn parse_env<T>(key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        Self::get_env(key, false, None)?
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|e| anyhow!("Invalid value for '{}': {}", key, e))
            })
            .transpose()
    }
}

impl EnvConfig for OpenAiProviderConfig {
    fn from_env() -> Result<Self> {
        Self::from_env_with_host(None)
    }
}

impl OpenAiProviderConfig {
    fn env_host() -> Result<String> {
        match Self::get_env("OPENAI_API_BASE", false, None)? {
            Some(host) => Ok(host),
            None => {
                let base = Self::get_env("DMR_BASE_URL", false, None)?.ok_or_else(|| {
                    anyhow!("Backend not configured: set OPENAI_API_BASE or DMR_BASE_URL")
                })?;
                Ok(format!("{}{}", base.trim_end_matches('/'), DMR_ENGINE_PATH))
            }
        }
    }

    pub fn from_env_with_host(host: Option<String>) -> Result<Self> {
        let host = match host {
            Some(host) => host,
            None => Self::env_host()?,
        };

        let api_key = Self::get_env("OPENAI_API_KEY", false, None)?;
        let model = Self::get_env("OPENAI_MODEL", false, Some(OPENAI_MODEL.to_string()))?
            .unwrap_or_else(|| OPENAI_MODEL.to_string());

        Ok(Self {
            host,
            api_key,
            model,
            temperature: Self::parse_env("OPENAI_TEMPERATURE")?,
            max_tokens: Self::parse_env("OPENAI_MAX_TOKENS")?,
        })
    }
}

impl EnvConfig for OllamaProviderConfig {
    fn from_env() -> Result<Self> {
        let host = Self::get_env("OLLAMA_BASE_URL", false, Some(OLLAMA_HOST.to_string()))?
            .unwrap_or_else(|| OLLAMA_HOST.to_string());
        let model = Self::get_env("OLLAMA_MODEL", false, Some(OLLAMA_MODEL.to_string()))?
            .unwrap_or_else(|| OLLAMA_MODEL.to_string());

        // The chat demo pins temperature to zero so answers are reproducible
        let temperature = Self::parse_env("OLLAMA_TEMPERATURE")?.or(Some(0.0));

        Ok(Self {
            host,
            model,
            temperature,
            max_tokens: Self::parse_env("OLLAMA_MAX_TOKENS")?,
        })
    }
}
