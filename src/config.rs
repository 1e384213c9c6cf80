use crate::types::{AppError, AppResult, LLMProvider};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LLMConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub api_key: String,
    pub model: String,
    pub api_base: Option<String>,
    pub timeout: Option<Duration>,
}

// Keep the key out of debug output
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("provider", &self.provider)
            .field("api_key", &"••••")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
}

/// Command-line values that take precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
}

impl Config {
    /// Load configuration from `.env` and the process environment, with
    /// command-line overrides applied first.
    ///
    /// A missing API key for the selected provider is a fatal error.
    pub fn load(overrides: &Overrides) -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| match name {
            "LLM_PROVIDER" if overrides.provider.is_some() => overrides.provider.clone(),
            "LLM_MODEL" if overrides.model.is_some() => overrides.model.clone(),
            _ => env::var(name).ok(),
        })
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider_id = lookup("LLM_PROVIDER").unwrap_or_else(|| "groq".to_string());
        let provider = LLMProvider::from_id(&provider_id)
            .ok_or_else(|| AppError::Config(format!("Unsupported provider: {}", provider_id)))?;

        let api_key = lookup(provider.api_key_var())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::Config(format!("{} must be set", provider.api_key_var()))
            })?;

        let timeout = match lookup("LLM_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.trim().parse().map_err(|_| {
                AppError::Config(format!("LLM_TIMEOUT_SECS is not a number: {}", raw))
            })?)),
            None => None,
        };

        Ok(Self {
            llm: LLMConfig {
                provider,
                api_key,
                model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_base: lookup("LLM_API_BASE").filter(|b| !b.trim().is_empty()),
                timeout,
            },
            logging: LoggingConfig {
                log_dir: lookup("LEGALESE_LOG_DIR").map(PathBuf::from),
            },
        })
    }
}
