use async_trait::async_trait;
use crate::config::LLMConfig;
use crate::types::{AppResult, LLMProvider, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider: LLMProvider,
}

impl LLM {
    pub fn new(config: &LLMConfig) -> AppResult<Self> {
        let adapter: Box<dyn LLMAdapter> = match (&config.provider, config.api_base.as_deref()) {
            (LLMProvider::Groq, None) => {
                Box::new(crate::llm::groq::GroqAdapter::new(&config.api_key, config.timeout)?)
            }
            (LLMProvider::OpenAI, None) => {
                Box::new(crate::llm::openai::OpenAIAdapter::new(&config.api_key, config.timeout)?)
            }
            // Both speak the OpenAI wire format, so an explicit base wins
            (_, Some(base)) => Box::new(crate::llm::openai::OpenAIAdapter::new_with_api_base(
                &config.api_key,
                base,
                config.timeout,
            )?),
        };

        Ok(Self {
            adapter,
            provider: config.provider.clone(),
        })
    }

    pub fn provider(&self) -> &LLMProvider {
        &self.provider
    }
}

#[async_trait]
impl LLMAdapter for LLM {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}
