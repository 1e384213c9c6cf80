// Type definitions and enums

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LLMProvider {
    Groq,
    OpenAI,
}

impl LLMProvider {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "groq" => Some(LLMProvider::Groq),
            "openai" => Some(LLMProvider::OpenAI),
            _ => None,
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            LLMProvider::Groq => "GROQ_API_KEY",
            LLMProvider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Groq => write!(f, "groq"),
            LLMProvider::OpenAI => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Error reading {kind} file: {message}")]
    Extraction { kind: String, message: String },

    #[error("No legal document content provided.")]
    EmptyDocument,

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Please enter a follow-up question.")]
    InvalidFollowup,

    #[error("You have reached the maximum number of follow-up questions ({0}).")]
    FollowupCapReached(usize),

    #[error("A request is already in progress; wait for it to finish.")]
    Busy,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Warnings are expected user mistakes rather than failures
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            AppError::FollowupCapReached(_) | AppError::InvalidFollowup | AppError::Busy
        )
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_id() {
        assert_eq!(LLMProvider::from_id("groq"), Some(LLMProvider::Groq));
        assert_eq!(LLMProvider::from_id(" OpenAI "), Some(LLMProvider::OpenAI));
        assert_eq!(LLMProvider::from_id("anthropic"), None);
        assert_eq!(LLMProvider::Groq.api_key_var(), "GROQ_API_KEY");
    }

    #[test]
    fn test_error_messages_are_user_facing() {
        assert_eq!(
            AppError::FollowupCapReached(20).to_string(),
            "You have reached the maximum number of follow-up questions (20)."
        );
        assert_eq!(
            AppError::EmptyDocument.to_string(),
            "No legal document content provided."
        );
        assert!(AppError::InvalidFollowup.is_warning());
        assert!(!AppError::LLMApi("boom".into()).is_warning());
    }
}
