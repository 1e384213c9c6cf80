//! Agent System
//!
//! Prompt builders and single-call clients for the two kinds of model
//! request a document session makes:
//!
//! ```text
//! Extracted text
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Analysis   │  → one call per document: summary, structure, anomalies
//! │   Agent     │
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Follow-up  │  → one call per question (up to 20), document restated
//! │   Agent     │
//! └─────────────┘
//! ```

pub mod analysis;
pub mod followup;

pub use analysis::AnalysisAgent;
pub use followup::FollowupAgent;

#[cfg(test)]
pub(crate) mod testing {
    use crate::llm::LLMAdapter;
    use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted completion endpoint that records every request it receives
    pub struct StubLLM {
        replies: Mutex<VecDeque<Result<String, String>>>,
        fallback: Result<String, String>,
        requests: Mutex<Vec<LLMRequest>>,
    }

    impl StubLLM {
        pub fn replying(reply: &str) -> Self {
            Self::with_fallback(Ok(reply.to_string()))
        }

        pub fn failing(message: &str) -> Self {
            Self::with_fallback(Err(message.to_string()))
        }

        fn with_fallback(fallback: Result<String, String>) -> Self {
            Self {
                replies: Mutex::new(VecDeque::new()),
                fallback,
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Queue a one-off reply ahead of the fallback
        pub fn then(self, reply: Result<&str, &str>) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(reply.map(str::to_string).map_err(str::to_string));
            self
        }

        pub fn requests(&self) -> Vec<LLMRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        /// Prompt text of the n-th request
        pub fn prompt(&self, n: usize) -> String {
            self.requests.lock().unwrap()[n].messages[0].content.clone()
        }
    }

    #[async_trait]
    impl LLMAdapter for StubLLM {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            self.requests.lock().unwrap().push(request.clone());
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            next.map(|content| LLMResponse {
                content,
                finish_reason: "stop".to_string(),
                usage: TokenUsage::default(),
            })
            .map_err(AppError::LLMApi)
        }
    }
}
