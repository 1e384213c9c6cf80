//! Follow-up Agent
//!
//! Answers one user question against the full document text. Calls are
//! independent: earlier questions and answers are never sent back.

use crate::llm::LLMAdapter;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};
use tracing::{error, info};

pub struct FollowupAgent;

impl FollowupAgent {
    pub fn create_prompt(legal_text: &str, question: &str) -> String {
        format!(
            "Below is the legal document that was previously analyzed:\n\n{}\n\nUser follow-up question: {}",
            legal_text, question
        )
    }

    pub async fn answer(
        llm: &dyn LLMAdapter,
        model: &str,
        legal_text: &str,
        question: &str,
    ) -> AppResult<String> {
        info!(question_len = question.len(), model, "Answering follow-up question");

        let request = LLMRequest {
            model: model.to_string(),
            messages: vec![LLMMessage::user(Self::create_prompt(legal_text, question))],
            max_tokens: None,
            temperature: None,
        };

        llm.create_chat_completion(&request)
            .await
            .map(|response| {
                info!(response_len = response.content.len(), "Follow-up answered");
                response.content
            })
            .map_err(|e| {
                error!(error = %e, "Follow-up request failed");
                match e {
                    AppError::LLMApi(_) => e,
                    other => AppError::LLMApi(other.to_string()),
                }
            })
    }
}
