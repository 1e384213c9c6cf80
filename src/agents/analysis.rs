//! Analysis Agent
//!
//! Produces the initial summary of an uploaded legal document: overall
//! structure, the most important parts, and anything anomalous compared with
//! typical contracts.

use crate::llm::LLMAdapter;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};
use tracing::{error, info};

const ANALYSIS_PREAMBLE: &str = "Please summarize the following legal document. \
Explain its overall structure and content, highlight the most important parts, \
and analyze whether there is anything anomalous compared to most other legal contracts. \
Document:\n\n";

pub struct AnalysisAgent;

impl AnalysisAgent {
    /// Build the analysis prompt. The document is passed through whole.
    pub fn create_prompt(legal_text: &str) -> String {
        let mut prompt = String::with_capacity(ANALYSIS_PREAMBLE.len() + legal_text.len());
        prompt.push_str(ANALYSIS_PREAMBLE);
        prompt.push_str(legal_text);
        prompt
    }

    /// Issue exactly one completion request and return the model's text
    pub async fn analyze(llm: &dyn LLMAdapter, model: &str, legal_text: &str) -> AppResult<String> {
        info!(text_len = legal_text.len(), model, "Analyzing document");

        let request = LLMRequest {
            model: model.to_string(),
            messages: vec![LLMMessage::user(Self::create_prompt(legal_text))],
            max_tokens: None,
            temperature: None,
        };

        match llm.create_chat_completion(&request).await {
            Ok(response) => {
                info!(
                    response_len = response.content.len(),
                    total_tokens = response.usage.total_tokens,
                    "Analysis complete"
                );
                Ok(response.content)
            }
            Err(e) => {
                error!(error = %e, "Analysis request failed");
                Err(match e {
                    AppError::LLMApi(_) => e,
                    other => AppError::LLMApi(other.to_string()),
                })
            }
        }
    }
}
