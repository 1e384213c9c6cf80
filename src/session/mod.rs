//! Document Session
//!
//! In-memory state for one user's interaction with one document: the
//! extracted text, the analysis summary, and up to [`MAX_FOLLOWUPS`]
//! question/answer pairs. Only [`SessionController`] mutates it.

pub mod controller;

pub use controller::{
    AnalysisJob, AnalysisOutcome, FollowupJob, FollowupOutcome, SessionController, UploadOutcome,
};

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Hard cap on follow-up questions per document
pub const MAX_FOLLOWUPS: usize = 20;

/// One follow-up question and the model's answer
#[derive(Debug, Clone, PartialEq)]
pub struct QAPair {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentSession {
    pub(crate) file_name: Option<String>,
    pub(crate) raw_text: Option<Arc<str>>,
    pub(crate) summary: Option<String>,
    pub(crate) followups: Vec<QAPair>,
}

impl DocumentSession {
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn followups(&self) -> &[QAPair] {
        &self.followups
    }

    pub fn remaining_followups(&self) -> usize {
        MAX_FOLLOWUPS.saturating_sub(self.followups.len())
    }
}

/// Where a session is in the upload → analysis → follow-up flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No document yet
    Empty,
    /// Text extracted, summary request in flight
    Analyzing,
    /// Text extracted but the summary request failed; analysis may be retried
    AnalysisFailed,
    /// Summary available, follow-ups accepted
    Ready,
    /// Follow-up limit reached
    Capped,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Empty => "Waiting for a document",
            SessionState::Analyzing => "Analyzing document...",
            SessionState::AnalysisFailed => "Analysis failed",
            SessionState::Ready => "Ready",
            SessionState::Capped => "Follow-up limit reached",
        }
    }
}
