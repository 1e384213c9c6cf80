//! Session Controller
//!
//! Drives a [`DocumentSession`] through its states:
//!
//! ```text
//! Empty ──upload ok──▶ Analyzing ──summary──▶ Ready ──20th answer──▶ Capped
//!   ▲  │                   │                   │ ▲
//!   └──┘ upload failed     │ call failed       └─┘ follow-up answered
//!                          ▼
//!                   AnalysisFailed ──retry──▶ Analyzing
//! ```
//!
//! Each model call is split in three steps so a UI can run the request off
//! its own task: `begin_*` validates and hands out a job, the job's `run`
//! performs the request, and `apply_*` folds the outcome back in. Only one
//! job may be outstanding at a time.

use super::{DocumentSession, QAPair, SessionState, MAX_FOLLOWUPS};
use crate::agents::{AnalysisAgent, FollowupAgent};
use crate::extract::{self, FileType};
use crate::llm::LLMAdapter;
use crate::types::{AppError, AppResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Analysis,
    Followup,
}

/// Result of offering a file to the session
#[derive(Debug, PartialEq)]
pub enum UploadOutcome {
    /// Text extracted and analysis started
    Accepted { text_len: usize },
    /// The session already holds a document; the upload was ignored
    Ignored,
}

/// A pending analysis request, detached from the controller
pub struct AnalysisJob {
    generation: u64,
    llm: Arc<dyn LLMAdapter>,
    model: String,
    legal_text: Arc<str>,
}

pub struct AnalysisOutcome {
    generation: u64,
    pub result: AppResult<String>,
}

impl AnalysisJob {
    pub async fn run(self) -> AnalysisOutcome {
        let result = AnalysisAgent::analyze(self.llm.as_ref(), &self.model, &self.legal_text).await;
        AnalysisOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// A pending follow-up request, detached from the controller
pub struct FollowupJob {
    generation: u64,
    llm: Arc<dyn LLMAdapter>,
    model: String,
    legal_text: Arc<str>,
    question: String,
}

pub struct FollowupOutcome {
    generation: u64,
    pub question: String,
    pub result: AppResult<String>,
}

impl FollowupJob {
    pub fn question(&self) -> &str {
        &self.question
    }

    pub async fn run(self) -> FollowupOutcome {
        let result =
            FollowupAgent::answer(self.llm.as_ref(), &self.model, &self.legal_text, &self.question).await;
        FollowupOutcome {
            generation: self.generation,
            question: self.question,
            result,
        }
    }
}

pub struct SessionController {
    session: DocumentSession,
    llm: Arc<dyn LLMAdapter>,
    model: String,
    pending: Option<Pending>,
    // Bumped on reset so late outcomes from a discarded session are dropped
    generation: u64,
}

impl SessionController {
    pub fn new(llm: Arc<dyn LLMAdapter>, model: impl Into<String>) -> Self {
        Self {
            session: DocumentSession::default(),
            llm,
            model: model.into(),
            pending: None,
            generation: 0,
        }
    }

    pub fn session(&self) -> &DocumentSession {
        &self.session
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn state(&self) -> SessionState {
        if self.session.raw_text.is_none() {
            return SessionState::Empty;
        }
        if self.pending == Some(Pending::Analysis) {
            return SessionState::Analyzing;
        }
        if self.session.summary.is_none() {
            return SessionState::AnalysisFailed;
        }
        if self.session.followups.len() >= MAX_FOLLOWUPS {
            SessionState::Capped
        } else {
            SessionState::Ready
        }
    }

    /// Extract `bytes` and, on success, store the text and hand out the
    /// analysis job. Nothing changes when the session already holds a
    /// document or when extraction yields no usable text.
    pub fn begin_upload(
        &mut self,
        file_name: &str,
        bytes: &[u8],
    ) -> AppResult<Option<AnalysisJob>> {
        if self.session.raw_text.is_some() {
            info!(file_name, "Session already holds a document; ignoring upload");
            return Ok(None);
        }

        let file_type = FileType::from_filename(file_name)?;
        let text = extract::extract(bytes, file_type)?;

        if extract::is_blank(&text) {
            warn!(file_name, "Extracted document is empty");
            return Err(AppError::EmptyDocument);
        }

        info!(file_name, text_len = text.len(), "Document accepted");
        self.session.file_name = Some(file_name.to_string());
        self.session.raw_text = Some(Arc::from(text));
        self.start_analysis().map(Some)
    }

    /// Start the analysis again after a failed attempt
    pub fn begin_retry_analysis(&mut self) -> AppResult<AnalysisJob> {
        match self.state() {
            SessionState::AnalysisFailed if self.pending.is_none() => self.start_analysis(),
            SessionState::AnalysisFailed | SessionState::Analyzing => Err(AppError::Busy),
            SessionState::Empty => Err(AppError::InvalidRequest("no document uploaded".to_string())),
            SessionState::Ready | SessionState::Capped => {
                Err(AppError::InvalidRequest("document already analyzed".to_string()))
            }
        }
    }

    fn start_analysis(&mut self) -> AppResult<AnalysisJob> {
        let legal_text = self
            .session
            .raw_text
            .clone()
            .ok_or_else(|| AppError::InvalidRequest("no document uploaded".to_string()))?;
        self.pending = Some(Pending::Analysis);
        Ok(AnalysisJob {
            generation: self.generation,
            llm: Arc::clone(&self.llm),
            model: self.model.clone(),
            legal_text,
        })
    }

    /// Fold an analysis outcome back into the session. A failure leaves the
    /// summary unset. Returns `false` for outcomes belonging to a discarded
    /// session.
    pub fn apply_analysis(&mut self, outcome: AnalysisOutcome) -> AppResult<bool> {
        if outcome.generation != self.generation {
            debug!("Dropping analysis outcome from a discarded session");
            return Ok(false);
        }
        if self.pending != Some(Pending::Analysis) {
            return Err(AppError::InvalidRequest("no analysis in progress".to_string()));
        }
        self.pending = None;

        let summary = outcome.result?;
        self.session.summary = Some(summary);
        Ok(true)
    }

    /// Validate a follow-up question and hand out its job
    pub fn begin_followup(&mut self, question: &str) -> AppResult<FollowupJob> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidFollowup);
        }
        if self.pending.is_some() {
            return Err(AppError::Busy);
        }

        match self.state() {
            SessionState::Ready => {}
            SessionState::Capped => {
                warn!(limit = MAX_FOLLOWUPS, "Follow-up limit reached");
                return Err(AppError::FollowupCapReached(MAX_FOLLOWUPS));
            }
            SessionState::Empty => {
                return Err(AppError::InvalidRequest("upload a document first".to_string()));
            }
            SessionState::Analyzing => return Err(AppError::Busy),
            SessionState::AnalysisFailed => {
                return Err(AppError::InvalidRequest(
                    "the document has not been analyzed yet".to_string(),
                ));
            }
        }

        let legal_text = self
            .session
            .raw_text
            .clone()
            .ok_or_else(|| AppError::InvalidRequest("upload a document first".to_string()))?;
        self.pending = Some(Pending::Followup);

        Ok(FollowupJob {
            generation: self.generation,
            llm: Arc::clone(&self.llm),
            model: self.model.clone(),
            legal_text,
            question: question.to_string(),
        })
    }

    /// Append the answered pair. A failed call appends nothing.
    /// Returns `None` for outcomes belonging to a discarded session.
    pub fn apply_followup(&mut self, outcome: FollowupOutcome) -> AppResult<Option<QAPair>> {
        if outcome.generation != self.generation {
            debug!("Dropping follow-up outcome from a discarded session");
            return Ok(None);
        }
        if self.pending != Some(Pending::Followup) {
            return Err(AppError::InvalidRequest("no follow-up in progress".to_string()));
        }
        self.pending = None;

        let answer = outcome.result?;
        let pair = QAPair {
            question: outcome.question,
            answer,
            asked_at: Utc::now(),
        };
        self.session.followups.push(pair.clone());
        info!(count = self.session.followups.len(), "Follow-up recorded");
        Ok(Some(pair))
    }

    /// Discard the current session and start an empty one
    pub fn reset(&mut self) {
        info!("Starting a new session");
        self.session = DocumentSession::default();
        self.pending = None;
        self.generation += 1;
    }

    /// Upload and analyze in one step
    pub async fn upload(&mut self, file_name: &str, bytes: &[u8]) -> AppResult<UploadOutcome> {
        match self.begin_upload(file_name, bytes)? {
            Some(job) => {
                let outcome = job.run().await;
                self.apply_analysis(outcome)?;
                let text_len = self.session.raw_text().map(str::len).unwrap_or_default();
                Ok(UploadOutcome::Accepted { text_len })
            }
            None => Ok(UploadOutcome::Ignored),
        }
    }

    pub async fn retry_analysis(&mut self) -> AppResult<()> {
        let job = self.begin_retry_analysis()?;
        let outcome = job.run().await;
        self.apply_analysis(outcome).map(|_| ())
    }

    /// Ask one follow-up question and wait for the answer
    pub async fn ask(&mut self, question: &str) -> AppResult<QAPair> {
        let job = self.begin_followup(question)?;
        let outcome = job.run().await;
        self.apply_followup(outcome)?
            .ok_or_else(|| AppError::InvalidRequest("session was reset".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::StubLLM;

    const CONTRACT: &str = "This Agreement is entered into by Landlord and Tenant.\n\
                            Either party may terminate on thirty days notice.";

    fn controller(llm: &Arc<StubLLM>) -> SessionController {
        SessionController::new(llm.clone(), "test-model")
    }

    async fn ready_controller(llm: &Arc<StubLLM>) -> SessionController {
        let mut ctl = controller(llm);
        ctl.upload("contract.txt", CONTRACT.as_bytes()).await.unwrap();
        ctl
    }

    #[tokio::test]
    async fn test_upload_txt_analyzes_once() {
        let llm = Arc::new(StubLLM::replying("A residential lease."));
        let mut ctl = controller(&llm);

        let outcome = ctl.upload("contract.txt", CONTRACT.as_bytes()).await.unwrap();

        assert_eq!(outcome, UploadOutcome::Accepted { text_len: CONTRACT.len() });
        assert_eq!(ctl.session().raw_text(), Some(CONTRACT));
        assert_eq!(ctl.session().summary(), Some("A residential lease."));
        assert_eq!(ctl.state(), SessionState::Ready);
        assert_eq!(llm.call_count(), 1);

        let prompt = llm.prompt(0);
        assert!(prompt.starts_with("Please summarize the following legal document."));
        assert!(prompt.contains(CONTRACT));
    }

    #[tokio::test]
    async fn test_reupload_is_ignored() {
        let llm = Arc::new(StubLLM::replying("summary"));
        let mut ctl = ready_controller(&llm).await;

        let outcome = ctl.upload("other.txt", b"Completely different text").await.unwrap();

        assert_eq!(outcome, UploadOutcome::Ignored);
        assert_eq!(ctl.session().raw_text(), Some(CONTRACT));
        assert_eq!(ctl.session().file_name(), Some("contract.txt"));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_document_short_circuits() {
        let llm = Arc::new(StubLLM::replying("unused"));
        let mut ctl = controller(&llm);

        let err = ctl.upload("blank.txt", b"  \n\t  \n").await.unwrap_err();

        assert!(matches!(err, AppError::EmptyDocument));
        assert_eq!(ctl.state(), SessionState::Empty);
        assert!(ctl.session().raw_text().is_none());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let llm = Arc::new(StubLLM::replying("unused"));
        let mut ctl = controller(&llm);

        let err = ctl.upload("notes.xyz", CONTRACT.as_bytes()).await.unwrap_err();

        assert!(matches!(err, AppError::UnsupportedFileType(_)));
        assert!(ctl.session().raw_text().is_none());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_allows_retry_upload() {
        let llm = Arc::new(StubLLM::replying("summary"));
        let mut ctl = controller(&llm);

        let err = ctl.upload("broken.pdf", b"not a pdf").await.unwrap_err();
        assert!(matches!(err, AppError::Extraction { .. }));
        assert_eq!(ctl.state(), SessionState::Empty);
        assert_eq!(llm.call_count(), 0);

        ctl.upload("contract.txt", CONTRACT.as_bytes()).await.unwrap();
        assert_eq!(ctl.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_pdf_and_docx_uploads() {
        let llm = Arc::new(StubLLM::replying("summary"));

        let mut ctl = controller(&llm);
        let pdf = crate::extract::pdf::tests::build_pdf(&[Some("This Agreement is made")]);
        ctl.upload("lease.pdf", &pdf).await.unwrap();
        assert!(ctl.session().raw_text().unwrap().contains("This Agreement is made"));

        let mut ctl = controller(&llm);
        let docx = crate::extract::docx::tests::build_docx(&[&["Clause one"], &["Clause two"]]);
        ctl.upload("lease.docx", &docx).await.unwrap();
        assert_eq!(ctl.session().raw_text(), Some("Clause one\nClause two"));

        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_analysis_keeps_text_and_can_retry() {
        let llm = Arc::new(StubLLM::replying("Recovered summary").then(Err("503 Service Unavailable")));
        let mut ctl = controller(&llm);

        let err = ctl.upload("contract.txt", CONTRACT.as_bytes()).await.unwrap_err();
        assert!(matches!(err, AppError::LLMApi(_)));
        assert_eq!(ctl.state(), SessionState::AnalysisFailed);
        assert!(ctl.session().summary().is_none());
        assert_eq!(ctl.session().raw_text(), Some(CONTRACT));

        // follow-ups wait for a summary
        assert!(ctl.begin_followup("Anything?").is_err());

        ctl.retry_analysis().await.unwrap();
        assert_eq!(ctl.session().summary(), Some("Recovered summary"));
        assert_eq!(ctl.state(), SessionState::Ready);
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_followup_scenario() {
        let llm = Arc::new(StubLLM::replying("Thirty days notice."));
        let mut ctl = ready_controller(&llm).await;

        let pair = ctl.ask("What is the termination clause?").await.unwrap();

        assert_eq!(pair.question, "What is the termination clause?");
        assert_eq!(pair.answer, "Thirty days notice.");
        assert_eq!(ctl.session().followups().len(), 1);
        assert_eq!(llm.call_count(), 2);

        let prompt = llm.prompt(1);
        assert!(prompt.contains(CONTRACT));
        assert!(prompt.contains("What is the termination clause?"));
    }

    #[tokio::test]
    async fn test_followups_do_not_carry_history() {
        let llm = Arc::new(StubLLM::replying("answer"));
        let mut ctl = ready_controller(&llm).await;

        ctl.ask("First question?").await.unwrap();
        ctl.ask("Second question?").await.unwrap();

        let prompt = llm.prompt(2);
        assert!(prompt.contains("Second question?"));
        assert!(!prompt.contains("First question?"));
    }

    #[tokio::test]
    async fn test_blank_followup_rejected_locally() {
        let llm = Arc::new(StubLLM::replying("answer"));
        let mut ctl = ready_controller(&llm).await;

        let err = ctl.ask("   \n").await.unwrap_err();

        assert!(matches!(err, AppError::InvalidFollowup));
        assert!(ctl.session().followups().is_empty());
        assert_eq!(ctl.state(), SessionState::Ready);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_followup_cap() {
        let llm = Arc::new(StubLLM::replying("answer"));
        let mut ctl = ready_controller(&llm).await;

        for i in 0..MAX_FOLLOWUPS {
            ctl.ask(&format!("Question {}?", i + 1)).await.unwrap();
        }
        assert_eq!(ctl.state(), SessionState::Capped);
        assert_eq!(llm.call_count(), 1 + MAX_FOLLOWUPS);

        let err = ctl.ask("Question 21?").await.unwrap_err();

        assert!(matches!(err, AppError::FollowupCapReached(20)));
        assert_eq!(ctl.session().followups().len(), MAX_FOLLOWUPS);
        assert_eq!(llm.call_count(), 1 + MAX_FOLLOWUPS);

        let questions: Vec<_> = ctl.session().followups().iter().map(|qa| qa.question.clone()).collect();
        assert_eq!(questions.first().map(String::as_str), Some("Question 1?"));
        assert_eq!(questions.last().map(String::as_str), Some("Question 20?"));
    }

    #[tokio::test]
    async fn test_failed_followup_not_appended() {
        let llm = Arc::new(StubLLM::replying("fine").then(Ok("summary")).then(Err("timeout")));
        let mut ctl = ready_controller(&llm).await;

        let err = ctl.ask("Will this fail?").await.unwrap_err();

        assert!(matches!(err, AppError::LLMApi(_)));
        assert!(ctl.session().followups().is_empty());
        assert!(!ctl.is_busy());
        assert_eq!(ctl.session().remaining_followups(), MAX_FOLLOWUPS);

        ctl.ask("Try again?").await.unwrap();
        assert_eq!(ctl.session().followups().len(), 1);
    }

    #[tokio::test]
    async fn test_one_call_in_flight() {
        let llm = Arc::new(StubLLM::replying("answer"));
        let mut ctl = controller(&llm);

        let job = ctl.begin_upload("contract.txt", CONTRACT.as_bytes()).unwrap().unwrap();
        assert_eq!(ctl.state(), SessionState::Analyzing);
        assert!(matches!(ctl.begin_followup("Too early?"), Err(AppError::Busy)));

        assert!(ctl.apply_analysis(job.run().await).unwrap());

        let job = ctl.begin_followup("First?").unwrap();
        assert!(matches!(ctl.begin_followup("Second?"), Err(AppError::Busy)));
        ctl.apply_followup(job.run().await).unwrap();

        assert_eq!(ctl.session().followups().len(), 1);
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_reset_drops_late_outcome() {
        let llm = Arc::new(StubLLM::replying("late summary"));
        let mut ctl = controller(&llm);

        let job = ctl.begin_upload("contract.txt", CONTRACT.as_bytes()).unwrap().unwrap();
        ctl.reset();
        assert!(!ctl.apply_analysis(job.run().await).unwrap());

        assert_eq!(ctl.state(), SessionState::Empty);
        assert!(ctl.session().summary().is_none());
        assert!(!ctl.is_busy());
    }

    #[test]
    fn test_retry_requires_failed_analysis() {
        let llm = Arc::new(StubLLM::replying("summary"));
        let mut ctl = controller(&llm);
        assert!(matches!(ctl.begin_retry_analysis(), Err(AppError::InvalidRequest(_))));

        tokio_test::block_on(ctl.upload("contract.txt", CONTRACT.as_bytes())).unwrap();
        assert!(matches!(ctl.begin_retry_analysis(), Err(AppError::InvalidRequest(_))));
    }
}
