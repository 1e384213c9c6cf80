//! Application State
//!
//! Owns the session controller and the interface state around it: the input
//! box, user-visible notices, scrolling, and the channel that carries model
//! call outcomes back from background tasks.

use crate::extract;
use crate::session::{
    AnalysisJob, AnalysisOutcome, FollowupJob, FollowupOutcome, SessionController, SessionState,
    MAX_FOLLOWUPS,
};
use crate::tui::event::AppAction;
use crate::types::AppError;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tui_textarea::TextArea;

const QUESTION_PLACEHOLDER: &str = "Enter your follow-up question here...";

/// What the app is waiting on, if anything
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Activity {
    #[default]
    Idle,
    Analyzing,
    Answering(String),
}

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Current view/screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Main,
    Help,
}

/// Outcomes delivered from background model calls
pub enum AppEvent {
    AnalysisFinished(AnalysisOutcome),
    FollowupFinished(FollowupOutcome),
}

/// What Enter does in the current state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Upload,
    Question,
    Disabled,
}

pub struct App {
    pub controller: SessionController,

    // UI State
    pub view: View,
    pub should_quit: bool,
    pub input: TextArea<'static>,
    /// Most recent notice; each new one replaces it
    pub notice: Option<Notice>,
    pub activity: Activity,
    pub scroll_offset: u16,
    pub max_scroll: u16,
    pub tick: u64,
    stick_to_bottom: bool,

    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(controller: SessionController, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        let mut app = Self {
            controller,
            view: View::Main,
            should_quit: false,
            input: TextArea::default(),
            notice: None,
            activity: Activity::Idle,
            scroll_offset: 0,
            max_scroll: 0,
            tick: 0,
            stick_to_bottom: false,
            event_tx,
        };
        app.reset_input();
        app
    }

    pub fn input_mode(&self) -> InputMode {
        if self.controller.is_busy() {
            return InputMode::Disabled;
        }
        match self.controller.state() {
            SessionState::Empty => InputMode::Upload,
            SessionState::Ready => InputMode::Question,
            SessionState::Analyzing | SessionState::AnalysisFailed | SessionState::Capped => {
                InputMode::Disabled
            }
        }
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            message: message.into(),
        });
    }

    fn notify_error(&mut self, err: &AppError) {
        let level = if err.is_warning() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        self.notify(level, err.to_string());
    }

    fn reset_input(&mut self) {
        let mut input = TextArea::default();
        input.set_cursor_line_style(ratatui::style::Style::default());
        input.set_placeholder_text(match self.input_mode() {
            InputMode::Upload => format!(
                "Path to a {} file...",
                extract::supported_extensions_list()
            ),
            _ => QUESTION_PLACEHOLDER.to_string(),
        });
        self.input = input;
    }

    /// Handle a user action
    pub async fn handle_action(&mut self, action: AppAction) {
        if self.view == View::Help {
            // any key closes the help overlay
            if !matches!(action, AppAction::Tick) {
                self.view = View::Main;
            }
            return;
        }

        match action {
            AppAction::Quit | AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::Submit => self.submit().await,
            AppAction::ToggleHelp => {
                self.view = View::Help;
            }
            AppAction::Escape => {
                self.reset_input();
            }
            AppAction::NewSession => self.new_session(),
            AppAction::RetryAnalysis => self.retry_analysis(),
            AppAction::ScrollUp => {
                self.stick_to_bottom = false;
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            AppAction::ScrollDown => {
                if self.scroll_offset < self.max_scroll {
                    self.scroll_offset += 1;
                }
            }
            AppAction::ScrollPageUp => {
                self.stick_to_bottom = false;
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
            }
            AppAction::ScrollPageDown => {
                self.scroll_offset = (self.scroll_offset + 10).min(self.max_scroll);
            }
            AppAction::ScrollTop => {
                self.stick_to_bottom = false;
                self.scroll_offset = 0;
            }
            AppAction::ScrollBottom => self.scroll_to_bottom(),
            AppAction::Input(key_event) => {
                if self.input_mode() != InputMode::Disabled {
                    self.input.input(key_event);
                }
            }
            AppAction::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
        }
    }

    async fn submit(&mut self) {
        let content = self.input.lines().join("\n");
        let content = content.trim().to_string();

        match self.input_mode() {
            InputMode::Upload => {
                if content.is_empty() {
                    self.notify(NoticeLevel::Warning, "Enter the path of a file to upload.");
                    return;
                }
                self.reset_input();
                self.upload_path(&content).await;
            }
            InputMode::Question => match self.controller.begin_followup(&content) {
                Ok(job) => {
                    self.reset_input();
                    self.spawn_followup(job);
                }
                Err(e) => self.notify_error(&e),
            },
            InputMode::Disabled => match self.controller.state() {
                SessionState::Capped => {
                    self.notify_error(&AppError::FollowupCapReached(MAX_FOLLOWUPS));
                }
                SessionState::AnalysisFailed if !self.controller.is_busy() => self.retry_analysis(),
                _ => self.notify_error(&AppError::Busy),
            },
        }
    }

    /// Read a file from disk and offer it to the session
    pub async fn upload_path(&mut self, raw_path: &str) {
        let path_str = raw_path.trim().trim_matches(|c| c == '"' || c == '\'');
        let path = Path::new(path_str);

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read upload");
                self.notify_error(&AppError::Io(e));
                return;
            }
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path_str)
            .to_string();

        match self.controller.begin_upload(&file_name, &bytes) {
            Ok(Some(job)) => {
                info!(file_name = %file_name, "Upload accepted");
                self.spawn_analysis(job);
            }
            Ok(None) => self.notify(
                NoticeLevel::Info,
                "A document is already loaded. Press Ctrl+N to start a new session.",
            ),
            Err(e @ AppError::Extraction { .. }) => {
                self.notify(NoticeLevel::Error, format!("{} {}", e, AppError::EmptyDocument));
            }
            Err(e) => self.notify_error(&e),
        }
        self.reset_input();
    }

    fn retry_analysis(&mut self) {
        match self.controller.begin_retry_analysis() {
            Ok(job) => self.spawn_analysis(job),
            Err(e) => self.notify_error(&e),
        }
    }

    fn new_session(&mut self) {
        self.controller.reset();
        self.activity = Activity::Idle;
        self.scroll_offset = 0;
        self.reset_input();
        self.notify(NoticeLevel::Info, "Started a new session.");
    }

    fn spawn_analysis(&mut self, job: AnalysisJob) {
        self.activity = Activity::Analyzing;
        self.notify(NoticeLevel::Info, "Analyzing document...");
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = job.run().await;
            tx.send(AppEvent::AnalysisFinished(outcome)).ok();
        });
    }

    fn spawn_followup(&mut self, job: FollowupJob) {
        self.activity = Activity::Answering(job.question().to_string());
        self.notify(NoticeLevel::Info, "Processing your follow-up question...");
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = job.run().await;
            tx.send(AppEvent::FollowupFinished(outcome)).ok();
        });
    }

    /// Fold a background outcome into the session
    ///
    /// Outcomes from a discarded session leave the current activity alone.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AnalysisFinished(outcome) => match self.controller.apply_analysis(outcome) {
                Ok(true) => {
                    self.activity = Activity::Idle;
                    self.notify(NoticeLevel::Info, "Analysis complete.");
                }
                Ok(false) => {
                    debug!("Ignoring analysis result from a previous session");
                    return;
                }
                Err(e) => {
                    self.activity = Activity::Idle;
                    self.notify(
                        NoticeLevel::Error,
                        format!("{} Press Ctrl+R or Enter to retry the analysis.", e),
                    );
                }
            },
            AppEvent::FollowupFinished(outcome) => match self.controller.apply_followup(outcome) {
                Ok(Some(_)) => {
                    self.activity = Activity::Idle;
                    let remaining = self.controller.session().remaining_followups();
                    if remaining == 0 {
                        self.notify_error(&AppError::FollowupCapReached(MAX_FOLLOWUPS));
                    } else {
                        self.notify(
                            NoticeLevel::Info,
                            format!("{} follow-up question(s) remaining.", remaining),
                        );
                    }
                    self.scroll_to_bottom();
                }
                Ok(None) => {
                    debug!("Ignoring follow-up answer from a previous session");
                    return;
                }
                Err(e) => {
                    self.activity = Activity::Idle;
                    self.notify_error(&e);
                }
            },
        }
        self.reset_input();
    }

    fn scroll_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.scroll_offset = self.max_scroll;
    }

    /// Update max scroll based on content
    pub fn update_scroll_bounds(&mut self, content_height: u16, viewport_height: u16) {
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if self.stick_to_bottom || self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }
}
