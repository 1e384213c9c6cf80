//! Command-line interface
//!
//! `legalese` with no subcommand opens the TUI. `legalese analyze` runs the
//! same session flow headless and prints to stdout.

use crate::config::Overrides;
use crate::session::{SessionController, UploadOutcome};
use crate::types::{AppError, AppResult};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "legalese",
    version,
    about = "Summarize legal documents and ask follow-up questions about them"
)]
pub struct Cli {
    /// LLM provider (groq or openai); overrides LLM_PROVIDER
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model name; overrides LLM_MODEL
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open the interactive terminal UI (default)
    Tui {
        /// Document to upload on startup
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Summarize a document and answer questions without the UI
    Analyze {
        /// PDF, DOC, DOCX or TXT file
        file: PathBuf,

        /// Follow-up question; repeat for several
        #[arg(short = 'q', long = "question")]
        questions: Vec<String>,
    },
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            provider: self.provider.clone(),
            model: self.model.clone(),
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Tui { file: None })
    }
}

/// Upload `path`, print the summary, then ask each question in order.
///
/// Upload and analysis failures end the run. A failed question is reported
/// and the remaining questions are still asked.
pub async fn run_analyze<W: Write>(
    controller: &mut SessionController,
    path: &Path,
    questions: &[String],
    out: &mut W,
) -> AppResult<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let bytes = tokio::fs::read(path).await?;

    info!(file = %file_name, bytes = bytes.len(), "Analyzing document");
    if let UploadOutcome::Accepted { text_len } = controller.upload(&file_name, &bytes).await? {
        info!(text_len, "Analysis complete");
    }

    let summary = controller.session().summary().unwrap_or_default();
    writeln!(out, "Document Analysis Summary:\n\n{}\n", summary.trim())?;

    for question in questions {
        match controller.ask(question).await {
            Ok(pair) => {
                let n = controller.session().followups().len();
                writeln!(out, "Follow-Up #{}:", n)?;
                writeln!(out, "Question: {}", pair.question)?;
                writeln!(out, "Answer: {}\n", pair.answer.trim())?;
            }
            Err(e) if e.is_warning() => writeln!(out, "Warning: {}\n", e)?,
            Err(e @ AppError::LLMApi(_)) => writeln!(out, "Error: {}\n", e)?,
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
