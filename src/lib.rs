// No More Legalese - plain-language summaries of legal documents

pub mod agents;
pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod session;
pub mod tui;       // Terminal User Interface
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use session::{SessionController, SessionState, MAX_FOLLOWUPS};
