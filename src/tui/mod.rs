//! Terminal User Interface Module
//!
//! Interactive surface for a document session, built with Ratatui.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 ⚖ No More Legalese  llama-3.3-70b               │
//! ├─ Session ───────────────────────────────────────────────────────┤
//! │ ✓ Upload → ✓ Analysis → ● Follow-ups 3/20                       │
//! ├─ Document ──────────────────────────────────────────────────────┤
//! │ Document Analysis Summary:                                      │
//! │   ...                                                           │
//! │ Follow-Up #1: Question / Answer                                 │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ ℹ Processing your follow-up question...                         │
//! ├─ Enter your follow-up question here (17 left) ──────────────────┤
//! │ > What is the termination clause?                               │
//! └─────────────────────────────────────────────────────────────────┘
//!  Ready │ [Enter] Submit [Ctrl+N] New [Ctrl+Q] Quit [F1] Help
//! ```

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, View};
pub use event::{AppAction, EventHandler};

use crate::session::SessionController;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application, optionally uploading `initial_file` first
pub async fn run(controller: SessionController, initial_file: Option<PathBuf>) -> anyhow::Result<()> {
    info!("Starting TUI mode");

    let mut terminal = init_terminal()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut app = App::new(controller, event_tx);
    let mut events = EventHandler::new(std::time::Duration::from_millis(150));

    if let Some(path) = initial_file {
        app.upload_path(&path.display().to_string()).await;
    }

    let result = run_app(&mut terminal, &mut app, &mut events, &mut event_rx).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> anyhow::Result<()> {
    loop {
        let size = terminal.size()?;
        let viewport = ui::document_viewport(Rect::new(0, 0, size.width, size.height));
        let content_height = ui::document_lines(app, viewport.width).len();
        app.update_scroll_bounds(
            u16::try_from(content_height).unwrap_or(u16::MAX),
            viewport.height,
        );

        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            action = events.next() => match action {
                Some(AppAction::Quit) | Some(AppAction::ForceQuit) | None => break,
                Some(action) => app.handle_action(action).await,
            },
            Some(event) = event_rx.recv() => app.handle_event(event),
        }

        if app.should_quit {
            break;
        }
    }

    info!("TUI exited normally");
    Ok(())
}
