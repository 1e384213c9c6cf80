//! UI Rendering
//!
//! Pure functions of the application state: nothing here mutates the
//! session. The main loop calls [`render`] after every state change.

use crate::session::{QAPair, SessionState, MAX_FOLLOWUPS};
use crate::extract;
use crate::tui::app::{App, InputMode, NoticeLevel, View};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::rc::Rc;

const FOLLOWUP_PROMPT: &str =
    "Do you have any other questions? Is there anything else I can help you with?";

/// Screen regions: header, progress, document, notice, input, status bar
pub fn layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(4), // Progress
            Constraint::Min(8),    // Document
            Constraint::Length(1), // Notice
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(area)
}

/// Inner area of the scrollable document panel
pub fn document_viewport(area: Rect) -> Rect {
    document_block().inner(layout(area)[2])
}

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = layout(frame.area());
    let session = app.controller.session();

    render_header(frame, chunks[0], app);
    widgets::render_progress(
        frame,
        chunks[1],
        app.controller.state(),
        session.followups().len(),
        &app.activity,
        app.tick,
    );
    render_document(frame, chunks[2], app);
    render_notice(frame, chunks[3], app);
    render_input(frame, chunks[4], app);
    render_status_bar(frame, chunks[5], app);

    if app.view == View::Help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = Line::from(vec![
        Span::raw("⚖ "),
        Span::styled("No More Legalese", Theme::title()),
        Span::styled(format!("  {}", app.controller.model()), Theme::text_dim()),
    ]);

    let header = Paragraph::new(title)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Theme::border()));

    frame.render_widget(header, area);
}

fn document_block() -> Block<'static> {
    Block::default()
        .title(" Document ")
        .borders(Borders::ALL)
        .border_style(Theme::border_focused())
}

fn render_document(frame: &mut Frame, area: Rect, app: &App) {
    let block = document_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = document_lines(app, inner.width);
    let paragraph = Paragraph::new(lines).scroll((app.scroll_offset, 0));
    frame.render_widget(paragraph, inner);
}

/// Every line of the document panel, already wrapped to `width`
pub fn document_lines(app: &App, width: u16) -> Vec<Line<'static>> {
    let session = app.controller.session();
    let width = (width as usize).saturating_sub(2).max(10);
    let mut lines: Vec<Line<'static>> = Vec::new();

    let Some(text) = session.raw_text() else {
        lines.push(Line::from(Span::styled(
            "Upload a PDF, DOC/DOCX, or TXT file for analysis.",
            Theme::text(),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Type the file's path below and press Enter.",
            Theme::text_secondary(),
        )));
        lines.push(Line::from(Span::styled(
            format!("Accepted types: {}", extract::supported_extensions_list()),
            Theme::text_dim(),
        )));
        return lines;
    };

    lines.push(Line::from(vec![
        Span::styled("File: ", Theme::text_secondary()),
        Span::styled(session.file_name().unwrap_or("document").to_string(), Theme::text()),
        Span::styled(
            format!("  ({} characters)", text.chars().count()),
            Theme::text_dim(),
        ),
    ]));
    lines.push(Line::from(""));

    if let Some(summary) = session.summary() {
        lines.push(Line::from(Span::styled("Document Analysis Summary:", Theme::heading())));
        push_wrapped(&mut lines, summary, width, "");
        lines.push(Line::from(""));
    } else if app.controller.state() == SessionState::AnalysisFailed {
        lines.push(Line::from(Span::styled(
            "The analysis did not complete. Press Ctrl+R or Enter to try again.",
            Theme::warning(),
        )));
        lines.push(Line::from(""));
    }

    if !session.followups().is_empty() {
        lines.push(Line::from(Span::styled(
            "Previous Follow-Up Interactions",
            Theme::heading(),
        )));
        lines.push(Line::from(""));
        for (idx, qa) in session.followups().iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("Follow-Up #{}:", idx + 1), Theme::title()),
                Span::styled(format!("  {}", asked_at_label(qa)), Theme::text_dim()),
            ]));
            lines.push(Line::from(Span::styled("Question:", Theme::question_label())));
            push_wrapped(&mut lines, &qa.question, width, "  ");
            lines.push(Line::from(Span::styled("Answer:", Theme::answer_label())));
            push_wrapped(&mut lines, &qa.answer, width, "  ");
            lines.push(Line::from(Span::styled("─".repeat(width.min(40)), Theme::text_dim())));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled("Follow-Up Questions", Theme::heading())));
    push_wrapped(&mut lines, FOLLOWUP_PROMPT, width, "");

    lines
}

fn asked_at_label(qa: &QAPair) -> String {
    qa.asked_at.format("%H:%M:%S UTC").to_string()
}

fn push_wrapped(lines: &mut Vec<Line<'static>>, text: &str, width: usize, indent: &'static str) {
    let max_line_width = width.saturating_sub(indent.len()).max(1);
    for line in text.lines() {
        if line.trim().is_empty() {
            lines.push(Line::from(""));
            continue;
        }
        for chunk in wrap_line(line, max_line_width) {
            lines.push(Line::from(vec![
                Span::raw(indent),
                Span::styled(chunk, Theme::text()),
            ]));
        }
    }
}

/// Break `line` into pieces no wider than `max_width` characters, preferring
/// to break after whitespace or punctuation.
pub fn wrap_line(line: &str, max_width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut remaining = line;

    while !remaining.is_empty() {
        if remaining.chars().count() <= max_width {
            out.push(remaining.to_string());
            break;
        }

        let mut break_byte = None;
        let mut end_byte = remaining.len();
        for (seen, (idx, ch)) in remaining.char_indices().enumerate() {
            if seen >= max_width {
                end_byte = idx;
                break;
            }
            if ch.is_whitespace() || matches!(ch, ',' | '.' | ';') {
                break_byte = Some(idx + ch.len_utf8());
            }
        }

        let split_at = break_byte.unwrap_or(end_byte);
        let (chunk, rest) = remaining.split_at(split_at);
        out.push(chunk.trim_end().to_string());
        remaining = rest.trim_start();
    }

    out
}

fn render_notice(frame: &mut Frame, area: Rect, app: &App) {
    let Some(notice) = app.latest_notice() else {
        return;
    };
    let icon = match notice.level {
        NoticeLevel::Info => Icons::INFO,
        NoticeLevel::Warning => Icons::WARNING,
        NoticeLevel::Error => Icons::ERROR,
    };
    let line = Line::from(Span::styled(
        format!(" {} {}", icon, notice.message),
        Theme::notice(notice.level),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let mode = app.input_mode();
    let state = app.controller.state();

    if state == SessionState::Capped {
        let warning = Paragraph::new(Line::from(Span::styled(
            format!(
                "You have reached the maximum number of follow-up questions ({}).",
                MAX_FOLLOWUPS
            ),
            Theme::warning(),
        )))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(Theme::border()));
        frame.render_widget(warning, area);
        return;
    }

    let title = match mode {
        InputMode::Upload => " Upload file ".to_string(),
        InputMode::Question => format!(
            " Enter your follow-up question here ({} left) ",
            app.controller.session().remaining_followups()
        ),
        InputMode::Disabled => format!(" {} ", state.label()),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if mode == InputMode::Disabled {
            Theme::border()
        } else {
            Theme::border_focused()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = Span::styled(app.controller.state().label(), Theme::text_secondary());

    let shortcuts = vec![
        Span::styled(" [Enter]", Theme::shortcut_key()),
        Span::styled(" Submit ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+N]", Theme::shortcut_key()),
        Span::styled(" New ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+Q]", Theme::shortcut_key()),
        Span::styled(" Quit ", Theme::shortcut_desc()),
        Span::styled("[F1]", Theme::shortcut_key()),
        Span::styled(" Help", Theme::shortcut_desc()),
    ];

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcuts)
            .collect::<Vec<_>>(),
    );

    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let shortcut = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(key, Theme::shortcut_key()),
            Span::styled(desc, Theme::text()),
        ])
    };

    let help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::from(""),
        shortcut("Enter        ", "Upload file / ask follow-up"),
        shortcut("Ctrl+R       ", "Retry a failed analysis"),
        shortcut("Ctrl+N       ", "Start a new session"),
        shortcut("Ctrl+Q       ", "Quit application"),
        shortcut("Ctrl+C       ", "Force quit"),
        shortcut("↑/↓          ", "Scroll document"),
        shortcut("PageUp/Down  ", "Scroll page"),
        shortcut("Ctrl+Home/End", "Jump to top / bottom"),
        shortcut("Esc          ", "Clear input"),
        shortcut("F1 / Ctrl+H  ", "Show this help"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Theme::text_dim())),
    ];

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::StubLLM;
    use crate::session::SessionController;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn app_with(llm: Arc<StubLLM>) -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(SessionController::new(llm, "llama-test"), tx)
    }

    fn text_of(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_wrap_line_prefers_spaces() {
        let wrapped = wrap_line("The Tenant shall pay rent monthly", 12);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(wrapped.join(" "), "The Tenant shall pay rent monthly");
    }

    #[test]
    fn test_wrap_line_hard_breaks_long_words() {
        let wrapped = wrap_line("Indemnificationobligations", 10);
        assert_eq!(wrapped, vec!["Indemnific", "ationoblig", "ations"]);
    }

    #[test]
    fn test_empty_session_prompts_for_upload() {
        let app = app_with(Arc::new(StubLLM::replying("x")));
        let text = text_of(&document_lines(&app, 80));
        assert!(text.contains("Upload a PDF, DOC/DOCX, or TXT file for analysis."));
        assert!(text.contains("Accepted types: .pdf, .doc, .docx, .txt"));
    }

    #[tokio::test]
    async fn test_followups_listed_in_order() {
        let llm = Arc::new(StubLLM::replying("An answer").then(Ok("The summary")));
        let mut app = app_with(llm);
        app.controller.upload("contract.txt", b"This Agreement ...").await.unwrap();
        app.controller.ask("First?").await.unwrap();
        app.controller.ask("Second?").await.unwrap();

        let text = text_of(&document_lines(&app, 80));

        assert!(text.contains("Document Analysis Summary:"));
        assert!(text.contains("The summary"));
        let first = text.find("Follow-Up #1:").unwrap();
        let second = text.find("Follow-Up #2:").unwrap();
        assert!(first < second);
        let followups = app.controller.session().followups();
        assert!(followups[0].asked_at <= followups[1].asked_at);
        assert!(text.contains(&asked_at_label(&followups[0])));
        assert!(text.contains(FOLLOWUP_PROMPT));
    }

    #[tokio::test]
    async fn test_render_capped_session() {
        let mut app = app_with(Arc::new(StubLLM::replying("ok")));
        app.controller.upload("contract.txt", b"This Agreement ...").await.unwrap();
        for i in 0..MAX_FOLLOWUPS {
            app.controller.ask(&format!("Q{}?", i)).await.unwrap();
        }

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let screen: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("maximum number of follow-up questions"));
    }
}
