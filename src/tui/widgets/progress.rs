//! Progress Widget
//!
//! Shows where the session is: Upload → Analysis → Follow-ups (n/20).

use crate::session::{SessionState, MAX_FOLLOWUPS};
use crate::tui::app::Activity;
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub fn render_progress(
    frame: &mut Frame,
    area: Rect,
    state: SessionState,
    followups: usize,
    activity: &Activity,
    tick: u64,
) {
    let block = Block::default()
        .title(" Session ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from(build_progress_line(state, followups))];

    let detail = match activity {
        Activity::Idle => None,
        Activity::Analyzing => Some("Analyzing document...".to_string()),
        Activity::Answering(question) => Some(format!(
            "Answering: {}",
            truncate_string(question, (inner.width as usize).saturating_sub(16))
        )),
    };
    if let Some(detail) = detail {
        let frame_idx = (tick as usize) % SPINNER.len();
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", SPINNER[frame_idx]), Theme::active()),
            Span::styled(detail, Theme::text_secondary()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn build_progress_line(state: SessionState, followups: usize) -> Vec<Span<'static>> {
    let followup_label = format!("Follow-ups {}/{}", followups, MAX_FOLLOWUPS);
    let stages = [
        ("Upload".to_string(), StageState::upload(state)),
        ("Analysis".to_string(), StageState::analysis(state)),
        (followup_label, StageState::followups(state)),
    ];

    let mut spans = Vec::new();
    for (i, (name, stage)) in stages.into_iter().enumerate() {
        let (icon, style) = match stage {
            StageState::Complete => (Icons::COMPLETE, Theme::complete()),
            StageState::Active => (Icons::ACTIVE, Theme::active()),
            StageState::Pending => (Icons::PENDING, Theme::pending()),
            StageState::Error => (Icons::ERROR, Theme::error()),
        };

        spans.push(Span::styled(format!("{} ", icon), style));
        spans.push(Span::styled(name, style));

        if i < 2 {
            spans.push(Span::styled(format!(" {} ", Icons::ARROW), Theme::text_dim()));
        }
    }
    spans
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StageState {
    Pending,
    Active,
    Complete,
    Error,
}

impl StageState {
    fn upload(state: SessionState) -> Self {
        match state {
            SessionState::Empty => StageState::Active,
            _ => StageState::Complete,
        }
    }

    fn analysis(state: SessionState) -> Self {
        match state {
            SessionState::Empty => StageState::Pending,
            SessionState::Analyzing => StageState::Active,
            SessionState::AnalysisFailed => StageState::Error,
            SessionState::Ready | SessionState::Capped => StageState::Complete,
        }
    }

    fn followups(state: SessionState) -> Self {
        match state {
            SessionState::Ready => StageState::Active,
            SessionState::Capped => StageState::Complete,
            _ => StageState::Pending,
        }
    }
}

/// Truncate to `max_width` characters, with an ellipsis when cut
fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_width).collect()
    }
}
