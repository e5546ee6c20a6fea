// TUI widget modules, one per tab plus the shared chrome and overlays.

pub mod activity;
pub mod dashboard;
pub mod help_bar;
pub mod journal;
pub mod notification;
pub mod prompt;
pub mod quit_confirm;
pub mod recipes;
pub mod shopping;
pub mod status_bar;
pub mod tab_bar;
pub mod workouts;

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use vitali_app::protocol::LlmStatus;

/// Status text and color for an LLM request.
pub fn status_indicator(status: LlmStatus) -> (&'static str, Color) {
    match status {
        LlmStatus::Idle => ("idle", Color::DarkGray),
        LlmStatus::Streaming => ("loading...", Color::Yellow),
        LlmStatus::Complete => ("ready", Color::Green),
        LlmStatus::Error => ("error", Color::Red),
    }
}

/// Style for the highlighted row of a list.
pub fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// `< label >` selector spans for a Left/Right choice.
pub fn selector_spans(label: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled("< ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            label.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" >", Style::default().fg(Color::DarkGray)),
    ]
}

/// Compute a centered rectangle of the given size within `area`, clamped to
/// the available space.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

/// Clamp a scroll offset so the last line stays on screen.
pub fn clamp_scroll(offset: usize, total_lines: usize, visible_rows: usize) -> u16 {
    let max_offset = total_lines.saturating_sub(visible_rows);
    offset.min(max_offset).min(u16::MAX as usize) as u16
}
