// Status bar widget: user name, date, today's water and calories, AI state.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use vitali_app::protocol::AppSnapshot;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let spans = match &state.snapshot {
        Some(snapshot) => status_spans(snapshot),
        None => vec![Span::styled(" Vitali | loading...", Style::default().fg(Color::Gray))],
    };
    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// " Vitali | Ana | Mon 20 Apr 2026 | Water 1250/2500 ml | 340 kcal | AI: on"
pub fn status_spans(snapshot: &AppSnapshot) -> Vec<Span<'static>> {
    let sep = || Span::styled(" | ", Style::default().fg(Color::Gray));
    let (ai_text, ai_color) = ai_indicator(snapshot.llm_enabled);
    vec![
        Span::styled(
            " Vitali",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(snapshot.profile.name.clone(), Style::default().fg(Color::White)),
        sep(),
        Span::styled(
            snapshot.today.format("%a %d %b %Y").to_string(),
            Style::default().fg(Color::White),
        ),
        sep(),
        Span::styled(
            format!(
                "Water {}/{} ml",
                snapshot.daily_log.water_intake_ml, snapshot.profile.daily_water_goal_ml
            ),
            Style::default().fg(Color::Cyan),
        ),
        sep(),
        Span::styled(
            format!("{} kcal", snapshot.daily_log.calories_burned),
            Style::default().fg(Color::Yellow),
        ),
        sep(),
        Span::styled(ai_text, Style::default().fg(ai_color)),
    ]
}

pub fn ai_indicator(enabled: bool) -> (&'static str, Color) {
    if enabled {
        ("AI: on", Color::Green)
    } else {
        ("AI: off (no API key)", Color::Red)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
