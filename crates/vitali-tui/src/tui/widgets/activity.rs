// Activity tab: activity/intensity selectors with a live calorie estimate,
// and the exercise history.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use vitali_core::activity::estimate_calories;
use vitali_core::model::ExerciseEntry;

use super::{clamp_scroll, selector_spans};
use crate::tui::{PromptField, ViewState, DEFAULT_EXERCISE_MINUTES};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);

    let form = Paragraph::new(form_lines(state)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Log exercise"),
    );
    frame.render_widget(form, rows[0]);

    let exercises = state
        .snapshot
        .as_ref()
        .map(|s| s.exercises.as_slice())
        .unwrap_or_default();
    let lines = history_lines(exercises);
    let visible = usize::from(rows[1].height.saturating_sub(2));
    let scroll = clamp_scroll(state.scroll("activity"), lines.len(), visible);

    let history = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("History ({})", exercises.len())),
        )
        .scroll((scroll, 0));
    frame.render_widget(history, rows[1]);
}

/// Minutes for the live estimate: the duration being typed, if valid.
pub fn estimate_minutes(state: &ViewState) -> u32 {
    state
        .prompt
        .as_ref()
        .filter(|p| p.field == PromptField::ExerciseDuration)
        .and_then(|p| p.buffer.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_EXERCISE_MINUTES)
}

pub fn form_lines(state: &ViewState) -> Vec<Line<'static>> {
    let activity = state.activity_type();
    let minutes = estimate_minutes(state);
    let weight = state
        .snapshot
        .as_ref()
        .map(|s| s.profile.weight_kg)
        .unwrap_or(0.0);
    let kcal = estimate_calories(weight, activity.label(), state.intensity, minutes);

    let mut first = vec![Span::styled(" Activity:  ", Style::default().fg(Color::Gray))];
    first.extend(selector_spans(activity.label()));
    first.push(Span::styled(
        format!("   MET {:.1}", activity.met(state.intensity)),
        Style::default().fg(Color::DarkGray),
    ));

    let mut second = vec![Span::styled(" Intensity: ", Style::default().fg(Color::Gray))];
    second.extend(selector_spans(state.intensity.label()));

    let third = Line::from(vec![
        Span::styled(" Estimate:  ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("~{kcal} kcal"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" for {minutes} min"),
            Style::default().fg(Color::Gray),
        ),
    ]);

    vec![Line::from(first), Line::from(second), third]
}

pub fn history_lines(exercises: &[ExerciseEntry]) -> Vec<Line<'static>> {
    if exercises.is_empty() {
        return vec![Line::from(Span::styled(
            " Nothing logged yet. Press Enter to log your first session.",
            Style::default().fg(Color::DarkGray),
        ))];
    }
    exercises
        .iter()
        .map(|e| {
            Line::from(vec![
                Span::styled(
                    format!(" {} ", e.date.format("%Y-%m-%d")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:<12}", e.kind), Style::default().fg(Color::White)),
                Span::raw(format!("{:>4} min  {:<9}", e.duration_min, e.intensity.label())),
                Span::styled(
                    format!("{:>5} kcal", e.calories_burned),
                    Style::default().fg(Color::Yellow),
                ),
            ])
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
