// Dashboard tab: water progress, motivation, weekly summary, weight trend,
// recent activity, and profile settings.
//
// +---------------------------+------------------------+
// | Water today (gauge)       | Weight trend           |
// | Motivation                | Recent activity        |
// | This week                 | Profile                |
// +---------------------------+------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Sparkline, Wrap};
use ratatui::Frame;

use vitali_app::protocol::{AppSnapshot, LlmStatus};
use vitali_core::model::ExerciseEntry;
use vitali_core::stats;

use super::status_indicator;
use crate::tui::layout::split_columns;
use crate::tui::ViewState;

/// Activities listed under "Recent activity".
pub const RECENT_ACTIVITY_COUNT: usize = 3;

/// Sparkline resolution: one bar step per 0.1 kg.
const TREND_STEPS_PER_KG: f64 = 10.0;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = &state.snapshot else {
        let paragraph = Paragraph::new("Loading your data...")
            .block(Block::default().borders(Borders::ALL).title("Dashboard"));
        frame.render_widget(paragraph, area);
        return;
    };

    let (left, right) = split_columns(area, 55);

    let left_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(4),
        ])
        .split(left);

    let right_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(RECENT_ACTIVITY_COUNT as u16 + 2),
            Constraint::Min(4),
        ])
        .split(right);

    render_water(frame, left_rows[0], snapshot);
    render_motivation(frame, left_rows[1], state);
    render_block(frame, left_rows[2], "This week", weekly_lines(snapshot));
    render_weight_trend(frame, right_rows[0], &snapshot.weight_history);
    render_block(
        frame,
        right_rows[1],
        "Recent activity",
        recent_activity_lines(&snapshot.exercises),
    );
    render_block(frame, right_rows[2], "Profile", profile_lines(snapshot));
}

fn render_block(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_water(frame: &mut Frame, area: Rect, snapshot: &AppSnapshot) {
    let intake = snapshot.daily_log.water_intake_ml;
    let goal = snapshot.profile.daily_water_goal_ml;
    let percent = stats::water_progress(intake, goal);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Water today"))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .percent(percent.round() as u16)
        .label(format!("{intake} / {goal} ml ({percent:.0}%)"));
    frame.render_widget(gauge, area);
}

fn render_motivation(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (status_text, status_color) = status_indicator(state.motivation_status);
    let title = Line::from(vec![
        Span::styled("Motivation", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(" -- ", Style::default().fg(Color::DarkGray)),
        Span::styled(status_text, Style::default().fg(status_color)),
    ]);

    let text = if state.motivation_text.is_empty() {
        match state.motivation_status {
            LlmStatus::Streaming => "Thinking of something inspiring...".to_string(),
            _ => "Press m for a motivational quote.".to_string(),
        }
    } else {
        format!("\"{}\"", state.motivation_text.trim())
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn label_value(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {label:<18}"), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

pub fn weekly_lines(snapshot: &AppSnapshot) -> Vec<Line<'static>> {
    let w = &snapshot.weekly;
    let weigh_ins = match w.weigh_ins {
        0 => "no weigh-ins".to_string(),
        1 => "1 weigh-in".to_string(),
        n => format!("{n} weigh-ins"),
    };
    vec![
        label_value(
            "Water:",
            format!("{:.1} L", w.water_total_ml as f64 / 1000.0),
            Color::Cyan,
        ),
        label_value("Calories burned:", format!("{} kcal", w.calories_burned), Color::Yellow),
        label_value(
            "Average weight:",
            format!("{:.1} kg ({weigh_ins})", w.average_weight_kg),
            Color::White,
        ),
        label_value(
            "To goal:",
            format!("{:.1} kg", stats::weight_to_goal(&snapshot.profile)),
            Color::Green,
        ),
    ]
}

pub fn recent_activity_lines(exercises: &[ExerciseEntry]) -> Vec<Line<'static>> {
    if exercises.is_empty() {
        return vec![Line::from(Span::styled(
            " No activity logged yet",
            Style::default().fg(Color::DarkGray),
        ))];
    }
    exercises
        .iter()
        .take(RECENT_ACTIVITY_COUNT)
        .map(|e| {
            Line::from(vec![
                Span::styled(
                    format!(" {} ", e.date.format("%d %b")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(e.kind.clone(), Style::default().fg(Color::White)),
                Span::raw(format!(" {} min", e.duration_min)),
                Span::styled(
                    format!("  {} kcal", e.calories_burned),
                    Style::default().fg(Color::Yellow),
                ),
            ])
        })
        .collect()
}

fn render_weight_trend(frame: &mut Frame, area: Rect, history: &[(chrono::NaiveDate, f64)]) {
    let block = Block::default().borders(Borders::ALL).title("Weight trend");
    let Some((_, last)) = history.last() else {
        let placeholder = Paragraph::new(Span::styled(
            " Log a weight in the journal to see your trend",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block)
        .wrap(Wrap { trim: false });
        frame.render_widget(placeholder, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let sparkline = Sparkline::default()
        .data(trend_data(history, usize::from(rows[0].width)))
        .style(Style::default().fg(Color::Green));
    frame.render_widget(sparkline, rows[0]);

    let latest = Paragraph::new(Span::styled(
        format!(" Latest: {last:.1} kg"),
        Style::default().fg(Color::Gray),
    ));
    frame.render_widget(latest, rows[1]);
}

/// Bar heights for the most recent `width` weigh-ins, relative to the
/// lightest one. The lightest gets a height of 1 so it stays visible.
pub fn trend_data(history: &[(chrono::NaiveDate, f64)], width: usize) -> Vec<u64> {
    let start = history.len().saturating_sub(width);
    let weights: Vec<f64> = history[start..].iter().map(|(_, w)| *w).collect();
    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    weights
        .iter()
        .map(|w| ((w - min) * TREND_STEPS_PER_KG).round() as u64 + 1)
        .collect()
}

pub fn profile_lines(snapshot: &AppSnapshot) -> Vec<Line<'static>> {
    let p = &snapshot.profile;
    let or_none = |s: &str| {
        if s.trim().is_empty() {
            "none".to_string()
        } else {
            s.trim().to_string()
        }
    };
    let reminders = if p.water_reminders_enabled {
        format!("every {} min", p.water_reminder_interval_min)
    } else {
        "off".to_string()
    };
    vec![
        label_value(
            "Weight:",
            format!("{:.1} kg -> {:.1} kg", p.weight_kg, p.target_weight_kg),
            Color::White,
        ),
        label_value("Water goal:", format!("{} ml", p.daily_water_goal_ml), Color::Cyan),
        label_value("Reminders:", reminders, Color::Cyan),
        label_value("Preferences:", or_none(&p.dietary_preferences), Color::White),
        label_value("Restrictions:", or_none(&p.dietary_restrictions), Color::White),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::snapshot;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn points(weights: &[f64]) -> Vec<(chrono::NaiveDate, f64)> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| (crate::tui::test_support::date() + chrono::Duration::days(i as i64), *w))
            .collect()
    }

    #[test]
    fn trend_data_scales_from_lightest() {
        assert_eq!(trend_data(&points(&[80.0, 82.0, 84.0]), 10), vec![1, 21, 41]);
        assert_eq!(trend_data(&points(&[70.0, 70.0]), 10), vec![1, 1]);
        assert!(trend_data(&[], 10).is_empty());
    }

    #[test]
    fn trend_data_keeps_most_recent_points() {
        assert_eq!(trend_data(&points(&[90.0, 85.0, 84.5, 84.0]), 2), vec![6, 1]);
    }

    fn rendered_trend(history: &[(chrono::NaiveDate, f64)]) -> String {
        let backend = ratatui::backend::TestBackend::new(60, 4);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_weight_trend(frame, frame.area(), history))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn weight_trend_draws_bars() {
        let screen = rendered_trend(&points(&[86.0, 85.0, 84.5]));
        assert!(screen.contains('█'));
        assert!(screen.contains("Latest: 84.5 kg"));
    }

    #[test]
    fn weight_trend_placeholder_without_history() {
        let screen = rendered_trend(&[]);
        assert!(screen.contains("Log a weight"));
        assert!(!screen.contains('█'));
    }

    #[test]
    fn weekly_lines_format_totals() {
        let lines = weekly_lines(&snapshot());
        assert_eq!(line_text(&lines[0]), format!(" {:<18}5.0 L", "Water:"));
        assert!(line_text(&lines[2]).contains("84.5 kg (1 weigh-in)"));
        // Default profile: 85 kg current, 75 kg target.
        assert!(line_text(&lines[3]).contains("10.0 kg"));
    }

    #[test]
    fn recent_activity_limited_to_three() {
        let mut snap = snapshot();
        let first = snap.exercises[0].clone();
        for id in 2..=5 {
            snap.exercises.push(ExerciseEntry { id, ..first.clone() });
        }
        assert_eq!(recent_activity_lines(&snap.exercises).len(), RECENT_ACTIVITY_COUNT);
        assert_eq!(recent_activity_lines(&[]).len(), 1);
    }

    #[test]
    fn profile_lines_show_reminder_state() {
        let mut snap = snapshot();
        assert!(line_text(&profile_lines(&snap)[2]).contains("off"));
        snap.profile.water_reminders_enabled = true;
        assert!(line_text(&profile_lines(&snap)[2]).contains("every 60 min"));
        assert!(line_text(&profile_lines(&snap)[3]).contains("none"));
    }

    #[test]
    fn render_with_snapshot() {
        let backend = ratatui::backend::TestBackend::new(100, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot());
        state.motivation_status = LlmStatus::Streaming;
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
