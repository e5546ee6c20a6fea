// Workouts tab: fitness level selector and suggested routines.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use vitali_app::protocol::LlmStatus;
use vitali_core::model::Workout;

use super::{clamp_scroll, selector_spans, status_indicator};
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let mut header = vec![Span::styled(" Level: ", Style::default().fg(Color::Gray))];
    header.extend(selector_spans(state.fitness_level.label()));
    let (text, color) = status_indicator(state.workouts_status);
    header.push(Span::styled(format!("  {text}"), Style::default().fg(color)));
    frame.render_widget(
        Paragraph::new(Line::from(header))
            .block(Block::default().borders(Borders::ALL).title("Workouts")),
        rows[0],
    );

    let lines = body_lines(state);
    let visible = usize::from(rows[1].height.saturating_sub(2));
    let scroll = clamp_scroll(state.scroll("workouts"), lines.len(), visible);
    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Routines"))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(body, rows[1]);
}

pub fn body_lines(state: &ViewState) -> Vec<Line<'static>> {
    if !state.workouts.is_empty() {
        return state
            .workouts
            .iter()
            .enumerate()
            .flat_map(|(i, w)| {
                let mut lines = if i > 0 { vec![Line::default()] } else { Vec::new() };
                lines.extend(workout_lines(w));
                lines
            })
            .collect();
    }

    let llm_enabled = state.snapshot.as_ref().is_some_and(|s| s.llm_enabled);
    let (text, color) = if !llm_enabled {
        (
            "AI suggestions are off. Add an API key to credentials.toml.".to_string(),
            Color::DarkGray,
        )
    } else if let Some(err) = &state.workouts_error {
        (err.clone(), Color::Red)
    } else if state.workouts_status == LlmStatus::Streaming {
        ("Putting together your routines...".to_string(), Color::Yellow)
    } else {
        ("No routines yet. Press r to fetch.".to_string(), Color::DarkGray)
    };
    vec![Line::from(Span::styled(format!(" {text}"), Style::default().fg(color)))]
}

pub fn workout_lines(workout: &Workout) -> Vec<Line<'static>> {
    let mut meta = vec![Span::styled(
        format!("   {}", workout.duration),
        Style::default().fg(Color::Gray),
    )];
    if let Some(intensity) = workout.intensity {
        meta.push(Span::styled(
            format!(" | {}", intensity.label()),
            Style::default().fg(Color::Yellow),
        ));
    }

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", workout.title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(meta),
    ];
    if !workout.description.is_empty() {
        lines.push(Line::from(format!("   {}", workout.description)));
    }
    lines.extend(
        workout
            .exercises
            .iter()
            .map(|e| Line::from(format!("   - {e}"))),
    );
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::{snapshot, workout};
    use vitali_core::model::WorkoutIntensity;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn workout_card_lists_exercises() {
        let lines = workout_lines(&workout("Quick Burn"));
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts[0], " Quick Burn");
        assert_eq!(texts[1], "   20 min");
        assert_eq!(texts[2], "   Bodyweight circuit");
        assert_eq!(texts[3], "   - Squats");
        assert_eq!(texts.len(), 5);
    }

    #[test]
    fn intensity_label_shown_when_known() {
        let mut w = workout("Hill Sprints");
        w.intensity = Some(WorkoutIntensity::High);
        let text = line_text(&workout_lines(&w)[1]);
        assert!(text.contains(WorkoutIntensity::High.label()));
    }

    #[test]
    fn cards_separated_by_blank_line() {
        let mut state = ViewState::default();
        state.workouts = vec![workout("A"), workout("B")];
        let lines = body_lines(&state);
        assert_eq!(lines.len(), 11);
        assert_eq!(line_text(&lines[5]), "");
        assert_eq!(line_text(&lines[6]), " B");
    }

    #[test]
    fn placeholder_reflects_state() {
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot());
        assert!(line_text(&body_lines(&state)[0]).contains("Press r"));

        state.workouts_status = LlmStatus::Streaming;
        assert!(line_text(&body_lines(&state)[0]).contains("Putting together"));

        state.workouts_error = Some("Could not load workouts".into());
        assert!(line_text(&body_lines(&state)[0]).contains("Could not load workouts"));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(70, 12);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot());
        state.workouts = vec![workout("A"), workout("B"), workout("C")];
        state.scroll_offset.insert("workouts".into(), 100);
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
