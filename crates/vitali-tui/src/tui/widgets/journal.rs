// Journal tab: mood selector for the next entry and the entry history.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use vitali_core::model::{JournalEntry, Mood};

use super::{clamp_scroll, selector_spans};
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let mut header = vec![Span::styled(" Mood: ", Style::default().fg(Color::Gray))];
    header.extend(selector_spans(state.mood.label()));
    frame.render_widget(
        Paragraph::new(Line::from(header))
            .block(Block::default().borders(Borders::ALL).title("New entry")),
        rows[0],
    );

    let entries = state
        .snapshot
        .as_ref()
        .map(|s| s.journal.as_slice())
        .unwrap_or_default();
    let lines = entry_lines(entries);
    let visible = usize::from(rows[1].height.saturating_sub(2));
    let scroll = clamp_scroll(state.scroll("journal"), lines.len(), visible);

    let body = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Entries ({})", entries.len())),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(body, rows[1]);
}

fn mood_color(mood: Mood) -> Color {
    match mood {
        Mood::Happy => Color::Green,
        Mood::Determined => Color::Cyan,
        Mood::Tired => Color::Yellow,
        Mood::Discouraged => Color::Magenta,
    }
}

pub fn entry_lines(entries: &[JournalEntry]) -> Vec<Line<'static>> {
    if entries.is_empty() {
        return vec![Line::from(Span::styled(
            " No entries yet. Press n to write one.",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let mut lines = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        let mut head = vec![
            Span::styled(
                format!(" {} ", entry.date.format("%a %d %b %Y")),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                entry.mood.label().to_string(),
                Style::default().fg(mood_color(entry.mood)),
            ),
        ];
        if let Some(kg) = entry.weight_kg {
            head.push(Span::styled(
                format!("  {kg:.1} kg"),
                Style::default().fg(Color::Gray),
            ));
        }
        lines.push(Line::from(head));
        lines.push(Line::from(format!("   {}", entry.note)));
    }
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::{date, snapshot};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn entry_shows_date_mood_and_weight() {
        let lines = entry_lines(&snapshot().journal);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            line_text(&lines[0]),
            format!(" Mon 20 Apr 2026 {}  84.5 kg", Mood::Determined.label())
        );
        assert_eq!(line_text(&lines[1]), "   Good start");
    }

    #[test]
    fn weight_omitted_when_absent() {
        let entry = JournalEntry {
            id: 2,
            date: date(),
            note: "Rest day".into(),
            weight_kg: None,
            mood: Mood::Tired,
        };
        let lines = entry_lines(&[entry.clone(), entry]);
        assert_eq!(lines.len(), 5);
        assert!(!line_text(&lines[0]).contains("kg"));
        assert_eq!(line_text(&lines[2]), "");
    }

    #[test]
    fn empty_journal_placeholder() {
        assert!(line_text(&entry_lines(&[])[0]).contains("Press n"));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(60, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot());
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
