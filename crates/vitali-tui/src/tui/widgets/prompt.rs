// Prompt overlay: a centered single-line editor.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::tui::{Prompt, PromptField};

const DIALOG_WIDTH: u16 = 60;
const DIALOG_HEIGHT: u16 = 5;

pub fn render(frame: &mut Frame, area: Rect, prompt: &Prompt) {
    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let border = if prompt.invalid { Color::Red } else { Color::Cyan };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", prompt.field.title()),
            Style::default().fg(border).add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(prompt_lines(prompt))
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

/// Input line with a block cursor, plus a context line below it.
pub fn prompt_lines(prompt: &Prompt) -> Vec<Line<'static>> {
    let input = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::DarkGray)),
        Span::styled(prompt.buffer.clone(), Style::default().fg(Color::White)),
        Span::styled("█", Style::default().fg(Color::Gray)),
    ]);
    let context = if prompt.invalid {
        Span::styled(invalid_hint(&prompt.field), Style::default().fg(Color::Red))
    } else if let PromptField::JournalWeight { note } = &prompt.field {
        Span::styled(format!("Note: {note}"), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw("")
    };
    vec![input, Line::from(context)]
}

fn invalid_hint(field: &PromptField) -> &'static str {
    match field {
        PromptField::ExerciseDuration | PromptField::WaterGoal | PromptField::ReminderInterval => {
            "Enter a whole number greater than zero"
        }
        PromptField::JournalWeight { .. } | PromptField::TargetWeight => {
            "Enter a weight in kg, e.g. 72.5"
        }
        _ => "This field can't be empty",
    }
}
