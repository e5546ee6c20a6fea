// Quit confirmation overlay, drawn on top of the main layout when
// `ViewState::confirm_quit` is true.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;

const DIALOG_WIDTH: u16 = 34;
const DIALOG_HEIGHT: u16 = 6;

pub fn render(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " Leaving Vitali ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(dialog_lines())
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

pub fn dialog_lines() -> Vec<Line<'static>> {
    let key = |k: &'static str, color: Color| {
        Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };
    vec![
        Line::from(Span::styled(
            " Today's progress is saved.",
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
        Line::from(vec![
            Span::raw(" Quit now? "),
            key("y", Color::Green),
            Span::raw(" yes / "),
            key("n", Color::Red),
            Span::raw(" stay"),
        ]),
    ]
}
