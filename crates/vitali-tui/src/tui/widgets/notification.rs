// Notification line: the current transient message, colored by kind.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use vitali_app::protocol::{Notification, NotificationKind};

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match &state.notification {
        Some(notification) => notification_line(notification),
        None => Line::default(),
    };
    frame.render_widget(Paragraph::new(line), area);
}

pub fn notification_line(notification: &Notification) -> Line<'static> {
    let (icon, color) = kind_style(notification.kind);
    Line::from(vec![
        Span::styled(
            format!(" {icon} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(notification.message.clone(), Style::default().fg(color)),
        Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
    ])
}

fn kind_style(kind: NotificationKind) -> (&'static str, Color) {
    match kind {
        NotificationKind::Success => ("✔", Color::Green),
        NotificationKind::Water => ("💧", Color::Cyan),
        NotificationKind::Error => ("✖", Color::Red),
    }
}
