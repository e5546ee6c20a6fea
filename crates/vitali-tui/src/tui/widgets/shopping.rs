// Shopping tab: completion gauge and the list grouped by recipe.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use vitali_core::model::ShoppingItem;
use vitali_core::stats;

use super::{clamp_scroll, selected_style};
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let items = state
        .snapshot
        .as_ref()
        .map(|s| s.shopping.as_slice())
        .unwrap_or_default();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let done = items.iter().filter(|i| i.completed).count();
    let percent = stats::shopping_progress(items);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .percent(percent.round() as u16)
        .label(format!("{done} / {} items", items.len()));
    frame.render_widget(gauge, rows[0]);

    let (lines, selected_line) = list_lines(items, state.selected_shopping);
    let visible = usize::from(rows[1].height.saturating_sub(2));
    // Keep the selected row on screen.
    let offset = selected_line
        .map(|l| l.saturating_sub(visible.saturating_sub(1)))
        .unwrap_or(0);
    let scroll = clamp_scroll(offset, lines.len(), visible);

    let list = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Shopping list"),
        )
        .scroll((scroll, 0));
    frame.render_widget(list, rows[1]);
}

/// Grouped list lines plus the line index of the selected item.
///
/// `selected` indexes items in grouped display order, matching
/// `ViewState::shopping_order`.
pub fn list_lines(items: &[ShoppingItem], selected: usize) -> (Vec<Line<'static>>, Option<usize>) {
    if items.is_empty() {
        let line = Line::from(Span::styled(
            " Your list is empty. Add ingredients from the Recipes tab.",
            Style::default().fg(Color::DarkGray),
        ));
        return (vec![line], None);
    }

    let mut lines = Vec::new();
    let mut selected_line = None;
    let mut index = 0;
    for (group, members) in stats::group_shopping_items(items) {
        lines.push(Line::from(Span::styled(
            format!(" {group}"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for item in members {
            let checkbox = if item.completed { "[x]" } else { "[ ]" };
            let text = format!("   {checkbox} {}", item.name);
            let style = if index == selected {
                selected_line = Some(lines.len());
                selected_style()
            } else if item.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(text, style)));
            index += 1;
        }
    }
    (lines, selected_line)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
