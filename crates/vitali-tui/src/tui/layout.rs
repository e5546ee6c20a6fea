// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// | Tab Bar (1 row)                                   |
// +--------------------------------------------------+
// | Main Panel (active tab)                           |
// |                                                   |
// +--------------------------------------------------+
// | Notification (1 row)                              |
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Name, date, today's water and calories.
    pub status_bar: Rect,
    pub tab_bar: Rect,
    /// Content of the active tab.
    pub main_panel: Rect,
    /// Transient message line (success, water reminder, error).
    pub notification: Rect,
    /// Keyboard shortcut hints for the active tab.
    pub help_bar: Rect,
}

/// Build the layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(1), // tab bar
            Constraint::Min(5),    // main panel
            Constraint::Length(1), // notification
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        tab_bar: vertical[1],
        main_panel: vertical[2],
        notification: vertical[3],
        help_bar: vertical[4],
    }
}

/// Split a panel into a left and right column by percentage.
pub fn split_columns(area: Rect, left_percent: u16) -> (Rect, Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_percent),
            Constraint::Percentage(100 - left_percent.min(100)),
        ])
        .split(area);
    (cols[0], cols[1])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
