// Help bar: keyboard hints for the current mode and tab.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use vitali_app::protocol::TabId;

use crate::tui::ViewState;

const GLOBAL_HINTS: &str = "Tab/1-6:Tabs | q:Quit";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = format!(" {}", help_text(state));
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn help_text(state: &ViewState) -> String {
    if state.confirm_quit {
        return "y:Quit | n/Esc:Cancel".to_string();
    }
    if state.prompt.is_some() {
        return "Enter:Submit | Esc:Cancel | Backspace:Delete".to_string();
    }
    let tab_hints = match state.active_tab {
        TabId::Dashboard => {
            "a/s/d:+100/250/500ml | m:Motivate | p/o:Diet | g:Goal | t:Target | n:Reminders | i:Interval"
        }
        TabId::Activity => "←/→:Activity | i:Intensity | Enter:Log | ↑/↓:Scroll",
        TabId::Recipes => "←/→:Meal | r:Refresh | c:Custom | ↑/↓:Select | a:Add to list",
        TabId::Shopping => "↑/↓:Select | Space:Toggle | x:Remove | C:Clear",
        TabId::Workouts => "←/→:Level | r:Refresh | ↑/↓:Scroll",
        TabId::Journal => "←/→:Mood | n:New entry | ↑/↓:Scroll",
    };
    format!("{tab_hints} | {GLOBAL_HINTS}")
}
