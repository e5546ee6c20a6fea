// Recipes tab: meal selector, suggestion list, and the selected recipe's
// details.
//
// +--------------------------------------------------+
// | Meal: < Lunch >  ready                            |
// +--------------------+-----------------------------+
// | Recipe list        | Details                     |
// +--------------------+-----------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use vitali_app::protocol::LlmStatus;
use vitali_core::model::Recipe;

use super::{selected_style, selector_spans, status_indicator};
use crate::tui::layout::split_columns;
use crate::tui::ViewState;

/// Marker shown before the recipe requested by name.
const CUSTOM_MARKER: &str = "* ";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(area);

    let header = Paragraph::new(header_line(state))
        .block(Block::default().borders(Borders::ALL).title("Recipes"));
    frame.render_widget(header, rows[0]);

    let (left, right) = split_columns(rows[1], 35);

    let list = Paragraph::new(list_lines(state)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Suggestions"),
    );
    frame.render_widget(list, left);

    let details = Paragraph::new(detail_lines(state.selected_recipe()))
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: false });
    frame.render_widget(details, right);
}

pub fn header_line(state: &ViewState) -> Line<'static> {
    let mut spans = vec![Span::styled(" Meal: ", Style::default().fg(Color::Gray))];
    spans.extend(selector_spans(state.meal.label()));
    let (text, color) = status_indicator(state.recipes_status);
    spans.push(Span::styled(format!("  {text}"), Style::default().fg(color)));
    if state.custom_status == LlmStatus::Streaming {
        spans.push(Span::styled(
            "  (custom recipe loading...)",
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

/// Placeholder text when there is nothing to list.
fn empty_message(state: &ViewState) -> (String, Color) {
    let llm_enabled = state.snapshot.as_ref().is_some_and(|s| s.llm_enabled);
    if !llm_enabled {
        return (
            "AI suggestions are off. Add an API key to credentials.toml.".to_string(),
            Color::DarkGray,
        );
    }
    if let Some(err) = state.custom_error.as_ref().or(state.recipes_error.as_ref()) {
        return (err.clone(), Color::Red);
    }
    match state.recipes_status {
        LlmStatus::Streaming => ("Finding recipes...".to_string(), Color::Yellow),
        _ => ("No recipes yet. Press r to fetch.".to_string(), Color::DarkGray),
    }
}

pub fn list_lines(state: &ViewState) -> Vec<Line<'static>> {
    let recipes = state.visible_recipes();
    if recipes.is_empty() {
        let (text, color) = empty_message(state);
        return vec![Line::from(Span::styled(
            format!(" {text}"),
            Style::default().fg(color),
        ))];
    }

    let custom = state.custom_recipe.is_some();
    let mut lines: Vec<Line<'static>> = recipes
        .iter()
        .enumerate()
        .map(|(i, recipe)| {
            let marker = if custom && i == 0 { CUSTOM_MARKER } else { "  " };
            let text = format!("{marker}{}", recipe.name);
            if i == state.selected_recipe {
                Line::from(Span::styled(text, selected_style()))
            } else {
                Line::from(Span::raw(text))
            }
        })
        .collect();

    // A failed custom lookup shouldn't hide the suggestions, but still
    // surface the message.
    if let Some(err) = &state.custom_error {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(" {err}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

pub fn detail_lines(recipe: Option<&Recipe>) -> Vec<Line<'static>> {
    let Some(recipe) = recipe else {
        return vec![Line::from(Span::styled(
            " Select a recipe to see its details",
            Style::default().fg(Color::DarkGray),
        ))];
    };

    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", recipe.name),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(" Calories: ", Style::default().fg(Color::Gray)),
            Span::styled(recipe.calories.clone(), Style::default().fg(Color::Yellow)),
        ]),
        Line::default(),
        Line::from(Span::styled(" Ingredients", heading)),
    ];
    lines.extend(
        recipe
            .ingredients
            .iter()
            .map(|i| Line::from(format!("  - {i}"))),
    );
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(" Instructions", heading)));
    lines.extend(
        recipe
            .instructions
            .iter()
            .enumerate()
            .map(|(n, step)| Line::from(format!("  {}. {step}", n + 1))),
    );
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::{recipe, snapshot};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn state_with_snapshot() -> ViewState {
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot());
        state
    }

    #[test]
    fn custom_recipe_listed_first_and_marked() {
        let mut state = state_with_snapshot();
        state.recipes = vec![recipe("Dal"), recipe("Pilaf")];
        state.custom_recipe = Some(recipe("Lasagna"));

        let lines = list_lines(&state);
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[0]), "* Lasagna");
        assert_eq!(line_text(&lines[1]), "  Dal");
        assert_eq!(lines[0].spans[0].style, selected_style());
    }

    #[test]
    fn selection_highlights_one_row() {
        let mut state = state_with_snapshot();
        state.recipes = vec![recipe("Dal"), recipe("Pilaf")];
        state.selected_recipe = 1;
        let lines = list_lines(&state);
        assert_ne!(lines[0].spans[0].style, selected_style());
        assert_eq!(lines[1].spans[0].style, selected_style());
    }

    #[test]
    fn empty_list_explains_disabled_ai() {
        let mut state = state_with_snapshot();
        if let Some(s) = state.snapshot.as_mut() {
            s.llm_enabled = false;
        }
        let text = line_text(&list_lines(&state)[0]);
        assert!(text.contains("AI suggestions are off"));
    }

    #[test]
    fn empty_list_shows_error() {
        let mut state = state_with_snapshot();
        state.recipes_status = LlmStatus::Error;
        state.recipes_error = Some("Could not load recipes".into());
        let lines = list_lines(&state);
        assert_eq!(line_text(&lines[0]), " Could not load recipes");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn empty_list_while_loading() {
        let mut state = state_with_snapshot();
        state.recipes_status = LlmStatus::Streaming;
        assert!(line_text(&list_lines(&state)[0]).contains("Finding recipes"));
    }

    #[test]
    fn custom_error_shown_below_suggestions() {
        let mut state = state_with_snapshot();
        state.recipes = vec![recipe("Dal")];
        state.custom_error = Some("Recipe not found".into());
        let lines = list_lines(&state);
        assert_eq!(lines.len(), 3);
        assert!(line_text(&lines[2]).contains("Recipe not found"));
    }

    #[test]
    fn details_number_instructions() {
        let r = recipe("Chili");
        let lines = detail_lines(Some(&r));
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts[0], " Chili");
        assert!(texts[1].contains("400 kcal"));
        assert!(texts.contains(&"  - rice".to_string()));
        assert!(texts.contains(&"  2. Add beans".to_string()));
    }

    #[test]
    fn details_placeholder_without_selection() {
        assert_eq!(detail_lines(None).len(), 1);
    }

    #[test]
    fn header_shows_meal_and_status() {
        let mut state = state_with_snapshot();
        state.recipes_status = LlmStatus::Complete;
        let text = line_text(&header_line(&state));
        assert!(text.contains("< Lunch >"));
        assert!(text.contains("ready"));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(90, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = state_with_snapshot();
        state.recipes = vec![recipe("Dal")];
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
