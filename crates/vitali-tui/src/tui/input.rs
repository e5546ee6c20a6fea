// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (selection, scroll,
// prompt editing).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use vitali_app::protocol::{TabId, UserCommand};
use vitali_core::activity::{ACTIVITY_TYPES, MAX_DURATION_MIN};
use vitali_core::model::{FitnessLevel, MealType, Mood, ProfileUpdate};

use super::{Prompt, PromptField, ViewState};

/// Water amounts for the `a`/`s`/`d` shortcuts.
pub const WATER_SHORTCUTS: [(char, u32); 3] = [('a', 100), ('s', 250), ('d', 500)];

/// Lines moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator. Returns `None` when it was handled locally by mutating
/// `ViewState`.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if view_state.prompt.is_some() {
        return handle_prompt(key_event, view_state);
    }

    // Global keys
    match key_event.code {
        KeyCode::Tab => {
            let next = view_state.active_tab.next();
            return switch_tab(view_state, next);
        }
        KeyCode::BackTab => {
            let prev = view_state.active_tab.prev();
            return switch_tab(view_state, prev);
        }
        KeyCode::Char(c @ '1'..='6') => {
            let idx = c as usize - '1' as usize;
            return TabId::from_index(idx).and_then(|tab| switch_tab(view_state, tab));
        }
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            return None;
        }
        KeyCode::Esc => {
            return view_state
                .notification
                .is_some()
                .then_some(UserCommand::DismissNotification);
        }
        _ => {}
    }

    match view_state.active_tab {
        TabId::Dashboard => handle_dashboard(key_event, view_state),
        TabId::Activity => handle_activity(key_event, view_state),
        TabId::Recipes => handle_recipes(key_event, view_state),
        TabId::Shopping => handle_shopping(key_event, view_state),
        TabId::Workouts => handle_workouts(key_event, view_state),
        TabId::Journal => handle_journal(key_event, view_state),
    }
}

fn switch_tab(view_state: &mut ViewState, tab: TabId) -> Option<UserCommand> {
    if view_state.active_tab == tab {
        return None;
    }
    view_state.active_tab = tab;
    Some(UserCommand::SwitchTab(tab))
}

/// Handle key events while in quit confirmation mode.
///
/// - `y` or `q` confirms quit
/// - `n` or `Esc` cancels
/// - All other keys are blocked
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Prompt editing
// ---------------------------------------------------------------------------

fn open_prompt(view_state: &mut ViewState, field: PromptField, initial: impl Into<String>) {
    view_state.prompt = Some(Prompt::new(field, initial));
}

/// Handle key events while a prompt is open.
///
/// - Printable characters are appended
/// - Backspace removes the last character
/// - Enter submits, Esc cancels
fn handle_prompt(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.prompt = None;
            None
        }
        KeyCode::Enter => submit_prompt(view_state),
        KeyCode::Backspace => {
            if let Some(prompt) = view_state.prompt.as_mut() {
                prompt.buffer.pop();
                prompt.invalid = false;
            }
            None
        }
        KeyCode::Char(c) => {
            if let Some(prompt) = view_state.prompt.as_mut() {
                prompt.buffer.push(c);
                prompt.invalid = false;
            }
            None
        }
        _ => None,
    }
}

enum Submit {
    Command(UserCommand),
    Next(Prompt),
    Invalid,
}

/// Submit the open prompt. Invalid input keeps the prompt open and flags it.
fn submit_prompt(view_state: &mut ViewState) -> Option<UserCommand> {
    let prompt = view_state.prompt.take()?;
    let text = prompt.buffer.trim();

    let outcome = match &prompt.field {
        PromptField::ExerciseDuration => match parse_positive_u32(text).filter(|m| *m <= MAX_DURATION_MIN) {
            Some(duration_min) => Submit::Command(UserCommand::LogExercise {
                kind: view_state.activity_type().label().to_string(),
                duration_min,
                intensity: view_state.intensity,
            }),
            None => Submit::Invalid,
        },
        PromptField::CustomRecipe => {
            if text.is_empty() {
                Submit::Invalid
            } else {
                Submit::Command(UserCommand::RequestCustomRecipe(text.to_string()))
            }
        }
        PromptField::JournalNote => {
            if text.is_empty() {
                Submit::Invalid
            } else {
                let weight = view_state
                    .snapshot
                    .as_ref()
                    .map(|s| format!("{:.1}", s.profile.weight_kg))
                    .unwrap_or_default();
                Submit::Next(Prompt::new(
                    PromptField::JournalWeight {
                        note: text.to_string(),
                    },
                    weight,
                ))
            }
        }
        PromptField::JournalWeight { note } => {
            let weight = if text.is_empty() {
                Some(None)
            } else {
                parse_kg(text).map(Some)
            };
            match weight {
                Some(weight_kg) => Submit::Command(UserCommand::AddJournalEntry {
                    note: note.clone(),
                    weight_kg,
                    mood: view_state.mood,
                }),
                None => Submit::Invalid,
            }
        }
        PromptField::DietaryPreferences => profile_update(ProfileUpdate {
            dietary_preferences: Some(text.to_string()),
            ..Default::default()
        }),
        PromptField::DietaryRestrictions => profile_update(ProfileUpdate {
            dietary_restrictions: Some(text.to_string()),
            ..Default::default()
        }),
        PromptField::WaterGoal => match parse_positive_u32(text) {
            Some(ml) => profile_update(ProfileUpdate {
                daily_water_goal_ml: Some(ml),
                ..Default::default()
            }),
            None => Submit::Invalid,
        },
        PromptField::TargetWeight => match parse_kg(text) {
            Some(kg) => profile_update(ProfileUpdate {
                target_weight_kg: Some(kg),
                ..Default::default()
            }),
            None => Submit::Invalid,
        },
        PromptField::ReminderInterval => match parse_positive_u32(text) {
            Some(min) => profile_update(ProfileUpdate {
                water_reminder_interval_min: Some(min),
                ..Default::default()
            }),
            None => Submit::Invalid,
        },
    };

    match outcome {
        Submit::Command(cmd) => Some(cmd),
        Submit::Next(next) => {
            view_state.prompt = Some(next);
            None
        }
        Submit::Invalid => {
            view_state.prompt = Some(Prompt {
                invalid: true,
                ..prompt
            });
            None
        }
    }
}

fn profile_update(update: ProfileUpdate) -> Submit {
    Submit::Command(UserCommand::UpdateProfile(update))
}

fn parse_positive_u32(text: &str) -> Option<u32> {
    text.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Parse a weight in kg. Accepts a decimal comma.
fn parse_kg(text: &str) -> Option<f64> {
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|kg| kg.is_finite() && *kg > 0.0)
}

// ---------------------------------------------------------------------------
// Per-tab keys
// ---------------------------------------------------------------------------

fn handle_dashboard(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    if let KeyCode::Char(c) = key_event.code {
        if let Some((_, ml)) = WATER_SHORTCUTS.iter().find(|(k, _)| *k == c) {
            return Some(UserCommand::AddWater(*ml));
        }
    }

    let profile = view_state.snapshot.as_ref().map(|s| s.profile.clone());

    match key_event.code {
        KeyCode::Char('m') => Some(UserCommand::RefreshMotivation),
        KeyCode::Char('p') => {
            let current = profile.map(|p| p.dietary_preferences).unwrap_or_default();
            open_prompt(view_state, PromptField::DietaryPreferences, current);
            None
        }
        KeyCode::Char('o') => {
            let current = profile.map(|p| p.dietary_restrictions).unwrap_or_default();
            open_prompt(view_state, PromptField::DietaryRestrictions, current);
            None
        }
        KeyCode::Char('g') => {
            let current = profile
                .map(|p| p.daily_water_goal_ml.to_string())
                .unwrap_or_default();
            open_prompt(view_state, PromptField::WaterGoal, current);
            None
        }
        KeyCode::Char('t') => {
            let current = profile
                .map(|p| format!("{:.1}", p.target_weight_kg))
                .unwrap_or_default();
            open_prompt(view_state, PromptField::TargetWeight, current);
            None
        }
        KeyCode::Char('n') => profile.map(|p| {
            UserCommand::UpdateProfile(ProfileUpdate {
                water_reminders_enabled: Some(!p.water_reminders_enabled),
                ..Default::default()
            })
        }),
        KeyCode::Char('i') => {
            let current = profile
                .map(|p| p.water_reminder_interval_min.to_string())
                .unwrap_or_default();
            open_prompt(view_state, PromptField::ReminderInterval, current);
            None
        }
        _ => None,
    }
}

fn handle_activity(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Left => {
            view_state.activity_index =
                cycle_index(view_state.activity_index, ACTIVITY_TYPES.len(), false);
            None
        }
        KeyCode::Right => {
            view_state.activity_index =
                cycle_index(view_state.activity_index, ACTIVITY_TYPES.len(), true);
            None
        }
        KeyCode::Char('i') => {
            view_state.intensity = view_state.intensity.next();
            None
        }
        KeyCode::Enter => {
            open_prompt(
                view_state,
                PromptField::ExerciseDuration,
                super::DEFAULT_EXERCISE_MINUTES.to_string(),
            );
            None
        }
        _ => handle_scroll(key_event, view_state, "activity"),
    }
}

fn handle_recipes(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Left | KeyCode::Right => {
            let meal = cycle(&MealType::ALL, view_state.meal, key_event.code == KeyCode::Right);
            view_state.meal = meal;
            Some(UserCommand::SelectMeal(meal))
        }
        KeyCode::Char('r') => Some(UserCommand::RefreshRecipes),
        KeyCode::Char('c') => {
            open_prompt(view_state, PromptField::CustomRecipe, "");
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected_recipe = view_state.selected_recipe.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let count = view_state.visible_recipes().len();
            if view_state.selected_recipe + 1 < count {
                view_state.selected_recipe += 1;
            }
            None
        }
        KeyCode::Char('a') => view_state.selected_recipe().map(|r| {
            UserCommand::AddRecipeToShoppingList {
                recipe_name: r.name.clone(),
                ingredients: r.ingredients.clone(),
            }
        }),
        _ => None,
    }
}

fn handle_shopping(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected_shopping = view_state.selected_shopping.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let count = view_state.shopping_order().len();
            if view_state.selected_shopping + 1 < count {
                view_state.selected_shopping += 1;
            }
            None
        }
        KeyCode::Char(' ') => view_state
            .selected_shopping_id()
            .map(UserCommand::ToggleShoppingItem),
        KeyCode::Char('x') => view_state
            .selected_shopping_id()
            .map(UserCommand::RemoveShoppingItem),
        KeyCode::Char('C') => {
            let has_items = view_state
                .snapshot
                .as_ref()
                .is_some_and(|s| !s.shopping.is_empty());
            has_items.then_some(UserCommand::ClearShoppingList)
        }
        _ => None,
    }
}

fn handle_workouts(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Left | KeyCode::Right => {
            let level = cycle(
                &FitnessLevel::ALL,
                view_state.fitness_level,
                key_event.code == KeyCode::Right,
            );
            view_state.fitness_level = level;
            Some(UserCommand::SelectFitnessLevel(level))
        }
        KeyCode::Char('r') => Some(UserCommand::RefreshWorkouts),
        _ => handle_scroll(key_event, view_state, "workouts"),
    }
}

fn handle_journal(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Left | KeyCode::Right => {
            view_state.mood = cycle(&Mood::ALL, view_state.mood, key_event.code == KeyCode::Right);
            None
        }
        KeyCode::Char('n') => {
            open_prompt(view_state, PromptField::JournalNote, "");
            None
        }
        _ => handle_scroll(key_event, view_state, "journal"),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn handle_scroll(key_event: KeyEvent, view_state: &mut ViewState, key: &str) -> Option<UserCommand> {
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => *offset = offset.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => *offset = offset.saturating_add(1),
        KeyCode::PageUp => *offset = offset.saturating_sub(PAGE_SIZE),
        KeyCode::PageDown => *offset = offset.saturating_add(PAGE_SIZE),
        _ => {}
    }
    None
}

fn cycle_index(idx: usize, len: usize, forward: bool) -> usize {
    if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    }
}

/// Next (or previous) value in `values`, wrapping around.
fn cycle<T: Copy + PartialEq>(values: &[T], current: T, forward: bool) -> T {
    let idx = values.iter().position(|v| *v == current).unwrap_or(0);
    values[cycle_index(idx, values.len(), forward)]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::*;
    use crossterm::event::{KeyEventState, KeyModifiers};
    use vitali_app::protocol::Notification;
    use vitali_core::activity::ActivityType;
    use vitali_core::model::Intensity;

    /// Helper to create a KeyEvent with no modifiers.
    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl_key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_text(state: &mut ViewState, text: &str) {
        for c in text.chars() {
            handle_key(key(KeyCode::Char(c)), state);
        }
    }

    fn loaded_state() -> ViewState {
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot());
        state
    }

    // -- Global --

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let mut ev = key(KeyCode::Char('2'));
        ev.kind = KeyEventKind::Release;
        assert!(handle_key(ev, &mut state).is_none());
        assert_eq!(state.active_tab, TabId::Dashboard);
    }

    #[test]
    fn ctrl_c_quits_even_in_prompt() {
        let mut state = ViewState::default();
        state.prompt = Some(Prompt::new(PromptField::CustomRecipe, ""));
        let result = handle_key(ctrl_key(KeyCode::Char('c')), &mut state);
        assert_eq!(result, Some(UserCommand::Quit));
    }

    #[test]
    fn number_keys_switch_tabs() {
        let mut state = ViewState::default();
        let result = handle_key(key(KeyCode::Char('3')), &mut state);
        assert_eq!(result, Some(UserCommand::SwitchTab(TabId::Recipes)));
        assert_eq!(state.active_tab, TabId::Recipes);

        // Same tab again: nothing to tell the app.
        assert!(handle_key(key(KeyCode::Char('3')), &mut state).is_none());
    }

    #[test]
    fn tab_and_backtab_cycle() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.active_tab, TabId::Activity);
        handle_key(key(KeyCode::BackTab), &mut state);
        handle_key(key(KeyCode::BackTab), &mut state);
        assert_eq!(state.active_tab, TabId::Journal);
    }

    #[test]
    fn q_asks_for_confirmation() {
        let mut state = ViewState::default();
        assert!(handle_key(key(KeyCode::Char('q')), &mut state).is_none());
        assert!(state.confirm_quit);

        // Other keys are blocked while confirming.
        assert!(handle_key(key(KeyCode::Char('2')), &mut state).is_none());
        assert_eq!(state.active_tab, TabId::Dashboard);

        assert!(handle_key(key(KeyCode::Char('n')), &mut state).is_none());
        assert!(!state.confirm_quit);

        handle_key(key(KeyCode::Char('q')), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Char('y')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn esc_dismisses_notification_only_when_shown() {
        let mut state = ViewState::default();
        assert!(handle_key(key(KeyCode::Esc), &mut state).is_none());
        state.notification = Some(Notification::success("ok"));
        assert_eq!(
            handle_key(key(KeyCode::Esc), &mut state),
            Some(UserCommand::DismissNotification)
        );
    }

    // -- Dashboard --

    #[test]
    fn water_shortcuts() {
        let mut state = loaded_state();
        assert_eq!(handle_key(key(KeyCode::Char('a')), &mut state), Some(UserCommand::AddWater(100)));
        assert_eq!(handle_key(key(KeyCode::Char('s')), &mut state), Some(UserCommand::AddWater(250)));
        assert_eq!(handle_key(key(KeyCode::Char('d')), &mut state), Some(UserCommand::AddWater(500)));
    }

    #[test]
    fn toggle_reminders_flips_current_setting() {
        let mut state = loaded_state();
        let result = handle_key(key(KeyCode::Char('n')), &mut state);
        assert_eq!(
            result,
            Some(UserCommand::UpdateProfile(ProfileUpdate {
                water_reminders_enabled: Some(true),
                ..Default::default()
            }))
        );
    }

    #[test]
    fn preferences_prompt_is_prefilled_and_submits() {
        let mut state = loaded_state();
        handle_key(key(KeyCode::Char('p')), &mut state);
        let prompt = state.prompt.as_ref().unwrap();
        assert_eq!(prompt.field, PromptField::DietaryPreferences);
        assert_eq!(prompt.buffer, "");

        type_text(&mut state, "vegetarian ");
        let result = handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(
            result,
            Some(UserCommand::UpdateProfile(ProfileUpdate {
                dietary_preferences: Some("vegetarian".into()),
                ..Default::default()
            }))
        );
        assert!(state.prompt.is_none());
    }

    #[test]
    fn invalid_water_goal_keeps_prompt_open() {
        let mut state = loaded_state();
        handle_key(key(KeyCode::Char('g')), &mut state);
        assert_eq!(state.prompt.as_ref().unwrap().buffer, "2500");

        for _ in 0..4 {
            handle_key(key(KeyCode::Backspace), &mut state);
        }
        type_text(&mut state, "lots");
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        let prompt = state.prompt.as_ref().unwrap();
        assert!(prompt.invalid);

        // Editing clears the flag.
        handle_key(key(KeyCode::Backspace), &mut state);
        assert!(!state.prompt.as_ref().unwrap().invalid);
    }

    #[test]
    fn esc_cancels_prompt() {
        let mut state = loaded_state();
        handle_key(key(KeyCode::Char('t')), &mut state);
        assert_eq!(state.prompt.as_ref().unwrap().buffer, "75.0");
        assert!(handle_key(key(KeyCode::Esc), &mut state).is_none());
        assert!(state.prompt.is_none());
    }

    // -- Activity --

    #[test]
    fn activity_selection_and_logging() {
        let mut state = loaded_state();
        state.active_tab = TabId::Activity;

        handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(state.activity_type(), ActivityType::Other);
        handle_key(key(KeyCode::Right), &mut state);
        handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(state.activity_type(), ActivityType::Walking);

        handle_key(key(KeyCode::Char('i')), &mut state);
        assert_eq!(state.intensity, Intensity::Intense);

        handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(state.prompt.as_ref().unwrap().buffer, "30");
        handle_key(key(KeyCode::Backspace), &mut state);
        handle_key(key(KeyCode::Backspace), &mut state);
        type_text(&mut state, "45");
        let result = handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(
            result,
            Some(UserCommand::LogExercise {
                kind: "Walking".into(),
                duration_min: 45,
                intensity: Intensity::Intense,
            })
        );
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut state = loaded_state();
        state.active_tab = TabId::Activity;
        state.prompt = Some(Prompt::new(PromptField::ExerciseDuration, "0"));
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        assert!(state.prompt.as_ref().unwrap().invalid);
    }

    #[test]
    fn duration_longer_than_a_day_is_rejected() {
        let mut state = loaded_state();
        state.active_tab = TabId::Activity;
        for text in ["1441", "4294967295"] {
            state.prompt = Some(Prompt::new(PromptField::ExerciseDuration, text));
            assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
            assert!(state.prompt.as_ref().unwrap().invalid, "{text}");
        }
        state.prompt = Some(Prompt::new(PromptField::ExerciseDuration, "1440"));
        assert!(matches!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::LogExercise { duration_min: 1440, .. })
        ));
    }

    // -- Recipes --

    #[test]
    fn meal_type_cycles_and_requests() {
        let mut state = loaded_state();
        state.active_tab = TabId::Recipes;
        let result = handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(result, Some(UserCommand::SelectMeal(MealType::Dinner)));
        let result = handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(result, Some(UserCommand::SelectMeal(MealType::Lunch)));
        handle_key(key(KeyCode::Left), &mut state);
        let result = handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(result, Some(UserCommand::SelectMeal(MealType::Snack)));
    }

    #[test]
    fn add_selected_recipe_to_shopping_list() {
        let mut state = loaded_state();
        state.active_tab = TabId::Recipes;
        state.recipes = vec![recipe("First"), recipe("Second")];

        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.selected_recipe, 1);

        let result = handle_key(key(KeyCode::Char('a')), &mut state);
        assert_eq!(
            result,
            Some(UserCommand::AddRecipeToShoppingList {
                recipe_name: "Second".into(),
                ingredients: vec!["rice".into(), "beans".into()],
            })
        );
    }

    #[test]
    fn add_without_recipes_does_nothing() {
        let mut state = loaded_state();
        state.active_tab = TabId::Recipes;
        assert!(handle_key(key(KeyCode::Char('a')), &mut state).is_none());
    }

    #[test]
    fn custom_recipe_prompt_requires_text() {
        let mut state = loaded_state();
        state.active_tab = TabId::Recipes;
        handle_key(key(KeyCode::Char('c')), &mut state);
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        assert!(state.prompt.as_ref().unwrap().invalid);

        type_text(&mut state, "eggs and spinach");
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::RequestCustomRecipe("eggs and spinach".into()))
        );
    }

    // -- Shopping --

    #[test]
    fn shopping_keys_use_display_order() {
        let mut state = loaded_state();
        state.active_tab = TabId::Shopping;

        assert_eq!(
            handle_key(key(KeyCode::Char(' ')), &mut state),
            Some(UserCommand::ToggleShoppingItem(1))
        );
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Char('x')), &mut state),
            Some(UserCommand::RemoveShoppingItem(3))
        );
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.selected_shopping, 2);
        assert_eq!(
            handle_key(key(KeyCode::Char('C')), &mut state),
            Some(UserCommand::ClearShoppingList)
        );
    }

    #[test]
    fn clear_on_empty_list_is_noop() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Shopping;
        assert!(handle_key(key(KeyCode::Char('C')), &mut state).is_none());
        assert!(handle_key(key(KeyCode::Char(' ')), &mut state).is_none());
    }

    // -- Workouts --

    #[test]
    fn fitness_level_cycles_and_scrolls() {
        let mut state = loaded_state();
        state.active_tab = TabId::Workouts;
        assert_eq!(
            handle_key(key(KeyCode::Right), &mut state),
            Some(UserCommand::SelectFitnessLevel(FitnessLevel::Intermediate))
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('r')), &mut state),
            Some(UserCommand::RefreshWorkouts)
        );
        handle_key(key(KeyCode::PageDown), &mut state);
        handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(state.scroll("workouts"), PAGE_SIZE - 1);
    }

    // -- Journal --

    #[test]
    fn journal_entry_two_step_prompt() {
        let mut state = loaded_state();
        state.active_tab = TabId::Journal;
        handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(state.mood, Mood::Determined);

        handle_key(key(KeyCode::Char('n')), &mut state);
        type_text(&mut state, "Felt great");
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());

        let prompt = state.prompt.as_ref().unwrap();
        assert_eq!(
            prompt.field,
            PromptField::JournalWeight {
                note: "Felt great".into()
            }
        );
        assert_eq!(prompt.buffer, "85.0");

        for _ in 0..4 {
            handle_key(key(KeyCode::Backspace), &mut state);
        }
        type_text(&mut state, "84,2");
        let result = handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(
            result,
            Some(UserCommand::AddJournalEntry {
                note: "Felt great".into(),
                weight_kg: Some(84.2),
                mood: Mood::Determined,
            })
        );
    }

    #[test]
    fn blank_weight_skips_weigh_in() {
        let mut state = loaded_state();
        state.prompt = Some(Prompt::new(
            PromptField::JournalWeight { note: "Rest day".into() },
            "",
        ));
        let result = handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(
            result,
            Some(UserCommand::AddJournalEntry {
                note: "Rest day".into(),
                weight_kg: None,
                mood: Mood::Happy,
            })
        );
    }

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle(&Mood::ALL, Mood::Discouraged, true), Mood::Happy);
        assert_eq!(cycle(&Mood::ALL, Mood::Happy, false), Mood::Discouraged);
    }
}
