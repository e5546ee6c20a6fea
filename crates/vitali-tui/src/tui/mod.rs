// Terminal UI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the latest snapshot from the app
// orchestrator plus everything that only matters for display (selection,
// scroll offsets, open prompts, streamed LLM text). The orchestrator pushes
// `UiUpdate` messages over an mpsc channel; the TUI applies them and
// re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{info, warn};

use vitali_app::protocol::{AppSnapshot, LlmStatus, Notification, TabId, UiUpdate, UserCommand};
use vitali_core::activity::{ActivityType, ACTIVITY_TYPES};
use vitali_core::model::{FitnessLevel, Intensity, MealType, Mood, Recipe, Workout};
use vitali_core::stats;

use layout::build_layout;

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// What a single-line prompt is collecting.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptField {
    ExerciseDuration,
    CustomRecipe,
    JournalNote,
    /// Second step of a journal entry; carries the note from the first.
    JournalWeight { note: String },
    DietaryPreferences,
    DietaryRestrictions,
    WaterGoal,
    TargetWeight,
    ReminderInterval,
}

impl PromptField {
    pub fn title(&self) -> &'static str {
        match self {
            PromptField::ExerciseDuration => "Duration (minutes)",
            PromptField::CustomRecipe => "What do you feel like eating?",
            PromptField::JournalNote => "How are you feeling today?",
            PromptField::JournalWeight { .. } => "Weight in kg (blank to skip)",
            PromptField::DietaryPreferences => "Dietary preferences",
            PromptField::DietaryRestrictions => "Dietary restrictions",
            PromptField::WaterGoal => "Daily water goal (ml)",
            PromptField::TargetWeight => "Target weight (kg)",
            PromptField::ReminderInterval => "Reminder interval (minutes)",
        }
    }
}

/// An open single-line editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub field: PromptField,
    pub buffer: String,
    /// The last submit was rejected; cleared on the next edit.
    pub invalid: bool,
}

impl Prompt {
    pub fn new(field: PromptField, initial: impl Into<String>) -> Self {
        Prompt {
            field,
            buffer: initial.into(),
            invalid: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Minutes used for the live calorie estimate before a duration is typed.
pub const DEFAULT_EXERCISE_MINUTES: u32 = 30;

/// TUI-local state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator.
pub struct ViewState {
    /// Latest tracked data. `None` until the first snapshot arrives.
    pub snapshot: Option<AppSnapshot>,
    pub active_tab: TabId,

    /// Accumulated motivation text (streamed tokens, then the final sentence).
    pub motivation_text: String,
    pub motivation_status: LlmStatus,

    pub meal: MealType,
    pub recipes: Vec<Recipe>,
    pub recipes_status: LlmStatus,
    pub recipes_error: Option<String>,
    pub custom_recipe: Option<Recipe>,
    pub custom_status: LlmStatus,
    pub custom_error: Option<String>,
    /// Index into `visible_recipes()`.
    pub selected_recipe: usize,

    pub fitness_level: FitnessLevel,
    pub workouts: Vec<Workout>,
    pub workouts_status: LlmStatus,
    pub workouts_error: Option<String>,

    /// Index into `shopping_order()`.
    pub selected_shopping: usize,

    /// Index into `ACTIVITY_TYPES`.
    pub activity_index: usize,
    pub intensity: Intensity,
    pub mood: Mood,

    pub notification: Option<Notification>,
    /// Per-widget scroll offsets (keyed by widget name).
    pub scroll_offset: HashMap<String, usize>,
    pub prompt: Option<Prompt>,
    pub confirm_quit: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            snapshot: None,
            active_tab: TabId::Dashboard,
            motivation_text: String::new(),
            motivation_status: LlmStatus::Idle,
            meal: MealType::Lunch,
            recipes: Vec::new(),
            recipes_status: LlmStatus::Idle,
            recipes_error: None,
            custom_recipe: None,
            custom_status: LlmStatus::Idle,
            custom_error: None,
            selected_recipe: 0,
            fitness_level: FitnessLevel::Beginner,
            workouts: Vec::new(),
            workouts_status: LlmStatus::Idle,
            workouts_error: None,
            selected_shopping: 0,
            activity_index: 0,
            intensity: Intensity::Moderate,
            mood: Mood::Happy,
            notification: None,
            scroll_offset: HashMap::new(),
            prompt: None,
            confirm_quit: false,
        }
    }
}

impl ViewState {
    /// Replace the tracked data and clamp selections to the new lists.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        let items = snapshot.shopping.len();
        self.selected_shopping = self.selected_shopping.min(items.saturating_sub(1));
        self.snapshot = Some(snapshot);
    }

    /// The custom recipe (if any) followed by the suggestions.
    pub fn visible_recipes(&self) -> Vec<&Recipe> {
        self.custom_recipe.iter().chain(self.recipes.iter()).collect()
    }

    pub fn selected_recipe(&self) -> Option<&Recipe> {
        self.visible_recipes().get(self.selected_recipe).copied()
    }

    /// Shopping item ids in display order (grouped by recipe).
    pub fn shopping_order(&self) -> Vec<u64> {
        self.snapshot
            .as_ref()
            .map(|s| {
                stats::group_shopping_items(&s.shopping)
                    .into_iter()
                    .flat_map(|(_, items)| items.into_iter().map(|i| i.id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn selected_shopping_id(&self) -> Option<u64> {
        self.shopping_order().get(self.selected_shopping).copied()
    }

    pub fn activity_type(&self) -> ActivityType {
        ACTIVITY_TYPES[self.activity_index % ACTIVITY_TYPES.len()]
    }

    pub fn scroll(&self, key: &str) -> usize {
        self.scroll_offset.get(key).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::MotivationStarted => {
            state.motivation_text.clear();
            state.motivation_status = LlmStatus::Streaming;
        }
        UiUpdate::MotivationToken(token) => {
            state.motivation_text.push_str(&token);
            state.motivation_status = LlmStatus::Streaming;
        }
        UiUpdate::MotivationComplete(text) => {
            state.motivation_text = text;
            state.motivation_status = LlmStatus::Complete;
        }
        UiUpdate::RecipesLoading(meal) => {
            state.meal = meal;
            state.recipes.clear();
            state.custom_recipe = None;
            state.custom_status = LlmStatus::Idle;
            state.recipes_status = LlmStatus::Streaming;
            state.recipes_error = None;
            state.selected_recipe = 0;
        }
        UiUpdate::RecipesLoaded { meal, recipes } => {
            if meal == state.meal {
                state.recipes = recipes;
                state.recipes_status = LlmStatus::Complete;
            }
        }
        UiUpdate::RecipesFailed(message) => {
            state.recipes_status = LlmStatus::Error;
            state.recipes_error = Some(message);
        }
        UiUpdate::CustomRecipeLoading => {
            state.custom_status = LlmStatus::Streaming;
            state.custom_error = None;
        }
        UiUpdate::CustomRecipeLoaded(recipe) => {
            if recipe.is_some() {
                state.selected_recipe = 0;
            }
            state.custom_recipe = recipe;
            state.custom_status = LlmStatus::Complete;
        }
        UiUpdate::CustomRecipeFailed(message) => {
            state.custom_status = LlmStatus::Error;
            state.custom_error = Some(message);
        }
        UiUpdate::WorkoutsLoading(level) => {
            state.fitness_level = level;
            state.workouts.clear();
            state.workouts_status = LlmStatus::Streaming;
            state.workouts_error = None;
            state.scroll_offset.remove("workouts");
        }
        UiUpdate::WorkoutsLoaded { level, workouts } => {
            if level == state.fitness_level {
                state.workouts = workouts;
                state.workouts_status = LlmStatus::Complete;
            }
        }
        UiUpdate::WorkoutsFailed(message) => {
            state.workouts_status = LlmStatus::Error;
            state.workouts_error = Some(message);
        }
        UiUpdate::Notification(notification) => {
            state.notification = Some(notification);
        }
        UiUpdate::NotificationCleared => {
            state.notification = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame: chrome, the active tab, and any overlay.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::tab_bar::render(frame, layout.tab_bar, state);

    match state.active_tab {
        TabId::Dashboard => widgets::dashboard::render(frame, layout.main_panel, state),
        TabId::Activity => widgets::activity::render(frame, layout.main_panel, state),
        TabId::Recipes => widgets::recipes::render(frame, layout.main_panel, state),
        TabId::Shopping => widgets::shopping::render(frame, layout.main_panel, state),
        TabId::Workouts => widgets::workouts::render(frame, layout.main_panel, state),
        TabId::Journal => widgets::journal::render(frame, layout.main_panel, state),
    }

    widgets::notification::render(frame, layout.notification, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(prompt) = &state.prompt {
        widgets::prompt::render(frame, frame.area(), prompt);
    }
    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook that restores the terminal.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => {
                        info!("UI channel closed");
                        break Ok(());
                    }
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            if cmd_tx.send(cmd).await.is_err() || quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse and resize events: the next tick redraws.
                    }
                    Some(Err(e)) => {
                        warn!("terminal input error: {}", e);
                        break Err(e.into());
                    }
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(e.into());
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use vitali_app::protocol::AppSnapshot;
    use vitali_core::model::{
        DailyLog, ExerciseEntry, Intensity, JournalEntry, Mood, Recipe, ShoppingItem, UserProfile,
        Workout,
    };
    use vitali_core::stats::WeeklySummary;

    pub fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 20).unwrap()
    }

    pub fn snapshot() -> AppSnapshot {
        let today = date();
        let mut log = DailyLog::new(today);
        log.water_intake_ml = 1250;
        log.calories_burned = 340;
        AppSnapshot {
            today,
            profile: UserProfile::default(),
            daily_log: log,
            exercises: vec![ExerciseEntry {
                id: 1,
                date: today,
                kind: "Cycling".into(),
                duration_min: 30,
                intensity: Intensity::Moderate,
                calories_burned: 340,
            }],
            journal: vec![JournalEntry {
                id: 1,
                date: today,
                note: "Good start".into(),
                weight_kg: Some(84.5),
                mood: Mood::Determined,
            }],
            shopping: vec![
                item(1, "oats", None),
                item(2, "beans", Some("Chili")),
                item(3, "eggs", None),
            ],
            weekly: WeeklySummary {
                water_total_ml: 5000,
                calories_burned: 340,
                average_weight_kg: 84.5,
                weigh_ins: 1,
            },
            weight_history: vec![(today, 84.5)],
            llm_enabled: true,
        }
    }

    pub fn item(id: u64, name: &str, recipe: Option<&str>) -> ShoppingItem {
        ShoppingItem {
            id,
            name: name.into(),
            completed: false,
            recipe_name: recipe.map(String::from),
        }
    }

    pub fn recipe(name: &str) -> Recipe {
        Recipe {
            name: name.into(),
            calories: "400 kcal".into(),
            ingredients: vec!["rice".into(), "beans".into()],
            instructions: vec!["Cook the rice".into(), "Add beans".into()],
            meal: None,
        }
    }

    pub fn workout(title: &str) -> Workout {
        Workout {
            title: title.into(),
            duration: "20 min".into(),
            intensity: None,
            description: "Bodyweight circuit".into(),
            exercises: vec!["Squats".into(), "Push-ups".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use vitali_app::protocol::NotificationKind;

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.snapshot.is_none());
        assert_eq!(state.active_tab, TabId::Dashboard);
        assert_eq!(state.meal, MealType::Lunch);
        assert_eq!(state.fitness_level, FitnessLevel::Beginner);
        assert_eq!(state.motivation_status, LlmStatus::Idle);
        assert!(state.prompt.is_none());
        assert!(!state.confirm_quit);
        assert_eq!(state.activity_type(), ACTIVITY_TYPES[0]);
    }

    #[test]
    fn snapshot_clamps_shopping_selection() {
        let mut state = ViewState::default();
        state.selected_shopping = 10;
        state.apply_snapshot(snapshot());
        assert_eq!(state.selected_shopping, 2);
    }

    #[test]
    fn shopping_order_follows_groups() {
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot());
        // General (oats, eggs) first, then Chili (beans).
        assert_eq!(state.shopping_order(), vec![1, 3, 2]);
        state.selected_shopping = 2;
        assert_eq!(state.selected_shopping_id(), Some(2));
    }

    #[test]
    fn motivation_stream_then_final_text() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::MotivationStarted);
        apply_ui_update(&mut state, UiUpdate::MotivationToken("Keep ".into()));
        apply_ui_update(&mut state, UiUpdate::MotivationToken("going".into()));
        assert_eq!(state.motivation_text, "Keep going");
        assert_eq!(state.motivation_status, LlmStatus::Streaming);

        apply_ui_update(&mut state, UiUpdate::MotivationComplete("Keep going.".into()));
        assert_eq!(state.motivation_text, "Keep going.");
        assert_eq!(state.motivation_status, LlmStatus::Complete);

        apply_ui_update(&mut state, UiUpdate::MotivationStarted);
        assert!(state.motivation_text.is_empty());
    }

    #[test]
    fn recipes_loading_clears_custom_recipe() {
        let mut state = ViewState::default();
        state.custom_recipe = Some(recipe("Leftover omelette"));
        state.recipes = vec![recipe("Old")];
        state.selected_recipe = 1;

        apply_ui_update(&mut state, UiUpdate::RecipesLoading(MealType::Dinner));
        assert_eq!(state.meal, MealType::Dinner);
        assert!(state.custom_recipe.is_none());
        assert!(state.recipes.is_empty());
        assert_eq!(state.selected_recipe, 0);
        assert_eq!(state.recipes_status, LlmStatus::Streaming);
    }

    #[test]
    fn recipes_for_other_meal_are_ignored() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::RecipesLoading(MealType::Dinner));
        apply_ui_update(
            &mut state,
            UiUpdate::RecipesLoaded {
                meal: MealType::Lunch,
                recipes: vec![recipe("Soup")],
            },
        );
        assert!(state.recipes.is_empty());
        assert_eq!(state.recipes_status, LlmStatus::Streaming);
    }

    #[test]
    fn custom_recipe_is_listed_first() {
        let mut state = ViewState::default();
        state.recipes = vec![recipe("A"), recipe("B")];
        state.selected_recipe = 1;
        apply_ui_update(
            &mut state,
            UiUpdate::CustomRecipeLoaded(Some(recipe("Mine"))),
        );
        let names: Vec<&str> = state.visible_recipes().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Mine", "A", "B"]);
        assert_eq!(state.selected_recipe().unwrap().name, "Mine");
    }

    #[test]
    fn failures_record_messages() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::RecipesFailed("LLM not configured".into()));
        assert_eq!(state.recipes_status, LlmStatus::Error);
        assert_eq!(state.recipes_error.as_deref(), Some("LLM not configured"));

        apply_ui_update(&mut state, UiUpdate::WorkoutsFailed("timeout".into()));
        assert_eq!(state.workouts_status, LlmStatus::Error);
        assert_eq!(state.workouts_error.as_deref(), Some("timeout"));
    }

    #[test]
    fn workouts_loading_resets_scroll() {
        let mut state = ViewState::default();
        state.scroll_offset.insert("workouts".into(), 7);
        apply_ui_update(&mut state, UiUpdate::WorkoutsLoading(FitnessLevel::Advanced));
        assert_eq!(state.scroll("workouts"), 0);
        apply_ui_update(
            &mut state,
            UiUpdate::WorkoutsLoaded {
                level: FitnessLevel::Advanced,
                workouts: vec![workout("HIIT")],
            },
        );
        assert_eq!(state.workouts.len(), 1);
        assert_eq!(state.workouts_status, LlmStatus::Complete);
    }

    #[test]
    fn notifications_show_and_clear() {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::Notification(Notification::water("Drink up")),
        );
        assert_eq!(state.notification.as_ref().unwrap().kind, NotificationKind::Water);
        apply_ui_update(&mut state, UiUpdate::NotificationCleared);
        assert!(state.notification.is_none());
    }

    #[test]
    fn render_frame_every_tab_without_snapshot() {
        for tab in TabId::ALL {
            let backend = ratatui::backend::TestBackend::new(100, 30);
            let mut terminal = ratatui::Terminal::new(backend).unwrap();
            let mut state = ViewState::default();
            state.active_tab = tab;
            terminal.draw(|frame| render_frame(frame, &state)).unwrap();
        }
    }

    #[test]
    fn render_frame_every_tab_with_data_and_overlays() {
        for tab in TabId::ALL {
            let backend = ratatui::backend::TestBackend::new(100, 30);
            let mut terminal = ratatui::Terminal::new(backend).unwrap();
            let mut state = ViewState::default();
            state.apply_snapshot(snapshot());
            state.recipes = vec![recipe("Bean bowl")];
            state.workouts = vec![workout("Circuit")];
            state.motivation_text = "Stay strong.".into();
            state.notification = Some(Notification::success("Saved"));
            state.prompt = Some(Prompt::new(PromptField::WaterGoal, "2500"));
            state.confirm_quit = true;
            state.active_tab = tab;
            terminal.draw(|frame| render_frame(frame, &state)).unwrap();
        }
    }

    #[test]
    fn render_frame_tiny_terminal() {
        let backend = ratatui::backend::TestBackend::new(20, 5);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot());
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }
}
