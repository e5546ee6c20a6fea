// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the TUI, results
// from spawned LLM tasks, and a once-per-second housekeeping tick (notification
// expiry, water reminders, day rollover). Every change to tracked data is
// persisted section by section and followed by a fresh snapshot for the TUI.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use vitali_core::config::Config;
use vitali_core::model::{FitnessLevel, MealType, ProfileUpdate};
use vitali_core::stats::{self, WEEK_DAYS};
use vitali_core::store::Store;
use vitali_core::tracker::{Section, Tracker};
use vitali_llm::advisor::Advisor;
use vitali_llm::prompt;

use crate::protocol::{
    AppSnapshot, LlmEvent, Notification, NotificationKind, TabId, UiUpdate, UserCommand,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// How often the housekeeping tick runs.
pub const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(1);

pub const SHOPPING_ADDED_MESSAGE: &str = "Items added to your shopping list!";
pub const WATER_REMINDER_MESSAGE: &str = "Time to hydrate! How about a glass of water now?";

/// Meal type shown when the Recipes tab is first opened.
pub const DEFAULT_MEAL: MealType = MealType::Lunch;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Bookkeeping for one kind of LLM request.
///
/// Starting a new request aborts the previous task and bumps the generation
/// so that results still in flight from the old task are discarded.
#[derive(Debug, Default)]
pub struct RequestSlot {
    pub generation: u64,
    task: Option<JoinHandle<()>>,
}

impl RequestSlot {
    /// Abort any running task and return the generation for the next one.
    pub fn begin(&mut self) -> u64 {
        self.cancel();
        self.generation += 1;
        self.generation
    }

    pub fn attach(&mut self, handle: JoinHandle<()>) {
        self.task = Some(handle);
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Drop the task handle once its result has arrived.
    pub fn finish(&mut self) {
        self.task = None;
    }
}

/// A notification on screen and when it goes away.
#[derive(Debug, Clone)]
pub struct ActiveNotification {
    pub notification: Notification,
    pub expires_at: Instant,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub tracker: Tracker,
    pub store: Store,
    /// Shared with spawned LLM tasks.
    pub advisor: Arc<Advisor>,
    /// Sender for LLM events; spawned tasks use a clone of this sender.
    pub llm_tx: mpsc::Sender<LlmEvent>,
    pub active_tab: TabId,

    pub motivation: RequestSlot,
    pub recipes: RequestSlot,
    pub custom_recipe: RequestSlot,
    pub workouts: RequestSlot,

    pub meal: MealType,
    /// A recipe request has been issued for the current settings.
    pub recipes_requested: bool,
    /// Dietary settings changed since the recipes were fetched.
    pub recipes_stale: bool,
    pub fitness_level: FitnessLevel,
    pub workouts_requested: bool,

    pub notification: Option<ActiveNotification>,
    /// When the next water reminder fires. `None` while reminders are off.
    pub next_reminder_at: Option<Instant>,
}

impl AppState {
    pub fn new(
        config: Config,
        tracker: Tracker,
        store: Store,
        advisor: Advisor,
        llm_tx: mpsc::Sender<LlmEvent>,
    ) -> Self {
        let mut state = AppState {
            config,
            tracker,
            store,
            advisor: Arc::new(advisor),
            llm_tx,
            active_tab: TabId::Dashboard,
            motivation: RequestSlot::default(),
            recipes: RequestSlot::default(),
            custom_recipe: RequestSlot::default(),
            workouts: RequestSlot::default(),
            meal: DEFAULT_MEAL,
            recipes_requested: false,
            recipes_stale: false,
            fitness_level: FitnessLevel::Beginner,
            workouts_requested: false,
            notification: None,
            next_reminder_at: None,
        };
        state.reschedule_reminder(Instant::now());
        state
    }

    // -- snapshots and persistence --

    /// Build the snapshot the TUI renders from.
    ///
    /// The weekly window reads past days from the store; today's entry always
    /// comes from memory.
    pub fn build_snapshot(&self) -> AppSnapshot {
        let today = self.tracker.today();
        let mut logs = self
            .store
            .load_daily_logs(today, WEEK_DAYS)
            .unwrap_or_else(|e| {
                warn!("failed to load weekly logs: {e:#}");
                Vec::new()
            });
        logs.retain(|l| l.date != today);
        logs.push(self.tracker.daily_log.clone());

        let t = &self.tracker;
        AppSnapshot {
            today,
            profile: t.profile.clone(),
            daily_log: t.daily_log.clone(),
            exercises: t.exercises.clone(),
            journal: t.journal.clone(),
            shopping: t.shopping.clone(),
            weekly: stats::weekly_summary(&logs, &t.exercises, &t.journal, today, t.profile.weight_kg),
            weight_history: stats::weight_history(&t.journal),
            llm_enabled: self.advisor.is_enabled(),
        }
    }

    /// Overwrite the stored blobs for `sections`. Failures are logged; the
    /// in-memory state stays authoritative.
    pub fn persist(&self, sections: &[Section]) {
        for section in sections {
            if let Err(e) = self.store.save_section(&self.tracker, *section) {
                warn!("failed to persist {section:?}: {e:#}");
            }
        }
    }

    // -- notifications --

    pub fn show_notification(&mut self, notification: Notification, now: Instant) {
        let secs = match notification.kind {
            NotificationKind::Water => self.config.notifications.water_reminder_secs,
            NotificationKind::Success | NotificationKind::Error => {
                self.config.notifications.success_secs
            }
        };
        self.notification = Some(ActiveNotification {
            notification,
            expires_at: now + Duration::from_secs(secs),
        });
    }

    /// Clear the notification if it has expired. Returns `true` if one was
    /// cleared.
    pub fn expire_notification(&mut self, now: Instant) -> bool {
        match &self.notification {
            Some(active) if now >= active.expires_at => {
                self.notification = None;
                true
            }
            _ => false,
        }
    }

    /// Clear an on-screen water reminder. Returns `true` if one was cleared.
    pub fn dismiss_water_reminder(&mut self) -> bool {
        let is_water = self
            .notification
            .as_ref()
            .is_some_and(|a| a.notification.kind == NotificationKind::Water);
        if is_water {
            self.notification = None;
        }
        is_water
    }

    // -- water reminders --

    /// Recompute the next reminder time from the profile's settings.
    pub fn reschedule_reminder(&mut self, now: Instant) {
        let profile = &self.tracker.profile;
        self.next_reminder_at = if profile.water_reminders_enabled
            && profile.water_reminder_interval_min > 0
        {
            let interval = Duration::from_secs(u64::from(profile.water_reminder_interval_min) * 60);
            Some(now + interval)
        } else {
            None
        };
    }

    /// Fire the water reminder if it is due. Returns `true` if it fired.
    pub fn check_water_reminder(&mut self, now: Instant) -> bool {
        match self.next_reminder_at {
            Some(due) if now >= due => {
                info!("Water reminder");
                self.show_notification(Notification::water(WATER_REMINDER_MESSAGE), now);
                self.reschedule_reminder(now);
                true
            }
            _ => false,
        }
    }

    // -- day rollover --

    /// Start a new daily log if `today` differs from the tracked day.
    pub fn check_day_rollover(&mut self, today: NaiveDate) -> bool {
        if self.tracker.today() == today {
            return false;
        }
        let stored = self.store.load_daily_log(today).unwrap_or_else(|e| {
            warn!("failed to load daily log for {today}: {e:#}");
            None
        });
        let rolled = self.tracker.roll_over(today, stored);
        if rolled {
            self.persist(&[Section::DailyLog]);
        }
        rolled
    }

    // -- LLM requests --

    /// Cancel all in-flight LLM tasks.
    pub fn cancel_llm_tasks(&mut self) {
        self.motivation.cancel();
        self.recipes.cancel();
        self.custom_recipe.cancel();
        self.workouts.cancel();
    }

    /// Start streaming a new motivational sentence.
    pub fn trigger_motivation(&mut self) {
        let generation = self.motivation.begin();
        let advisor = Arc::clone(&self.advisor);
        let tx = self.llm_tx.clone();
        let name = self.tracker.profile.name.clone();
        let progress = prompt::progress_summary(&self.tracker.profile, &self.tracker.daily_log);

        let handle = tokio::spawn(async move {
            let (token_tx, mut token_rx) = mpsc::channel::<String>(64);
            let forward_tx = tx.clone();
            let forward = async move {
                while let Some(text) = token_rx.recv().await {
                    let event = LlmEvent::MotivationToken { text, generation };
                    if forward_tx.send(event).await.is_err() {
                        break;
                    }
                }
            };
            let (text, ()) =
                tokio::join!(advisor.stream_motivation(&name, &progress, token_tx), forward);
            let _ = tx.send(LlmEvent::MotivationComplete { text, generation }).await;
        });

        self.motivation.attach(handle);
        info!("Triggered motivation request (gen: {})", generation);
    }

    /// Fetch recipes for the current meal type.
    pub fn trigger_recipes(&mut self) {
        let generation = self.recipes.begin();
        let advisor = Arc::clone(&self.advisor);
        let tx = self.llm_tx.clone();
        let meal = self.meal;
        let preferences = self.tracker.profile.dietary_preferences.clone();
        let restrictions = self.tracker.profile.dietary_restrictions.clone();

        self.recipes_requested = true;
        self.recipes_stale = false;

        let handle = tokio::spawn(async move {
            let result = advisor
                .suggest_recipes(meal, &preferences, &restrictions)
                .await
                .map_err(|e| format!("{e:#}"));
            let _ = tx.send(LlmEvent::Recipes { meal, result, generation }).await;
        });

        self.recipes.attach(handle);
        info!("Triggered recipe request for {} (gen: {})", meal.as_str(), generation);
    }

    /// Ask for a single recipe built from a free-text request.
    pub fn trigger_custom_recipe(&mut self, request: String) {
        let generation = self.custom_recipe.begin();
        let advisor = Arc::clone(&self.advisor);
        let tx = self.llm_tx.clone();
        let preferences = self.tracker.profile.dietary_preferences.clone();
        let restrictions = self.tracker.profile.dietary_restrictions.clone();

        let handle = tokio::spawn(async move {
            let result = advisor
                .create_recipe(&request, &preferences, &restrictions)
                .await
                .map_err(|e| format!("{e:#}"));
            let _ = tx.send(LlmEvent::CustomRecipe { result, generation }).await;
        });

        self.custom_recipe.attach(handle);
        info!("Triggered custom recipe request (gen: {})", generation);
    }

    /// Fetch workouts for the current fitness level.
    pub fn trigger_workouts(&mut self) {
        let generation = self.workouts.begin();
        let advisor = Arc::clone(&self.advisor);
        let tx = self.llm_tx.clone();
        let level = self.fitness_level;

        self.workouts_requested = true;

        let handle = tokio::spawn(async move {
            let result = advisor
                .suggest_workouts(level)
                .await
                .map_err(|e| format!("{e:#}"));
            let _ = tx.send(LlmEvent::Workouts { level, result, generation }).await;
        });

        self.workouts.attach(handle);
        info!("Triggered workout request for {} (gen: {})", level.label(), generation);
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels and a timer using `tokio::select!`:
/// 1. LLM events from spawned tasks
/// 2. User commands from the TUI
/// 3. The housekeeping tick
///
/// Sends an initial snapshot and requests a motivation quote before entering
/// the loop. Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut llm_rx: mpsc::Receiver<LlmEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    send_snapshot(&state, &ui_tx).await;
    state.trigger_motivation();
    let _ = ui_tx.send(UiUpdate::MotivationStarted).await;

    let mut llm_open = true;

    let mut housekeeping = tokio::time::interval(HOUSEKEEPING_INTERVAL);
    // The first tick completes immediately; consume it.
    housekeeping.tick().await;

    loop {
        tokio::select! {
            // --- LLM events (only poll when channel is open) ---
            llm_event = llm_rx.recv(), if llm_open => {
                match llm_event {
                    Some(event) => {
                        handle_llm_event(&mut state, event, &ui_tx).await;
                    }
                    None => {
                        info!("LLM channel closed");
                        llm_open = false;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Housekeeping ---
            _ = housekeeping.tick() => {
                housekeep(&mut state, Instant::now(), Local::now().date_naive(), &ui_tx).await;
            }
        }
    }

    state.cancel_llm_tasks();
    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::Snapshot(Box::new(snapshot))).await;
}

async fn notify(
    state: &mut AppState,
    notification: Notification,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    state.show_notification(notification.clone(), Instant::now());
    let _ = ui_tx.send(UiUpdate::Notification(notification)).await;
}

/// One housekeeping pass: expire notifications, fire water reminders, and
/// roll the daily log over at midnight.
async fn housekeep(
    state: &mut AppState,
    now: Instant,
    today: NaiveDate,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if state.expire_notification(now) {
        let _ = ui_tx.send(UiUpdate::NotificationCleared).await;
    }

    if state.check_water_reminder(now) {
        let _ = ui_tx
            .send(UiUpdate::Notification(Notification::water(WATER_REMINDER_MESSAGE)))
            .await;
    }

    if state.check_day_rollover(today) {
        send_snapshot(state, ui_tx).await;
    }
}

/// Handle an event from a spawned LLM task.
///
/// Events whose generation doesn't match the current request of the same
/// kind come from superseded tasks and are dropped.
async fn handle_llm_event(
    state: &mut AppState,
    event: LlmEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let generation = event.generation();
    let slot = match &event {
        LlmEvent::MotivationToken { .. } | LlmEvent::MotivationComplete { .. } => {
            &mut state.motivation
        }
        LlmEvent::Recipes { .. } => &mut state.recipes,
        LlmEvent::CustomRecipe { .. } => &mut state.custom_recipe,
        LlmEvent::Workouts { .. } => &mut state.workouts,
    };

    if !slot.is_current(generation) {
        debug!(
            "Discarding stale LLM event (event gen: {}, current gen: {})",
            generation, slot.generation
        );
        return;
    }
    if !matches!(event, LlmEvent::MotivationToken { .. }) {
        slot.finish();
    }

    match event {
        LlmEvent::MotivationToken { text, .. } => {
            let _ = ui_tx.send(UiUpdate::MotivationToken(text)).await;
        }
        LlmEvent::MotivationComplete { text, .. } => {
            let _ = ui_tx.send(UiUpdate::MotivationComplete(text)).await;
        }
        LlmEvent::Recipes { meal, result, .. } => match result {
            Ok(recipes) => {
                let _ = ui_tx.send(UiUpdate::RecipesLoaded { meal, recipes }).await;
            }
            Err(message) => {
                warn!("Recipe request failed: {}", message);
                // Let the next visit to the tab try again.
                state.recipes_requested = false;
                let _ = ui_tx.send(UiUpdate::RecipesFailed(message)).await;
            }
        },
        LlmEvent::CustomRecipe { result, .. } => match result {
            Ok(Some(recipe)) => {
                let _ = ui_tx.send(UiUpdate::CustomRecipeLoaded(Some(recipe))).await;
            }
            Ok(None) => {
                let _ = ui_tx.send(UiUpdate::CustomRecipeLoaded(None)).await;
                notify(
                    state,
                    Notification::error("Couldn't build a recipe from that request. Try rephrasing it."),
                    ui_tx,
                )
                .await;
            }
            Err(message) => {
                warn!("Custom recipe request failed: {}", message);
                let _ = ui_tx.send(UiUpdate::CustomRecipeFailed(message)).await;
            }
        },
        LlmEvent::Workouts { level, result, .. } => match result {
            Ok(workouts) => {
                let _ = ui_tx.send(UiUpdate::WorkoutsLoaded { level, workouts }).await;
            }
            Err(message) => {
                warn!("Workout request failed: {}", message);
                state.workouts_requested = false;
                let _ = ui_tx.send(UiUpdate::WorkoutsFailed(message)).await;
            }
        },
    }
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::AddWater(amount_ml) => match state.tracker.add_water(amount_ml) {
            Ok(changed) => {
                state.persist(&changed);
                if state.dismiss_water_reminder() {
                    let _ = ui_tx.send(UiUpdate::NotificationCleared).await;
                }
                send_snapshot(state, ui_tx).await;
            }
            Err(e) => notify(state, Notification::error(e.to_string()), ui_tx).await,
        },
        UserCommand::LogExercise {
            kind,
            duration_min,
            intensity,
        } => {
            let today = state.tracker.today();
            match state.tracker.log_exercise(&kind, duration_min, intensity, today) {
                Ok((entry, changed)) => {
                    state.persist(&changed);
                    send_snapshot(state, ui_tx).await;
                    let message = format!(
                        "Logged {} min of {}: {} kcal burned",
                        entry.duration_min, entry.kind, entry.calories_burned
                    );
                    notify(state, Notification::success(message), ui_tx).await;
                }
                Err(e) => notify(state, Notification::error(e.to_string()), ui_tx).await,
            }
        }
        UserCommand::AddJournalEntry {
            note,
            weight_kg,
            mood,
        } => {
            let today = state.tracker.today();
            match state.tracker.add_journal_entry(&note, weight_kg, mood, today) {
                Ok(changed) => {
                    state.persist(&changed);
                    send_snapshot(state, ui_tx).await;
                }
                Err(e) => notify(state, Notification::error(e.to_string()), ui_tx).await,
            }
        }
        UserCommand::UpdateProfile(update) => {
            handle_profile_update(state, update, ui_tx).await;
        }
        UserCommand::SwitchTab(tab) => {
            state.active_tab = tab;
            info!("Switched to tab: {:?}", tab);
            match tab {
                TabId::Recipes if !state.recipes_requested || state.recipes_stale => {
                    start_recipes(state, ui_tx).await;
                }
                TabId::Workouts if !state.workouts_requested => {
                    start_workouts(state, ui_tx).await;
                }
                _ => {}
            }
        }
        UserCommand::SelectMeal(meal) => {
            state.meal = meal;
            start_recipes(state, ui_tx).await;
        }
        UserCommand::RefreshRecipes => {
            start_recipes(state, ui_tx).await;
        }
        UserCommand::RequestCustomRecipe(request) => {
            if request.trim().is_empty() {
                return;
            }
            state.trigger_custom_recipe(request);
            let _ = ui_tx.send(UiUpdate::CustomRecipeLoading).await;
        }
        UserCommand::AddRecipeToShoppingList {
            recipe_name,
            ingredients,
        } => {
            let (added, changed) = state
                .tracker
                .add_to_shopping_list(&ingredients, Some(recipe_name.as_str()));
            if added > 0 {
                state.persist(&changed);
                send_snapshot(state, ui_tx).await;
                notify(state, Notification::success(SHOPPING_ADDED_MESSAGE), ui_tx).await;
            }
        }
        UserCommand::ToggleShoppingItem(id) => {
            let result = state.tracker.toggle_shopping_item(id);
            apply_shopping_result(state, result, ui_tx).await;
        }
        UserCommand::RemoveShoppingItem(id) => {
            let result = state.tracker.remove_shopping_item(id);
            apply_shopping_result(state, result, ui_tx).await;
        }
        UserCommand::ClearShoppingList => {
            let changed = state.tracker.clear_shopping_list();
            if !changed.is_empty() {
                info!("Shopping list cleared");
                state.persist(&changed);
                send_snapshot(state, ui_tx).await;
            }
        }
        UserCommand::SelectFitnessLevel(level) => {
            state.fitness_level = level;
            start_workouts(state, ui_tx).await;
        }
        UserCommand::RefreshWorkouts => {
            start_workouts(state, ui_tx).await;
        }
        UserCommand::RefreshMotivation => {
            state.trigger_motivation();
            let _ = ui_tx.send(UiUpdate::MotivationStarted).await;
        }
        UserCommand::DismissNotification => {
            if state.notification.take().is_some() {
                let _ = ui_tx.send(UiUpdate::NotificationCleared).await;
            }
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

async fn handle_profile_update(
    state: &mut AppState,
    update: ProfileUpdate,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let touches_diet = update.touches_diet();
    let touches_reminders = update.touches_reminders();

    let changed = state.tracker.update_profile(update);
    state.persist(&changed);

    if touches_reminders {
        state.reschedule_reminder(Instant::now());
    }

    send_snapshot(state, ui_tx).await;

    if touches_diet {
        if state.active_tab == TabId::Recipes {
            start_recipes(state, ui_tx).await;
        } else if state.recipes_requested {
            state.recipes_stale = true;
        }
    }
}

async fn apply_shopping_result(
    state: &mut AppState,
    result: Result<Vec<Section>, vitali_core::tracker::TrackerError>,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match result {
        Ok(changed) => {
            state.persist(&changed);
            send_snapshot(state, ui_tx).await;
        }
        Err(e) => warn!("Shopping list update ignored: {e}"),
    }
}

async fn start_recipes(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    state.trigger_recipes();
    let _ = ui_tx.send(UiUpdate::RecipesLoading(state.meal)).await;
}

async fn start_workouts(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    state.trigger_workouts();
    let _ = ui_tx.send(UiUpdate::WorkoutsLoading(state.fitness_level)).await;
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
