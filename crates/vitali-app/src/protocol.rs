// Messages exchanged between the TUI, the app orchestrator, and spawned LLM
// tasks.
//
//   TUI  --UserCommand-->  app  --UiUpdate-->  TUI
//   LLM task  --LlmEvent-->  app

use chrono::NaiveDate;

use vitali_core::model::{
    DailyLog, ExerciseEntry, FitnessLevel, Intensity, JournalEntry, MealType, Mood,
    ProfileUpdate, Recipe, ShoppingItem, UserProfile, Workout,
};
use vitali_core::stats::WeeklySummary;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TabId {
    #[default]
    Dashboard,
    Activity,
    Recipes,
    Shopping,
    Workouts,
    Journal,
}

impl TabId {
    /// Display order, matching the `1`-`6` shortcuts.
    pub const ALL: [TabId; 6] = [
        TabId::Dashboard,
        TabId::Activity,
        TabId::Recipes,
        TabId::Shopping,
        TabId::Workouts,
        TabId::Journal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TabId::Dashboard => "Dashboard",
            TabId::Activity => "Activity",
            TabId::Recipes => "Recipes",
            TabId::Shopping => "Shopping",
            TabId::Workouts => "Workouts",
            TabId::Journal => "Journal",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Tab for a zero-based index, if in range.
    pub fn from_index(idx: usize) -> Option<TabId> {
        Self::ALL.get(idx).copied()
    }

    pub fn next(self) -> TabId {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> TabId {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ---------------------------------------------------------------------------
// Status and notifications
// ---------------------------------------------------------------------------

/// Progress of an outstanding LLM request, as shown by the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmStatus {
    #[default]
    Idle,
    Streaming,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Water,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn water(message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Water,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TUI -> app
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    AddWater(u32),
    LogExercise {
        kind: String,
        duration_min: u32,
        intensity: Intensity,
    },
    AddJournalEntry {
        note: String,
        weight_kg: Option<f64>,
        mood: Mood,
    },
    UpdateProfile(ProfileUpdate),
    SwitchTab(TabId),
    SelectMeal(MealType),
    RefreshRecipes,
    RequestCustomRecipe(String),
    AddRecipeToShoppingList {
        recipe_name: String,
        ingredients: Vec<String>,
    },
    ToggleShoppingItem(u64),
    RemoveShoppingItem(u64),
    ClearShoppingList,
    SelectFitnessLevel(FitnessLevel),
    RefreshWorkouts,
    RefreshMotivation,
    DismissNotification,
    Quit,
}

// ---------------------------------------------------------------------------
// app -> TUI
// ---------------------------------------------------------------------------

/// Everything the TUI renders from tracked data.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
    pub today: NaiveDate,
    pub profile: UserProfile,
    pub daily_log: DailyLog,
    /// Newest first.
    pub exercises: Vec<ExerciseEntry>,
    /// Newest first.
    pub journal: Vec<JournalEntry>,
    pub shopping: Vec<ShoppingItem>,
    pub weekly: WeeklySummary,
    /// Chronological weigh-ins.
    pub weight_history: Vec<(NaiveDate, f64)>,
    /// False when no API key is configured.
    pub llm_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Snapshot(Box<AppSnapshot>),
    MotivationStarted,
    MotivationToken(String),
    /// Final sentence; replaces whatever was streamed.
    MotivationComplete(String),
    RecipesLoading(MealType),
    RecipesLoaded {
        meal: MealType,
        recipes: Vec<Recipe>,
    },
    RecipesFailed(String),
    CustomRecipeLoading,
    /// `None` when the model's answer could not be used.
    CustomRecipeLoaded(Option<Recipe>),
    CustomRecipeFailed(String),
    WorkoutsLoading(FitnessLevel),
    WorkoutsLoaded {
        level: FitnessLevel,
        workouts: Vec<Workout>,
    },
    WorkoutsFailed(String),
    Notification(Notification),
    NotificationCleared,
}

// ---------------------------------------------------------------------------
// LLM task -> app
// ---------------------------------------------------------------------------

/// Results from spawned LLM tasks. Each carries the generation of the
/// request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmEvent {
    MotivationToken {
        text: String,
        generation: u64,
    },
    MotivationComplete {
        text: String,
        generation: u64,
    },
    Recipes {
        meal: MealType,
        result: Result<Vec<Recipe>, String>,
        generation: u64,
    },
    CustomRecipe {
        result: Result<Option<Recipe>, String>,
        generation: u64,
    },
    Workouts {
        level: FitnessLevel,
        result: Result<Vec<Workout>, String>,
        generation: u64,
    },
}

impl LlmEvent {
    pub fn generation(&self) -> u64 {
        match self {
            LlmEvent::MotivationToken { generation, .. }
            | LlmEvent::MotivationComplete { generation, .. }
            | LlmEvent::Recipes { generation, .. }
            | LlmEvent::CustomRecipe { generation, .. }
            | LlmEvent::Workouts { generation, .. } => *generation,
        }
    }
}
