// In-memory tracker state and the operations that mutate it.
//
// Each mutating operation reports the `Section`s it changed so the caller
// can overwrite exactly those blobs in the store.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::activity::{estimate_calories, MAX_DURATION_MIN};
use crate::model::{
    DailyLog, ExerciseEntry, Intensity, JournalEntry, Mood, ProfileUpdate, ShoppingItem,
    UserProfile,
};
use crate::stats::calories_burned_on;

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("duration must be between 1 and 1440 minutes")]
    InvalidDuration,

    #[error("journal note must not be empty")]
    EmptyNote,

    #[error("water amount must be greater than zero")]
    InvalidWaterAmount,

    #[error("no shopping item with id {0}")]
    ItemNotFound(u64),
}

/// A persisted blob that an operation modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Profile,
    DailyLog,
    Exercises,
    Journal,
    Shopping,
}

/// All locally tracked data.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracker {
    pub profile: UserProfile,
    /// Today's log. Replaced on day rollover.
    pub daily_log: DailyLog,
    /// Newest first.
    pub exercises: Vec<ExerciseEntry>,
    /// Newest first.
    pub journal: Vec<JournalEntry>,
    /// Insertion order.
    pub shopping: Vec<ShoppingItem>,
}

impl Tracker {
    /// A fresh tracker with default profile and empty collections.
    pub fn new(today: NaiveDate) -> Self {
        Tracker {
            profile: UserProfile::default(),
            daily_log: DailyLog::new(today),
            exercises: Vec::new(),
            journal: Vec::new(),
            shopping: Vec::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.daily_log.date
    }

    /// Recompute today's calories burned from the exercise list.
    pub fn refresh_calories_burned(&mut self) {
        self.daily_log.calories_burned = calories_burned_on(&self.exercises, self.daily_log.date);
    }

    pub fn add_water(&mut self, amount_ml: u32) -> Result<Vec<Section>, TrackerError> {
        if amount_ml == 0 {
            return Err(TrackerError::InvalidWaterAmount);
        }
        self.daily_log.water_intake_ml = self.daily_log.water_intake_ml.saturating_add(amount_ml);
        info!(
            "Water +{}ml (total {}ml)",
            amount_ml, self.daily_log.water_intake_ml
        );
        Ok(vec![Section::DailyLog])
    }

    /// Log an exercise session for `date`, estimating calories from the
    /// profile's current weight.
    pub fn log_exercise(
        &mut self,
        kind: &str,
        duration_min: u32,
        intensity: Intensity,
        date: NaiveDate,
    ) -> Result<(ExerciseEntry, Vec<Section>), TrackerError> {
        if duration_min == 0 || duration_min > MAX_DURATION_MIN {
            return Err(TrackerError::InvalidDuration);
        }
        let calories_burned =
            estimate_calories(self.profile.weight_kg, kind, intensity, duration_min);
        let entry = ExerciseEntry {
            id: next_id(self.exercises.iter().map(|e| e.id)),
            date,
            kind: kind.trim().to_string(),
            duration_min,
            intensity,
            calories_burned,
        };
        info!(
            "Logged {} ({}) {} min: {} kcal",
            entry.kind, entry.intensity, entry.duration_min, entry.calories_burned
        );
        self.exercises.insert(0, entry.clone());

        let mut changed = vec![Section::Exercises];
        let before = self.daily_log.calories_burned;
        self.refresh_calories_burned();
        if self.daily_log.calories_burned != before {
            changed.push(Section::DailyLog);
        }
        Ok((entry, changed))
    }

    /// Add a journal entry. A positive weight also becomes the profile's
    /// current weight.
    pub fn add_journal_entry(
        &mut self,
        note: &str,
        weight_kg: Option<f64>,
        mood: Mood,
        date: NaiveDate,
    ) -> Result<Vec<Section>, TrackerError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(TrackerError::EmptyNote);
        }
        let weight_kg = weight_kg.filter(|w| w.is_finite() && *w > 0.0);
        let entry = JournalEntry {
            id: next_id(self.journal.iter().map(|j| j.id)),
            date,
            note: note.to_string(),
            weight_kg,
            mood,
        };
        self.journal.insert(0, entry);

        let mut changed = vec![Section::Journal];
        if let Some(w) = weight_kg {
            info!("Weigh-in recorded: {:.1} kg", w);
            self.profile.weight_kg = w;
            changed.push(Section::Profile);
        }
        Ok(changed)
    }

    /// Append ingredients to the shopping list, optionally tagged with the
    /// recipe they came from. Blank names are skipped. Returns the number of
    /// items added.
    pub fn add_to_shopping_list(
        &mut self,
        items: &[String],
        recipe_name: Option<&str>,
    ) -> (usize, Vec<Section>) {
        let mut id = next_id(self.shopping.iter().map(|i| i.id));
        let mut added = 0;
        for name in items {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            self.shopping.push(ShoppingItem {
                id,
                name: name.to_string(),
                completed: false,
                recipe_name: recipe_name.map(String::from),
            });
            id += 1;
            added += 1;
        }
        if added == 0 {
            return (0, Vec::new());
        }
        info!("Added {} item(s) to the shopping list", added);
        (added, vec![Section::Shopping])
    }

    pub fn toggle_shopping_item(&mut self, id: u64) -> Result<Vec<Section>, TrackerError> {
        let item = self
            .shopping
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(TrackerError::ItemNotFound(id))?;
        item.completed = !item.completed;
        Ok(vec![Section::Shopping])
    }

    pub fn remove_shopping_item(&mut self, id: u64) -> Result<Vec<Section>, TrackerError> {
        let before = self.shopping.len();
        self.shopping.retain(|i| i.id != id);
        if self.shopping.len() == before {
            return Err(TrackerError::ItemNotFound(id));
        }
        Ok(vec![Section::Shopping])
    }

    pub fn clear_shopping_list(&mut self) -> Vec<Section> {
        if self.shopping.is_empty() {
            return Vec::new();
        }
        self.shopping.clear();
        vec![Section::Shopping]
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) -> Vec<Section> {
        self.profile.apply(update);
        vec![Section::Profile]
    }

    /// Switch to a new daily log when the calendar day has changed.
    ///
    /// `stored` is the log already persisted for `today`, if any. Returns
    /// `true` when a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate, stored: Option<DailyLog>) -> bool {
        if self.daily_log.date == today {
            return false;
        }
        info!("Day rollover: {} -> {}", self.daily_log.date, today);
        self.daily_log = stored.unwrap_or_else(|| DailyLog::new(today));
        self.refresh_calories_burned();
        true
    }
}

/// Next id for a collection: one past the largest existing id.
fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |m| m + 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
