// Persisted and generated records: profile, daily log, exercises, journal,
// shopping list, and the AI-generated recipe/workout shapes.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// User profile
// ---------------------------------------------------------------------------

/// The user's profile and settings. Stored as a single blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    /// Height in centimeters.
    pub height_cm: f64,
    /// Current body weight in kilograms. Used for calorie estimation.
    pub weight_kg: f64,
    pub target_weight_kg: f64,
    /// Daily water goal in milliliters.
    pub daily_water_goal_ml: u32,
    pub water_reminders_enabled: bool,
    /// Minutes between water reminders.
    pub water_reminder_interval_min: u32,
    pub dietary_preferences: String,
    pub dietary_restrictions: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            name: "User".to_string(),
            age: 28,
            height_cm: 170.0,
            weight_kg: 85.0,
            target_weight_kg: 75.0,
            daily_water_goal_ml: 2500,
            water_reminders_enabled: false,
            water_reminder_interval_min: 60,
            dietary_preferences: String::new(),
            dietary_restrictions: String::new(),
        }
    }
}

/// A partial profile update. Only the `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub target_weight_kg: Option<f64>,
    pub daily_water_goal_ml: Option<u32>,
    pub water_reminders_enabled: Option<bool>,
    pub water_reminder_interval_min: Option<u32>,
    pub dietary_preferences: Option<String>,
    pub dietary_restrictions: Option<String>,
}

impl ProfileUpdate {
    /// True when the update touches the fields recipe suggestions depend on.
    pub fn touches_diet(&self) -> bool {
        self.dietary_preferences.is_some() || self.dietary_restrictions.is_some()
    }

    /// True when the update touches the water reminder schedule.
    pub fn touches_reminders(&self) -> bool {
        self.water_reminders_enabled.is_some() || self.water_reminder_interval_min.is_some()
    }
}

impl UserProfile {
    /// Overwrite the fields present in `update`.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.age {
            self.age = v;
        }
        if let Some(v) = update.height_cm {
            self.height_cm = v;
        }
        if let Some(v) = update.weight_kg {
            self.weight_kg = v;
        }
        if let Some(v) = update.target_weight_kg {
            self.target_weight_kg = v;
        }
        if let Some(v) = update.daily_water_goal_ml {
            self.daily_water_goal_ml = v;
        }
        if let Some(v) = update.water_reminders_enabled {
            self.water_reminders_enabled = v;
        }
        if let Some(v) = update.water_reminder_interval_min {
            self.water_reminder_interval_min = v;
        }
        if let Some(v) = update.dietary_preferences {
            self.dietary_preferences = v;
        }
        if let Some(v) = update.dietary_restrictions {
            self.dietary_restrictions = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Daily log
// ---------------------------------------------------------------------------

/// One calendar day's water intake and calorie totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub water_intake_ml: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_consumed: Option<u32>,
    #[serde(default)]
    pub calories_burned: u32,
}

impl DailyLog {
    pub fn new(date: NaiveDate) -> Self {
        DailyLog {
            date,
            water_intake_ml: 0,
            calories_consumed: None,
            calories_burned: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Exercise
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    Moderate,
    Intense,
}

impl Intensity {
    pub const ALL: [Intensity; 3] = [Intensity::Light, Intensity::Moderate, Intensity::Intense];

    pub fn label(self) -> &'static str {
        match self {
            Intensity::Light => "Light",
            Intensity::Moderate => "Moderate",
            Intensity::Intense => "Intense",
        }
    }

    /// Next intensity in the cycle, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Intensity::Light => Intensity::Moderate,
            Intensity::Moderate => Intensity::Intense,
            Intensity::Intense => Intensity::Light,
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A logged exercise session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub id: u64,
    pub date: NaiveDate,
    /// Free-form activity name as entered (e.g. "Cycling").
    pub kind: String,
    pub duration_min: u32,
    pub intensity: Intensity,
    pub calories_burned: u32,
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Determined,
    Tired,
    Discouraged,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Determined, Mood::Tired, Mood::Discouraged];

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Determined => "Focused",
            Mood::Tired => "Tired",
            Mood::Discouraged => "Down",
        }
    }
}

/// A free-text journal note with an optional weigh-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    pub date: NaiveDate,
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    pub mood: Mood,
}

// ---------------------------------------------------------------------------
// Shopping list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    /// Name of the recipe this ingredient came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_name: Option<String>,
}

// ---------------------------------------------------------------------------
// AI-generated content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snacks",
        }
    }

    /// Lowercase name used in prompts and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl FromStr for MealType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" | "supper" => Ok(MealType::Dinner),
            "snack" | "snacks" => Ok(MealType::Snack),
            _ => Err(()),
        }
    }
}

/// A recipe suggestion. `meal` is `None` when the model returned a meal type
/// we don't recognize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    /// Approximate calories as free text (e.g. "350 kcal").
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub meal: Option<MealType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    pub const ALL: [FitnessLevel; 3] = [
        FitnessLevel::Beginner,
        FitnessLevel::Intermediate,
        FitnessLevel::Advanced,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "Beginner",
            FitnessLevel::Intermediate => "Intermediate",
            FitnessLevel::Advanced => "Advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutIntensity {
    Low,
    Medium,
    High,
}

impl WorkoutIntensity {
    pub fn label(self) -> &'static str {
        match self {
            WorkoutIntensity::Low => "Low",
            WorkoutIntensity::Medium => "Medium",
            WorkoutIntensity::High => "High",
        }
    }
}

impl FromStr for WorkoutIntensity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "light" | "easy" => Ok(WorkoutIntensity::Low),
            "medium" | "moderate" => Ok(WorkoutIntensity::Medium),
            "high" | "intense" | "hard" => Ok(WorkoutIntensity::High),
            _ => Err(()),
        }
    }
}

/// A short home workout routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub title: String,
    /// Duration as free text (e.g. "20 min").
    #[serde(default)]
    pub duration: String,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub intensity: Option<WorkoutIntensity>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<String>,
}

/// Deserialize an optional string and parse it, mapping anything
/// unrecognized to `None` instead of failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_defaults() {
        let p = UserProfile::default();
        assert_eq!(p.name, "User");
        assert_eq!(p.age, 28);
        assert_eq!(p.daily_water_goal_ml, 2500);
        assert!(!p.water_reminders_enabled);
        assert_eq!(p.water_reminder_interval_min, 60);
        assert!((p.weight_kg - 85.0).abs() < f64::EPSILON);
        assert!((p.target_weight_kg - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn profile_update_only_touches_given_fields() {
        let mut p = UserProfile::default();
        p.apply(ProfileUpdate {
            dietary_preferences: Some("vegetarian".into()),
            daily_water_goal_ml: Some(3000),
            ..Default::default()
        });
        assert_eq!(p.dietary_preferences, "vegetarian");
        assert_eq!(p.daily_water_goal_ml, 3000);
        assert_eq!(p.name, "User");
        assert!(p.dietary_restrictions.is_empty());
    }

    #[test]
    fn profile_update_flags() {
        let diet = ProfileUpdate {
            dietary_restrictions: Some("no gluten".into()),
            ..Default::default()
        };
        assert!(diet.touches_diet());
        assert!(!diet.touches_reminders());

        let reminders = ProfileUpdate {
            water_reminder_interval_min: Some(30),
            ..Default::default()
        };
        assert!(reminders.touches_reminders());
        assert!(!reminders.touches_diet());
    }

    #[test]
    fn profile_missing_fields_take_defaults() {
        let p: UserProfile = serde_json::from_str(r#"{"name":"Ana","weight_kg":70.5}"#).unwrap();
        assert_eq!(p.name, "Ana");
        assert!((p.weight_kg - 70.5).abs() < f64::EPSILON);
        assert_eq!(p.daily_water_goal_ml, 2500);
    }

    #[test]
    fn intensity_cycles() {
        assert_eq!(Intensity::Light.next(), Intensity::Moderate);
        assert_eq!(Intensity::Intense.next(), Intensity::Light);
    }

    #[test]
    fn recipe_parses_with_unknown_meal_type() {
        let json = r#"{
            "name": "Egg scramble",
            "calories": "300 kcal",
            "ingredients": ["2 eggs", "tomato"],
            "instructions": ["Beat eggs", "Cook"],
            "type": "brunch"
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.name, "Egg scramble");
        assert_eq!(recipe.ingredients.len(), 2);
        assert!(recipe.meal.is_none());
    }

    #[test]
    fn recipe_parses_meal_type_case_insensitively() {
        let json = r#"{"name":"Oats","calories":"250","ingredients":[],"instructions":[],"type":"Breakfast"}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.meal, Some(MealType::Breakfast));
    }

    #[test]
    fn workout_intensity_aliases() {
        let json = r#"{"title":"HIIT","duration":"15 min","intensity":"Intense","description":"","exercises":["burpees"]}"#;
        let w: Workout = serde_json::from_str(json).unwrap();
        assert_eq!(w.intensity, Some(WorkoutIntensity::High));
    }

    #[test]
    fn journal_entry_without_weight_omits_field() {
        let entry = JournalEntry {
            id: 1,
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            note: "rest day".into(),
            weight_kg: None,
            mood: Mood::Tired,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("weight_kg"));
        assert!(json.contains("\"tired\""));
    }
}
