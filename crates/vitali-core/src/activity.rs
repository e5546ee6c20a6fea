// MET-based calorie estimation for logged exercise.
//
// kcal = MET(activity, intensity) * weight_kg * (duration_minutes / 60),
// rounded to the nearest integer. MET values come from the Compendium of
// Physical Activities.

use crate::model::Intensity;

/// Activity categories with a MET table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Walking,
    Running,
    Cycling,
    Strength,
    Swimming,
    Dance,
    Yoga,
    /// Fallback row for anything we don't recognize.
    Other,
}

/// Longest session that can be logged: one full day.
pub const MAX_DURATION_MIN: u32 = 24 * 60;

/// Activity types offered by the UI, in display order.
pub const ACTIVITY_TYPES: [ActivityType; 8] = [
    ActivityType::Cycling,
    ActivityType::Walking,
    ActivityType::Running,
    ActivityType::Strength,
    ActivityType::Swimming,
    ActivityType::Dance,
    ActivityType::Yoga,
    ActivityType::Other,
];

impl ActivityType {
    /// Resolve a free-form activity name. Matching is case-insensitive and
    /// accepts common aliases; anything else resolves to `Other`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "walking" | "walk" | "hiking" => ActivityType::Walking,
            "running" | "run" | "jogging" => ActivityType::Running,
            "cycling" | "bike" | "biking" | "bicycle" | "spinning" => ActivityType::Cycling,
            "strength" | "weights" | "weightlifting" | "strength training" | "gym" => {
                ActivityType::Strength
            }
            "swimming" | "swim" => ActivityType::Swimming,
            "dance" | "dancing" => ActivityType::Dance,
            "yoga" | "pilates" => ActivityType::Yoga,
            _ => ActivityType::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityType::Walking => "Walking",
            ActivityType::Running => "Running",
            ActivityType::Cycling => "Cycling",
            ActivityType::Strength => "Strength",
            ActivityType::Swimming => "Swimming",
            ActivityType::Dance => "Dance",
            ActivityType::Yoga => "Yoga",
            ActivityType::Other => "Other",
        }
    }

    /// MET multiplier for this activity at the given intensity.
    pub fn met(self, intensity: Intensity) -> f64 {
        let (light, moderate, intense) = match self {
            ActivityType::Walking => (3.0, 4.0, 5.0),
            ActivityType::Running => (8.0, 10.0, 12.5),
            ActivityType::Cycling => (6.0, 8.0, 10.0),
            ActivityType::Strength => (3.5, 5.0, 6.0),
            ActivityType::Swimming => (6.0, 8.0, 11.0),
            ActivityType::Dance => (3.5, 5.0, 7.0),
            ActivityType::Yoga => (2.0, 3.0, 4.0),
            ActivityType::Other => (3.0, 5.0, 7.0),
        };
        match intensity {
            Intensity::Light => light,
            Intensity::Moderate => moderate,
            Intensity::Intense => intense,
        }
    }
}

/// MET lookup by activity name, falling back to the `Other` row.
pub fn met_value(activity: &str, intensity: Intensity) -> f64 {
    ActivityType::from_name(activity).met(intensity)
}

/// Estimate calories burned for a session.
///
/// Returns 0 for a non-positive or non-finite weight.
pub fn estimate_calories(
    weight_kg: f64,
    activity: &str,
    intensity: Intensity,
    duration_min: u32,
) -> u32 {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return 0;
    }
    let met = met_value(activity, intensity);
    let kcal = met * weight_kg * (f64::from(duration_min) / 60.0);
    kcal.round() as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
