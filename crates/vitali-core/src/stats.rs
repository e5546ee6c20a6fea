// Derived figures for the dashboard: progress percentages, daily calorie
// totals, the 7-day summary, and the weight trend.

use chrono::{Duration, NaiveDate};

use crate::model::{DailyLog, ExerciseEntry, JournalEntry, ShoppingItem, UserProfile};

/// Number of calendar days in the weekly window, today included.
pub const WEEK_DAYS: i64 = 7;

/// Group label for shopping items not tied to a recipe.
pub const GENERAL_GROUP: &str = "General";

/// Totals over the last `WEEK_DAYS` days.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeeklySummary {
    pub water_total_ml: u64,
    pub calories_burned: u64,
    /// Mean journal weight in the window (one decimal), or the profile weight
    /// when no weigh-ins were logged.
    pub average_weight_kg: f64,
    pub weigh_ins: usize,
}

/// Water intake as a percentage of the goal, capped at 100.
pub fn water_progress(intake_ml: u32, goal_ml: u32) -> f64 {
    if goal_ml == 0 {
        return 0.0;
    }
    (f64::from(intake_ml) / f64::from(goal_ml) * 100.0).min(100.0)
}

/// Sum of calories burned by exercises logged on `date`. Saturates at
/// `u32::MAX`.
pub fn calories_burned_on(exercises: &[ExerciseEntry], date: NaiveDate) -> u32 {
    exercises
        .iter()
        .filter(|e| e.date == date)
        .fold(0u32, |total, e| total.saturating_add(e.calories_burned))
}

/// First day of the weekly window ending on `today`.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(WEEK_DAYS - 1)
}

fn in_window(date: NaiveDate, today: NaiveDate) -> bool {
    date >= week_start(today) && date <= today
}

/// Compute the 7-day summary.
pub fn weekly_summary(
    daily_logs: &[DailyLog],
    exercises: &[ExerciseEntry],
    journal: &[JournalEntry],
    today: NaiveDate,
    fallback_weight_kg: f64,
) -> WeeklySummary {
    let water_total_ml = daily_logs
        .iter()
        .filter(|l| in_window(l.date, today))
        .map(|l| u64::from(l.water_intake_ml))
        .sum();

    let calories_burned = exercises
        .iter()
        .filter(|e| in_window(e.date, today))
        .map(|e| u64::from(e.calories_burned))
        .sum();

    let weights: Vec<f64> = journal
        .iter()
        .filter(|j| in_window(j.date, today))
        .filter_map(|j| j.weight_kg)
        .filter(|w| *w > 0.0)
        .collect();

    let average_weight_kg = if weights.is_empty() {
        fallback_weight_kg
    } else {
        round_one_decimal(weights.iter().sum::<f64>() / weights.len() as f64)
    };

    WeeklySummary {
        water_total_ml,
        calories_burned,
        average_weight_kg,
        weigh_ins: weights.len(),
    }
}

/// Weigh-ins in chronological order.
///
/// Journal entries are stored newest first; entries without a positive
/// weight are skipped.
pub fn weight_history(journal: &[JournalEntry]) -> Vec<(NaiveDate, f64)> {
    let mut points: Vec<(NaiveDate, f64)> = journal
        .iter()
        .rev()
        .filter_map(|j| j.weight_kg.filter(|w| *w > 0.0).map(|w| (j.date, w)))
        .collect();
    // Stable sort keeps insertion order for same-day weigh-ins.
    points.sort_by_key(|(date, _)| *date);
    points
}

/// Kilograms left to reach the target weight. Zero once reached.
pub fn weight_to_goal(profile: &UserProfile) -> f64 {
    (profile.weight_kg - profile.target_weight_kg).max(0.0)
}

/// Percentage of shopping items checked off. Zero for an empty list.
pub fn shopping_progress(items: &[ShoppingItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let done = items.iter().filter(|i| i.completed).count();
    done as f64 / items.len() as f64 * 100.0
}

/// Group shopping items by originating recipe, in first-seen order.
pub fn group_shopping_items(items: &[ShoppingItem]) -> Vec<(String, Vec<&ShoppingItem>)> {
    let mut groups: Vec<(String, Vec<&ShoppingItem>)> = Vec::new();
    for item in items {
        let key = item.recipe_name.as_deref().unwrap_or(GENERAL_GROUP);
        match groups.iter_mut().find(|(name, _)| name == key) {
            Some((_, members)) => members.push(item),
            None => groups.push((key.to_string(), vec![item])),
        }
    }
    groups
}

fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
