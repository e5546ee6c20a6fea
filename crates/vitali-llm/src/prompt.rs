// Prompt templates and response schemas for recipe, workout, and motivation
// requests.
//
// Recipe and workout prompts ask for JSON constrained by a schema so the
// response can be deserialized straight into the core model types.

use serde_json::{json, Value};

use vitali_core::model::{DailyLog, FitnessLevel, MealType, UserProfile};

/// Recipes requested per meal type.
pub const RECIPE_COUNT: usize = 6;

/// Routines requested per fitness level.
pub const WORKOUT_COUNT: usize = 3;

const UNSPECIFIED: &str = "None specified";

fn or_unspecified(s: &str) -> &str {
    let s = s.trim();
    if s.is_empty() {
        UNSPECIFIED
    } else {
        s
    }
}

fn dietary_context(preferences: &str, restrictions: &str) -> String {
    format!(
        "Preferences: {}.\nRestrictions: {}.",
        or_unspecified(preferences),
        or_unspecified(restrictions)
    )
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// Prompt for a batch of budget-friendly weight-loss recipes.
pub fn recipes_prompt(meal: MealType, preferences: &str, restrictions: &str) -> String {
    format!(
        "Suggest {RECIPE_COUNT} varied, healthy {meal} recipes for weight loss.\n\
         CRITICAL: Prioritize AFFORDABLE, CHEAP ingredients that are COMMON in ordinary \
         supermarkets (e.g. eggs, chicken, seasonal vegetables, brown rice, beans, oats, bananas).\n\
         AVOID: expensive or \"gourmet\" ingredients such as salmon, asparagus, quinoa, \
         almond flour, chia seeds or costly oils.\n\
         Take this user profile into account:\n{context}\n\
         Make sure the recipes respect the restrictions and match the preferences.\n\
         Include an approximate calorie count. Set \"type\" to \"{meal}\". Return only JSON.",
        meal = meal.as_str(),
        context = dietary_context(preferences, restrictions),
    )
}

/// Prompt for a single recipe built from a free-text request.
pub fn custom_recipe_prompt(request: &str, preferences: &str, restrictions: &str) -> String {
    format!(
        "Create a healthy recipe based on the following request: \"{request}\".\n\
         Take this profile into account:\n{context}\n\
         Use simple, cheap ingredients. Set \"type\" to one of breakfast, lunch, dinner or snack. \
         Return only JSON following the recipe schema.",
        request = request.trim(),
        context = dietary_context(preferences, restrictions),
    )
}

fn recipe_object_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "calories": { "type": "STRING" },
            "ingredients": { "type": "ARRAY", "items": { "type": "STRING" } },
            "instructions": { "type": "ARRAY", "items": { "type": "STRING" } },
            "type": { "type": "STRING" }
        },
        "required": ["name", "calories", "ingredients", "instructions", "type"]
    })
}

/// Schema for a single recipe.
pub fn recipe_schema() -> Value {
    recipe_object_schema()
}

/// Schema for a list of recipes.
pub fn recipe_list_schema() -> Value {
    json!({ "type": "ARRAY", "items": recipe_object_schema() })
}

// ---------------------------------------------------------------------------
// Workouts
// ---------------------------------------------------------------------------

pub fn workouts_prompt(level: FitnessLevel) -> String {
    format!(
        "Suggest {WORKOUT_COUNT} short exercise routines for someone at a {level} fitness level. \
         Focus on fat burning and exercises that can be done at home without equipment. \
         Use low, medium or high for \"intensity\". Return only JSON.",
        level = level.label().to_lowercase(),
    )
}

pub fn workout_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "duration": { "type": "STRING" },
                "intensity": { "type": "STRING" },
                "description": { "type": "STRING" },
                "exercises": { "type": "ARRAY", "items": { "type": "STRING" } }
            },
            "required": ["title", "duration", "intensity", "description", "exercises"]
        }
    })
}

// ---------------------------------------------------------------------------
// Motivation
// ---------------------------------------------------------------------------

pub fn motivation_prompt(name: &str, progress: &str) -> String {
    format!(
        "Write a short, powerful and inspiring motivational sentence for {name}. \
         Their progress so far: {progress}. \
         The sentence should focus on discipline, resilience or self-love. \
         Reply with the sentence only."
    )
}

/// One-line progress summary fed into the motivation prompt.
pub fn progress_summary(profile: &UserProfile, today: &DailyLog) -> String {
    format!(
        "Goal: {:.1} kg, Current: {:.1} kg, Water today: {} of {} ml",
        profile.target_weight_kg,
        profile.weight_kg,
        today.water_intake_ml,
        profile.daily_water_goal_ml
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
