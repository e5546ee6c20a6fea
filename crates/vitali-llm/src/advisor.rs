// High-level advice requests: recipes, custom recipes, workouts, and the
// streamed motivation quote. Wraps `LlmClient` with the configured sampling
// settings and turns raw model output into core model types.

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{info, warn};

use vitali_core::config::{Config, LlmConfig};
use vitali_core::model::{FitnessLevel, MealType, Recipe, Workout};

use crate::client::{GenerationRequest, LlmClient};
use crate::prompt;

/// Shown when the model answers with nothing.
pub const EMPTY_MOTIVATION_FALLBACK: &str = "Your only competition is who you were yesterday.";

/// Shown when the motivation request fails.
pub const FAILED_MOTIVATION_FALLBACK: &str =
    "A journey of a thousand miles begins with a single step.";

#[derive(Clone)]
pub struct Advisor {
    client: LlmClient,
    settings: LlmConfig,
}

impl Advisor {
    pub fn new(client: LlmClient, settings: LlmConfig) -> Self {
        Advisor { client, settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Advisor::new(LlmClient::from_config(config), config.llm.clone())
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_active()
    }

    /// Ask for a batch of recipes for `meal`.
    ///
    /// Transport failures are errors; output that doesn't parse yields an
    /// empty list. Recipes missing a meal type inherit `meal`.
    pub async fn suggest_recipes(
        &self,
        meal: MealType,
        preferences: &str,
        restrictions: &str,
    ) -> anyhow::Result<Vec<Recipe>> {
        let request = GenerationRequest::new(prompt::recipes_prompt(meal, preferences, restrictions))
            .temperature(self.settings.recipe_temperature)
            .max_output_tokens(self.settings.max_output_tokens)
            .json_schema(prompt::recipe_list_schema());

        let raw = self.client.generate(request).await?;
        let mut recipes: Vec<Recipe> = parse_json_or_default(&raw, "recipes");
        for r in &mut recipes {
            r.meal.get_or_insert(meal);
        }
        info!(meal = meal.as_str(), count = recipes.len(), "recipes received");
        Ok(recipes)
    }

    /// Build one recipe from a free-text request. `Ok(None)` when the output
    /// can't be parsed.
    pub async fn create_recipe(
        &self,
        request: &str,
        preferences: &str,
        restrictions: &str,
    ) -> anyhow::Result<Option<Recipe>> {
        let request =
            GenerationRequest::new(prompt::custom_recipe_prompt(request, preferences, restrictions))
                .temperature(self.settings.recipe_temperature)
                .max_output_tokens(self.settings.max_output_tokens)
                .json_schema(prompt::recipe_schema());

        let raw = self.client.generate(request).await?;
        let recipe = parse_json::<Recipe>(&raw)
            .map_err(|e| warn!("failed to parse custom recipe: {e}"))
            .ok();
        Ok(recipe)
    }

    pub async fn suggest_workouts(&self, level: FitnessLevel) -> anyhow::Result<Vec<Workout>> {
        let request = GenerationRequest::new(prompt::workouts_prompt(level))
            .temperature(self.settings.workout_temperature)
            .max_output_tokens(self.settings.max_output_tokens)
            .json_schema(prompt::workout_list_schema());

        let raw = self.client.generate(request).await?;
        let workouts: Vec<Workout> = parse_json_or_default(&raw, "workouts");
        info!(level = level.label(), count = workouts.len(), "workouts received");
        Ok(workouts)
    }

    /// Stream a motivational sentence, forwarding fragments over `tokens`.
    ///
    /// Always yields a sentence: blank output and failures are replaced by
    /// fixed fallbacks.
    pub async fn stream_motivation(
        &self,
        name: &str,
        progress: &str,
        tokens: mpsc::Sender<String>,
    ) -> String {
        let request = GenerationRequest::new(prompt::motivation_prompt(name, progress))
            .temperature(self.settings.motivation_temperature)
            .max_output_tokens(self.settings.max_output_tokens);

        match self.client.stream(request, tokens).await {
            Ok(text) => finish_motivation(&text),
            Err(e) => {
                warn!("motivation request failed: {e:#}");
                FAILED_MOTIVATION_FALLBACK.to_string()
            }
        }
    }
}

fn finish_motivation(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        EMPTY_MOTIVATION_FALLBACK.to_string()
    } else {
        text.to_string()
    }
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

/// Strip a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

pub fn parse_json<T: DeserializeOwned>(raw: &str) -> serde_json::Result<T> {
    serde_json::from_str(strip_code_fence(raw))
}

fn parse_json_or_default<T: DeserializeOwned + Default>(raw: &str, what: &str) -> T {
    parse_json(raw).unwrap_or_else(|e| {
        warn!("failed to parse {what}: {e}");
        T::default()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
