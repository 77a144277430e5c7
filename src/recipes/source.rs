use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Returned in place of instructions whenever the detail lookup fails.
pub const INSTRUCTIONS_NOT_AVAILABLE: &str = "Instructions not available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    /// Fixed order in which a planning day is filled.
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

/// One search hit, already ranked by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCandidate {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub used_ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub missed_ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeQuery {
    /// Comma-joined ingredient names.
    pub ingredients: String,
    /// Comma-joined intolerance labels.
    pub intolerances: String,
    pub count: u32,
    pub meal_type: Option<MealSlot>,
}

impl RecipeQuery {
    pub fn new(ingredients: &[String], intolerances: &[String], count: u32) -> Self {
        Self {
            ingredients: ingredients.join(","),
            intolerances: intolerances.join(","),
            count,
            meal_type: None,
        }
    }

    pub fn with_meal_type(mut self, slot: MealSlot) -> Self {
        self.meal_type = Some(slot);
        self
    }
}

#[derive(Debug, Error)]
pub enum RecipeSourceError {
    #[error("recipe api request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("recipe api returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("no instructions for recipe {0}")]
    MissingInstructions(i64),
}

#[async_trait]
pub trait RecipeSource: Send + Sync {
    async fn find_by_ingredients(
        &self,
        query: &RecipeQuery,
    ) -> Result<Vec<RecipeCandidate>, RecipeSourceError>;

    async fn instructions(&self, recipe_id: i64) -> Result<String, RecipeSourceError>;
}

/// Looks up instructions, degrading to [`INSTRUCTIONS_NOT_AVAILABLE`] on any failure.
pub async fn instructions_or_sentinel(source: &dyn RecipeSource, recipe_id: i64) -> String {
    match source.instructions(recipe_id).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, recipe_id, "instructions lookup failed");
            INSTRUCTIONS_NOT_AVAILABLE.to_string()
        }
    }
}
