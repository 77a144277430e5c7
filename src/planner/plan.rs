use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::pool::{normalize_name, IngredientPool};
use crate::recipes::source::{
    instructions_or_sentinel, Ingredient, MealSlot, RecipeQuery, RecipeSource, RecipeSourceError,
};

/// A recipe chosen for one slot, with ingredient names normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedMeal {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub used_ingredients: Vec<Ingredient>,
    pub missed_ingredients: Vec<Ingredient>,
    pub instructions: String,
}

/// One planning day; `None` marks a slot the source had nothing for.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayPlan {
    pub breakfast: Option<PlannedMeal>,
    pub lunch: Option<PlannedMeal>,
    pub dinner: Option<PlannedMeal>,
}

impl DayPlan {
    pub fn get(&self, slot: MealSlot) -> Option<&PlannedMeal> {
        match slot {
            MealSlot::Breakfast => self.breakfast.as_ref(),
            MealSlot::Lunch => self.lunch.as_ref(),
            MealSlot::Dinner => self.dinner.as_ref(),
        }
    }

    fn set(&mut self, slot: MealSlot, meal: Option<PlannedMeal>) {
        match slot {
            MealSlot::Breakfast => self.breakfast = meal,
            MealSlot::Lunch => self.lunch = meal,
            MealSlot::Dinner => self.dinner = meal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub meal_plan: Vec<DayPlan>,
    pub leftover_ingredients: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("days must be a positive integer")]
    InvalidDays,

    #[error("recipe search failed on day {day} ({slot})")]
    Search {
        day: u32,
        slot: MealSlot,
        #[source]
        source: RecipeSourceError,
    },
}

fn normalized(ingredients: Vec<Ingredient>) -> Vec<Ingredient> {
    ingredients
        .into_iter()
        .map(|i| Ingredient {
            name: normalize_name(&i.name),
            ..i
        })
        .collect()
}

/// Plans `days` days of breakfast, lunch and dinner from `pool`.
///
/// Slots run strictly in order: each search sees the pool left by the slot
/// before it, and a chosen recipe's used ingredients are removed before the
/// next slot. A failed search aborts the whole plan; a failed instructions
/// lookup only degrades that meal.
pub async fn plan(
    days: u32,
    pool: IngredientPool,
    intolerances: &[String],
    source: &dyn RecipeSource,
) -> Result<MealPlan, PlanError> {
    if days == 0 {
        return Err(PlanError::InvalidDays);
    }

    let mut pool = pool;
    let mut meal_plan = Vec::with_capacity(days as usize);

    for day in 0..days {
        let mut day_meals = DayPlan::default();

        for slot in MealSlot::ALL {
            debug!(day, %slot, pool_size = pool.len(), "planning slot");
            let query = RecipeQuery::new(pool.names(), intolerances, 1).with_meal_type(slot);
            let candidates = source
                .find_by_ingredients(&query)
                .await
                .map_err(|e| PlanError::Search {
                    day,
                    slot,
                    source: e,
                })?;

            let Some(top) = candidates.into_iter().next() else {
                day_meals.set(slot, None);
                continue;
            };

            let used_ingredients = normalized(top.used_ingredients);
            let missed_ingredients = normalized(top.missed_ingredients);
            let instructions = instructions_or_sentinel(source, top.id).await;

            let used_names: Vec<&str> = used_ingredients.iter().map(|i| i.name.as_str()).collect();
            pool = pool.remove(&used_names);

            day_meals.set(
                slot,
                Some(PlannedMeal {
                    id: top.id,
                    title: top.title,
                    image: top.image,
                    used_ingredients,
                    missed_ingredients,
                    instructions,
                }),
            );
        }

        meal_plan.push(day_meals);
    }

    let planned: usize = meal_plan
        .iter()
        .map(|day| MealSlot::ALL.iter().filter(|slot| day.get(**slot).is_some()).count())
        .sum();
    info!(days, planned, leftover = pool.len(), "meal plan built");
    Ok(MealPlan {
        meal_plan,
        leftover_ingredients: pool.into_names(),
    })
}
