use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use super::dto::MealPlanQuery;
use super::plan::{plan, MealPlan, PlanError};
use super::pool::IngredientPool;
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    health::services::intolerances,
    inventory::repo as inventory_repo,
    state::AppState,
};

pub fn planner_routes() -> Router<AppState> {
    Router::new().route("/meal-plan", get(get_meal_plan))
}

/// Day count from the query string: default 1, at most `max`.
pub fn parse_days(raw: Option<&str>, max: u32) -> AppResult<u32> {
    let days = match raw.map(str::trim) {
        None | Some("") => 1,
        Some(s) => s
            .parse::<u32>()
            .map_err(|_| AppError::validation("days must be a positive integer"))?,
    };
    if days == 0 {
        return Err(AppError::validation("days must be a positive integer"));
    }
    if days > max {
        return Err(AppError::validation(format!("days must be at most {max}")));
    }
    Ok(days)
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::InvalidDays => AppError::validation(e.to_string()),
            PlanError::Search { ref source, .. } => AppError::Fatal {
                context: "Failed to generate meal plan".into(),
                details: format!("{e}: {source}"),
            },
        }
    }
}

/// GET /meal-plan?days=N
#[instrument(skip(state))]
pub async fn get_meal_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<MealPlanQuery>,
) -> AppResult<Json<MealPlan>> {
    let days = parse_days(query.days.as_deref(), state.config.planner_max_days)?;

    let items = inventory_repo::load(&state.db, user_id)
        .await?
        .unwrap_or_default();
    let pool = IngredientPool::from_inventory(items);
    let intolerances = intolerances(&state.db, user_id).await?;

    let meal_plan = plan(days, pool, &intolerances, state.recipes.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, days, "meal planning failed");
            AppError::from(e)
        })?;

    Ok(Json(meal_plan))
}
