use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use super::dto::{RecipeListQuery, RecipeListResponse};
use super::listing::{list_recipes, list_safe_recipes};
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    health::services::intolerances,
    inventory::{merge::parse_items, repo as inventory_repo},
    planner::pool::IngredientPool,
    state::AppState,
};

const MAX_LIST_COUNT: u32 = 100;

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(get_recipes))
        .route("/recipes/safe", get(get_safe_recipes))
}

/// Normalized ingredient names for a listing: the explicit subset if given,
/// else the user's whole inventory.
pub(crate) async fn resolve_ingredients(
    state: &AppState,
    user_id: Uuid,
    explicit: Option<&str>,
) -> AppResult<Vec<String>> {
    let pool = match explicit {
        Some(raw) => {
            let items = parse_items(raw);
            if items.is_empty() {
                return Err(AppError::validation("ingredients must not be empty"));
            }
            IngredientPool::from_inventory(items)
        }
        None => {
            let items = inventory_repo::load(&state.db, user_id)
                .await?
                .unwrap_or_default();
            IngredientPool::from_inventory(items)
        }
    };

    if pool.is_empty() {
        return Err(AppError::validation("No ingredients available"));
    }
    Ok(pool.into_names())
}

fn resolve_count(state: &AppState, requested: Option<u32>) -> AppResult<u32> {
    let count = requested.unwrap_or(state.config.recipes.list_count);
    if count == 0 || count > MAX_LIST_COUNT {
        return Err(AppError::validation(format!(
            "number must be between 1 and {MAX_LIST_COUNT}"
        )));
    }
    Ok(count)
}

#[instrument(skip(state))]
pub async fn get_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<RecipeListQuery>,
) -> AppResult<Json<RecipeListResponse>> {
    let count = resolve_count(&state, query.number)?;
    let ingredients = resolve_ingredients(&state, user_id, query.ingredients.as_deref()).await?;

    let recipes = list_recipes(state.recipes.as_ref(), &ingredients, count)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "recipe listing failed");
            AppError::upstream("Failed to fetch recipes", e)
        })?;

    Ok(Json(RecipeListResponse {
        ingredients,
        recipes,
    }))
}

#[instrument(skip(state))]
pub async fn get_safe_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<RecipeListQuery>,
) -> AppResult<Json<RecipeListResponse>> {
    let count = resolve_count(&state, query.number)?;
    let ingredients = resolve_ingredients(&state, user_id, query.ingredients.as_deref()).await?;
    let intolerances = intolerances(&state.db, user_id).await?;

    let recipes = list_safe_recipes(state.recipes.as_ref(), &ingredients, &intolerances, count)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "safe recipe listing failed");
            AppError::upstream("Failed to fetch recipes", e)
        })?;

    Ok(Json(RecipeListResponse {
        ingredients,
        recipes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_ingredients_are_normalized() {
        let state = AppState::fake();
        let names = resolve_ingredients(&state, Uuid::new_v4(), Some("Eggs, ,Tomatoes"))
            .await
            .unwrap();
        assert_eq!(names, vec!["egg", "tomato"]);
    }

    #[tokio::test]
    async fn blank_explicit_ingredients_are_rejected() {
        let state = AppState::fake();
        let err = resolve_ingredients(&state, Uuid::new_v4(), Some(" , "))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ingredients must not be empty");
    }

    #[tokio::test]
    async fn count_defaults_and_bounds() {
        let state = AppState::fake();
        assert_eq!(resolve_count(&state, None).unwrap(), 10);
        assert_eq!(resolve_count(&state, Some(3)).unwrap(), 3);
        assert!(resolve_count(&state, Some(0)).is_err());
        assert!(resolve_count(&state, Some(101)).is_err());
    }
}
