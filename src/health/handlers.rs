use anyhow::Context;
use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use super::dto::{HealthProfileResponse, PutHealthProfileRequest};
use super::{repo, services::normalize_conditions};
use crate::{auth::services::AuthUser, error::AppResult, state::AppState};

pub fn health_profile_routes() -> Router<AppState> {
    Router::new().route(
        "/health-profile",
        get(get_health_profile).put(put_health_profile),
    )
}

#[instrument(skip(state))]
pub async fn get_health_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<HealthProfileResponse>> {
    let profile = repo::find(&state.db, user_id)
        .await?
        .map(|p| HealthProfileResponse {
            conditions: p.conditions,
            goal: p.goal,
        })
        .unwrap_or_default();
    Ok(Json(profile))
}

#[instrument(skip(state, body))]
pub async fn put_health_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<PutHealthProfileRequest>,
) -> AppResult<Json<HealthProfileResponse>> {
    let conditions = normalize_conditions(body.conditions);
    let goal = body.goal.trim().to_string();

    let mut conn = state.db.acquire().await.context("acquire connection")?;
    repo::upsert(&mut conn, user_id, &conditions, &goal).await?;
    info!(%user_id, conditions = conditions.len(), "health profile replaced");

    Ok(Json(HealthProfileResponse { conditions, goal }))
}
