use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tracing::{error, instrument};
use uuid::Uuid;

use super::services::{ext_from_mime, presign_picture, replace_profile_picture};
use crate::{
    auth::{repo_types::User, services::AuthUser},
    error::{AppError, AppResult},
    state::AppState,
};

const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub profile_picture_url: Option<String>,
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me)).route(
        "/me/picture",
        put(put_picture).layer(DefaultBodyLimit::max(MAX_PICTURE_BYTES)),
    )
}

async fn load_user(state: &AppState, user_id: Uuid) -> AppResult<User> {
    User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        error!(user_id = %user_id, "user not found");
        AppError::Unauthorized("User not found".into())
    })
}

async fn me_response(state: &AppState, user: User) -> AppResult<MeResponse> {
    let profile_picture_url = match user.profile_picture_key.as_deref() {
        Some(key) => Some(presign_picture(state, key).await?),
        None => None,
    };
    Ok(MeResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        profile_picture_url,
    })
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<MeResponse>> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(me_response(&state, user).await?))
}

/// PUT /me/picture (multipart, field `picture`)
#[instrument(skip(state, mp))]
pub async fn put_picture(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> AppResult<Json<MeResponse>> {
    let mut upload = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        if field.name() == Some("picture") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            upload = Some((data, content_type));
        }
    }

    let Some((data, content_type)) = upload else {
        return Err(AppError::validation("picture is required"));
    };
    if ext_from_mime(&content_type).is_none() {
        return Err(AppError::validation(format!(
            "unsupported image type {content_type}"
        )));
    }

    let user = load_user(&state, user_id).await?;
    replace_profile_picture(&state, &user, data, &content_type).await?;

    let user = load_user(&state, user_id).await?;
    Ok(Json(me_response(&state, user).await?))
}
