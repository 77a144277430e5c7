use anyhow::Context;
use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, MessageResponse, PublicUser, RefreshRequest,
            ResetRequest, SignupRequest, TokenQuery, UpdatePasswordRequest,
        },
        repo::is_unique_violation,
        repo_types::User,
        services::{
            generate_reset_token, hash_password, is_valid_email, is_valid_username,
            normalize_username, verify_password, AuthUser, JwtKeys, MIN_PASSWORD_LEN,
        },
    },
    error::{AppError, AppResult},
    health::{repo as health_repo, services::normalize_conditions},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/reset", post(request_reset))
        .route(
            "/auth/update-password",
            get(check_reset_token).post(update_password),
        )
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

fn auth_response(keys: &JwtKeys, user: User) -> AppResult<Json<AuthResponse>> {
    let (access_token, refresh_token) = keys.sign_pair(&user).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        AppError::Internal(e)
    })?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let username = normalize_username(&payload.username);
    if !is_valid_username(&username) {
        warn!(%username, "invalid username");
        return Err(AppError::validation(
            "Username must be 3-32 characters of a-z, 0-9, '_', '.', '-'",
        ));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::validation("Password too short"));
    }

    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());
    if let Some(email) = &email {
        if !is_valid_email(email) {
            warn!(%email, "invalid email");
            return Err(AppError::validation("Invalid email"));
        }
    }

    if User::find_by_username(&state.db, &username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(AppError::Conflict(
            "This user already exists. Please login or reset password".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;
    let conditions = normalize_conditions(payload.health_conditions);
    let goal = payload.health_goal.unwrap_or_default().trim().to_string();

    let mut tx = state.db.begin().await.context("begin tx")?;
    let user = match User::create_tx(&mut tx, &username, &hash, email.as_deref()).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(%username, "username taken concurrently");
            return Err(AppError::Conflict(
                "This user already exists. Please login or reset password".into(),
            ));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(AppError::Internal(e));
        }
    };
    health_repo::upsert(&mut tx, user.id, &conditions, &goal).await?;
    tx.commit().await.context("commit tx")?;

    info!(user_id = %user.id, username = %user.username, "user signed up");
    let keys = JwtKeys::from_ref(&state);
    Ok((StatusCode::CREATED, auth_response(&keys, user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let username = normalize_username(&payload.username);

    let user = match User::find_by_username(&state.db, &username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(%username, "login unknown username");
            return Err(invalid_credentials());
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err(AppError::Internal(e));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(%username, user_id = %user.id, "login invalid password");
        return Err(invalid_credentials());
    }

    info!(user_id = %user.id, username = %user.username, "user logged in");
    let keys = JwtKeys::from_ref(&state);
    auth_response(&keys, user)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    if user.session_version != claims.ver {
        warn!(user_id = %user.id, "refresh with token from a closed session");
        return Err(AppError::Unauthorized("Session has ended".into()));
    }

    auth_response(&keys, user)
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<StatusCode> {
    User::bump_session_version(&state.db, user_id).await?;
    info!(%user_id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn request_reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    let username = normalize_username(&payload.username);
    let email = payload.email.trim().to_lowercase();
    if username.is_empty() || email.is_empty() {
        return Err(AppError::validation("Username and email are required"));
    }
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }

    let user = User::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mail = &state.config.mail;
    let token = generate_reset_token();
    let expires_at = OffsetDateTime::now_utc() + TimeDuration::minutes(mail.reset_token_ttl_minutes);
    User::set_reset_token(&state.db, user.id, &email, &token, expires_at).await?;

    let link = format!(
        "{}/api/v1/auth/update-password?token={}",
        mail.app_base_url.trim_end_matches('/'),
        token
    );
    state
        .mailer
        .send(
            &email,
            "Password Reset",
            &format!("Click the link to reset your password: {link}"),
        )
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "reset mail failed");
            AppError::upstream("Error sending email", e)
        })?;

    info!(user_id = %user.id, "password reset requested");
    Ok(Json(MessageResponse::new("Password reset link sent")))
}

#[instrument(skip(state, query))]
pub async fn check_reset_token(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> AppResult<Json<MessageResponse>> {
    if query.token.is_empty() {
        return Err(AppError::validation("Token is required"));
    }
    User::find_by_reset_token(&state.db, &query.token)
        .await?
        .ok_or_else(|| AppError::validation("Invalid or expired token"))?;
    Ok(Json(MessageResponse::new("Token is valid")))
}

#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    if payload.token.is_empty() || payload.new_password.is_empty() {
        return Err(AppError::validation("Token and new password are required"));
    }
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password too short"));
    }

    let hash = hash_password(&payload.new_password)?;
    let user_id = User::complete_password_reset(&state.db, &payload.token, &hash)
        .await?
        .ok_or_else(|| {
            warn!("password update with unknown, expired or used token");
            AppError::validation("Invalid or expired token")
        })?;

    info!(%user_id, "password reset completed");
    Ok(Json(MessageResponse::new("Password updated")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::Mailer;
    use crate::state::fakes::RecordingMailer;
    use std::sync::Arc;

    #[test]
    fn public_user_serialization() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            username: "cook".to_string(),
            email: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"username\":\"cook\""));
        assert!(json.contains("\"email\":null"));
    }

    // Validation runs before any query, so the lazy pool is never used.

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let state = AppState::fake();
        let err = signup(
            State(state),
            Json(SignupRequest {
                username: "Chef".into(),
                password: "short".into(),
                email: None,
                health_conditions: vec![],
                health_goal: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Password too short");
    }

    #[tokio::test]
    async fn signup_rejects_bad_email() {
        let state = AppState::fake();
        let err = signup(
            State(state),
            Json(SignupRequest {
                username: "chef".into(),
                password: "long-enough-pw".into(),
                email: Some("nope".into()),
                health_conditions: vec!["peanut".into()],
                health_goal: Some("eat well".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email");
    }

    #[tokio::test]
    async fn reset_requires_username_and_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let mut state = AppState::fake();
        state.mailer = mailer.clone() as Arc<dyn Mailer>;

        let err = request_reset(
            State(state),
            Json(ResetRequest {
                username: "cook".into(),
                email: "   ".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_password_requires_token() {
        let state = AppState::fake();
        let err = update_password(
            State(state),
            Json(UpdatePasswordRequest {
                token: String::new(),
                new_password: "new-password".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Token and new password are required");
    }

    #[tokio::test]
    async fn check_reset_token_requires_token() {
        let state = AppState::fake();
        let err = check_reset_token(State(state), Query(TokenQuery { token: String::new() }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
