use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                            // unique user ID
    pub username: String,                    // lowercase login name
    #[serde(skip_serializing)]
    pub password_hash: String,               // Argon2 hash, not exposed in JSON
    pub email: Option<String>,               // set at signup or by a reset request
    pub profile_picture_key: Option<String>, // object storage key
    pub session_version: i32,                // bumped to revoke issued tokens
    pub created_at: OffsetDateTime,          // creation timestamp
}
