use crate::auth::repo_types::User;
use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, username, password_hash, email, profile_picture_key, session_version, created_at";

impl User {
    /// Find a user by (lowercase) username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password inside a transaction.
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password_hash, email)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .fetch_one(&mut **tx)
        .await?;
        Ok(user)
    }

    /// Current session version, `None` if the user no longer exists.
    pub async fn session_version(db: &PgPool, id: Uuid) -> anyhow::Result<Option<i32>> {
        let row = sqlx::query_as::<_, (i32,)>("SELECT session_version FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("load session version")?;
        Ok(row.map(|(v,)| v))
    }

    /// Invalidates every token issued so far.
    pub async fn bump_session_version(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET session_version = session_version + 1 WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("bump session version")?;
        Ok(())
    }

    pub async fn set_profile_picture(db: &PgPool, id: Uuid, key: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET profile_picture_key = $2 WHERE id = $1")
            .bind(id)
            .bind(key)
            .execute(db)
            .await
            .context("set profile picture")?;
        Ok(())
    }

    /// Stores a pending reset token and the email it is sent to.
    pub async fn set_reset_token(
        db: &PgPool,
        id: Uuid,
        email: &str,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET email = $2, reset_token = $3, reset_token_expires_at = $4
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(token)
        .bind(expires_at)
        .execute(db)
        .await
        .context("set reset token")?;
        Ok(())
    }

    /// User owning an unexpired reset token.
    pub async fn find_by_reset_token(db: &PgPool, token: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
              FROM users
             WHERE reset_token = $1
               AND reset_token_expires_at > now()
            "#
        ))
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Consumes an unexpired reset token in one statement: sets the new hash,
    /// clears the token and revokes existing sessions. `None` when the token
    /// is unknown, expired or already used.
    pub async fn complete_password_reset(
        db: &PgPool,
        token: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<Uuid>> {
        let row = sqlx::query_as::<_, (Uuid,)>(CONSUME_RESET_TOKEN_SQL)
            .bind(token)
            .bind(password_hash)
            .fetch_optional(db)
            .await
            .context("complete password reset")?;
        Ok(row.map(|(id,)| id))
    }
}

const CONSUME_RESET_TOKEN_SQL: &str = r#"
    UPDATE users
       SET password_hash = $2,
           reset_token = NULL,
           reset_token_expires_at = NULL,
           session_version = session_version + 1
     WHERE reset_token = $1
       AND reset_token_expires_at > now()
    RETURNING id
"#;

/// True when the error is a unique-constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|e| e.code())
        .is_some_and(|code| code == "23505")
}
