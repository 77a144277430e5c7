use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HealthProfile {
    pub conditions: Vec<String>,
    pub goal: String,
}

pub async fn find(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<HealthProfile>> {
    let row = sqlx::query_as::<_, HealthProfile>(
        r#"
        SELECT conditions, goal
          FROM health_profiles
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("load health profile")?;
    Ok(row)
}

/// Replaces the profile as a whole, creating it if absent.
pub async fn upsert(
    conn: &mut PgConnection,
    user_id: Uuid,
    conditions: &[String],
    goal: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO health_profiles (user_id, conditions, goal, updated_at)
        VALUES ($1, $2, $3, now())
        ON CONFLICT (user_id)
        DO UPDATE SET conditions = EXCLUDED.conditions,
                      goal = EXCLUDED.goal,
                      updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(conditions)
    .bind(goal)
    .execute(conn)
    .await
    .context("upsert health profile")?;
    Ok(())
}
