use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// All item names of a user's inventory, `None` if it was never created.
pub async fn load(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Vec<String>>> {
    let row = sqlx::query_as::<_, (Vec<String>,)>(
        r#"
        SELECT items
          FROM inventories
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("load inventory")?;

    Ok(row.map(|(items,)| items))
}

/// Creates an empty inventory unless one exists.
pub async fn ensure_tx(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO inventories (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await
    .context("ensure inventory")?;

    Ok(())
}

/// Loads and row-locks the inventory until the transaction ends.
pub async fn load_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> anyhow::Result<Option<Vec<String>>> {
    let row = sqlx::query_as::<_, (Vec<String>,)>(
        r#"
        SELECT items
          FROM inventories
         WHERE user_id = $1
           FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .context("lock inventory")?;

    Ok(row.map(|(items,)| items))
}

/// Replaces the whole item list.
pub async fn replace_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    items: &[String],
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE inventories
           SET items = $2, updated_at = now()
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(items)
    .execute(&mut **tx)
    .await
    .context("replace inventory")?;

    Ok(())
}
