use anyhow::Context;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{merge, repo};

/// Merges an extraction result into the stored inventory, creating it on
/// first use. Returns the items that were appended.
pub async fn record_extraction(
    db: &PgPool,
    user_id: Uuid,
    extracted: &str,
) -> anyhow::Result<Vec<String>> {
    let added = merge::parse_items(extracted);

    let mut tx = db.begin().await.context("begin tx")?;
    repo::ensure_tx(&mut tx, user_id).await?;
    let existing = repo::load_for_update_tx(&mut tx, user_id)
        .await?
        .unwrap_or_default();
    let items = merge::merge(existing, extracted);
    repo::replace_tx(&mut tx, user_id, &items).await?;
    tx.commit().await.context("commit tx")?;

    info!(%user_id, added = added.len(), total = items.len(), "inventory updated");
    Ok(added)
}

/// Drops every item named exactly `name`. `Ok(None)` when the user has no
/// inventory yet, otherwise the number of removed entries.
pub async fn delete_item(db: &PgPool, user_id: Uuid, name: &str) -> anyhow::Result<Option<usize>> {
    let mut tx = db.begin().await.context("begin tx")?;
    let Some(items) = repo::load_for_update_tx(&mut tx, user_id).await? else {
        return Ok(None);
    };

    let before = items.len();
    let kept: Vec<String> = items.into_iter().filter(|i| i != name).collect();
    let removed = before - kept.len();
    repo::replace_tx(&mut tx, user_id, &kept).await?;
    tx.commit().await.context("commit tx")?;

    info!(%user_id, item = %name, removed, "inventory item deleted");
    Ok(Some(removed))
}
