use sqlx::PgPool;
use uuid::Uuid;

use super::repo;

/// Trims labels, drops blanks and collapses case-insensitive duplicates,
/// keeping the first spelling seen.
pub fn normalize_conditions(raw: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty() && seen.insert(c.to_lowercase()))
        .collect()
}

/// Intolerance labels used to filter recipes; empty when no profile exists.
pub async fn intolerances(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<String>> {
    Ok(repo::find(db, user_id)
        .await?
        .map(|p| p.conditions)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_are_trimmed_and_deduplicated() {
        let out = normalize_conditions(vec![
            " Peanut ".into(),
            "".into(),
            "gluten".into(),
            "peanut".into(),
            "   ".into(),
        ]);
        assert_eq!(out, vec!["Peanut", "gluten"]);
    }
}
