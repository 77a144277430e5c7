use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

use super::source::{
    instructions_or_sentinel, Ingredient, RecipeCandidate, RecipeQuery, RecipeSource,
    RecipeSourceError,
};

/// Placeholder annotation when no intolerance term matched.
pub const NO_REMOVED_INTOLERANCES: &str = "None";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub used_ingredients: Vec<Ingredient>,
    pub missed_ingredients: Vec<Ingredient>,
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_intolerances: Option<Vec<String>>,
}

/// Stable ascending sort on the number of missing ingredients.
pub fn sort_by_missed(candidates: &mut [RecipeCandidate]) {
    candidates.sort_by_key(|c| c.missed_ingredients.len());
}

/// Every intolerance term found, case-insensitively, inside a missed
/// ingredient name. Yields `["None"]` when nothing matches.
pub fn removed_intolerances(missed: &[Ingredient], intolerances: &[String]) -> Vec<String> {
    let missed: Vec<String> = missed.iter().map(|m| m.name.to_lowercase()).collect();
    let found: Vec<String> = intolerances
        .iter()
        .filter(|term| {
            let term = term.trim().to_lowercase();
            !term.is_empty() && missed.iter().any(|name| name.contains(&term))
        })
        .cloned()
        .collect();

    if found.is_empty() {
        vec![NO_REMOVED_INTOLERANCES.to_string()]
    } else {
        found
    }
}

async fn search_sorted(
    source: &dyn RecipeSource,
    query: &RecipeQuery,
) -> Result<Vec<RecipeCandidate>, RecipeSourceError> {
    let mut candidates = source.find_by_ingredients(query).await?;
    sort_by_missed(&mut candidates);
    debug!(count = candidates.len(), "recipes listed");
    Ok(candidates)
}

/// Attaches instructions to each candidate; lookups run concurrently.
async fn with_instructions(
    source: &dyn RecipeSource,
    candidates: Vec<RecipeCandidate>,
) -> Vec<(RecipeCandidate, String)> {
    let lookups = candidates
        .iter()
        .map(|c| instructions_or_sentinel(source, c.id));
    let instructions = join_all(lookups).await;
    candidates.into_iter().zip(instructions).collect()
}

fn into_recipe(
    candidate: RecipeCandidate,
    instructions: String,
    removed_intolerances: Option<Vec<String>>,
) -> Recipe {
    Recipe {
        id: candidate.id,
        title: candidate.title,
        image: candidate.image,
        used_ingredients: candidate.used_ingredients,
        missed_ingredients: candidate.missed_ingredients,
        instructions,
        removed_intolerances,
    }
}

/// One search over `ingredients`, fewest missing ingredients first.
pub async fn list_recipes(
    source: &dyn RecipeSource,
    ingredients: &[String],
    count: u32,
) -> Result<Vec<Recipe>, RecipeSourceError> {
    let query = RecipeQuery::new(ingredients, &[], count);
    let candidates = search_sorted(source, &query).await?;
    Ok(with_instructions(source, candidates)
        .await
        .into_iter()
        .map(|(c, instructions)| into_recipe(c, instructions, None))
        .collect())
}

/// Like [`list_recipes`], filtered by `intolerances` and annotated with the
/// terms that matched missed ingredients.
pub async fn list_safe_recipes(
    source: &dyn RecipeSource,
    ingredients: &[String],
    intolerances: &[String],
    count: u32,
) -> Result<Vec<Recipe>, RecipeSourceError> {
    let query = RecipeQuery::new(ingredients, intolerances, count);
    let candidates = search_sorted(source, &query).await?;
    Ok(with_instructions(source, candidates)
        .await
        .into_iter()
        .map(|(c, instructions)| {
            let removed = removed_intolerances(&c.missed_ingredients, intolerances);
            into_recipe(c, instructions, Some(removed))
        })
        .collect())
}
