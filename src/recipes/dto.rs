use serde::{Deserialize, Serialize};

use super::listing::Recipe;

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    /// Comma-separated subset of ingredients; the whole inventory when absent.
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub number: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RecipeListResponse {
    pub ingredients: Vec<String>,
    pub recipes: Vec<Recipe>,
}
