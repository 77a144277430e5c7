use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::source::{RecipeCandidate, RecipeQuery, RecipeSource, RecipeSourceError};
use crate::config::RecipeApiConfig;

#[derive(Debug, Deserialize)]
struct ComplexSearchResponse {
    #[serde(default)]
    results: Vec<RecipeCandidate>,
}

#[derive(Debug, Deserialize)]
struct RecipeInformation {
    #[serde(default)]
    instructions: Option<String>,
}

#[derive(Clone)]
pub struct SpoonacularSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SpoonacularSource {
    pub fn new(config: &RecipeApiConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, RecipeSourceError> {
        let response = self
            .client
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(RecipeSourceError::Api { status, body })
        }
    }
}

/// Query parameters for `complexSearch`, ranked by fewest missing ingredients.
fn search_params(query: &RecipeQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("includeIngredients", query.ingredients.clone()),
        ("number", query.count.to_string()),
        ("fillIngredients", "true".to_string()),
        ("sort", "min-missing-ingredients".to_string()),
    ];
    if !query.intolerances.is_empty() {
        params.push(("intolerances", query.intolerances.clone()));
    }
    if let Some(slot) = query.meal_type {
        params.push(("type", slot.as_str().to_string()));
    }
    params
}

fn strip_html(text: &str) -> String {
    lazy_static! {
        static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    }
    TAG_RE.replace_all(text, " ").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl RecipeSource for SpoonacularSource {
    async fn find_by_ingredients(
        &self,
        query: &RecipeQuery,
    ) -> Result<Vec<RecipeCandidate>, RecipeSourceError> {
        let url = format!("{}/recipes/complexSearch", self.base_url);
        let resp: ComplexSearchResponse = self.get_json(&url, &search_params(query)).await?;
        debug!(
            count = resp.results.len(),
            meal_type = ?query.meal_type,
            "recipe search done"
        );
        Ok(resp.results)
    }

    async fn instructions(&self, recipe_id: i64) -> Result<String, RecipeSourceError> {
        let url = format!("{}/recipes/{}/information", self.base_url, recipe_id);
        let info: RecipeInformation = self
            .get_json(&url, &[("includeNutrition", "false".to_string())])
            .await?;
        match info.instructions.map(|s| strip_html(&s)) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(RecipeSourceError::MissingInstructions(recipe_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::source::MealSlot;

    #[test]
    fn search_params_include_type_and_intolerances_only_when_set() {
        let q = RecipeQuery::new(&["egg".into(), "milk".into()], &[], 1);
        let params = search_params(&q);
        assert!(params.contains(&("includeIngredients", "egg,milk".to_string())));
        assert!(params.contains(&("number", "1".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "type" || *k == "intolerances"));

        let q = RecipeQuery::new(&["egg".into()], &["dairy".into()], 1)
            .with_meal_type(MealSlot::Dinner);
        let params = search_params(&q);
        assert!(params.contains(&("intolerances", "dairy".to_string())));
        assert!(params.contains(&("type", "dinner".to_string())));
    }

    #[test]
    fn complex_search_response_parses_results() {
        let raw = r#"{"results":[{"id":1,"title":"Omelette","usedIngredients":[{"name":"eggs","amount":2,"unit":""}],"missedIngredients":[]}],"offset":0,"number":1,"totalResults":1}"#;
        let resp: ComplexSearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.results.len(), 1);
        assert_eq!(resp.results[0].image, None);
        assert_eq!(resp.results[0].used_ingredients[0].amount, 2.0);
    }

    #[test]
    fn strip_html_flattens_markup() {
        assert_eq!(
            strip_html("<ol><li>Whisk eggs.</li><li>Fry.</li></ol>"),
            "Whisk eggs. Fry."
        );
        assert_eq!(strip_html("Plain text"), "Plain text");
    }
}
