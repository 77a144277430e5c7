use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MealPlanQuery {
    #[serde(default)]
    pub days: Option<String>,
}
