use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize)]
pub struct HealthProfileResponse {
    pub conditions: Vec<String>,
    pub goal: String,
}

#[derive(Debug, Deserialize)]
pub struct PutHealthProfileRequest {
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub goal: String,
}
