use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryItem {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub items: Vec<InventoryItem>,
}

impl From<Vec<String>> for InventoryResponse {
    fn from(names: Vec<String>) -> Self {
        Self {
            items: names.into_iter().map(|name| InventoryItem { name }).collect(),
        }
    }
}

/// Result of reading a photo into the inventory.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Raw model output.
    pub items: String,
    pub added: Vec<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteItemQuery {
    #[serde(default)]
    pub item: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteItemResponse {
    pub message: String,
    pub removed: usize,
}
