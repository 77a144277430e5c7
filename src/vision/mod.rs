use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod gemini;

pub use gemini::GeminiVision;

/// Prompt sent with every food photo.
pub const FOOD_ITEMS_PROMPT: &str =
    "What are the food items you see in this image? Split the food items by comma";

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("vision request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vision api returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Turns an image into free text, typically a comma-separated listing.
#[async_trait]
pub trait VisionExtractor: Send + Sync {
    async fn analyze(
        &self,
        image: Bytes,
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, VisionError>;
}
