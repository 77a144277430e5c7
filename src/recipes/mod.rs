mod dto;
pub mod handlers;
pub mod listing;
pub mod source;
pub mod spoonacular;

pub use source::RecipeSource;
pub use spoonacular::SpoonacularSource;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::recipe_routes()
}
