mod dto;
pub mod handlers;
pub mod plan;
pub mod pool;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::planner_routes()
}
