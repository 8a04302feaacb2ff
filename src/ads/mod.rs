pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo_types::{Ad, AdDetail, AdFields};
pub use services::AdService;

pub fn router() -> Router<AppState> {
    handlers::ad_routes()
}
