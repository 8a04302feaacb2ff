pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo_types::Comment;
pub use services::CommentService;

pub fn router() -> Router<AppState> {
    handlers::comment_routes()
}
