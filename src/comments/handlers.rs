use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{CommentDto, CreateOrUpdateComment};
use crate::{
    auth::AuthUser,
    dto::ResponseWrapper,
    error::AppResult,
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/ads/:id/comments", get(list_comments).post(add_comment))
        .route(
            "/ads/:id/comments/:comment_id",
            get(get_comment).patch(update_comment).delete(delete_comment),
        )
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    AppPath(ad_id): AppPath<i32>,
) -> AppResult<Json<ResponseWrapper<CommentDto>>> {
    let comments = state.comments.list_for_ad(ad_id).await?;
    Ok(Json(ResponseWrapper::of(comments)))
}

#[instrument(skip(state, principal, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(ad_id): AppPath<i32>,
    AppJson(payload): AppJson<CreateOrUpdateComment>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    let comment = state.comments.create(&principal, ad_id, payload.text).await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

#[instrument(skip(state))]
pub async fn get_comment(
    State(state): State<AppState>,
    AppPath((ad_id, id)): AppPath<(i32, i32)>,
) -> AppResult<Json<CommentDto>> {
    let comment = state.comments.get_by_id(ad_id, id).await?;
    Ok(Json(comment.into()))
}

#[instrument(skip(state, principal, payload))]
pub async fn update_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath((ad_id, id)): AppPath<(i32, i32)>,
    AppJson(payload): AppJson<CreateOrUpdateComment>,
) -> AppResult<Json<CommentDto>> {
    let comment = state
        .comments
        .update(&principal, ad_id, id, payload.text)
        .await?;
    Ok(Json(comment.into()))
}

#[instrument(skip(state, principal))]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath((ad_id, id)): AppPath<(i32, i32)>,
) -> AppResult<StatusCode> {
    state.comments.delete(&principal, ad_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
