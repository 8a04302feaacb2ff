use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{
    LoginRequest, NewPasswordRequest, RegisterRequest, RoleUpdateRequest, UpdateUserRequest,
    UserDto,
};
use crate::{
    auth::AuthUser,
    error::AppResult,
    extract::{AppJson, AppPath},
    images::handlers::UploadParts,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me).patch(update_me))
        .route("/users/me/image", patch(update_my_image))
        .route("/users/set_password", post(set_password))
        .route("/users/:id", get(get_user))
        .route("/users/:id/role", patch(update_role))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.users.register(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<UserDto>> {
    let principal = state
        .users
        .authenticate(&payload.email, &payload.password)
        .await?;
    let user = state.users.get_by_email(&principal.email).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, principal))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Json<UserDto>> {
    let user = state.users.get_by_email(&principal.email).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, principal, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<Json<UserDto>> {
    let user = state
        .users
        .update_profile(&principal.email, payload.into())
        .await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, principal, parts))]
pub async fn update_my_image(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    mut parts: UploadParts,
) -> AppResult<String> {
    let image = parts.require_image()?;
    state
        .users
        .update_profile_image(&principal.email, image)
        .await
}

#[instrument(skip(state, principal, payload))]
pub async fn set_password(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<NewPasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .users
        .change_password(&principal, &payload.new_password)
        .await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state, _caller))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<UserDto>> {
    let user = state.users.get_by_id(id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, caller))]
pub async fn update_role(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<RoleUpdateRequest>,
) -> AppResult<Json<UserDto>> {
    let user = state.users.promote(&caller, id, payload.role).await?;
    Ok(Json(user.into()))
}
