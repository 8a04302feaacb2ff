use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;

use super::dto::{AdDto, CreateOrUpdateAd, FullAdDto};
use crate::{
    auth::AuthUser,
    dto::ResponseWrapper,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath},
    images::handlers::UploadParts,
    state::AppState,
};

pub fn ad_routes() -> Router<AppState> {
    Router::new()
        .route("/ads", get(list_ads).post(create_ad))
        .route("/ads/me", get(list_my_ads))
        .route("/ads/:id", get(get_ad).patch(update_ad).delete(delete_ad))
        .route("/ads/:id/image", patch(update_ad_image))
}

#[instrument(skip(state))]
pub async fn list_ads(State(state): State<AppState>) -> AppResult<Json<ResponseWrapper<AdDto>>> {
    let ads = state.ads.list_all().await?;
    Ok(Json(ResponseWrapper::of(ads)))
}

#[instrument(skip(state, principal))]
pub async fn list_my_ads(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Json<ResponseWrapper<AdDto>>> {
    let ads = state.ads.list_mine(&principal).await?;
    Ok(Json(ResponseWrapper::of(ads)))
}

#[instrument(skip(state))]
pub async fn get_ad(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<FullAdDto>> {
    let detail = state.ads.get_full(id).await?;
    Ok(Json(detail.into()))
}

/// POST /ads (multipart)
/// Parts: `image` (file) and `properties` (JSON title/price/description).
#[instrument(skip(state, principal, parts))]
pub async fn create_ad(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    mut parts: UploadParts,
) -> AppResult<(StatusCode, HeaderMap, Json<AdDto>)> {
    let image = parts.require_image()?;
    let properties = parts.require_properties()?;
    let body: CreateOrUpdateAd = serde_json::from_slice(&properties)
        .map_err(|e| AppError::Validation(format!("invalid properties: {}", e)))?;

    let ad = state.ads.create(&principal, body.into(), image).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/ads/{}", ad.id).parse() {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(ad.into())))
}

#[instrument(skip(state, principal, payload))]
pub async fn update_ad(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<CreateOrUpdateAd>,
) -> AppResult<Json<AdDto>> {
    let ad = state.ads.update(&principal, id, payload.into()).await?;
    Ok(Json(ad.into()))
}

#[instrument(skip(state, principal, parts))]
pub async fn update_ad_image(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<i32>,
    mut parts: UploadParts,
) -> AppResult<Json<AdDto>> {
    let image = parts.require_image()?;
    let ad = state.ads.update_image(&principal, id, image).await?;
    Ok(Json(ad.into()))
}

#[instrument(skip(state, principal))]
pub async fn delete_ad(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.ads.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
