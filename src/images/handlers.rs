use axum::{
    async_trait,
    extract::{multipart::Field, FromRequest, Multipart, Request, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use bytes::Bytes;
use tracing::instrument;

use super::services::{UploadItem, DEFAULT_CONTENT_TYPE};
use crate::{
    error::{AppError, AppResult},
    extract::AppPath,
    state::AppState,
};

/// Image reads are public, so both prefixes resolve any image id.
pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route("/ads/image/:id", get(get_image))
        .route("/users/image/:id", get(get_image))
}

#[instrument(skip(state))]
pub async fn get_image(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let content = state.images.get_by_id(id).await?;
    Ok((
        [(header::CONTENT_TYPE, content.image.content_type)],
        content.body,
    ))
}

/// Parts of a multipart upload: the `image` file and an optional JSON `properties` part.
#[derive(Default)]
pub struct UploadParts {
    pub image: Option<UploadItem>,
    pub properties: Option<Bytes>,
}

async fn field_bytes(field: Field<'_>) -> AppResult<Bytes> {
    field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))
}

pub async fn read_upload(mut mp: Multipart) -> AppResult<UploadParts> {
    let mut parts = UploadParts::default();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("image") => {
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let body = field_bytes(field).await?;
                parts.image = Some(UploadItem { body, content_type });
            }
            Some("properties") => parts.properties = Some(field_bytes(field).await?),
            _ => {}
        }
    }
    Ok(parts)
}

#[async_trait]
impl<S> FromRequest<S> for UploadParts
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mp = Multipart::from_request(req, state).await?;
        read_upload(mp).await
    }
}

impl UploadParts {
    pub fn require_image(&mut self) -> AppResult<UploadItem> {
        self.image
            .take()
            .ok_or_else(|| AppError::Validation("image part is required".into()))
    }

    pub fn require_properties(&mut self) -> AppResult<Bytes> {
        self.properties
            .take()
            .ok_or_else(|| AppError::Validation("properties part is required".into()))
    }
}
