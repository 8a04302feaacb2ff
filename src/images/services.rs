use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::repo::ImageRepository;
use super::repo_types::{Image, ImageContent};
use crate::error::{AppError, AppResult};
use crate::storage::StorageClient;

pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// An uploaded file as received from the transport.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

impl UploadItem {
    pub fn png(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            content_type: DEFAULT_CONTENT_TYPE.into(),
        }
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Unknown or missing content types are stored as PNG.
fn normalize(ct: &str) -> (&str, &'static str) {
    match ext_from_mime(ct) {
        Some(ext) => (ct, ext),
        None => (DEFAULT_CONTENT_TYPE, "png"),
    }
}

fn object_key(ext: &str) -> String {
    format!("images/{}.{}", Uuid::new_v4(), ext)
}

/// Binds payloads in the asset store to image records.
///
/// Writes go object first, row second. When the row write fails the object
/// is removed again, so callers never observe a record without a payload.
pub struct ImageService {
    repo: Arc<dyn ImageRepository>,
    storage: Arc<dyn StorageClient>,
}

impl ImageService {
    pub fn new(repo: Arc<dyn ImageRepository>, storage: Arc<dyn StorageClient>) -> Self {
        Self { repo, storage }
    }

    async fn put(&self, item: UploadItem) -> AppResult<(String, String)> {
        if item.body.is_empty() {
            return Err(AppError::Storage("empty image payload".into()));
        }
        let (content_type, ext) = normalize(&item.content_type);
        let content_type = content_type.to_string();
        let key = object_key(ext);
        self.storage
            .put_object(&key, item.body, &content_type)
            .await
            .map_err(|e| {
                error!(error = %e, %key, "put_object failed");
                AppError::storage(e)
            })?;
        Ok((key, content_type))
    }

    async fn drop_object(&self, key: &str) {
        if let Err(e) = self.storage.delete_object(key).await {
            warn!(error = %e, %key, "failed to delete stale object");
        }
    }

    #[instrument(skip(self, item), fields(bytes = item.body.len()))]
    pub async fn upload(&self, item: UploadItem) -> AppResult<Image> {
        let (key, content_type) = self.put(item).await?;
        match self.repo.insert(&key, &content_type).await {
            Ok(image) => {
                info!(image_id = image.id, "image uploaded");
                Ok(image)
            }
            Err(e) => {
                self.drop_object(&key).await;
                Err(e.into())
            }
        }
    }

    /// Store a new payload for `image`, keeping its id.
    #[instrument(skip(self, image, item), fields(image_id = image.id, bytes = item.body.len()))]
    pub async fn replace(&self, image: &Image, item: UploadItem) -> AppResult<Image> {
        let (key, content_type) = self.put(item).await?;
        let updated = match self.repo.update_key(image.id, &key, &content_type).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                self.drop_object(&key).await;
                return Err(AppError::NotFound("image"));
            }
            Err(e) => {
                self.drop_object(&key).await;
                return Err(e.into());
            }
        };
        let (image, old_key) = updated;
        if old_key != image.storage_key {
            self.drop_object(&old_key).await;
        }
        info!(image_id = image.id, "image replaced");
        Ok(image)
    }

    pub async fn find(&self, id: i32) -> AppResult<Image> {
        self.repo.find(id).await?.ok_or(AppError::NotFound("image"))
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i32) -> AppResult<ImageContent> {
        let image = self.find(id).await?;
        let body = self
            .storage
            .get_object(&image.storage_key)
            .await
            .map_err(AppError::storage)?
            .ok_or_else(|| {
                error!(image_id = id, key = %image.storage_key, "image payload missing");
                AppError::NotFound("image")
            })?;
        Ok(ImageContent { image, body })
    }

    /// Undo an upload whose owning entity could not be written.
    pub async fn discard(&self, image: &Image) {
        debug!(image_id = image.id, "discarding image");
        if let Err(e) = self.repo.delete(image.id).await {
            warn!(error = %e, image_id = image.id, "failed to delete image row");
        }
        self.drop_object(&image.storage_key).await;
    }
}
