use bytes::Bytes;
use serde::Serialize;
use sqlx::FromRow;

/// Image record. The payload itself lives in the asset store under `storage_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Image {
    pub id: i32,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub content_type: String,
}

/// Image record together with its current payload.
#[derive(Debug, Clone)]
pub struct ImageContent {
    pub image: Image,
    pub body: Bytes,
}
