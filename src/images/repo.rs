use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::Image;

#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn find(&self, id: i32) -> anyhow::Result<Option<Image>>;
    async fn insert(&self, storage_key: &str, content_type: &str) -> anyhow::Result<Image>;
    /// Repoint an existing image at a new object. Returns the updated record and the key it replaced.
    async fn update_key(
        &self,
        id: i32,
        storage_key: &str,
        content_type: &str,
    ) -> anyhow::Result<Option<(Image, String)>>;
    async fn delete(&self, id: i32) -> anyhow::Result<bool>;
}

pub struct PgImageRepository {
    db: PgPool,
}

impl PgImageRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(sqlx::FromRow)]
struct ReplacedImage {
    id: i32,
    storage_key: String,
    content_type: String,
    old_key: String,
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    async fn find(&self, id: i32) -> anyhow::Result<Option<Image>> {
        let row = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, storage_key, content_type
              FROM images
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find image")?;
        Ok(row)
    }

    async fn insert(&self, storage_key: &str, content_type: &str) -> anyhow::Result<Image> {
        let row = sqlx::query_as::<_, Image>(
            r#"
            INSERT INTO images (storage_key, content_type)
            VALUES ($1, $2)
            RETURNING id, storage_key, content_type
            "#,
        )
        .bind(storage_key)
        .bind(content_type)
        .fetch_one(&self.db)
        .await
        .context("insert image")?;
        Ok(row)
    }

    async fn update_key(
        &self,
        id: i32,
        storage_key: &str,
        content_type: &str,
    ) -> anyhow::Result<Option<(Image, String)>> {
        let row = sqlx::query_as::<_, ReplacedImage>(
            r#"
            WITH old AS (
                SELECT id, storage_key AS old_key
                  FROM images
                 WHERE id = $1
                   FOR UPDATE
            )
            UPDATE images i
               SET storage_key = $2, content_type = $3, updated_at = now()
              FROM old
             WHERE i.id = old.id
            RETURNING i.id, i.storage_key, i.content_type, old.old_key
            "#,
        )
        .bind(id)
        .bind(storage_key)
        .bind(content_type)
        .fetch_optional(&self.db)
        .await
        .context("update image key")?;

        Ok(row.map(|r| {
            (
                Image {
                    id: r.id,
                    storage_key: r.storage_key,
                    content_type: r.content_type,
                },
                r.old_key,
            )
        }))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete image")?;
        Ok(res.rows_affected() > 0)
    }
}
