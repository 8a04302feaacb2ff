use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{Comment, NewComment};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn list_by_ad(&self, ad_id: i32) -> anyhow::Result<Vec<Comment>>;
    /// Path-scoped lookup: only matches when the comment belongs to `ad_id`.
    async fn find(&self, ad_id: i32, id: i32) -> anyhow::Result<Option<Comment>>;
    async fn insert(&self, comment: &NewComment) -> anyhow::Result<Comment>;
    async fn update_text(&self, id: i32, text: &str) -> anyhow::Result<Option<Comment>>;
    async fn delete(&self, id: i32) -> anyhow::Result<bool>;
}

pub struct PgCommentRepository {
    db: PgPool,
}

impl PgCommentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.ad_id, c.author_id,
           u.email      AS author_email,
           u.first_name AS author_first_name,
           u.image_id   AS author_image_id,
           c.text, c.created_at
      FROM comments c
      JOIN users u ON u.id = c.author_id
"#;

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list_by_ad(&self, ad_id: i32) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} WHERE c.ad_id = $1 ORDER BY c.created_at ASC, c.id ASC"
        ))
        .bind(ad_id)
        .fetch_all(&self.db)
        .await
        .context("list comments by ad")?;
        Ok(rows)
    }

    async fn find(&self, ad_id: i32, id: i32) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} WHERE c.id = $1 AND c.ad_id = $2"
        ))
        .bind(id)
        .bind(ad_id)
        .fetch_optional(&self.db)
        .await
        .context("find comment")?;
        Ok(row)
    }

    async fn insert(&self, comment: &NewComment) -> anyhow::Result<Comment> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (ad_id, author_id, text, created_at)
                VALUES ($1, $2, $3, $4)
                RETURNING id, ad_id, author_id, text, created_at
            )
            SELECT i.id, i.ad_id, i.author_id,
                   u.email      AS author_email,
                   u.first_name AS author_first_name,
                   u.image_id   AS author_image_id,
                   i.text, i.created_at
              FROM inserted i
              JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(comment.ad_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .fetch_one(&self.db)
        .await
        .context("insert comment")?;
        Ok(row)
    }

    async fn update_text(&self, id: i32, text: &str) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            WITH updated AS (
                UPDATE comments SET text = $2 WHERE id = $1
                RETURNING id, ad_id, author_id, text, created_at
            )
            SELECT d.id, d.ad_id, d.author_id,
                   u.email      AS author_email,
                   u.first_name AS author_first_name,
                   u.image_id   AS author_image_id,
                   d.text, d.created_at
              FROM updated d
              JOIN users u ON u.id = d.author_id
            "#,
        )
        .bind(id)
        .bind(text)
        .fetch_optional(&self.db)
        .await
        .context("update comment")?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete comment")?;
        Ok(res.rows_affected() > 0)
    }
}
