use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{Ad, AdDetail, AdFields, NewAd};

#[async_trait]
pub trait AdRepository: Send + Sync {
    async fn list_all(&self) -> anyhow::Result<Vec<Ad>>;
    async fn list_by_owner(&self, owner_email: &str) -> anyhow::Result<Vec<Ad>>;
    async fn find(&self, id: i32) -> anyhow::Result<Option<Ad>>;
    async fn find_detail(&self, id: i32) -> anyhow::Result<Option<AdDetail>>;
    async fn insert(&self, ad: &NewAd) -> anyhow::Result<Ad>;
    async fn update(&self, id: i32, fields: &AdFields) -> anyhow::Result<Option<Ad>>;
    /// Delete the ad and every comment under it in one transaction.
    async fn delete_with_comments(&self, id: i32) -> anyhow::Result<bool>;
}

pub struct PgAdRepository {
    db: PgPool,
}

impl PgAdRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const AD_SELECT: &str = r#"
    SELECT a.id, a.owner_id, u.email AS owner_email, a.title, a.price, a.description, a.image_id
      FROM ads a
      JOIN users u ON u.id = a.owner_id
"#;

#[async_trait]
impl AdRepository for PgAdRepository {
    async fn list_all(&self) -> anyhow::Result<Vec<Ad>> {
        let rows = sqlx::query_as::<_, Ad>(&format!("{AD_SELECT} ORDER BY a.id ASC"))
            .fetch_all(&self.db)
            .await
            .context("list ads")?;
        Ok(rows)
    }

    async fn list_by_owner(&self, owner_email: &str) -> anyhow::Result<Vec<Ad>> {
        let rows = sqlx::query_as::<_, Ad>(&format!(
            "{AD_SELECT} WHERE u.email = $1 ORDER BY a.id ASC"
        ))
        .bind(owner_email)
        .fetch_all(&self.db)
        .await
        .context("list ads by owner")?;
        Ok(rows)
    }

    async fn find(&self, id: i32) -> anyhow::Result<Option<Ad>> {
        let row = sqlx::query_as::<_, Ad>(&format!("{AD_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find ad")?;
        Ok(row)
    }

    async fn find_detail(&self, id: i32) -> anyhow::Result<Option<AdDetail>> {
        let row = sqlx::query_as::<_, AdDetail>(
            r#"
            SELECT a.id, a.title, a.price, a.description, a.image_id,
                   u.first_name AS owner_first_name,
                   u.last_name  AS owner_last_name,
                   u.email      AS owner_email,
                   u.phone      AS owner_phone
              FROM ads a
              JOIN users u ON u.id = a.owner_id
             WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find ad detail")?;
        Ok(row)
    }

    async fn insert(&self, ad: &NewAd) -> anyhow::Result<Ad> {
        let row = sqlx::query_as::<_, Ad>(
            r#"
            WITH inserted AS (
                INSERT INTO ads (owner_id, title, price, description, image_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, owner_id, title, price, description, image_id
            )
            SELECT i.id, i.owner_id, u.email AS owner_email, i.title, i.price, i.description, i.image_id
              FROM inserted i
              JOIN users u ON u.id = i.owner_id
            "#,
        )
        .bind(ad.owner_id)
        .bind(&ad.fields.title)
        .bind(ad.fields.price)
        .bind(&ad.fields.description)
        .bind(ad.image_id)
        .fetch_one(&self.db)
        .await
        .context("insert ad")?;
        Ok(row)
    }

    async fn update(&self, id: i32, fields: &AdFields) -> anyhow::Result<Option<Ad>> {
        let row = sqlx::query_as::<_, Ad>(
            r#"
            WITH updated AS (
                UPDATE ads
                   SET title = $2, price = $3, description = $4
                 WHERE id = $1
                RETURNING id, owner_id, title, price, description, image_id
            )
            SELECT d.id, d.owner_id, u.email AS owner_email, d.title, d.price, d.description, d.image_id
              FROM updated d
              JOIN users u ON u.id = d.owner_id
            "#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(fields.price)
        .bind(&fields.description)
        .fetch_optional(&self.db)
        .await
        .context("update ad")?;
        Ok(row)
    }

    async fn delete_with_comments(&self, id: i32) -> anyhow::Result<bool> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("DELETE FROM comments WHERE ad_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete ad comments")?;
        let res = sqlx::query("DELETE FROM ads WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete ad")?;
        tx.commit().await.context("commit tx")?;
        Ok(res.rows_affected() > 0)
    }
}
