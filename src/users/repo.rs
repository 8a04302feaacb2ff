use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewUser, ProfileUpdate, User, UserRow};
use crate::auth::Role;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Returns `None` when the email is already taken.
    async fn insert(&self, user: &NewUser) -> anyhow::Result<Option<User>>;
    async fn update_profile(&self, id: i32, profile: &ProfileUpdate)
        -> anyhow::Result<Option<User>>;
    async fn update_password(&self, id: i32, password_hash: &str) -> anyhow::Result<bool>;
    async fn update_role(&self, id: i32, role: Role) -> anyhow::Result<Option<User>>;
    async fn set_image(&self, id: i32, image_id: i32) -> anyhow::Result<bool>;
}

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, phone, image_id, role";

fn into_user(row: Option<UserRow>) -> anyhow::Result<Option<User>> {
    row.map(User::try_from).transpose()
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        into_user(row)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        into_user(row)
    }

    async fn insert(&self, user: &NewUser) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, phone, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.role.to_string())
        .fetch_optional(&self.db)
        .await
        .context("insert user")?;
        into_user(row)
    }

    async fn update_profile(
        &self,
        id: i32,
        profile: &ProfileUpdate,
    ) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
               SET first_name = $2, last_name = $3, phone = $4
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.phone)
        .fetch_optional(&self.db)
        .await
        .context("update user profile")?;
        into_user(row)
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await
            .context("update user password")?;
        Ok(res.rows_affected() > 0)
    }

    async fn update_role(&self, id: i32, role: Role) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role.to_string())
        .fetch_optional(&self.db)
        .await
        .context("update user role")?;
        into_user(row)
    }

    async fn set_image(&self, id: i32, image_id: i32) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET image_id = $2 WHERE id = $1")
            .bind(id)
            .bind(image_id)
            .execute(&self.db)
            .await
            .context("set user image")?;
        Ok(res.rows_affected() > 0)
    }
}
