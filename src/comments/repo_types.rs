use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Comment row joined with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Comment {
    pub id: i32,
    pub ad_id: i32,
    pub author_id: i32,
    pub author_email: String,
    pub author_first_name: String,
    pub author_image_id: Option<i32>,
    pub text: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub ad_id: i32,
    pub author_id: i32,
    pub text: String,
    pub created_at: OffsetDateTime,
}
