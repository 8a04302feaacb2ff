use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument};

use super::repo::CommentRepository;
use super::repo_types::{Comment, NewComment};
use crate::{
    ads::repo::AdRepository,
    auth::{
        policy::{self, Action},
        Principal,
    },
    error::{AppError, AppResult},
    users::repo::UserRepository,
};

fn check_text(text: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("comment text must not be empty".into()));
    }
    Ok(())
}

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    ads: Arc<dyn AdRepository>,
    users: Arc<dyn UserRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        ads: Arc<dyn AdRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            comments,
            ads,
            users,
        }
    }

    async fn require_ad(&self, ad_id: i32) -> AppResult<()> {
        match self.ads.find(ad_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("ad")),
        }
    }

    /// Any authenticated caller may comment on an existing ad.
    #[instrument(skip(self, principal, text), fields(email = %principal.email))]
    pub async fn create(&self, principal: &Principal, ad_id: i32, text: String) -> AppResult<Comment> {
        check_text(&text)?;
        self.require_ad(ad_id).await?;
        let author = self
            .users
            .find_by_email(&principal.email)
            .await?
            .ok_or(AppError::NotFound("user"))?;

        let comment = self
            .comments
            .insert(&NewComment {
                ad_id,
                author_id: author.id,
                text,
                created_at: OffsetDateTime::now_utc(),
            })
            .await?;
        info!(comment_id = comment.id, ad_id, "comment created");
        Ok(comment)
    }

    /// Unknown ads are reported as `NotFound` rather than an empty list.
    pub async fn list_for_ad(&self, ad_id: i32) -> AppResult<Vec<Comment>> {
        self.require_ad(ad_id).await?;
        Ok(self.comments.list_by_ad(ad_id).await?)
    }

    pub async fn get_by_id(&self, ad_id: i32, id: i32) -> AppResult<Comment> {
        self.comments
            .find(ad_id, id)
            .await?
            .ok_or(AppError::NotFound("comment"))
    }

    #[instrument(skip(self, principal, text), fields(email = %principal.email))]
    pub async fn update(
        &self,
        principal: &Principal,
        ad_id: i32,
        id: i32,
        text: String,
    ) -> AppResult<Comment> {
        let comment = self.get_by_id(ad_id, id).await?;
        policy::ensure(principal, &comment.author_email, Action::Update)?;
        check_text(&text)?;
        let comment = self
            .comments
            .update_text(id, &text)
            .await?
            .ok_or(AppError::NotFound("comment"))?;
        info!(comment_id = id, ad_id, "comment updated");
        Ok(comment)
    }

    #[instrument(skip(self, principal), fields(email = %principal.email))]
    pub async fn delete(&self, principal: &Principal, ad_id: i32, id: i32) -> AppResult<()> {
        let comment = self.get_by_id(ad_id, id).await?;
        policy::ensure(principal, &comment.author_email, Action::Delete)?;
        if !self.comments.delete(id).await? {
            return Err(AppError::NotFound("comment"));
        }
        info!(comment_id = id, ad_id, "comment deleted");
        Ok(())
    }
}
