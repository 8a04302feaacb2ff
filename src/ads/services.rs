use std::sync::Arc;

use tracing::{info, instrument};

use super::repo::AdRepository;
use super::repo_types::{Ad, AdDetail, AdFields, NewAd};
use crate::{
    auth::{
        policy::{self, Action},
        Principal,
    },
    error::{AppError, AppResult},
    images::{ImageService, UploadItem},
    users::repo::UserRepository,
};

impl AdFields {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        if self.price < 0 {
            return Err(AppError::Validation("price must not be negative".into()));
        }
        Ok(())
    }
}

pub struct AdService {
    ads: Arc<dyn AdRepository>,
    users: Arc<dyn UserRepository>,
    images: Arc<ImageService>,
}

impl AdService {
    pub fn new(
        ads: Arc<dyn AdRepository>,
        users: Arc<dyn UserRepository>,
        images: Arc<ImageService>,
    ) -> Self {
        Self { ads, users, images }
    }

    /// Upload the image, then write the ad. A failed ad write discards the image.
    #[instrument(skip(self, principal, fields, image), fields(email = %principal.email))]
    pub async fn create(
        &self,
        principal: &Principal,
        fields: AdFields,
        image: UploadItem,
    ) -> AppResult<Ad> {
        fields.validate()?;
        let owner = self
            .users
            .find_by_email(&principal.email)
            .await?
            .ok_or(AppError::NotFound("user"))?;

        let image = self.images.upload(image).await?;
        let new_ad = NewAd {
            owner_id: owner.id,
            fields,
            image_id: image.id,
        };
        let ad = match self.ads.insert(&new_ad).await {
            Ok(ad) => ad,
            Err(e) => {
                self.images.discard(&image).await;
                return Err(e.into());
            }
        };
        info!(ad_id = ad.id, owner_id = ad.owner_id, "ad created");
        Ok(ad)
    }

    pub async fn list_all(&self) -> AppResult<Vec<Ad>> {
        Ok(self.ads.list_all().await?)
    }

    pub async fn list_mine(&self, principal: &Principal) -> AppResult<Vec<Ad>> {
        Ok(self.ads.list_by_owner(&principal.email).await?)
    }

    pub async fn get(&self, id: i32) -> AppResult<Ad> {
        self.ads.find(id).await?.ok_or(AppError::NotFound("ad"))
    }

    pub async fn get_full(&self, id: i32) -> AppResult<AdDetail> {
        self.ads
            .find_detail(id)
            .await?
            .ok_or(AppError::NotFound("ad"))
    }

    #[instrument(skip(self, principal, fields), fields(email = %principal.email))]
    pub async fn update(&self, principal: &Principal, id: i32, fields: AdFields) -> AppResult<Ad> {
        let ad = self.get(id).await?;
        policy::ensure(principal, &ad.owner_email, Action::Update)?;
        fields.validate()?;
        let ad = self
            .ads
            .update(id, &fields)
            .await?
            .ok_or(AppError::NotFound("ad"))?;
        info!(ad_id = ad.id, "ad updated");
        Ok(ad)
    }

    /// Replace the ad's image in place; the image id stays the same.
    #[instrument(skip(self, principal, image), fields(email = %principal.email))]
    pub async fn update_image(
        &self,
        principal: &Principal,
        id: i32,
        image: UploadItem,
    ) -> AppResult<Ad> {
        let ad = self.get(id).await?;
        policy::ensure(principal, &ad.owner_email, Action::Update)?;
        let current = self.images.find(ad.image_id).await?;
        self.images.replace(&current, image).await?;
        info!(ad_id = ad.id, image_id = ad.image_id, "ad image replaced");
        Ok(ad)
    }

    /// Comments go with the ad; the image row is left in place.
    #[instrument(skip(self, principal), fields(email = %principal.email))]
    pub async fn delete(&self, principal: &Principal, id: i32) -> AppResult<()> {
        let ad = self.get(id).await?;
        policy::ensure(principal, &ad.owner_email, Action::Delete)?;
        if !self.ads.delete_with_comments(id).await? {
            return Err(AppError::NotFound("ad"));
        }
        info!(ad_id = id, "ad deleted");
        Ok(())
    }
}
