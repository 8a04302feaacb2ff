use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::{
    ads::{repo::PgAdRepository, repo::AdRepository, AdService},
    auth::password::{Argon2Hasher, SecretHasher},
    comments::{repo::CommentRepository, repo::PgCommentRepository, CommentService},
    config::{AppConfig, StorageBackend},
    db,
    images::{repo::ImageRepository, repo::PgImageRepository, ImageService},
    storage::{MemoryStorage, S3Storage, StorageClient},
    users::{repo::PgUserRepository, repo::UserRepository, UserService},
};

/// Persistence seams, one per entity.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub ads: Arc<dyn AdRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub images: Arc<dyn ImageRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            ads: Arc::new(PgAdRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            images: Arc::new(PgImageRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub images: Arc<ImageService>,
    pub users: Arc<UserService>,
    pub ads: Arc<AdService>,
    pub comments: Arc<CommentService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await?;

        let storage: Arc<dyn StorageClient> = match (config.storage_backend, &config.s3) {
            (StorageBackend::S3, Some(s3)) => {
                info!(endpoint = %s3.endpoint, bucket = %s3.bucket, "using s3 asset store");
                Arc::new(S3Storage::new(s3).await?)
            }
            (StorageBackend::S3, None) => anyhow::bail!("s3 backend selected without s3 config"),
            (StorageBackend::Memory, _) => {
                info!("using in-memory asset store");
                Arc::new(MemoryStorage::new())
            }
        };

        Ok(Self::from_parts(
            config,
            Repositories::postgres(pool),
            storage,
            Arc::new(Argon2Hasher),
        ))
    }

    pub fn from_parts(
        config: AppConfig,
        repos: Repositories,
        storage: Arc<dyn StorageClient>,
        hasher: Arc<dyn SecretHasher>,
    ) -> Self {
        let images = Arc::new(ImageService::new(repos.images, storage));
        let users = Arc::new(UserService::new(
            repos.users.clone(),
            images.clone(),
            hasher,
        ));
        let ads = Arc::new(AdService::new(
            repos.ads.clone(),
            repos.users.clone(),
            images.clone(),
        ));
        let comments = Arc::new(CommentService::new(repos.comments, repos.ads, repos.users));

        Self {
            config: Arc::new(config),
            images,
            users,
            ads,
            comments,
        }
    }
}
