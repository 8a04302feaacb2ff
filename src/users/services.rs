use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use super::repo::UserRepository;
use super::repo_types::{NewUser, ProfileUpdate, User};
use crate::{
    auth::{password::SecretHasher, policy, Principal, Role},
    config::DefaultUserConfig,
    error::{AppError, AppResult},
    images::{image_path, ImageService, UploadItem},
};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_password(secret: &str) -> AppResult<()> {
    if secret.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Registration input. `role` is accepted from the wire but never honoured.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub role: Option<Role>,
}

impl From<&DefaultUserConfig> for Registration {
    fn from(cfg: &DefaultUserConfig) -> Self {
        Self {
            email: cfg.email.clone(),
            password: cfg.password.clone(),
            first_name: cfg.first_name.clone(),
            last_name: cfg.last_name.clone(),
            phone: cfg.phone.clone(),
            role: None,
        }
    }
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    images: Arc<ImageService>,
    hasher: Arc<dyn SecretHasher>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        images: Arc<ImageService>,
        hasher: Arc<dyn SecretHasher>,
    ) -> Self {
        Self {
            users,
            images,
            hasher,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: Registration) -> AppResult<User> {
        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(AppError::Validation("invalid email".into()));
        }
        check_password(&input.password)?;
        if input.role == Some(Role::Admin) {
            warn!(%email, "ignoring requested ADMIN role on registration");
        }

        if self.users.find_by_email(&email).await?.is_some() {
            warn!(%email, "email already registered");
            return Err(AppError::Conflict("user"));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let new_user = NewUser {
            email,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
            role: Role::User,
        };
        let user = self
            .users
            .insert(&new_user)
            .await?
            .ok_or(AppError::Conflict("user"))?;

        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Create the configured default account unless its email is already taken.
    /// Returns whether an account was created.
    #[instrument(skip(self, cfg), fields(email = %cfg.email))]
    pub async fn ensure_default_user(&self, cfg: &DefaultUserConfig) -> AppResult<bool> {
        let email = normalize_email(&cfg.email);
        if self.users.find_by_email(&email).await?.is_some() {
            debug!("default user already present");
            return Ok(false);
        }
        match self.register(Registration::from(cfg)).await {
            Ok(_) => Ok(true),
            // lost a race with another instance
            Err(AppError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check Basic credentials and resolve the caller.
    pub async fn authenticate(&self, email: &str, secret: &str) -> AppResult<Principal> {
        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(%email, "login unknown email");
            return Err(AppError::Unauthorized);
        };
        if !self.hasher.verify(secret, &user.password_hash)? {
            warn!(%email, user_id = user.id, "login invalid password");
            return Err(AppError::Unauthorized);
        }
        Ok(user.principal())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("user"))
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::NotFound("user"))
    }

    #[instrument(skip(self, profile))]
    pub async fn update_profile(&self, email: &str, profile: ProfileUpdate) -> AppResult<User> {
        let user = self.get_by_email(email).await?;
        let updated = self
            .users
            .update_profile(user.id, &profile)
            .await?
            .ok_or(AppError::NotFound("user"))?;
        info!(user_id = updated.id, "profile updated");
        Ok(updated)
    }

    #[instrument(skip(self, principal, new_secret), fields(email = %principal.email))]
    pub async fn change_password(&self, principal: &Principal, new_secret: &str) -> AppResult<()> {
        check_password(new_secret)?;
        let user = self.get_by_email(&principal.email).await?;
        let hash = self.hasher.hash(new_secret)?;
        if !self.users.update_password(user.id, &hash).await? {
            return Err(AppError::NotFound("user"));
        }
        info!(user_id = user.id, "password changed");
        Ok(())
    }

    /// Upload or replace the profile picture. Returns its retrieval path.
    #[instrument(skip(self, item))]
    pub async fn update_profile_image(&self, email: &str, item: UploadItem) -> AppResult<String> {
        let user = self.get_by_email(email).await?;
        let image = match user.image_id {
            Some(image_id) => {
                let current = self.images.find(image_id).await?;
                self.images.replace(&current, item).await?
            }
            None => {
                let image = self.images.upload(item).await?;
                match self.users.set_image(user.id, image.id).await {
                    Ok(true) => image,
                    Ok(false) => {
                        self.images.discard(&image).await;
                        return Err(AppError::NotFound("user"));
                    }
                    Err(e) => {
                        self.images.discard(&image).await;
                        return Err(e.into());
                    }
                }
            }
        };
        Ok(image_path("users", image.id))
    }

    /// Change another account's role. Only admins may do this.
    #[instrument(skip(self, caller), fields(caller = %caller.email))]
    pub async fn promote(&self, caller: &Principal, target_id: i32, role: Role) -> AppResult<User> {
        policy::ensure_admin(caller)?;
        let user = self
            .users
            .update_role(target_id, role)
            .await?
            .ok_or(AppError::NotFound("user"))?;
        info!(user_id = user.id, %role, "role updated");
        Ok(user)
    }
}
