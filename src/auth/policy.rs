//! Ownership and role checks for ads, comments and accounts.
//!
//! Reads are open to everyone. Mutations are allowed to the resource owner
//! and to administrators. Everything here is a pure function of the caller
//! and the owner's email.

use tracing::warn;

use super::principal::{Principal, Role};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
}

pub fn can_read(_principal: Option<&Principal>) -> bool {
    true
}

pub fn can_mutate(principal: &Principal, owner_email: &str) -> bool {
    principal.role == Role::Admin || principal.email == owner_email
}

pub fn authorize(principal: Option<&Principal>, owner_email: &str, action: Action) -> bool {
    match action {
        Action::Read => can_read(principal),
        Action::Update | Action::Delete => {
            principal.is_some_and(|p| can_mutate(p, owner_email))
        }
    }
}

/// `Forbidden` unless `principal` may perform `action` on a resource owned by `owner_email`.
pub fn ensure(principal: &Principal, owner_email: &str, action: Action) -> AppResult<()> {
    if authorize(Some(principal), owner_email, action) {
        return Ok(());
    }
    warn!(email = %principal.email, owner = %owner_email, ?action, "mutation denied");
    Err(AppError::Forbidden("only the owner or an admin may do this"))
}

pub fn ensure_admin(principal: &Principal) -> AppResult<()> {
    if principal.role == Role::Admin {
        return Ok(());
    }
    warn!(email = %principal.email, "admin role required");
    Err(AppError::Forbidden("admin role required"))
}
