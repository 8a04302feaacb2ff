use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

use super::principal::Principal;
use crate::{error::AppError, state::AppState};

/// Verifies HTTP Basic credentials on every request and yields the caller.
pub struct AuthUser(pub Principal);

/// Split a `Basic <base64(email:secret)>` header value.
pub(crate) fn parse_basic(header: &str) -> Option<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, secret) = decoded.split_once(':')?;
    Some((email.to_string(), secret.to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let (email, secret) = parse_basic(header).ok_or_else(|| {
            warn!("malformed basic credentials");
            AppError::Unauthorized
        })?;

        let principal = state.users.authenticate(&email, &secret).await?;
        Ok(AuthUser(principal))
    }
}
