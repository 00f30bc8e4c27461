//! Caller identity extraction.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user id in the [`USER_ID_HEADER`] header.

use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use leadhub_domain::id::UserId;

use crate::error::ApiError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user making the request.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        UserId::from_str(raw.trim())
            .map(Self)
            .map_err(|_| ApiError::Unauthorized)
    }
}
