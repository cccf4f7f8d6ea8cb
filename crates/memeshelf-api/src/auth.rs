//! Caller identity extraction.
//!
//! Authentication happens upstream. The identity provider forwards the authenticated
//! user as `X-User-Id` and marks staff with `X-User-Elevated`; requests without a
//! usable user id are rejected with 401 before any handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use memeshelf_core::{AppError, Caller};
use uuid::Uuid;

use crate::error::HttpAppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ELEVATED_HEADER: &str = "x-user-elevated";

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Caller);

fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, AppError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".to_string()))?;

    let user_id = raw
        .to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .ok_or_else(|| AppError::Unauthorized("Invalid X-User-Id header".to_string()))?;

    let elevated = headers
        .get(ELEVATED_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1"))
        .unwrap_or(false);

    Ok(Caller { user_id, elevated })
}

// FromRequestParts so it can precede Multipart in handler signatures.
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = caller_from_headers(&parts.headers)?;
        Ok(Authenticated(caller))
    }
}
