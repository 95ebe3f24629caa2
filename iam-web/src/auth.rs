//! Authentication gate and the acting identity extractor

pub mod jwt;
pub mod password;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use iam_applications::Principal;
use iam_core::{IamError, IamResult};
use std::convert::Infallible;

pub use jwt::{Claims, JwtCodec};
pub use password::Argon2Hasher;

pub const BEARER: &str = "Bearer";

/// Pull the raw token out of an `Authorization: Bearer <token>` header.
///
/// The header must start with `Bearer` and split on whitespace into exactly
/// two parts. Anything else is `InvalidToken`.
pub fn extract_bearer(headers: &HeaderMap) -> IamResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or(IamError::InvalidToken)?;

    if !value.starts_with(BEARER) {
        return Err(IamError::InvalidToken);
    }

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [BEARER, token] => Ok(*token),
        _ => Err(IamError::InvalidToken),
    }
}

/// The principal established by the gate, if the route is gated.
///
/// Ungated routes always see `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActingIdentity(pub Option<Principal>);

impl ActingIdentity {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for ActingIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Principal>().copied()))
    }
}
