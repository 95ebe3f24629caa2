//! HTTP request handlers for the IAM service
//!
//! Handlers run the authorization check, resolve path segments, apply the
//! self-action rules and then call into the services.

pub mod auth;
pub mod health;
pub mod permissions;
pub mod users;

pub use auth::*;
pub use health::*;
pub use permissions::*;
pub use users::*;

use crate::{
    auth::ActingIdentity,
    error::{ApiError, ApiResult},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use iam_applications::Principal;
use iam_core::{IamError, IamResult};
use serde::Serialize;

/// JSON body whose rejection uses the service's error envelope
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(IamError::validation(
                "body",
                format!("The request body is not valid: {}", rejection.body_text()),
            )
            .into()),
        }
    }
}

/// Run the authorization check and hand back the acting principal
pub(crate) async fn require_permission(
    state: &AppState,
    identity: &ActingIdentity,
    permission: &str,
) -> IamResult<Principal> {
    state
        .authorizer
        .verify_permission(identity.principal(), permission)
        .await
}

/// Empty collections answer `204 No Content`
pub(crate) fn list_response<T: Serialize>(key: &str, items: Vec<T>) -> ApiResult<Response> {
    if items.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let items = serde_json::to_value(items)
        .map_err(|e| IamError::internal(format!("Failed to serialize {}: {}", key, e)))?;

    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), items);
    Ok(Json(body).into_response())
}
