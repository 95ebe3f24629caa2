//! Authentication gate middleware

use crate::{auth::extract_bearer, error::ApiError, AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use iam_applications::Principal;
use tracing::debug;

/// Require a valid bearer token and attach the acting principal.
///
/// On failure the wrapped handler never runs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())?;
    let user_id = state.tokens.verify(token)?;

    debug!(user_id = %user_id, "Request authenticated");
    request.extensions_mut().insert(Principal::new(user_id));

    Ok(next.run(request).await)
}
