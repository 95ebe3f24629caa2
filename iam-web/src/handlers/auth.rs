//! Login and sign-up

use super::JsonBody;
use crate::{error::ApiResult, AppState};
use axum::{
    extract::State,
    http::header::LOCATION,
    response::{IntoResponse, Json},
};
use iam_core::UserId;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Username/password pair; missing fields read as empty
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub id: UserId,
}

/// Exchange credentials for an access token
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = state
        .directory
        .authenticate(&request.username, &request.password)
        .await?;
    let access_token = state.tokens.issue(user.id)?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(TokenResponse {
        access_token,
        id: user.id,
    }))
}

/// Register and log in at once
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .directory
        .create(&request.username, &request.password)
        .await?;
    let access_token = state.tokens.issue(user.id)?;

    Ok((
        [(LOCATION, format!("/users/{}", user.id))],
        Json(TokenResponse {
            access_token,
            id: user.id,
        }),
    ))
}
