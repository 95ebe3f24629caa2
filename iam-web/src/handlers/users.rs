//! User and grant endpoints
//!
//! `{find}` is a numeric id or, failing that, a username.

use super::{auth::CredentialsRequest, list_response, require_permission, JsonBody};
use crate::{auth::ActingIdentity, error::ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Json, Response},
};
use iam_core::{system_permissions, SelfAction, UserLookup};
use serde_json::json;

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Response> {
    let users = state.directory.list_all().await?;
    list_response("users", users)
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(find): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = state.directory.find(&UserLookup::parse(&find)).await?;
    Ok(Json(json!({ "user": user })))
}

/// Create a user on someone else's behalf
pub async fn create_user(
    State(state): State<AppState>,
    identity: ActingIdentity,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    require_permission(&state, &identity, system_permissions::CREATE_USER).await?;

    let user = state
        .directory
        .create(&request.username, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/users/{}", user.id))],
        Json(json!({ "user": user })),
    ))
}

pub async fn delete_user(
    State(state): State<AppState>,
    identity: ActingIdentity,
    Path(find): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let principal = require_permission(&state, &identity, system_permissions::DELETE_USER).await?;

    let user = state.directory.find(&UserLookup::parse(&find)).await?;
    principal.ensure_not_self(user.id, SelfAction::Delete)?;

    state.directory.delete(user.id).await?;
    Ok(Json(json!({})))
}

pub async fn list_user_permissions(
    State(state): State<AppState>,
    Path(find): Path<String>,
) -> ApiResult<Response> {
    let user = state.directory.find(&UserLookup::parse(&find)).await?;
    let grants = state.ledger.list_by_user(user.id).await?;
    list_response("user_permissions", grants)
}

pub async fn grant_permission(
    State(state): State<AppState>,
    identity: ActingIdentity,
    Path((find, permission_name)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let principal =
        require_permission(&state, &identity, system_permissions::GRANT_PERMISSION).await?;

    let user = state.directory.find(&UserLookup::parse(&find)).await?;
    principal.ensure_not_self(user.id, SelfAction::Grant)?;

    let permission = state.registry.get_by_name(&permission_name).await?;
    let grant = state.ledger.grant(user.id, permission.id).await?;

    Ok((
        StatusCode::CREATED,
        [(
            LOCATION,
            format!("/users/{}/permissions/{}", user.id, grant.permission_name),
        )],
        Json(json!({ "user_permission": grant })),
    ))
}

pub async fn revoke_permission(
    State(state): State<AppState>,
    identity: ActingIdentity,
    Path((find, permission_name)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let principal =
        require_permission(&state, &identity, system_permissions::REVOKE_PERMISSION).await?;

    let user = state.directory.find(&UserLookup::parse(&find)).await?;
    principal.ensure_not_self(user.id, SelfAction::Revoke)?;

    let permission = state.registry.get_by_name(&permission_name).await?;
    let grant = state.ledger.get_grant(user.id, permission.id).await?;
    state.ledger.revoke(grant.id).await?;

    Ok(Json(json!({})))
}
