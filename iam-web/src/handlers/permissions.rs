//! Permission endpoints

use super::{list_response, require_permission, JsonBody};
use crate::{auth::ActingIdentity, error::ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Json, Response},
};
use iam_core::{system_permissions, IamError, IamResult, PermissionId};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PermissionRequest {
    pub name: String,
    pub description: String,
}

fn parse_id(segment: &str) -> IamResult<PermissionId> {
    segment
        .parse::<i64>()
        .map(PermissionId)
        .map_err(|_| IamError::validation("id", "The permission id must be a number"))
}

pub async fn list_permissions(State(state): State<AppState>) -> ApiResult<Response> {
    let permissions = state.registry.list_all().await?;
    list_response("permissions", permissions)
}

pub async fn get_permission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let permission = state.registry.get_by_id(parse_id(&id)?).await?;
    Ok(Json(json!({ "permission": permission })))
}

pub async fn create_permission(
    State(state): State<AppState>,
    identity: ActingIdentity,
    JsonBody(request): JsonBody<PermissionRequest>,
) -> ApiResult<impl IntoResponse> {
    require_permission(&state, &identity, system_permissions::CREATE_PERMISSION).await?;

    let permission = state
        .registry
        .create(&request.name, &request.description)
        .await?;

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/permissions/{}", permission.id))],
        Json(json!({ "permission": permission })),
    ))
}

/// Empty fields keep their current value
pub async fn update_permission(
    State(state): State<AppState>,
    identity: ActingIdentity,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<PermissionRequest>,
) -> ApiResult<impl IntoResponse> {
    require_permission(&state, &identity, system_permissions::UPDATE_PERMISSION).await?;

    let permission = state
        .registry
        .update(parse_id(&id)?, &request.name, &request.description)
        .await?;

    Ok(Json(json!({ "permission": permission })))
}

pub async fn delete_permission(
    State(state): State<AppState>,
    identity: ActingIdentity,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    require_permission(&state, &identity, system_permissions::DELETE_PERMISSION).await?;

    state.registry.delete(parse_id(&id)?).await?;
    Ok(Json(json!({})))
}
