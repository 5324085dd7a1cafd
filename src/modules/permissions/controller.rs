use axum::{
    Json,
    extract::{Path, Query, State},
};

use edunexia_core::AppError;
use edunexia_models::{Permission, PermissionFilterParams, PermissionGroup, PermissionId};

use crate::middleware::auth::RequirePermissionsRead;
use crate::state::AppState;

use super::service;

#[utoipa::path(
    get,
    path = "/api/permissions",
    params(PermissionFilterParams),
    responses(
        (status = 200, description = "Permission catalog ordered by resource and action", body = Vec<Permission>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing read:permissions")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_permissions(
    State(state): State<AppState>,
    _auth: RequirePermissionsRead,
    Query(params): Query<PermissionFilterParams>,
) -> Result<Json<Vec<Permission>>, AppError> {
    let permissions = service::get_all_permissions(&state.db, params.resource.as_deref()).await?;
    Ok(Json(permissions))
}

#[utoipa::path(
    get,
    path = "/api/permissions/grouped",
    responses(
        (status = 200, description = "Permission catalog grouped by resource", body = Vec<PermissionGroup>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing read:permissions")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_grouped_permissions(
    State(state): State<AppState>,
    _auth: RequirePermissionsRead,
) -> Result<Json<Vec<PermissionGroup>>, AppError> {
    let groups = service::get_grouped_permissions(&state.db).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    get,
    path = "/api/permissions/{permission_id}",
    params(
        ("permission_id" = PermissionId, Path, description = "Permission ID")
    ),
    responses(
        (status = 200, description = "Permission details", body = Permission),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing read:permissions"),
        (status = 404, description = "Permission not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_permission(
    State(state): State<AppState>,
    _auth: RequirePermissionsRead,
    Path(permission_id): Path<PermissionId>,
) -> Result<Json<Permission>, AppError> {
    let permission = service::get_permission_by_id(&state.db, permission_id).await?;
    Ok(Json(permission))
}
