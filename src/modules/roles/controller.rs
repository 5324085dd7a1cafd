use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use edunexia_core::AppError;
use edunexia_models::{
    AddPermissionDto, CreateRoleDto, Permission, PermissionGroup, PermissionId, RoleFilterParams,
    RoleId, RolePermissionAck, RolePermissionDetail, RoleView, UpdateRoleDto,
};

use crate::middleware::auth::{
    RequireRolesCreate, RequireRolesDelete, RequireRolesRead, RequireRolesUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service;

// ============ Role Endpoints ============

#[utoipa::path(
    get,
    path = "/api/roles",
    params(RoleFilterParams),
    responses(
        (status = 200, description = "Roles with badges, capabilities and permission counts", body = Vec<RoleView>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing read:roles")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_roles(
    State(state): State<AppState>,
    RequireRolesRead(auth_user): RequireRolesRead,
    Query(params): Query<RoleFilterParams>,
) -> Result<Json<Vec<RoleView>>, AppError> {
    let roles = service::get_roles(&state.db, params.search.as_deref()).await?;
    let permissions = &auth_user.session().permissions;

    let views = roles
        .into_iter()
        .map(|(role, count)| RoleView::for_session(role, permissions).with_permission_count(count))
        .collect();

    Ok(Json(views))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created", body = RoleView),
        (status = 400, description = "Missing or malformed field"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing create:roles"),
        (status = 409, description = "A role with this name already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    RequireRolesCreate(auth_user): RequireRolesCreate,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<RoleView>), AppError> {
    let role = service::create_role(&state.db, dto).await?;
    let view = RoleView::for_session(role, &auth_user.session().permissions)
        .with_permission_count(0);
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/roles/{role_id}",
    params(
        ("role_id" = RoleId, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role details", body = RoleView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing read:roles"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_role(
    State(state): State<AppState>,
    RequireRolesRead(auth_user): RequireRolesRead,
    Path(role_id): Path<RoleId>,
) -> Result<Json<RoleView>, AppError> {
    let role = service::get_role_by_id(&state.db, role_id).await?;
    let count = service::count_role_permissions(&state.db, role_id).await?;
    Ok(Json(
        RoleView::for_session(role, &auth_user.session().permissions).with_permission_count(count),
    ))
}

#[utoipa::path(
    put,
    path = "/api/roles/{role_id}",
    params(
        ("role_id" = RoleId, Path, description = "Role ID")
    ),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = RoleView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing update:roles, or the role is a system role"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "A role with this name already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn update_role(
    State(state): State<AppState>,
    RequireRolesUpdate(auth_user): RequireRolesUpdate,
    Path(role_id): Path<RoleId>,
    ValidatedJson(dto): ValidatedJson<UpdateRoleDto>,
) -> Result<Json<RoleView>, AppError> {
    let role = service::update_role(&state.db, role_id, dto).await?;
    Ok(Json(RoleView::for_session(
        role,
        &auth_user.session().permissions,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{role_id}",
    params(
        ("role_id" = RoleId, Path, description = "Role ID")
    ),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing delete:roles, or the role is a system role"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role is still assigned to users")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn delete_role(
    State(state): State<AppState>,
    _auth: RequireRolesDelete,
    Path(role_id): Path<RoleId>,
) -> Result<StatusCode, AppError> {
    service::delete_role(&state.db, role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ Role Permission Endpoints ============

#[utoipa::path(
    get,
    path = "/api/roles/{role_id}/permissions",
    params(
        ("role_id" = RoleId, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Permissions linked to the role", body = Vec<RolePermissionDetail>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing read:roles"),
        (status = 404, description = "Role not found")
    ),
    tag = "Role Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_role_permissions(
    State(state): State<AppState>,
    _auth: RequireRolesRead,
    Path(role_id): Path<RoleId>,
) -> Result<Json<Vec<RolePermissionDetail>>, AppError> {
    let links = service::get_role_permissions(&state.db, role_id).await?;
    Ok(Json(links))
}

#[utoipa::path(
    get,
    path = "/api/roles/{role_id}/permissions/grouped",
    params(
        ("role_id" = RoleId, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Linked permissions grouped by resource", body = Vec<PermissionGroup>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing read:roles"),
        (status = 404, description = "Role not found")
    ),
    tag = "Role Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_grouped_role_permissions(
    State(state): State<AppState>,
    _auth: RequireRolesRead,
    Path(role_id): Path<RoleId>,
) -> Result<Json<Vec<PermissionGroup>>, AppError> {
    let groups = service::get_grouped_role_permissions(&state.db, role_id).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    get,
    path = "/api/roles/{role_id}/permissions/available",
    params(
        ("role_id" = RoleId, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Catalog entries not yet linked to the role", body = Vec<Permission>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing read:roles"),
        (status = 404, description = "Role not found")
    ),
    tag = "Role Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_available_permissions(
    State(state): State<AppState>,
    _auth: RequireRolesRead,
    Path(role_id): Path<RoleId>,
) -> Result<Json<Vec<Permission>>, AppError> {
    let available = service::get_available_permissions(&state.db, role_id).await?;
    Ok(Json(available))
}

#[utoipa::path(
    post,
    path = "/api/roles/{role_id}/permissions",
    params(
        ("role_id" = RoleId, Path, description = "Role ID")
    ),
    request_body = AddPermissionDto,
    responses(
        (status = 200, description = "Permission linked (or already linked)", body = RolePermissionAck),
        (status = 400, description = "permissionId is required"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing update:roles, or the role is a system role"),
        (status = 404, description = "Role or permission not found")
    ),
    tag = "Role Permissions",
    security(("bearer_auth" = []))
)]
pub async fn add_permission(
    State(state): State<AppState>,
    _auth: RequireRolesUpdate,
    Path(role_id): Path<RoleId>,
    ValidatedJson(dto): ValidatedJson<AddPermissionDto>,
) -> Result<Json<RolePermissionAck>, AppError> {
    let ack = service::add_permission_to_role(&state.db, role_id, dto.permission_id).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{role_id}/permissions/{permission_id}",
    params(
        ("role_id" = RoleId, Path, description = "Role ID"),
        ("permission_id" = PermissionId, Path, description = "Permission ID")
    ),
    responses(
        (status = 204, description = "Permission unlinked"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing update:roles, or the role is a system role"),
        (status = 404, description = "Role not found or permission not linked")
    ),
    tag = "Role Permissions",
    security(("bearer_auth" = []))
)]
pub async fn remove_permission(
    State(state): State<AppState>,
    _auth: RequireRolesUpdate,
    Path((role_id, permission_id)): Path<(RoleId, PermissionId)>,
) -> Result<StatusCode, AppError> {
    service::remove_permission_from_role(&state.db, role_id, permission_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
