use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};

use edunexia_core::AppError;
use edunexia_models::{
    CreateRoleDto, Permission, PermissionGroup, PermissionId, Role, RoleId, RolePermissionAck,
    RolePermissionDetail, UpdateRoleDto, available_permissions, group_by_resource,
};

use crate::modules::permissions::service as permission_service;

const ROLE_COLUMNS: &str = "id, name, description, scope, is_system, created_at, updated_at";

#[derive(FromRow)]
struct RoleWithCount {
    #[sqlx(flatten)]
    role: Role,
    permission_count: i64,
}

#[derive(FromRow)]
struct LinkedPermissionRow {
    role_id: RoleId,
    permission_id: PermissionId,
    linked_at: DateTime<Utc>,
    #[sqlx(flatten)]
    permission: Permission,
}

impl From<LinkedPermissionRow> for RolePermissionDetail {
    fn from(row: LinkedPermissionRow) -> Self {
        RolePermissionDetail {
            role_id: row.role_id,
            permission_id: row.permission_id,
            created_at: row.linked_at,
            permission: row.permission,
        }
    }
}

fn map_name_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow!("A role with this name already exists"));
        }
    }
    AppError::from(e)
}

fn ensure_custom(role: &Role, operation: &'static str) -> Result<(), AppError> {
    if role.is_system {
        crate::metrics::track_system_role_protected(operation);
        return Err(AppError::forbidden(format!(
            "System role '{}' cannot be modified",
            role.name
        )));
    }
    Ok(())
}

// ============ Role Services ============

/// Every role with the number of linked permissions, system roles first.
#[instrument(skip(db))]
pub async fn get_roles(
    db: &PgPool,
    search: Option<&str>,
) -> Result<Vec<(Role, i64)>, AppError> {
    let rows = sqlx::query_as::<_, RoleWithCount>(
        r#"SELECT r.id, r.name, r.description, r.scope, r.is_system, r.created_at, r.updated_at,
                  COUNT(rp.permission_id) AS permission_count
           FROM roles r
           LEFT JOIN role_permissions rp ON rp.role_id = r.id
           GROUP BY r.id
           ORDER BY r.is_system DESC, r.name"#,
    )
    .fetch_all(db)
    .await?;

    let Some(needle) = search else {
        return Ok(rows.into_iter().map(|r| (r.role, r.permission_count)).collect());
    };

    Ok(rows
        .into_iter()
        .filter(|row| row.role.matches_search(needle))
        .map(|row| (row.role, row.permission_count))
        .collect())
}

#[instrument(skip(db))]
pub async fn get_role_by_id(db: &PgPool, id: RoleId) -> Result<Role, AppError> {
    sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))
}

#[instrument(skip(db))]
pub async fn get_role_by_name(db: &PgPool, name: &str) -> Result<Role, AppError> {
    sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE LOWER(name) = LOWER($1)"
    ))
    .bind(name.trim())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Role '{}' not found", name)))
}

#[instrument(skip(db))]
pub async fn count_role_permissions(db: &PgPool, id: RoleId) -> Result<i64, AppError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM role_permissions WHERE role_id = $1")
            .bind(id)
            .fetch_one(db)
            .await?;
    Ok(count)
}

/// Creates a custom role. Roles created here are never system roles.
#[instrument(skip(db))]
pub async fn create_role(db: &PgPool, dto: CreateRoleDto) -> Result<Role, AppError> {
    let role = sqlx::query_as::<_, Role>(&format!(
        r#"INSERT INTO roles (name, description, scope, is_system)
           VALUES ($1, $2, $3, false)
           RETURNING {ROLE_COLUMNS}"#
    ))
    .bind(dto.name.trim())
    .bind(dto.description.trim())
    .bind(dto.scope)
    .fetch_one(db)
    .await
    .map_err(map_name_conflict)?;

    crate::metrics::track_role_created(role.scope.as_str());
    info!(role_id = %role.id, name = %role.name, scope = %role.scope, "Role created");

    Ok(role)
}

/// Applies the fields present in `dto`. Last write wins.
#[instrument(skip(db))]
pub async fn update_role(db: &PgPool, id: RoleId, dto: UpdateRoleDto) -> Result<Role, AppError> {
    let existing = get_role_by_id(db, id).await?;
    ensure_custom(&existing, "update")?;

    let role = sqlx::query_as::<_, Role>(&format!(
        r#"UPDATE roles
           SET name = COALESCE($2, name),
               description = COALESCE($3, description),
               scope = COALESCE($4, scope),
               updated_at = NOW()
           WHERE id = $1 AND is_system = false
           RETURNING {ROLE_COLUMNS}"#
    ))
    .bind(id)
    .bind(dto.name.as_deref().map(str::trim))
    .bind(dto.description.as_deref().map(str::trim))
    .bind(dto.scope)
    .fetch_optional(db)
    .await
    .map_err(map_name_conflict)?
    .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;

    info!(role_id = %role.id, "Role updated");
    Ok(role)
}

/// Deletes a custom role and, by cascade, its permission links.
///
/// Fails with 409 while any user still holds the role.
#[instrument(skip(db))]
pub async fn delete_role(db: &PgPool, id: RoleId) -> Result<(), AppError> {
    let mut tx = db.begin().await?;

    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;

    ensure_custom(&role, "delete")?;

    let assigned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = $1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    if assigned > 0 {
        return Err(AppError::conflict(anyhow!(
            "Role '{}' is assigned to {} user(s) and cannot be deleted",
            role.name,
            assigned
        )));
    }

    sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::conflict(anyhow!(
                        "Role '{}' is assigned to users and cannot be deleted",
                        role.name
                    ));
                }
            }
            AppError::from(e)
        })?;

    tx.commit().await?;

    crate::metrics::track_role_deleted();
    info!(role_id = %id, name = %role.name, "Role deleted");

    Ok(())
}

// ============ Role Permission Services ============

#[instrument(skip(db))]
pub async fn get_role_permissions(
    db: &PgPool,
    role_id: RoleId,
) -> Result<Vec<RolePermissionDetail>, AppError> {
    get_role_by_id(db, role_id).await?;

    let rows = sqlx::query_as::<_, LinkedPermissionRow>(
        r#"SELECT rp.role_id, rp.permission_id, rp.created_at AS linked_at,
                  p.id, p.resource, p.action, p.description, p.name, p.created_at
           FROM role_permissions rp
           JOIN permissions p ON p.id = rp.permission_id
           WHERE rp.role_id = $1
           ORDER BY p.resource, p.action"#,
    )
    .bind(role_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(RolePermissionDetail::from).collect())
}

#[instrument(skip(db))]
pub async fn get_grouped_role_permissions(
    db: &PgPool,
    role_id: RoleId,
) -> Result<Vec<PermissionGroup>, AppError> {
    let linked = get_role_permissions(db, role_id).await?;
    Ok(group_by_resource(
        linked.into_iter().map(|link| link.permission).collect(),
    ))
}

/// Catalog entries not yet linked to the role.
#[instrument(skip(db))]
pub async fn get_available_permissions(
    db: &PgPool,
    role_id: RoleId,
) -> Result<Vec<Permission>, AppError> {
    let linked = get_role_permissions(db, role_id).await?;
    let catalog = permission_service::get_all_permissions(db, None).await?;
    Ok(available_permissions(
        catalog,
        linked.iter().map(|link| link.permission_id),
    ))
}

/// `action:resource` names granted by a role, sorted.
#[instrument(skip(db))]
pub async fn get_role_permission_names(
    db: &PgPool,
    role_id: RoleId,
) -> Result<Vec<String>, AppError> {
    let names: Vec<String> = sqlx::query_scalar(
        r#"SELECT p.name
           FROM role_permissions rp
           JOIN permissions p ON p.id = rp.permission_id
           WHERE rp.role_id = $1
           ORDER BY p.name"#,
    )
    .bind(role_id)
    .fetch_all(db)
    .await?;

    Ok(names)
}

/// Links a permission to a custom role. Linking an already linked
/// permission is acknowledged without creating a duplicate.
#[instrument(skip(db))]
pub async fn add_permission_to_role(
    db: &PgPool,
    role_id: RoleId,
    permission_id: PermissionId,
) -> Result<RolePermissionAck, AppError> {
    let role = get_role_by_id(db, role_id).await?;
    ensure_custom(&role, "grant")?;
    let permission = permission_service::get_permission_by_id(db, permission_id).await?;

    let inserted = sqlx::query(
        r#"INSERT INTO role_permissions (role_id, permission_id)
           VALUES ($1, $2)
           ON CONFLICT (role_id, permission_id) DO NOTHING"#,
    )
    .bind(role_id)
    .bind(permission_id)
    .execute(db)
    .await?
    .rows_affected();

    if inserted > 0 {
        crate::metrics::track_permission_granted();
        info!(role_id = %role_id, permission = %permission.name, "Permission added to role");
    }

    Ok(RolePermissionAck {
        message: format!(
            "Permission '{}' linked to role '{}'",
            permission.name, role.name
        ),
        role_id,
        permission_id,
    })
}

#[instrument(skip(db))]
pub async fn remove_permission_from_role(
    db: &PgPool,
    role_id: RoleId,
    permission_id: PermissionId,
) -> Result<(), AppError> {
    let role = get_role_by_id(db, role_id).await?;
    ensure_custom(&role, "revoke")?;

    let removed = sqlx::query(
        "DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2",
    )
    .bind(role_id)
    .bind(permission_id)
    .execute(db)
    .await?
    .rows_affected();

    if removed == 0 {
        return Err(AppError::not_found(anyhow!(
            "Permission is not linked to this role"
        )));
    }

    crate::metrics::track_permission_revoked();
    info!(role_id = %role_id, permission_id = %permission_id, "Permission removed from role");

    Ok(())
}
