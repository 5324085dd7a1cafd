use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;

use edunexia_core::AppError;
use edunexia_models::{Permission, PermissionGroup, PermissionId, group_by_resource};

const PERMISSION_COLUMNS: &str = "id, resource, action, description, name, created_at";

#[instrument(skip(db))]
pub async fn get_all_permissions(
    db: &PgPool,
    resource: Option<&str>,
) -> Result<Vec<Permission>, AppError> {
    let permissions = match resource {
        Some(resource) => {
            sqlx::query_as::<_, Permission>(&format!(
                "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE resource = $1 ORDER BY resource, action"
            ))
            .bind(resource)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Permission>(&format!(
                "SELECT {PERMISSION_COLUMNS} FROM permissions ORDER BY resource, action"
            ))
            .fetch_all(db)
            .await?
        }
    };

    Ok(permissions)
}

#[instrument(skip(db))]
pub async fn get_grouped_permissions(db: &PgPool) -> Result<Vec<PermissionGroup>, AppError> {
    let permissions = get_all_permissions(db, None).await?;
    Ok(group_by_resource(permissions))
}

#[instrument(skip(db))]
pub async fn get_permission_by_id(db: &PgPool, id: PermissionId) -> Result<Permission, AppError> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Permission not found")))
}

/// Looks a permission up by its `action:resource` name.
#[instrument(skip(db))]
pub async fn get_permission_by_name(db: &PgPool, name: &str) -> Result<Permission, AppError> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE name = $1"
    ))
    .bind(name)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Permission '{}' not found", name)))
}
