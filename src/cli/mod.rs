//! Administrative operations behind `edunexia-cli`.
//!
//! The HTTP API never creates system roles or Super Admin accounts; both come
//! from here.

pub mod seeder;

use anyhow::{Context, anyhow, bail};
use sqlx::PgPool;

use edunexia_core::hash_password;
use edunexia_models::{
    CreateRoleDto, Role, RoleId, RolePermissionAck, RoleScope, UserId, system_roles,
};

use crate::modules::permissions::service as permission_service;
use crate::modules::roles::service as role_service;

/// Creates a user holding the Super Admin role.
///
/// Requires `seed` to have run so the role exists.
pub async fn create_admin(
    db: &PgPool,
    full_name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<UserId> {
    let hashed_password = hash_password(password).map_err(|e| e.error)?;

    role_service::get_role_by_id(db, system_roles::SUPER_ADMIN)
        .await
        .map_err(|_| anyhow!("Super Admin role is missing; run `edunexia-cli seed` first"))?;

    let id: Option<UserId> = sqlx::query_scalar(
        r#"INSERT INTO users (full_name, email, password, role_id)
           VALUES ($1, $2, $3, $4)
           ON CONFLICT (email) DO NOTHING
           RETURNING id"#,
    )
    .bind(full_name.trim())
    .bind(email.trim().to_lowercase())
    .bind(hashed_password)
    .bind(system_roles::SUPER_ADMIN)
    .fetch_optional(db)
    .await
    .context("Failed to insert user")?;

    id.ok_or_else(|| anyhow!("User with this email already exists"))
}

/// Finds a role by UUID or, failing that, by case-insensitive name.
pub async fn resolve_role(db: &PgPool, reference: &str) -> anyhow::Result<Role> {
    if let Ok(id) = reference.parse::<RoleId>() {
        return role_service::get_role_by_id(db, id)
            .await
            .map_err(|e| e.error);
    }
    role_service::get_role_by_name(db, reference)
        .await
        .map_err(|e| e.error)
}

pub async fn create_role(
    db: &PgPool,
    name: &str,
    description: &str,
    scope: RoleScope,
) -> anyhow::Result<Role> {
    use validator::Validate;

    let dto = CreateRoleDto {
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        scope,
    };
    if let Err(errors) = dto.validate() {
        bail!("{}", errors);
    }

    role_service::create_role(db, dto).await.map_err(|e| e.error)
}

pub async fn delete_role(db: &PgPool, role: &Role) -> anyhow::Result<()> {
    role_service::delete_role(db, role.id)
        .await
        .map_err(|e| e.error)
}

/// Links `action:resource` to a custom role.
pub async fn grant_permission(
    db: &PgPool,
    role: &Role,
    permission_name: &str,
) -> anyhow::Result<RolePermissionAck> {
    let permission = permission_service::get_permission_by_name(db, permission_name)
        .await
        .map_err(|e| e.error)?;

    role_service::add_permission_to_role(db, role.id, permission.id)
        .await
        .map_err(|e| e.error)
}

/// Unlinks `action:resource` from a custom role.
pub async fn revoke_permission(
    db: &PgPool,
    role: &Role,
    permission_name: &str,
) -> anyhow::Result<()> {
    let permission = permission_service::get_permission_by_name(db, permission_name)
        .await
        .map_err(|e| e.error)?;

    role_service::remove_permission_from_role(db, role.id, permission.id)
        .await
        .map_err(|e| e.error)
}
