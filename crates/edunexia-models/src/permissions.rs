use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{BTreeMap, HashSet};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{PermissionId, RoleId};

/// A `(resource, action)` pair from the seeded catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: PermissionId,
    #[schema(example = "courses")]
    pub resource: String,
    #[schema(example = "create")]
    pub action: String,
    #[schema(example = "Criar cursos")]
    pub description: String,
    /// `action:resource`, generated by the database
    #[schema(example = "create:courses")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Permissions sharing one resource, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGroup {
    pub resource: String,
    pub permissions: Vec<Permission>,
}

/// Groups permissions by resource. Groups are ordered by resource name and
/// keep the input order inside each group.
pub fn group_by_resource(permissions: Vec<Permission>) -> Vec<PermissionGroup> {
    let mut groups: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
    for permission in permissions {
        groups
            .entry(permission.resource.clone())
            .or_default()
            .push(permission);
    }

    groups
        .into_iter()
        .map(|(resource, permissions)| PermissionGroup {
            resource,
            permissions,
        })
        .collect()
}

/// Catalog entries not yet linked to a role.
pub fn available_permissions(
    catalog: Vec<Permission>,
    linked: impl IntoIterator<Item = PermissionId>,
) -> Vec<Permission> {
    let linked: HashSet<PermissionId> = linked.into_iter().collect();
    catalog
        .into_iter()
        .filter(|permission| !linked.contains(&permission.id))
        .collect()
}

/// A role↔permission link expanded with the linked permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionDetail {
    pub role_id: RoleId,
    pub permission_id: PermissionId,
    pub created_at: DateTime<Utc>,
    pub permission: Permission,
}

// DTOs

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPermissionDto {
    pub permission_id: PermissionId,
}

/// Returned by add-permission whether or not the link already existed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionAck {
    pub message: String,
    pub role_id: RoleId,
    pub permission_id: PermissionId,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PermissionFilterParams {
    /// Exact resource name, e.g. `courses`
    pub resource: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(resource: &str, action: &str) -> Permission {
        Permission {
            id: PermissionId::new(),
            resource: resource.to_string(),
            action: action.to_string(),
            description: format!("{} {}", action, resource),
            name: format!("{}:{}", action, resource),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_by_resource_orders_groups_and_keeps_members() {
        let groups = group_by_resource(vec![
            permission("roles", "read"),
            permission("courses", "create"),
            permission("roles", "update"),
            permission("courses", "read"),
        ]);

        let resources: Vec<&str> = groups.iter().map(|g| g.resource.as_str()).collect();
        assert_eq!(resources, vec!["courses", "roles"]);

        let role_actions: Vec<&str> = groups[1]
            .permissions
            .iter()
            .map(|p| p.action.as_str())
            .collect();
        assert_eq!(role_actions, vec!["read", "update"]);
    }

    #[test]
    fn test_group_by_resource_empty() {
        assert!(group_by_resource(Vec::new()).is_empty());
    }

    #[test]
    fn test_available_excludes_linked() {
        let read = permission("roles", "read");
        let update = permission("roles", "update");
        let delete = permission("roles", "delete");
        let linked = vec![read.id, delete.id];

        let available =
            available_permissions(vec![read, update.clone(), delete], linked);
        assert_eq!(available, vec![update]);
    }

    #[test]
    fn test_add_permission_dto_uses_camel_case() {
        let id = PermissionId::new();
        let dto: AddPermissionDto =
            serde_json::from_value(serde_json::json!({ "permissionId": id.to_string() })).unwrap();
        assert_eq!(dto.permission_id, id);

        let missing: Result<AddPermissionDto, _> = serde_json::from_str("{}");
        assert!(missing.is_err());
    }

    #[test]
    fn test_permission_serializes_camel_case() {
        let json = serde_json::to_value(permission("courses", "create")).unwrap();
        assert_eq!(json["name"], "create:courses");
        assert!(json.get("createdAt").is_some());
    }
}
