use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use edunexia_auth::{PermissionGuard, PermissionSet};
use edunexia_core::permissions::{actions, resources};
use edunexia_core::serde::{deserialize_optional_trimmed, deserialize_trimmed};

use crate::badges::{Badge, BadgeColor};
use crate::ids::RoleId;

/// Organizational breadth at which a role applies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "role_scope", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoleScope {
    Global,
    Institution,
    Polo,
}

impl RoleScope {
    pub const ALL: [RoleScope; 3] = [RoleScope::Global, RoleScope::Institution, RoleScope::Polo];

    pub const fn as_str(&self) -> &'static str {
        match self {
            RoleScope::Global => "global",
            RoleScope::Institution => "institution",
            RoleScope::Polo => "polo",
        }
    }

    pub const fn badge(&self) -> Badge {
        match self {
            RoleScope::Global => Badge::new("Global", BadgeColor::Purple),
            RoleScope::Institution => Badge::new("Instituição", BadgeColor::Blue),
            RoleScope::Polo => Badge::new("Polo", BadgeColor::Green),
        }
    }
}

impl fmt::Display for RoleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleScope::ALL
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("scope must be one of: global, institution, polo (got '{}')", s)
            })
    }
}

/// Whether a role ships with the platform or was created by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    System,
    Custom,
}

impl RoleKind {
    pub const fn badge(&self) -> Badge {
        match self {
            RoleKind::System => Badge::new("Sistema", BadgeColor::Amber),
            RoleKind::Custom => Badge::new("Customizado", BadgeColor::Gray),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    #[schema(example = "Gerente Financeiro")]
    pub name: String,
    #[schema(example = "Acesso à gestão financeira")]
    pub description: String,
    pub scope: RoleScope,
    /// Seeded roles; never editable or deletable.
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        if self.is_system {
            RoleKind::System
        } else {
            RoleKind::Custom
        }
    }

    /// Case-insensitive substring match over name, description and scope.
    ///
    /// Scope matches both its stored value (`institution`) and its display
    /// label (`Instituição`). A blank needle matches every role.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            self.name.as_str(),
            self.description.as_str(),
            self.scope.as_str(),
            self.scope.badge().label,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Which management controls the caller may be shown for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleCapabilities {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_manage_permissions: bool,
}

impl RoleCapabilities {
    pub const NONE: RoleCapabilities = RoleCapabilities {
        can_edit: false,
        can_delete: false,
        can_manage_permissions: false,
    };

    /// System roles expose no controls regardless of the caller's grants.
    pub fn for_role(role: &Role, permissions: &PermissionSet) -> Self {
        if role.is_system {
            return Self::NONE;
        }

        let can_update = PermissionGuard::new(resources::ROLES, actions::UPDATE).allows(permissions);
        let can_delete = PermissionGuard::new(resources::ROLES, actions::DELETE).allows(permissions);

        Self {
            can_edit: can_update,
            can_delete,
            can_manage_permissions: can_update,
        }
    }
}

/// A role as presented to a particular session.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleView {
    #[serde(flatten)]
    pub role: Role,
    pub scope_badge: Badge,
    pub kind_badge: Badge,
    pub capabilities: RoleCapabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_count: Option<i64>,
}

impl RoleView {
    pub fn for_session(role: Role, permissions: &PermissionSet) -> Self {
        Self {
            scope_badge: role.scope.badge(),
            kind_badge: role.kind().badge(),
            capabilities: RoleCapabilities::for_role(&role, permissions),
            permission_count: None,
            role,
        }
    }

    pub fn with_permission_count(mut self, count: i64) -> Self {
        self.permission_count = Some(count);
        self
    }
}

// DTOs

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleDto {
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(length(
        min = 3,
        max = 100,
        message = "Name must be between 3 and 100 characters"
    ))]
    #[schema(example = "Gerente Financeiro")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(length(
        min = 5,
        max = 500,
        message = "Description must be between 5 and 500 characters"
    ))]
    #[schema(example = "Acesso à gestão financeira")]
    pub description: String,
    pub scope: RoleScope,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleDto {
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(length(
        min = 3,
        max = 100,
        message = "Name must be between 3 and 100 characters"
    ))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(length(
        min = 5,
        max = 500,
        message = "Description must be between 5 and 500 characters"
    ))]
    pub description: Option<String>,
    pub scope: Option<RoleScope>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RoleFilterParams {
    /// Case-insensitive substring matched against name, description and scope
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str, description: &str, scope: RoleScope, is_system: bool) -> Role {
        let now = Utc::now();
        Role {
            id: RoleId::new(),
            name: name.to_string(),
            description: description.to_string(),
            scope,
            is_system,
            created_at: now,
            updated_at: now,
        }
    }

    fn admin_permissions() -> PermissionSet {
        PermissionSet::from_names(["read:roles", "update:roles", "delete:roles"])
    }

    #[test]
    fn test_scope_badges() {
        assert_eq!(
            RoleScope::Institution.badge(),
            Badge::new("Instituição", BadgeColor::Blue)
        );
        assert_eq!(RoleScope::Global.badge().color, BadgeColor::Purple);
        assert_eq!(RoleScope::Polo.badge().label, "Polo");
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("institution".parse::<RoleScope>(), Ok(RoleScope::Institution));
        assert_eq!(" POLO ".parse::<RoleScope>(), Ok(RoleScope::Polo));
        assert!("campus".parse::<RoleScope>().is_err());
    }

    #[test]
    fn test_system_role_exposes_no_controls() {
        let system = role("Super Admin", "Acesso total", RoleScope::Global, true);
        let caps = RoleCapabilities::for_role(&system, &admin_permissions());
        assert_eq!(caps, RoleCapabilities::NONE);
    }

    #[test]
    fn test_custom_role_controls_follow_permissions() {
        let custom = role("Tutor", "Acompanha alunos", RoleScope::Polo, false);

        let caps = RoleCapabilities::for_role(&custom, &admin_permissions());
        assert!(caps.can_edit && caps.can_delete && caps.can_manage_permissions);

        let read_only = PermissionSet::from_names(["read:roles"]);
        assert_eq!(
            RoleCapabilities::for_role(&custom, &read_only),
            RoleCapabilities::NONE
        );

        let manage = PermissionSet::from_names(["manage:roles"]);
        assert!(RoleCapabilities::for_role(&custom, &manage).can_delete);
    }

    #[test]
    fn test_created_custom_role_view_badges() {
        let created = role(
            "Gerente Financeiro",
            "Acesso à gestão financeira",
            RoleScope::Institution,
            false,
        );
        let view = RoleView::for_session(created, &admin_permissions());

        assert_eq!(view.scope_badge, Badge::new("Instituição", BadgeColor::Blue));
        assert_eq!(view.kind_badge, Badge::new("Customizado", BadgeColor::Gray));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Gerente Financeiro");
        assert_eq!(json["isSystem"], false);
        assert_eq!(json["scope"], "institution");
        assert_eq!(json["scopeBadge"]["label"], "Instituição");
        assert_eq!(json["kindBadge"]["label"], "Customizado");
        assert_eq!(json["capabilities"]["canDelete"], true);
        assert!(json.get("permissionCount").is_none());
    }

    #[test]
    fn test_system_role_view_kind_badge() {
        let system = role("Aluno", "Acesso do aluno", RoleScope::Institution, true);
        let view = RoleView::for_session(system, &admin_permissions()).with_permission_count(4);
        assert_eq!(view.kind_badge.label, "Sistema");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["permissionCount"], 4);
        assert_eq!(json["capabilities"]["canEdit"], false);
    }

    #[test]
    fn test_search_matches_description_case_insensitively() {
        let roles = vec![
            role("Coordenador", "Gestão de CURSOS livres", RoleScope::Institution, false),
            role("Secretaria", "Matrículas e documentos", RoleScope::Polo, false),
        ];

        let found: Vec<&Role> = roles.iter().filter(|r| r.matches_search("cursos")).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Coordenador");
    }

    #[test]
    fn test_search_matches_scope_value_and_label() {
        let polo = role("Secretaria", "Matrículas e documentos", RoleScope::Polo, false);
        let inst = role("Reitoria", "Direção acadêmica", RoleScope::Institution, false);

        assert!(inst.matches_search("INSTITUTION"));
        assert!(inst.matches_search("instituição"));
        assert!(polo.matches_search("polo"));
        assert!(!polo.matches_search("global"));
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        let roles = vec![
            role("A role", "first one", RoleScope::Global, false),
            role("B role", "second one", RoleScope::Polo, true),
        ];
        assert!(roles.iter().all(|r| r.matches_search("   ")));
        assert!(roles.iter().all(|r| r.matches_search("")));
    }

    #[test]
    fn test_create_role_validation() {
        let short_name = CreateRoleDto {
            name: "ab".to_string(),
            description: "Descrição válida".to_string(),
            scope: RoleScope::Global,
        };
        let errors = short_name.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let short_description = CreateRoleDto {
            name: "Gerente".to_string(),
            description: "curt".to_string(),
            scope: RoleScope::Global,
        };
        let errors = short_description.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));

        let ok = CreateRoleDto {
            name: "Gerente Financeiro".to_string(),
            description: "Acesso à gestão financeira".to_string(),
            scope: RoleScope::Institution,
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_create_role_requires_known_scope() {
        let missing: Result<CreateRoleDto, _> =
            serde_json::from_str(r#"{"name":"Gerente","description":"Financeiro"}"#);
        assert!(missing.is_err());

        let unknown: Result<CreateRoleDto, _> = serde_json::from_str(
            r#"{"name":"Gerente","description":"Financeiro","scope":"campus"}"#,
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn test_padding_does_not_count_towards_length() {
        let dto: CreateRoleDto = serde_json::from_str(
            r#"{"name":"   ab   ","description":"        ","scope":"polo"}"#,
        )
        .unwrap();
        assert_eq!(dto.name, "ab");
        assert_eq!(dto.description, "");

        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("description"));

        let update: UpdateRoleDto = serde_json::from_str(r#"{"name":"  x  "}"#).unwrap();
        assert_eq!(update.name.as_deref(), Some("x"));
        assert_eq!(update.description, None);
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_update_role_validation_only_checks_present_fields() {
        assert!(UpdateRoleDto::default().validate().is_ok());

        let bad = UpdateRoleDto {
            name: Some("x".to_string()),
            ..UpdateRoleDto::default()
        };
        assert!(bad.validate().is_err());
    }
}
