use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use edunexia_models::{
    AddPermissionDto, Badge, BadgeColor, CreateRoleDto, LoginRequest, LoginResponse, Permission,
    PermissionFilterParams, PermissionGroup, Role, RoleCapabilities, RoleFilterParams, RoleKind,
    RolePermissionAck, RolePermissionDetail, RoleScope, RoleView, SessionResponse, UpdateRoleDto,
    User,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_session,
        crate::modules::permissions::controller::get_permissions,
        crate::modules::permissions::controller::get_grouped_permissions,
        crate::modules::permissions::controller::get_permission,
        crate::modules::roles::controller::get_roles,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::get_role,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::delete_role,
        crate::modules::roles::controller::get_role_permissions,
        crate::modules::roles::controller::get_grouped_role_permissions,
        crate::modules::roles::controller::get_available_permissions,
        crate::modules::roles::controller::add_permission,
        crate::modules::roles::controller::remove_permission,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            SessionResponse,
            User,
            Permission,
            PermissionGroup,
            PermissionFilterParams,
            Role,
            RoleScope,
            RoleKind,
            RoleView,
            RoleCapabilities,
            RoleFilterParams,
            Badge,
            BadgeColor,
            CreateRoleDto,
            UpdateRoleDto,
            AddPermissionDto,
            RolePermissionDetail,
            RolePermissionAck,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and session endpoints"),
        (name = "Permissions", description = "Read-only permission catalog"),
        (name = "Roles", description = "Role management"),
        (name = "Role Permissions", description = "Links between roles and catalog permissions")
    ),
    info(
        title = "EdunexIA Access Control API",
        version = "0.1.0",
        description = "Roles, permissions and capability checks for the EdunexIA platform.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
