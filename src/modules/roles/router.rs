use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

use super::controller::{
    add_permission, create_role, delete_role, get_available_permissions,
    get_grouped_role_permissions, get_role, get_role_permissions, get_roles, remove_permission,
    update_role,
};

pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_roles).post(create_role))
        .route(
            "/{role_id}",
            get(get_role).put(update_role).delete(delete_role),
        )
        // Role permission management
        .route(
            "/{role_id}/permissions",
            get(get_role_permissions).post(add_permission),
        )
        .route(
            "/{role_id}/permissions/grouped",
            get(get_grouped_role_permissions),
        )
        .route(
            "/{role_id}/permissions/available",
            get(get_available_permissions),
        )
        .route(
            "/{role_id}/permissions/{permission_id}",
            delete(remove_permission),
        )
}
