use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_grouped_permissions, get_permission, get_permissions};

pub fn init_permissions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_permissions))
        .route("/grouped", get(get_grouped_permissions))
        .route("/{permission_id}", get(get_permission))
}
