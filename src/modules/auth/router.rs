use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_governor::GovernorLayer;

use crate::state::AppState;

use super::controller::{get_session, login_user};

/// Login sits behind a per-IP governor unless rate limiting is disabled.
pub fn init_auth_router(state: &AppState) -> Router<AppState> {
    let login = match state.rate_limit_config.auth_governor_config() {
        Some(governor) => Router::new()
            .route("/login", post(login_user))
            .layer(GovernorLayer::new(Arc::new(governor))),
        None => Router::new().route("/login", post(login_user)),
    };

    Router::new()
        .merge(login)
        .route("/me", get(get_session))
}
