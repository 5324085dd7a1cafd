use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use edunexia_auth::{Session, verify_token};
use edunexia_core::AppError;
use edunexia_models::UserId;

use crate::state::AppState;

/// Extractor that validates the bearer token and yields the caller's [`Session`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Session);

impl AuthUser {
    pub fn has_permission(&self, resource: &str, action: &str) -> bool {
        self.0.has_permission(resource, action)
    }

    pub fn user_id(&self) -> UserId {
        UserId::from(self.0.user_id)
    }

    pub fn session(&self) -> &Session {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;
        let session = Session::from_claims(claims)?;

        Ok(AuthUser(session))
    }
}

/// Declares an extractor that authenticates the caller and rejects with 403
/// unless the session grants `(resource, action)`.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $resource:expr, $action:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = edunexia_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;

                if !auth_user.has_permission($resource, $action) {
                    $crate::metrics::track_authorization_denied($resource, $action);
                    tracing::warn!(
                        user_id = %auth_user.user_id(),
                        resource = $resource,
                        action = $action,
                        "Permission denied"
                    );
                    return Err(edunexia_core::AppError::forbidden(format!(
                        "Access denied. Missing required permission: {}",
                        edunexia_core::permissions::permission_name($action, $resource)
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

use edunexia_core::permissions::{actions, resources};

// Roles
require_permission!(RequireRolesRead, resources::ROLES, actions::READ);
require_permission!(RequireRolesCreate, resources::ROLES, actions::CREATE);
require_permission!(RequireRolesUpdate, resources::ROLES, actions::UPDATE);
require_permission!(RequireRolesDelete, resources::ROLES, actions::DELETE);

// Permission catalog
require_permission!(
    RequirePermissionsRead,
    resources::PERMISSIONS,
    actions::READ
);
