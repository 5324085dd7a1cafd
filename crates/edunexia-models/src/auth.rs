use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use edunexia_auth::Session;

use crate::ids::{RoleId, UserId};
use crate::users::User;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "admin@edunexia.com.br")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
    /// `action:resource` names granted by the user's role
    pub permissions: Vec<String>,
}

/// The caller as seen by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: UserId,
    pub email: String,
    pub role_id: Option<RoleId>,
    pub permissions: Vec<String>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            user_id: UserId::from(session.user_id),
            email: session.email.clone(),
            role_id: session.role_id.map(RoleId::from),
            permissions: session.permissions.names(),
        }
    }
}
