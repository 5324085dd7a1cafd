use axum::{Json, extract::State};

use edunexia_core::AppError;
use edunexia_models::{LoginRequest, LoginResponse, SessionResponse};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::AuthService;

/// Login and receive an access token plus the granted permission names
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing or malformed field"),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation failed"),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "Authentication"
)]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login_user(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}

/// The authenticated caller and its permission names
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn get_session(auth_user: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse::from(auth_user.session()))
}
