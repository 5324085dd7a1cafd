//! Access token issue and verification.
//!
//! Tokens are HS256 JWTs signed with `JWT_SECRET`. They embed the user's
//! role id and the `action:resource` names that role granted when the token
//! was issued, so a permission change takes effect at the next login.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use edunexia_config::JwtConfig;
use edunexia_core::AppError;

use crate::claims::Claims;

/// Creates an access token for `user_id` carrying its role's permission names.
///
/// # Errors
///
/// Returns an internal error if encoding fails.
pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role_id: Option<Uuid>,
    permissions: Vec<String>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = (now + jwt_config.access_token_expiry) as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role_id,
        permissions,
        exp,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry, returning the embedded claims.
///
/// # Errors
///
/// Returns an unauthorized error for a bad signature, an expired token or
/// a malformed token.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}
