use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument, warn};

use edunexia_auth::create_access_token;
use edunexia_config::JwtConfig;
use edunexia_core::{AppError, hash_password, verify_password};
use edunexia_models::{LoginRequest, LoginResponse, RoleId, User, UserId};

use crate::metrics::{track_login_failure, track_login_success};
use crate::modules::roles::service as role_service;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Hash checked on the unknown-email path so both failures cost one bcrypt verify.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("edunexia-unknown-account").ok());

fn verify_against_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

pub struct AuthService;

impl AuthService {
    /// Verifies credentials and issues an access token carrying the role's
    /// permission names.
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        #[derive(FromRow)]
        struct UserWithPassword {
            id: UserId,
            full_name: String,
            email: String,
            password: String,
            role_id: Option<RoleId>,
            created_at: DateTime<Utc>,
        }

        let Some(record) = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, full_name, email, password, role_id, created_at FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(dto.email.trim())
        .fetch_optional(db)
        .await?
        else {
            verify_against_dummy(&dto.password);
            track_login_failure("unknown_email");
            warn!("Login failed: unknown email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &record.password)? {
            track_login_failure("bad_password");
            warn!(user_id = %record.id, "Login failed: wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let permissions = match record.role_id {
            Some(role_id) => role_service::get_role_permission_names(db, role_id).await?,
            None => Vec::new(),
        };

        let access_token = create_access_token(
            record.id.into_inner(),
            &record.email,
            record.role_id.map(RoleId::into_inner),
            permissions.clone(),
            jwt_config,
        )?;

        track_login_success();
        info!(user_id = %record.id, permissions = permissions.len(), "User logged in");

        Ok(LoginResponse {
            access_token,
            user: User {
                id: record.id,
                full_name: record.full_name,
                email: record.email,
                role_id: record.role_id,
                created_at: record.created_at,
            },
            permissions,
        })
    }
}
