use sqlx::PgPool;

use edunexia_config::{CorsConfig, JwtConfig, RateLimitConfig};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
}

impl AppState {
    /// State with every config section read from the environment.
    pub fn from_env(db: PgPool) -> Self {
        Self {
            db,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            rate_limit_config: RateLimitConfig::from_env(),
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db = edunexia_db::init_db_pool().await?;
    edunexia_db::run_migrations(&db).await?;
    Ok(AppState::from_env(db))
}

#[cfg(any(test, feature = "test-utils"))]
impl AppState {
    /// Fixed JWT secret and no rate limiting, for in-process router tests.
    pub fn for_tests(db: PgPool) -> Self {
        Self {
            db,
            jwt_config: JwtConfig {
                secret: "edunexia-test-secret".to_string(),
                access_token_expiry: 3600,
            },
            cors_config: CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
            rate_limit_config: RateLimitConfig::disabled(),
        }
    }
}
