//! # EdunexIA Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`server`]: HTTP and metrics listener ports
//! - [`jwt`]: JWT authentication configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`rate_limit`]: Login rate limiting configuration
//!
//! # Example
//!
//! ```ignore
//! use edunexia_config::{CorsConfig, JwtConfig, RateLimitConfig, ServerConfig};
//!
//! let server = ServerConfig::from_env();
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

/// Reads `key` and parses it, falling back to `default` when unset or malformed.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
