//! Rate limiting configuration for the login endpoint.
//!
//! Login is the only unauthenticated write surface of the API, so it is the
//! only route placed behind a governor. Limits use a token bucket keyed by
//! peer IP:
//!
//! - `RATE_LIMIT_ENABLED`: Set to `false` to disable limiting (default: true)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: Seconds between token replenishments (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: Maximum tokens in the bucket (default: 5)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tower_governor::GovernorLayer;
//!
//! let config = RateLimitConfig::from_env();
//! if let Some(governor) = config.auth_governor_config() {
//!     router = router.layer(GovernorLayer::new(Arc::new(governor)));
//! }
//! ```

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::PeerIpKeyExtractor;

use crate::env_or;

pub type AuthGovernorConfig =
    GovernorConfig<PeerIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth_per_second: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    /// A configuration with limiting switched off, for in-process router tests
    /// where no peer address is available.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("RATE_LIMIT_ENABLED", defaults.enabled),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// Builds the governor for the login route.
    ///
    /// Returns `None` when limiting is disabled or the configured values are
    /// rejected by the builder (zero period or zero burst).
    #[must_use]
    pub fn auth_governor_config(&self) -> Option<AuthGovernorConfig> {
        if !self.enabled {
            return None;
        }

        GovernorConfigBuilder::default()
            .per_second(self.auth_per_second)
            .burst_size(self.auth_burst_size)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
    }
}
