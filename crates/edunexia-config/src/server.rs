use crate::env_or;

/// Listener settings for the API and the Prometheus scrape endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            metrics_port: 9090,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("PORT", defaults.port),
            metrics_port: env_or("METRICS_PORT", defaults.metrics_port),
        }
    }
}
