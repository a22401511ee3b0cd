//! Database configuration.

use serde::{Deserialize, Serialize};

/// Connection pool settings for the PostgreSQL store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Upper bound on pooled connections.
    #[serde(default = "defaults::max_connections")]
    pub max_connections: u32,
    /// Connections the pool keeps warm.
    #[serde(default = "defaults::min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when acquiring a connection.
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Seconds an idle connection may linger before being dropped.
    #[serde(default = "defaults::idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// A configuration with the given URL and default pool settings.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: defaults::max_connections(),
            min_connections: defaults::min_connections(),
            connect_timeout_seconds: defaults::connect_timeout(),
            idle_timeout_seconds: defaults::idle_timeout(),
        }
    }
}

mod defaults {
    pub(super) fn max_connections() -> u32 {
        16
    }

    pub(super) fn min_connections() -> u32 {
        2
    }

    pub(super) fn connect_timeout() -> u64 {
        10
    }

    pub(super) fn idle_timeout() -> u64 {
        600
    }
}
