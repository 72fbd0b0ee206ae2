//! Client configuration
//!
//! Values come from environment variables with defaults matching the hosted
//! API; the CLI can override them with flags.

use chrono::Duration;
use std::env;

use crate::cache::DEFAULT_TTL_MS;

/// Environment variable holding the API base URL
pub const API_URL_ENV: &str = "TASKHUB_API_URL";

/// Base URL used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for a [`TaskHub`](crate::api::TaskHub) client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every request path is appended to
    pub api_url: String,
    /// Per-request timeout
    pub timeout: std::time::Duration,
    /// Lifetime of cached responses
    pub cache_ttl: Duration,
}

impl Config {
    /// Creates a Config from environment variables
    ///
    /// # Environment Variables
    /// - `TASKHUB_API_URL` - API base URL (default: http://localhost:8000)
    pub fn from_env() -> Self {
        Self {
            api_url: env::var(API_URL_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            ..Self::default()
        }
    }

    /// Replaces the base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Replaces the cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::milliseconds(DEFAULT_TTL_MS),
        }
    }
}
