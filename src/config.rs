//! Configuration management for ipenricher.
//!
//! Centralizes the HTTP client timeout, the reputation lookback window and
//! the endpoint override. Values come from environment variables so the CLI
//! surface can stay the original four positional arguments plus `--update`.

use std::time::Duration;

use crate::errors::{EnricherError, Result};

/// Default AbuseIPDB check endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.abuseipdb.com/api/v2/check";

/// Default reputation lookback window, in days.
pub const DEFAULT_MAX_AGE_DAYS: u32 = 90;

/// Main configuration structure for ipenricher.
#[derive(Debug, Clone)]
pub struct Config {
    /// Timeout applied to the blocking HTTP client.
    pub http_timeout: Duration,

    /// Lookback window forwarded as the `maxAgeInDays` query parameter.
    pub max_age_days: u32,

    /// Reputation check endpoint; overridable for self-hosted proxies.
    pub endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(30),
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("IPENRICHER_HTTP_TIMEOUT_SECS")
            && let Ok(secs) = timeout.parse::<u64>()
        {
            config.http_timeout = Duration::from_secs(secs);
        }

        if let Ok(days) = std::env::var("IPENRICHER_MAX_AGE_DAYS")
            && let Ok(d) = days.parse::<u32>()
        {
            config.max_age_days = d;
        }

        if let Ok(endpoint) = std::env::var("IPENRICHER_ENDPOINT")
            && !endpoint.is_empty()
        {
            config.endpoint = endpoint;
        }

        config
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.http_timeout.as_secs() == 0 {
            return Err(EnricherError::configuration(
                "HTTP timeout must be greater than 0 seconds",
            ));
        }

        // AbuseIPDB accepts lookback windows between 1 and 365 days.
        if self.max_age_days == 0 || self.max_age_days > 365 {
            return Err(EnricherError::configuration(format!(
                "Lookback window must be between 1 and 365 days, got {}",
                self.max_age_days
            )));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(EnricherError::configuration(format!(
                "Endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }

        Ok(())
    }
}
