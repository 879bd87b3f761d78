//! Rate limiting configuration for the credential endpoints.
//!
//! Login and registration are the only routes reachable without a token, so
//! they are the ones throttled. Limits are tracked per client IP.
//!
//! # Configuration
//!
//! - `RATE_LIMIT_ENABLED`: turn throttling on or off (default: true)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: seconds after which one request is replenished (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: requests allowed back to back (default: 5)
//!
//! # Rate Limiting Strategy
//!
//! The rate limiter uses a token bucket algorithm:
//!
//! - One token is added every `auth_per_second` seconds
//! - Each request consumes one token
//! - Burst size defines the maximum tokens that can accumulate
//! - Requests are rejected with `429 Too Many Requests` when no tokens are available
//!
//! # Example
//!
//! ```ignore
//! use embryotech_config::RateLimitConfig;
//!
//! let config = RateLimitConfig::from_env();
//! if let Some(governor) = config.auth_governor_config() {
//!     router = router.layer(GovernorLayer::new(Arc::new(governor)));
//! }
//! ```

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::{env_flag, env_or};

pub type AuthGovernorConfig =
    GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

/// Rate limit configuration for the credential endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,

    /// Interval, in seconds, after which one request is replenished.
    pub auth_per_second: u64,

    /// Maximum number of requests that can be made back to back.
    ///
    /// Kept low so rapid-fire password guessing is cut off quickly.
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
    /// Creates a new `RateLimitConfig` from environment variables.
    ///
    /// Falls back to default values if environment variables are not set
    /// or cannot be parsed.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_flag("RATE_LIMIT_ENABLED", defaults.enabled),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// Configuration with throttling switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Creates a `GovernorConfig` for the credential endpoints.
    ///
    /// The key is the client IP as reported by `X-Forwarded-For`, `X-Real-IP`
    /// or `Forwarded`, falling back to the peer address.
    ///
    /// Returns `None` when throttling is disabled or when the values cannot
    /// form a valid quota (a zero interval or zero burst).
    #[must_use]
    pub fn auth_governor_config(&self) -> Option<AuthGovernorConfig> {
        if !self.enabled {
            return None;
        }

        GovernorConfigBuilder::default()
            .per_second(self.auth_per_second)
            .burst_size(self.auth_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
    }
}
