use std::fmt;

use crate::{ConfigError, env_required};

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Token signing configuration.
///
/// The secret never leaves the server. Rotating it invalidates every
/// outstanding token.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, token_ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_secs,
        }
    }

    /// Loads `JWT_SECRET` (required) and `JWT_TTL_SECONDS` (default 3600).
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        let token_ttl_secs = match std::env::var("JWT_TTL_SECONDS") {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(ttl) if ttl > 0 => ttl,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "JWT_TTL_SECONDS",
                        value: raw,
                    });
                }
            },
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };

        Ok(Self {
            secret,
            token_ttl_secs,
        })
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}
