//! Token issuance and verification.
//!
//! [`TokenService`] signs HS256 access tokens carrying the user id and admin
//! flag, and verifies them against the same secret. Expiry is checked against
//! the injected [`Clock`](embryotech_core::Clock) rather than the system time,
//! so lifetimes can be tested without sleeping.
//!
//! Tokens are stateless. Nothing is persisted at issuance and logout is a
//! client-side discard.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use embryotech_auth::TokenService;
//! use embryotech_config::JwtConfig;
//! use embryotech_core::SystemClock;
//!
//! let service = TokenService::new(&JwtConfig::try_from_env()?, Arc::new(SystemClock));
//!
//! let issued = service.issue(7, false)?;
//! let identity = service.verify(&issued.token)?;
//! assert_eq!(identity.user_id, 7);
//! ```

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind,
};
use serde::Serialize;

use embryotech_config::JwtConfig;
use embryotech_core::SharedClock;

use crate::claims::Claims;
use crate::error::TokenError;

/// A freshly signed token and its validity window.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Identity recovered from a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: i64,
    pub is_admin: bool,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: SharedClock,
}

impl TokenService {
    pub fn new(config: &JwtConfig, clock: SharedClock) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against `clock` in `verify`.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: Duration::seconds(config.token_ttl_secs),
            clock,
        }
    }

    /// Signs a token for `user_id` that expires `ttl` after now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, user_id: i64, is_admin: bool) -> Result<IssuedToken, TokenError> {
        let issued_at = self.clock.now();
        let expires_at = issued_at + self.ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            is_admin,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Checks signature, structure and expiry, in that order.
    ///
    /// A token is expired from the second its `exp` is reached.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InvalidSignature`] when the signature does not match
    /// - [`TokenError::Expired`] when `now >= exp`
    /// - [`TokenError::Malformed`] for anything else that cannot be decoded
    pub fn verify(&self, token: &str) -> Result<TokenIdentity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        let claims = data.claims;
        let user_id = claims.user_id().ok_or(TokenError::Malformed)?;
        let expires_at =
            DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or(TokenError::Malformed)?;

        if self.clock.now() >= expires_at {
            return Err(TokenError::Expired);
        }

        Ok(TokenIdentity {
            user_id,
            is_admin: claims.is_admin,
            expires_at,
        })
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl.num_seconds())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
