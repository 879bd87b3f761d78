//! # Embryotech Auth
//!
//! Authentication primitives for the Embryotech API.
//!
//! This crate provides:
//!
//! - [`claims`]: the JWT claim structure
//! - [`jwt`]: [`TokenService`], which issues and verifies access tokens
//! - [`bearer`]: parsing of the `Authorization: Bearer <token>` header
//! - [`error`]: [`TokenError`], the internal reasons a credential is rejected
//!
//! Every [`TokenError`] converts into the same `unauthenticated`
//! [`AppError`](embryotech_core::AppError), so callers cannot probe which
//! check failed. The variant is still available for logging.
//!
//! # Example
//!
//! ```ignore
//! use embryotech_auth::{TokenService, parse_bearer};
//!
//! let token = parse_bearer(headers.get("authorization").and_then(|v| v.to_str().ok()))?;
//! let identity = token_service.verify(token)?;
//! println!("User ID: {}", identity.user_id);
//! ```

pub mod bearer;
pub mod claims;
pub mod error;
pub mod jwt;

// Re-export commonly used types at crate root
pub use bearer::parse_bearer;
pub use claims::Claims;
pub use error::{TokenError, UNAUTHENTICATED_MESSAGE};
pub use jwt::{IssuedToken, TokenIdentity, TokenService};
