//! # Embryotech Core
//!
//! Core types, errors, and utilities for the Embryotech API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error taxonomy with HTTP response conversion
//! - [`password`]: Salted one-way password hashing and verification
//! - [`clock`]: Injectable time source for token expiry and audit timestamps
//! - [`serde`]: Custom serde helpers for query strings
//!
//! # Example
//!
//! ```ignore
//! use embryotech_core::errors::AppError;
//! use embryotech_core::clock::{Clock, SystemClock};
//! use embryotech_core::password::{hash_password_with_cost, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Reading not found"));
//! let hash = hash_password_with_cost("secure_password", 12)?;
//! let now = SystemClock.now();
//! ```

pub mod clock;
pub mod errors;
pub mod password;
pub mod serde;

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use errors::{AppError, ErrorKind};
pub use password::{DecoyHash, hash_password_with_cost, verify_password};
