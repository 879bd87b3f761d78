//! Middleware and extractors for request processing.
//!
//! # Modules
//!
//! - [`guard`]: the authentication and authorization chain
//! - [`auth`]: `AuthUser` extractor for authenticated routes
//! - [`role`]: admin-only route layer and extractor
//! - [`client`]: caller IP resolution for audit entries
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. The guard parses the header and verifies the token
//! 3. The user is loaded from the credential store
//! 4. Admin routes additionally require `is_admin`
//! 5. Handler executes with the resolved user
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn me(AuthUser(user): AuthUser) -> Json<User> {
//!     Json(user)
//! }
//! ```

pub mod auth;
pub mod client;
pub mod guard;
pub mod role;
