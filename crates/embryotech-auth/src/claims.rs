//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};

/// Claims embedded in every access token.
///
/// Tokens are self-contained: identity and role travel in the token, and the
/// guard still re-reads the user from the store on every request.
///
/// # Fields
///
/// - `sub`: User ID (subject), as a decimal string
/// - `is_admin`: Role at the time of issuance
/// - `iat`: Issued-at timestamp (Unix seconds)
/// - `exp`: Expiration timestamp (Unix seconds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Parses the subject back into a user id.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}
