use anyhow::anyhow;
use embryotech_core::AppError;
use thiserror::Error;

/// Outward message shared by every authentication failure.
pub const UNAUTHENTICATED_MESSAGE: &str = "Invalid or missing credentials";

/// Why a request failed to authenticate.
///
/// The variants exist for logs and metrics. Converted into an [`AppError`],
/// they all become the same `unauthenticated` response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("authorization header is missing")]
    MissingHeader,

    #[error("authorization header is not of the form 'Bearer <token>'")]
    MalformedHeader,

    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token subject does not exist")]
    UnknownUser,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl TokenError {
    /// Short label for metrics and structured logs.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::MalformedHeader => "malformed_header",
            Self::Malformed => "malformed_token",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::UnknownUser => "unknown_user",
            Self::Signing(_) => "signing_failed",
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => AppError::internal(anyhow!("failed to sign token: {msg}")),
            _ => AppError::unauthenticated(UNAUTHENTICATED_MESSAGE),
        }
    }
}
